//! Read changelog Markdown into a [`ChangelogDocument`].

use std::path::Path;

use chrono::NaiveDate;
use semver::Version;
use tracing::debug;

use crate::error::{ChangelogError, ParseError};

use super::format::{
    ChangeGroup, ChangelogCategory, ChangelogDocument, DEFAULT_TITLE, Release, ReleaseNotes,
    Unreleased,
};

/// Read a changelog file into memory.
pub fn read_changelog(path: &Path) -> Result<String, ChangelogError> {
    std::fs::read_to_string(path).map_err(ChangelogError::ReadFailed)
}

/// What a `## ` heading introduces.
enum SectionHead {
    Unreleased(String),
    Release {
        heading: String,
        version: Version,
        date: Option<NaiveDate>,
    },
}

/// Parse changelog text.
///
/// Everything before the first `## ` heading is the title and intro. Each
/// `## ` heading opens a section that runs until the next one. Headings
/// inside fenced code blocks are ignored.
pub fn parse_changelog(content: &str) -> Result<ChangelogDocument, ParseError> {
    let mut title: Option<String> = None;
    let mut intro_lines: Vec<&str> = Vec::new();
    let mut links: Vec<String> = Vec::new();
    let mut unreleased: Option<Unreleased> = None;
    let mut releases: Vec<Release> = Vec::new();
    let mut current: Option<(SectionHead, Vec<&str>)> = None;
    let mut fence = Fence::default();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;

        if !fence.update(line) {
            if let Some(heading) = line.strip_prefix("## ") {
                if let Some((head, lines)) = current.take() {
                    push_section(head, &lines, &mut unreleased, &mut releases);
                }
                let head = parse_heading(heading.trim(), line_no, &unreleased, &releases)?;
                current = Some((head, Vec::new()));
                continue;
            }

            if current.is_none() && title.is_none() {
                if let Some(text) = line.strip_prefix("# ") {
                    title = Some(text.trim().to_string());
                    continue;
                }
            }

            if is_link_reference(line) {
                links.push(line.trim().to_string());
                continue;
            }
        }

        match current.as_mut() {
            Some((_, lines)) => lines.push(line),
            None => intro_lines.push(line),
        }
    }

    if let Some((head, lines)) = current.take() {
        push_section(head, &lines, &mut unreleased, &mut releases);
    }

    debug!(
        releases = releases.len(),
        has_unreleased = unreleased.is_some(),
        "Parsed changelog"
    );

    Ok(ChangelogDocument {
        title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        intro: join_lines(&intro_lines),
        unreleased,
        releases,
        links,
    })
}

fn push_section(
    head: SectionHead,
    lines: &[&str],
    unreleased: &mut Option<Unreleased>,
    releases: &mut Vec<Release>,
) {
    let notes = parse_notes(lines);
    match head {
        SectionHead::Unreleased(heading) => *unreleased = Some(Unreleased { heading, notes }),
        SectionHead::Release {
            heading,
            version,
            date,
        } => releases.push(Release {
            version,
            date,
            heading: Some(heading),
            notes,
        }),
    }
}

fn parse_heading(
    heading: &str,
    line: usize,
    unreleased: &Option<Unreleased>,
    releases: &[Release],
) -> Result<SectionHead, ParseError> {
    if is_unreleased_heading(heading) {
        if unreleased.is_some() {
            return Err(ParseError::DuplicateUnreleased { line });
        }
        if !releases.is_empty() {
            return Err(ParseError::MisplacedUnreleased { line });
        }
        return Ok(SectionHead::Unreleased(heading.to_string()));
    }

    let (version, date) = parse_release_heading(heading, line)?;
    if releases.iter().any(|release| release.version == version) {
        return Err(ParseError::DuplicateVersion {
            line,
            version: version.to_string(),
        });
    }

    Ok(SectionHead::Release {
        heading: heading.to_string(),
        version,
        date,
    })
}

/// `Unreleased`, `[Unreleased]`, optionally followed by a directive.
fn is_unreleased_heading(heading: &str) -> bool {
    let heading = heading.trim_start_matches('[');
    let (Some(word), Some(rest)) = (heading.get(..10), heading.get(10..)) else {
        return false;
    };

    word.eq_ignore_ascii_case("unreleased")
        && (rest.is_empty() || rest.starts_with(']') || rest.starts_with(char::is_whitespace))
}

/// Split a release heading into version and date.
/// e.g., "[1.2.3] - 2024-01-01" -> (1.2.3, Some(2024-01-01))
fn parse_release_heading(
    heading: &str,
    line: usize,
) -> Result<(Version, Option<NaiveDate>), ParseError> {
    let (version_part, date_part) = match heading.split_once(" - ") {
        Some((version, date)) => (version.trim(), Some(date.trim())),
        None => (heading, None),
    };

    // Handle [version] and [version](link) formats
    let version_text = match version_part.strip_prefix('[') {
        Some(rest) => rest.split(']').next().unwrap_or(rest),
        None => version_part,
    };
    let version_text = version_text.trim().trim_start_matches('v');

    let version = Version::parse(version_text).map_err(|source| ParseError::InvalidVersion {
        line,
        heading: heading.to_string(),
        source,
    })?;

    let date = match date_part.and_then(|d| d.split_whitespace().next()) {
        Some(text) => Some(NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
            ParseError::InvalidDate {
                line,
                date: text.to_string(),
            }
        })?),
        None => None,
    };

    Ok((version, date))
}

/// Parse the body of a section into description and change groups.
///
/// The description ends at the first `### ` heading naming a known category;
/// every `### ` heading after that opens a group. Group bodies are kept as
/// written.
fn parse_notes(lines: &[&str]) -> ReleaseNotes {
    let mut description: Vec<&str> = Vec::new();
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    let mut fence = Fence::default();

    for &line in lines {
        if !fence.update(line) {
            if let Some(title) = line.strip_prefix("### ") {
                let title = title.trim();
                if !groups.is_empty() || title.parse::<ChangelogCategory>().is_ok() {
                    groups.push((title, Vec::new()));
                    continue;
                }
            }
        }

        match groups.last_mut() {
            Some((_, body)) => body.push(line),
            None => description.push(line),
        }
    }

    ReleaseNotes {
        description: join_lines(&description),
        changes: groups
            .into_iter()
            .map(|(title, body)| ChangeGroup {
                title: title.to_string(),
                body: join_lines(&body),
            })
            .collect(),
    }
}

/// List items of a group body, markers stripped.
///
/// Items start with `- `, `* `, `+ ` or `1. `/`1) ` at the start of a line.
/// Following lines belong to the item until the next item, or until
/// unindented text after a blank line. Blank lines inside an item are kept.
pub(crate) fn list_items(body: &str) -> Vec<String> {
    let mut items: Vec<Vec<&str>> = Vec::new();
    let mut fence = Fence::default();
    let mut open = false;
    let mut after_blank = false;

    for line in body.lines() {
        if !fence.update(line) {
            if let Some(text) = strip_list_marker(line) {
                items.push(vec![text]);
                open = true;
                after_blank = false;
                continue;
            }

            if line.trim().is_empty() {
                if let Some(item) = items.last_mut().filter(|_| open) {
                    item.push(line);
                }
                after_blank = true;
                continue;
            }

            if after_blank && !line.starts_with([' ', '\t']) {
                open = false;
            }
        }

        if let Some(item) = items.last_mut().filter(|_| open) {
            item.push(line);
        }
        after_blank = false;
    }

    items.iter().map(|lines| join_lines(lines)).collect()
}

fn strip_list_marker(line: &str) -> Option<&str> {
    if let Some(text) = ["- ", "* ", "+ "]
        .iter()
        .find_map(|marker| line.strip_prefix(*marker))
    {
        return Some(text);
    }

    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 || digits > 9 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") "))
}

/// `[label]: target` link reference definitions.
fn is_link_reference(line: &str) -> bool {
    let Some(rest) = line.strip_prefix('[') else {
        return false;
    };

    match rest.split_once("]:") {
        Some((label, target)) => {
            !label.is_empty()
                && !label.contains('[')
                && target.starts_with(' ')
                && !target.trim().is_empty()
        }
        None => false,
    }
}

/// Join lines, dropping blank lines at both ends.
fn join_lines(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());

    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end]
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Tracks fenced code blocks (``` and ~~~).
#[derive(Default)]
struct Fence {
    open: Option<&'static str>,
}

impl Fence {
    /// Feed the next line; returns true when it belongs to a code block,
    /// delimiters included.
    fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let marker = if trimmed.starts_with("```") {
            Some("```")
        } else if trimmed.starts_with("~~~") {
            Some("~~~")
        } else {
            None
        };

        match (self.open, marker) {
            (None, Some(marker)) => {
                self.open = Some(marker);
                true
            }
            (Some(open), Some(marker)) if open == marker => {
                self.open = None;
                true
            }
            (Some(_), _) => true,
            (None, None) => false,
        }
    }
}
