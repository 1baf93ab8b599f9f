//! Render changelog documents and write them back to disk.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use semver::Version;
use tempfile::NamedTempFile;

use crate::error::ChangelogError;

use super::format::{ChangelogDocument, Release, ReleaseNotes, Unreleased};

/// Render a whole document as Markdown, ending with a single newline.
pub fn render_changelog(document: &ChangelogDocument) -> String {
    let mut blocks = vec![format!("# {}", document.title)];

    if !document.intro.is_empty() {
        blocks.push(document.intro.clone());
    }

    if let Some(unreleased) = &document.unreleased {
        blocks.push(render_unreleased(unreleased));
    }

    blocks.extend(document.releases.iter().map(render_release));

    if !document.links.is_empty() {
        blocks.push(document.links.join("\n"));
    }

    let mut content = blocks.join("\n\n");
    content.push('\n');
    content
}

/// Render a released version's section, without a trailing newline.
///
/// A heading read from the file is written back as it was.
pub fn render_release(release: &Release) -> String {
    let heading = match &release.heading {
        Some(heading) => heading.clone(),
        None => format_release_heading(&release.version, release.date),
    };
    render_section(&heading, &release.notes)
}

/// Render the "Unreleased" section, heading kept as written.
pub fn render_unreleased(unreleased: &Unreleased) -> String {
    render_section(&unreleased.heading, &unreleased.notes)
}

/// `1.2.3 - 2024-01-01`, or just `1.2.3` for an undated release.
pub fn format_release_heading(version: &Version, date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => format!("{} - {}", version, date.format("%Y-%m-%d")),
        None => version.to_string(),
    }
}

fn render_section(heading: &str, notes: &ReleaseNotes) -> String {
    let mut section = format!("## {}", heading);

    if !notes.description.is_empty() {
        section.push_str("\n\n");
        section.push_str(&notes.description);
    }

    for group in &notes.changes {
        section.push_str(&format!("\n\n### {}", group.title));

        if !group.body.is_empty() {
            section.push_str("\n\n");
            section.push_str(&group.body);
        }
    }

    section
}

/// Replace the changelog file with `content`.
///
/// Writes to a temporary file next to `path` and renames it into place, so a
/// failure never leaves a half-written changelog behind.
pub fn write_changelog(path: &Path, content: &str) -> Result<(), ChangelogError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(ChangelogError::WriteFailed)?;
    file.write_all(content.as_bytes())
        .map_err(ChangelogError::WriteFailed)?;
    file.persist(path)
        .map_err(|e| ChangelogError::WriteFailed(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::format::ChangeGroup;

    fn sample_release() -> Release {
        Release {
            version: Version::new(1, 2, 0),
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            heading: None,
            notes: ReleaseNotes {
                description: "> Development of this release was supported by a funder.".to_string(),
                changes: vec![
                    ChangeGroup {
                        title: "Added".to_string(),
                        body: "- New feature".to_string(),
                    },
                    ChangeGroup {
                        title: "Fixed".to_string(),
                        body: "- Bug fix\n- Other fix".to_string(),
                    },
                ],
            },
        }
    }

    #[test]
    fn test_render_release() {
        let section = render_release(&sample_release());

        assert_eq!(
            section,
            "## 1.2.0 - 2024-01-01\n\n\
             > Development of this release was supported by a funder.\n\n\
             ### Added\n\n\
             - New feature\n\n\
             ### Fixed\n\n\
             - Bug fix\n\
             - Other fix"
        );
    }

    #[test]
    fn test_render_release_keeps_parsed_heading() {
        let release = Release {
            heading: Some("[1.2.0](https://example.com/v1.2.0) - 2024-01-01 [YANKED]".to_string()),
            ..sample_release()
        };

        assert!(
            render_release(&release)
                .starts_with("## [1.2.0](https://example.com/v1.2.0) - 2024-01-01 [YANKED]\n\n")
        );
    }

    #[test]
    fn test_undated_heading() {
        assert_eq!(format_release_heading(&Version::new(0, 1, 0), None), "0.1.0");
    }

    #[test]
    fn test_render_changelog_without_sections() {
        let document = ChangelogDocument {
            title: "Changelog".to_string(),
            intro: "Intro.".to_string(),
            unreleased: None,
            releases: Vec::new(),
            links: Vec::new(),
        };

        assert_eq!(render_changelog(&document), "# Changelog\n\nIntro.\n");
    }

    #[test]
    fn test_write_changelog_replaces_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("CHANGELOG.md");
        std::fs::write(&path, "old").unwrap();

        write_changelog(&path, "# Changelog\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Changelog\n");
    }
}
