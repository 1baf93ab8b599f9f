//! Keep a Changelog / Common Changelog document types.

use chrono::NaiveDate;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::version::BumpType;

use super::parser::list_items;

/// Title used when the file has no top-level heading.
pub const DEFAULT_TITLE: &str = "Changelog";

/// Intro used when the file has none and no override is configured.
pub const DEFAULT_INTRO: &str = "All changes that impact users of this module are documented in this file, in the [Common Changelog](https://common-changelog.org) format with some additional specifications defined in the CONTRIBUTING file. This codebase adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).";

/// Changelog categories per Keep a Changelog spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangelogCategory {
    Added,
    Changed,
    Deprecated,
    Removed,
    Fixed,
    Security,
}

impl std::str::FromStr for ChangelogCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "added" => Ok(Self::Added),
            "changed" => Ok(Self::Changed),
            "deprecated" => Ok(Self::Deprecated),
            "removed" => Ok(Self::Removed),
            "fixed" => Ok(Self::Fixed),
            "security" => Ok(Self::Security),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Release type declared by the "Unreleased" heading directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseType {
    Major,
    Minor,
    Patch,
    NoRelease,
}

impl ReleaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::NoRelease => "no-release",
        }
    }

    /// The semver bump this release type asks for; `None` for `no-release`.
    pub fn bump(&self) -> Option<BumpType> {
        match self {
            Self::Major => Some(BumpType::Major),
            Self::Minor => Some(BumpType::Minor),
            Self::Patch => Some(BumpType::Patch),
            Self::NoRelease => None,
        }
    }
}

impl std::fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReleaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "no-release" => Ok(Self::NoRelease),
            _ => Err(format!("Unknown release type: {}", s)),
        }
    }
}

/// A `### <title>` group.
///
/// The body is kept as written (lists, prose, code blocks); entries are read
/// from it on demand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeGroup {
    pub title: String,
    pub body: String,
}

impl ChangeGroup {
    /// The Keep a Changelog category named by the title, if it is one.
    pub fn category(&self) -> Option<ChangelogCategory> {
        self.title.parse().ok()
    }

    /// List items in the body, markers stripped; continuation lines follow a `\n`.
    pub fn entries(&self) -> Vec<String> {
        list_items(&self.body)
    }
}

/// Body of a changelog section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReleaseNotes {
    /// Free text before the first change group: notice, attribution, prose.
    pub description: String,
    pub changes: Vec<ChangeGroup>,
}

impl ReleaseNotes {
    /// Whether any recognised category group lists at least one entry.
    pub fn has_changes(&self) -> bool {
        self.changes
            .iter()
            .any(|group| group.category().is_some() && !group.entries().is_empty())
    }

    /// Put an emphasized `_notice_` line in front of the description.
    ///
    /// A notice already wrapped in `_` is used as is. Returns `false` without
    /// touching anything when the line is already there.
    pub fn prepend_notice(&mut self, notice: &str) -> bool {
        let notice = notice.trim();
        let line = if notice.len() > 1 && notice.starts_with('_') && notice.ends_with('_') {
            notice.to_string()
        } else {
            format!("_{}_", notice)
        };
        if self.description.contains(&line) {
            return false;
        }

        self.description = if self.description.is_empty() {
            line
        } else {
            format!("{}\n\n{}", line, self.description)
        };
        true
    }
}

/// The pending "Unreleased" section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unreleased {
    /// Heading text after `## `, e.g. `Unreleased [minor]`.
    pub heading: String,
    pub notes: ReleaseNotes,
}

/// A released version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: Version,
    pub date: Option<NaiveDate>,
    /// Heading text after `## ` as read from the file, links and markers
    /// such as `[YANKED]` included. `None` renders `<version> - <date>`.
    pub heading: Option<String>,
    pub notes: ReleaseNotes,
}

/// A parsed changelog file.
///
/// The "Unreleased" section lives apart from `releases`, so a document can
/// hold at most one and it always renders first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogDocument {
    pub title: String,
    pub intro: String,
    pub unreleased: Option<Unreleased>,
    /// Released versions in document order, newest first.
    pub releases: Vec<Release>,
    /// Link reference definitions, e.g. `[1.0.0]: https://...`.
    pub links: Vec<String>,
}

impl ChangelogDocument {
    pub fn find_release(&self, version: &Version) -> Option<&Release> {
        self.releases.iter().find(|release| &release.version == version)
    }

    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.releases.iter().map(|release| &release.version)
    }
}
