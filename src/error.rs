//! Error types for changelog-manager modules using thiserror.

use std::fmt;

use thiserror::Error;

/// Errors from parsing changelog Markdown.
///
/// Line numbers are 1-based and point at the offending heading.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Line {line}: invalid version in heading '{heading}': {source}")]
    InvalidVersion {
        line: usize,
        heading: String,
        #[source]
        source: semver::Error,
    },

    #[error("Line {line}: invalid release date '{date}' (expected YYYY-MM-DD)")]
    InvalidDate { line: usize, date: String },

    #[error("Line {line}: changelog contains more than one \"Unreleased\" section")]
    DuplicateUnreleased { line: usize },

    #[error("Line {line}: \"Unreleased\" section must come before every released version")]
    MisplacedUnreleased { line: usize },

    #[error("Line {line}: version {version} appears more than once")]
    DuplicateVersion { line: usize, version: String },
}

/// A single rule broken by the "Unreleased" section.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "Invalid or missing release type for \"Unreleased\" section. Please ensure the section contains a valid release type (major, minor, patch or no-release)"
    )]
    InvalidReleaseType,

    #[error("Missing no release signature")]
    MissingNotice,

    #[error("Missing funder in the \"Unreleased\" section")]
    MissingFunder,

    #[error("Missing or malformed changes in the \"Unreleased\" section")]
    MissingChanges,
}

/// Every rule broken by the "Unreleased" section, in the order they were checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogValidationError {
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for ChangelogValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Changelog validation failed:")?;
        for error in &self.errors {
            write!(f, "\n- {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ChangelogValidationError {}

/// Errors from changelog operations.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Failed to read changelog: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write changelog: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to parse changelog: {0}")]
    Parse(#[from] ParseError),

    #[error("Version {0} not found in changelog")]
    VersionNotFound(String),

    #[error("Missing \"Unreleased\" section")]
    MissingUnreleased,

    #[error(
        "Cannot release: the \"Unreleased\" section has no valid release type (major, minor, patch or no-release)"
    )]
    UnknownReleaseType,

    #[error("A repository (owner/name) is required to build a changeset link")]
    MissingRepository,

    #[error(transparent)]
    Validation(#[from] ChangelogValidationError),
}
