//! Changelog parsing, validation and release promotion.

pub mod config;
pub mod format;
pub mod parser;
pub mod writer;

use std::fmt;

use chrono::{NaiveDate, Utc};
use regex_lite::Regex;
use semver::Version;
use serde::Serialize;
use tracing::debug;

use crate::error::{ChangelogError, ChangelogValidationError, ValidationError};
use crate::version::{INITIAL_VERSION, calculate_next_version, latest_version};

use self::config::ResolvedConfig;

pub use config::{ChangelogConfig, PatternOverride, parse_pattern};
pub use format::{
    ChangeGroup, ChangelogCategory, ChangelogDocument, DEFAULT_INTRO, Release, ReleaseNotes,
    ReleaseType, Unreleased,
};
pub use parser::{parse_changelog, read_changelog};
pub use writer::{render_changelog, write_changelog};

/// Result of [`Changelog::release`].
///
/// Both fields are `None` when a `no-release` section was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseOutcome {
    pub version: Option<Version>,
    pub content: Option<String>,
}

impl ReleaseOutcome {
    pub fn is_empty(&self) -> bool {
        self.version.is_none()
    }
}

/// A changelog loaded in memory.
///
/// Built from text, mutated at most once by [`release`](Self::release) or
/// [`clean_unreleased`](Self::clean_unreleased), rendered back with
/// `to_string()`. Nothing is written to disk here.
pub struct Changelog {
    document: ChangelogDocument,
    release_type: Option<ReleaseType>,
    config: ResolvedConfig,
}

impl Changelog {
    /// Parse `content` and read the release type off the "Unreleased" heading.
    pub fn new(content: &str, config: ChangelogConfig) -> Result<Self, ChangelogError> {
        let mut document = parse_changelog(content)?;
        let (intro, config) = config.resolve();

        match intro {
            Some(intro) => document.intro = intro,
            None if document.intro.is_empty() => document.intro = DEFAULT_INTRO.to_string(),
            None => {}
        }

        let release_type = document
            .unreleased
            .as_ref()
            .and_then(|unreleased| extract_release_type(&config.release_type_pattern, unreleased));

        debug!(
            release_type = release_type.map(|t| t.as_str()).unwrap_or("none"),
            "Loaded changelog"
        );

        Ok(Self {
            document,
            release_type,
            config,
        })
    }

    pub fn document(&self) -> &ChangelogDocument {
        &self.document
    }

    /// Release type declared on the "Unreleased" heading, if any.
    pub fn release_type(&self) -> Option<ReleaseType> {
        self.release_type
    }

    /// Highest released version.
    pub fn latest_version(&self) -> Option<&Version> {
        latest_version(self.document.versions())
    }

    /// The version [`release`](Self::release) would produce, without releasing.
    ///
    /// `None` without an "Unreleased" section or release type. A `no-release`
    /// section keeps the latest version.
    pub fn next_version(&self) -> Option<Version> {
        self.document.unreleased.as_ref()?;
        let release_type = self.release_type?;

        Some(match release_type.bump() {
            Some(bump) => calculate_next_version(self.document.versions(), bump),
            None => self.latest_version().cloned().unwrap_or(INITIAL_VERSION),
        })
    }

    /// Rendered section of `version`: heading, description and changes.
    pub fn get_version_content(&self, version: &str) -> Result<String, ChangelogError> {
        let not_found = || ChangelogError::VersionNotFound(version.to_string());

        let wanted =
            Version::parse(version.trim().trim_start_matches('v')).map_err(|_| not_found())?;

        self.document
            .find_release(&wanted)
            .map(writer::render_release)
            .ok_or_else(not_found)
    }

    /// Check the "Unreleased" section can be released.
    ///
    /// A missing section is reported on its own. Otherwise every broken rule
    /// is collected into one [`ChangelogValidationError`].
    pub fn validate_unreleased(&self) -> Result<(), ChangelogError> {
        let unreleased = self
            .document
            .unreleased
            .as_ref()
            .ok_or(ChangelogError::MissingUnreleased)?;
        let notes = &unreleased.notes;
        let mut errors = Vec::new();

        if self.release_type.is_none() {
            errors.push(ValidationError::InvalidReleaseType);
        }

        if self.release_type == Some(ReleaseType::NoRelease) {
            if !matches_or_disabled(&self.config.no_release_signature_pattern, &notes.description) {
                errors.push(ValidationError::MissingNotice);
            }
        } else {
            if !matches_or_disabled(&self.config.funder_pattern, &notes.description) {
                errors.push(ValidationError::MissingFunder);
            }

            if !notes.has_changes() {
                errors.push(ValidationError::MissingChanges);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            debug!(count = errors.len(), "Unreleased section is invalid");
            Err(ChangelogValidationError { errors }.into())
        }
    }

    /// Notice text linking the pull request that carries the release.
    pub fn changeset_link(&self, pull_request: &str) -> Result<String, ChangelogError> {
        let template = &self.config.changeset_link_template;
        let mut link =
            template.replace("PULL_REQUEST_NUMBER", pull_request.trim_start_matches('#'));

        if template.contains("REPOSITORY") {
            let repository = self
                .config
                .repository
                .as_deref()
                .ok_or(ChangelogError::MissingRepository)?;
            link = link.replace("REPOSITORY", repository);
        }

        Ok(link)
    }

    /// Promote the "Unreleased" section to a release dated today (UTC).
    pub fn release(&mut self, notice: Option<&str>) -> Result<ReleaseOutcome, ChangelogError> {
        self.release_on(notice, Utc::now().date_naive())
    }

    /// Promote the "Unreleased" section to a release dated `date`.
    ///
    /// The new version is the latest one bumped by the release type. A
    /// `no-release` section is removed instead and the outcome is empty. A
    /// notice is prepended to the description as `_<notice>_` unless it is
    /// already there.
    pub fn release_on(
        &mut self,
        notice: Option<&str>,
        date: NaiveDate,
    ) -> Result<ReleaseOutcome, ChangelogError> {
        if self.document.unreleased.is_none() {
            return Err(ChangelogError::MissingUnreleased);
        }

        let release_type = self.release_type.ok_or(ChangelogError::UnknownReleaseType)?;
        let Some(bump) = release_type.bump() else {
            self.clean_unreleased();
            return Ok(ReleaseOutcome::default());
        };

        let version = calculate_next_version(self.document.versions(), bump);

        let Some(Unreleased { mut notes, .. }) = self.document.unreleased.take() else {
            return Err(ChangelogError::MissingUnreleased);
        };

        if let Some(notice) = notice.filter(|n| !n.trim().is_empty()) {
            notes.prepend_notice(notice);
        }

        let release = Release {
            version: version.clone(),
            date: Some(date),
            heading: None,
            notes,
        };
        let content = writer::render_release(&release);
        self.document.releases.insert(0, release);

        debug!(%version, %release_type, "Released unreleased section");

        Ok(ReleaseOutcome {
            version: Some(version),
            content: Some(content),
        })
    }

    /// Drop the "Unreleased" section. Returns whether there was one.
    pub fn clean_unreleased(&mut self) -> bool {
        let removed = self.document.unreleased.take().is_some();
        if removed {
            debug!("Removed unreleased section");
        }
        removed
    }
}

impl fmt::Display for Changelog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_changelog(&self.document))
    }
}

fn extract_release_type(pattern: &Regex, unreleased: &Unreleased) -> Option<ReleaseType> {
    let heading = format!("## {}", unreleased.heading);
    pattern.captures(&heading)?.get(1)?.as_str().parse().ok()
}

/// A disabled check always passes.
fn matches_or_disabled(pattern: &Option<Regex>, text: &str) -> bool {
    pattern.as_ref().is_none_or(|regex| regex.is_match(text))
}
