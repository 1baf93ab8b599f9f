//! changelog-manager - Validate and release Common Changelog files.
//!
//! # Overview
//!
//! changelog-manager reads a `CHANGELOG.md` in Keep a Changelog / Common
//! Changelog format, checks that its "Unreleased" section declares a release
//! type (`## Unreleased [minor]`), credits a funder and lists changes, and
//! promotes it to a dated release with the next semantic version.

pub mod changelog;
pub mod error;
pub mod version;

// Re-export commonly used types
pub use changelog::{Changelog, ChangelogConfig, PatternOverride, ReleaseOutcome, ReleaseType};
pub use error::{ChangelogError, ChangelogValidationError, ParseError, ValidationError};
pub use version::BumpType;
