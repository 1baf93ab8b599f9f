//! Changelog model configuration.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Directive on the "Unreleased" heading. Group 1 is the release type.
pub const DEFAULT_RELEASE_TYPE_PATTERN: &str =
    r"(?i)^##\s+\[?Unreleased\]?\s+\[\s*(major|minor|patch|no-release)\s*\]";

/// Funder or volunteer attribution line required in real releases.
pub const DEFAULT_FUNDER_PATTERN: &str =
    r"(?m)^> Development of this release was (?:supported|made on a volunteer basis) by (.+)\.$";

/// Boilerplate confirming a `no-release` change has no functional impact.
pub const DEFAULT_NO_RELEASE_SIGNATURE_PATTERN: &str = r"(?m)^_Modifications made in this changeset do not add, remove or alter any behavior, dependency, API or functionality of the software\. They only change non-functional parts of the repository, such as the README file or CI workflows\._$";

/// Changeset link notice. `REPOSITORY` and `PULL_REQUEST_NUMBER` are substituted.
pub const DEFAULT_CHANGESET_LINK_TEMPLATE: &str = "Full changeset and discussions: [#PULL_REQUEST_NUMBER](https://github.com/REPOSITORY/pull/PULL_REQUEST_NUMBER).";

static RELEASE_TYPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_RELEASE_TYPE_PATTERN).expect("Invalid regex"));

static FUNDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_FUNDER_PATTERN).expect("Invalid regex"));

static NO_RELEASE_SIGNATURE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_NO_RELEASE_SIGNATURE_PATTERN).expect("Invalid regex"));

/// How a validation pattern is chosen.
#[derive(Debug, Clone, Default)]
pub enum PatternOverride {
    /// Use the built-in pattern.
    #[default]
    Default,
    Custom(Regex),
    /// Skip the check entirely.
    Disabled,
}

impl PatternOverride {
    fn resolve(self, default: &Regex) -> Option<Regex> {
        match self {
            Self::Default => Some(default.clone()),
            Self::Custom(regex) => Some(regex),
            Self::Disabled => None,
        }
    }
}

/// Options for [`Changelog`](super::Changelog).
///
/// Every field is optional; `ChangelogConfig::default()` reproduces the
/// Common Changelog conventions.
#[derive(Debug, Clone, Default)]
pub struct ChangelogConfig {
    /// `owner/name`, substituted into the changeset link template.
    pub repository: Option<String>,
    /// Replaces the intro paragraph. Without it the file's own intro is kept,
    /// falling back to [`DEFAULT_INTRO`](super::format::DEFAULT_INTRO).
    pub intro: Option<String>,
    /// Matched against `## <unreleased heading>`; capture group 1 is the type.
    pub release_type_pattern: Option<Regex>,
    pub funder_pattern: PatternOverride,
    pub no_release_signature_pattern: PatternOverride,
    pub changeset_link_template: Option<String>,
}

/// Config with every default resolved.
pub(crate) struct ResolvedConfig {
    pub repository: Option<String>,
    pub release_type_pattern: Regex,
    pub funder_pattern: Option<Regex>,
    pub no_release_signature_pattern: Option<Regex>,
    pub changeset_link_template: String,
}

impl ChangelogConfig {
    /// Split off the intro and resolve the remaining defaults.
    pub(crate) fn resolve(self) -> (Option<String>, ResolvedConfig) {
        let resolved = ResolvedConfig {
            repository: self.repository,
            release_type_pattern: self
                .release_type_pattern
                .unwrap_or_else(|| RELEASE_TYPE_REGEX.clone()),
            funder_pattern: self.funder_pattern.resolve(&FUNDER_REGEX),
            no_release_signature_pattern: self
                .no_release_signature_pattern
                .resolve(&NO_RELEASE_SIGNATURE_REGEX),
            changeset_link_template: self
                .changeset_link_template
                .unwrap_or_else(|| DEFAULT_CHANGESET_LINK_TEMPLATE.to_string()),
        };

        (self.intro, resolved)
    }
}

/// Compile a user-supplied pattern.
///
/// Accepts `/pattern/flags` (flags `i`, `m`, `s`, `x`; `g` and `u` are
/// ignored) or a bare pattern, which is compiled in multi-line mode so `^`
/// and `$` anchor to lines of the section.
pub fn parse_pattern(input: &str) -> Result<Regex, regex_lite::Error> {
    if let Some((pattern, flags)) = input
        .strip_prefix('/')
        .and_then(|rest| rest.rsplit_once('/'))
    {
        if !pattern.is_empty() && flags.chars().all(|c| "imsxgu".contains(c)) {
            let inline: String = flags.chars().filter(|c| "imsx".contains(*c)).collect();
            if inline.is_empty() {
                return Regex::new(pattern);
            }
            return Regex::new(&format!("(?{}){}", inline, pattern));
        }
    }

    Regex::new(&format!("(?m){}", input))
}
