//! changelog - CLI entry point.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use changelog_manager::changelog::{parse_pattern, read_changelog, write_changelog};
use changelog_manager::{Changelog, ChangelogConfig, PatternOverride};

/// Environment variable supplying the changelog path when `--changelog` is absent.
const CHANGELOG_PATH_ENV_VAR: &str = "CHANGELOG_PATH";

const DEFAULT_CHANGELOG_PATH: &str = "CHANGELOG.md";

const NO_RELEASE_TYPE: &str = "No release type found";

/// Validate and release a Common Changelog file.
#[derive(Parser, Debug)]
#[command(name = "changelog")]
#[command(about = "Validate and release a Common Changelog file")]
#[command(version)]
struct Cli {
    /// Path to changelog file (default: $CHANGELOG_PATH, then CHANGELOG.md)
    #[arg(short = 'c', long, global = true)]
    changelog: Option<PathBuf>,

    #[command(flatten)]
    options: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// GitHub repository (owner/name) used in changeset links
    #[arg(long, global = true)]
    repository: Option<String>,

    /// Replace the intro paragraph
    #[arg(long, global = true)]
    intro: Option<String>,

    /// Pattern matching the release type directive (capture group 1)
    #[arg(long, global = true, value_name = "PATTERN")]
    release_type_pattern: Option<String>,

    /// Pattern the funder line must match (bare or /pattern/flags)
    #[arg(long, global = true, value_name = "PATTERN")]
    funder_pattern: Option<String>,

    /// Skip the funder check
    #[arg(long, global = true)]
    no_funder_check: bool,

    /// Pattern the no-release signature must match (bare or /pattern/flags)
    #[arg(long, global = true, value_name = "PATTERN")]
    no_release_pattern: Option<String>,

    /// Skip the no-release signature check
    #[arg(long, global = true)]
    no_release_check: bool,

    /// Changeset link template (REPOSITORY and PULL_REQUEST_NUMBER are substituted)
    #[arg(long, global = true, value_name = "TEMPLATE")]
    changeset_template: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the "Unreleased" section is ready to be released
    Validate,

    /// Print the release type of the "Unreleased" section
    ReleaseType,

    /// Print the section of a released version
    Show {
        /// Version to print, e.g. 1.2.0
        version: String,
    },

    /// Print the version the next release would get
    NextVersion,

    /// Promote the "Unreleased" section to a dated release
    Release {
        /// Notice prepended to the release description
        notice: Option<String>,

        /// Pull request number; prepends a changeset link instead of a notice
        #[arg(long, conflicts_with = "notice")]
        pr: Option<String>,

        /// Print the version and content as JSON
        #[arg(long)]
        json: bool,

        /// Dry run - print changelog without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove the "Unreleased" section
    CleanUnreleased {
        /// Dry run - print changelog without writing
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let path = cli.changelog.unwrap_or_else(default_changelog_path);
    let config = cli.options.into_config()?;

    let content = read_changelog(&path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    let mut changelog = Changelog::new(&content, config)
        .with_context(|| format!("Could not load {}", path.display()))?;

    match cli.command {
        Command::Validate => {
            changelog.validate_unreleased()?;
            debug!(release_type = ?changelog.release_type(), "Validated changelog");
            println!("Changelog valid!");
        }

        Command::ReleaseType => match changelog.release_type() {
            Some(release_type) => println!("{}", release_type),
            None => println!("{}", NO_RELEASE_TYPE),
        },

        Command::Show { version } => {
            println!("{}", changelog.get_version_content(&version)?);
        }

        Command::NextVersion => match changelog.next_version() {
            Some(version) => println!("{}", version),
            None => println!("{}", NO_RELEASE_TYPE),
        },

        Command::Release {
            notice,
            pr,
            json,
            dry_run,
        } => {
            let notice = match pr {
                Some(pr) => Some(changelog.changeset_link(&pr)?),
                None => notice,
            };

            let outcome = changelog.release(notice.as_deref())?;
            save(&path, &changelog, dry_run)?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&outcome).context("Failed to serialize release")?
                );
            } else if let (Some(version), Some(content)) = (&outcome.version, &outcome.content) {
                println!("✓ Released {}\n\n{}", version, content);
            } else {
                println!("✓ No release needed, removed \"Unreleased\" section");
            }
        }

        Command::CleanUnreleased { dry_run } => {
            let removed = changelog.clean_unreleased();
            save(&path, &changelog, dry_run)?;

            if removed {
                println!("✓ Removed \"Unreleased\" section");
            } else {
                println!("No \"Unreleased\" section to remove");
            }
        }
    }

    Ok(())
}

impl ConfigArgs {
    fn into_config(self) -> Result<ChangelogConfig> {
        let release_type_pattern = self
            .release_type_pattern
            .as_deref()
            .map(parse_pattern)
            .transpose()
            .context("Invalid --release-type-pattern")?;

        Ok(ChangelogConfig {
            repository: self.repository,
            intro: self.intro,
            release_type_pattern,
            funder_pattern: pattern_override(self.funder_pattern.as_deref(), self.no_funder_check)
                .context("Invalid --funder-pattern")?,
            no_release_signature_pattern: pattern_override(
                self.no_release_pattern.as_deref(),
                self.no_release_check,
            )
            .context("Invalid --no-release-pattern")?,
            changeset_link_template: self.changeset_template,
        })
    }
}

/// A disable flag wins over a pattern.
fn pattern_override(
    pattern: Option<&str>,
    disabled: bool,
) -> Result<PatternOverride, regex_lite::Error> {
    if disabled {
        return Ok(PatternOverride::Disabled);
    }

    match pattern {
        Some(pattern) => Ok(PatternOverride::Custom(parse_pattern(pattern)?)),
        None => Ok(PatternOverride::Default),
    }
}

/// Changelog path from `CHANGELOG_PATH`, ignoring empty values.
fn default_changelog_path() -> PathBuf {
    match env::var(CHANGELOG_PATH_ENV_VAR) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v),
        _ => PathBuf::from(DEFAULT_CHANGELOG_PATH),
    }
}

/// Write the rendered changelog, or print it for a dry run.
fn save(path: &Path, changelog: &Changelog, dry_run: bool) -> Result<()> {
    let content = changelog.to_string();

    if dry_run {
        println!("\n--- Dry Run Output ---\n");
        print!("{}", content);
        return Ok(());
    }

    write_changelog(path, &content)
        .with_context(|| format!("Could not write {}", path.display()))?;
    debug!(path = %path.display(), "Wrote changelog");

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
