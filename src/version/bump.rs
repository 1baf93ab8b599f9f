//! Semver comparison and incrementing.

use semver::{BuildMetadata, Prerelease, Version};

/// Version used as the base when a changelog has no release yet.
pub const INITIAL_VERSION: Version = Version::new(0, 0, 0);

/// Type of version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BumpType {
    Patch,
    Minor,
    Major,
}

/// Return the highest version by semver precedence.
pub fn latest_version<'a, I>(versions: I) -> Option<&'a Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    versions.into_iter().max()
}

/// Calculate the version that follows `base` for the given bump.
///
/// A pre-release is promoted to its own final version when the bump would
/// land on it (`1.0.0-rc.1` + major is `1.0.0`, not `2.0.0`). Pre-release and
/// build metadata never carry over.
pub fn apply_bump_to_version(base: &Version, bump: BumpType) -> Version {
    let is_pre = !base.pre.is_empty();

    let mut next = match bump {
        BumpType::Major => {
            if is_pre && base.minor == 0 && base.patch == 0 {
                Version::new(base.major, 0, 0)
            } else {
                Version::new(base.major + 1, 0, 0)
            }
        }
        BumpType::Minor => {
            if is_pre && base.patch == 0 {
                Version::new(base.major, base.minor, 0)
            } else {
                Version::new(base.major, base.minor + 1, 0)
            }
        }
        BumpType::Patch => {
            if is_pre {
                Version::new(base.major, base.minor, base.patch)
            } else {
                Version::new(base.major, base.minor, base.patch + 1)
            }
        }
    };

    next.pre = Prerelease::EMPTY;
    next.build = BuildMetadata::EMPTY;
    next
}

/// Bump the latest of `versions`, starting from `0.0.0` when there is none.
pub fn calculate_next_version<'a, I>(versions: I, bump: BumpType) -> Version
where
    I: IntoIterator<Item = &'a Version>,
{
    match latest_version(versions) {
        Some(base) => apply_bump_to_version(base, bump),
        None => apply_bump_to_version(&INITIAL_VERSION, bump),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_patch_bump() {
        assert_eq!(apply_bump_to_version(&v("1.2.3"), BumpType::Patch), v("1.2.4"));
    }

    #[test]
    fn test_minor_bump_resets_patch() {
        assert_eq!(apply_bump_to_version(&v("1.2.3"), BumpType::Minor), v("1.3.0"));
    }

    #[test]
    fn test_major_bump_resets_minor_and_patch() {
        assert_eq!(apply_bump_to_version(&v("1.2.3"), BumpType::Major), v("2.0.0"));
    }

    #[test]
    fn test_prerelease_promoted_to_final() {
        assert_eq!(apply_bump_to_version(&v("1.0.0-rc.1"), BumpType::Major), v("1.0.0"));
        assert_eq!(apply_bump_to_version(&v("1.2.0-beta"), BumpType::Minor), v("1.2.0"));
        assert_eq!(apply_bump_to_version(&v("1.2.3-alpha.2"), BumpType::Patch), v("1.2.3"));
    }

    #[test]
    fn test_prerelease_past_target_still_bumps() {
        assert_eq!(apply_bump_to_version(&v("1.2.3-rc.1"), BumpType::Minor), v("1.3.0"));
        assert_eq!(apply_bump_to_version(&v("1.1.0-rc.1"), BumpType::Major), v("2.0.0"));
    }

    #[test]
    fn test_build_metadata_dropped() {
        assert_eq!(apply_bump_to_version(&v("1.0.0+build.5"), BumpType::Patch), v("1.0.1"));
    }

    #[test]
    fn test_latest_uses_semver_precedence() {
        let versions = [v("0.9.0"), v("0.10.0"), v("0.10.0-rc.1")];
        assert_eq!(latest_version(&versions), Some(&v("0.10.0")));
    }

    #[test]
    fn test_no_base_version() {
        let versions: Vec<Version> = Vec::new();
        assert_eq!(calculate_next_version(&versions, BumpType::Patch), v("0.0.1"));
    }
}
