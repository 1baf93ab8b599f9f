//! Version management and semver bumping.

pub mod bump;

pub use bump::{
    BumpType, INITIAL_VERSION, apply_bump_to_version, calculate_next_version, latest_version,
};
