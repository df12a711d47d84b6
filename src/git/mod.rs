//! Local git operations via the `git` binary.

pub mod local;

pub use local::{DEFAULT_RANGE, LocalGit};
