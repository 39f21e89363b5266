//! Change-set providers. Currently only local git repositories.

pub mod local_git;

pub use local_git::{BranchList, LocalGitError, LocalGitSource};
