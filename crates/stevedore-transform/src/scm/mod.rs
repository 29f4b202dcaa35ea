//! Source-control introspection.
//!
//! The transformer only ever asks three read-only questions of the
//! repository holding the compose file. They sit behind [`SourceControl`]
//! so tests can answer them without spawning `git`.

pub mod git;

use std::path::{Path, PathBuf};

use stevedore_common::error::Result;

pub use self::git::GitCli;

/// Read-only queries against a working tree.
pub trait SourceControl {
    /// Returns the root of the working tree containing `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`NotARepository`](stevedore_common::error::StevedoreError::NotARepository)
    /// if `dir` is outside any working tree.
    fn repository_root(&self, dir: &Path) -> Result<PathBuf>;

    /// Returns the name of the checked-out branch.
    ///
    /// # Errors
    ///
    /// Returns [`NotARepository`](stevedore_common::error::StevedoreError::NotARepository)
    /// if `dir` is outside any working tree.
    fn current_branch(&self, dir: &Path) -> Result<String>;

    /// Returns the normalized push URL of the current branch's remote.
    ///
    /// # Errors
    ///
    /// Returns [`NotARepository`](stevedore_common::error::StevedoreError::NotARepository)
    /// outside a working tree and
    /// [`NoRemoteConfigured`](stevedore_common::error::StevedoreError::NoRemoteConfigured)
    /// when the branch tracks no remote.
    fn current_remote_url(&self, dir: &Path) -> Result<String>;
}

impl<T: SourceControl + ?Sized> SourceControl for &T {
    fn repository_root(&self, dir: &Path) -> Result<PathBuf> {
        (**self).repository_root(dir)
    }

    fn current_branch(&self, dir: &Path) -> Result<String> {
        (**self).current_branch(dir)
    }

    fn current_remote_url(&self, dir: &Path) -> Result<String> {
        (**self).current_remote_url(dir)
    }
}
