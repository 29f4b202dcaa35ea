//! Unified error type for the stevedore workspace.
//!
//! Resolver and inspector failures surface as their own variants; the
//! assembler wraps them in [`StevedoreError::Service`] so callers know which
//! service failed.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum StevedoreError {
    /// A required input is missing or malformed.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the invalid input.
        message: String,
    },

    /// A filesystem path could not be resolved.
    #[error("cannot resolve path {path}: {source}")]
    Path {
        /// Path that failed to resolve.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The directory is not inside a git working tree.
    #[error("{path} is not inside a git repository")]
    NotARepository {
        /// Directory that was inspected.
        path: PathBuf,
    },

    /// The current branch does not track a remote.
    #[error("branch {branch} has no remote configured")]
    NoRemoteConfigured {
        /// Branch that was inspected.
        branch: String,
    },

    /// A path could not be expressed relative to its repository root.
    #[error("cannot resolve {path} against a repository root: {message}")]
    RepositoryResolution {
        /// Path that failed to resolve.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// The `git` executable is not available on `PATH`.
    #[error("git is not installed; supply --build-repo and --build-branch or install git")]
    SourceControlUnavailable,

    /// `HEAD` does not point at a branch.
    #[error("HEAD in {path} is detached; check out a branch to create a build")]
    DetachedHead {
        /// Directory that was inspected.
        path: PathBuf,
    },

    /// A subprocess could not be spawned or exited unsuccessfully.
    #[error("`{program} {args}` failed: {message}")]
    Command {
        /// Program that was invoked.
        program: String,
        /// Space-joined arguments.
        args: String,
        /// Captured stderr or spawn error.
        message: String,
    },

    /// An object refers to a name no object in the graph carries.
    #[error("{kind} {name} references missing {target}")]
    UnresolvedReference {
        /// Kind of the referring object.
        kind: &'static str,
        /// Name of the referring object.
        name: String,
        /// Description of the missing target.
        target: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// Converting a single service failed.
    #[error("service {service}: {source}")]
    Service {
        /// Name of the service being converted.
        service: String,
        /// Originating failure.
        source: Box<StevedoreError>,
    },
}

impl StevedoreError {
    /// Wraps `self` with the name of the service being converted.
    #[must_use]
    pub fn for_service(self, service: impl Into<String>) -> Self {
        Self::Service {
            service: service.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through service context.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Service { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StevedoreError>;
