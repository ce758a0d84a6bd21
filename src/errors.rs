//! Error taxonomy for the version control core
//!
//! Every kind a caller may want to react to is a variant here. The
//! variants travel inside `anyhow::Error`, so call sites keep plain
//! `anyhow::Result` and `?`; layers that care (the CLI, status) can
//! `downcast_ref::<GitError>()` to branch on the kind.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("not a git repository (or any of the parent directories): {}", .0.display())]
    NotARepository(PathBuf),

    #[error("unsupported repositoryformatversion: {0}")]
    UnsupportedFormatVersion(String),

    #[error("{0} is not empty")]
    NotEmpty(PathBuf),

    #[error("no such reference {0}")]
    NotFound(String),

    #[error("ambiguous reference {name}: candidates are {candidates:?}")]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },

    #[error("malformed {0}")]
    Malformed(String),

    #[error("unknown object type {0}")]
    UnknownKind(String),

    #[error("user name and email not configured")]
    NoIdentity,

    #[error("circular symbolic reference through {0}")]
    CircularRef(String),
}

impl GitError {
    /// True when an error chain bottoms out in `NotFound`.
    ///
    /// Used by callers that treat a missing name as an empty result
    /// (status against an unborn HEAD, the initial commit's parent).
    pub fn is_not_found(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<GitError>(), Some(GitError::NotFound(_)))
    }
}
