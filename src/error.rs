use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a git repository (or any of the parent directories): {0}")]
    NotARepository(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("aborted: no git remotes found")]
    NoRemotesConfigured,

    #[error("fetch from '{remote}' failed: {source}")]
    Fetch {
        remote: String,
        #[source]
        source: git2::Error,
    },

    #[error("unknown revision or path not in the working tree: {0}")]
    UnknownRevision(String),

    #[error("aborted: default branch '{0}' does not resolve")]
    DefaultBranchUnresolved(String),

    #[error("not a fast-forward: '{branch}' is not an ancestor of '{target}'")]
    NotFastForward { branch: String, target: String },

    #[error("'{branch}' is not fully merged into '{target}'")]
    NotMerged { branch: String, target: String },

    #[error("'{0}' is checked out")]
    CheckedOut(String),

    #[error("no branch '{0}' to check out")]
    NoSuchBranch(String),
}

pub type Result<T> = std::result::Result<T, Error>;
