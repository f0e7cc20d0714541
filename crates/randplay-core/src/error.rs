use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot grant access to '{path}': {reason}")]
    GrantCreation { path: PathBuf, reason: String },

    #[error("grant for '{path}' is stale: {reason}")]
    StaleGrant { path: PathBuf, reason: String },

    #[error("the file index is empty")]
    EmptyIndex,

    #[error("failed to launch '{handler}' with '{file}': {reason}")]
    Launch {
        handler: PathBuf,
        file: PathBuf,
        reason: String,
    },

    #[error("access scope for '{path}': {reason}")]
    Scope { path: PathBuf, reason: String },

    #[error("an indexing run is already in flight")]
    Busy,

    #[error("indexing run was cancelled")]
    Cancelled,

    #[error("no file has been executed yet")]
    NothingExecuted,

    #[error("no delete confirmation is pending")]
    NoPendingDelete,

    #[error("grant token error: {0}")]
    Token(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Other(String),
}
