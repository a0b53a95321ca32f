use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectorError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write report '{path}': {source}")]
    Emitter {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("History error: {0}")]
    History(String),

    #[error("Failed to persist history '{path}': {source}")]
    HistoryIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Search cancelled")]
    Cancelled,

    #[error("An unexpected error occurred: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl InspectorError {
    /// Fatal errors abort a search before any file is scanned.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InspectorError::Configuration(_)
                | InspectorError::Pattern { .. }
                | InspectorError::Cancelled
        )
    }
}

pub type Result<T> = std::result::Result<T, InspectorError>;
