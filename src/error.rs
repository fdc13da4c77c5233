use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the quiz store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("category '{0}' does not exist")]
    UnknownCategory(String),

    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("invalid category name '{0}': use lowercase letters, digits and underscores")]
    InvalidCategoryName(String),

    #[error("invalid question: {0}")]
    InvalidQuestion(#[from] QuestionError),

    #[error("quiz file {path} is corrupt: {reason}")]
    StorageCorrupt { path: PathBuf, reason: String },

    #[error("no question available in '{0}' or in the fallback category")]
    EmptyStore(String),

    #[error("failed to access quiz file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A question field that can't be posted as a quiz poll.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct QuestionError {
    pub field: &'static str,
    pub reason: String,
}

/// Failures that abort a single dispatch before anything is sent.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("correct option '{correct}' is not one of the options of '{question}'")]
    OptionNotFound { question: String, correct: String },

    #[error("'{question}' has {count} options, more than a poll can carry")]
    TooManyOptions { question: String, count: usize },
}

/// A failed send to one recipient. Logged by the dispatcher, never propagated.
#[derive(Error, Debug)]
#[error("failed to deliver quiz to {recipient}: {reason}")]
pub struct DeliveryError {
    pub recipient: String,
    pub reason: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} should be set")]
    Missing(&'static str),

    #[error("{key} can't be parsed: {reason}")]
    Invalid { key: &'static str, reason: String },
}
