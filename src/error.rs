//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("vocabulary error: {0}")]
    Vocabulary(String),

    #[error("not enough vocabulary: {available} pairs loaded, {required} needed")]
    InsufficientVocabulary { available: usize, required: usize },

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("delivery error: {0}")]
    Delivery(String),

    #[error("comms error: {0}")]
    Comms(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
