//! Error types for the apprentice crate

use thiserror::Error;

/// Main error type for the apprentice crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("unknown strategy token '{token}' (expected a known prefix with a numeric suffix)")]
    UnknownStrategy { token: String },

    #[error("invalid numeric suffix in strategy token '{token}': {reason}")]
    InvalidStrategyParameter { token: String, reason: String },

    #[error("unknown attention token '{token}'. Expected one of: {expected}")]
    UnknownAttention { token: String, expected: String },

    #[error("unknown initiator '{token}' (expected 'teacher' or 'student')")]
    UnknownInitiator { token: String },

    #[error("feature vector length {got} does not match configured length {expected}")]
    FeatureLengthMismatch { expected: usize, got: usize },

    #[error("action {action} is not in the current legal action set")]
    ActionNotLegal { action: usize },

    #[error("no legal actions available in a non-terminal state")]
    NoLegalActions,

    #[error("no action has been selected for the current decision point")]
    NoSelectedAction,

    #[error("invalid weight file '{path}': {reason}")]
    InvalidWeightFile { path: String, reason: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("learning curve has no points")]
    EmptyCurve,

    #[error("comparison needs at least two samples per group, got {got}")]
    NotEnoughSamples { got: usize },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
