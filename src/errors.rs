use thiserror::Error;

/// Raised when a recurrence rule cannot be turned into a supported schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRuleError {
    #[error("recurrence rule is empty")]
    Empty,
    #[error("recurrence rule has no FREQ part")]
    MissingFrequency,
    #[error("unsupported frequency `{0}`")]
    UnsupportedFrequency(String),
    #[error("interval must be a positive integer, got `{0}`")]
    InvalidInterval(String),
    #[error("malformed rule part `{0}`")]
    MalformedPart(String),
    #[error("unsupported rule part `{0}`")]
    UnsupportedPart(String),
    #[error("invalid value `{value}` for {part}")]
    InvalidValue { part: &'static str, value: String },
    #[error("invalid date `{0}`")]
    InvalidDate(String),
    #[error("conflicting rule parts: {0}")]
    Conflict(&'static str),
}

/// Error type that captures snapshot and configuration persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid reference: {0}")]
    InvalidRef(String),
}
