use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
    #[error("Template error: {0}")]
    FormatError(#[from] FormatError),
    #[error("Backend error: {0}")]
    BackendError(#[from] BackendError),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, AssistantError>;

/// Raised when a template cannot be filled from the supplied fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("template `{template}` references field `{field}` which was not supplied")]
    MissingField { template: String, field: String },
    #[error("template `{template}` has an unbalanced brace at byte {position}")]
    UnbalancedBrace { template: String, position: usize },
}

/// Every way a single backend call can fail. All of them end the action with
/// its error template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("backend answered with status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    MalformedResponse(String),
}

/// Failures of best-effort side channels. Logged, never shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SideEffectError {
    #[error("challenge delivery failed: {0}")]
    Delivery(String),
    #[error("speech synthesis failed: {0}")]
    Speech(String),
}
