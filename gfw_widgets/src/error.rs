//! Error types for the widget pipeline.
//!
//! Business-level absence of data is never an error: derivations return
//! `None` instead. These variants cover programmer errors (calendar
//! arithmetic outside the valid range) and the explicit I/O boundaries
//! (configuration and payload loading).

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type for pipeline operations
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid calendar arithmetic: {0}")]
    InvalidCalendar(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::ParseError(e.to_string())
    }
}

impl From<toml::de::Error> for PipelineError {
    fn from(e: toml::de::Error) -> Self {
        PipelineError::ConfigurationError(e.to_string())
    }
}
