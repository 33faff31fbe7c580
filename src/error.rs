use thiserror::Error;

/// Failures raised while turning a template into records.
///
/// Every variant is fatal: the run aborts before the first record is written.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The template token stream is malformed.
    #[error("Template parse error at token {position}: {message}")]
    Parse { position: usize, message: String },

    /// A ratio, record count, or value range cannot be satisfied.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The string generator rejected a `str` pattern.
    #[error("Cannot generate strings for pattern '{pattern}': {message}")]
    Generation { pattern: String, message: String },
}

impl GenerateError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        GenerateError::Parse {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        GenerateError::Configuration(message.into())
    }
}
