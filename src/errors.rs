use thiserror::Error;

/// Typed error hierarchy for deskbot.
///
/// Use at module boundaries (provider calls, tool execution, config validation,
/// the memory store). Internal/leaf functions can continue using
/// `anyhow::Result`; the `Internal` variant allows seamless conversion via
/// the `?` operator.
#[derive(Debug, Error)]
pub enum DeskbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {message}")]
    Provider { message: String, retryable: bool },

    #[error("Tool error: {tool}: {message}")]
    Tool { tool: String, message: String },

    #[error("Memory error: {0}")]
    Memory(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience alias for results using DeskbotError.
pub type DeskbotResult<T> = std::result::Result<T, DeskbotError>;

impl DeskbotError {
    /// Whether this error is retryable (transient provider errors).
    pub fn is_retryable(&self) -> bool {
        match self {
            DeskbotError::Provider { retryable, .. } => *retryable,
            _ => false,
        }
    }
}
