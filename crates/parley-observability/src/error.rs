//! Observability error types

/// Observability error
#[derive(Debug, thiserror::Error, Clone)]
pub enum ObservabilityError {
    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Details
        message: String,
    },

    /// Logging setup failed
    #[error("Logging error: {message}")]
    Logging {
        /// Details
        message: String,
    },
}

impl ObservabilityError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a logging error
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }
}

/// Observability result type
pub type Result<T> = std::result::Result<T, ObservabilityError>;
