use thiserror::Error;

/// Unified error type for LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("api error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("transform error: {0}")]
    Transform(#[from] ConversionError),

    #[error("config error: {0}")]
    Config(String),

    #[error("provider not found: {0}")]
    ProviderNotFound(String),
}

impl LLMError {
    /// Configuration-class errors: never retried, never masked by a fallback reply.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LLMError::Auth(_) | LLMError::Config(_) | LLMError::ProviderNotFound(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LLMError::Timeout(_))
    }
}

impl From<reqwest::Error> for LLMError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LLMError::Timeout(e.to_string())
        } else {
            LLMError::Network(e.to_string())
        }
    }
}

/// Error while decoding a provider response
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, LLMError>;
