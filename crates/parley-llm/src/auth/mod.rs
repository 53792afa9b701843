use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};

use crate::error::{LLMError, Result};

/// How a backend expects its API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// Raw key in a vendor header, e.g. `x-api-key`
    Header(&'static str),
}

impl AuthScheme {
    /// Build the auth header for `api_key`
    pub fn header(&self, api_key: &str) -> Result<(HeaderName, HeaderValue)> {
        let (name, value) = match self {
            AuthScheme::Bearer => (AUTHORIZATION, format!("Bearer {}", api_key)),
            AuthScheme::Header(name) => (
                HeaderName::from_static(name),
                api_key.to_string(),
            ),
        };

        let mut value = HeaderValue::from_str(&value)
            .map_err(|e| LLMError::Config(format!("Invalid API key: {}", e)))?;
        value.set_sensitive(true);

        Ok((name, value))
    }
}
