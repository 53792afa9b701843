use std::collections::HashMap;
use std::time::Duration;

use super::metadata::ProviderKind;

/// Authentication configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// Static API key
    ApiKey {
        key: String,
    },
    /// No credential configured
    #[default]
    None,
}

/// Provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider ID
    pub provider_id: String,
    /// Base URL for the API
    pub base_url: String,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Model identifier sent to the backend
    pub model: String,
    /// Environment variable the key comes from, used in error messages
    pub credential_env: Option<String>,
    /// HTTP client timeout
    pub timeout: Duration,
    /// Additional headers to include
    pub headers: HashMap<String, String>,
}

impl ProviderConfig {
    /// Create a new provider config
    pub fn new(provider_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            base_url: base_url.into(),
            auth: AuthConfig::None,
            model: String::new(),
            credential_env: None,
            timeout: Duration::from_secs(60),
            headers: HashMap::new(),
        }
    }

    /// Defaults for a known backend: base URL and model
    pub fn for_kind(kind: ProviderKind) -> Self {
        Self::new(kind.id(), kind.default_base_url()).with_model(kind.default_model())
    }

    /// Set API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.auth = AuthConfig::ApiKey { key: key.into() };
        self
    }

    /// Set model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_credential_env(mut self, env: impl Into<String>) -> Self {
        self.credential_env = Some(env.into());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add custom header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}
