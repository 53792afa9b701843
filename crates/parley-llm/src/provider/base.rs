use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ConversionError, LLMError, Result};
use crate::provider::{AuthConfig, Completion, CompletionRequest, LLMProvider, ProviderConfig, ProviderProfile};
use crate::transformer::SchemaTransformer;

/// Base provider implementation
/// Handles common HTTP functionality and delegates schema transformation
pub struct BaseProvider<T: SchemaTransformer> {
    config: ProviderConfig,
    http_client: Client,
    transformer: T,
    profile: ProviderProfile,
}

impl<T: SchemaTransformer> BaseProvider<T> {
    /// Create a new base provider
    ///
    /// No transport-level retries: the gateway owns the retry budget.
    pub fn new(config: ProviderConfig, transformer: T, profile: ProviderProfile) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LLMError::Config(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
            transformer,
            profile,
        })
    }

    /// Get the provider ID
    pub fn provider_id(&self) -> &str {
        self.transformer.provider_id()
    }

    /// Get the config
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str> {
        match &self.config.auth {
            AuthConfig::ApiKey { key } if !key.trim().is_empty() => Ok(key),
            _ => {
                let env = self
                    .config
                    .credential_env
                    .as_deref()
                    .unwrap_or("API key");
                Err(LLMError::Auth(format!("{} not set", env)))
            }
        }
    }

    /// Build request headers
    fn build_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));

        let (name, value) = self.transformer.auth_scheme().header(self.api_key()?)?;
        headers.insert(name, value);

        for &(key, value) in self.transformer.extra_headers() {
            headers.insert(key, header::HeaderValue::from_static(value));
        }

        // Add custom headers from config
        for (key, value) in &self.config.headers {
            let header_name = header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| LLMError::Config(format!("Invalid header name: {}", e)))?;
            let header_value = header::HeaderValue::from_str(value)
                .map_err(|e| LLMError::Config(format!("Invalid header value: {}", e)))?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }

    /// Send a single completion request
    pub async fn send_request(&self, request: &CompletionRequest) -> Result<Completion> {
        let headers = self.build_headers()?;
        let url = self
            .transformer
            .endpoint(self.config.base_url.trim_end_matches('/'), &self.config.model);
        let body = self.transformer.transform_request(request, &self.config.model);

        debug!(provider = self.provider_id(), model = %self.config.model, "Sending completion request");

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(provider = self.provider_id(), "Provider returned 429");
            return Ok(Completion::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let raw = response.text().await?;
        let data: Value = serde_json::from_str(&raw).map_err(ConversionError::from)?;

        let text = self.transformer.parse_response(&data)?;
        Ok(Completion::from_text(text))
    }
}

#[async_trait]
impl<T: SchemaTransformer + 'static> LLMProvider for BaseProvider<T> {
    fn provider_id(&self) -> &str {
        self.provider_id()
    }

    fn profile(&self) -> &ProviderProfile {
        &self.profile
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        self.send_request(request).await
    }

    async fn validate(&self) -> Result<()> {
        // a usable credential is all that can be checked without spending quota
        let _ = self.build_headers()?;
        Ok(())
    }
}
