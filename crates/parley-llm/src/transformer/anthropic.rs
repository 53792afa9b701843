use serde_json::{json, Value};

use super::{expect_object, text_at, SchemaTransformer};
use crate::auth::AuthScheme;
use crate::error::ConversionError;
use crate::provider::CompletionRequest;

/// Anthropic Messages API
#[derive(Debug, Default, Clone)]
pub struct AnthropicTransformer;

impl SchemaTransformer for AnthropicTransformer {
    fn provider_id(&self) -> &str {
        "claude"
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::Header("x-api-key")
    }

    fn extra_headers(&self) -> &'static [(&'static str, &'static str)] {
        &[("anthropic-version", "2023-06-01")]
    }

    fn endpoint(&self, base_url: &str, _model: &str) -> String {
        format!("{}/messages", base_url)
    }

    fn transform_request(&self, request: &CompletionRequest, model: &str) -> Value {
        json!({
            "model": model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": [{ "role": "user", "content": request.prompt }],
        })
    }

    fn parse_response(&self, data: &Value) -> Result<Option<String>, ConversionError> {
        expect_object(data)?;
        Ok(text_at(data, "/content/0/text"))
    }
}
