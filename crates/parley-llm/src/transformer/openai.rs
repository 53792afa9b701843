use serde_json::{json, Value};

use super::{expect_object, text_at, SchemaTransformer};
use crate::auth::AuthScheme;
use crate::error::ConversionError;
use crate::provider::CompletionRequest;

/// OpenAI-compatible chat completions, as served by Groq
#[derive(Debug, Clone)]
pub struct OpenAiTransformer {
    provider_id: String,
}

impl OpenAiTransformer {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
        }
    }
}

impl Default for OpenAiTransformer {
    fn default() -> Self {
        Self::new("groq")
    }
}

impl SchemaTransformer for OpenAiTransformer {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::Bearer
    }

    fn endpoint(&self, base_url: &str, _model: &str) -> String {
        format!("{}/chat/completions", base_url)
    }

    fn transform_request(&self, request: &CompletionRequest, model: &str) -> Value {
        json!({
            "model": model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        })
    }

    fn parse_response(&self, data: &Value) -> Result<Option<String>, ConversionError> {
        expect_object(data)?;
        Ok(text_at(data, "/choices/0/message/content"))
    }
}
