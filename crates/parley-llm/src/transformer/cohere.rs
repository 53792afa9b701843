use serde_json::{json, Value};

use super::{expect_object, text_at, SchemaTransformer};
use crate::auth::AuthScheme;
use crate::error::ConversionError;
use crate::provider::CompletionRequest;

/// Cohere v1 chat
#[derive(Debug, Default, Clone)]
pub struct CohereTransformer;

impl SchemaTransformer for CohereTransformer {
    fn provider_id(&self) -> &str {
        "cohere"
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::Bearer
    }

    fn endpoint(&self, base_url: &str, _model: &str) -> String {
        format!("{}/chat", base_url)
    }

    fn transform_request(&self, request: &CompletionRequest, model: &str) -> Value {
        json!({
            "model": model,
            "message": request.prompt,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        })
    }

    fn parse_response(&self, data: &Value) -> Result<Option<String>, ConversionError> {
        expect_object(data)?;
        Ok(text_at(data, "/text"))
    }
}
