//! Per-vendor request/response shapes
//!
//! A transformer knows how one backend wants its single-prompt request laid out,
//! where to send it and how to authenticate. [`crate::provider::BaseProvider`] does the HTTP.

pub mod anthropic;
pub mod cohere;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicTransformer;
pub use cohere::CohereTransformer;
pub use gemini::GeminiTransformer;
pub use openai::OpenAiTransformer;

use serde_json::Value;

use crate::auth::AuthScheme;
use crate::error::ConversionError;
use crate::provider::CompletionRequest;

/// Schema transformer trait for converting between internal and provider formats
pub trait SchemaTransformer: Send + Sync {
    /// Get the provider ID
    fn provider_id(&self) -> &str;

    /// How the API key is presented
    fn auth_scheme(&self) -> AuthScheme;

    /// Fixed headers the backend requires besides auth
    fn extra_headers(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Full request URL
    fn endpoint(&self, base_url: &str, model: &str) -> String;

    /// Transform request to provider-specific format
    fn transform_request(&self, request: &CompletionRequest, model: &str) -> Value;

    /// Pull the generated text out of a 2xx body. `Ok(None)` means the body had no usable text.
    fn parse_response(&self, data: &Value) -> Result<Option<String>, ConversionError>;
}

/// Read a string at a JSON pointer, if present
pub(crate) fn text_at(data: &Value, pointer: &str) -> Option<String> {
    data.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Reject bodies that are not JSON objects at all
pub(crate) fn expect_object(data: &Value) -> Result<(), ConversionError> {
    if data.is_object() {
        Ok(())
    } else {
        Err(ConversionError::InvalidFormat(format!(
            "expected JSON object, got {}",
            data
        )))
    }
}
