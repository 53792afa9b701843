use serde_json::{json, Value};

use super::{expect_object, text_at, SchemaTransformer};
use crate::auth::AuthScheme;
use crate::error::ConversionError;
use crate::provider::CompletionRequest;

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Google Generative Language `generateContent`
#[derive(Debug, Default, Clone)]
pub struct GeminiTransformer;

impl SchemaTransformer for GeminiTransformer {
    fn provider_id(&self) -> &str {
        "gemini"
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::Header("x-goog-api-key")
    }

    fn endpoint(&self, base_url: &str, model: &str) -> String {
        format!("{}/models/{}:generateContent", base_url, model)
    }

    fn transform_request(&self, request: &CompletionRequest, _model: &str) -> Value {
        let safety_settings: Vec<Value> = SAFETY_CATEGORIES
            .iter()
            .map(|category| json!({ "category": category, "threshold": "BLOCK_ONLY_HIGH" }))
            .collect();

        json!({
            "contents": [{ "parts": [{ "text": request.prompt }] }],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens,
                "topP": 0.95,
                "topK": 40,
            },
            "safetySettings": safety_settings,
        })
    }

    fn parse_response(&self, data: &Value) -> Result<Option<String>, ConversionError> {
        expect_object(data)?;
        // blocked prompts come back with no candidates
        Ok(text_at(data, "/candidates/0/content/parts/0/text"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let mut request = CompletionRequest::new("hello");
        request.max_tokens = 120;
        let body = GeminiTransformer.transform_request(&request, "gemini-2.0-flash-exp");

        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 120);
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(body["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(body["safetySettings"][0]["threshold"], "BLOCK_ONLY_HIGH");
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            GeminiTransformer.endpoint("https://example.test/v1beta", "gemini-x"),
            "https://example.test/v1beta/models/gemini-x:generateContent"
        );
    }

    #[test]
    fn test_parse_response() {
        let data = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hey there" }] } }]
        });
        assert_eq!(
            GeminiTransformer.parse_response(&data).unwrap(),
            Some("Hey there".to_string())
        );

        let blocked = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert_eq!(GeminiTransformer.parse_response(&blocked).unwrap(), None);

        assert!(GeminiTransformer.parse_response(&json!("nope")).is_err());
    }
}
