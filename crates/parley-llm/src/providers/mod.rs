//! Concrete providers and the factory that picks one

use std::sync::Arc;

use crate::error::Result;
use crate::provider::{BaseProvider, LLMProvider, ProviderConfig, ProviderKind};
use crate::transformer::{AnthropicTransformer, CohereTransformer, GeminiTransformer, OpenAiTransformer};

pub type GeminiProvider = BaseProvider<GeminiTransformer>;
pub type ClaudeProvider = BaseProvider<AnthropicTransformer>;
pub type GroqProvider = BaseProvider<OpenAiTransformer>;
pub type CohereProvider = BaseProvider<CohereTransformer>;

/// Build the provider for `kind`. The profile's model follows `config.model`.
pub fn create_provider(kind: ProviderKind, config: ProviderConfig) -> Result<Arc<dyn LLMProvider>> {
    let profile = kind.profile().with_model(config.model.clone());

    let provider: Arc<dyn LLMProvider> = match kind {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(config, GeminiTransformer, profile)?),
        ProviderKind::Claude => Arc::new(ClaudeProvider::new(config, AnthropicTransformer, profile)?),
        ProviderKind::Groq => Arc::new(GroqProvider::new(config, OpenAiTransformer::default(), profile)?),
        ProviderKind::Cohere => Arc::new(CohereProvider::new(config, CohereTransformer, profile)?),
    };

    Ok(provider)
}
