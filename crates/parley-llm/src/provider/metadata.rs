use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{LLMError, Result};

/// LLM Provider trait
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Get the provider ID
    fn provider_id(&self) -> &str;

    /// Published limits and model for this backend
    fn profile(&self) -> &ProviderProfile;

    /// Send one completion request.
    ///
    /// A 429 from the backend is reported as [`Completion::RateLimited`], not as an error.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;

    /// Validate the provider configuration
    async fn validate(&self) -> Result<()>;
}

/// Single-prompt completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: 350,
            temperature: 0.9,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Outcome of a completion call that reached the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Non-empty generated text
    Text(String),
    /// The backend answered 429
    RateLimited,
    /// The backend answered but produced no text
    Empty,
}

impl Completion {
    /// Wrap raw text, classifying blank output as [`Completion::Empty`]
    pub fn from_text(text: Option<String>) -> Self {
        match text {
            Some(text) if !text.trim().is_empty() => Completion::Text(text.trim().to_string()),
            _ => Completion::Empty,
        }
    }
}

/// Supported backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Claude,
    Groq,
    Cohere,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Gemini,
        ProviderKind::Claude,
        ProviderKind::Groq,
        ProviderKind::Cohere,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Claude => "claude",
            ProviderKind::Groq => "groq",
            ProviderKind::Cohere => "cohere",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Gemini 2.0 Flash",
            ProviderKind::Claude => "Claude 3.5 Haiku",
            ProviderKind::Groq => "Groq Llama 3.3 70B",
            ProviderKind::Cohere => "Cohere Command R",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-2.0-flash-exp",
            ProviderKind::Claude => "claude-3-5-haiku-20241022",
            ProviderKind::Groq => "llama-3.3-70b-versatile",
            ProviderKind::Cohere => "command-r-08-2024",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ProviderKind::Claude => "https://api.anthropic.com/v1",
            ProviderKind::Groq => "https://api.groq.com/openai/v1",
            ProviderKind::Cohere => "https://api.cohere.ai/v1",
        }
    }

    /// Published quota for this backend, with its default model
    pub fn profile(&self) -> ProviderProfile {
        let (requests_per_minute, requests_per_day, tokens_per_minute) = match self {
            ProviderKind::Gemini => (15, 1_500, 1_000_000),
            ProviderKind::Claude => (50, 100_000, 40_000),
            ProviderKind::Groq => (30, 14_400, 20_000),
            ProviderKind::Cohere => (10, 10_000, 10_000),
        };

        ProviderProfile {
            requests_per_minute,
            requests_per_day,
            tokens_per_minute,
            display_name: self.display_name().to_string(),
            model_id: self.default_model().to_string(),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "claude" | "anthropic" => Ok(ProviderKind::Claude),
            "groq" => Ok(ProviderKind::Groq),
            "cohere" => Ok(ProviderKind::Cohere),
            other => Err(LLMError::ProviderNotFound(other.to_string())),
        }
    }
}

/// Quota and identity of one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderProfile {
    pub requests_per_minute: u32,
    pub requests_per_day: u32,
    /// Informational only; nothing enforces it
    pub tokens_per_minute: u32,
    pub display_name: String,
    pub model_id: String,
}

impl ProviderProfile {
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }
}
