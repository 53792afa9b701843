//! LLM gateway for Parley
//!
//! Provides a single place to turn a finished prompt into a reply:
//! - provider abstraction over Gemini, Claude, Groq and Cohere
//! - per-process usage accounting and sliding-window rate limiting
//! - optional web search enrichment
//! - bounded retry with user-facing fallback replies

pub mod auth;
pub mod error;
pub mod gateway;
pub mod provider;
pub mod providers;
pub mod rate_limit;
pub mod search;
pub mod transformer;
pub mod usage;

pub use error::{ConversionError, LLMError, Result};
pub use gateway::{fallback, GenerateRequest, ProviderGateway, RetryPolicy};
pub use provider::{
    AuthConfig, BaseProvider, Completion, CompletionRequest, LLMProvider, ProviderConfig,
    ProviderKind, ProviderProfile,
};
pub use providers::create_provider;
pub use rate_limit::RateLimiter;
pub use search::{needs_search, NoopSearch, SearchAugmenter, SerperSearch, WebSearch};
pub use transformer::SchemaTransformer;
pub use usage::{UsageSnapshot, UsageTracker};
