//! Single entry point for text generation
//!
//! Wraps the active provider with quota accounting, admission control,
//! optional search enrichment and a bounded retry policy. Every outcome except
//! a configuration fault comes back as a string fit to show the user.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::{LLMError, Result};
use crate::provider::{Completion, CompletionRequest, LLMProvider};
use crate::rate_limit::RateLimiter;
use crate::search::SearchAugmenter;
use crate::usage::UsageTracker;

/// Replies used when no model text is available
pub mod fallback {
    pub const RATE_LIMITED: &str = "Whoa, slow down a bit! Give me a sec and try again 😅";
    pub const TIMED_OUT: &str = "Taking too long to think... try asking again!";
    pub const FAILED: &str = "Oops, something went wrong on my end. Try again?";
    pub const EMPTY: &str = "Could you rephrase that?";
    pub const UNAVAILABLE: &str = "Having some trouble right now. Give me a moment!";
}

/// One generation call
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Raw user text, used only to decide on search
    pub user_message: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub enable_search: bool,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            user_message: String::new(),
            max_tokens: 350,
            temperature: 0.9,
            timeout: Duration::from_secs(30),
            enable_search: true,
        }
    }

    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = message.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_search(mut self, enabled: bool) -> Self {
        self.enable_search = enabled;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Pause after a 429
    pub rate_limit_backoff: Duration,
    /// Pause after a timeout or other failure
    pub error_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            rate_limit_backoff: Duration::from_secs(3),
            error_backoff: Duration::from_secs(1),
        }
    }
}

pub struct ProviderGateway {
    provider: Arc<dyn LLMProvider>,
    usage: Arc<UsageTracker>,
    limiter: Arc<RateLimiter>,
    augmenter: Option<SearchAugmenter>,
    agent_marker: String,
    policy: RetryPolicy,
}

impl ProviderGateway {
    /// Gateway with usage tracking and rate limiting sized from the provider's profile
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        let usage = Arc::new(UsageTracker::new(provider.profile()));
        let limiter = Arc::new(RateLimiter::for_profile(provider.profile()));

        Self {
            provider,
            usage,
            limiter,
            augmenter: None,
            agent_marker: String::new(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_usage_tracker(mut self, usage: Arc<UsageTracker>) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Enable search enrichment, splicing results before `agent_marker`
    pub fn with_search(mut self, augmenter: SearchAugmenter, agent_marker: impl Into<String>) -> Self {
        self.augmenter = Some(augmenter);
        self.agent_marker = agent_marker.into();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    pub fn usage(&self) -> &Arc<UsageTracker> {
        &self.usage
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Generate a reply.
    ///
    /// Returns `Err` only for configuration faults such as a missing credential.
    pub async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let mut prompt = request.prompt;

        if request.enable_search && !request.user_message.trim().is_empty() {
            if let Some(augmenter) = &self.augmenter {
                prompt = augmenter
                    .augment(&prompt, &request.user_message, &self.agent_marker)
                    .await;
            }
        }

        let usage = self.usage.log_request();
        debug!(
            daily_used = usage.daily_used,
            daily_remaining = usage.daily_remaining,
            minute_remaining = usage.minute_remaining,
            "Request counted"
        );

        self.limiter.acquire().await;

        let completion_request = CompletionRequest {
            prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            timeout: request.timeout,
        };

        let provider_name = self.provider.profile().display_name.clone();
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let last_attempt = attempt == max_attempts;

            let outcome = match tokio::time::timeout(
                request.timeout,
                self.provider.complete(&completion_request),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(LLMError::Timeout(format!(
                    "no response within {:?}",
                    request.timeout
                ))),
            };

            match outcome {
                Ok(Completion::Text(text)) => return Ok(text),
                Ok(Completion::Empty) => return Ok(fallback::EMPTY.to_string()),
                Ok(Completion::RateLimited) => {
                    if last_attempt {
                        return Ok(fallback::RATE_LIMITED.to_string());
                    }
                    info!("Rate limit hit, waiting {:?}", self.policy.rate_limit_backoff);
                    tokio::time::sleep(self.policy.rate_limit_backoff).await;
                }
                Err(e) if e.is_fatal() => {
                    error!("Configuration error with {}: {}", provider_name, e);
                    return Err(e);
                }
                Err(e) if e.is_timeout() => {
                    if last_attempt {
                        return Ok(fallback::TIMED_OUT.to_string());
                    }
                    warn!("Timeout, retrying once");
                    tokio::time::sleep(self.policy.error_backoff).await;
                }
                Err(e) => {
                    error!("Error with {}: {}", provider_name, e);
                    if last_attempt {
                        return Ok(fallback::FAILED.to_string());
                    }
                    tokio::time::sleep(self.policy.error_backoff).await;
                }
            }
        }

        Ok(fallback::UNAVAILABLE.to_string())
    }
}
