//! Web lookup for factual questions
//!
//! Search is best-effort: every failure degrades to "no results" and the
//! prompt goes out unenriched.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{LLMError, Result};

pub const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(8);
const DEFAULT_NUM_RESULTS: usize = 3;
const MAX_ORGANIC_SNIPPETS: usize = 2;

const SEARCH_TRIGGERS: &[&str] = &[
    "do you know about",
    "tell me about",
    "what do you know about",
    "have you heard of",
    "info about",
    "information about",
    "explain",
    "who is",
    "what is",
    "when was",
    "where is",
    "how did",
];

/// Whether a user message reads like a factual lookup
pub fn needs_search(message: &str) -> bool {
    let message = message.trim().to_lowercase();
    SEARCH_TRIGGERS.iter().any(|phrase| message.contains(phrase))
}

/// A web search backend. Implementations return `""` instead of failing.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, num_results: usize) -> String;
}

/// Search disabled
#[derive(Debug, Default, Clone)]
pub struct NoopSearch;

#[async_trait]
impl WebSearch for NoopSearch {
    async fn search(&self, _query: &str, _num_results: usize) -> String {
        String::new()
    }
}

/// Serper (Google results) backend
pub struct SerperSearch {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl SerperSearch {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .map_err(|e| LLMError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            endpoint: SERPER_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn fetch(&self, api_key: &str, query: &str, num_results: usize) -> Result<Option<Value>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .json(&json!({ "q": query, "num": num_results }))
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            debug!("Search returned status {}", response.status());
            return Ok(None);
        }

        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl WebSearch for SerperSearch {
    async fn search(&self, query: &str, num_results: usize) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return String::new();
        };

        match self.fetch(api_key, query, num_results).await {
            Ok(Some(data)) => format_results(&data),
            Ok(None) => String::new(),
            Err(e) => {
                warn!("Search failed: {}", e);
                String::new()
            }
        }
    }
}

/// Render a Serper response: the answer box if any, else up to two organic snippets
pub fn format_results(data: &Value) -> String {
    if let Some(answer_box) = data.get("answerBox").filter(|v| v.is_object()) {
        let snippet = ["answer", "snippet"]
            .iter()
            .filter_map(|key| answer_box.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty());
        if let Some(snippet) = snippet {
            return format!("[Web]: {}\n", snippet);
        }
    }

    let snippets: Vec<String> = data
        .get("organic")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(MAX_ORGANIC_SNIPPETS)
                .filter_map(|item| item.get("snippet").and_then(Value::as_str))
                .filter(|s| !s.is_empty())
                .map(|s| format!("• {}", s))
                .collect()
        })
        .unwrap_or_default();

    if snippets.is_empty() {
        String::new()
    } else {
        format!("[Search Results]:\n{}\n", snippets.join("\n"))
    }
}

/// Insert `results` immediately before the last `marker` in `prompt`.
/// A prompt without the marker is returned unchanged.
pub fn splice_before_marker(prompt: &str, results: &str, marker: &str) -> String {
    match prompt.rfind(marker) {
        Some(idx) => format!("{}{}\n{}", &prompt[..idx], results, &prompt[idx..]),
        None => {
            debug!("Agent marker {:?} not found, skipping search splice", marker);
            prompt.to_string()
        }
    }
}

/// Runs the search heuristic and splices results into prompts
#[derive(Clone)]
pub struct SearchAugmenter {
    searcher: Arc<dyn WebSearch>,
    timeout: Duration,
    num_results: usize,
}

impl SearchAugmenter {
    pub fn new(searcher: Arc<dyn WebSearch>) -> Self {
        Self {
            searcher,
            timeout: SEARCH_TIMEOUT,
            num_results: DEFAULT_NUM_RESULTS,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results;
        self
    }

    /// Search results for `message`, if it triggers a search and one comes back in time
    pub async fn lookup(&self, message: &str) -> Option<String> {
        if !needs_search(message) {
            return None;
        }

        info!("Searching: {}", message);
        match tokio::time::timeout(self.timeout, self.searcher.search(message, self.num_results)).await {
            Ok(results) if !results.trim().is_empty() => Some(results),
            Ok(_) => None,
            Err(_) => {
                warn!("Search timed out after {:?}", self.timeout);
                None
            }
        }
    }

    pub async fn augment(&self, prompt: &str, message: &str, marker: &str) -> String {
        match self.lookup(message).await {
            Some(results) => splice_before_marker(prompt, &results, marker),
            None => prompt.to_string(),
        }
    }
}
