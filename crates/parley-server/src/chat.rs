//! One conversational turn, end to end

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, warn, Instrument};

use parley_config::Config;
use parley_llm::{GenerateRequest, ProviderGateway};
use parley_memory::{build_prompt, MemoryManager, Speaker};
use parley_observability::create_turn_span;

use crate::error::AppError;

/// Per-turn generation knobs
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub agent_name: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub recall_top_k: usize,
    pub enable_search: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            agent_name: "Parley".to_string(),
            max_tokens: 350,
            temperature: 0.9,
            timeout: Duration::from_secs(30),
            recall_top_k: 5,
            enable_search: true,
        }
    }
}

impl From<&Config> for ChatSettings {
    fn from(config: &Config) -> Self {
        Self {
            agent_name: config.agent.name.clone(),
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
            timeout: Duration::from_secs(config.llm.timeout_seconds),
            recall_top_k: config.memory.recall_top_k,
            enable_search: config.search.enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    pub turn_id: u64,
}

pub struct ChatService {
    gateway: Arc<ProviderGateway>,
    memory: Arc<MemoryManager>,
    turns: DashMap<String, u64>,
    settings: ChatSettings,
}

impl ChatService {
    pub fn new(gateway: Arc<ProviderGateway>, memory: Arc<MemoryManager>, settings: ChatSettings) -> Self {
        Self {
            gateway,
            memory,
            turns: DashMap::new(),
            settings,
        }
    }

    pub fn gateway(&self) -> &Arc<ProviderGateway> {
        &self.gateway
    }

    pub fn memory(&self) -> &Arc<MemoryManager> {
        &self.memory
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Next turn id for `user_id`, counting from 1
    fn next_turn(&self, user_id: &str) -> u64 {
        let mut turn = self.turns.entry(user_id.to_string()).or_insert(0);
        *turn += 1;
        *turn
    }

    /// Remember the message, recall context, generate and remember the reply
    pub async fn handle_message(&self, user_id: &str, message: &str) -> Result<ChatReply, AppError> {
        let turn_id = self.next_turn(user_id);
        let span = create_turn_span(user_id, turn_id);

        async move {
            // store failures degrade to a reply without long-term memory
            match self
                .memory
                .save_interaction(user_id, message, turn_id, Speaker::User)
                .await
            {
                Ok(saved) => debug!(facts = saved.len(), "User turn recorded"),
                Err(e) => warn!("Failed to store facts for {}: {}", user_id, e),
            }

            let recalled = self
                .memory
                .recall_context(user_id, message, self.settings.recall_top_k)
                .await
                .unwrap_or_else(|e| {
                    warn!("Recall failed for {}: {}", user_id, e);
                    String::new()
                });
            let recent = self.memory.get_recent_context(user_id);

            let prompt = build_prompt(&self.settings.agent_name, user_id, &recent, &recalled, message);

            let request = GenerateRequest::new(prompt)
                .with_user_message(message)
                .with_max_tokens(self.settings.max_tokens)
                .with_temperature(self.settings.temperature)
                .with_timeout(self.settings.timeout)
                .with_search(self.settings.enable_search);
            let reply = self.gateway.generate(request).await?;

            if let Err(e) = self
                .memory
                .save_interaction(user_id, &reply, turn_id, Speaker::Agent)
                .await
            {
                warn!("Failed to record reply for {}: {}", user_id, e);
            }

            Ok::<_, AppError>(ChatReply { reply, turn_id })
        }
        .instrument(span)
        .await
    }

    /// Drop the user's short-term context. Facts and the turn counter stay.
    pub fn reset(&self, user_id: &str) {
        self.memory.clear_session(user_id);
    }
}
