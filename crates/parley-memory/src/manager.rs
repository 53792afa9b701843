use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use crate::buffer::ConversationBuffer;
use crate::extractor::{should_save_to_memory, FactExtractor};
use crate::models::{ConversationTurn, FactMetadata, Speaker};
use crate::store::MemoryStore;
use crate::MemoryResult;

const DEFAULT_BUFFER_CAPACITY: usize = 8;
const DEFAULT_RECENT_WINDOW: usize = 6;
const DEFAULT_MIN_RECALL_CHARS: usize = 8;

/// Two-tier conversational memory: a rolling buffer per user plus long-term facts
pub struct MemoryManager {
    store: Arc<dyn MemoryStore>,
    buffers: DashMap<String, ConversationBuffer>,
    extractor: FactExtractor,
    buffer_capacity: usize,
    recent_window: usize,
    min_recall_chars: usize,
    agent_name: String,
}

impl MemoryManager {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self {
            store,
            buffers: DashMap::new(),
            extractor: FactExtractor,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            recent_window: DEFAULT_RECENT_WINDOW,
            min_recall_chars: DEFAULT_MIN_RECALL_CHARS,
            agent_name: "Parley".to_string(),
        }
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self.recent_window = self.recent_window.min(self.buffer_capacity);
        self
    }

    /// Turns shown as recent context; clamped to the buffer capacity
    pub fn with_recent_window(mut self, window: usize) -> Self {
        self.recent_window = window.min(self.buffer_capacity);
        self
    }

    pub fn with_min_recall_chars(mut self, min_chars: usize) -> Self {
        self.min_recall_chars = min_chars;
        self
    }

    /// Label used for agent turns in rendered context
    pub fn with_agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = name.into();
        self
    }

    pub fn store(&self) -> &Arc<dyn MemoryStore> {
        &self.store
    }

    /// Record a turn. User turns worth remembering are mined for facts;
    /// returns the facts the store accepted.
    pub async fn save_interaction(
        &self,
        user_id: &str,
        text: &str,
        turn_id: u64,
        speaker: Speaker,
    ) -> MemoryResult<Vec<String>> {
        self.buffers
            .entry(user_id.to_string())
            .or_insert_with(|| ConversationBuffer::new(self.buffer_capacity))
            .push(ConversationTurn::new(speaker, text));

        if speaker != Speaker::User || !should_save_to_memory(text) {
            return Ok(Vec::new());
        }

        let mut saved = Vec::new();
        for fact in self.extractor.extract(text) {
            if fact.trim().is_empty() {
                continue;
            }
            if self.store.add(user_id, &fact, FactMetadata::user(turn_id)).await? {
                info!("Saved to memory: {}", fact);
                saved.push(fact);
            }
        }

        Ok(saved)
    }

    /// Last few turns as `"Speaker: text"` lines, oldest first
    pub fn get_recent_context(&self, user_id: &str) -> String {
        self.buffers
            .get(user_id)
            .map(|buffer| buffer.render_recent(self.recent_window, &self.agent_name))
            .unwrap_or_default()
    }

    /// Relevant long-term facts as `"- fact"` lines
    pub async fn recall_context(&self, user_id: &str, query: &str, top_k: usize) -> MemoryResult<String> {
        let memories = self.store.query(user_id, query, top_k).await?;

        let mut lines: Vec<String> = Vec::new();
        for memory in memories.iter().take(top_k) {
            let clean = memory.trim();
            if clean.chars().count() <= self.min_recall_chars {
                continue;
            }
            let line = format!("- {}", clean);
            if !lines.contains(&line) {
                lines.push(line);
            }
        }

        Ok(lines.join("\n"))
    }

    /// Forget the short-term buffer. Long-term facts are kept.
    pub fn clear_session(&self, user_id: &str) {
        if let Some(mut buffer) = self.buffers.get_mut(user_id) {
            buffer.clear();
        }
    }

    pub fn buffered_turns(&self, user_id: &str) -> Vec<ConversationTurn> {
        self.buffers
            .get(user_id)
            .map(|buffer| buffer.turns().cloned().collect())
            .unwrap_or_default()
    }
}
