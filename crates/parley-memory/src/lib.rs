mod buffer;
mod extractor;
mod manager;
mod models;
mod prompt;
mod store;

pub use buffer::ConversationBuffer;
pub use extractor::{should_save_to_memory, FactExtractor};
pub use manager::MemoryManager;
pub use models::{ConversationTurn, Fact, FactMetadata, Speaker, UserFacts};
pub use prompt::{agent_marker, build_prompt};
pub use store::{LocalMemoryStore, MemoryStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("store error: {0}")]
    Store(String),
}

pub type MemoryResult<T> = Result<T, MemoryError>;
