use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ConversationTurn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }

    /// `"User: text"` or `"{agent_name}: text"`
    pub fn render(&self, agent_name: &str) -> String {
        let label = match self.speaker {
            Speaker::User => "User",
            Speaker::Agent => agent_name,
        };
        format!("{}: {}", label, self.text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FactMetadata {
    pub turn_id: u64,
    pub role: String,
    pub timestamp: String,
}

impl FactMetadata {
    /// Metadata for a fact taken from a user turn, stamped now
    pub fn user(turn_id: u64) -> Self {
        Self {
            turn_id,
            role: "user".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fact {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub metadata: FactMetadata,
}

impl Fact {
    pub fn new(user_id: impl Into<String>, text: impl Into<String>, metadata: FactMetadata) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            text: text.into(),
            metadata,
        }
    }
}

/// Everything remembered about one user, as persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFacts {
    pub user_id: String,
    #[serde(default)]
    pub facts: Vec<Fact>,
    pub updated_at: String,
}

impl UserFacts {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            facts: Vec::new(),
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
