use std::collections::VecDeque;

use crate::models::ConversationTurn;

/// Fixed-capacity rolling window of turns, oldest first
#[derive(Debug, Clone)]
pub struct ConversationBuffer {
    capacity: usize,
    turns: VecDeque<ConversationTurn>,
}

impl ConversationBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            turns: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a turn, evicting the oldest once full
    pub fn push(&mut self, turn: ConversationTurn) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// The last `k` turns in chronological order
    pub fn recent(&self, k: usize) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter().skip(self.turns.len().saturating_sub(k))
    }

    pub fn render_recent(&self, k: usize, agent_name: &str) -> String {
        self.recent(k)
            .map(|turn| turn.render(agent_name))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
