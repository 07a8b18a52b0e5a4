//! In-memory conversation transcript
//!
//! Turns are only ever added in (user, model) pairs, so the transcript always
//! alternates starting with a user turn.

use crate::llm::Turn;

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed exchange
    pub fn append(&mut self, user_text: impl Into<String>, model_text: impl Into<String>) {
        self.turns.reserve(2);
        self.turns.push(Turn::user(user_text));
        self.turns.push(Turn::model(model_text));
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Read-only view for request construction
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
