//! Incremental reveal of a fully received answer
//!
//! Purely presentational: one character per tick of a fixed-interval timer.
//! The runtime owns the timer; this type only tracks how far along we are.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Interval between revealed characters
pub const REVEAL_TICK: Duration = Duration::from_millis(25);

/// Progress through one answer. Clones share the text buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reveal {
    text: Arc<str>,
    /// Characters revealed so far
    cursor: usize,
    /// Total characters in `text`
    total: usize,
    /// Byte offset of the next unrevealed character
    #[serde(skip)]
    offset: usize,
}

/// Outcome of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    /// Show this character next
    Append(char),
    /// Everything has been shown
    Finished,
}

impl Reveal {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        let total = text.chars().count();
        Self {
            text,
            cursor: 0,
            total,
            offset: 0,
        }
    }

    pub fn tick(&mut self) -> RevealStep {
        match self.text.get(self.offset..).and_then(|rest| rest.chars().next()) {
            Some(ch) => {
                self.offset += ch.len_utf8();
                self.cursor += 1;
                RevealStep::Append(ch)
            }
            None => RevealStep::Finished,
        }
    }

    /// The full answer, revealed or not
    pub fn text(&self) -> &str {
        &self.text
    }
}
