//! Events that drive the orchestrator

use crate::completion::Answer;
use crate::language::Language;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserSubmit { text: String, language: Language },
    LanguageChanged { language: Language },
    Cancel,

    // Completion client
    CompletionReady { exchange_id: u64, answer: Answer },

    // Reveal timer
    RevealTick,
}

impl Event {
    pub fn submit(text: impl Into<String>, language: Language) -> Self {
        Event::UserSubmit {
            text: text.into(),
            language,
        }
    }
}
