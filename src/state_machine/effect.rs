//! Effects produced by state transitions

use super::state::PendingExchange;
use crate::language::Language;
use crate::llm::CitationSource;
use crate::runtime::UiEvent;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Push an event to the display surface
    Notify(UiEvent),

    /// Broadcast the new state
    PublishState,

    /// Start the completion client for this exchange (background task)
    RequestCompletion { exchange: PendingExchange },

    /// Abort the in-flight completion
    AbortCompletion,

    /// Start ticking the reveal timer
    StartRevealTimer,

    /// Stop the reveal timer
    StopRevealTimer,

    /// Append the (user, model) pair to the transcript
    CommitExchange { user_text: String, model_text: String },

    /// Drop all transcript turns
    ClearTranscript,

    /// Record the active response language
    SetLanguage(Language),
}

impl Effect {
    pub fn set_input_enabled(enabled: bool) -> Self {
        Effect::Notify(UiEvent::InputEnabled { enabled })
    }

    pub fn show_greeting(language: Language) -> Self {
        Effect::Notify(UiEvent::Greeting {
            language,
            text: language.greeting().to_string(),
        })
    }

    pub fn show_sources(sources: Vec<CitationSource>) -> Self {
        Effect::Notify(UiEvent::Sources { sources })
    }
}
