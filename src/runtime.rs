//! Runtime for a chat session
//!
//! One task owns the orchestrator state, the transcript and the reveal timer.
//! Everything else talks to it through a `ChatHandle`.

mod executor;
pub mod traits;


pub use executor::ChatRuntime;
pub use traits::*;

use crate::language::Language;
use crate::llm::CitationSource;
use crate::state_machine::{ChatContext, Event};
use tokio::sync::{broadcast, mpsc};

/// Events pushed to the display surface
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Greeting for the newly active language
    Greeting { language: Language, text: String },
    /// Echo of the accepted submission
    UserMessage { text: String },
    /// Interim placeholder while the request is outstanding
    Typing { text: String },
    /// The placeholder is about to be replaced by revealed text
    AnswerStarted,
    AnswerChunk { ch: char },
    Sources { sources: Vec<CitationSource> },
    AnswerFinished,
    InputEnabled { enabled: bool },
    Cancelled,
    /// Full state as JSON (e.g. `{"type":"requesting","exchange":{...}}`)
    StateChange { state: serde_json::Value },
    /// Number of turns now held in the transcript
    TranscriptChanged { turns: usize },
}

/// Handle to interact with a running chat session
#[derive(Clone)]
pub struct ChatHandle {
    event_tx: mpsc::Sender<Event>,
}

impl ChatHandle {
    /// Start a runtime around `completer` on the tokio executor
    ///
    /// The returned receiver is subscribed before the runtime starts, so it
    /// sees the opening greeting.
    pub fn spawn<C: ChatCompleter + 'static>(
        completer: C,
        language: Language,
    ) -> (Self, broadcast::Receiver<UiEvent>) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, ui_rx) = broadcast::channel(1024);

        let runtime = ChatRuntime::new(
            ChatContext::new(language),
            completer,
            event_rx,
            &event_tx,
            broadcast_tx,
        );
        tokio::spawn(async move {
            runtime.run().await;
        });

        (Self { event_tx }, ui_rx)
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.event_tx
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }
}
