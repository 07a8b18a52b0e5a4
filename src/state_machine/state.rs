//! Orchestrator state types

use crate::language::Language;
use crate::llm::CitationSource;
use crate::reveal::Reveal;
use serde::Serialize;
use std::sync::Arc;

/// The exchange currently in flight. Dropped once it resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingExchange {
    /// Monotonic per session, used to discard stale completions
    pub id: u64,
    /// Submitted text, already trimmed
    pub user_text: String,
    pub language: Language,
    /// Transcript generation the exchange belongs to; a clear starts a new one
    pub epoch: u64,
}

/// Orchestrator state. Anything but `Idle` counts as busy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatState {
    #[default]
    Idle,

    /// Waiting on the completion client (including backoff waits)
    Requesting { exchange: PendingExchange },

    /// Answer received, being revealed on the ticker
    Revealing {
        exchange: PendingExchange,
        reveal: Reveal,
        sources: Arc<[CitationSource]>,
    },
}

impl ChatState {
    pub fn is_busy(&self) -> bool {
        !matches!(self, ChatState::Idle)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ChatState::Idle => "idle",
            ChatState::Requesting { .. } => "requesting",
            ChatState::Revealing { .. } => "revealing",
        }
    }

    pub fn exchange(&self) -> Option<&PendingExchange> {
        match self {
            ChatState::Idle => None,
            ChatState::Requesting { exchange } | ChatState::Revealing { exchange, .. } => {
                Some(exchange)
            }
        }
    }
}

/// Session-wide values the transition function reads but never writes
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    /// Language the transcript belongs to
    pub language: Language,
    /// Id of the most recently started exchange
    pub last_exchange_id: u64,
    /// Bumped every time the transcript is cleared
    pub transcript_epoch: u64,
}

impl ChatContext {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            last_exchange_id: 0,
            transcript_epoch: 0,
        }
    }
}
