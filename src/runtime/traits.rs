//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::completion::{Answer, CompletionClient, Sleeper};
use crate::language::Language;
use crate::llm::{LlmService, Turn};
use async_trait::async_trait;
use std::sync::Arc;

/// Produces exactly one displayable answer per call, never an error
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn complete(&self, transcript: &[Turn], user_text: &str, language: Language) -> Answer;
}

#[async_trait]
impl<T: ChatCompleter + ?Sized> ChatCompleter for Arc<T> {
    async fn complete(&self, transcript: &[Turn], user_text: &str, language: Language) -> Answer {
        (**self).complete(transcript, user_text, language).await
    }
}

// ============================================================================
// Production Adapter
// ============================================================================

#[async_trait]
impl<L: LlmService, S: Sleeper> ChatCompleter for CompletionClient<L, S> {
    async fn complete(&self, transcript: &[Turn], user_text: &str, language: Language) -> Answer {
        CompletionClient::complete(self, transcript, user_text, language).await
    }
}
