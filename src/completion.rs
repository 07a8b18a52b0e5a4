//! Completion client
//!
//! Turns a transcript snapshot plus a new user message into exactly one
//! displayable answer. Failures never escape: they become one of the fixed
//! user-facing texts below.

mod retry;

pub use retry::{retry_with_backoff, RetryError, RetryPolicy, Sleeper, TokioSleeper};

use crate::language::Language;
use crate::llm::{CitationSource, LlmError, LlmRequest, LlmService, Turn};
use crate::system_prompt::build_directive;
use std::collections::HashSet;

pub const NO_TEXT_MESSAGE: &str =
    "I couldn't generate a text response based on that query. Please try rephrasing.";
pub const CONNECTION_TROUBLE_MESSAGE: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment.";
pub const UNAVAILABLE_MESSAGE: &str =
    "Max retries reached. The API service is currently unavailable.";

/// A fully received answer, ready to be revealed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<CitationSource>,
}

impl Answer {
    /// An answer carrying a fixed message and no sources
    pub fn notice(text: &str) -> Self {
        Self {
            text: text.to_string(),
            sources: vec![],
        }
    }
}

pub struct CompletionClient<L, S = TokioSleeper> {
    llm: L,
    sleeper: S,
    policy: RetryPolicy,
}

impl<L: LlmService, S: Sleeper> CompletionClient<L, S> {
    pub fn new(llm: L, sleeper: S) -> Self {
        Self {
            llm,
            sleeper,
            policy: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Assemble the request: prior turns, then the new user turn.
    /// The transcript itself is left untouched.
    pub fn build_request(transcript: &[Turn], user_text: &str, language: Language) -> LlmRequest {
        let mut contents = Vec::with_capacity(transcript.len() + 1);
        contents.extend_from_slice(transcript);
        contents.push(Turn::user(user_text));

        LlmRequest {
            system: build_directive(language),
            contents,
            grounding: true,
        }
    }

    pub async fn complete(&self, transcript: &[Turn], user_text: &str, language: Language) -> Answer {
        let request = Self::build_request(transcript, user_text, language);

        let result = retry_with_backoff(
            &self.policy,
            &self.sleeper,
            LlmError::is_rate_limited,
            |attempt| {
                tracing::debug!(attempt, model = %self.llm.model_id(), "Sending completion request");
                self.llm.complete(&request)
            },
        )
        .await;

        match result {
            Ok(response) => match response.text {
                Some(text) => Answer {
                    text,
                    sources: dedup_sources(response.sources),
                },
                None => {
                    tracing::warn!("Completion returned no usable text");
                    Answer::notice(NO_TEXT_MESSAGE)
                }
            },
            Err(RetryError::Exhausted { attempts, last }) => {
                tracing::error!(attempts, error = %last, "Rate limited on every attempt");
                Answer::notice(UNAVAILABLE_MESSAGE)
            }
            Err(RetryError::Fatal(e)) => {
                tracing::error!(
                    error = %e,
                    kind = ?e.kind,
                    status = ?e.status,
                    transient = e.kind.is_retryable(),
                    "Completion failed"
                );
                Answer::notice(CONNECTION_TROUBLE_MESSAGE)
            }
        }
    }
}

/// Keep the first occurrence of each uri, in the order received
pub fn dedup_sources(sources: Vec<CitationSource>) -> Vec<CitationSource> {
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .filter(|s| seen.insert(s.uri.clone()))
        .collect()
}
