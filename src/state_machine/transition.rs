//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! result. All I/O happens in the runtime when it executes the effects.

use super::{ChatContext, ChatState, Effect, Event, PendingExchange};
use crate::completion::Answer;
use crate::language::Language;
use crate::reveal::{Reveal, RevealStep};
use crate::runtime::UiEvent;
use thiserror::Error;

/// Placeholder shown while the completion is outstanding
pub const TYPING_PLACEHOLDER: &str = "AnuragBot is typing...";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition. None of them are shown to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("An exchange is already in flight")]
    Busy,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    state: &ChatState,
    context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Submission
        // ============================================================

        // Busy + UserSubmit -> dropped, not queued
        (ChatState::Requesting { .. } | ChatState::Revealing { .. }, Event::UserSubmit { .. }) => {
            Err(TransitionError::Busy)
        }

        (ChatState::Idle, Event::UserSubmit { text, language }) => {
            let user_text = text.trim();
            if user_text.is_empty() {
                return Err(TransitionError::EmptyMessage);
            }

            let switching = language != context.language;
            let exchange = PendingExchange {
                id: context.last_exchange_id + 1,
                user_text: user_text.to_string(),
                language,
                // The clear emitted below starts the next epoch
                epoch: context.transcript_epoch + u64::from(switching),
            };

            let switch = if switching {
                language_change_effects(language)
            } else {
                vec![]
            };

            Ok(
                TransitionResult::new(ChatState::Requesting {
                    exchange: exchange.clone(),
                })
                .with_effects(switch)
                .with_effect(Effect::Notify(UiEvent::UserMessage {
                    text: exchange.user_text.clone(),
                }))
                .with_effect(Effect::set_input_enabled(false))
                .with_effect(Effect::Notify(UiEvent::Typing {
                    text: TYPING_PLACEHOLDER.to_string(),
                }))
                .with_effect(Effect::PublishState)
                .with_effect(Effect::RequestCompletion { exchange }),
            )
        }

        // ============================================================
        // Language change: orthogonal to Idle/Busy
        // ============================================================
        (s, Event::LanguageChanged { language }) => {
            Ok(TransitionResult::new(s.clone()).with_effects(language_change_effects(language)))
        }

        // ============================================================
        // Completion resolved -> start revealing
        // ============================================================
        (ChatState::Requesting { exchange }, Event::CompletionReady { exchange_id, answer })
            if exchange.id == exchange_id =>
        {
            let Answer { text, sources } = answer;
            Ok(TransitionResult::new(ChatState::Revealing {
                exchange: exchange.clone(),
                reveal: Reveal::new(text),
                sources: sources.into(),
            })
            .with_effect(Effect::Notify(UiEvent::AnswerStarted))
            .with_effect(Effect::PublishState)
            .with_effect(Effect::StartRevealTimer))
        }

        (_, Event::CompletionReady { exchange_id, .. }) => Err(TransitionError::InvalidTransition(
            format!("stale completion for exchange {exchange_id}"),
        )),

        // ============================================================
        // Reveal ticks
        // ============================================================
        (
            ChatState::Revealing {
                exchange,
                reveal,
                sources,
            },
            Event::RevealTick,
        ) => {
            let mut reveal = reveal.clone();
            match reveal.tick() {
                RevealStep::Append(ch) => Ok(TransitionResult::new(ChatState::Revealing {
                    exchange: exchange.clone(),
                    reveal,
                    sources: sources.clone(),
                })
                .with_effect(Effect::Notify(UiEvent::AnswerChunk { ch }))),

                RevealStep::Finished => {
                    let mut result = TransitionResult::new(ChatState::Idle)
                        .with_effect(Effect::StopRevealTimer)
                        .with_effect(Effect::set_input_enabled(true));
                    if !sources.is_empty() {
                        result = result.with_effect(Effect::show_sources(sources.to_vec()));
                    }
                    result = result.with_effect(Effect::Notify(UiEvent::AnswerFinished));

                    // Shown either way, but a pair from before a clear never re-enters
                    if exchange.epoch == context.transcript_epoch {
                        result = result.with_effect(Effect::CommitExchange {
                            user_text: exchange.user_text.clone(),
                            model_text: reveal.text().to_string(),
                        });
                    }
                    Ok(result.with_effect(Effect::PublishState))
                }
            }
        }

        // A tick that raced with the timer being stopped
        (_, Event::RevealTick) => Err(TransitionError::InvalidTransition(
            "reveal tick while not revealing".to_string(),
        )),

        // ============================================================
        // Cancellation: nothing from a cancelled exchange is committed
        // ============================================================
        (ChatState::Requesting { .. }, Event::Cancel) => Ok(TransitionResult::new(ChatState::Idle)
            .with_effects(cancel_effects(Effect::AbortCompletion))),

        (ChatState::Revealing { .. }, Event::Cancel) => Ok(TransitionResult::new(ChatState::Idle)
            .with_effects(cancel_effects(Effect::StopRevealTimer))),

        (ChatState::Idle, Event::Cancel) => Err(TransitionError::InvalidTransition(
            "nothing to cancel".to_string(),
        )),
    }
}

fn language_change_effects(language: Language) -> Vec<Effect> {
    vec![
        Effect::ClearTranscript,
        Effect::SetLanguage(language),
        Effect::show_greeting(language),
    ]
}

fn cancel_effects(stop: Effect) -> Vec<Effect> {
    vec![
        stop,
        Effect::Notify(UiEvent::Cancelled),
        Effect::set_input_enabled(true),
        Effect::PublishState,
    ]
}
