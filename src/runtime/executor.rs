//! Chat runtime executor

use super::traits::ChatCompleter;
use super::UiEvent;

use crate::reveal::REVEAL_TICK;
use crate::state_machine::{
    transition, ChatContext, ChatState, Effect, Event, PendingExchange, TransitionError,
};
use crate::transcript::Transcript;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Single owner of the orchestrator state and the transcript
pub struct ChatRuntime<C>
where
    C: ChatCompleter + 'static,
{
    context: ChatContext,
    state: ChatState,
    transcript: Transcript,
    completer: Arc<C>,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so the loop ends once every external handle is gone
    event_tx: mpsc::WeakSender<Event>,
    broadcast_tx: broadcast::Sender<UiEvent>,
    /// Token to cancel the running completion
    completion_cancel_token: Option<CancellationToken>,
    reveal_timer: Option<Interval>,
    reveal_tick: Duration,
}

impl<C> ChatRuntime<C>
where
    C: ChatCompleter + 'static,
{
    pub fn new(
        context: ChatContext,
        completer: C,
        event_rx: mpsc::Receiver<Event>,
        event_tx: &mpsc::Sender<Event>,
        broadcast_tx: broadcast::Sender<UiEvent>,
    ) -> Self {
        Self {
            context,
            state: ChatState::Idle,
            transcript: Transcript::new(),
            completer: Arc::new(completer),
            event_rx,
            event_tx: event_tx.downgrade(),
            broadcast_tx,
            completion_cancel_token: None,
            reveal_timer: None,
            reveal_tick: REVEAL_TICK,
        }
    }

    /// Override the reveal cadence
    #[must_use]
    pub fn with_reveal_tick(mut self, tick: Duration) -> Self {
        self.reveal_tick = tick;
        self
    }

    pub async fn run(mut self) {
        tracing::info!(language = %self.context.language, "Starting chat runtime");
        self.notify(UiEvent::Greeting {
            language: self.context.language,
            text: self.context.language.greeting().to_string(),
        });

        loop {
            tokio::select! {
                event = self.event_rx.recv() => match event {
                    Some(event) => self.process_event(event),
                    None => break,
                },
                () = next_tick(self.reveal_timer.as_mut()) => {
                    self.process_event(Event::RevealTick);
                }
            }
        }

        if self.state.is_busy() {
            tracing::debug!(state = self.state.type_name(), "Stopping mid-exchange");
        }
        if let Some(token) = self.completion_cancel_token.take() {
            token.cancel();
        }
        tracing::info!("Chat runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(TransitionError::Busy) => {
                tracing::debug!(
                    state = self.state.type_name(),
                    exchange_id = self.state.exchange().map(|e| e.id),
                    "Dropping submission while busy"
                );
                return;
            }
            Err(TransitionError::EmptyMessage) => {
                tracing::debug!("Ignoring empty submission");
                return;
            }
            Err(e) => {
                tracing::debug!(error = %e, state = self.state.type_name(), "Ignoring event");
                return;
            }
        };

        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Notify(event) => self.notify(event),

            Effect::PublishState => {
                let state = serde_json::to_value(&self.state).unwrap_or(Value::Null);
                self.notify(UiEvent::StateChange { state });
            }

            Effect::RequestCompletion { exchange } => self.request_completion(exchange),

            Effect::AbortCompletion => {
                if let Some(token) = self.completion_cancel_token.take() {
                    tracing::info!("Aborting in-flight completion");
                    token.cancel();
                }
            }

            Effect::StartRevealTimer => {
                // The finished completion task has nothing left to cancel
                self.completion_cancel_token = None;
                let mut timer = interval_at(Instant::now() + self.reveal_tick, self.reveal_tick);
                timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.reveal_timer = Some(timer);
            }

            Effect::StopRevealTimer => {
                self.reveal_timer = None;
            }

            Effect::CommitExchange {
                user_text,
                model_text,
            } => {
                self.transcript.append(user_text, model_text);
                tracing::debug!(turns = self.transcript.len(), "Exchange committed");
                self.notify(UiEvent::TranscriptChanged {
                    turns: self.transcript.len(),
                });
            }

            Effect::ClearTranscript => {
                let was_empty = self.transcript.is_empty();
                self.transcript.clear();
                self.context.transcript_epoch += 1;
                tracing::info!(
                    was_empty,
                    epoch = self.context.transcript_epoch,
                    "Transcript cleared"
                );
                self.notify(UiEvent::TranscriptChanged { turns: 0 });
            }

            Effect::SetLanguage(language) => {
                tracing::info!(language = %language, "Response language changed");
                self.context.language = language;
            }
        }
    }

    /// Spawn the completion client as a background task racing cancellation
    fn request_completion(&mut self, exchange: PendingExchange) {
        self.context.last_exchange_id = exchange.id;

        let Some(event_tx) = self.event_tx.upgrade() else {
            tracing::warn!("No event senders left, not starting completion");
            return;
        };

        let cancel_token = CancellationToken::new();
        self.completion_cancel_token = Some(cancel_token.clone());

        let completer = self.completer.clone();
        let transcript = self.transcript.snapshot().to_vec();

        tokio::spawn(async move {
            tracing::info!(
                exchange_id = exchange.id,
                language = %exchange.language,
                turns = transcript.len(),
                "Requesting completion (background)"
            );

            tokio::select! {
                biased;

                () = cancel_token.cancelled() => {
                    tracing::info!(exchange_id = exchange.id, "Completion cancelled");
                }

                answer = completer.complete(&transcript, &exchange.user_text, exchange.language) => {
                    let _ = event_tx
                        .send(Event::CompletionReady {
                            exchange_id: exchange.id,
                            answer,
                        })
                        .await;
                }
            }
        });
    }

    fn notify(&self, event: UiEvent) {
        // No subscribers is fine; the surface may not be attached yet
        let _ = self.broadcast_tx.send(event);
    }
}

async fn next_tick(timer: Option<&mut Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}
