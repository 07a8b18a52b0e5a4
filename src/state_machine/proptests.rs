//! Property-based tests for the orchestrator
//!
//! A tiny effect interpreter stands in for the runtime so whole sessions can
//! be replayed against the pure transition function.

use super::transition::*;
use super::*;
use crate::completion::Answer;
use crate::language::Language;
use crate::llm::{Role, Turn};
use crate::runtime::UiEvent;
use crate::transcript::Transcript;
use proptest::prelude::*;

// ============================================================================
// Test Harness
// ============================================================================

/// Applies effects the way the runtime would, minus the I/O
#[derive(Default)]
struct Session {
    state: ChatState,
    context: ChatContext,
    transcript: Transcript,
    requests: Vec<PendingExchange>,
    commits: usize,
    revealing: bool,
}

impl Session {
    fn apply(&mut self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let result = transition(&self.state, &self.context, event)?;
        self.state = result.new_state;
        for effect in &result.effects {
            match effect {
                Effect::RequestCompletion { exchange } => {
                    self.context.last_exchange_id = exchange.id;
                    self.requests.push(exchange.clone());
                }
                Effect::CommitExchange {
                    user_text,
                    model_text,
                } => {
                    self.transcript.append(user_text.as_str(), model_text.as_str());
                    self.commits += 1;
                }
                Effect::ClearTranscript => {
                    self.transcript.clear();
                    self.context.transcript_epoch += 1;
                }
                Effect::SetLanguage(language) => self.context.language = *language,
                Effect::StartRevealTimer => self.revealing = true,
                Effect::StopRevealTimer => self.revealing = false,
                _ => {}
            }
        }
        Ok(result.effects)
    }

    /// Resolve the in-flight request, if any, with `text`
    fn resolve(&mut self, text: &str) -> Result<Vec<Effect>, TransitionError> {
        let exchange_id = self.context.last_exchange_id;
        self.apply(Event::CompletionReady {
            exchange_id,
            answer: Answer::notice(text),
        })
    }
}

fn assert_well_formed(turns: &[Turn]) {
    assert_eq!(turns.len() % 2, 0, "odd transcript: {turns:?}");
    for (i, turn) in turns.iter().enumerate() {
        let expected = if i % 2 == 0 { Role::User } else { Role::Model };
        assert_eq!(turn.role(), expected, "turn {i} out of order: {turns:?}");
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_language() -> impl Strategy<Value = Language> {
    prop_oneof![
        Just(Language::English),
        Just(Language::Telugu),
        Just(Language::Hindi),
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z?! ]{1,20}",
        Just(String::new()),
        Just("   ".to_string()),
        Just("నమస్తే".to_string()),
    ]
}

#[derive(Debug, Clone)]
enum Step {
    Submit(String, Language),
    ChangeLanguage(Language),
    Resolve(String),
    StaleResolve,
    Tick,
    Cancel,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (arb_text(), arb_language()).prop_map(|(t, l)| Step::Submit(t, l)),
        1 => arb_language().prop_map(Step::ChangeLanguage),
        2 => "[a-z ]{0,8}".prop_map(Step::Resolve),
        1 => Just(Step::StaleResolve),
        6 => Just(Step::Tick),
        1 => Just(Step::Cancel),
    ]
}

fn run_step(session: &mut Session, step: Step) -> Result<Vec<Effect>, TransitionError> {
    match step {
        Step::Submit(text, language) => session.apply(Event::UserSubmit { text, language }),
        Step::ChangeLanguage(language) => session.apply(Event::LanguageChanged { language }),
        Step::Resolve(text) => session.resolve(&text),
        Step::StaleResolve => session.apply(Event::CompletionReady {
            exchange_id: session.context.last_exchange_id.wrapping_sub(1),
            answer: Answer::notice("stale"),
        }),
        Step::Tick => session.apply(Event::RevealTick),
        Step::Cancel => session.apply(Event::Cancel),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Transcript is always paired and alternates starting with a user turn
    #[test]
    fn prop_transcript_always_paired(steps in proptest::collection::vec(arb_step(), 0..80)) {
        let mut session = Session::default();
        for step in steps {
            let _ = run_step(&mut session, step);
            assert_well_formed(session.transcript.snapshot());
        }
    }

    /// Every commit belongs to a distinct request, and never outnumbers them
    #[test]
    fn prop_commits_never_exceed_requests(steps in proptest::collection::vec(arb_step(), 0..80)) {
        let mut session = Session::default();
        for step in steps {
            let _ = run_step(&mut session, step);
            prop_assert!(session.commits <= session.requests.len());
        }
    }

    /// The reveal timer runs exactly while revealing
    #[test]
    fn prop_timer_tracks_revealing_state(steps in proptest::collection::vec(arb_step(), 0..80)) {
        let mut session = Session::default();
        for step in steps {
            let _ = run_step(&mut session, step);
            prop_assert_eq!(
                session.revealing,
                matches!(session.state, ChatState::Revealing { .. })
            );
        }
    }

    /// A language change always empties the transcript and never touches busy state
    #[test]
    fn prop_language_change_clears(
        exchanges in proptest::collection::vec(("[a-z]{1,10}", "[a-z]{1,10}"), 1..5),
        language in arb_language(),
        busy in any::<bool>(),
    ) {
        let mut session = Session::default();
        for (question, answer) in &exchanges {
            session.transcript.append(question.as_str(), answer.as_str());
        }
        if busy {
            session.apply(Event::submit("in flight", Language::English)).unwrap();
        }
        let before = session.state.clone();

        session.apply(Event::LanguageChanged { language }).unwrap();

        prop_assert!(session.transcript.is_empty());
        prop_assert_eq!(&session.state, &before);
        prop_assert_eq!(session.context.language, language);
    }

    /// An exchange in flight across a language change never lands in the new transcript
    #[test]
    fn prop_no_context_crosses_language_change(
        answer in "[a-z]{0,20}",
        ticks in 0usize..25,
        resolve_before in any::<bool>(),
        language in arb_language(),
    ) {
        let mut session = Session::default();
        session.apply(Event::submit("question", Language::English)).unwrap();
        if resolve_before {
            session.resolve(&answer).unwrap();
            for _ in 0..ticks.min(answer.len()) {
                session.apply(Event::RevealTick).unwrap();
            }
        }

        session.apply(Event::LanguageChanged { language }).unwrap();
        if !resolve_before {
            session.resolve(&answer).unwrap();
        }
        while session.state.is_busy() {
            session.apply(Event::RevealTick).unwrap();
        }

        prop_assert_eq!(session.commits, 0);
        prop_assert!(session.transcript.is_empty());
    }

    /// While busy, further submissions produce no request and no transcript change
    #[test]
    fn prop_single_flight(
        first in "[a-z]{1,10}",
        others in proptest::collection::vec("[a-z]{1,10}", 1..5),
        answer in "[a-z]{0,10}",
        resolve_first in any::<bool>(),
    ) {
        let mut session = Session::default();
        session.apply(Event::submit(first.clone(), Language::English)).unwrap();
        if resolve_first {
            session.resolve(&answer).unwrap();
        }
        let state_before = session.state.clone();

        for text in others {
            let err = session.apply(Event::submit(text, Language::English)).unwrap_err();
            prop_assert_eq!(err, TransitionError::Busy);
        }

        prop_assert_eq!(session.requests.len(), 1);
        prop_assert!(session.transcript.is_empty());
        prop_assert_eq!(&session.state, &state_before);
    }

    /// N characters take N append ticks; the commit happens once, after the last one
    #[test]
    fn prop_reveal_completeness(question in "[a-z]{1,10}", answer in "\\PC{0,40}") {
        let mut session = Session::default();
        session.apply(Event::submit(question.clone(), Language::English)).unwrap();
        session.resolve(&answer).unwrap();

        let mut appended = String::new();
        let mut append_ticks = 0usize;
        let mut commit_tick = None;
        let mut tick = 0usize;
        while session.state.is_busy() {
            tick += 1;
            for effect in session.apply(Event::RevealTick).unwrap() {
                match effect {
                    Effect::Notify(UiEvent::AnswerChunk { ch }) => {
                        appended.push(ch);
                        append_ticks += 1;
                    }
                    Effect::CommitExchange { .. } => {
                        prop_assert!(commit_tick.is_none());
                        commit_tick = Some(tick);
                    }
                    _ => {}
                }
            }
        }

        let n = answer.chars().count();
        prop_assert_eq!(append_ticks, n);
        prop_assert_eq!(&appended, &answer);
        prop_assert_eq!(commit_tick, Some(n + 1));
        prop_assert_eq!(
            session.transcript.snapshot(),
            &[Turn::user(question.trim()), Turn::model(answer)][..]
        );
    }

    /// Cancelling at any point of an exchange commits nothing
    #[test]
    fn prop_cancel_commits_nothing(answer in "[a-z]{1,20}", ticks in 0usize..25, reveal in any::<bool>()) {
        let mut session = Session::default();
        session.apply(Event::submit("question", Language::English)).unwrap();
        if reveal {
            session.resolve(&answer).unwrap();
            for _ in 0..ticks.min(answer.len()) {
                session.apply(Event::RevealTick).unwrap();
            }
        }

        session.apply(Event::Cancel).unwrap();

        prop_assert_eq!(&session.state, &ChatState::Idle);
        prop_assert!(session.transcript.is_empty());
        prop_assert!(!session.revealing);
    }
}
