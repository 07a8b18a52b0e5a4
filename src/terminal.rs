//! Line-oriented terminal front end
//!
//! Reads submissions from stdin and renders `UiEvent`s to stdout.

use crate::language::Language;
use crate::runtime::{ChatHandle, UiEvent};
use crate::state_machine::Event;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

const CLEAR_LINE: &str = "\r\x1b[2K";
const BUSY_HINT: &str = "[busy] still answering; send /cancel to stop it";

/// One parsed line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(String),
    Lang(Language),
    Cancel,
    Quit,
    /// Unrecognized slash command, with a message for the user
    Invalid(String),
}

pub fn parse_line(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Submit(line.to_string());
    };

    let (name, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    match name {
        "lang" => match arg.trim().parse() {
            Ok(language) => Command::Lang(language),
            Err(e) => Command::Invalid(format!("{e} (choose from {})", language_names())),
        },
        "cancel" => Command::Cancel,
        "quit" | "exit" => Command::Quit,
        _ => Command::Invalid(format!("unknown command /{name}")),
    }
}

fn language_names() -> String {
    Language::ALL
        .iter()
        .map(|l| l.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Mirrors the input-enabled flag from the UI event stream
#[derive(Debug, Clone)]
pub struct InputGate(Arc<AtomicBool>);

impl Default for InputGate {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl InputGate {
    pub fn is_open(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self, open: bool) {
        self.0.store(open, Ordering::Release);
    }

    /// Event for a submitted line, or `None` while an answer is still in progress
    pub fn submission(&self, text: String, language: Language) -> Option<Event> {
        if !self.is_open() && !text.trim().is_empty() {
            return None;
        }
        Some(Event::submit(text, language))
    }
}

/// Writes UI events as plain text, tracking whether the cursor is mid-line
#[derive(Debug, Default)]
pub struct Renderer {
    mid_line: bool,
    gate: InputGate,
}

impl Renderer {
    pub fn new(gate: InputGate) -> Self {
        Self {
            mid_line: false,
            gate,
        }
    }

    pub fn render(&mut self, event: &UiEvent, out: &mut impl Write) -> io::Result<()> {
        match event {
            UiEvent::Greeting { text, .. } => {
                self.end_line(out)?;
                writeln!(out, "bot> {text}")?;
            }
            UiEvent::UserMessage { text } => {
                self.end_line(out)?;
                writeln!(out, "you> {text}")?;
            }
            UiEvent::Typing { text } => {
                self.end_line(out)?;
                write!(out, "{text}")?;
                self.mid_line = true;
            }
            UiEvent::AnswerStarted => {
                write!(out, "{CLEAR_LINE}bot> ")?;
                self.mid_line = true;
            }
            UiEvent::AnswerChunk { ch } => {
                write!(out, "{ch}")?;
                self.mid_line = true;
            }
            UiEvent::Sources { sources } => {
                self.end_line(out)?;
                writeln!(out, "Sources:")?;
                for source in sources {
                    writeln!(out, "  - {} <{}>", source.label(), source.uri)?;
                }
            }
            UiEvent::AnswerFinished => self.end_line(out)?,
            UiEvent::Cancelled => {
                if self.mid_line {
                    write!(out, "{CLEAR_LINE}")?;
                    self.mid_line = false;
                }
                writeln!(out, "[cancelled]")?;
            }
            UiEvent::InputEnabled { enabled } => self.gate.set(*enabled),
            UiEvent::StateChange { .. } | UiEvent::TranscriptChanged { .. } => {}
        }
        out.flush()
    }

    fn end_line(&mut self, out: &mut impl Write) -> io::Result<()> {
        if self.mid_line {
            writeln!(out)?;
            self.mid_line = false;
        }
        Ok(())
    }
}

/// Drive the session from stdin until EOF or `/quit`
pub async fn run(
    handle: ChatHandle,
    ui_rx: broadcast::Receiver<UiEvent>,
    mut language: Language,
) -> io::Result<()> {
    let gate = InputGate::default();
    let render_task = tokio::spawn(render_loop(ui_rx, Renderer::new(gate.clone())));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let event = match parse_line(&line) {
            Command::Submit(text) => match gate.submission(text, language) {
                Some(event) => event,
                None => {
                    eprintln!("{BUSY_HINT}");
                    continue;
                }
            },
            Command::Lang(next) => {
                language = next;
                Event::LanguageChanged { language }
            }
            Command::Cancel => Event::Cancel,
            Command::Quit => break,
            Command::Invalid(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        if let Err(e) = handle.send(event).await {
            tracing::error!(error = %e, "Chat runtime is gone");
            break;
        }
    }

    drop(handle);
    render_task.abort();
    Ok(())
}

async fn render_loop(mut ui_rx: broadcast::Receiver<UiEvent>, mut renderer: Renderer) {
    loop {
        match ui_rx.recv().await {
            Ok(event) => {
                let mut stdout = io::stdout().lock();
                if let Err(e) = renderer.render(&event, &mut stdout) {
                    tracing::error!(error = %e, "Failed to write to terminal");
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Terminal fell behind, dropped UI events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
