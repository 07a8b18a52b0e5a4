//! Common types for LLM interactions

use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Role name as the completion service expects it
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One role-tagged message in a conversation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A reference link returned by search grounding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationSource {
    pub uri: String,
    pub title: Option<String>,
}

impl CitationSource {
    pub fn new(uri: impl Into<String>, title: Option<String>) -> Self {
        Self {
            uri: uri.into(),
            title,
        }
    }

    /// Label shown for the link
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or("Source Link")
    }
}

/// LLM request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Behavior directive, resent in full on every call
    pub system: String,
    /// Prior turns followed by the new user turn
    pub contents: Vec<Turn>,
    /// Ask the provider to ground answers with web search
    pub grounding: bool,
}

/// LLM response, normalized from the provider's first candidate
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    /// Text of the first candidate, `None` when it carried no usable text
    pub text: Option<String>,
    /// Grounding sources in the order received, not yet deduplicated
    pub sources: Vec<CitationSource>,
}

impl LlmResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            sources: vec![],
        }
    }

    #[must_use]
    pub fn with_sources(mut self, sources: Vec<CitationSource>) -> Self {
        self.sources = sources;
        self
    }
}
