//! Environment-driven configuration

use crate::identity::{IdentityConfig, DEFAULT_IDENTITY_TIMEOUT, DEFAULT_IDENTITY_URL};
use crate::language::Language;
use crate::llm::GeminiConfig;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_APP_ID: &str = "default-app-id";

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub gemini: GeminiConfig,
    pub identity: IdentityConfig,
    pub language: Language,
    pub app_id: String,
}

impl ChatConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut gemini = GeminiConfig::new(var("GEMINI_API_KEY").unwrap_or_default());
        if let Some(model) = var("GEMINI_MODEL") {
            gemini.model = model;
        }
        if let Some(base_url) = var("GEMINI_BASE_URL") {
            gemini.base_url = base_url;
        }
        gemini.timeout = Duration::from_secs(
            var("CAMPUS_CHAT_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        let language = match var("CAMPUS_CHAT_LANGUAGE").map(|s| s.parse::<Language>()) {
            Some(Ok(language)) => language,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Falling back to English");
                Language::default()
            }
            None => Language::default(),
        };

        Self {
            gemini,
            identity: IdentityConfig {
                api_key: var("FIREBASE_API_KEY"),
                custom_token: var("CAMPUS_CHAT_AUTH_TOKEN"),
                base_url: var("FIREBASE_IDENTITY_URL")
                    .unwrap_or_else(|| DEFAULT_IDENTITY_URL.to_string()),
                timeout: DEFAULT_IDENTITY_TIMEOUT,
            },
            language,
            app_id: var("CAMPUS_CHAT_APP_ID").unwrap_or_else(|| DEFAULT_APP_ID.to_string()),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.gemini.api_key.is_empty()
    }
}
