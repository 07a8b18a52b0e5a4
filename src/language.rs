//! Response languages offered by the chat

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Language the assistant must answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Telugu,
    Hindi,
}

#[derive(Debug, Error)]
#[error("Unsupported language: {0} (expected English, Telugu or Hindi)")]
pub struct UnknownLanguage(pub String);

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Telugu, Language::Hindi];

    /// Name passed into the behavior directive
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Telugu => "Telugu",
            Language::Hindi => "Hindi",
        }
    }

    /// Greeting shown when the language becomes active
    pub fn greeting(self) -> &'static str {
        match self {
            Language::Telugu => "నమస్కారం! నేను అనురాగ్ బాట్, అనురాగ్ విశ్వవిద్యాలయానికి మీ AI గైడ్. దయచేసి పైన మీ భాషను ఎంచుకుని, ప్రవేశాలు, కార్యక్రమాలు లేదా క్యాంపస్ జీవితం గురించి ఏదైనా అడగండి!",
            Language::Hindi => "नमस्ते! मैं अनुरागबॉट हूँ, अनुराग विश्वविद्यालय के लिए आपका AI सहायक। कृपया ऊपर अपनी पसंदीदा भाषा चुनें, और मुझसे प्रवेश, कार्यक्रमों, या कैंपस जीवन के बारे में कुछ भी पूछें!",
            Language::English => "Hello! I am AnuragBot, your AI guide for Anurag University. Please select your preferred language above, and ask me anything about admissions, programs, or campus life!",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownLanguage(wanted.to_string()))
    }
}
