//! Language name -> ISO 639-1 code resolution.
//! The picker in the UI layer offers a fixed set of display names; anything
//! outside that set resolves to English.

use serde::Serialize;

/// Code used when a language name is not recognized.
pub const DEFAULT_CODE: &str = "en";

/// Languages offered by the UI picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Chinese,
    Japanese,
    Italian,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Chinese,
        Language::Japanese,
        Language::Italian,
    ];

    /// Two-letter ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Chinese => "zh",
            Language::Japanese => "ja",
            Language::Italian => "it",
        }
    }

    /// Display name as shown in the picker.
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Chinese => "Chinese",
            Language::Japanese => "Japanese",
            Language::Italian => "Italian",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Language> {
        let lowered = name.trim().to_ascii_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.name().to_ascii_lowercase() == lowered)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Total mapping from display name to language code.
/// Unrecognized input falls back to [`DEFAULT_CODE`].
pub fn resolve(name: &str) -> &'static str {
    Language::from_name(name)
        .map(Language::code)
        .unwrap_or(DEFAULT_CODE)
}
