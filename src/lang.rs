//! Target-language and voice catalogs for the dubbing prompts.

use serde::{Deserialize, Serialize};

/// Prebuilt voices offered by the speech-synthesis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Voice {
    Kore,
    Puck,
    Charon,
    Fenrir,
    #[default]
    Zephyr,
}

impl Voice {
    pub const ALL: [Voice; 5] = [
        Voice::Kore,
        Voice::Puck,
        Voice::Charon,
        Voice::Fenrir,
        Voice::Zephyr,
    ];

    /// Identifier sent in the synthesis request's voice config.
    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Kore => "Kore",
            Voice::Puck => "Puck",
            Voice::Charon => "Charon",
            Voice::Fenrir => "Fenrir",
            Voice::Zephyr => "Zephyr",
        }
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kore" => Ok(Voice::Kore),
            "puck" => Ok(Voice::Puck),
            "charon" => Ok(Voice::Charon),
            "fenrir" => Ok(Voice::Fenrir),
            "zephyr" => Ok(Voice::Zephyr),
            _ => Err(format!(
                "Unknown voice: {}. Use one of: Kore, Puck, Charon, Fenrir, Zephyr",
                s
            )),
        }
    }
}

/// Convert a language code to a human-readable name for prompting.
pub fn language_code_to_name(code: &str) -> &'static str {
    let lowercase = code.to_lowercase();
    match lowercase.as_str() {
        "en" => "English",
        "bn" => "Bengali",
        "hi" => "Hindi",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "ar" => "Arabic",
        "th" => "Thai",
        "vi" => "Vietnamese",
        "id" => "Indonesian",
        "ms" => "Malay",
        "nl" => "Dutch",
        "pl" => "Polish",
        "tr" => "Turkish",
        "uk" => "Ukrainian",
        "cs" => "Czech",
        "sv" => "Swedish",
        "da" => "Danish",
        "fi" => "Finnish",
        "no" => "Norwegian",
        "el" => "Greek",
        "he" => "Hebrew",
        "hu" => "Hungarian",
        "ro" => "Romanian",
        "bg" => "Bulgarian",
        "hr" => "Croatian",
        "sk" => "Slovak",
        "sr" => "Serbian",
        "ur" => "Urdu",
        "fa" => "Persian",
        "ta" => "Tamil",
        "te" => "Telugu",
        "mr" => "Marathi",
        "gu" => "Gujarati",
        "kn" => "Kannada",
        "ml" => "Malayalam",
        "pa" => "Punjabi",
        // For unknown codes, return a static fallback
        _ => "the target language",
    }
}

/// Language codes the dubbing prompts have names for.
pub const SUPPORTED_LANGUAGES: [&str; 43] = [
    "en", "bn", "hi", "es", "fr", "de", "it", "pt", "ru", "ja", "ko", "zh", "ar", "th", "vi", "id",
    "ms", "nl", "pl", "tr", "uk", "cs", "sv", "da", "fi", "no", "el", "he", "hu", "ro", "bg", "hr",
    "sk", "sr", "ur", "fa", "ta", "te", "mr", "gu", "kn", "ml", "pa",
];

pub fn is_supported_language(code: &str) -> bool {
    let lowercase = code.to_lowercase();
    SUPPORTED_LANGUAGES.contains(&lowercase.as_str())
}
