use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DubError, Result};
use crate::gemini::{DEFAULT_TRANSLATION_MODEL, DEFAULT_TTS_MODEL};
use crate::lang::{is_supported_language, Voice};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub translation_model: String,
    pub tts_model: String,
    pub default_language: String,
    pub default_voice: Voice,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            translation_model: DEFAULT_TRANSLATION_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            default_language: "bn".to_string(),
            default_voice: Voice::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.gemini_api_key = Some(key);
        }
        if let Ok(language) = std::env::var("DUBSYNC_DEFAULT_LANGUAGE") {
            config.default_language = language;
        }
        if let Ok(voice) = std::env::var("DUBSYNC_DEFAULT_VOICE") {
            if let Ok(v) = voice.parse() {
                config.default_voice = v;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.gemini_api_key.is_none() {
            return Err(DubError::Config(
                "GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey".to_string(),
            ));
        }

        if !is_supported_language(&self.default_language) {
            return Err(DubError::Config(format!(
                "Unsupported default language: {}",
                self.default_language
            )));
        }

        Ok(())
    }

    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dubsync").join("config.toml"))
    }
}
