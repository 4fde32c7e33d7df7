//! Gemini API client for the two remote calls of a dubbing job:
//! transcription/translation and speech synthesis.

pub mod translate;
pub mod tts;

pub use translate::TranslationResult;
pub use tts::TTS_SAMPLE_RATE;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DubError, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TRANSLATION_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Gemini API client. Constructed explicitly with its credential and
/// passed by reference into the pipeline; there is no shared module
/// state.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    translation_model: String,
    tts_model: String,
}

impl GeminiClient {
    /// Create a client with the given API key and default endpoints.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            translation_model: DEFAULT_TRANSLATION_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
        }
    }

    /// Point the client at a different API host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_translation_model(mut self, model: impl Into<String>) -> Self {
        self.translation_model = model.into();
        self
    }

    pub fn with_tts_model(mut self, model: impl Into<String>) -> Self {
        self.tts_model = model.into();
        self
    }

    /// Issue one generateContent call and parse the response envelope.
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        debug!("Gemini API response status: {}", status);
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DubError::Api(format!(
                "Gemini API error ({}): {}",
                status, body
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| DubError::Api(format!("Unexpected response envelope: {}", e)))?;

        if let Some(error) = parsed.error {
            return Err(DubError::Api(format!("Gemini error: {}", error.message)));
        }

        Ok(parsed)
    }
}

// Request/Response types

#[derive(Serialize)]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
pub(crate) struct Content {
    pub parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub(crate) enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
pub(crate) struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Serialize, Default)]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

#[derive(Serialize)]
pub(crate) struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Serialize)]
pub(crate) struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize)]
pub(crate) struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
    pub error: Option<ApiErrorBody>,
}

impl GenerateContentResponse {
    /// First text part of the first candidate, if any.
    pub(crate) fn first_text(self) -> Option<String> {
        self.candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|parts| parts.into_iter().find_map(|p| p.text))
    }

    /// First inline audio payload of the first candidate, if any.
    pub(crate) fn first_inline_audio(self) -> Option<String> {
        self.candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|parts| {
                parts
                    .into_iter()
                    .find_map(|p| p.inline_data.and_then(|d| d.data))
            })
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct CandidateContent {
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ResponsePart {
    pub text: Option<String>,
    #[serde(default, alias = "inlineData")]
    pub inline_data: Option<ResponseInlineData>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ResponseInlineData {
    pub data: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}
