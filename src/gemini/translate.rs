//! One-shot transcription, translation and subtitle generation.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::ingest::CompressedAudio;
use crate::job::CancelToken;
use crate::lang::language_code_to_name;

use super::{Content, GenerateContentRequest, GenerationConfig, GeminiClient, InlineData, Part};

/// Transcript, translation and optional SubRip track for one source
/// file, immutable once received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub original: String,
    pub translated: String,
    /// SubRip text, passed through unmodified; absent when the service
    /// returned none (or an empty track).
    pub srt: Option<String>,
}

impl GeminiClient {
    /// Send the compressed audio with the dubbing instruction and parse
    /// the structured result.
    ///
    /// A malformed model payload degrades to treating the whole raw text
    /// as the translation; only transport and service failures error.
    pub async fn transcribe_and_translate(
        &self,
        payload: &CompressedAudio,
        target_language: &str,
        duration_hint_secs: f64,
        cancel: &CancelToken,
    ) -> Result<TranslationResult> {
        cancel.check()?;

        debug!(
            "Requesting transcription and translation to {} ({:.1}s source)",
            target_language, duration_hint_secs
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: payload.mime_type.to_string(),
                            data: payload.data.clone(),
                        },
                    },
                    Part::Text {
                        text: build_dub_prompt(target_language, duration_hint_secs),
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                ..Default::default()
            }),
        };

        let response = self
            .generate_content(&self.translation_model, &request)
            .await?;

        // A cancellation that raced the request discards the result.
        cancel.check()?;

        let text = response.first_text().unwrap_or_default();
        Ok(parse_translation_payload(&text))
    }
}

/// Dubbing instruction: extract, translate, keep speakable within the
/// source window, and emit evenly distributed SubRip subtitles.
fn build_dub_prompt(target_language: &str, duration_secs: f64) -> String {
    let lang_name = language_code_to_name(target_language);
    format!(
        r#"You are a professional dubbing translator and subtitler.
1. Extract speech from this audio.
2. Translate to {lang_name}.
3. The original content is exactly {duration_secs:.1}s long.
4. Provide a script that can be spoken naturally within this {duration_secs:.1}s window.
5. Additionally, generate professional SubRip (.srt) subtitles for the translated content, ensuring timestamps are distributed evenly across the {duration_secs:.1}s duration.

Return JSON:
{{
  "originalTranscription": "...",
  "translation": "...",
  "srt": "..."
}}"#
    )
}

#[derive(Deserialize)]
struct TranslationPayload {
    #[serde(default, rename = "originalTranscription")]
    original_transcription: String,
    #[serde(default)]
    translation: String,
    #[serde(default)]
    srt: Option<String>,
}

/// Lenient payload parse: malformed JSON becomes a raw-text translation
/// rather than an error.
fn parse_translation_payload(text: &str) -> TranslationResult {
    match serde_json::from_str::<TranslationPayload>(text) {
        Ok(payload) => TranslationResult {
            original: payload.original_transcription,
            translated: payload.translation,
            srt: payload.srt.filter(|s| !s.is_empty()),
        },
        Err(e) => {
            warn!("Translation payload was not valid JSON ({}); using raw text", e);
            TranslationResult {
                original: String::new(),
                translated: text.to_string(),
                srt: None,
            }
        }
    }
}
