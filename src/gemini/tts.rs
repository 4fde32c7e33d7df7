//! Speech synthesis for the translated script.

use tracing::debug;

use crate::codec::{self, AudioBuffer};
use crate::error::{DubError, Result};
use crate::job::CancelToken;
use crate::lang::Voice;

use super::{
    Content, GenerateContentRequest, GenerationConfig, GeminiClient, Part, PrebuiltVoiceConfig,
    SpeechConfig, VoiceConfig,
};

/// The synthesis service returns 24 kHz mono PCM16.
pub const TTS_SAMPLE_RATE: u32 = 24_000;

impl GeminiClient {
    /// Synthesize speech for `text` with the given prebuilt voice,
    /// hinting the service at the pacing needed to land near the target
    /// duration.
    ///
    /// Empty text is sent as-is; whether the service produces audio for
    /// it is its decision, surfaced as `NoAudioGenerated` when it does
    /// not.
    pub async fn synthesize(
        &self,
        text: &str,
        voice: Voice,
        target_duration_secs: f64,
        cancel: &CancelToken,
    ) -> Result<AudioBuffer> {
        cancel.check()?;

        debug!(
            "Requesting speech synthesis with voice {} ({:.1}s pacing target)",
            voice, target_duration_secs
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: build_pacing_prompt(text, target_duration_secs),
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.as_str().to_string(),
                        },
                    },
                }),
                ..Default::default()
            }),
        };

        let response = self.generate_content(&self.tts_model, &request).await?;

        // A cancellation that raced the request discards the result.
        cancel.check()?;

        let audio = response
            .first_inline_audio()
            .ok_or(DubError::NoAudioGenerated)?;
        let bytes = codec::decode(&audio)?;
        let buffer = codec::bytes_to_audio_buffer(&bytes, TTS_SAMPLE_RATE, 1)?;
        debug!("Synthesized {:.2}s of audio", buffer.duration());
        Ok(buffer)
    }
}

fn build_pacing_prompt(text: &str, target_duration_secs: f64) -> String {
    format!(
        "Speak this text: {}. (Target pacing: {:.1} seconds)",
        text, target_duration_secs
    )
}
