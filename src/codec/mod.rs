//! Bit-exact conversions between raw PCM byte streams, base64 text and
//! planar floating-point audio buffers, plus WAV/MP3 serialization.

pub mod mp3;
pub mod pcm;
pub mod wav;

pub use mp3::{audio_buffer_to_mp3, default_mp3_encoder, Mp3BlockEncoder, MP3_BLOCK_FRAMES};
pub use pcm::{bytes_to_audio_buffer, AudioBuffer};
pub use wav::audio_buffer_to_wav;

use base64::Engine;

use crate::error::Result;

/// Encode arbitrary bytes as standard base64.
pub fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode standard base64 text back into bytes.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    Ok(base64::engine::general_purpose::STANDARD.decode(text)?)
}
