use crate::error::Result;

use super::AudioBuffer;

/// Samples per channel handed to the encoder per block.
pub const MP3_BLOCK_FRAMES: usize = 1152;

/// Block-based MP3 codec provider. Implementations are injected into
/// [`audio_buffer_to_mp3`]; the codec layer never reaches for a global
/// encoder.
pub trait Mp3BlockEncoder: Send {
    /// Encode one block of left/right PCM16 samples. May return an empty
    /// chunk while the codec buffers internally.
    fn encode_block(&mut self, left: &[i16], right: &[i16]) -> Result<Vec<u8>>;

    /// Drain the codec's internal buffer into a final chunk.
    fn flush(&mut self) -> Result<Vec<u8>>;
}

/// MP3 scaling rule: clamp to [-1, 1], negative samples scaled by 0x8000,
/// non-negative by 0x7FFF. Kept separate from the WAV rule; the two
/// formats scale independently.
fn sample_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 0x8000 as f32) as i16
    } else {
        (s * 0x7FFF as f32) as i16
    }
}

/// Serialize a buffer as an MP3 frame stream through the injected block
/// encoder, feeding fixed 1152-sample blocks per channel. Stereo sources
/// use channels 0 and 1; mono duplicates channel 0 into both encoder
/// inputs.
pub fn audio_buffer_to_mp3(
    buffer: &AudioBuffer,
    encoder: &mut dyn Mp3BlockEncoder,
) -> Result<Vec<u8>> {
    let left: Vec<i16> = buffer.channel(0).iter().copied().map(sample_to_i16).collect();
    let right: Vec<i16> = if buffer.channel_count() > 1 {
        buffer.channel(1).iter().copied().map(sample_to_i16).collect()
    } else {
        left.clone()
    };

    let mut out = Vec::new();
    for (left_block, right_block) in left
        .chunks(MP3_BLOCK_FRAMES)
        .zip(right.chunks(MP3_BLOCK_FRAMES))
    {
        let chunk = encoder.encode_block(left_block, right_block)?;
        out.extend_from_slice(&chunk);
    }
    let tail = encoder.flush()?;
    out.extend_from_slice(&tail);
    Ok(out)
}

/// Construct the default MP3 codec provider for the given output shape.
///
/// Returns `EncoderUnavailable` when the crate was built without an MP3
/// backend; callers treat that as fatal for MP3 artifacts, not retried.
#[cfg(feature = "mp3lame")]
pub fn default_mp3_encoder(channels: u16, sample_rate: u32) -> Result<Box<dyn Mp3BlockEncoder>> {
    Ok(Box::new(lame::LameBlockEncoder::new(channels, sample_rate)?))
}

#[cfg(not(feature = "mp3lame"))]
pub fn default_mp3_encoder(channels: u16, sample_rate: u32) -> Result<Box<dyn Mp3BlockEncoder>> {
    let _ = (channels, sample_rate);
    Err(crate::error::DubError::EncoderUnavailable(
        "built without the `mp3lame` feature".to_string(),
    ))
}

#[cfg(feature = "mp3lame")]
mod lame {
    use mp3lame_encoder::{Builder, DualPcm, Encoder, FlushNoGap, MonoPcm};

    use crate::error::{DubError, Result};

    use super::Mp3BlockEncoder;

    /// LAME-backed provider, 128 kbps, matching the encoder shape of the
    /// buffer being serialized.
    pub struct LameBlockEncoder {
        encoder: Encoder,
        stereo: bool,
    }

    impl LameBlockEncoder {
        pub fn new(channels: u16, sample_rate: u32) -> Result<Self> {
            let unavailable =
                |reason: String| DubError::EncoderUnavailable(reason);

            let mut builder =
                Builder::new().ok_or_else(|| unavailable("LAME context allocation failed".to_string()))?;
            builder
                .set_num_channels(channels as u8)
                .map_err(|e| unavailable(format!("channel setup: {:?}", e)))?;
            builder
                .set_sample_rate(sample_rate)
                .map_err(|e| unavailable(format!("sample rate setup: {:?}", e)))?;
            builder
                .set_brate(mp3lame_encoder::Bitrate::Kbps128)
                .map_err(|e| unavailable(format!("bitrate setup: {:?}", e)))?;
            builder
                .set_quality(mp3lame_encoder::Quality::Good)
                .map_err(|e| unavailable(format!("quality setup: {:?}", e)))?;
            let encoder = builder
                .build()
                .map_err(|e| unavailable(format!("{:?}", e)))?;

            Ok(Self {
                encoder,
                stereo: channels > 1,
            })
        }
    }

    impl Mp3BlockEncoder for LameBlockEncoder {
        fn encode_block(&mut self, left: &[i16], right: &[i16]) -> Result<Vec<u8>> {
            let mut out: Vec<u8> =
                Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(left.len()));
            let written = if self.stereo {
                self.encoder
                    .encode(DualPcm { left, right }, out.spare_capacity_mut())
            } else {
                self.encoder.encode(MonoPcm(left), out.spare_capacity_mut())
            }
            .map_err(|e| DubError::EncoderUnavailable(format!("{:?}", e)))?;
            // Safety: `encode` initialized exactly `written` bytes.
            unsafe { out.set_len(written) };
            Ok(out)
        }

        fn flush(&mut self) -> Result<Vec<u8>> {
            let mut out: Vec<u8> = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(
                super::MP3_BLOCK_FRAMES,
            ));
            let written = self
                .encoder
                .flush::<FlushNoGap>(out.spare_capacity_mut())
                .map_err(|e| DubError::EncoderUnavailable(format!("{:?}", e)))?;
            // Safety: `flush` initialized exactly `written` bytes.
            unsafe { out.set_len(written) };
            Ok(out)
        }
    }
}
