use crate::error::{DubError, Result};

/// Planar floating-point audio: one sample sequence per channel, all the
/// same length, samples nominally in [-1, 1].
///
/// Buffers are produced by decode/render stages and never mutated in
/// place; every transform returns a new buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if channels.is_empty() {
            return Err(DubError::MalformedAudio("buffer has no channels".to_string()));
        }
        if sample_rate == 0 {
            return Err(DubError::MalformedAudio("sample rate must be non-zero".to_string()));
        }
        let frames = channels[0].len();
        if channels.iter().any(|c| c.len() != frames) {
            return Err(DubError::MalformedAudio(
                "channels have differing lengths".to_string(),
            ));
        }
        Ok(Self { channels, sample_rate })
    }

    /// An all-zero buffer of the given shape.
    pub fn silent(channel_count: usize, frames: usize, sample_rate: u32) -> Self {
        Self {
            channels: vec![vec![0.0; frames]; channel_count.max(1)],
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds: frame count divided by sample rate.
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }
}

/// Interpret a byte stream as interleaved signed 16-bit little-endian PCM
/// and de-interleave it into planar channels, scaling each sample to
/// [-1, 1] by dividing by 32768.
pub fn bytes_to_audio_buffer(
    bytes: &[u8],
    sample_rate: u32,
    channel_count: usize,
) -> Result<AudioBuffer> {
    if channel_count == 0 {
        return Err(DubError::MalformedAudio("channel count must be non-zero".to_string()));
    }
    if bytes.len() % 2 != 0 {
        return Err(DubError::MalformedAudio(format!(
            "odd byte count {} for 16-bit samples",
            bytes.len()
        )));
    }
    let total_samples = bytes.len() / 2;
    if total_samples % channel_count != 0 {
        return Err(DubError::MalformedAudio(format!(
            "{} samples not divisible by {} channels",
            total_samples, channel_count
        )));
    }
    let frames = total_samples / channel_count;

    let mut channels = vec![Vec::with_capacity(frames); channel_count];
    for frame in 0..frames {
        for (ch, samples) in channels.iter_mut().enumerate() {
            let offset = (frame * channel_count + ch) * 2;
            let value = i16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
            samples.push(value as f32 / 32768.0);
        }
    }

    AudioBuffer::new(channels, sample_rate)
}
