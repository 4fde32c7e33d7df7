//! Hard duration sync: force a buffer to a target duration by rendering
//! it offline at an adjusted playback rate. Pitch is not corrected; exact
//! output length wins over audio quality.

use tracing::debug;

use crate::codec::AudioBuffer;
use crate::error::{DubError, Result};

/// Durations closer than this are treated as already matching.
pub const SYNC_TOLERANCE_SECS: f64 = 0.05;

/// Produce a buffer of exactly `target_secs` (to the nearest frame, at
/// least one) from `buffer`, speeding it up or slowing it down uniformly.
///
/// Within [`SYNC_TOLERANCE_SECS`] of the target the input is returned
/// unchanged. Otherwise the source plays at `duration / target` through a
/// fixed-length offline render; whatever falls past the end of the output
/// is truncated, whatever the source cannot fill is silence.
pub fn match_duration(buffer: &AudioBuffer, target_secs: f64) -> Result<AudioBuffer> {
    if (buffer.duration() - target_secs).abs() < SYNC_TOLERANCE_SECS {
        debug!(
            duration = buffer.duration(),
            target = target_secs,
            "duration already within tolerance"
        );
        return Ok(buffer.clone());
    }

    let frames = target_frame_count(target_secs, buffer.sample_rate());
    let playback_rate = buffer.duration() / target_secs;
    debug!(
        duration = buffer.duration(),
        target = target_secs,
        playback_rate,
        frames,
        "rendering at adjusted playback rate"
    );
    render_at_rate(buffer, playback_rate, frames)
}

/// Output length in frames: round(target * rate), floored at one frame so
/// degenerate targets never produce an empty buffer.
fn target_frame_count(target_secs: f64, sample_rate: u32) -> usize {
    let frames = (target_secs * sample_rate as f64).round();
    if frames.is_finite() && frames >= 1.0 {
        frames as usize
    } else {
        1
    }
}

/// Offline render: read the source at linearly interpolated positions
/// `frame * playback_rate` into a fixed-length output at the source's
/// sample rate and channel count.
fn render_at_rate(source: &AudioBuffer, playback_rate: f64, frames: usize) -> Result<AudioBuffer> {
    if !playback_rate.is_finite() || playback_rate <= 0.0 {
        // An unplayable rate renders nothing; the fixed-length output is
        // all silence.
        return Ok(AudioBuffer::silent(
            source.channel_count(),
            frames,
            source.sample_rate(),
        ));
    }

    let mut channels = Vec::with_capacity(source.channel_count());
    for samples in source.channels() {
        let mut rendered = vec![0.0f32; frames];
        for (i, slot) in rendered.iter_mut().enumerate() {
            let position = i as f64 * playback_rate;
            let index = position.floor() as usize;
            if index + 1 < samples.len() {
                let frac = (position - index as f64) as f32;
                *slot = samples[index] * (1.0 - frac) + samples[index + 1] * frac;
            } else if index < samples.len() {
                *slot = samples[index];
            }
            // Past the end: leave silence.
        }
        channels.push(rendered);
    }

    AudioBuffer::new(channels, source.sample_rate())
        .map_err(|e| DubError::SyncFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_buffer(value: f32, secs: f64, sample_rate: u32, channels: usize) -> AudioBuffer {
        let frames = (secs * sample_rate as f64).round() as usize;
        AudioBuffer::new(vec![vec![value; frames]; channels], sample_rate).unwrap()
    }

    #[test]
    fn test_no_op_within_tolerance() {
        let buffer = constant_buffer(0.3, 10.0, 24_000, 1);
        let synced = match_duration(&buffer, 10.04).unwrap();
        assert_eq!(synced.frames(), buffer.frames());
        assert_eq!(synced, buffer);
    }

    #[test]
    fn test_compress_to_exact_frame_count() {
        let buffer = constant_buffer(0.5, 12.3, 24_000, 1);
        let synced = match_duration(&buffer, 10.0).unwrap();
        assert_eq!(synced.frames(), 240_000);
        assert_eq!(synced.sample_rate(), 24_000);
    }

    #[test]
    fn test_stretch_to_exact_frame_count() {
        let buffer = constant_buffer(0.5, 5.0, 24_000, 1);
        let synced = match_duration(&buffer, 10.0).unwrap();
        assert_eq!(synced.frames(), 240_000);
    }

    #[test]
    fn test_zero_target_yields_single_frame() {
        let buffer = constant_buffer(0.5, 5.0, 24_000, 1);
        let synced = match_duration(&buffer, 0.0).unwrap();
        assert_eq!(synced.frames(), 1);
    }

    #[test]
    fn test_near_zero_target_yields_at_least_one_frame() {
        let buffer = constant_buffer(0.5, 5.0, 24_000, 1);
        let synced = match_duration(&buffer, 1e-9).unwrap();
        assert!(synced.frames() >= 1);
    }

    #[test]
    fn test_channel_count_preserved() {
        let buffer = constant_buffer(0.5, 2.0, 44_100, 2);
        let synced = match_duration(&buffer, 1.0).unwrap();
        assert_eq!(synced.channel_count(), 2);
        assert_eq!(synced.frames(), 44_100);
    }

    #[test]
    fn test_interpolation_preserves_constant_signal() {
        let buffer = constant_buffer(0.7, 3.0, 16_000, 1);
        let synced = match_duration(&buffer, 2.0).unwrap();
        // All rendered positions land inside the source, so every output
        // sample interpolates between equal values.
        for &s in synced.channel(0) {
            assert!((s - 0.7).abs() < 1e-5);
        }
    }

    #[test]
    fn test_stretch_pads_tail_with_silence_only_past_source() {
        let buffer = constant_buffer(0.7, 1.0, 16_000, 1);
        let synced = match_duration(&buffer, 2.0).unwrap();
        // Rate 0.5: the source covers the whole output, sampled at half
        // speed.
        assert!((synced.channel(0)[synced.frames() - 1] - 0.7).abs() < 1e-5);
    }
}
