use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::{DubError, Result};

use super::AudioBuffer;

/// WAV scaling rule: clamp to [-1, 1], negative samples scaled by 32768,
/// non-negative by 32767, truncated toward zero. The rule differs from
/// the MP3 one and must stay bit-compatible with existing consumers.
fn sample_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Serialize a buffer as a 16-bit PCM RIFF/WAVE byte stream with the
/// canonical 44-byte header.
pub fn audio_buffer_to_wav(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: buffer.channel_count() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)
            .map_err(|e| DubError::Io(std::io::Error::other(e.to_string())))?;
        for frame in 0..buffer.frames() {
            for channel in buffer.channels() {
                writer
                    .write_sample(sample_to_i16(channel[frame]))
                    .map_err(|e| DubError::Io(std::io::Error::other(e.to_string())))?;
            }
        }
        writer
            .finalize()
            .map_err(|e| DubError::Io(std::io::Error::other(e.to_string())))?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_LEN: usize = 44;

    fn data_samples(wav: &[u8]) -> Vec<i16> {
        wav[HEADER_LEN..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }

    #[test]
    fn test_wav_length_invariant() {
        let buffer = AudioBuffer::new(vec![vec![0.0; 480], vec![0.0; 480]], 24_000).unwrap();
        let wav = audio_buffer_to_wav(&buffer).unwrap();
        assert_eq!(wav.len(), HEADER_LEN + 480 * 2 * 2);
    }

    #[test]
    fn test_wav_header_fields() {
        let buffer = AudioBuffer::new(vec![vec![0.0; 100]], 16_000).unwrap();
        let wav = audio_buffer_to_wav(&buffer).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");
        // PCM format tag, channel count, sample rate, bits per sample
        assert_eq!(u16::from_le_bytes([wav[20], wav[21]]), 1);
        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 1);
        assert_eq!(
            u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]),
            16_000
        );
        assert_eq!(u16::from_le_bytes([wav[34], wav[35]]), 16);
    }

    #[test]
    fn test_asymmetric_scaling() {
        let buffer =
            AudioBuffer::new(vec![vec![-1.0, -0.5, 0.0, 0.5, 1.0]], 24_000).unwrap();
        let wav = audio_buffer_to_wav(&buffer).unwrap();
        let samples = data_samples(&wav);

        assert_eq!(samples[0], -32768);
        assert_eq!(samples[1], -16384);
        assert_eq!(samples[2], 0);
        assert_eq!(samples[3], 16383); // 0.5 * 32767 truncated
        assert_eq!(samples[4], 32767);
    }

    #[test]
    fn test_out_of_range_samples_clamp() {
        let buffer = AudioBuffer::new(vec![vec![-2.0, 2.0]], 24_000).unwrap();
        let samples = data_samples(&audio_buffer_to_wav(&buffer).unwrap());
        assert_eq!(samples, vec![-32768, 32767]);
    }

    #[test]
    fn test_wav_data_round_trips_through_pcm_decode() {
        let original = AudioBuffer::new(
            vec![vec![0.25, -0.25, 0.75], vec![-0.75, 0.5, -0.5]],
            44_100,
        )
        .unwrap();
        let wav = audio_buffer_to_wav(&original).unwrap();
        let decoded =
            super::super::bytes_to_audio_buffer(&wav[HEADER_LEN..], 44_100, 2).unwrap();

        assert_eq!(decoded.frames(), original.frames());
        for ch in 0..2 {
            for (a, b) in decoded.channel(ch).iter().zip(original.channel(ch)) {
                // One LSB of error from the asymmetric 16-bit quantization.
                assert!((a - b).abs() < 1.5 / 32768.0);
            }
        }
    }
}
