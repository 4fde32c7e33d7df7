//! Media ingestion: decode the audio track of an uploaded file, downmix
//! to mono, resample to the transmission rate and package it for the
//! transcription request.

use std::fs::File;
use std::path::Path;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

use crate::codec::{self, AudioBuffer};
use crate::error::{DubError, Result};

/// Inputs above this size are rejected before any decode work.
pub const MAX_INPUT_BYTES: u64 = 300 * 1024 * 1024;

/// Transmission rate for the transcription payload.
pub const COMPRESSED_SAMPLE_RATE: u32 = 16_000;

/// Base64-encoded mono 16 kHz WAV ready for the transcription request,
/// created once per job and consumed once.
#[derive(Debug, Clone)]
pub struct CompressedAudio {
    pub data: String,
    pub mime_type: &'static str,
    /// Source duration in seconds, derived during decode; used as the
    /// pacing hint for both remote calls.
    pub duration_secs: f64,
}

/// Decode, downmix, resample and base64-package the audio track of a
/// media file.
pub fn extract_and_compress(input: &Path) -> Result<CompressedAudio> {
    let size = std::fs::metadata(input)?.len();
    if size > MAX_INPUT_BYTES {
        return Err(DubError::FileTooLarge {
            size,
            limit: MAX_INPUT_BYTES,
        });
    }

    info!("Extracting audio from {}", input.display());
    let (samples, source_rate) = decode_mono(input)?;
    if samples.is_empty() {
        return Err(DubError::UnsupportedMedia(
            "audio track decoded to zero samples".to_string(),
        ));
    }

    let duration_secs = samples.len() as f64 / source_rate as f64;
    debug!(
        "Decoded {:.2}s of audio at {} Hz",
        duration_secs, source_rate
    );

    let samples = if source_rate != COMPRESSED_SAMPLE_RATE {
        resample_mono(samples, source_rate, COMPRESSED_SAMPLE_RATE)?
    } else {
        samples
    };

    let buffer = AudioBuffer::new(vec![samples], COMPRESSED_SAMPLE_RATE)?;
    let wav = codec::audio_buffer_to_wav(&buffer)?;
    debug!("Compressed payload: {} bytes of WAV", wav.len());

    Ok(CompressedAudio {
        data: codec::encode(&wav),
        mime_type: "audio/wav",
        duration_secs,
    })
}

/// Decode the first non-null audio track to mono f32 at its native rate.
fn decode_mono(input: &Path) -> Result<(Vec<f32>, u32)> {
    let file = File::open(input)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = input.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| DubError::UnsupportedMedia(format!("unrecognized container: {e}")))?;
    let mut format = probed.format;

    let (track_id, codec_params) = {
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DubError::UnsupportedMedia("no audio track found".to_string()))?;
        (track.id, track.codec_params.clone())
    };

    let dec_opts: DecoderOptions = Default::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &dec_opts)
        .map_err(|e| DubError::UnsupportedMedia(format!("no decoder for track: {e}")))?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::ResetRequired) => break,
            Err(symphonia::core::errors::Error::IoError(ref err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => {
                return Err(DubError::UnsupportedMedia(format!(
                    "packet read failed: {err}"
                )));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(audio_buf) => downmix_into(&audio_buf, &mut samples)?,
            Err(symphonia::core::errors::Error::IoError(ref err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => {
                return Err(DubError::UnsupportedMedia(format!("decode failed: {err}")));
            }
        }
    }

    let sample_rate = decoder
        .codec_params()
        .sample_rate
        .or(codec_params.sample_rate)
        .ok_or_else(|| DubError::UnsupportedMedia("sample rate unavailable".to_string()))?;

    Ok((samples, sample_rate))
}

/// Average all channels of a decoded packet into the mono accumulator.
fn downmix_into(audio_buf: &AudioBufferRef, samples: &mut Vec<f32>) -> Result<()> {
    match audio_buf {
        AudioBufferRef::F32(buf) => {
            let ch = buf.spec().channels.count();
            for i in 0..buf.frames() {
                let mut sum = 0.0f32;
                for c in 0..ch {
                    sum += buf.chan(c)[i];
                }
                samples.push(sum / ch as f32);
            }
        }
        AudioBufferRef::S32(buf) => {
            let ch = buf.spec().channels.count();
            for i in 0..buf.frames() {
                let mut sum = 0.0f32;
                for c in 0..ch {
                    sum += buf.chan(c)[i] as f32 / i32::MAX as f32;
                }
                samples.push(sum / ch as f32);
            }
        }
        AudioBufferRef::S16(buf) => {
            let ch = buf.spec().channels.count();
            for i in 0..buf.frames() {
                let mut sum = 0.0f32;
                for c in 0..ch {
                    sum += buf.chan(c)[i] as f32 / i16::MAX as f32;
                }
                samples.push(sum / ch as f32);
            }
        }
        _ => {
            return Err(DubError::UnsupportedMedia(
                "unsupported decoded sample format".to_string(),
            ))
        }
    }
    Ok(())
}

/// One-shot whole-buffer sinc resample.
fn resample_mono(samples: Vec<f32>, input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        output_rate as f64 / input_rate as f64,
        2.0,
        params,
        samples.len(),
        1,
    )
    .map_err(|e| DubError::UnsupportedMedia(format!("resampler init failed: {e}")))?;

    let mut output = resampler
        .process(&[samples], None)
        .map_err(|e| DubError::UnsupportedMedia(format!("resampling failed: {e}")))?;

    Ok(output.remove(0))
}
