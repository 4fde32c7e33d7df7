//! End-to-end pipeline behavior against a mocked Gemini endpoint.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use dubsync::codec;
use dubsync::error::DubError;
use dubsync::gemini::{GeminiClient, TTS_SAMPLE_RATE};
use dubsync::ingest::MAX_INPUT_BYTES;
use dubsync::job::{CancelToken, Job};
use dubsync::lang::Voice;
use dubsync::pipeline::{run_dub_job, Progress};
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TRANSLATION_PATH: &str = "/v1beta/models/gemini-3-pro-preview:generateContent";
const TTS_PATH: &str = "/v1beta/models/gemini-2.5-flash-preview-tts:generateContent";

const SRT_TRACK: &str = "1\n00:00:00,000 --> 00:00:01,000\nওহে বিশ্ব\n";

fn write_input_wav(path: &Path, secs: f64) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let frames = (secs * 16_000.0) as usize;
    for i in 0..frames {
        let s = ((i as f32 * 440.0 * 2.0 * std::f32::consts::PI / 16_000.0).sin() * 8000.0) as i16;
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

fn translation_body(payload: &str) -> serde_json::Value {
    json!({"candidates": [{"content": {"parts": [{"text": payload}]}}]})
}

fn tts_body(secs: f64) -> serde_json::Value {
    let frames = (secs * TTS_SAMPLE_RATE as f64) as usize;
    let pcm: Vec<u8> = std::iter::repeat(2000i16.to_le_bytes())
        .take(frames)
        .flatten()
        .collect();
    json!({
        "candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "audio/pcm", "data": codec::encode(&pcm)}}
        ]}}]
    })
}

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key".to_string()).with_base_url(server.uri())
}

#[tokio::test]
async fn full_pipeline_produces_synced_artifacts() {
    let server = MockServer::start().await;
    let payload = format!(
        r#"{{"originalTranscription":"hello world","translation":"ওহে বিশ্ব","srt":{}}}"#,
        serde_json::to_string(SRT_TRACK).unwrap()
    );
    Mock::given(method("POST"))
        .and(path(TRANSLATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(translation_body(&payload)))
        .expect(1)
        .mount(&server)
        .await;
    // Synthesized speech comes back short (0.5s for a 1.0s source) and
    // must be stretched to match.
    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(tts_body(0.5)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.wav");
    write_input_wav(&input, 1.0);

    let client = client_for(&server);
    let cancel = CancelToken::new();
    let mut job = Job::new(&input, "bn", Voice::Zephyr).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let result = run_dub_job(&mut job, &client, &cancel, Some(&tx), false)
        .await
        .unwrap();
    drop(tx);

    // Hard sync: exactly round(1.0 * 24000) frames regardless of the
    // synthesized length.
    assert_eq!(result.dub.buffer.frames(), 24_000);
    assert_eq!(result.dub.wav.len(), 44 + 24_000 * 2);
    assert!(result.dub.wav_path.exists());
    assert!(result.dub.mp3_path.is_none());

    let srt_path = result.dub.srt_path.as_ref().unwrap();
    assert_eq!(std::fs::read_to_string(srt_path).unwrap(), SRT_TRACK);

    assert!((result.stats.source_duration_secs - 1.0).abs() < 0.01);
    assert!((result.stats.synthesized_duration_secs - 0.5).abs() < 0.01);
    assert_eq!(result.translation.translated, "ওহে বিশ্ব");
    assert!((job.source_duration_secs - 1.0).abs() < 0.01);

    // Progress updates arrive in pipeline order.
    let mut updates = Vec::new();
    while let Some(update) = rx.recv().await {
        updates.push(update);
    }
    assert_eq!(
        updates,
        vec![
            Progress::Extracting,
            Progress::Translating,
            Progress::Synthesizing,
            Progress::Syncing,
            Progress::Encoding,
            Progress::Complete,
        ]
    );

    // Releasing the job removes every artifact.
    let wav_path = result.dub.wav_path.clone();
    job.release();
    assert!(!wav_path.exists());
}

#[tokio::test]
async fn oversized_input_rejected_before_any_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("huge.mp4");
    let file = File::create(&input).unwrap();
    // Sparse 301 MB file: the guard reads metadata only.
    file.set_len(MAX_INPUT_BYTES + 1024 * 1024).unwrap();

    let client = client_for(&server);
    let cancel = CancelToken::new();
    let mut job = Job::new(&input, "bn", Voice::Zephyr).unwrap();

    let result = run_dub_job(&mut job, &client, &cancel, None, false).await;

    assert!(matches!(result, Err(DubError::FileTooLarge { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn cancellation_after_translation_skips_synthesis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TRANSLATION_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(translation_body(r#"{"translation":"ওহে"}"#))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.wav");
    write_input_wav(&input, 1.0);

    let client = client_for(&server);
    let cancel = CancelToken::new();
    let mut job = Job::new(&input, "bn", Voice::Zephyr).unwrap();

    // Cancel while the translation response is still in flight; the
    // result is discarded and no synthesis request goes out.
    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        })
    };

    let result = run_dub_job(&mut job, &client, &cancel, None, false).await;
    canceller.await.unwrap();

    assert!(matches!(result, Err(DubError::Cancelled)));
}

#[tokio::test]
async fn empty_translation_still_attempts_synthesis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TRANSLATION_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(translation_body(r#"{"translation": ""}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;
    // The synthesis request must still be issued with the empty text; the
    // service answering without audio is surfaced as NoAudioGenerated.
    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"candidates": [{"content": {"parts": [{"text": ""}]}}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.wav");
    write_input_wav(&input, 1.0);

    let client = client_for(&server);
    let cancel = CancelToken::new();
    let mut job = Job::new(&input, "bn", Voice::Zephyr).unwrap();

    let result = run_dub_job(&mut job, &client, &cancel, None, false).await;

    assert!(matches!(result, Err(DubError::NoAudioGenerated)));
}

#[cfg(not(feature = "mp3lame"))]
#[tokio::test]
async fn requested_mp3_without_backend_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TRANSLATION_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(translation_body(r#"{"translation":"ওহে"}"#)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(tts_body(1.0)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.wav");
    write_input_wav(&input, 1.0);

    let client = client_for(&server);
    let cancel = CancelToken::new();
    let mut job = Job::new(&input, "bn", Voice::Zephyr).unwrap();

    let result = run_dub_job(&mut job, &client, &cancel, None, true).await;

    assert!(matches!(result, Err(DubError::EncoderUnavailable(_))));
}
