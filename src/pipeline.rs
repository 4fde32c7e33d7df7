//! The dubbing pipeline: ingest, translate, synthesize, sync, encode —
//! strictly in that order, one job at a time.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::info;

use crate::codec;
use crate::error::Result;
use crate::gemini::{GeminiClient, TranslationResult};
use crate::ingest;
use crate::job::{CancelToken, DubResult, Job};
use crate::sync;

/// Ordered status updates emitted while a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Extracting,
    Translating,
    Synthesizing,
    Syncing,
    Encoding,
    Complete,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Progress::Extracting => "Extracting and compressing audio...",
            Progress::Translating => "Analyzing and translating content...",
            Progress::Synthesizing => "Generating voiceover...",
            Progress::Syncing => "Synchronizing duration...",
            Progress::Encoding => "Encoding artifacts...",
            Progress::Complete => "Complete",
        };
        write!(f, "{}", message)
    }
}

/// Channel end the pipeline reports progress on.
pub type ProgressSender = mpsc::UnboundedSender<Progress>;

fn send_progress(progress: Option<&ProgressSender>, update: Progress) {
    if let Some(tx) = progress {
        // A dropped receiver just means nobody is watching.
        let _ = tx.send(update);
    }
}

/// Timing and duration figures for one completed job.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub total_time: Duration,
    pub ingest_time: Duration,
    pub translation_time: Duration,
    pub synthesis_time: Duration,
    pub sync_time: Duration,
    pub source_duration_secs: f64,
    /// Raw synthesized duration before the sync pass.
    pub synthesized_duration_secs: f64,
    pub dubbed_duration_secs: f64,
}

/// Everything a completed job produced.
#[derive(Debug)]
pub struct PipelineResult {
    pub translation: TranslationResult,
    pub dub: DubResult,
    pub stats: PipelineStats,
}

/// Run one dubbing job to completion.
///
/// Stages run strictly one after another; the cancel token is consulted
/// at every stage boundary and inside both remote calls. A cancellation
/// between transcription and synthesis aborts before any synthesis
/// request is issued.
pub async fn run_dub_job(
    job: &mut Job,
    client: &GeminiClient,
    cancel: &CancelToken,
    progress: Option<&ProgressSender>,
    encode_mp3: bool,
) -> Result<PipelineResult> {
    let start_time = Instant::now();
    cancel.check()?;

    // Stage 1: ingestion
    info!("Stage 1/4: Extracting audio from {:?}", job.input);
    send_progress(progress, Progress::Extracting);
    let ingest_start = Instant::now();
    let compressed = ingest::extract_and_compress(&job.input)?;
    job.source_duration_secs = compressed.duration_secs;
    let ingest_time = ingest_start.elapsed();
    info!(
        "Audio extracted: {:.1}s source in {:.2}s",
        compressed.duration_secs,
        ingest_time.as_secs_f64()
    );
    cancel.check()?;

    // Stage 2: transcription and translation
    info!(
        "Stage 2/4: Transcribing and translating to {}",
        job.target_language
    );
    send_progress(progress, Progress::Translating);
    let translation_start = Instant::now();
    let translation = client
        .transcribe_and_translate(
            &compressed,
            &job.target_language,
            compressed.duration_secs,
            cancel,
        )
        .await?;
    let translation_time = translation_start.elapsed();
    info!(
        "Translation received: {} chars in {:.2}s",
        translation.translated.len(),
        translation_time.as_secs_f64()
    );
    // Checked here so a cancellation between the stages never issues a
    // synthesis request.
    cancel.check()?;

    // Stage 3: speech synthesis
    info!("Stage 3/4: Synthesizing voiceover with {}", job.voice);
    send_progress(progress, Progress::Synthesizing);
    let synthesis_start = Instant::now();
    let raw = client
        .synthesize(
            &translation.translated,
            job.voice,
            compressed.duration_secs,
            cancel,
        )
        .await?;
    let synthesis_time = synthesis_start.elapsed();
    let synthesized_duration_secs = raw.duration();
    cancel.check()?;

    // Stage 4: hard sync and encode
    info!(
        "Stage 4/4: Syncing {:.2}s of speech to {:.2}s",
        synthesized_duration_secs, compressed.duration_secs
    );
    send_progress(progress, Progress::Syncing);
    let sync_start = Instant::now();
    let synced = sync::match_duration(&raw, compressed.duration_secs)?;
    let sync_time = sync_start.elapsed();

    send_progress(progress, Progress::Encoding);
    let wav = codec::audio_buffer_to_wav(&synced)?;
    let wav_path = job.export("dubbed.wav", &wav)?;

    let mp3_path = if encode_mp3 {
        let mut encoder =
            codec::default_mp3_encoder(synced.channel_count() as u16, synced.sample_rate())?;
        let bytes = codec::audio_buffer_to_mp3(&synced, encoder.as_mut())?;
        Some(job.export("dubbed.mp3", &bytes)?)
    } else {
        None
    };

    let srt_path = match &translation.srt {
        Some(srt) => Some(job.export("subtitles.srt", srt.as_bytes())?),
        None => None,
    };

    send_progress(progress, Progress::Complete);

    let stats = PipelineStats {
        total_time: start_time.elapsed(),
        ingest_time,
        translation_time,
        synthesis_time,
        sync_time,
        source_duration_secs: compressed.duration_secs,
        synthesized_duration_secs,
        dubbed_duration_secs: synced.duration(),
    };

    Ok(PipelineResult {
        translation,
        dub: DubResult {
            buffer: synced,
            wav,
            wav_path,
            mp3_path,
            srt_path,
        },
        stats,
    })
}

/// Print a summary of a completed job.
pub fn print_summary(result: &PipelineResult) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                       Dubbing Complete                         ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!(
        "  Source:       {:.2}s",
        result.stats.source_duration_secs
    );
    println!(
        "  Synthesized:  {:.2}s (synced to {:.2}s)",
        result.stats.synthesized_duration_secs, result.stats.dubbed_duration_secs
    );
    println!();
    println!("  Artifacts:");
    println!("    WAV:  {}", result.dub.wav_path.display());
    if let Some(ref mp3) = result.dub.mp3_path {
        println!("    MP3:  {}", mp3.display());
    }
    if let Some(ref srt) = result.dub.srt_path {
        println!("    SRT:  {}", srt.display());
    }
    println!();
    println!("  Timing:");
    println!(
        "    Extract:     {:.2}s",
        result.stats.ingest_time.as_secs_f64()
    );
    println!(
        "    Translate:   {:.2}s",
        result.stats.translation_time.as_secs_f64()
    );
    println!(
        "    Synthesize:  {:.2}s",
        result.stats.synthesis_time.as_secs_f64()
    );
    println!(
        "    Sync:        {:.2}s",
        result.stats.sync_time.as_secs_f64()
    );
    println!(
        "    Total:       {:.2}s",
        result.stats.total_time.as_secs_f64()
    );
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}
