use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dubsync::config::Config;
use dubsync::error::DubError;
use dubsync::gemini::GeminiClient;
use dubsync::job::{CancelToken, Job};
use dubsync::lang::{is_supported_language, language_code_to_name, Voice};
use dubsync::pipeline::{print_summary, run_dub_job, Progress};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "dubsync")]
#[command(version, about = "AI audio/video dubbing with hard duration sync")]
#[command(
    long_about = "Dub a video/audio file into another language: the Gemini API transcribes, \
translates and voices the content, and the result is time-stretched to match the source exactly."
)]
struct Cli {
    /// Input video/audio file (omit with --interactive)
    input: Option<PathBuf>,

    /// Target language code (e.g. bn, en, ja)
    #[arg(short, long)]
    language: Option<String>,

    /// Voice for the synthesized speech: Kore, Puck, Charon, Fenrir, Zephyr
    #[arg(long)]
    voice: Option<String>,

    /// Directory to write artifacts into (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also encode an MP3 artifact
    #[arg(long)]
    mp3: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Pick options interactively
    #[arg(short, long)]
    interactive: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn default_output_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let (input, language, voice, mp3, config) = if cli.interactive {
        let wizard = dubsync::interactive::run_interactive_wizard()?;
        (
            wizard.input,
            wizard.language,
            wizard.voice,
            wizard.mp3,
            wizard.config,
        )
    } else {
        let config = Config::load().context("Failed to load configuration")?;
        let input = cli
            .input
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Input file required (or use --interactive)"))?;
        let language = cli
            .language
            .clone()
            .unwrap_or_else(|| config.default_language.clone());
        let voice: Voice = match cli.voice.as_deref() {
            Some(v) => v.parse().map_err(|e: String| anyhow::anyhow!(e))?,
            None => config.default_voice,
        };
        (input, language, voice, cli.mp3, config)
    };

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    config.validate().context("Configuration validation failed")?;
    let Some(api_key) = config.gemini_api_key.clone() else {
        anyhow::bail!("GEMINI_API_KEY not set");
    };

    if !is_supported_language(&language) {
        warn!(
            "No prompt name for language '{}'; the service will see the raw code",
            language
        );
    }

    info!("Input:    {}", input.display());
    info!(
        "Language: {} ({})",
        language,
        language_code_to_name(&language)
    );
    info!("Voice:    {}", voice);

    let client = GeminiClient::new(api_key)
        .with_translation_model(config.translation_model.clone())
        .with_tts_model(config.tts_model.clone());

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            eprintln!("\nCancellation requested, finishing the current step...");
            cancel.cancel();
        })
        .context("Failed to install Ctrl-C handler")?;
    }

    let mut job = Job::new(input.clone(), language, voice)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Progress>();
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let spinner_task = {
        let spinner = spinner.clone();
        tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                spinner.set_message(update.to_string());
            }
        })
    };

    let result = run_dub_job(&mut job, &client, &cancel, Some(&tx), mp3).await;

    drop(tx);
    let _ = spinner_task.await;
    spinner.finish_and_clear();

    match result {
        Ok(result) => {
            let dest = cli
                .output_dir
                .clone()
                .unwrap_or_else(|| default_output_dir(&input));
            let persisted = job.persist_artifacts(&dest)?;
            job.release();

            print_summary(&result);
            println!("  Written to {}:", dest.display());
            for path in &persisted {
                println!("    {}", path.display());
            }
            Ok(())
        }
        Err(DubError::Cancelled) => {
            job.release();
            println!("Cancelled.");
            Ok(())
        }
        Err(e) => {
            // Every failure kind collapses to one user-facing message; the
            // log line keeps the specific kind for diagnostics.
            error!("Dubbing failed: {}", e);
            job.release();
            eprintln!(
                "{}",
                console::style("Dubbing could not be completed. Try a smaller file.").red()
            );
            std::process::exit(1);
        }
    }
}
