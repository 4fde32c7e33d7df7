use std::fs;
use std::path::PathBuf;

use console::style;
use dialoguer::{Confirm, FuzzySelect, Input, Select};

use crate::config::Config;
use crate::lang::{language_code_to_name, Voice, SUPPORTED_LANGUAGES};

const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "webm", // Video
    "mp3", "wav", "flac", "m4a", "ogg", "aac", // Audio
];

pub struct InteractiveResult {
    pub input: PathBuf,
    pub language: String,
    pub voice: Voice,
    pub mp3: bool,
    pub config: Config,
}

pub fn run_interactive_wizard() -> anyhow::Result<InteractiveResult> {
    print_header();

    // Step 1: Check/Setup API Key
    let config = setup_api_key()?;

    // Step 2: Select source file
    let input = select_source_file()?;

    // Step 3: Select target language
    let language = select_language(&config.default_language)?;

    // Step 4: Select voice
    let voice = select_voice(config.default_voice)?;

    // Step 5: MP3 artifact
    let mp3 = Confirm::new()
        .with_prompt("Also encode an MP3 artifact?")
        .default(false)
        .interact()?;

    // Step 6: Confirm
    println!();
    println!("  Input:    {}", input.display());
    println!(
        "  Language: {} ({})",
        language,
        language_code_to_name(&language)
    );
    println!("  Voice:    {}", voice);
    println!();

    if !Confirm::new()
        .with_prompt("Proceed with these settings?")
        .default(true)
        .interact()?
    {
        anyhow::bail!("Cancelled by user");
    }

    println!();

    Ok(InteractiveResult {
        input,
        language,
        voice,
        mp3,
        config,
    })
}

fn print_header() {
    println!();
    println!(
        "{}",
        style("╔═══════════════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║            dubsync - AI Dubbing Studio            ║").cyan()
    );
    println!(
        "{}",
        style("╚═══════════════════════════════════════════════════╝").cyan()
    );
    println!();
}

fn setup_api_key() -> anyhow::Result<Config> {
    let mut config = Config::load().unwrap_or_default();

    if config.gemini_api_key.is_some() {
        println!("{} API key configured", style("✓").green());
        return Ok(config);
    }

    println!("{} Gemini API key not found", style("!").yellow());
    println!("  Get one at: https://aistudio.google.com/apikey\n");

    let api_key: String = Input::new()
        .with_prompt("Enter your Gemini API key")
        .interact_text()?;

    if api_key.trim().is_empty() {
        anyhow::bail!("API key is required");
    }

    config.gemini_api_key = Some(api_key.trim().to_string());

    // Offer to save
    if Confirm::new()
        .with_prompt("Save API key to config file?")
        .default(true)
        .interact()?
    {
        save_config(&config)?;
        println!("{} API key saved to config\n", style("✓").green());
    }

    Ok(config)
}

fn save_config(config: &Config) -> anyhow::Result<()> {
    if let Some(config_path) = Config::config_file_path() {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, toml::to_string_pretty(config)?)?;
    }
    Ok(())
}

fn select_source_file() -> anyhow::Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(".")?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    if candidates.is_empty() {
        let path: String = Input::new()
            .with_prompt("Path to the video/audio file")
            .interact_text()?;
        return Ok(PathBuf::from(path.trim()));
    }

    let labels: Vec<String> = candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    let selection = FuzzySelect::new()
        .with_prompt("Select the source file")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(candidates[selection].clone())
}

fn select_language(default_code: &str) -> anyhow::Result<String> {
    let labels: Vec<String> = SUPPORTED_LANGUAGES
        .iter()
        .map(|code| format!("{} ({})", language_code_to_name(code), code))
        .collect();
    let default_index = SUPPORTED_LANGUAGES
        .iter()
        .position(|&code| code == default_code)
        .unwrap_or(0);

    let selection = FuzzySelect::new()
        .with_prompt("Target language")
        .items(&labels)
        .default(default_index)
        .interact()?;

    Ok(SUPPORTED_LANGUAGES[selection].to_string())
}

fn select_voice(default_voice: Voice) -> anyhow::Result<Voice> {
    let labels: Vec<&str> = Voice::ALL.iter().map(|v| v.as_str()).collect();
    let default_index = Voice::ALL
        .iter()
        .position(|&v| v == default_voice)
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt("Voice")
        .items(&labels)
        .default(default_index)
        .interact()?;

    Ok(Voice::ALL[selection])
}
