pub mod codec;
pub mod config;
pub mod error;
pub mod gemini;
pub mod ingest;
pub mod interactive;
pub mod job;
pub mod lang;
pub mod pipeline;
pub mod sync;

pub use codec::AudioBuffer;
pub use config::Config;
pub use error::{DubError, Result};
pub use gemini::{GeminiClient, TranslationResult};
pub use ingest::{extract_and_compress, CompressedAudio};
pub use job::{CancelToken, DubResult, Job};
pub use lang::Voice;
pub use pipeline::{
    print_summary, run_dub_job, PipelineResult, PipelineStats, Progress, ProgressSender,
};
pub use sync::match_duration;
