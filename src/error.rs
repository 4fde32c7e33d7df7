use thiserror::Error;

#[derive(Error, Debug)]
pub enum DubError {
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("No decodable audio track: {0}")]
    UnsupportedMedia(String),

    #[error("Base64 decode failed: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Malformed PCM audio: {0}")]
    MalformedAudio(String),

    #[error("Speech service returned no audio")]
    NoAudioGenerated,

    #[error("MP3 encoder unavailable: {0}")]
    EncoderUnavailable(String),

    #[error("Duration sync failed: {0}")]
    SyncFailed(String),

    #[error("Job cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DubError>;
