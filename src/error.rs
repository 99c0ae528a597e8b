use thiserror::Error;

/// Errors produced while turning an audio file into a MIDI event stream.
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed pitch candidate at frame {frame}: frequency {frequency} Hz")]
    MalformedCandidate { frequency: f32, frame: usize },

    #[error("failed to decode audio: {0}")]
    AudioDecode(#[from] hound::Error),

    #[error("failed to resample audio: {0}")]
    Resample(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TranscribeError>;
