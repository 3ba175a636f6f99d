use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Parse Error at line {line}: {reason}")]
    ParseError { line: usize, reason: String },

    #[error("Config Error: {0}")]
    ConfigError(String),

    #[error("Encoder Error: {0}")]
    EncoderError(String),

    #[cfg(feature = "video")]
    #[error("OpenCV Error: {0}")]
    OpenCvError(#[from] opencv::Error),
}
