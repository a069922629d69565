use thiserror::Error;

pub type Result<T> = std::result::Result<T, YtdlpError>;

#[derive(Debug, Error)]
pub enum YtdlpError {
    #[error("Failed to launch yt-dlp: {0}")]
    Launch(String),

    #[error("yt-dlp timed out after {0}s")]
    Timeout(u64),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for YtdlpError {
    fn from(err: serde_json::Error) -> Self {
        YtdlpError::Parse(err.to_string())
    }
}
