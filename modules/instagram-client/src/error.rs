use thiserror::Error;

pub type Result<T> = std::result::Result<T, InstagramError>;

#[derive(Debug, Error)]
pub enum InstagramError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cannot derive post id from URL: {0}")]
    BadUrl(String),

    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Session error: {0}")]
    Session(String),
}

impl From<reqwest::Error> for InstagramError {
    fn from(err: reqwest::Error) -> Self {
        InstagramError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for InstagramError {
    fn from(err: serde_json::Error) -> Self {
        InstagramError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for InstagramError {
    fn from(err: std::io::Error) -> Self {
        InstagramError::Session(err.to_string())
    }
}
