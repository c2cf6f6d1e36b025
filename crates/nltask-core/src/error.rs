use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// Reasons the extraction service could not produce structured fields.
///
/// These never reach HTTP callers: task creation degrades instead.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Extraction service is not configured: {0}")]
    NotConfigured(String),

    #[error("Extraction request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Extraction request timed out")]
    Timeout,

    #[error("Extraction service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed extraction response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExtractionError::Timeout
        } else if err.is_decode() {
            ExtractionError::MalformedResponse(err.to_string())
        } else {
            ExtractionError::Transport(err)
        }
    }
}
