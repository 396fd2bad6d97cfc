//! Error types for relay operations

/// Result type for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Error types for relay operations
#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("No valid video parts found for {video_id} at quality {quality}")]
    NoSegmentsFound { video_id: String, quality: String },

    #[error("Failed to download part {index}: {reason}")]
    SegmentFetchFailed { index: u32, reason: String },

    #[error("Error checking part {index}: {reason}")]
    TransientProbe { index: u32, reason: String },

    #[error("Transfer for {video_id} cancelled by consumer")]
    Cancelled { video_id: String },

    #[error("Invalid game type: {0}")]
    InvalidGame(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RelayError {
    /// Whether the error was caused by the caller rather than upstream
    pub fn is_client_error(&self) -> bool {
        matches!(self, RelayError::MissingParameter(_) | RelayError::InvalidGame(_))
    }
}
