//! Error types for the playback controller

use thiserror::Error;

/// Result type alias for resolver and controller operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving sources or driving playback
///
/// None of these reach the caller of the control surface: the controller
/// degrades to the informational card or ignores the call, and logs the error.
#[derive(Error, Debug)]
pub enum Error {
    /// The URL matched none of the known source patterns
    #[error("Unclassifiable source: {0}")]
    UnclassifiableSource(String),

    /// A provider host matched but its video ID could not be extracted
    #[error("Failed to extract {provider} video ID from {url}")]
    IdExtractionFailed { provider: String, url: String },

    /// A submitted link is not on one of the supported hosts
    #[error("Unsupported link: {0}")]
    UnsupportedLink(String),

    /// A picked file whose MIME type is not `video/*`
    #[error("Not a video file (type `{0}`)")]
    NotAVideoFile(String),

    /// A control call that the active strategy cannot honour
    #[error("Operation `{operation}` is not supported by the {strategy} strategy")]
    UnsupportedControlOperation {
        operation: &'static str,
        strategy: &'static str,
    },

    /// Playback rate outside the allowed set
    #[error("Playback rate {0} is not one of the allowed rates")]
    InvalidPlaybackRate(f64),

    /// Non-finite or otherwise unusable numeric input
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Event name that is not part of the notification contract
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Settings snapshot could not be read or written
    #[error("Settings error: {0}")]
    Settings(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
