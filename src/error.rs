//! Error types for transcript acquisition
//!
//! None of these cross `TranscriptService::fetch_transcript`; they exist so strategies
//! and parsers can use `?` internally before their failures are absorbed.

use crate::strategies::StrategyKind;

/// Result type for transcript operations
pub type Result<T> = std::result::Result<T, TranscriptError>;

/// Failures raised while acquiring caption data
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("No player configuration found in page for {0}")]
    MissingPlayerConfig(String),

    #[error("No caption tracks listed for {0}")]
    NoCaptionTracks(String),

    #[error("Strategy {0} is not configured")]
    StrategyDisabled(StrategyKind),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Failures raised by the caption wire-format parsers.
///
/// "No entries" is not a parse error; parsers return an empty list for that.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("payload is empty")]
    EmptyPayload,

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed document: {0}")]
    Malformed(String),
}
