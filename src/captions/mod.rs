/// Caption tracks and the wire-format parsers that turn caption payloads into entries
///
/// Parsers never fail on odd-but-readable input: unexpected shapes yield zero entries.
/// Only payloads that cannot be read at all produce a `ParseError`.
pub mod json3;
pub mod listing;
pub mod player_config;
pub mod selector;
pub mod xml;

pub use selector::select_track;

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// A caption track offered for a video.
///
/// Transient: produced by a listing step, consumed by the selector, then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language_code: String,
    /// True for speech-recognition (`kind="asr"`) tracks
    pub is_auto_generated: bool,
    /// Where the track content can be fetched
    pub source_url: String,
    /// Human-readable track name, when the source provides one
    pub name: Option<String>,
}

impl CaptionTrack {
    pub fn new(language_code: impl Into<String>, is_auto_generated: bool, source_url: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            is_auto_generated,
            source_url: source_url.into(),
            name: None,
        }
    }

    /// Language prefix before the first `-`, e.g. `en` for `en-US`
    pub fn language_prefix(&self) -> &str {
        language_prefix(&self.language_code)
    }
}

/// Wire format requested from the timed-text endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionFormat {
    /// Event/segment JSON (`fmt=json3`)
    Json3,
    /// `<text start dur>` XML (`fmt=srv1`)
    Xml,
}

impl CaptionFormat {
    /// Value of the `fmt` query parameter
    pub fn query_value(self) -> &'static str {
        match self {
            CaptionFormat::Json3 => "json3",
            CaptionFormat::Xml => "srv1",
        }
    }
}

impl fmt::Display for CaptionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_value())
    }
}

impl Default for CaptionFormat {
    fn default() -> Self {
        CaptionFormat::Json3
    }
}

pub(crate) fn language_prefix(code: &str) -> &str {
    code.split('-').next().unwrap_or(code)
}

/// Append `fmt=<format>` to a caption URL unless it already names a format
pub fn with_format_param(caption_url: &str, format: CaptionFormat) -> String {
    match Url::parse(caption_url) {
        Ok(mut url) => {
            if url.query_pairs().any(|(key, _)| key == "fmt") {
                return caption_url.to_string();
            }
            url.query_pairs_mut().append_pair("fmt", format.query_value());
            url.to_string()
        }
        Err(_) => {
            if caption_url.contains("fmt=") {
                caption_url.to_string()
            } else {
                let separator = if caption_url.contains('?') { '&' } else { '?' };
                format!("{}{}fmt={}", caption_url, separator, format.query_value())
            }
        }
    }
}
