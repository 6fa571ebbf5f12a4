/// YouTube Tools - Rust Implementation
///
/// Best-effort transcript acquisition for YouTube videos. Several independent strategies
/// are tried in order and normalized into one canonical `Transcript` model, which can be
/// searched, summarized and exported as SRT or WebVTT.

pub mod cache;
pub mod captions;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod service;
pub mod strategies;
pub mod transcript;
pub mod video_id;

// Re-export main types for easy access
pub use crate::cache::{CacheStats, TranscriptCache};
pub use crate::captions::{select_track, CaptionFormat, CaptionTrack};
pub use crate::config::{ApiKeyStatus, Config, ConfigBuilder};
pub use crate::error::{ParseError, Result, TranscriptError};
pub use crate::fetcher::{HttpFetcher, ReqwestFetcher};
pub use crate::service::{AttemptOutcome, FetchReport, OrchestratorState, StrategyAttempt, TranscriptService};
pub use crate::strategies::{StrategyKind, StrategyOutput, TranscriptStrategy};
pub use crate::transcript::{SubtitleFormat, Transcript, TranscriptEntry, TranscriptSummary};
pub use crate::video_id::{extract_video_id, is_valid_video_id};
