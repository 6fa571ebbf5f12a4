/// Strategy A: list tracks via the timed-text endpoint, then download the chosen track
use super::{StrategyKind, StrategyOutput, TranscriptStrategy};
use crate::captions::listing::{listing_url, parse_track_listing};
use crate::captions::{json3, select_track, with_format_param, xml, CaptionFormat};
use crate::error::{Result, TranscriptError};
use crate::fetcher::HttpFetcher;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub struct TimedTextStrategy {
    fetcher: Arc<dyn HttpFetcher>,
    format: CaptionFormat,
}

impl TimedTextStrategy {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, format: CaptionFormat) -> Self {
        Self { fetcher, format }
    }
}

#[async_trait]
impl TranscriptStrategy for TimedTextStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TimedText
    }

    async fn try_fetch(&self, video_id: &str, language: &str) -> Result<StrategyOutput> {
        let listing = self.fetcher.get_text(&listing_url(video_id), None).await?;
        let tracks = parse_track_listing(&listing, video_id)?;
        let track = select_track(&tracks, language)
            .ok_or_else(|| TranscriptError::NoCaptionTracks(video_id.to_string()))?;

        debug!(
            "Timed-text track for {}: {} (auto-generated: {})",
            video_id, track.language_code, track.is_auto_generated
        );

        let content_url = with_format_param(&track.source_url, self.format);
        let body = self.fetcher.get_text(&content_url, None).await?;
        let entries = match self.format {
            CaptionFormat::Json3 => json3::parse_json3(&body)?,
            CaptionFormat::Xml => xml::parse_timed_xml(&body)?,
        };

        let available_languages = tracks.iter().map(|t| t.language_code.clone()).collect();
        Ok(StrategyOutput::from_entries(video_id, &track.language_code, available_languages, entries))
    }
}
