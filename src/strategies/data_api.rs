/// Strategy C: probe the official captions listing.
///
/// Downloading caption content through the Data API needs OAuth with download permission,
/// so this strategy never yields entries. It reports whether captions exist, which the
/// orchestrator surfaces in its diagnostics.
use super::{StrategyKind, StrategyOutput, TranscriptStrategy};
use crate::config::ApiKeyStatus;
use crate::error::Result;
use crate::fetcher::HttpFetcher;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Data API captions listing endpoint
pub const CAPTIONS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/captions";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CaptionListResponse {
    items: Vec<CaptionResource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CaptionResource {
    snippet: Option<CaptionSnippet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CaptionSnippet {
    language: Option<String>,
}

pub struct DataApiStrategy {
    fetcher: Arc<dyn HttpFetcher>,
    api_key: Option<String>,
}

impl DataApiStrategy {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, api_key: Option<String>) -> Self {
        Self { fetcher, api_key }
    }

    /// Key to send, if one is configured and is not a placeholder
    fn usable_key(&self) -> Option<&str> {
        let key = self.api_key.as_deref()?;
        ApiKeyStatus::of(Some(key)).allows_requests().then_some(key)
    }
}

#[async_trait]
impl TranscriptStrategy for DataApiStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DataApi
    }

    async fn try_fetch(&self, video_id: &str, _language: &str) -> Result<StrategyOutput> {
        let Some(key) = self.usable_key() else {
            debug!("Data API key not configured, skipping captions probe");
            return Ok(StrategyOutput::Empty);
        };

        let url = format!(
            "{}?videoId={}&part=snippet&key={}",
            CAPTIONS_ENDPOINT,
            urlencoding::encode(video_id),
            urlencoding::encode(key)
        );
        let body = self.fetcher.get_text(&url, None).await?;
        let listing: CaptionListResponse = serde_json::from_str(&body)?;

        if listing.items.is_empty() {
            debug!("Data API lists no captions for {}", video_id);
            return Ok(StrategyOutput::Empty);
        }

        let languages: Vec<String> = listing
            .items
            .into_iter()
            .filter_map(|item| item.snippet.and_then(|snippet| snippet.language))
            .collect();
        info!(
            "Captions exist for video {} ({} tracks) but require OAuth to download",
            video_id,
            languages.len()
        );

        Ok(StrategyOutput::CaptionsInaccessible { languages })
    }
}
