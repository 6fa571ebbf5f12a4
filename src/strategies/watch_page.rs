/// Strategy B: scrape caption tracks out of the public watch page
use super::{StrategyKind, StrategyOutput, TranscriptStrategy};
use crate::captions::player_config::{locate_caption_url, parse_caption_tracks};
use crate::captions::{json3, select_track, with_format_param, CaptionFormat};
use crate::error::{Result, TranscriptError};
use crate::fetcher::HttpFetcher;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Public watch page base
pub const WATCH_URL: &str = "https://www.youtube.com/watch";

pub struct WatchPageStrategy {
    fetcher: Arc<dyn HttpFetcher>,
}

impl WatchPageStrategy {
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self { fetcher }
    }
}

/// Resolved caption source: (content url, served language, advertised languages)
type CaptionSource = (String, String, Vec<String>);

fn resolve_caption_source(page: &str, video_id: &str, language: &str) -> Result<CaptionSource> {
    match parse_caption_tracks(page) {
        Ok(tracks) => {
            let track = select_track(&tracks, language)
                .ok_or_else(|| TranscriptError::NoCaptionTracks(video_id.to_string()))?;
            let languages = tracks.iter().map(|t| t.language_code.clone()).collect();
            let served = if track.language_code.is_empty() {
                language.to_string()
            } else {
                track.language_code.clone()
            };
            Ok((with_format_param(&track.source_url, CaptionFormat::Json3), served, languages))
        }
        Err(e) => {
            debug!("Player configuration for {} did not decode ({}), searching page text", video_id, e);
            let url = locate_caption_url(page, CaptionFormat::Json3)
                .ok_or_else(|| TranscriptError::MissingPlayerConfig(video_id.to_string()))?;
            let served = url_language(&url).unwrap_or_else(|| language.to_string());
            Ok((url, served, Vec::new()))
        }
    }
}

fn url_language(caption_url: &str) -> Option<String> {
    Url::parse(caption_url)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == "lang")
        .map(|(_, value)| value.into_owned())
}

#[async_trait]
impl TranscriptStrategy for WatchPageStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::WatchPage
    }

    async fn try_fetch(&self, video_id: &str, language: &str) -> Result<StrategyOutput> {
        let page_url = format!("{}?v={}", WATCH_URL, urlencoding::encode(video_id));
        let accept_language = format!("{},en;q=0.9", language);
        let page = self.fetcher.get_text(&page_url, Some(&accept_language)).await?;

        let (caption_url, served_language, available_languages) =
            resolve_caption_source(&page, video_id, language)?;

        let body = self.fetcher.get_text(&caption_url, None).await?;
        let entries = json3::parse_json3(&body)?;

        Ok(StrategyOutput::from_entries(video_id, &served_language, available_languages, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::testing::StubFetcher;

    const CAPTIONS: &str = r#"{"events":[{"tStartMs":500,"dDurationMs":1000,"segs":[{"utf8":"Hola"}]}]}"#;

    fn page(config: &str) -> String {
        format!("<script>var ytInitialPlayerResponse = {};</script>", config)
    }

    #[tokio::test]
    async fn test_structured_tracks() {
        let config = r#"{"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[
            {"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en","languageCode":"en","kind":"asr"},
            {"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=es","languageCode":"es"}
        ]}}}"#;
        let fetcher = Arc::new(
            StubFetcher::default()
                .route("/watch?v=abc", &page(config))
                .route("lang=es&fmt=json3", CAPTIONS),
        );
        let strategy = WatchPageStrategy::new(fetcher.clone());

        let StrategyOutput::Found(transcript) = strategy.fetch("abc", "es-MX").await else {
            panic!("expected a transcript");
        };
        assert_eq!(transcript.language(), "es");
        assert_eq!(transcript.available_languages(), &["en", "es"]);
        assert_eq!(transcript.entries()[0].start, 0.5);
        assert_eq!(fetcher.accept_languages()[0].as_deref(), Some("es-MX,en;q=0.9"));
    }

    #[tokio::test]
    async fn test_falls_back_to_text_search_when_config_is_broken() {
        let broken = r#"<script>var ytInitialPlayerResponse = {"captions":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=de"}], oops}};</script>"#;
        let fetcher = Arc::new(
            StubFetcher::default()
                .route("/watch?v=abc", broken)
                .route("lang=de&fmt=json3", CAPTIONS),
        );
        let strategy = WatchPageStrategy::new(fetcher);

        let StrategyOutput::Found(transcript) = strategy.fetch("abc", "en").await else {
            panic!("expected a transcript");
        };
        assert_eq!(transcript.language(), "de");
        assert!(transcript.available_languages().is_empty());
    }

    #[tokio::test]
    async fn test_page_without_captions() {
        let fetcher = Arc::new(StubFetcher::default().route("/watch?v=abc", "<html></html>"));
        let strategy = WatchPageStrategy::new(fetcher.clone());

        assert!(matches!(
            strategy.try_fetch("abc", "en").await,
            Err(TranscriptError::NoCaptionTracks(_))
        ));
        assert_eq!(fetcher.calls(), 1);
    }
}
