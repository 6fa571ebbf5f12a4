/// Transcript acquisition strategies
///
/// Each strategy is one self-contained way of getting from a video id to caption entries.
/// Strategies are unreliable by nature: `TranscriptStrategy::fetch` absorbs every failure
/// and reports it as an empty output so the orchestrator can fall through to the next one.
pub mod data_api;
pub mod timedtext;
pub mod watch_page;

pub use data_api::DataApiStrategy;
pub use timedtext::TimedTextStrategy;
pub use watch_page::WatchPageStrategy;

use crate::config::Config;
use crate::error::Result;
use crate::fetcher::HttpFetcher;
use crate::transcript::{Transcript, TranscriptEntry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Identifies an acquisition strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Track listing plus direct timed-text download
    TimedText,
    /// Caption tracks scraped from the public watch page
    WatchPage,
    /// Official captions listing; detects captions but cannot download them
    DataApi,
}

impl StrategyKind {
    /// Default priority order
    pub fn all() -> Vec<StrategyKind> {
        vec![StrategyKind::TimedText, StrategyKind::WatchPage, StrategyKind::DataApi]
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::TimedText => "timed-text",
            StrategyKind::WatchPage => "watch-page",
            StrategyKind::DataApi => "data-api",
        };
        f.write_str(name)
    }
}

/// What a single strategy attempt produced
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutput {
    /// A transcript with at least one entry
    Found(Transcript),
    /// Nothing usable
    Empty,
    /// Captions exist for the video but their content cannot be downloaded
    CaptionsInaccessible { languages: Vec<String> },
}

impl StrategyOutput {
    /// Wrap parsed entries, treating an entry-less result as `Empty`
    pub fn from_entries(
        video_id: &str,
        language: &str,
        available_languages: Vec<String>,
        entries: Vec<TranscriptEntry>,
    ) -> Self {
        if entries.is_empty() {
            return StrategyOutput::Empty;
        }
        StrategyOutput::Found(Transcript::new(video_id, language, available_languages, entries))
    }

    pub fn entry_count(&self) -> usize {
        match self {
            StrategyOutput::Found(transcript) => transcript.len(),
            _ => 0,
        }
    }
}

/// One way of acquiring caption data for a (video id, language) pair
#[async_trait]
pub trait TranscriptStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Attempt acquisition, propagating failures with `?`
    async fn try_fetch(&self, video_id: &str, language: &str) -> Result<StrategyOutput>;

    /// Attempt acquisition; failures are logged and reported as `StrategyOutput::Empty`
    async fn fetch(&self, video_id: &str, language: &str) -> StrategyOutput {
        match self.try_fetch(video_id, language).await {
            Ok(output) => output,
            Err(e) => {
                debug!("{} strategy failed for {}: {}", self.kind(), video_id, e);
                StrategyOutput::Empty
            }
        }
    }
}

/// Build the configured strategies in priority order
pub fn build_strategies(config: &Config, fetcher: Arc<dyn HttpFetcher>) -> Vec<Box<dyn TranscriptStrategy>> {
    config
        .captions
        .strategies
        .iter()
        .map(|kind| -> Box<dyn TranscriptStrategy> {
            match kind {
                StrategyKind::TimedText => Box::new(TimedTextStrategy::new(fetcher.clone(), config.captions.format)),
                StrategyKind::WatchPage => Box::new(WatchPageStrategy::new(fetcher.clone())),
                StrategyKind::DataApi => Box::new(DataApiStrategy::new(fetcher.clone(), config.api.api_key.clone())),
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::error::{Result, TranscriptError};
    use crate::fetcher::HttpFetcher;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory fetcher answering by URL substring
    #[derive(Default)]
    pub struct StubFetcher {
        routes: Vec<(String, String)>,
        calls: AtomicUsize,
        accept_languages: Mutex<Vec<Option<String>>>,
    }

    impl StubFetcher {
        pub fn route(mut self, url_fragment: &str, body: &str) -> Self {
            self.routes.push((url_fragment.to_string(), body.to_string()));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn accept_languages(&self) -> Vec<Option<String>> {
            self.accept_languages.lock().map(|v| v.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl HttpFetcher for StubFetcher {
        async fn get_text(&self, url: &str, accept_language: Option<&str>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut seen) = self.accept_languages.lock() {
                seen.push(accept_language.map(str::to_string));
            }
            self.routes
                .iter()
                .find(|(fragment, _)| url.contains(fragment.as_str()))
                .map(|(_, body)| body.clone())
                .ok_or_else(|| TranscriptError::HttpStatus {
                    status: 404,
                    url: url.to_string(),
                })
        }
    }
}
