/// Strategy orchestration
///
/// `TranscriptService` runs the configured strategies strictly in order and stops at the
/// first one that yields entries. Nothing escapes `fetch_transcript`: strategy failures are
/// absorbed by the strategies themselves, and a panic inside a strategy is caught here and
/// turned into the empty transcript.
use crate::cache::TranscriptCache;
use crate::config::Config;
use crate::error::{Result, TranscriptError};
use crate::fetcher::{HttpFetcher, ReqwestFetcher};
use crate::strategies::{build_strategies, StrategyKind, StrategyOutput, TranscriptStrategy};
use crate::transcript::Transcript;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Progress of one acquisition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    NotStarted,
    /// Index into the strategy list
    TryingStrategy(usize),
    Done,
}

/// What one strategy produced during a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Found { entries: usize },
    Empty,
    CaptionsInaccessible { languages: Vec<String> },
    Panicked,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyAttempt {
    pub strategy: StrategyKind,
    pub outcome: AttemptOutcome,
    pub elapsed_ms: u64,
}

/// Transcript plus a record of how it was obtained
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub transcript: Transcript,
    pub attempts: Vec<StrategyAttempt>,
    pub started_at: DateTime<Utc>,
}

impl FetchReport {
    /// Languages of captions that exist but could not be downloaded, if any strategy saw them
    pub fn captions_inaccessible(&self) -> Option<&[String]> {
        self.attempts.iter().find_map(|attempt| match &attempt.outcome {
            AttemptOutcome::CaptionsInaccessible { languages } => Some(languages.as_slice()),
            _ => None,
        })
    }

    pub fn winning_strategy(&self) -> Option<StrategyKind> {
        self.attempts
            .iter()
            .find(|attempt| matches!(attempt.outcome, AttemptOutcome::Found { .. }))
            .map(|attempt| attempt.strategy)
    }

    pub fn total_elapsed_ms(&self) -> u64 {
        self.attempts.iter().map(|attempt| attempt.elapsed_ms).sum()
    }
}

pub struct TranscriptService {
    strategies: Vec<Box<dyn TranscriptStrategy>>,
    cache: Option<Arc<TranscriptCache>>,
}

impl TranscriptService {
    /// Build the service with a reqwest-backed fetcher
    pub fn new(config: &Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| TranscriptError::Configuration(e.to_string()))?;

        let fetcher: Arc<dyn HttpFetcher> = Arc::new(ReqwestFetcher::new(&config.http)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Build the configured strategies over a caller-supplied fetcher
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn HttpFetcher>) -> Self {
        let service = Self::with_strategies(build_strategies(config, fetcher));
        if config.cache.enabled {
            service.with_cache(Arc::new(TranscriptCache::from_config(&config.cache)))
        } else {
            service
        }
    }

    /// Use an explicit, ordered strategy list without caching
    pub fn with_strategies(strategies: Vec<Box<dyn TranscriptStrategy>>) -> Self {
        Self {
            strategies,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<TranscriptCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<TranscriptCache>> {
        self.cache.as_ref()
    }

    pub fn strategy_kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|strategy| strategy.kind()).collect()
    }

    /// Acquire the transcript for a video.
    ///
    /// Never fails: when no strategy finds captions the result is an empty transcript
    /// for the requested video id and language.
    pub async fn fetch_transcript(&self, video_id: &str, language: &str) -> Transcript {
        match &self.cache {
            Some(cache) => {
                cache
                    .get_or_fetch(video_id, language, || async move {
                        self.fetch_with_report(video_id, language).await.transcript
                    })
                    .await
            }
            None => self.fetch_with_report(video_id, language).await.transcript,
        }
    }

    /// Run the strategy cascade, bypassing the cache, and report every attempt
    pub async fn fetch_with_report(&self, video_id: &str, language: &str) -> FetchReport {
        let started_at = Utc::now();
        let mut attempts = Vec::with_capacity(self.strategies.len());
        let mut state = OrchestratorState::NotStarted;
        debug!("Orchestrator {:?} for {} ({})", state, video_id, language);

        let mut found = None;
        for (index, strategy) in self.strategies.iter().enumerate() {
            state = OrchestratorState::TryingStrategy(index);
            debug!("Orchestrator {:?}: {}", state, strategy.kind());

            let clock = Instant::now();
            let result = AssertUnwindSafe(strategy.fetch(video_id, language))
                .catch_unwind()
                .await;
            let elapsed_ms = clock.elapsed().as_millis() as u64;

            let (outcome, stop) = match result {
                Ok(StrategyOutput::Found(transcript)) => {
                    let outcome = AttemptOutcome::Found {
                        entries: transcript.len(),
                    };
                    found = Some(transcript);
                    (outcome, true)
                }
                Ok(StrategyOutput::Empty) => (AttemptOutcome::Empty, false),
                Ok(StrategyOutput::CaptionsInaccessible { languages }) => {
                    (AttemptOutcome::CaptionsInaccessible { languages }, false)
                }
                Err(_) => {
                    error!(
                        "Strategy {} panicked while fetching {} ({})",
                        strategy.kind(),
                        video_id,
                        language
                    );
                    (AttemptOutcome::Panicked, true)
                }
            };

            attempts.push(StrategyAttempt {
                strategy: strategy.kind(),
                outcome,
                elapsed_ms,
            });
            if stop {
                break;
            }
        }

        state = OrchestratorState::Done;
        debug!("Orchestrator {:?} after {} attempts", state, attempts.len());

        let transcript = match found {
            Some(transcript) => {
                info!(
                    "✅ Transcript for {} ({}) with {} entries",
                    video_id,
                    transcript.language(),
                    transcript.len()
                );
                transcript
            }
            None => {
                warn!("No transcript available for {} ({})", video_id, language);
                Transcript::empty(video_id, language)
            }
        };

        FetchReport {
            transcript,
            attempts,
            started_at,
        }
    }

    /// Run one strategy on its own, surfacing its error instead of absorbing it
    pub async fn run_strategy(&self, kind: StrategyKind, video_id: &str, language: &str) -> Result<StrategyOutput> {
        let strategy = self
            .strategies
            .iter()
            .find(|strategy| strategy.kind() == kind)
            .ok_or(TranscriptError::StrategyDisabled(kind))?;
        strategy.try_fetch(video_id, language).await
    }
}
