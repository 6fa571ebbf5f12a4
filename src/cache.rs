/// In-process transcript cache with single-flight acquisition
///
/// Concurrent callers asking for the same (video id, language) share one strategy cascade:
/// the first caller runs it, the others wait on the same cell. Empty transcripts are handed
/// back to every waiter but never retained, so a later request tries again.
use crate::config::CacheConfig;
use crate::transcript::Transcript;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

type CacheKey = (String, String);

struct Slot {
    cell: Arc<OnceCell<Transcript>>,
    created_at: Instant,
}

impl Slot {
    fn new() -> Self {
        Self {
            cell: Arc::new(OnceCell::new()),
            created_at: Instant::now(),
        }
    }

    /// Still being fetched; such a slot must stay so waiters keep sharing it
    fn in_flight(&self) -> bool {
        !self.cell.initialized()
    }

    /// Only settled slots expire
    fn is_expired(&self, ttl: Duration) -> bool {
        !self.in_flight() && self.created_at.elapsed() >= ttl
    }
}

/// Point-in-time cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

pub struct TranscriptCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    ttl: Duration,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TranscriptCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_seconds), config.max_entries)
    }

    fn key(video_id: &str, language: &str) -> CacheKey {
        (video_id.to_string(), language.to_ascii_lowercase())
    }

    /// Return the cached transcript for the key, or run `fetch` exactly once across
    /// concurrent callers and share its result.
    pub async fn get_or_fetch<F, Fut>(&self, video_id: &str, language: &str, fetch: F) -> Transcript
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Transcript>,
    {
        let key = Self::key(video_id, language);
        let cell = self.slot_for(&key).await;

        let mut fetched_here = false;
        let transcript = cell
            .get_or_init(|| {
                fetched_here = true;
                fetch()
            })
            .await
            .clone();

        if fetched_here {
            self.misses.fetch_add(1, Ordering::Relaxed);
            if transcript.is_empty() {
                self.release_if_current(&key, &cell).await;
            } else {
                info!("💾 Cached transcript for {} ({})", video_id, key.1);
            }
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit for {} ({})", video_id, key.1);
        }

        transcript
    }

    async fn slot_for(&self, key: &CacheKey) -> Arc<OnceCell<Transcript>> {
        let mut slots = self.slots.lock().await;

        if let Some(slot) = slots.get(key) {
            if !slot.is_expired(self.ttl) {
                return slot.cell.clone();
            }
            debug!("⏰ Cache entry expired for {} ({})", key.0, key.1);
            slots.remove(key);
        }

        if slots.len() >= self.max_entries {
            let ttl = self.ttl;
            slots.retain(|_, slot| !slot.is_expired(ttl));
        }
        if slots.len() >= self.max_entries {
            // In-flight slots are never evicted; the map may briefly exceed capacity
            let oldest = slots
                .iter()
                .filter(|(_, slot)| !slot.in_flight())
                .min_by_key(|(_, slot)| slot.created_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!("Evicting cached transcript for {} ({})", oldest.0, oldest.1);
                slots.remove(&oldest);
            }
        }

        let slot = Slot::new();
        let cell = slot.cell.clone();
        slots.insert(key.clone(), slot);
        cell
    }

    /// Drop the slot unless it has already been replaced by a newer one
    async fn release_if_current(&self, key: &CacheKey, cell: &Arc<OnceCell<Transcript>>) {
        let mut slots = self.slots.lock().await;
        if slots.get(key).is_some_and(|slot| Arc::ptr_eq(&slot.cell, cell)) {
            slots.remove(key);
        }
    }

    pub async fn invalidate(&self, video_id: &str, language: &str) -> bool {
        self.slots.lock().await.remove(&Self::key(video_id, language)).is_some()
    }

    pub async fn clear(&self) {
        self.slots.lock().await.clear();
        info!("🧹 Transcript cache cleared");
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.slots.lock().await.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
