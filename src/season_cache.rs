//! Short-lived cache of whole-season schedules.
//!
//! Motorsport, combat and golf return an entire season per request. The
//! scoreboard keeps the normalized season here, keyed `{sport}-{season}`, so
//! date navigation doesn't refetch it. Entries older than the TTL are
//! treated as absent and dropped on the read that finds them.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::normalize::NormalizedEvent;
use crate::sport::SportKey;

struct CacheEntry {
    events: Arc<[NormalizedEvent]>,
    fetched_at: DateTime<Utc>,
}

/// Thread-safe season cache. Entries are only ever replaced wholesale.
#[derive(Clone)]
pub struct SeasonCache {
    inner: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl SeasonCache {
    pub fn new(ttl: std::time::Duration) -> Self {
        SeasonCache {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::minutes(10)),
        }
    }

    pub fn key(sport: SportKey, season: &str) -> String {
        format!("{}-{}", sport, season)
    }

    pub async fn get(&self, key: &str) -> Option<Arc<[NormalizedEvent]>> {
        self.get_at(key, Utc::now()).await
    }

    /// Cached events for `key` as of `now`; an expired entry is evicted.
    pub async fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Arc<[NormalizedEvent]>> {
        {
            let inner = self.inner.read().await;
            match inner.get(key) {
                None => return None,
                Some(entry) if now - entry.fetched_at <= self.ttl => {
                    return Some(entry.events.clone())
                }
                Some(_) => {}
            }
        }

        let mut inner = self.inner.write().await;
        // Re-check: a writer may have refreshed the entry in between.
        if let Some(entry) = inner.get(key) {
            if now - entry.fetched_at <= self.ttl {
                return Some(entry.events.clone());
            }
        }
        inner.remove(key);
        debug!("SeasonCache: evicted expired entry {}", key);
        None
    }

    pub async fn set(&self, key: &str, events: Vec<NormalizedEvent>) -> Arc<[NormalizedEvent]> {
        self.set_at(key, events, Utc::now()).await
    }

    /// Replace the entry for `key`. Returns the shared, read-only events.
    pub async fn set_at(
        &self,
        key: &str,
        events: Vec<NormalizedEvent>,
        now: DateTime<Utc>,
    ) -> Arc<[NormalizedEvent]> {
        let events: Arc<[NormalizedEvent]> = events.into();
        self.inner.write().await.insert(
            key.to_string(),
            CacheEntry {
                events: events.clone(),
                fetched_at: now,
            },
        );
        events
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: &str) -> NormalizedEvent {
        NormalizedEvent {
            id: id.to_string(),
            ..Default::default()
        }
    }

    fn cache() -> SeasonCache {
        SeasonCache::new(std::time::Duration::from_secs(600))
    }

    #[test]
    fn test_key_format() {
        assert_eq!(SeasonCache::key(SportKey::Golf, "2025"), "golf-2025");
    }

    #[tokio::test]
    async fn test_ttl_boundary() {
        let cache = cache();
        let t = Utc.with_ymd_and_hms(2025, 4, 10, 12, 0, 0).unwrap();
        cache.set_at("golf-2025", vec![event("golf-1")], t).await;

        let hit = cache
            .get_at("golf-2025", t + Duration::minutes(9) + Duration::seconds(59))
            .await;
        assert_eq!(hit.map(|e| e.len()), Some(1));

        let miss = cache
            .get_at("golf-2025", t + Duration::minutes(10) + Duration::seconds(1))
            .await;
        assert!(miss.is_none());
        // lazily evicted
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_set_replaces_entry() {
        let cache = cache();
        let t = Utc.with_ymd_and_hms(2025, 4, 10, 12, 0, 0).unwrap();
        cache.set_at("mma-2025", vec![event("mma-1"), event("mma-2")], t).await;
        cache.set_at("mma-2025", vec![event("mma-3")], t).await;

        let events = cache.get_at("mma-2025", t).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "mma-3");
    }

    #[tokio::test]
    async fn test_unknown_key_misses() {
        let cache = cache();
        assert!(cache.get("nascar-2025").await.is_none());
        cache.set("nascar-2025", vec![event("nascar-1")]).await;
        assert!(cache.get("nascar-2025").await.is_some());
        assert!(cache.get("nascar-2024").await.is_none());
    }
}
