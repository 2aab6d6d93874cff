//! Lazy, race-free construction and caching of one store per key.
//!
//! Backed by a `moka` future cache: racing first-requests for the same key
//! single-flight into one build, a failed build publishes nothing, and the
//! capacity bound lets cold boards fall out under pressure (they rebuild
//! from the score source on next use).

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use tracing::{debug, info, warn};

use super::store::LeaderboardStore;
use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{LeaderboardKey, RankedEntity};
use crate::services::score_source::ScoreSource;

pub struct LeaderboardRegistry {
    boards: Cache<LeaderboardKey, Arc<LeaderboardStore>>,
    source: Arc<dyn ScoreSource>,
    build_timeout: Duration,
}

impl LeaderboardRegistry {
    pub fn new(source: Arc<dyn ScoreSource>, config: &Config) -> Self {
        let boards = Cache::builder()
            .max_capacity(config.max_cached_leaderboards)
            .build();
        Self {
            boards,
            source,
            build_timeout: Duration::from_secs(config.build_timeout_secs),
        }
    }

    /// Return the store for `key`, building it on first use.
    ///
    /// Concurrent callers for the same unbuilt key join a single in-flight
    /// build. A store is published only after it is fully built; a failed
    /// or timed-out build leaves nothing registered, so the next call
    /// retries cleanly.
    pub async fn obtain(&self, key: LeaderboardKey) -> ServiceResult<Arc<LeaderboardStore>> {
        self.boards
            .try_get_with(key, self.build_store(key))
            .await
            .map_err(|e| e.as_ref().clone())
    }

    async fn build_store(&self, key: LeaderboardKey) -> ServiceResult<Arc<LeaderboardStore>> {
        let started = Instant::now();

        let entries =
            match tokio::time::timeout(self.build_timeout, self.source.qualifying_entries(key))
                .await
            {
                Ok(Ok(entries)) => entries,
                Ok(Err(e)) => {
                    warn!(key = %key, error = %e, "Score source failed during leaderboard build");
                    return Err(ServiceError::BuildFailure(format!("{}: {}", key, e)));
                }
                Err(_) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    warn!(key = %key, elapsed_ms, "Leaderboard build timed out");
                    return Err(ServiceError::BuildTimeout { key, elapsed_ms });
                }
            };

        let store = LeaderboardStore::from_entries(entries);
        info!(
            key = %key,
            entries = store.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Leaderboard built"
        );
        Ok(Arc::new(store))
    }

    /// Apply a new or changed entity to its board after a domain event
    /// (new personal best, team unbanned, score recompute), building the
    /// board first if needed.
    pub async fn add(&self, entity: &RankedEntity) -> ServiceResult<()> {
        let key = entity.leaderboard_key();
        let store = self.obtain(key).await?;
        store.upsert(entity.scored_entity());
        debug!(key = %key, identity = %entity.identity(), "Leaderboard entry upserted");
        Ok(())
    }

    /// Drop an entity from its board after it stops qualifying (team
    /// banned or disbanded). A no-op for an identity that is not ranked.
    pub async fn remove(&self, entity: &RankedEntity) -> ServiceResult<()> {
        let key = entity.leaderboard_key();
        let store = self.obtain(key).await?;
        let removed = store.remove(&entity.identity());
        debug!(key = %key, identity = %entity.identity(), removed, "Leaderboard entry removed");
        Ok(())
    }

    /// Evict one cached board. Equivalent to returning the key to the
    /// unbuilt state; the next `obtain` rebuilds from the score source.
    pub async fn evict(&self, key: &LeaderboardKey) {
        self.boards.invalidate(key).await;
        debug!(key = %key, "Leaderboard evicted");
    }

    /// Number of currently-built boards (eventually consistent).
    pub fn built_count(&self) -> u64 {
        self.boards.entry_count()
    }
}
