use async_trait::async_trait;

use crate::models::{LeaderboardKey, ScoredEntity};

/// Supplier of the raw scored records a leaderboard is built from: best
/// record per player for a chart, current standing per eligible team for
/// an event division.
///
/// Implemented outside this crate against whatever owns the scores; the
/// registry calls it once per key on first use (and again after eviction).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreSource: Send + Sync {
    /// All currently-qualifying entries for `key`, in no particular order.
    async fn qualifying_entries(&self, key: LeaderboardKey) -> anyhow::Result<Vec<ScoredEntity>>;
}
