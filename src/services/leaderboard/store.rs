//! One ordered, unique, contiguously-ranked collection per leaderboard key.
//!
//! Mutations take the write lock, reads the read lock, so a reader can
//! never observe a duplicate identity, a rank gap, or a half-applied
//! upsert. All operations are CPU-bound and never touch I/O.

use std::collections::HashSet;

use parking_lot::RwLock;
use uuid::Uuid;

use super::order_stats::{OrderKey, RankTree};
use crate::models::{RankEntry, ScoredEntity};

/// Sentinel `count` for [`LeaderboardStore::range_by_rank`]: take every
/// entry from `start_rank` to the end of the board.
pub const RANGE_TO_END: i64 = -1;

#[derive(Debug, Default)]
pub struct LeaderboardStore {
    inner: RwLock<RankTree>,
}

impl LeaderboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk load: sort once by the ranking comparator, drop duplicate
    /// identities keeping the better-ranked occurrence, then build a
    /// balanced tree in O(n).
    pub fn from_entries(mut entries: Vec<ScoredEntity>) -> Self {
        entries.sort_unstable_by(|a, b| OrderKey::of(a).cmp(&OrderKey::of(b)));
        let mut seen = HashSet::with_capacity(entries.len());
        entries.retain(|e| seen.insert(e.identity));
        Self {
            inner: RwLock::new(RankTree::from_sorted(&entries)),
        }
    }

    /// Insert or reposition one entry. Always succeeds; an existing
    /// identity is replaced in place rather than duplicated.
    pub fn upsert(&self, entity: ScoredEntity) {
        self.inner.write().upsert(entity);
    }

    /// Remove one identity. A no-op, not an error, when absent.
    pub fn remove(&self, identity: &Uuid) -> bool {
        self.inner.write().remove(identity)
    }

    /// 1-based rank, or `None` for an unranked identity. Agrees with the
    /// position `range_by_rank` would return the identity at.
    pub fn rank(&self, identity: &Uuid) -> Option<i64> {
        self.inner.read().rank(identity)
    }

    pub fn contains(&self, identity: &Uuid) -> bool {
        self.inner.read().contains(identity)
    }

    pub fn get(&self, identity: &Uuid) -> Option<ScoredEntity> {
        self.inner.read().get(identity)
    }

    /// Entries at ranks `start_rank..start_rank + count`, each carrying its
    /// absolute rank.
    ///
    /// `start_rank` is clamped to a minimum of 1; a start past the end
    /// yields an empty result; a non-positive `count` yields an empty
    /// result except for the [`RANGE_TO_END`] sentinel, which means "to the
    /// end of the board". The result is never padded: its length is
    /// `min(count, len - start_rank + 1)`.
    pub fn range_by_rank(&self, start_rank: i64, count: i64) -> Vec<RankEntry> {
        let tree = self.inner.read();
        let total = tree.len() as i64;
        let start = start_rank.max(1);
        if start > total {
            return Vec::new();
        }
        let count = if count == RANGE_TO_END { total } else { count };
        if count <= 0 {
            return Vec::new();
        }
        let take = count.min(total - start + 1);
        tree.range((start - 1) as usize, take as usize)
            .into_iter()
            .enumerate()
            .map(|(i, entity)| RankEntry {
                rank: start + i as i64,
                entity,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn entity(n: u128, score: i64) -> ScoredEntity {
        ScoredEntity {
            identity: id(n),
            score,
            tie_break: n as i64,
            payload: id(n + 0x1000),
        }
    }

    fn store_of(count: u128) -> LeaderboardStore {
        // Identity n ends up at rank n.
        LeaderboardStore::from_entries((1..=count).map(|n| entity(n, 100_000 - n as i64)).collect())
    }

    #[test]
    fn bulk_build_drops_duplicate_identities() {
        let store = LeaderboardStore::from_entries(vec![
            entity(1, 500),
            entity(2, 400),
            ScoredEntity {
                identity: id(1),
                score: 300,
                tie_break: 99,
                payload: id(7),
            },
        ]);

        assert_eq!(store.len(), 2);
        // The better-ranked occurrence survives.
        assert_eq!(store.get(&id(1)).map(|e| e.score), Some(500));
    }

    #[test]
    fn start_rank_is_clamped_to_one() {
        let store = store_of(5);
        let rows = store.range_by_rank(-3, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn start_past_end_is_empty() {
        let store = store_of(5);
        assert!(store.range_by_rank(6, 10).is_empty());
        assert!(store.range_by_rank(100, RANGE_TO_END).is_empty());
    }

    #[test]
    fn non_positive_count_is_empty_except_sentinel() {
        let store = store_of(5);
        assert!(store.range_by_rank(1, 0).is_empty());
        assert!(store.range_by_rank(1, -2).is_empty());

        let all = store.range_by_rank(1, RANGE_TO_END);
        assert_eq!(all.len(), 5);
        let to_end = store.range_by_rank(3, RANGE_TO_END);
        assert_eq!(to_end.len(), 3);
        assert_eq!(to_end[0].rank, 3);
    }

    #[test]
    fn result_is_truncated_never_padded() {
        let store = store_of(5);
        let rows = store.range_by_rank(4, 10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.last().map(|r| r.rank), Some(5));
    }

    #[test]
    fn ranks_are_contiguous_and_absolute() {
        let store = store_of(30);
        let rows = store.range_by_rank(11, 7);
        let ranks: Vec<i64> = rows.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, (11..=17).collect::<Vec<_>>());
        for row in &rows {
            assert_eq!(store.rank(&row.entity.identity), Some(row.rank));
        }
    }

    #[test]
    fn upsert_twice_is_idempotent() {
        let store = store_of(10);
        let e = entity(3, 100_000 - 3);
        store.upsert(e);
        store.upsert(e);
        assert_eq!(store.len(), 10);
        assert_eq!(store.rank(&id(3)), Some(3));
    }

    #[test]
    fn upsert_then_remove_round_trips() {
        let store = store_of(10);
        let before = store.len();

        store.upsert(entity(77, 99_999));
        assert_eq!(store.len(), before + 1);
        assert!(store.rank(&id(77)).is_some());

        store.remove(&id(77));
        assert_eq!(store.len(), before);
        assert_eq!(store.rank(&id(77)), None);
    }
}
