//! "Top-N plus neighborhood" window composition.
//!
//! Combines the permanent top segment of a board with a window around the
//! caller's own rank. Whenever the two regions would touch or overlap they
//! are merged into a single contiguous slice so no row is duplicated.

use uuid::Uuid;

use super::store::LeaderboardStore;
use crate::models::RankEntry;

/// Stateless query composition over a built [`LeaderboardStore`]. The
/// result is a pure function of the store snapshot and the three inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankQueryService;

impl RankQueryService {
    pub fn new() -> Self {
        Self
    }

    /// Compose the window for one caller.
    ///
    /// With an unranked (or anonymous) caller the result is the top
    /// segment alone. A caller ranked at most
    /// `top_range + neighborhood_range + 1` gets one contiguous slice
    /// covering both regions; a caller further down gets two disjoint
    /// slices, the second starting at
    /// `caller_rank - neighborhood_range - 1` and spanning
    /// `neighborhood_range * 2 + 1` rows.
    ///
    /// The boundary constants are load-bearing: shifting either one
    /// changes which rows are included at the merge/split boundary and the
    /// reported position of every row after it. Every returned row carries
    /// the absolute rank assigned by its slice.
    ///
    /// `top_range` and `neighborhood_range` are validated as non-negative
    /// by the calling controller.
    pub fn query(
        &self,
        store: &LeaderboardStore,
        top_range: i64,
        neighborhood_range: i64,
        caller_id: Option<Uuid>,
    ) -> Vec<RankEntry> {
        let caller_rank = caller_id.and_then(|id| store.rank(&id));

        let Some(rank) = caller_rank else {
            return store.range_by_rank(1, top_range);
        };

        if rank <= top_range + neighborhood_range + 1 {
            // The neighborhood touches or overlaps the top segment; serve
            // one slice that covers both.
            store.range_by_rank(1, top_range.max(rank + neighborhood_range))
        } else {
            let mut rows = store.range_by_rank(1, top_range);
            rows.extend(store.range_by_rank(
                rank - neighborhood_range - 1,
                neighborhood_range * 2 + 1,
            ));
            rows
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoredEntity;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    /// A board where identity n sits exactly at rank n.
    fn board(count: u128) -> LeaderboardStore {
        LeaderboardStore::from_entries(
            (1..=count)
                .map(|n| ScoredEntity {
                    identity: id(n),
                    score: 1_000_000 - n as i64,
                    tie_break: 0,
                    payload: id(n + 0x1000),
                })
                .collect(),
        )
    }

    fn ranks(rows: &[RankEntry]) -> Vec<i64> {
        rows.iter().map(|r| r.rank).collect()
    }

    #[test]
    fn caller_near_top_merges_into_one_slice() {
        let board = board(100);
        let rows = RankQueryService::new().query(&board, 10, 5, Some(id(12)));

        // 12 <= 10 + 5 + 1, take = max(10, 12 + 5) = 17.
        assert_eq!(ranks(&rows), (1..=17).collect::<Vec<_>>());
        let caller = rows.iter().find(|r| r.entity.identity == id(12)).unwrap();
        assert_eq!(caller.rank, 12);
    }

    #[test]
    fn caller_far_down_gets_two_disjoint_slices() {
        let board = board(100);
        let rows = RankQueryService::new().query(&board, 10, 5, Some(id(50)));

        let mut expected: Vec<i64> = (1..=10).collect();
        expected.extend(44..=54);
        assert_eq!(ranks(&rows), expected);

        let caller = rows.iter().find(|r| r.entity.identity == id(50)).unwrap();
        assert_eq!(caller.rank, 50);

        // No rank appears in both slices.
        let mut deduped = ranks(&rows);
        deduped.dedup();
        assert_eq!(deduped.len(), rows.len());
    }

    #[test]
    fn merge_split_boundary_is_exact() {
        let board = board(100);
        let service = RankQueryService::new();

        // Rank 16 == 10 + 5 + 1 still merges.
        let merged = service.query(&board, 10, 5, Some(id(16)));
        assert_eq!(ranks(&merged), (1..=21).collect::<Vec<_>>());

        // Rank 17 is the first split; the slices abut without overlap.
        let split = service.query(&board, 10, 5, Some(id(17)));
        let mut expected: Vec<i64> = (1..=10).collect();
        expected.extend(11..=21);
        assert_eq!(ranks(&split), expected);
    }

    #[test]
    fn unranked_caller_gets_top_segment_only() {
        let board = board(100);
        let service = RankQueryService::new();

        let anonymous = service.query(&board, 10, 5, None);
        assert_eq!(ranks(&anonymous), (1..=10).collect::<Vec<_>>());

        let unranked = service.query(&board, 10, 5, Some(id(9_999)));
        assert_eq!(anonymous, unranked);
    }

    #[test]
    fn top_range_larger_than_board_is_truncated() {
        let board = board(4);
        let rows = RankQueryService::new().query(&board, 10, 5, None);
        assert_eq!(ranks(&rows), vec![1, 2, 3, 4]);
    }

    #[test]
    fn neighborhood_extends_past_end_without_padding() {
        let board = board(100);
        let rows = RankQueryService::new().query(&board, 10, 5, Some(id(98)));

        let mut expected: Vec<i64> = (1..=10).collect();
        expected.extend(92..=100);
        assert_eq!(ranks(&rows), expected);
    }

    #[test]
    fn zero_neighborhood_degenerates_to_single_row() {
        let board = board(100);
        let rows = RankQueryService::new().query(&board, 10, 0, Some(id(50)));

        // Split branch with neighborhood 0: start = 50 - 0 - 1, count = 1.
        let mut expected: Vec<i64> = (1..=10).collect();
        expected.push(49);
        assert_eq!(ranks(&rows), expected);
    }

    #[test]
    fn empty_board_yields_empty_window() {
        let board = LeaderboardStore::new();
        let rows = RankQueryService::new().query(&board, 10, 5, Some(id(1)));
        assert!(rows.is_empty());
    }
}
