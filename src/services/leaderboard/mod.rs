//! Per-key ordered rankings: the store, its lazy registry, and the
//! windowed query composition on top.

mod order_stats;
pub mod query;
pub mod registry;
pub mod store;

pub use query::RankQueryService;
pub use registry::LeaderboardRegistry;
pub use store::{LeaderboardStore, RANGE_TO_END};
