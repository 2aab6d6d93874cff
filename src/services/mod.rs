pub mod leaderboard;
pub mod score_source;

pub use leaderboard::{LeaderboardRegistry, LeaderboardStore, RankQueryService, RANGE_TO_END};
pub use score_source::ScoreSource;
