//! Leaderboard engine: independent per-key ordered rankings with lazy,
//! single-flight construction and "top-N plus neighborhood" windowing.
//!
//! The engine is a rebuildable in-process cache over an external score
//! source, not a system of record; evicting a board and rebuilding it is
//! always safe.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use services::{
    LeaderboardRegistry, LeaderboardStore, RankQueryService, ScoreSource, RANGE_TO_END,
};
