/// Error types for leaderboard-service
use thiserror::Error;

use crate::models::LeaderboardKey;

#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    #[error("Leaderboard build failed: {0}")]
    BuildFailure(String),

    #[error("Leaderboard build for {key} timed out after {elapsed_ms}ms")]
    BuildTimeout { key: LeaderboardKey, elapsed_ms: u64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
