use std::env;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Upper bound on one first-time leaderboard build, including the
    /// score source round trip.
    pub build_timeout_secs: u64,
    /// How many built boards the registry keeps before evicting cold ones.
    pub max_cached_leaderboards: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build_timeout_secs: 10,
            max_cached_leaderboards: 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> ServiceResult<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            build_timeout_secs: parse_env("LEADERBOARD_BUILD_TIMEOUT_SECS", 10)?,
            max_cached_leaderboards: parse_env("LEADERBOARD_MAX_CACHED", 1024)?,
        })
    }
}

fn parse_env<T: FromStr>(name: &str, default: T) -> ServiceResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ServiceError::Config(format!("{} must be a valid integer: {:?}", name, raw))),
        Err(_) => Ok(default),
    }
}
