use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one ranking universe. Leaderboards for different keys are
/// fully independent; no cross-key invariants exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaderboardKey {
    Chart(Uuid),
    EventDivision(Uuid),
}

impl fmt::Display for LeaderboardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardKey::Chart(id) => write!(f, "chart:{}", id),
            LeaderboardKey::EventDivision(id) => write!(f, "event-division:{}", id),
        }
    }
}

/// One scored row as held by a leaderboard.
///
/// `tie_break` is the achieving moment in epoch milliseconds; when two
/// entries carry the same score the earlier one ranks higher. `payload`
/// is an opaque reference to the backing row, projected to a response DTO
/// by the calling controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredEntity {
    pub identity: Uuid,
    pub score: i64,
    pub tie_break: i64,
    pub payload: Uuid,
}

/// An entry together with its absolute 1-based rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankEntry {
    pub rank: i64,
    pub entity: ScoredEntity,
}

/// A player's personal best on one chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartRecord {
    pub id: Uuid,
    pub chart_id: Uuid,
    pub player_id: Uuid,
    pub score: i64,
    pub achieved_at: DateTime<Utc>,
}

/// A team's current standing in one event division.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTeam {
    pub id: Uuid,
    pub division_id: Uuid,
    pub score: i64,
    pub score_updated_at: DateTime<Utc>,
}

/// A domain entity that participates in some leaderboard.
///
/// The two adapter methods are the only place entity kinds are told apart;
/// everything downstream works on `LeaderboardKey` and `ScoredEntity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RankedEntity {
    ChartRecord(ChartRecord),
    EventTeam(EventTeam),
}

impl RankedEntity {
    /// The leaderboard this entity is ranked on.
    pub fn leaderboard_key(&self) -> LeaderboardKey {
        match self {
            RankedEntity::ChartRecord(r) => LeaderboardKey::Chart(r.chart_id),
            RankedEntity::EventTeam(t) => LeaderboardKey::EventDivision(t.division_id),
        }
    }

    /// The identity the entity is ranked under (player for chart records,
    /// team for event standings).
    pub fn identity(&self) -> Uuid {
        match self {
            RankedEntity::ChartRecord(r) => r.player_id,
            RankedEntity::EventTeam(t) => t.id,
        }
    }

    /// Project to the scored form held by the store.
    pub fn scored_entity(&self) -> ScoredEntity {
        match self {
            RankedEntity::ChartRecord(r) => ScoredEntity {
                identity: r.player_id,
                score: r.score,
                tie_break: r.achieved_at.timestamp_millis(),
                payload: r.id,
            },
            RankedEntity::EventTeam(t) => ScoredEntity {
                identity: t.id,
                score: t.score,
                tie_break: t.score_updated_at.timestamp_millis(),
                payload: t.id,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_record_maps_to_chart_key() {
        let record = ChartRecord {
            id: Uuid::new_v4(),
            chart_id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            score: 997_000,
            achieved_at: Utc::now(),
        };
        let entity = RankedEntity::ChartRecord(record.clone());

        assert_eq!(entity.leaderboard_key(), LeaderboardKey::Chart(record.chart_id));
        assert_eq!(entity.identity(), record.player_id);

        let scored = entity.scored_entity();
        assert_eq!(scored.identity, record.player_id);
        assert_eq!(scored.score, record.score);
        assert_eq!(scored.tie_break, record.achieved_at.timestamp_millis());
        assert_eq!(scored.payload, record.id);
    }

    #[test]
    fn event_team_maps_to_division_key() {
        let team = EventTeam {
            id: Uuid::new_v4(),
            division_id: Uuid::new_v4(),
            score: 4200,
            score_updated_at: Utc::now(),
        };
        let entity = RankedEntity::EventTeam(team.clone());

        assert_eq!(
            entity.leaderboard_key(),
            LeaderboardKey::EventDivision(team.division_id)
        );
        assert_eq!(entity.identity(), team.id);
        assert_eq!(entity.scored_entity().payload, team.id);
    }
}
