use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;

pub type UserId = u64;

/// One recorded guess. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub week_id: String,
    pub user_id: UserId,
    pub coordinate: Coordinate,
    /// Unix seconds, UTC.
    pub submitted_at: i64,
}

impl Submission {
    pub fn new(week_id: &str, user_id: UserId, coordinate: Coordinate, submitted_at: i64) -> Self {
        Self {
            week_id: week_id.to_string(),
            user_id,
            coordinate,
            submitted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub best_distance_m: f64,
    pub best_timestamp: i64,
}

impl LeaderboardEntry {
    pub fn submitted_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.best_timestamp, 0)
    }
}

/// Outcome of an accepted submission. Carries no distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub attempts_used: u32,
    pub attempts_max: u32,
}
