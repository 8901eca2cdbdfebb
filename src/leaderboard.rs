use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::error::{HuntError, Result};
use crate::ledger::SubmissionLedger;
use crate::models::{Coordinate, LeaderboardEntry, Submission, UserId, distance_m};

/// Distances closer than this are the same distance.
pub const DISTANCE_EPSILON_M: f64 = 1e-9;

pub struct LeaderboardEngine<'a> {
    ledger: &'a SubmissionLedger,
}

impl<'a> LeaderboardEngine<'a> {
    pub fn new(ledger: &'a SubmissionLedger) -> Self {
        Self { ledger }
    }

    /// Best guess per user for `week_id`, closest first, at most `top_n` rows.
    pub fn rank(
        &self,
        week_id: &str,
        target: Option<Coordinate>,
        top_n: usize,
    ) -> Result<Vec<LeaderboardEntry>> {
        let target = target.ok_or(HuntError::NoTarget)?;
        let submissions = self.ledger.submissions_for_week(week_id)?;
        let ranked = rank_submissions(&submissions, &target, top_n);
        debug!(
            week_id,
            submissions = submissions.len(),
            entries = ranked.len(),
            "leaderboard computed"
        );
        Ok(ranked)
    }
}

/// Reduces to one entry per user and sorts by (distance, timestamp).
pub fn rank_submissions(
    submissions: &[Submission],
    target: &Coordinate,
    top_n: usize,
) -> Vec<LeaderboardEntry> {
    let mut best: HashMap<UserId, LeaderboardEntry> = HashMap::new();

    for sub in submissions {
        let dist = distance_m(&sub.coordinate, target);
        match best.entry(sub.user_id) {
            Entry::Vacant(slot) => {
                slot.insert(LeaderboardEntry {
                    user_id: sub.user_id,
                    best_distance_m: dist,
                    best_timestamp: sub.submitted_at,
                });
            }
            Entry::Occupied(mut slot) => {
                if improves(dist, sub.submitted_at, slot.get()) {
                    let entry = slot.get_mut();
                    entry.best_distance_m = dist;
                    entry.best_timestamp = sub.submitted_at;
                }
            }
        }
    }

    let mut ranked: Vec<LeaderboardEntry> = best.into_values().collect();
    // user_id last only so that output never depends on HashMap order.
    ranked.sort_by(|a, b| {
        a.best_distance_m
            .total_cmp(&b.best_distance_m)
            .then(a.best_timestamp.cmp(&b.best_timestamp))
            .then(a.user_id.cmp(&b.user_id))
    });
    ranked.truncate(top_n);
    ranked
}

fn improves(dist: f64, submitted_at: i64, current: &LeaderboardEntry) -> bool {
    if (dist - current.best_distance_m).abs() < DISTANCE_EPSILON_M {
        submitted_at < current.best_timestamp
    } else {
        dist < current.best_distance_m
    }
}
