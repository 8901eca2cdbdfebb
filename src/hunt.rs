use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::challenge::{ChallengeState, ChallengeWeek};
use crate::error::{HuntError, Result};
use crate::leaderboard::LeaderboardEngine;
use crate::ledger::{MAX_ATTEMPTS, SubmissionLedger};
use crate::models::{
    Coordinate, HuntConfig, LeaderboardEntry, SubmitReceipt, UserId, parse_coordinate,
};
use crate::storage::{FileKeyValueStore, FileSubmissionStore, KeyValueStore, SubmissionStore};

/// Entry point for the command layer: one weekly challenge plus its ledger.
pub struct Hunt {
    challenge: ChallengeState,
    ledger: SubmissionLedger,
}

impl Hunt {
    pub fn new(state: Arc<dyn KeyValueStore>, submissions: Arc<dyn SubmissionStore>) -> Result<Self> {
        Ok(Self {
            challenge: ChallengeState::load(state)?,
            ledger: SubmissionLedger::new(submissions),
        })
    }

    /// Opens the on-disk stores under `config.data_dir`.
    pub fn open(config: &HuntConfig) -> Result<Self> {
        info!(data_dir = %config.data_dir.display(), "opening hunt storage");
        Self::new(
            Arc::new(FileKeyValueStore::in_dir(&config.data_dir)),
            Arc::new(FileSubmissionStore::in_dir(&config.data_dir)),
        )
    }

    pub fn parse_coordinate(&self, text: &str) -> Result<Coordinate> {
        Ok(parse_coordinate(text)?)
    }

    pub fn start_week(&self, week_id: &str) -> Result<()> {
        self.challenge.start_week(week_id)
    }

    pub fn set_target(&self, dms: &str) -> Result<Coordinate> {
        self.challenge.set_target(dms)
    }

    pub fn current_week_id(&self) -> Result<String> {
        self.challenge.current_week_id()
    }

    pub fn current_target(&self) -> Result<Option<Coordinate>> {
        self.challenge.current_target()
    }

    pub fn attempts_used(&self, user_id: UserId) -> Result<u32> {
        let week_id = self.challenge.current_week_id()?;
        self.ledger.count_attempts(&week_id, user_id)
    }

    pub fn submit(&self, user_id: UserId, dms: &str) -> Result<SubmitReceipt> {
        self.submit_at(user_id, dms, Utc::now().timestamp())
    }

    /// Checks run in order: target configured, quota, format. The early
    /// quota read only orders the errors; the store re-checks the quota
    /// atomically when the guess is written.
    pub fn submit_at(&self, user_id: UserId, dms: &str, submitted_at: i64) -> Result<SubmitReceipt> {
        let ChallengeWeek { week_id, target } = self.challenge.snapshot()?;
        if target.is_none() {
            return Err(HuntError::NoTarget);
        }

        let used = self.ledger.count_attempts(&week_id, user_id)?;
        if used >= MAX_ATTEMPTS {
            warn!(week_id = %week_id, user_id, "submission rejected, attempt limit reached");
            return Err(HuntError::QuotaExceeded {
                used,
                max: MAX_ATTEMPTS,
            });
        }

        let coordinate = parse_coordinate(dms)?;
        let attempts_used = self
            .ledger
            .record_within_quota(&week_id, user_id, coordinate, submitted_at, MAX_ATTEMPTS)
            .inspect_err(|e| {
                if matches!(e, HuntError::QuotaExceeded { .. }) {
                    warn!(week_id = %week_id, user_id, "submission rejected, attempt limit reached");
                }
            })?;

        info!(week_id = %week_id, user_id, attempts_used, "submission accepted");
        Ok(SubmitReceipt {
            attempts_used,
            attempts_max: MAX_ATTEMPTS,
        })
    }

    /// Ranking for the current week. `top_n` must already be clamped.
    pub fn leaderboard(&self, top_n: usize) -> Result<(String, Vec<LeaderboardEntry>)> {
        let ChallengeWeek { week_id, target } = self.challenge.snapshot()?;
        let entries = LeaderboardEngine::new(&self.ledger).rank(&week_id, target, top_n)?;
        Ok((week_id, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::storage::{MemoryKeyValueStore, MemorySubmissionStore};

    const TARGET: &str = "18°24'56\"N 13°01'56\"E";

    fn hunt() -> (Arc<MemorySubmissionStore>, Hunt) {
        let subs = Arc::new(MemorySubmissionStore::new());
        let hunt = Hunt::new(Arc::new(MemoryKeyValueStore::new()), subs.clone()).unwrap();
        (subs, hunt)
    }

    #[test]
    fn test_submit_requires_target() {
        let (subs, hunt) = hunt();
        let err = hunt.submit(1, TARGET).unwrap_err();
        assert!(matches!(err, HuntError::NoTarget));
        assert_eq!(subs.count_by_week_and_user("week-1", 1).unwrap(), 0);
    }

    #[test]
    fn test_eleventh_submission_rejected() {
        let (subs, hunt) = hunt();
        hunt.set_target(TARGET).unwrap();

        for i in 1..=10 {
            let receipt = hunt.submit_at(5, "18°00'00\"N 13°00'00\"E", 1_000 + i as i64).unwrap();
            assert_eq!(receipt.attempts_used, i);
            assert_eq!(receipt.attempts_max, 10);
        }

        let err = hunt.submit_at(5, "18°00'00\"N 13°00'00\"E", 2_000).unwrap_err();
        assert!(matches!(err, HuntError::QuotaExceeded { used: 10, max: 10 }));
        assert_eq!(subs.count_by_week_and_user("week-1", 5).unwrap(), 10);
        assert_eq!(hunt.attempts_used(5).unwrap(), 10);
    }

    #[test]
    fn test_quota_checked_before_format() {
        let (_, hunt) = hunt();
        hunt.set_target(TARGET).unwrap();
        for i in 0..10 {
            hunt.submit_at(5, TARGET, i).unwrap();
        }
        let err = hunt.submit_at(5, "not a place", 99).unwrap_err();
        assert!(matches!(err, HuntError::QuotaExceeded { .. }));
    }

    #[test]
    fn test_malformed_submission_not_counted() {
        let (_, hunt) = hunt();
        hunt.set_target(TARGET).unwrap();
        let err = hunt.submit_at(5, "18N 13E", 1).unwrap_err();
        assert!(matches!(err, HuntError::Format(FormatError::InvalidLatitude(_))));
        assert!(err.is_recoverable());
        assert_eq!(hunt.attempts_used(5).unwrap(), 0);
    }

    #[test]
    fn test_new_week_resets_attempts_and_target() {
        let (_, hunt) = hunt();
        hunt.set_target(TARGET).unwrap();
        hunt.submit_at(5, TARGET, 1).unwrap();

        hunt.start_week("2026-01-05").unwrap();
        assert_eq!(hunt.current_week_id().unwrap(), "2026-01-05");
        assert_eq!(hunt.current_target().unwrap(), None);
        assert!(matches!(hunt.submit_at(5, TARGET, 2), Err(HuntError::NoTarget)));
        assert!(matches!(hunt.leaderboard(10), Err(HuntError::NoTarget)));

        hunt.set_target(TARGET).unwrap();
        assert_eq!(hunt.attempts_used(5).unwrap(), 0);
        let (week_id, entries) = hunt.leaderboard(10).unwrap();
        assert_eq!(week_id, "2026-01-05");
        assert!(entries.is_empty());
    }

    #[test]
    fn test_leaderboard_ranks_current_week() {
        let (_, hunt) = hunt();
        hunt.set_target("0°00'00\"N 0°00'00\"E").unwrap();
        hunt.submit_at(1, "0°00'10\"N 0°00'00\"E", 100).unwrap();
        hunt.submit_at(2, "0°00'05\"S 0°00'00\"E", 300).unwrap();
        hunt.submit_at(3, "0°00'00\"N 0°00'05\"W", 200).unwrap();

        let (week_id, entries) = hunt.leaderboard(10).unwrap();
        assert_eq!(week_id, "week-1");
        let users: Vec<UserId> = entries.iter().map(|e| e.user_id).collect();
        assert_eq!(users, vec![3, 2, 1]);

        let (_, top) = hunt.leaderboard(1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].user_id, 3);
    }

    #[test]
    fn test_parse_coordinate_passthrough() {
        let (_, hunt) = hunt();
        assert!(hunt.parse_coordinate(TARGET).is_ok());
        assert!(matches!(
            hunt.parse_coordinate("nope"),
            Err(HuntError::Format(FormatError::MissingToken))
        ));
    }

    #[test]
    fn test_concurrent_submits_over_shared_directory() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("leohunt-hunt-{}-{}", std::process::id(), nanos));
        let config = HuntConfig {
            data_dir: dir.clone(),
            leaderboard_size: 10,
        };
        Hunt::open(&config).unwrap().set_target(TARGET).unwrap();

        let handles: Vec<_> = (0..16i64)
            .map(|i| {
                let config = config.clone();
                std::thread::spawn(move || {
                    let hunt = Hunt::open(&config).unwrap();
                    hunt.submit_at(9, TARGET, 1_000 + i)
                })
            })
            .collect();

        let mut accepted = 0;
        for h in handles {
            match h.join().unwrap() {
                Ok(_) => accepted += 1,
                Err(HuntError::QuotaExceeded { used: 10, max: 10 }) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(accepted, 10);
        let reopened = Hunt::open(&config).unwrap();
        assert_eq!(reopened.attempts_used(9).unwrap(), 10);
        assert!(matches!(
            reopened.submit_at(9, TARGET, 5_000),
            Err(HuntError::QuotaExceeded { .. })
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
