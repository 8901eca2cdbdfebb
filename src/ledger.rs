use std::sync::Arc;

use tracing::debug;

use crate::error::{HuntError, Result};
use crate::models::{Coordinate, Submission, UserId};
use crate::storage::{QuotaInsert, SubmissionStore};

pub const MAX_ATTEMPTS: u32 = 10;

/// Append-only record of guesses.
///
/// `record_submission` writes unconditionally. Quota-checked writes go
/// through [`SubmissionLedger::record_within_quota`], which leaves the count
/// and the insert to the store as one atomic step, so concurrent submitters
/// in any number of processes cannot push a user past the limit.
pub struct SubmissionLedger {
    store: Arc<dyn SubmissionStore>,
}

impl SubmissionLedger {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self { store }
    }

    pub fn count_attempts(&self, week_id: &str, user_id: UserId) -> Result<u32> {
        Ok(self.store.count_by_week_and_user(week_id, user_id)?)
    }

    pub fn record_submission(
        &self,
        week_id: &str,
        user_id: UserId,
        coordinate: Coordinate,
        submitted_at: i64,
    ) -> Result<()> {
        let record = Submission::new(week_id, user_id, coordinate, submitted_at);
        self.store.insert(&record)?;
        debug!(week_id, user_id, submitted_at, "submission recorded");
        Ok(())
    }

    /// Records the guess unless the user already has `max` for the week.
    /// Returns the attempt count including the new one.
    pub fn record_within_quota(
        &self,
        week_id: &str,
        user_id: UserId,
        coordinate: Coordinate,
        submitted_at: i64,
        max: u32,
    ) -> Result<u32> {
        let record = Submission::new(week_id, user_id, coordinate, submitted_at);
        match self.store.insert_if_below(&record, max)? {
            QuotaInsert::Inserted(used) => {
                debug!(week_id, user_id, submitted_at, used, "submission recorded");
                Ok(used)
            }
            QuotaInsert::Full(used) => Err(HuntError::QuotaExceeded { used, max }),
        }
    }

    pub fn submissions_for_week(&self, week_id: &str) -> Result<Vec<Submission>> {
        Ok(self.store.query_by_week(week_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySubmissionStore;

    fn ledger() -> SubmissionLedger {
        SubmissionLedger::new(Arc::new(MemorySubmissionStore::new()))
    }

    fn here() -> Coordinate {
        Coordinate::new(18.4, 13.0).unwrap()
    }

    #[test]
    fn test_counts_per_week_and_user() {
        let ledger = ledger();
        ledger.record_submission("week-1", 1, here(), 10).unwrap();
        ledger.record_submission("week-1", 1, here(), 11).unwrap();
        ledger.record_submission("week-1", 2, here(), 12).unwrap();
        ledger.record_submission("week-2", 1, here(), 13).unwrap();

        assert_eq!(ledger.count_attempts("week-1", 1).unwrap(), 2);
        assert_eq!(ledger.count_attempts("week-1", 2).unwrap(), 1);
        assert_eq!(ledger.count_attempts("week-2", 1).unwrap(), 1);
        assert_eq!(ledger.count_attempts("week-2", 2).unwrap(), 0);
        assert_eq!(ledger.submissions_for_week("week-1").unwrap().len(), 3);
    }

    #[test]
    fn test_attempt_quota() {
        let ledger = ledger();
        for i in 0..MAX_ATTEMPTS {
            let used = ledger
                .record_within_quota("week-1", 42, here(), i as i64, MAX_ATTEMPTS)
                .unwrap();
            assert_eq!(used, i + 1);
        }

        let err = ledger
            .record_within_quota("week-1", 42, here(), 99, MAX_ATTEMPTS)
            .unwrap_err();
        assert!(matches!(err, HuntError::QuotaExceeded { used: 10, max: 10 }));
        assert_eq!(ledger.count_attempts("week-1", 42).unwrap(), MAX_ATTEMPTS);

        // A fresh week starts from zero.
        assert_eq!(
            ledger
                .record_within_quota("week-2", 42, here(), 100, MAX_ATTEMPTS)
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_concurrent_attempts_respect_quota() {
        let ledger = Arc::new(ledger());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    ledger.record_within_quota("week-1", 7, here(), i, MAX_ATTEMPTS)
                })
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();

        assert_eq!(accepted, MAX_ATTEMPTS as usize);
        assert_eq!(ledger.count_attempts("week-1", 7).unwrap(), MAX_ATTEMPTS);
    }
}
