//! Persistence collaborators consumed by the core.
//!
//! Two narrow interfaces: a string key-value store for the current week and
//! target, and an append-only store of [`Submission`] records. Both are
//! `Send + Sync` so a single [`crate::Hunt`] can be shared across handlers.

mod file;
mod memory;

pub use file::{FileKeyValueStore, FileSubmissionStore};
pub use memory::{MemoryKeyValueStore, MemorySubmissionStore};

use crate::error::StorageError;
use crate::models::{Submission, UserId};

fn count_for(records: &[Submission], week_id: &str, user_id: UserId) -> u32 {
    records
        .iter()
        .filter(|r| r.week_id == week_id && r.user_id == user_id)
        .count() as u32
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Result of [`SubmissionStore::insert_if_below`], carrying the attempt count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaInsert {
    /// Written; the count includes the new record.
    Inserted(u32),
    /// Nothing written; the (week, user) pair already had this many.
    Full(u32),
}

/// Append-only. There is intentionally no update or delete.
pub trait SubmissionStore: Send + Sync {
    fn insert(&self, record: &Submission) -> Result<(), StorageError>;

    /// Inserts only while the record's (week, user) pair has fewer than
    /// `max` records. The count and the write are one atomic step.
    fn insert_if_below(&self, record: &Submission, max: u32) -> Result<QuotaInsert, StorageError>;

    fn query_by_week(&self, week_id: &str) -> Result<Vec<Submission>, StorageError>;

    fn count_by_week_and_user(&self, week_id: &str, user_id: UserId) -> Result<u32, StorageError>;
}
