use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use super::{KeyValueStore, QuotaInsert, SubmissionStore, count_for};
use crate::error::StorageError;
use crate::models::{Submission, UserId};

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySubmissionStore {
    records: RwLock<Vec<Submission>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubmissionStore for MemorySubmissionStore {
    fn insert(&self, record: &Submission) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|_| StorageError::Poisoned)?;
        records.push(record.clone());
        Ok(())
    }

    fn insert_if_below(&self, record: &Submission, max: u32) -> Result<QuotaInsert, StorageError> {
        let mut records = self.records.write().map_err(|_| StorageError::Poisoned)?;
        let used = count_for(&records, &record.week_id, record.user_id);
        if used >= max {
            return Ok(QuotaInsert::Full(used));
        }
        records.push(record.clone());
        Ok(QuotaInsert::Inserted(used + 1))
    }

    fn query_by_week(&self, week_id: &str) -> Result<Vec<Submission>, StorageError> {
        let records = self.records.read().map_err(|_| StorageError::Poisoned)?;
        Ok(records
            .iter()
            .filter(|r| r.week_id == week_id)
            .cloned()
            .collect())
    }

    fn count_by_week_and_user(&self, week_id: &str, user_id: UserId) -> Result<u32, StorageError> {
        let records = self.records.read().map_err(|_| StorageError::Poisoned)?;
        Ok(count_for(&records, week_id, user_id))
    }
}
