use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs4::fs_std::FileExt;
use tracing::{debug, warn};

use super::{KeyValueStore, QuotaInsert, SubmissionStore, count_for};
use crate::error::StorageError;
use crate::models::{Submission, UserId};

const STATE_FILE: &str = "state.json";
const SUBMISSIONS_FILE: &str = "submissions.jsonl";

fn read_optional(path: &Path) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Key-value state kept as one JSON object, replaced atomically on every write.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STATE_FILE))
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match read_optional(&self.path)? {
            Some(contents) if !contents.trim().is_empty() => Ok(serde_json::from_str(&contents)?),
            _ => Ok(BTreeMap::new()),
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        let mut state = self.load()?;
        state.insert(key.to_string(), value.to_string());

        ensure_parent(&self.path)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&state)?)?;
        fs::rename(&tmp, &self.path)?;

        debug!(key, path = %self.path.display(), "state updated");
        Ok(())
    }
}

/// Submissions as JSON lines, one record per line, append-only.
///
/// Writers from any process serialise on an exclusive OS lock held on a
/// sibling `submissions.jsonl.lock` file. Readers take no lock and ignore an
/// unterminated last line.
#[derive(Debug)]
pub struct FileSubmissionStore {
    path: PathBuf,
}

/// Held for the whole read-check-append sequence; the lock drops with the file.
struct WriterLock {
    _file: File,
}

impl FileSubmissionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SUBMISSIONS_FILE))
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn lock_writers(&self) -> Result<WriterLock, StorageError> {
        ensure_parent(&self.path)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;
        file.lock_exclusive()?;
        Ok(WriterLock { _file: file })
    }

    /// Opens the log for appending and returns its complete lines. A tail
    /// left by an interrupted write is cut off first so the next record
    /// starts on a fresh line. Callers must hold the writer lock.
    fn open_for_append(&self, _lock: &WriterLock) -> Result<(File, Vec<u8>), StorageError> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        let keep = complete_len(&contents);
        if keep < contents.len() {
            warn!(
                path = %self.path.display(),
                dropped_bytes = contents.len() - keep,
                "discarding unterminated submission line"
            );
            file.set_len(keep as u64)?;
            contents.truncate(keep);
        }
        Ok((file, contents))
    }

    fn parse_records(&self, contents: &[u8]) -> Result<Vec<Submission>, StorageError> {
        let complete = &contents[..complete_len(contents)];
        let text = std::str::from_utf8(complete).map_err(|e| StorageError::Corrupt {
            location: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut records = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(line).map_err(|e| StorageError::Corrupt {
                location: format!("{}:{}", self.path.display(), idx + 1),
                reason: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(records)
    }

    fn load_all(&self) -> Result<Vec<Submission>, StorageError> {
        match fs::read(&self.path) {
            Ok(contents) => self.parse_records(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Length of the prefix that ends in a newline.
fn complete_len(contents: &[u8]) -> usize {
    contents
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1)
}

fn append_line(file: &mut File, record: &Submission) -> Result<(), StorageError> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    file.write_all(&line)?;
    file.sync_data()?;
    Ok(())
}

impl SubmissionStore for FileSubmissionStore {
    fn insert(&self, record: &Submission) -> Result<(), StorageError> {
        let lock = self.lock_writers()?;
        let (mut file, _) = self.open_for_append(&lock)?;
        append_line(&mut file, record)
    }

    fn insert_if_below(&self, record: &Submission, max: u32) -> Result<QuotaInsert, StorageError> {
        let lock = self.lock_writers()?;
        let (mut file, contents) = self.open_for_append(&lock)?;

        let used = count_for(&self.parse_records(&contents)?, &record.week_id, record.user_id);
        if used >= max {
            return Ok(QuotaInsert::Full(used));
        }

        append_line(&mut file, record)?;
        debug!(week_id = %record.week_id, user_id = record.user_id, used = used + 1, "submission appended");
        Ok(QuotaInsert::Inserted(used + 1))
    }

    fn query_by_week(&self, week_id: &str) -> Result<Vec<Submission>, StorageError> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|r| r.week_id == week_id)
            .collect())
    }

    fn count_by_week_and_user(&self, week_id: &str, user_id: UserId) -> Result<u32, StorageError> {
        Ok(count_for(&self.load_all()?, week_id, user_id))
    }
}
