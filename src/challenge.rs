use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::error::{FormatError, HuntError, Result, StorageError};
use crate::models::{Coordinate, parse_coordinate};
use crate::storage::KeyValueStore;

pub const DEFAULT_WEEK_ID: &str = "week-1";

const WEEK_KEY: &str = "week_id";
const TARGET_KEY: &str = "target_dms";

#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeWeek {
    pub week_id: String,
    pub target: Option<Coordinate>,
}

/// The single current week and its hidden target.
///
/// Built once at startup from the key-value collaborator and then passed by
/// reference. Reads are served from an in-memory copy; both mutations hold
/// the write lock across the persist-then-update sequence, so no reader ever
/// sees half of a change.
pub struct ChallengeState {
    store: Arc<dyn KeyValueStore>,
    current: RwLock<ChallengeWeek>,
}

impl ChallengeState {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let week_id = store
            .get(WEEK_KEY)?
            .filter(|w| !w.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WEEK_ID.to_string());

        let target = match store.get(TARGET_KEY)? {
            Some(dms) if !dms.trim().is_empty() => match parse_coordinate(&dms) {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!(week_id = %week_id, "Ignoring stored target that no longer parses: {e}");
                    None
                }
            },
            _ => None,
        };

        info!(week_id = %week_id, target_set = target.is_some(), "challenge state loaded");
        Ok(Self {
            store,
            current: RwLock::new(ChallengeWeek { week_id, target }),
        })
    }

    pub fn current_week_id(&self) -> Result<String> {
        Ok(self.snapshot()?.week_id)
    }

    pub fn current_target(&self) -> Result<Option<Coordinate>> {
        Ok(self.snapshot()?.target)
    }

    pub fn snapshot(&self) -> Result<ChallengeWeek> {
        let current = self.current.read().map_err(|_| StorageError::Poisoned)?;
        Ok(current.clone())
    }

    /// Switches to `week_id` and clears the target. Re-starting the same week
    /// is allowed and still clears it.
    pub fn start_week(&self, week_id: &str) -> Result<()> {
        let week_id = week_id.trim();
        if week_id.is_empty() {
            return Err(FormatError::EmptyWeekId.into());
        }

        let mut current = self.current.write().map_err(|_| StorageError::Poisoned)?;
        // Clear the target before switching weeks: an interrupted switch
        // leaves no target rather than last week's target on the new week.
        self.store.set(TARGET_KEY, "")?;
        current.target = None;
        self.store.set(WEEK_KEY, week_id)?;
        current.week_id = week_id.to_string();

        info!(week_id, "new week started, target cleared");
        Ok(())
    }

    /// Validates and stores the target. On a format error nothing changes.
    pub fn set_target(&self, dms: &str) -> Result<Coordinate> {
        let dms = dms.trim();
        let target = parse_coordinate(dms).map_err(HuntError::Format)?;

        let mut current = self.current.write().map_err(|_| StorageError::Poisoned)?;
        self.store.set(TARGET_KEY, dms)?;
        current.target = Some(target);

        info!(week_id = %current.week_id, "target set");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    fn fresh() -> (Arc<MemoryKeyValueStore>, ChallengeState) {
        let store = Arc::new(MemoryKeyValueStore::new());
        let state = ChallengeState::load(store.clone()).unwrap();
        (store, state)
    }

    #[test]
    fn test_defaults_when_never_set() {
        let (_, state) = fresh();
        assert_eq!(state.current_week_id().unwrap(), DEFAULT_WEEK_ID);
        assert_eq!(state.current_target().unwrap(), None);
    }

    #[test]
    fn test_set_target_persists() {
        let (store, state) = fresh();
        let target = state.set_target("  18°24'56\"N 13°01'56\"E ").unwrap();
        assert_eq!(state.current_target().unwrap(), Some(target));
        assert_eq!(
            store.get(TARGET_KEY).unwrap().as_deref(),
            Some("18°24'56\"N 13°01'56\"E")
        );

        let reloaded = ChallengeState::load(store).unwrap();
        assert_eq!(reloaded.current_target().unwrap(), Some(target));
    }

    #[test]
    fn test_malformed_target_leaves_previous() {
        let (store, state) = fresh();
        let target = state.set_target("18°24'56\"N 13°01'56\"E").unwrap();

        let err = state.set_target("somewhere nice").unwrap_err();
        assert!(matches!(err, HuntError::Format(_)));
        assert_eq!(state.current_target().unwrap(), Some(target));
        assert_eq!(
            store.get(TARGET_KEY).unwrap().as_deref(),
            Some("18°24'56\"N 13°01'56\"E")
        );
    }

    #[test]
    fn test_start_week_clears_target() {
        let (store, state) = fresh();
        state.set_target("18°24'56\"N 13°01'56\"E").unwrap();

        state.start_week(" week-2 ").unwrap();
        assert_eq!(state.current_week_id().unwrap(), "week-2");
        assert_eq!(state.current_target().unwrap(), None);

        state.set_target("1°00'00\"S 2°00'00\"W").unwrap();
        state.start_week("week-2").unwrap();
        assert_eq!(state.current_target().unwrap(), None);

        let reloaded = ChallengeState::load(store).unwrap();
        assert_eq!(reloaded.current_week_id().unwrap(), "week-2");
        assert_eq!(reloaded.current_target().unwrap(), None);
    }

    #[test]
    fn test_empty_week_id_rejected() {
        let (_, state) = fresh();
        let err = state.start_week("   ").unwrap_err();
        assert!(matches!(err, HuntError::Format(FormatError::EmptyWeekId)));
        assert_eq!(state.current_week_id().unwrap(), DEFAULT_WEEK_ID);
    }

    #[test]
    fn test_concurrent_targets_never_mix() {
        let (_, state) = fresh();
        let state = Arc::new(state);
        let a = "10°00'00\"N 20°00'00\"E";
        let b = "30°00'00\"S 40°00'00\"W";
        let expected = [
            parse_coordinate(a).unwrap(),
            parse_coordinate(b).unwrap(),
        ];

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let state = state.clone();
                let dms = if i % 2 == 0 { a } else { b };
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        state.set_target(dms).unwrap();
                        let seen = state.current_target().unwrap().unwrap();
                        assert!(expected.contains(&seen));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
