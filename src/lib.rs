//! Weekly coordinate-guessing competition.
//!
//! Players submit degrees-minutes-seconds guesses for a hidden weekly target.
//! Each player gets ten guesses per week, and the leaderboard ranks players by
//! the great-circle distance of their best guess, earliest guess winning ties.

pub mod challenge;
pub mod error;
pub mod hunt;
pub mod leaderboard;
pub mod ledger;
pub mod models;
pub mod storage;

pub use challenge::{ChallengeState, ChallengeWeek, DEFAULT_WEEK_ID};
pub use error::{FormatError, HuntError, StorageError};
pub use hunt::Hunt;
pub use leaderboard::LeaderboardEngine;
pub use ledger::{MAX_ATTEMPTS, SubmissionLedger};
