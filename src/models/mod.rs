pub mod config;
pub mod coordinate;
pub mod distance;
pub mod submission;

pub use config::{HuntConfig, clamp_top_n};
pub use coordinate::{Coordinate, DMS_EXAMPLE, parse_coordinate};
pub use distance::distance_m;
pub use submission::{LeaderboardEntry, Submission, SubmitReceipt, UserId};
