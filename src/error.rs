use thiserror::Error;

use crate::models::coordinate::DMS_EXAMPLE;

/// Malformed coordinate or week input. Always user-correctable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("expected a latitude and a longitude in DMS. Example: {example}", example = DMS_EXAMPLE)]
    MissingToken,

    #[error("invalid DMS latitude '{0}'. Example: {example}", example = DMS_EXAMPLE)]
    InvalidLatitude(String),

    #[error("invalid DMS longitude '{0}'. Example: {example}", example = DMS_EXAMPLE)]
    InvalidLongitude(String),

    #[error("latitude {0} is outside [-90, 90]. Example: {example}", example = DMS_EXAMPLE)]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]. Example: {example}", example = DMS_EXAMPLE)]
    LongitudeOutOfRange(f64),

    #[error("week id must not be empty")]
    EmptyWeekId,
}

/// Failure of a persistence collaborator. Fatal to the current operation.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,

    #[error("corrupt record in {location}: {reason}")]
    Corrupt { location: String, reason: String },
}

#[derive(Error, Debug)]
pub enum HuntError {
    #[error("invalid format: {0}")]
    Format(#[from] FormatError),

    #[error("attempt limit reached: {used}/{max} submissions used this week")]
    QuotaExceeded { used: u32, max: u32 },

    #[error("the weekly target is not set yet")]
    NoTarget,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl HuntError {
    /// Expected, user-facing conditions as opposed to storage failures.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, HuntError::Storage(_))
    }
}

pub type Result<T, E = HuntError> = std::result::Result<T, E>;
