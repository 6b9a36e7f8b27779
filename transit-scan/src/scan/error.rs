//! Scan errors.

use crate::domain::StopId;
use crate::store::StoreError;

/// Error from a connection scan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// A requested stop is not served by any store in the timetable
    #[error("stop {stop} is not served by the timetable")]
    NotFound { stop: StopId },

    /// The request cannot be scanned
    #[error("invalid scan request: {0}")]
    InvalidArgument(String),

    /// The deadline passed before the scan finished
    #[error("scan timed out")]
    TimedOut,

    /// No journey exists within the window
    #[error("no journey reaches a target within the window")]
    Unreachable,

    /// The timetable could not be read
    #[error(transparent)]
    Store(#[from] StoreError),
}
