//! Domain error types.
//!
//! These errors represent validation failures when constructing timetable
//! records. They are distinct from store and scan errors.

/// Domain-level errors for validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Arrival before departure
    #[error("connection {0} arrives before it departs")]
    NegativeTravelTime(String),

    /// Connections must carry a global identifier
    #[error("connection global id must not be empty")]
    EmptyGlobalId,

    /// Arrival time does not fit in a timestamp
    #[error("connection {0} arrives after the end of representable time")]
    TimeOverflow(String),
}
