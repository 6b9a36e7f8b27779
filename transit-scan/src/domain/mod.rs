//! Domain types for the connection scan planner.
//!
//! This module contains the timetable primitives every other module builds
//! on. All types enforce their invariants at construction time, so code
//! that receives these types can trust their validity.

mod connection;
mod error;
mod ids;
mod time;

pub use connection::{Connection, ConnectionMode};
pub use error::DomainError;
pub use ids::{StopId, TripId};
pub use time::{Time, format_clock, format_duration};
