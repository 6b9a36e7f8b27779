//! Connection scan algorithms.
//!
//! Three scans share one request type and one configuration:
//!
//! - [`EarliestConnectionScan`] sweeps forward from the window start and
//!   finds the journey arriving first.
//! - [`LatestConnectionScan`] sweeps backward from the deadline and finds
//!   the journey leaving last.
//! - [`ProfiledConnectionScan`] sweeps backward over the whole window and
//!   keeps every Pareto-optimal journey.
//!
//! Each call owns its journey arena and labels; nothing is shared between
//! calls except the read-only timetable.

mod config;
mod eas;
mod error;
mod las;
mod pcs;
mod request;

#[cfg(test)]
mod scan_tests;

pub use config::{ConfigError, ScanConfig};
pub use eas::EarliestConnectionScan;
pub use error::ScanError;
pub use las::LatestConnectionScan;
pub use pcs::ProfiledConnectionScan;
pub use request::ScanSettings;
