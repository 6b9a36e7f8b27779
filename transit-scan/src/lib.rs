//! Connection scan journey planning.
//!
//! Answers "how do I get from here to there through this timetable?" by
//! scanning time-ordered vehicle connections: earliest arrival, latest
//! departure and full multi-criteria profiles over a time window.

pub mod domain;
pub mod journey;
pub mod scan;
pub mod stops;
pub mod store;
pub mod transfer;
