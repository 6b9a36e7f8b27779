//! Time-ordered connection storage.
//!
//! A [`ConnectionStore`] is filled once per data source, then sealed:
//! sealing sorts the connections by departure time, repairs the order of
//! zero-dwell trip legs that share a departure time, and builds a coarse
//! window index for fast seeks. Sealed stores are read-only and can be
//! shared between any number of concurrent scans; each scan walks them with
//! its own [`ConnectionEnumerator`].

mod connection_store;
mod enumerator;
mod error;
mod merge;
mod repair;
mod timetable;
mod window_index;

pub use connection_store::{ConnectionStore, SealReport};
pub use enumerator::{ConnectionEnumerator, EmptyEnumerator, StoreEnumerator};
pub use error::StoreError;
pub use merge::{MergeEnumerator, merge_all};
pub use timetable::Timetable;
pub use window_index::WindowIndex;
