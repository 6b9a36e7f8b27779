//! A set of sealed stores scanned as one.

use crate::domain::{StopId, Time};

use super::connection_store::ConnectionStore;
use super::enumerator::ConnectionEnumerator;
use super::error::StoreError;
use super::merge::merge_all;

/// One or more sealed stores, enumerated as a single time-ordered stream.
///
/// This is the data source boundary of the scans: anything that can be
/// loaded into sealed [`ConnectionStore`]s can be planned over.
#[derive(Debug, Clone)]
pub struct Timetable<'a> {
    stores: Vec<&'a ConnectionStore>,
}

impl<'a> Timetable<'a> {
    /// Combine sealed stores.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidState`] if any store is still unsealed.
    pub fn new(stores: Vec<&'a ConnectionStore>) -> Result<Self, StoreError> {
        if stores.iter().any(|s| !s.is_sealed()) {
            return Err(StoreError::InvalidState(
                "every store of a timetable must be sealed",
            ));
        }
        Ok(Self { stores })
    }

    /// A timetable over a single sealed store.
    pub fn single(store: &'a ConnectionStore) -> Result<Self, StoreError> {
        Self::new(vec![store])
    }

    pub fn stores(&self) -> &[&'a ConnectionStore] {
        &self.stores
    }

    /// Total number of connections across all stores.
    pub fn connection_count(&self) -> usize {
        self.stores.iter().map(|s| s.len()).sum()
    }

    /// Returns true if any store serves `stop`.
    pub fn contains_stop(&self, stop: StopId) -> bool {
        self.stores.iter().any(|s| s.contains_stop(stop))
    }

    fn merged(&self) -> Box<dyn ConnectionEnumerator + 'a> {
        let children = self
            .stores
            .iter()
            .filter_map(|s| s.enumerator().ok())
            .map(|e| Box::new(e) as Box<dyn ConnectionEnumerator + 'a>)
            .collect();
        merge_all(children)
    }

    /// Merged cursor whose `move_next` yields the first connection
    /// departing at or after `time`.
    pub fn enumerator_from(&self, time: Time) -> Box<dyn ConnectionEnumerator + 'a> {
        let mut e = self.merged();
        e.seek_forward(time);
        e
    }

    /// Merged cursor whose `move_previous` yields the last connection
    /// departing at or before `time`.
    pub fn enumerator_from_end(&self, time: Time) -> Box<dyn ConnectionEnumerator + 'a> {
        let mut e = self.merged();
        e.seek_backward(time);
        e
    }
}
