//! The connection store.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::domain::{Connection, StopId, Time};

use super::enumerator::{ConnectionEnumerator, StoreEnumerator};
use super::error::StoreError;
use super::repair::repair_same_departure_trips;
use super::window_index::WindowIndex;

/// Default width of a window index bucket (10 minutes).
const DEFAULT_WINDOW_SECS: u64 = 600;

/// Summary of what sealing did to a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SealReport {
    /// Connections in the sealed store.
    pub connections: usize,
    /// Connections dropped because their global id was already present.
    pub duplicates_removed: usize,
    /// Same-departure trip groups that were reordered.
    pub trips_repaired: usize,
    /// Same-departure trip groups that could not be resolved.
    pub trips_unresolved: usize,
}

/// Sorted, queryable collection of connections for one data source.
///
/// # Lifecycle
///
/// - While unsealed, connections can be added in any order.
/// - [`seal`](Self::seal) sorts, repairs and indexes the connections.
/// - Once sealed, the store is read-only and can be enumerated.
#[derive(Debug, Clone)]
pub struct ConnectionStore {
    name: String,
    connections: Vec<Connection>,
    stops: HashSet<StopId>,
    window_secs: u64,
    index: Option<WindowIndex>,
}

impl ConnectionStore {
    /// Create an empty store with the default window size.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_window(name, DEFAULT_WINDOW_SECS)
    }

    /// Create an empty store with a custom window index bucket size.
    pub fn with_window(name: impl Into<String>, window_secs: u64) -> Self {
        Self {
            name: name.into(),
            connections: Vec::new(),
            stops: HashSet::new(),
            window_secs: window_secs.max(1),
            index: None,
        }
    }

    /// Add a connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidState`] if the store is sealed.
    pub fn add(&mut self, connection: Connection) -> Result<(), StoreError> {
        if self.is_sealed() {
            return Err(StoreError::InvalidState("cannot add to a sealed store"));
        }

        self.stops.insert(connection.departure_stop());
        self.stops.insert(connection.arrival_stop());
        self.connections.push(connection);
        Ok(())
    }

    /// Add many connections.
    pub fn extend<I>(&mut self, connections: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = Connection>,
    {
        for connection in connections {
            self.add(connection)?;
        }
        Ok(())
    }

    /// Sort, repair and index the store, making it read-only.
    ///
    /// Sorting is stable, so connections departing at the same time keep
    /// their insertion order, except for legs of one trip that are reordered
    /// to follow the trip's stop sequence. Sealing an already sealed store
    /// changes nothing.
    pub fn seal(&mut self) -> SealReport {
        if self.is_sealed() {
            return SealReport {
                connections: self.connections.len(),
                ..SealReport::default()
            };
        }

        let duplicates_removed = self.remove_duplicates();
        self.connections.sort_by_key(|c| c.departure_time());
        let stats = repair_same_departure_trips(&mut self.connections);
        self.index = Some(WindowIndex::build(&self.connections, self.window_secs));

        let report = SealReport {
            connections: self.connections.len(),
            duplicates_removed,
            trips_repaired: stats.repaired,
            trips_unresolved: stats.unresolved,
        };

        debug!(
            store = %self.name,
            connections = report.connections,
            duplicates = report.duplicates_removed,
            repaired = report.trips_repaired,
            unresolved = report.trips_unresolved,
            "sealed connection store"
        );

        report
    }

    /// Drop connections whose global id was seen before, keeping the first.
    fn remove_duplicates(&mut self) -> usize {
        let before = self.connections.len();
        let mut seen: HashSet<String> = HashSet::with_capacity(before);
        let name = &self.name;

        self.connections.retain(|c| {
            let fresh = seen.insert(c.global_id().to_string());
            if !fresh {
                warn!(store = %name, connection = c.global_id(), "dropping duplicate connection");
            }
            fresh
        });

        before - self.connections.len()
    }

    pub fn is_sealed(&self) -> bool {
        self.index.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Returns the connections; sorted once the store is sealed.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Returns true if any connection departs from or arrives at `stop`.
    pub fn contains_stop(&self, stop: StopId) -> bool {
        self.stops.contains(&stop)
    }

    /// Departure time of the first connection, once sealed.
    pub fn earliest_departure(&self) -> Option<Time> {
        self.sealed_connections().first().map(|c| c.departure_time())
    }

    /// Departure time of the last connection, once sealed.
    pub fn latest_departure(&self) -> Option<Time> {
        self.sealed_connections().last().map(|c| c.departure_time())
    }

    fn sealed_connections(&self) -> &[Connection] {
        if self.is_sealed() {
            &self.connections
        } else {
            &[]
        }
    }

    /// Enumerator positioned before the first connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidState`] if the store is not sealed.
    pub fn enumerator(&self) -> Result<StoreEnumerator<'_>, StoreError> {
        let index = self
            .index
            .as_ref()
            .ok_or(StoreError::InvalidState("store must be sealed before enumerating"))?;
        Ok(StoreEnumerator::new(&self.connections, index))
    }

    /// Enumerator whose `move_next` yields the first connection departing
    /// at or after `time`.
    pub fn enumerator_from(&self, time: Time) -> Result<StoreEnumerator<'_>, StoreError> {
        let mut e = self.enumerator()?;
        e.seek_forward(time);
        Ok(e)
    }

    /// Enumerator whose `move_previous` yields the last connection departing
    /// at or before `time`.
    pub fn enumerator_from_end(&self, time: Time) -> Result<StoreEnumerator<'_>, StoreError> {
        let mut e = self.enumerator()?;
        e.seek_backward(time);
        Ok(e)
    }
}
