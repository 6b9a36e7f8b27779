//! Transfers between connections.
//!
//! Scans never decide on their own whether a change of vehicle or a walk is
//! possible; they ask a [`TransferGenerator`]. Three generators are
//! provided:
//!
//! - [`InternalTransferGenerator`]: in-station changes only.
//! - [`FootpathTable`]: an explicit, symmetric table of walkable stop pairs.
//! - [`CrowsFlightTransferGenerator`]: straight-line walking over stop
//!   coordinates.

mod crows_flight;
mod footpaths;

pub use crows_flight::CrowsFlightTransferGenerator;
pub use footpaths::{FootpathTable, FootpathTableBuilder};

use crate::domain::StopId;

/// Source of transfer and footpath times.
///
/// Implementations must answer deterministically for a fixed pair of stops
/// during one scan. Backward scans use [`reachable_stops_within`] to find
/// the stops a walk *into* `stop` can start from, so footpaths are expected
/// to be symmetric.
///
/// [`reachable_stops_within`]: TransferGenerator::reachable_stops_within
pub trait TransferGenerator {
    /// Seconds needed to get from `from` to `to`, or `None` if that transfer
    /// is not possible.
    ///
    /// With `from == to` this is the minimum time to change vehicles within
    /// the stop.
    fn transfer_time(&self, from: StopId, to: StopId) -> Option<u64>;

    /// Other stops that can be reached on foot from `stop` within
    /// `radius_m` metres, with the walking time to each.
    ///
    /// Never contains `stop` itself.
    fn reachable_stops_within(&self, stop: StopId, radius_m: f64) -> Vec<(StopId, u64)>;
}

impl<T: TransferGenerator + ?Sized> TransferGenerator for &T {
    fn transfer_time(&self, from: StopId, to: StopId) -> Option<u64> {
        (**self).transfer_time(from, to)
    }

    fn reachable_stops_within(&self, stop: StopId, radius_m: f64) -> Vec<(StopId, u64)> {
        (**self).reachable_stops_within(stop, radius_m)
    }
}

/// Allows changing vehicles inside a stop after a fixed minimum time.
/// No walking between stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InternalTransferGenerator {
    pub min_change_secs: u64,
}

impl InternalTransferGenerator {
    pub fn new(min_change_secs: u64) -> Self {
        Self { min_change_secs }
    }
}

impl TransferGenerator for InternalTransferGenerator {
    fn transfer_time(&self, from: StopId, to: StopId) -> Option<u64> {
        (from == to).then_some(self.min_change_secs)
    }

    fn reachable_stops_within(&self, _stop: StopId, _radius_m: f64) -> Vec<(StopId, u64)> {
        Vec::new()
    }
}
