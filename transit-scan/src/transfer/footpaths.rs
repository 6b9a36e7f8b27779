//! Explicit footpaths between stops.
//!
//! Some stops are close enough to walk between even though no vehicle links
//! them, e.g. neighbouring stations or the platforms of an interchange. This
//! table records such pairs and their walking times.

use std::collections::HashMap;

use crate::domain::StopId;
use crate::stops::StopsDb;

use super::TransferGenerator;

/// Walking speed used to turn a search radius into a time budget.
pub const DEFAULT_WALKING_SPEED_MPS: f64 = 1.3;

/// A symmetric table of footpaths.
///
/// If you can walk from A to B, you can walk from B to A in the same time.
#[derive(Debug, Clone)]
pub struct FootpathTable {
    /// Walk time in seconds, keyed by origin then destination.
    /// Stored in both directions.
    footpaths: HashMap<StopId, HashMap<StopId, u64>>,
    min_change_secs: u64,
    walking_speed_mps: f64,
}

impl Default for FootpathTable {
    fn default() -> Self {
        Self {
            footpaths: HashMap::new(),
            min_change_secs: 0,
            walking_speed_mps: DEFAULT_WALKING_SPEED_MPS,
        }
    }
}

impl FootpathTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a footpath between two distinct stops.
    ///
    /// Re-adding a pair replaces its time. Self-loops are ignored; use the
    /// minimum change time for that.
    pub fn add(&mut self, a: StopId, b: StopId, secs: u64) {
        if a == b {
            return;
        }
        self.footpaths.entry(a).or_default().insert(b, secs);
        self.footpaths.entry(b).or_default().insert(a, secs);
    }

    /// Walking time between two stops, if a footpath exists.
    pub fn get(&self, from: StopId, to: StopId) -> Option<u64> {
        self.footpaths.get(&from)?.get(&to).copied()
    }

    pub fn is_walkable(&self, from: StopId, to: StopId) -> bool {
        self.get(from, to).is_some()
    }

    /// All footpaths leaving `from`, sorted by walking time.
    pub fn walkable_from(&self, from: StopId) -> Vec<(StopId, u64)> {
        let mut out: Vec<_> = self
            .footpaths
            .get(&from)
            .map(|paths| paths.iter().map(|(to, secs)| (*to, *secs)).collect())
            .unwrap_or_default();
        out.sort_by_key(|&(stop, secs)| (secs, stop));
        out
    }

    /// Number of footpaths, counting A-B and B-A once.
    pub fn len(&self) -> usize {
        self.footpaths.values().map(HashMap::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.footpaths.is_empty()
    }

    pub fn min_change_secs(&self) -> u64 {
        self.min_change_secs
    }
}

impl TransferGenerator for FootpathTable {
    fn transfer_time(&self, from: StopId, to: StopId) -> Option<u64> {
        if from == to {
            Some(self.min_change_secs)
        } else {
            self.get(from, to)
        }
    }

    /// Footpaths whose walking time fits within the time it takes to walk
    /// `radius_m` at the table's walking speed.
    fn reachable_stops_within(&self, stop: StopId, radius_m: f64) -> Vec<(StopId, u64)> {
        let budget = radius_m / self.walking_speed_mps;
        self.walkable_from(stop)
            .into_iter()
            .filter(|&(_, secs)| secs as f64 <= budget)
            .collect()
    }
}

/// Builder for footpath tables.
#[derive(Debug, Default)]
pub struct FootpathTableBuilder {
    inner: FootpathTable,
}

impl FootpathTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum time to change vehicles within one stop.
    pub fn min_change_secs(mut self, secs: u64) -> Self {
        self.inner.min_change_secs = secs;
        self
    }

    /// Walking speed used for radius queries. Non-positive speeds are
    /// ignored.
    pub fn walking_speed(mut self, metres_per_sec: f64) -> Self {
        if metres_per_sec > 0.0 {
            self.inner.walking_speed_mps = metres_per_sec;
        }
        self
    }

    pub fn add(mut self, a: StopId, b: StopId, secs: u64) -> Self {
        self.inner.add(a, b, secs);
        self
    }

    /// Add a footpath between stops given by global id.
    ///
    /// Unknown stops are skipped.
    pub fn add_named(mut self, stops: &StopsDb, a: &str, b: &str, secs: u64) -> Self {
        if let (Some(a), Some(b)) = (stops.find(a), stops.find(b)) {
            self.inner.add(a, b, secs);
        }
        self
    }

    pub fn build(self) -> FootpathTable {
        self.inner
    }
}
