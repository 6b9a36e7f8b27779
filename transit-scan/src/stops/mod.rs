//! Stop lookup.
//!
//! Provides stop id → coordinates/name resolution. Only transfer
//! generators and journey rendering consult it; the scans themselves work
//! on bare [`StopId`]s.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::StopId;

/// A stop with its global identifier, display name and WGS84 position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub global_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Resolves stop ids to stop records.
pub trait StopReader {
    /// Look up a stop by id.
    fn stop(&self, id: StopId) -> Option<&Stop>;

    /// Iterate over every known stop.
    fn stops(&self) -> Box<dyn Iterator<Item = &Stop> + '_>;

    /// Display name of a stop, falling back to its id.
    fn display_name(&self, id: StopId) -> String {
        self.stop(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

/// In-memory stop table.
///
/// Ids are handed out densely in insertion order; adding a global id twice
/// returns the existing id.
#[derive(Debug, Clone, Default)]
pub struct StopsDb {
    stops: Vec<Stop>,
    by_global_id: HashMap<String, StopId>,
}

impl StopsDb {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stop, returning its id.
    pub fn add(&mut self, global_id: &str, name: &str, lat: f64, lon: f64) -> StopId {
        if let Some(id) = self.by_global_id.get(global_id) {
            return *id;
        }

        let id = StopId(self.stops.len() as u32);
        self.stops.push(Stop {
            id,
            global_id: global_id.to_string(),
            name: name.to_string(),
            lat,
            lon,
        });
        self.by_global_id.insert(global_id.to_string(), id);
        id
    }

    /// Find a stop by its global identifier.
    pub fn find(&self, global_id: &str) -> Option<StopId> {
        self.by_global_id.get(global_id).copied()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

impl StopReader for StopsDb {
    fn stop(&self, id: StopId) -> Option<&Stop> {
        self.stops.get(id.0 as usize)
    }

    fn stops(&self) -> Box<dyn Iterator<Item = &Stop> + '_> {
        Box::new(self.stops.iter())
    }
}

/// Great-circle distance between two stops in metres.
pub fn distance_m(a: &Stop, b: &Stop) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
