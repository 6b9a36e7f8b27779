//! Straight-line walking transfers.

use crate::domain::StopId;
use crate::stops::{StopReader, distance_m};

use super::TransferGenerator;
use super::footpaths::DEFAULT_WALKING_SPEED_MPS;

/// Walks between any two stops within `max_distance_m` of each other, at a
/// fixed speed along the great circle.
///
/// Radius queries scan every stop the reader knows; large networks should
/// precompute a [`super::FootpathTable`] instead.
#[derive(Debug, Clone)]
pub struct CrowsFlightTransferGenerator<'a, R> {
    stops: &'a R,
    walking_speed_mps: f64,
    max_distance_m: f64,
    min_change_secs: u64,
}

impl<'a, R: StopReader> CrowsFlightTransferGenerator<'a, R> {
    pub fn new(stops: &'a R, max_distance_m: f64) -> Self {
        Self {
            stops,
            walking_speed_mps: DEFAULT_WALKING_SPEED_MPS,
            max_distance_m,
            min_change_secs: 0,
        }
    }

    pub fn with_walking_speed(mut self, metres_per_sec: f64) -> Self {
        if metres_per_sec > 0.0 {
            self.walking_speed_mps = metres_per_sec;
        }
        self
    }

    pub fn with_min_change_secs(mut self, secs: u64) -> Self {
        self.min_change_secs = secs;
        self
    }

    fn walk_secs(&self, metres: f64) -> u64 {
        (metres / self.walking_speed_mps).ceil() as u64
    }
}

impl<R: StopReader> TransferGenerator for CrowsFlightTransferGenerator<'_, R> {
    fn transfer_time(&self, from: StopId, to: StopId) -> Option<u64> {
        if from == to {
            return Some(self.min_change_secs);
        }
        let d = distance_m(self.stops.stop(from)?, self.stops.stop(to)?);
        (d <= self.max_distance_m).then(|| self.walk_secs(d))
    }

    fn reachable_stops_within(&self, stop: StopId, radius_m: f64) -> Vec<(StopId, u64)> {
        let Some(origin) = self.stops.stop(stop) else {
            return Vec::new();
        };
        let limit = radius_m.min(self.max_distance_m);

        let mut out: Vec<_> = self
            .stops
            .stops()
            .filter(|other| other.id != stop)
            .filter_map(|other| {
                let d = distance_m(origin, other);
                (d <= limit).then(|| (other.id, self.walk_secs(d)))
            })
            .collect();
        out.sort_by_key(|&(id, secs)| (secs, id));
        out
    }
}
