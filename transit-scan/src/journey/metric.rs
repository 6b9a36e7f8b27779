//! Journey metrics.
//!
//! A metric is computed incrementally as a journey grows, one step at a time,
//! so the scan never has to walk a chain to evaluate it.

use std::fmt;

use crate::domain::Time;

use super::step::Step;

/// Accumulated evaluation of a journey.
///
/// # Invariants
///
/// Building the same steps in the same order always yields the same metric.
pub trait Metric: Clone + fmt::Debug {
    /// Metric of a journey consisting of `step` alone.
    fn initial(step: &Step) -> Self;

    /// Metric after appending `step` next to `adjacent`, the step at the
    /// current head of the chain.
    ///
    /// Forward-built chains append later steps and backward-built chains
    /// append earlier ones; metrics must give the same answer either way.
    fn combine(&self, adjacent: &Step, step: &Step) -> Self;
}

/// Whether moving from `adjacent` into `step` means getting on a vehicle.
fn boards_vehicle(adjacent: &Step, step: &Step) -> bool {
    match step.trip() {
        Some(trip) => adjacent.trip() != Some(trip),
        None => false,
    }
}

/// Tracks vehicles boarded, time on foot and the covered time span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferMetric {
    vehicles: u32,
    walking_secs: u64,
    departure: Time,
    arrival: Time,
}

impl TransferMetric {
    /// Number of distinct vehicle boardings.
    pub fn vehicles(&self) -> u32 {
        self.vehicles
    }

    /// Changes between vehicles: one fewer than boardings.
    pub fn transfers(&self) -> u32 {
        self.vehicles.saturating_sub(1)
    }

    /// Returns the seconds spent on foot.
    pub fn walking_secs(&self) -> u64 {
        self.walking_secs
    }

    /// Returns the earliest moment covered.
    pub fn departure_time(&self) -> Time {
        self.departure
    }

    /// Returns the latest moment covered.
    pub fn arrival_time(&self) -> Time {
        self.arrival
    }

    /// Returns the covered span in seconds.
    pub fn travel_time(&self) -> u64 {
        self.arrival - self.departure
    }
}

impl Metric for TransferMetric {
    fn initial(step: &Step) -> Self {
        Self {
            vehicles: u32::from(step.trip().is_some()),
            walking_secs: step.walking_secs(),
            departure: step.departure_time(),
            arrival: step.arrival_time(),
        }
    }

    fn combine(&self, adjacent: &Step, step: &Step) -> Self {
        Self {
            vehicles: self.vehicles + u32::from(boards_vehicle(adjacent, step)),
            walking_secs: self.walking_secs + step.walking_secs(),
            departure: self.departure.min(step.departure_time()),
            arrival: self.arrival.max(step.arrival_time()),
        }
    }
}

/// Only the covered time span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TravelTime {
    departure: Time,
    arrival: Time,
}

impl TravelTime {
    /// Returns the earliest moment covered.
    pub fn departure_time(&self) -> Time {
        self.departure
    }

    /// Returns the latest moment covered.
    pub fn arrival_time(&self) -> Time {
        self.arrival
    }

    /// Returns the covered span in seconds.
    pub fn travel_time(&self) -> u64 {
        self.arrival - self.departure
    }
}

impl Metric for TravelTime {
    fn initial(step: &Step) -> Self {
        Self {
            departure: step.departure_time(),
            arrival: step.arrival_time(),
        }
    }

    fn combine(&self, _adjacent: &Step, step: &Step) -> Self {
        Self {
            departure: self.departure.min(step.departure_time()),
            arrival: self.arrival.max(step.arrival_time()),
        }
    }
}
