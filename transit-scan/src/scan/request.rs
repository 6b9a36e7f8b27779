//! Scan requests.

use std::time::{Duration, Instant};

use crate::domain::{StopId, Time};
use crate::store::Timetable;

use super::config::ScanConfig;
use super::error::ScanError;

/// What to scan for: where from, where to, and within which window.
///
/// Every scan accepts several departure stops (all seeded at
/// `earliest_departure`) and several target stops (any of which counts as
/// arriving).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    pub departure_stops: Vec<StopId>,
    pub target_stops: Vec<StopId>,
    pub earliest_departure: Time,
    pub latest_arrival: Time,
}

impl ScanSettings {
    /// Create a request between two stops.
    pub fn new(from: StopId, to: StopId, earliest_departure: Time, latest_arrival: Time) -> Self {
        Self {
            departure_stops: vec![from],
            target_stops: vec![to],
            earliest_departure,
            latest_arrival,
        }
    }

    /// Also accept departing from `stop`.
    pub fn with_departure_stop(mut self, stop: StopId) -> Self {
        if !self.departure_stops.contains(&stop) {
            self.departure_stops.push(stop);
        }
        self
    }

    /// Also accept arriving at `stop`.
    pub fn with_target_stop(mut self, stop: StopId) -> Self {
        if !self.target_stops.contains(&stop) {
            self.target_stops.push(stop);
        }
        self
    }

    pub fn is_target(&self, stop: StopId) -> bool {
        self.target_stops.contains(&stop)
    }

    pub fn is_departure(&self, stop: StopId) -> bool {
        self.departure_stops.contains(&stop)
    }

    /// Check the request against a timetable before scanning.
    ///
    /// # Errors
    ///
    /// - [`ScanError::InvalidArgument`] if a stop list is empty, the window
    ///   is empty or open-ended, or the window is longer than the configured
    ///   maximum.
    /// - [`ScanError::NotFound`] if a requested stop is served by no store.
    pub fn validate(&self, config: &ScanConfig, timetable: &Timetable<'_>) -> Result<(), ScanError> {
        if self.departure_stops.is_empty() {
            return Err(ScanError::InvalidArgument(
                "no departure stops".to_string(),
            ));
        }
        if self.target_stops.is_empty() {
            return Err(ScanError::InvalidArgument("no target stops".to_string()));
        }
        if self.earliest_departure >= self.latest_arrival {
            return Err(ScanError::InvalidArgument(format!(
                "departure time {} is not before arrival time {}",
                self.earliest_departure, self.latest_arrival
            )));
        }
        if self.latest_arrival == Time::MAX {
            return Err(ScanError::InvalidArgument(
                "arrival time must be bounded".to_string(),
            ));
        }
        let window = self.latest_arrival - self.earliest_departure;
        if window > config.max_window_secs {
            return Err(ScanError::InvalidArgument(format!(
                "window of {window}s exceeds the maximum of {}s",
                config.max_window_secs
            )));
        }

        for &stop in self.departure_stops.iter().chain(&self.target_stops) {
            if !timetable.contains_stop(stop) {
                return Err(ScanError::NotFound { stop });
            }
        }
        Ok(())
    }
}

/// Cooperative deadline, checked once per examined connection.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    expires: Option<Instant>,
}

impl Deadline {
    pub(crate) fn after(timeout: Option<Duration>) -> Self {
        Self {
            expires: timeout.map(|t| Instant::now() + t),
        }
    }

    pub(crate) fn check(&self) -> Result<(), ScanError> {
        match self.expires {
            Some(expires) if Instant::now() >= expires => Err(ScanError::TimedOut),
            _ => Ok(()),
        }
    }
}
