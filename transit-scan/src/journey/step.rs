//! Journey step types.

use chrono::Duration;

use crate::domain::{Connection, StopId, Time, TripId};

/// A walk or in-station change between two stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Origin stop
    pub from: StopId,
    /// Destination stop
    pub to: StopId,
    /// Moment the traveller leaves `from`
    pub departure_time: Time,
    /// Moment the traveller reaches `to`
    pub arrival_time: Time,
}

impl Transfer {
    /// Creates a transfer leaving `from` at `departure_time` and taking `secs`.
    pub fn new(from: StopId, to: StopId, departure_time: Time, secs: u64) -> Self {
        Self {
            from,
            to,
            departure_time,
            arrival_time: departure_time.saturating_add(secs),
        }
    }

    /// Creates a transfer that must reach `to` by `arrival_time`.
    ///
    /// Returns `None` if the transfer would have to start before time zero.
    pub fn arriving(from: StopId, to: StopId, arrival_time: Time, secs: u64) -> Option<Self> {
        Some(Self {
            from,
            to,
            departure_time: arrival_time.checked_sub(secs)?,
            arrival_time,
        })
    }

    /// Returns the walking time in seconds.
    pub fn secs(&self) -> u64 {
        self.arrival_time - self.departure_time
    }
}

/// One element of a journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Being at a stop at a moment: the start of a forward-built chain or
    /// the end of a backward-built one.
    Genesis { stop: StopId, time: Time },
    /// Riding one connection.
    Ride(Connection),
    /// Walking or changing platforms.
    Transfer(Transfer),
}

impl Step {
    /// Returns the stop this step leaves from.
    pub fn departure_stop(&self) -> StopId {
        match self {
            Step::Genesis { stop, .. } => *stop,
            Step::Ride(c) => c.departure_stop(),
            Step::Transfer(t) => t.from,
        }
    }

    /// Returns the stop this step ends at.
    pub fn arrival_stop(&self) -> StopId {
        match self {
            Step::Genesis { stop, .. } => *stop,
            Step::Ride(c) => c.arrival_stop(),
            Step::Transfer(t) => t.to,
        }
    }

    /// Returns the moment this step begins.
    pub fn departure_time(&self) -> Time {
        match self {
            Step::Genesis { time, .. } => *time,
            Step::Ride(c) => c.departure_time(),
            Step::Transfer(t) => t.departure_time,
        }
    }

    /// Returns the moment this step ends.
    pub fn arrival_time(&self) -> Time {
        match self {
            Step::Genesis { time, .. } => *time,
            Step::Ride(c) => c.arrival_time(),
            Step::Transfer(t) => t.arrival_time,
        }
    }

    /// Returns the duration of this step.
    pub fn duration(&self) -> Duration {
        Duration::seconds((self.arrival_time() - self.departure_time()) as i64)
    }

    /// The vehicle trip ridden in this step, if any.
    ///
    /// Timetabled walking connections have no trip.
    pub fn trip(&self) -> Option<TripId> {
        match self {
            Step::Ride(c) => c.trip(),
            Step::Genesis { .. } | Step::Transfer(_) => None,
        }
    }

    /// Seconds spent on foot in this step.
    pub fn walking_secs(&self) -> u64 {
        match self {
            Step::Ride(c) if c.is_walk() => c.travel_time(),
            Step::Transfer(t) => t.secs(),
            Step::Ride(_) | Step::Genesis { .. } => 0,
        }
    }

    /// Returns true for the stay at a stop that anchors a chain.
    pub fn is_genesis(&self) -> bool {
        matches!(self, Step::Genesis { .. })
    }

    /// Returns the connection if this is a ride.
    pub fn as_connection(&self) -> Option<&Connection> {
        match self {
            Step::Ride(c) => Some(c),
            Step::Genesis { .. } | Step::Transfer(_) => None,
        }
    }
}
