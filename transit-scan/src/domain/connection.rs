//! Connection type.
//!
//! A `Connection` is one scheduled vehicle movement between two adjacent
//! stops. Trips are decomposed into connections; walking links that are
//! part of the timetable are connections without a trip.

use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

use super::{DomainError, StopId, Time, TripId, format_clock};

/// Boarding and alighting restrictions of a connection.
///
/// A small bitmask; the default is [`ConnectionMode::NORMAL`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConnectionMode(u8);

impl ConnectionMode {
    /// Boarding and alighting both allowed.
    pub const NORMAL: Self = Self(0);
    /// Travellers already on board may stay, nobody may get on here.
    pub const NO_BOARDING: Self = Self(1);
    /// Nobody may get off at the arrival stop; the vehicle continues.
    pub const NO_ALIGHTING: Self = Self(2);
    /// The connection does not run.
    pub const CANCELLED: Self = Self(4);

    /// Build a mode from raw bits, ignoring unknown bits.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0b111)
    }

    /// Returns the raw bits.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Returns true if every flag of `other` is set in `self`.
    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if travellers may get on at the departure stop.
    pub fn can_board(&self) -> bool {
        !self.contains(Self::NO_BOARDING) && !self.is_cancelled()
    }

    /// Returns true if travellers may get off at the arrival stop.
    pub fn can_alight(&self) -> bool {
        !self.contains(Self::NO_ALIGHTING) && !self.is_cancelled()
    }

    pub fn is_cancelled(&self) -> bool {
        self.contains(Self::CANCELLED)
    }
}

impl BitOr for ConnectionMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionMode({:#05b})", self.0)
    }
}

/// One scheduled movement between two stops.
///
/// # Invariants
///
/// - `departure_time + travel_time == arrival_time`
/// - the global id is non-empty
///
/// The global id is shared (`Arc<str>`), so cloning a connection into a
/// journey never copies the identifier.
#[derive(Clone, PartialEq, Eq)]
pub struct Connection {
    global_id: Arc<str>,
    departure_stop: StopId,
    arrival_stop: StopId,
    departure_time: Time,
    travel_time: u64,
    trip: Option<TripId>,
    mode: ConnectionMode,
}

impl Connection {
    /// Construct a connection from its departure time and travel time.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the global id is empty or the arrival time would
    /// overflow [`Time`].
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_scan::domain::{Connection, StopId, TripId};
    ///
    /// let c = Connection::new("c1", StopId(0), StopId(1), 100, 60, Some(TripId(7))).unwrap();
    /// assert_eq!(c.arrival_time(), 160);
    /// assert!(!c.is_walk());
    /// ```
    pub fn new(
        global_id: &str,
        departure_stop: StopId,
        arrival_stop: StopId,
        departure_time: Time,
        travel_time: u64,
        trip: Option<TripId>,
    ) -> Result<Self, DomainError> {
        if global_id.is_empty() {
            return Err(DomainError::EmptyGlobalId);
        }
        if departure_time.checked_add(travel_time).is_none() {
            return Err(DomainError::TimeOverflow(global_id.to_string()));
        }

        Ok(Self {
            global_id: Arc::from(global_id),
            departure_stop,
            arrival_stop,
            departure_time,
            travel_time,
            trip,
            mode: ConnectionMode::NORMAL,
        })
    }

    /// Construct a connection from departure and arrival times.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the arrival precedes the departure or the id is empty.
    pub fn between(
        global_id: &str,
        departure_stop: StopId,
        arrival_stop: StopId,
        departure_time: Time,
        arrival_time: Time,
        trip: Option<TripId>,
    ) -> Result<Self, DomainError> {
        let travel_time = arrival_time
            .checked_sub(departure_time)
            .ok_or_else(|| DomainError::NegativeTravelTime(global_id.to_string()))?;
        Self::new(
            global_id,
            departure_stop,
            arrival_stop,
            departure_time,
            travel_time,
            trip,
        )
    }

    /// Returns a copy of this connection with the given mode.
    pub fn with_mode(mut self, mode: ConnectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the globally unique identifier of this connection.
    pub fn global_id(&self) -> &str {
        &self.global_id
    }

    /// Returns the stop the vehicle leaves from.
    pub fn departure_stop(&self) -> StopId {
        self.departure_stop
    }

    /// Returns the stop the vehicle arrives at.
    pub fn arrival_stop(&self) -> StopId {
        self.arrival_stop
    }

    /// Returns the scheduled departure time.
    pub fn departure_time(&self) -> Time {
        self.departure_time
    }

    /// Returns the time spent on board, in seconds.
    pub fn travel_time(&self) -> u64 {
        self.travel_time
    }

    /// Returns the scheduled arrival time.
    pub fn arrival_time(&self) -> Time {
        self.departure_time + self.travel_time
    }

    /// The trip this connection belongs to; `None` for a walking link.
    pub fn trip(&self) -> Option<TripId> {
        self.trip
    }

    /// Returns the boarding and alighting restrictions.
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// Returns true if this is a continuous (walking) connection.
    pub fn is_walk(&self) -> bool {
        self.trip.is_none()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Connection({} {:?}@{} -> {:?}@{}",
            self.global_id,
            self.departure_stop,
            self.departure_time,
            self.arrival_stop,
            self.arrival_time()
        )?;
        if let Some(trip) = self.trip {
            write!(f, " {trip:?}")?;
        }
        if self.mode != ConnectionMode::NORMAL {
            write!(f, " {:?}", self.mode)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} {}",
            format_clock(self.departure_time),
            self.departure_stop,
            format_clock(self.arrival_time()),
            self.arrival_stop
        )
    }
}
