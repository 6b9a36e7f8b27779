//! Earliest arrival scan.
//!
//! Connections are consumed in ascending departure order. Every stop keeps
//! the journey that reaches it first, and every trip the journey that is
//! currently sitting on it, so continuing on the same vehicle never needs a
//! transfer check.
//!
//! Every improved label walks on to the stops around it, and walks that
//! improve a label walk on again, closest arrival first.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::domain::{Connection, StopId, Time, TripId};
use crate::journey::{Journey, JourneyArena, JourneyId, Metric, Step, Transfer, TransferMetric};
use crate::store::Timetable;
use crate::transfer::TransferGenerator;

use super::config::ScanConfig;
use super::error::ScanError;
use super::request::{Deadline, ScanSettings};

/// Forward connection scan: earliest arrival at any target.
///
/// # Examples
///
/// ```
/// use transit_scan::domain::{Connection, StopId, TripId};
/// use transit_scan::journey::TransferMetric;
/// use transit_scan::scan::{EarliestConnectionScan, ScanConfig, ScanSettings};
/// use transit_scan::store::{ConnectionStore, Timetable};
/// use transit_scan::transfer::InternalTransferGenerator;
///
/// let mut store = ConnectionStore::new("demo");
/// store.add(Connection::between("a", StopId(0), StopId(1), 100, 160, Some(TripId(0))).unwrap()).unwrap();
/// store.add(Connection::between("b", StopId(1), StopId(2), 200, 260, Some(TripId(1))).unwrap()).unwrap();
/// store.seal();
///
/// let timetable = Timetable::single(&store).unwrap();
/// let scan = EarliestConnectionScan::<_, TransferMetric>::new(
///     &timetable,
///     InternalTransferGenerator::new(0),
///     &ScanConfig::default(),
///     ScanSettings::new(StopId(0), StopId(2), 0, 300),
/// )
/// .unwrap();
///
/// let journey = scan.calculate_journey().unwrap();
/// assert_eq!(journey.arrival_time(), 260);
/// assert_eq!(journey.metric().transfers(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct EarliestConnectionScan<'t, T, M = TransferMetric> {
    timetable: &'t Timetable<'t>,
    transfers: T,
    config: ScanConfig,
    settings: ScanSettings,
    metric: PhantomData<M>,
}

/// Per-invocation labels.
struct Labels<M> {
    arena: JourneyArena<M>,
    best: HashMap<StopId, JourneyId>,
    on_board: HashMap<TripId, JourneyId>,
    best_target: Option<JourneyId>,
}

impl<M: Metric> Labels<M> {
    fn new() -> Self {
        Self {
            arena: JourneyArena::new(),
            best: HashMap::new(),
            on_board: HashMap::new(),
            best_target: None,
        }
    }

    /// Arrival time at `stop`; unreached stops arrive at `Time::MAX`.
    fn arrival_at(&self, stop: StopId) -> Time {
        self.best
            .get(&stop)
            .map_or(Time::MAX, |&id| self.arena.step(id).arrival_time())
    }

    fn target_arrival(&self) -> Time {
        self.best_target
            .map_or(Time::MAX, |id| self.arena.step(id).arrival_time())
    }

    /// The journey currently riding `c.trip`, if it can ride on into `c`.
    fn seated(&self, c: &Connection) -> Option<JourneyId> {
        let id = *self.on_board.get(&c.trip()?)?;
        let head = self.arena.step(id);
        (head.arrival_stop() == c.departure_stop() && head.arrival_time() <= c.departure_time())
            .then_some(id)
    }

    /// Re-times a chain made only of walks so that it ends at `arrival`,
    /// leaving its origin as late as possible. Chains with a ride are
    /// returned unchanged.
    fn walks_ending_at(&mut self, id: JourneyId, arrival: Time) -> JourneyId {
        let mut walks = Vec::new();
        let mut origin = None;
        for step in self.arena.steps(id) {
            match step {
                Step::Transfer(t) => walks.push((t.from, t.to, t.secs())),
                Step::Genesis { stop, .. } => origin = Some(*stop),
                Step::Ride(_) => return id,
            }
        }
        let Some(origin) = origin else {
            return id;
        };

        let total: u64 = walks.iter().map(|&(_, _, secs)| secs).sum();
        let mut time = arrival.saturating_sub(total);
        let mut chain = self.arena.genesis(Step::Genesis { stop: origin, time });
        for (from, to, secs) in walks.into_iter().rev() {
            chain = self
                .arena
                .extend(chain, Step::Transfer(Transfer::new(from, to, time, secs)));
            time += secs;
        }
        chain
    }

    fn into_journey(mut self, id: JourneyId) -> Journey<M> {
        let reversed = self.arena.reverse(id);
        self.arena.to_journey(reversed)
    }
}

impl<'t, T: TransferGenerator, M: Metric> EarliestConnectionScan<'t, T, M> {
    /// Prepare a scan.
    ///
    /// # Errors
    ///
    /// Fails as [`ScanSettings::validate`] does.
    pub fn new(
        timetable: &'t Timetable<'t>,
        transfers: T,
        config: &ScanConfig,
        settings: ScanSettings,
    ) -> Result<Self, ScanError> {
        settings.validate(config, timetable)?;
        Ok(Self {
            timetable,
            transfers,
            config: config.clone(),
            settings,
            metric: PhantomData,
        })
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// The journey arriving earliest at any target.
    ///
    /// # Errors
    ///
    /// [`ScanError::Unreachable`] if no target can be reached within the
    /// window, [`ScanError::TimedOut`] if the deadline passes first.
    pub fn calculate_journey(&self) -> Result<Journey<M>, ScanError> {
        let labels = self.run(true)?;
        match labels.best_target {
            Some(id) => Ok(labels.into_journey(id)),
            None => Err(ScanError::Unreachable),
        }
    }

    /// The earliest arriving journey to every stop reachable within the
    /// window, ignoring targets.
    ///
    /// # Errors
    ///
    /// [`ScanError::TimedOut`] if the deadline passes first.
    pub fn isochrone(&self) -> Result<HashMap<StopId, Journey<M>>, ScanError> {
        let mut labels = self.run(false)?;
        let reached: Vec<(StopId, JourneyId)> = labels.best.iter().map(|(s, id)| (*s, *id)).collect();
        Ok(reached
            .into_iter()
            .map(|(stop, id)| {
                let reversed = labels.arena.reverse(id);
                (stop, labels.arena.to_journey(reversed))
            })
            .collect())
    }

    fn run(&self, stop_at_targets: bool) -> Result<Labels<M>, ScanError> {
        let deadline = Deadline::after(self.config.timeout());
        let mut labels = Labels::new();

        for &stop in &self.settings.departure_stops {
            let id = labels.arena.genesis(Step::Genesis {
                stop,
                time: self.settings.earliest_departure,
            });
            self.reach(&mut labels, stop, id);
        }

        let mut enumerator = self.timetable.enumerator_from(self.settings.earliest_departure);
        let mut scanned = 0usize;
        while enumerator.move_next() {
            let Some(c) = enumerator.current().cloned() else {
                break;
            };
            if c.departure_time() > self.settings.latest_arrival {
                break;
            }
            if stop_at_targets && c.departure_time() > labels.target_arrival() {
                break;
            }
            if let Err(err) = deadline.check() {
                debug!(connections = scanned, "earliest arrival scan timed out");
                return Err(err);
            }
            scanned += 1;
            self.scan_connection(&mut labels, c);
        }

        debug!(
            connections = scanned,
            labels = labels.best.len(),
            arena = labels.arena.len(),
            reached = labels.best_target.is_some(),
            "earliest arrival scan complete"
        );
        Ok(labels)
    }

    fn scan_connection(&self, labels: &mut Labels<M>, c: Connection) {
        if c.mode().is_cancelled() {
            trace!(connection = %c, "skipping cancelled connection");
            return;
        }

        let journey = match labels.seated(&c) {
            Some(id) => Some(labels.arena.extend(id, Step::Ride(c.clone()))),
            None => self.board(labels, &c),
        };
        let Some(journey) = journey else {
            return;
        };

        if let Some(trip) = c.trip() {
            labels.on_board.insert(trip, journey);
        }
        if c.mode().can_alight() {
            self.reach(labels, c.arrival_stop(), journey);
        }
    }

    /// Board `c` from the label at its departure stop, if that label is
    /// there in time.
    fn board(&self, labels: &mut Labels<M>, c: &Connection) -> Option<JourneyId> {
        if !c.mode().can_board() {
            return None;
        }
        let stop = c.departure_stop();
        let at = *labels.best.get(&stop)?;
        let head = labels.arena.step(at);

        let mut ready = head.arrival_time();
        if let (Some(previous), Some(next)) = (head.trip(), c.trip()) {
            if previous != next {
                ready += self.transfers.transfer_time(stop, stop)?;
            }
        }
        if c.departure_time() < ready {
            trace!(connection = %c, ready, "missed connection");
            return None;
        }

        // Leave the origin just in time for the vehicle rather than at the
        // beginning of the window.
        let from = labels.walks_ending_at(at, c.departure_time());
        Some(labels.arena.extend(from, Step::Ride(c.clone())))
    }

    /// Record arriving at `stop` with `id` and walk on to nearby stops,
    /// following footpaths for as long as they improve a label.
    fn reach(&self, labels: &mut Labels<M>, stop: StopId, id: JourneyId) {
        if !self.improve(labels, stop, id) {
            return;
        }
        let mut queue = BinaryHeap::new();
        queue.push(Reverse((labels.arena.step(id).arrival_time(), stop, id)));

        while let Some(Reverse((time, from, id))) = queue.pop() {
            if labels.best.get(&from) != Some(&id) {
                continue;
            }
            for (next, secs) in self
                .transfers
                .reachable_stops_within(from, self.config.search_radius_m)
            {
                let arrival = time.saturating_add(secs);
                if arrival > self.settings.latest_arrival || arrival >= labels.arrival_at(next) {
                    continue;
                }
                let walked = labels
                    .arena
                    .extend(id, Step::Transfer(Transfer::new(from, next, time, secs)));
                if self.improve(labels, next, walked) {
                    queue.push(Reverse((arrival, next, walked)));
                }
            }
        }
    }

    fn improve(&self, labels: &mut Labels<M>, stop: StopId, id: JourneyId) -> bool {
        let arrival = labels.arena.step(id).arrival_time();
        if arrival > self.settings.latest_arrival || arrival >= labels.arrival_at(stop) {
            return false;
        }
        trace!(stop = %stop, arrival, "improved arrival");
        labels.best.insert(stop, id);
        if self.settings.is_target(stop) && arrival < labels.target_arrival() {
            labels.best_target = Some(id);
        }
        true
    }
}
