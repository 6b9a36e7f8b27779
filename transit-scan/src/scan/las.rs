//! Latest departure scan, the time-reversed dual of the earliest arrival
//! scan.
//!
//! Connections are consumed in descending departure order starting at the
//! deadline. Every stop keeps the journey that leaves it latest while still
//! reaching a target in time, and every trip the journey that alights from
//! it, so staying seated backwards never needs a transfer check.
//!
//! Chains grow from the target towards the departure, so reading a chain
//! from its head already gives travel order. Footpaths are followed
//! backwards for as long as they improve a label, latest departure first.

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

/// Backward connection scan: latest departure from any departure stop that
/// still reaches a target by the deadline.
#[derive(Debug, Clone)]
pub struct LatestConnectionScan<'t, T, M = TransferMetric> {
    timetable: &'t Timetable<'t>,
    transfers: T,
    config: ScanConfig,
    settings: ScanSettings,
    metric: PhantomData<M>,
}

struct Labels<M> {
    arena: JourneyArena<M>,
    best: HashMap<StopId, JourneyId>,
    off_board: HashMap<TripId, JourneyId>,
    best_source: Option<JourneyId>,
}

impl<M: Metric> Labels<M> {
    fn new() -> Self {
        Self {
            arena: JourneyArena::new(),
            best: HashMap::new(),
            off_board: HashMap::new(),
            best_source: None,
        }
    }

    /// Latest departure from `stop`, or `None` if it cannot reach a target.
    fn departure_at(&self, stop: StopId) -> Option<Time> {
        self.best
            .get(&stop)
            .map(|&id| self.arena.step(id).departure_time())
    }

    fn source_departure(&self) -> Option<Time> {
        self.best_source
            .map(|id| self.arena.step(id).departure_time())
    }

    /// The journey continuing on `c.trip` after `c`, if `c` leads into it.
    fn seated(&self, c: &Connection) -> Option<JourneyId> {
        let id = *self.off_board.get(&c.trip()?)?;
        let head = self.arena.step(id);
        (head.departure_stop() == c.arrival_stop() && head.departure_time() >= c.arrival_time())
            .then_some(id)
    }

    /// Re-times a chain made only of walks so that it starts at
    /// `departure`, reaching the target as early as possible. Chains with a
    /// ride are returned unchanged.
    fn walks_starting_at(&mut self, id: JourneyId, departure: Time) -> JourneyId {
        let mut walks = Vec::new();
        let mut target = None;
        for step in self.arena.steps(id) {
            match step {
                Step::Transfer(t) => walks.push((t.from, t.to, t.secs())),
                Step::Genesis { stop, .. } => target = Some(*stop),
                Step::Ride(_) => return id,
            }
        }
        let Some(target) = target else {
            return id;
        };

        let total: u64 = walks.iter().map(|&(_, _, secs)| secs).sum();
        let mut time = departure.saturating_add(total);
        let mut chain = self.arena.genesis(Step::Genesis { stop: target, time });
        for (from, to, secs) in walks.into_iter().rev() {
            time -= secs;
            chain = self
                .arena
                .extend(chain, Step::Transfer(Transfer::new(from, to, time, secs)));
        }
        chain
    }
}

fn later(candidate: Time, existing: Option<Time>) -> bool {
    existing.is_none_or(|t| candidate > t)
}

impl<'t, T: TransferGenerator, M: Metric> LatestConnectionScan<'t, T, M> {
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

    /// The journey departing latest from any departure stop.
    ///
    /// # Errors
    ///
    /// [`ScanError::Unreachable`] if no departure stop can reach a target
    /// within the window, [`ScanError::TimedOut`] if the deadline passes
    /// first.
    pub fn calculate_journey(&self) -> Result<Journey<M>, ScanError> {
        let labels = self.run(true)?;
        match labels.best_source {
            Some(id) => Ok(labels.arena.to_journey(id)),
            None => Err(ScanError::Unreachable),
        }
    }

    /// The latest departing journey from every stop that can still reach a
    /// target within the window.
    ///
    /// # Errors
    ///
    /// [`ScanError::TimedOut`] if the deadline passes first.
    pub fn isochrone(&self) -> Result<HashMap<StopId, Journey<M>>, ScanError> {
        let labels = self.run(false)?;
        Ok(labels
            .best
            .iter()
            .map(|(&stop, &id)| (stop, labels.arena.to_journey(id)))
            .collect())
    }

    fn run(&self, stop_at_sources: bool) -> Result<Labels<M>, ScanError> {
        let deadline = Deadline::after(self.config.timeout());
        let mut labels = Labels::new();

        for &stop in &self.settings.target_stops {
            let id = labels.arena.genesis(Step::Genesis {
                stop,
                time: self.settings.latest_arrival,
            });
            self.reach(&mut labels, stop, id);
        }

        let mut enumerator = self.timetable.enumerator_from_end(self.settings.latest_arrival);
        let mut scanned = 0usize;
        while enumerator.move_previous() {
            let Some(c) = enumerator.current().cloned() else {
                break;
            };
            if c.departure_time() < self.settings.earliest_departure {
                break;
            }
            if stop_at_sources && labels.source_departure().is_some_and(|t| c.departure_time() < t) {
                break;
            }
            if let Err(err) = deadline.check() {
                debug!(connections = scanned, "latest departure scan timed out");
                return Err(err);
            }
            scanned += 1;
            self.scan_connection(&mut labels, c);
        }

        debug!(
            connections = scanned,
            labels = labels.best.len(),
            arena = labels.arena.len(),
            reached = labels.best_source.is_some(),
            "latest departure scan complete"
        );
        Ok(labels)
    }

    fn scan_connection(&self, labels: &mut Labels<M>, c: Connection) {
        if c.mode().is_cancelled() {
            trace!(connection = %c, "skipping cancelled connection");
            return;
        }
        if c.arrival_time() > self.settings.latest_arrival {
            return;
        }

        let journey = match labels.seated(&c) {
            Some(id) => Some(labels.arena.extend(id, Step::Ride(c.clone()))),
            None => self.alight(labels, &c),
        };
        let Some(journey) = journey else {
            return;
        };

        if let Some(trip) = c.trip() {
            labels.off_board.insert(trip, journey);
        }
        if c.mode().can_board() {
            self.reach(labels, c.departure_stop(), journey);
        }
    }

    /// Ride `c` into the label at its arrival stop, if `c` gets there in
    /// time.
    fn alight(&self, labels: &mut Labels<M>, c: &Connection) -> Option<JourneyId> {
        if !c.mode().can_alight() {
            return None;
        }
        let stop = c.arrival_stop();
        let at = *labels.best.get(&stop)?;
        let head = labels.arena.step(at);

        let mut needed = c.arrival_time();
        if let (Some(previous), Some(next)) = (c.trip(), head.trip()) {
            if previous != next {
                needed += self.transfers.transfer_time(stop, stop)?;
            }
        }
        if needed > head.departure_time() {
            trace!(connection = %c, needed, "connection arrives too late");
            return None;
        }

        // Reach the target as soon as the vehicle arrives rather than at
        // the deadline.
        let into = labels.walks_starting_at(at, c.arrival_time());
        Some(labels.arena.extend(into, Step::Ride(c.clone())))
    }

    /// Record leaving `stop` with `id` and walk back to nearby stops,
    /// following footpaths for as long as they improve a label.
    fn reach(&self, labels: &mut Labels<M>, stop: StopId, id: JourneyId) {
        if !self.improve(labels, stop, id) {
            return;
        }
        let mut queue = BinaryHeap::new();
        queue.push((labels.arena.step(id).departure_time(), stop, id));

        while let Some((time, to, id)) = queue.pop() {
            if labels.best.get(&to) != Some(&id) {
                continue;
            }
            for (previous, secs) in self
                .transfers
                .reachable_stops_within(to, self.config.search_radius_m)
            {
                let Some(walk) = Transfer::arriving(previous, to, time, secs) else {
                    continue;
                };
                let departure = walk.departure_time;
                if departure < self.settings.earliest_departure
                    || !later(departure, labels.departure_at(previous))
                {
                    continue;
                }
                let walked = labels.arena.extend(id, Step::Transfer(walk));
                if self.improve(labels, previous, walked) {
                    queue.push((departure, previous, walked));
                }
            }
        }
    }

    fn improve(&self, labels: &mut Labels<M>, stop: StopId, id: JourneyId) -> bool {
        let departure = labels.arena.step(id).departure_time();
        if departure < self.settings.earliest_departure
            || !later(departure, labels.departure_at(stop))
        {
            return false;
        }
        trace!(stop = %stop, departure, "improved departure");
        labels.best.insert(stop, id);
        if self.settings.is_departure(stop) && later(departure, labels.source_departure()) {
            labels.best_source = Some(id);
        }
        true
    }
}
