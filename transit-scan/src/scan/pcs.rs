//! Profiled connection scan.
//!
//! Computes, for every departure stop, the Pareto-optimal journeys reaching
//! a target within the window, across every departure time in it.
//!
//! Connections are consumed backwards in time. Each stop keeps a frontier
//! of journeys leaving it, and each trip a frontier of journeys currently
//! riding it. Walks into a stop become usable only once the sweep has
//! moved past their departure time; until then they wait in a max-heap
//! keyed by that time. A walk that improves a stop's frontier queues the
//! walks into that stop in turn.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::domain::{Connection, StopId, Time, TripId};
use crate::journey::{
    Comparator, Journey, JourneyArena, JourneyId, Metric, ParetoComparator, ParetoFrontier,
    ProfileComparator, Step, Transfer, TransferMetric,
};
use crate::store::Timetable;
use crate::transfer::TransferGenerator;

use super::config::ScanConfig;
use super::eas::EarliestConnectionScan;
use super::error::ScanError;
use super::request::{Deadline, ScanSettings};

/// Backward multi-criteria profile scan.
///
/// `I` prunes journeys while scanning and `F` filters the final profiles.
/// `I` must never discard a journey that `F` would keep, so it should be
/// the weaker of the two; [`ProfileComparator`] and [`ParetoComparator`]
/// are such a pair.
#[derive(Debug, Clone)]
pub struct ProfiledConnectionScan<
    't,
    T,
    M = TransferMetric,
    I = ProfileComparator,
    F = ParetoComparator,
> {
    timetable: &'t Timetable<'t>,
    transfers: T,
    config: ScanConfig,
    settings: ScanSettings,
    intermediate: I,
    final_filter: F,
    metric: PhantomData<M>,
}

/// A walk into `to` that becomes usable once the sweep reaches
/// `departure_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingWalk {
    departure_time: Time,
    from: StopId,
    to: StopId,
    secs: u64,
    journey: JourneyId,
}

// `BinaryHeap` pops the greatest element, so ordering by departure time
// yields the latest walk first, matching the backward sweep.
impl Ord for PendingWalk {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.departure_time, self.from, self.to, self.journey, self.secs).cmp(&(
            other.departure_time,
            other.from,
            other.to,
            other.journey,
            other.secs,
        ))
    }
}

impl PartialOrd for PendingWalk {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The shortest walk from a stop to any target: its first hop and the
/// total walking time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TerminalWalk {
    next: StopId,
    secs: u64,
    total: u64,
}

type Terminal = HashMap<StopId, TerminalWalk>;

/// Per-invocation scan state.
struct Profiles<M, I> {
    arena: JourneyArena<M>,
    stations: HashMap<StopId, ParetoFrontier<M, I>>,
    trips: HashMap<TripId, ParetoFrontier<M, I>>,
    pending: BinaryHeap<PendingWalk>,
    footpaths: HashMap<StopId, Vec<(StopId, u64)>>,
}

impl<M: Metric, I> Profiles<M, I> {
    fn new() -> Self {
        Self {
            arena: JourneyArena::new(),
            stations: HashMap::new(),
            trips: HashMap::new(),
            pending: BinaryHeap::new(),
            footpaths: HashMap::new(),
        }
    }
}

impl<'t, T, M, I, F> ProfiledConnectionScan<'t, T, M, I, F>
where
    T: TransferGenerator,
    M: Metric,
    I: Comparator<M> + Clone,
    F: Comparator<M> + Clone,
{
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
        intermediate: I,
        final_filter: F,
    ) -> Result<Self, ScanError> {
        settings.validate(config, timetable)?;
        Ok(Self {
            timetable,
            transfers,
            config: config.clone(),
            settings,
            intermediate,
            final_filter,
            metric: PhantomData,
        })
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Pareto-optimal journeys from every departure stop, each list sorted
    /// by departure time.
    ///
    /// Every departure stop has an entry; stops that cannot reach a target
    /// map to an empty list.
    ///
    /// # Errors
    ///
    /// [`ScanError::TimedOut`] if the deadline passes first.
    pub fn calculate_journeys(&self) -> Result<HashMap<StopId, Vec<Journey<M>>>, ScanError> {
        if self.config.prune_profiles_with_earliest_arrival {
            let earliest = EarliestConnectionScan::<&T, M>::new(
                self.timetable,
                &self.transfers,
                &self.config,
                self.settings.clone(),
            )?;
            match earliest.calculate_journey() {
                Ok(_) => {}
                Err(ScanError::Unreachable) => {
                    debug!("no target reachable, skipping profile scan");
                    return Ok(self
                        .settings
                        .departure_stops
                        .iter()
                        .map(|&stop| (stop, Vec::new()))
                        .collect());
                }
                Err(err) => return Err(err),
            }
        }

        let profiles = self.scan()?;
        Ok(self.collect(&profiles))
    }

    fn scan(&self) -> Result<Profiles<M, I>, ScanError> {
        let deadline = Deadline::after(self.config.timeout());
        let terminal = self.terminal_footpaths();
        let mut profiles = Profiles::new();

        let mut enumerator = self.timetable.enumerator_from_end(self.settings.latest_arrival);
        let mut scanned = 0usize;
        let mut used = 0usize;
        while enumerator.move_previous() {
            let Some(c) = enumerator.current().cloned() else {
                break;
            };
            if c.departure_time() < self.settings.earliest_departure {
                break;
            }
            if let Err(err) = deadline.check() {
                debug!(connections = scanned, "profile scan timed out");
                return Err(err);
            }
            scanned += 1;

            self.drain_walks(&mut profiles, c.departure_time());
            if self.scan_connection(&mut profiles, &terminal, c) {
                used += 1;
            }
        }
        self.drain_walks(&mut profiles, self.settings.earliest_departure);
        self.walk_only(&mut profiles, &terminal);

        debug!(
            connections = scanned,
            used,
            stations = profiles.stations.len(),
            arena = profiles.arena.len(),
            "profile scan complete"
        );
        Ok(profiles)
    }

    /// Shortest walks to a target from every stop that has one, found by
    /// following footpaths outwards from the targets.
    fn terminal_footpaths(&self) -> Terminal {
        let mut terminal = Terminal::new();
        let mut settled = HashSet::new();
        let mut queue: BinaryHeap<Reverse<(u64, StopId)>> = self
            .settings
            .target_stops
            .iter()
            .map(|&target| Reverse((0, target)))
            .collect();

        while let Some(Reverse((total, stop))) = queue.pop() {
            if !settled.insert(stop) {
                continue;
            }
            for (previous, secs) in self
                .transfers
                .reachable_stops_within(stop, self.config.search_radius_m)
            {
                if self.settings.is_target(previous) || settled.contains(&previous) {
                    continue;
                }
                let total = total.saturating_add(secs);
                if terminal
                    .get(&previous)
                    .is_some_and(|walk: &TerminalWalk| walk.total <= total)
                {
                    continue;
                }
                terminal.insert(
                    previous,
                    TerminalWalk {
                        next: stop,
                        secs,
                        total,
                    },
                );
                queue.push(Reverse((total, previous)));
            }
        }
        terminal
    }

    /// Chain walking from `from` to its closest target, leaving at
    /// `departure`. `None` if no target is in walking range or the walk
    /// ends after the deadline.
    fn walk_to_target(
        &self,
        arena: &mut JourneyArena<M>,
        terminal: &Terminal,
        from: StopId,
        departure: Time,
    ) -> Option<JourneyId> {
        let total = terminal.get(&from)?.total;
        let arrival = departure.checked_add(total)?;
        if arrival > self.settings.latest_arrival {
            return None;
        }

        let mut hops = Vec::new();
        let mut stop = from;
        while let Some(walk) = terminal.get(&stop) {
            hops.push((stop, walk.next, walk.secs));
            stop = walk.next;
        }

        let mut time = arrival;
        let mut chain = arena.genesis(Step::Genesis { stop, time });
        for (from, to, secs) in hops.into_iter().rev() {
            time -= secs;
            chain = arena.extend(chain, Step::Transfer(Transfer::new(from, to, time, secs)));
        }
        Some(chain)
    }

    /// Offer every departure stop in walking range of a target the walk
    /// that reaches it exactly at the deadline.
    fn walk_only(&self, profiles: &mut Profiles<M, I>, terminal: &Terminal) {
        for &stop in &self.settings.departure_stops {
            let Some(departure) = terminal
                .get(&stop)
                .and_then(|walk| self.settings.latest_arrival.checked_sub(walk.total))
            else {
                continue;
            };
            if departure < self.settings.earliest_departure {
                continue;
            }
            let Some(id) = self.walk_to_target(&mut profiles.arena, terminal, stop, departure) else {
                continue;
            };
            let metric = profiles.arena.metric(id).clone();
            profiles
                .stations
                .entry(stop)
                .or_insert_with(|| ParetoFrontier::new(self.intermediate.clone()))
                .add(id, metric);
        }
    }

    /// Journeys that `c` can be prepended to. May allocate seed nodes.
    fn bases(
        &self,
        profiles: &mut Profiles<M, I>,
        terminal: &Terminal,
        c: &Connection,
    ) -> Vec<JourneyId> {
        let mut bases = Vec::new();
        let stop = c.arrival_stop();

        if let Some(frontier) = c.trip().and_then(|trip| profiles.trips.remove(&trip)) {
            bases.extend(frontier.ids().filter(|&id| {
                let head = profiles.arena.step(id);
                head.departure_stop() == stop && head.departure_time() >= c.arrival_time()
            }));
        }

        if !c.mode().can_alight() {
            return bases;
        }

        if self.settings.is_target(stop) {
            bases.push(profiles.arena.genesis(Step::Genesis {
                stop,
                time: c.arrival_time(),
            }));
        } else if let Some(walk) =
            self.walk_to_target(&mut profiles.arena, terminal, stop, c.arrival_time())
        {
            bases.push(walk);
        }

        let Some(frontier) = profiles.stations.get(&stop) else {
            return bases;
        };
        for id in frontier.ids() {
            let head = profiles.arena.step(id);
            let mut needed = c.arrival_time();
            match (c.trip(), head.trip()) {
                // Staying seated is handled through the trip frontier.
                (Some(a), Some(b)) if a == b => continue,
                (Some(_), Some(_)) => match self.transfers.transfer_time(stop, stop) {
                    Some(change) => needed += change,
                    None => continue,
                },
                _ => {}
            }
            if head.departure_time() >= needed {
                bases.push(id);
            }
        }
        bases
    }

    /// Prepend `c` to every journey it can start. Returns false if `c`
    /// leads nowhere.
    fn scan_connection(
        &self,
        profiles: &mut Profiles<M, I>,
        terminal: &Terminal,
        c: Connection,
    ) -> bool {
        if c.mode().is_cancelled() || c.arrival_time() > self.settings.latest_arrival {
            return false;
        }
        let bases = self.bases(profiles, terminal, &c);
        if bases.is_empty() {
            trace!(connection = %c, "connection reaches no target");
            return false;
        }

        let stop = c.departure_stop();
        let boardable = c.mode().can_board();
        let step = Step::Ride(c.clone());
        let mut riding = c.trip().map(|_| ParetoFrontier::new(self.intermediate.clone()));
        let mut boarded = Vec::new();

        for base in bases {
            let metric = profiles
                .arena
                .metric(base)
                .combine(profiles.arena.step(base), &step);
            let keep_riding = riding.as_ref().is_some_and(|f| !f.is_dominated(&metric));
            let keep_boarding = boardable
                && !profiles
                    .stations
                    .get(&stop)
                    .is_some_and(|f| f.is_dominated(&metric));
            if !keep_riding && !keep_boarding {
                continue;
            }

            let id = profiles.arena.extend(base, step.clone());
            if keep_riding {
                if let Some(frontier) = riding.as_mut() {
                    frontier.add(id, metric.clone());
                }
            }
            if keep_boarding {
                let frontier = profiles
                    .stations
                    .entry(stop)
                    .or_insert_with(|| ParetoFrontier::new(self.intermediate.clone()));
                if frontier.add(id, metric) {
                    boarded.push(id);
                }
            }
        }

        if let (Some(trip), Some(frontier)) = (c.trip(), riding) {
            if !frontier.is_empty() {
                profiles.trips.insert(trip, frontier);
            }
        }
        for id in boarded {
            self.schedule_walks(profiles, stop, c.departure_time(), id);
        }
        true
    }

    /// Queue walks from nearby stops into `stop`, arriving in time for
    /// `journey`, which leaves `stop` at `departure`.
    fn schedule_walks(
        &self,
        profiles: &mut Profiles<M, I>,
        stop: StopId,
        departure: Time,
        journey: JourneyId,
    ) {
        let radius = self.config.search_radius_m;
        let footpaths = profiles
            .footpaths
            .entry(stop)
            .or_insert_with(|| self.transfers.reachable_stops_within(stop, radius));

        for &(from, secs) in footpaths.iter() {
            let Some(walk) = Transfer::arriving(from, stop, departure, secs) else {
                continue;
            };
            if walk.departure_time < self.settings.earliest_departure {
                continue;
            }
            profiles.pending.push(PendingWalk {
                departure_time: walk.departure_time,
                from,
                to: stop,
                secs,
                journey,
            });
        }
    }

    /// Insert every queued walk departing at or after `time`, latest first,
    /// queueing the walks into each stop that gains a journey.
    fn drain_walks(&self, profiles: &mut Profiles<M, I>, time: Time) {
        while profiles
            .pending
            .peek()
            .is_some_and(|walk| walk.departure_time >= time)
        {
            let Some(walk) = profiles.pending.pop() else {
                break;
            };
            let step = Step::Transfer(Transfer::new(walk.from, walk.to, walk.departure_time, walk.secs));
            let metric = profiles
                .arena
                .metric(walk.journey)
                .combine(profiles.arena.step(walk.journey), &step);

            let frontier = profiles
                .stations
                .entry(walk.from)
                .or_insert_with(|| ParetoFrontier::new(self.intermediate.clone()));
            if frontier.is_dominated(&metric) {
                continue;
            }
            let id = profiles.arena.extend(walk.journey, step);
            if frontier.add(id, metric) {
                self.schedule_walks(profiles, walk.from, walk.departure_time, id);
            }
        }
    }

    fn collect(&self, profiles: &Profiles<M, I>) -> HashMap<StopId, Vec<Journey<M>>> {
        self.settings
            .departure_stops
            .iter()
            .map(|&stop| {
                let mut filter = ParetoFrontier::new(self.final_filter.clone());
                if let Some(frontier) = profiles.stations.get(&stop) {
                    for (id, metric) in frontier.iter() {
                        filter.add(*id, metric.clone());
                    }
                }
                let mut journeys: Vec<Journey<M>> =
                    filter.ids().map(|id| profiles.arena.to_journey(id)).collect();
                journeys.sort_by_key(|j| (j.departure_time(), j.arrival_time()));
                (stop, journeys)
            })
            .collect()
    }
}
