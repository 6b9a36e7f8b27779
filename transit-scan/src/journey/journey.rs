//! Finished journeys handed back to callers.

use std::fmt;
use std::fmt::Write as _;

use crate::domain::{Connection, StopId, Time, format_clock, format_duration};
use crate::stops::StopReader;

use super::metric::Metric;
use super::step::Step;

/// An owned journey: its steps in travel order plus its metric.
///
/// # Invariants
///
/// `steps` is never empty. Consecutive steps meet at the same stop and
/// never overlap in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey<M> {
    steps: Vec<Step>,
    metric: M,
}

impl<M: Metric> Journey<M> {
    pub(crate) fn from_parts(steps: Vec<Step>, metric: M) -> Self {
        debug_assert!(!steps.is_empty(), "journey without steps");
        Self { steps, metric }
    }

    /// All steps, including the leading or trailing stay at a stop.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the metric of the whole journey.
    pub fn metric(&self) -> &M {
        &self.metric
    }

    fn first(&self) -> &Step {
        &self.steps[0]
    }

    fn last(&self) -> &Step {
        &self.steps[self.steps.len() - 1]
    }

    /// Returns the stop the journey starts at.
    pub fn departure_stop(&self) -> StopId {
        self.first().departure_stop()
    }

    /// Returns the stop the journey ends at.
    pub fn arrival_stop(&self) -> StopId {
        self.last().arrival_stop()
    }

    /// Returns the moment the traveller leaves the first stop.
    pub fn departure_time(&self) -> Time {
        self.first().departure_time()
    }

    /// Returns the moment the traveller reaches the last stop.
    pub fn arrival_time(&self) -> Time {
        self.last().arrival_time()
    }

    /// Returns the time from departure to arrival, in seconds.
    pub fn travel_time(&self) -> u64 {
        self.arrival_time() - self.departure_time()
    }

    /// The connections ridden, in travel order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.steps.iter().filter_map(Step::as_connection)
    }

    /// Steps that move the traveller, skipping the stay at a stop.
    pub fn legs(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| !s.is_genesis())
    }

    /// Human-readable itinerary, one line per leg.
    pub fn render(&self, stops: &impl StopReader) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} {} -> {} {} ({})",
            format_clock(self.departure_time()),
            stops.display_name(self.departure_stop()),
            format_clock(self.arrival_time()),
            stops.display_name(self.arrival_stop()),
            format_duration(self.travel_time()),
        );
        for step in self.legs() {
            let from = stops.display_name(step.departure_stop());
            let to = stops.display_name(step.arrival_stop());
            let dep = format_clock(step.departure_time());
            let arr = format_clock(step.arrival_time());
            let _ = match step {
                Step::Ride(c) => match c.trip() {
                    Some(trip) => writeln!(out, "  {dep} {from} -> {arr} {to} [{trip}]"),
                    None => writeln!(out, "  {dep} {from} -> {arr} {to} [walk]"),
                },
                Step::Transfer(_) => writeln!(
                    out,
                    "  {dep} {from} ~> {arr} {to} (transfer {})",
                    format_duration(step.walking_secs())
                ),
                Step::Genesis { .. } => Ok(()),
            };
        }
        out
    }
}

impl<M: Metric> fmt::Display for Journey<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} -> {}@{}",
            self.departure_stop(),
            format_clock(self.departure_time()),
            self.arrival_stop(),
            format_clock(self.arrival_time())
        )?;
        let legs = self.legs().count();
        write!(f, " ({legs} legs)")
    }
}
