//! Journeys and their evaluation.
//!
//! During a scan, journeys are persistent singly-linked chains stored in a
//! per-scan [`JourneyArena`]: extending a journey never copies it, and many
//! candidate journeys share their common suffix. Finished journeys are
//! materialised into an owned [`Journey`] for callers.
//!
//! Every journey carries a [`Metric`]; [`Comparator`]s decide dominance
//! between metrics and [`ParetoFrontier`]s keep the non-dominated ones.

mod arena;
mod comparator;
mod frontier;
mod journey;
mod metric;
mod step;

pub use arena::{JourneyArena, JourneyId};
pub use comparator::{Comparator, Dominance, ParetoComparator, ProfileComparator, pareto};
pub use frontier::ParetoFrontier;
pub use journey::Journey;
pub use metric::{Metric, TransferMetric, TravelTime};
pub use step::{Step, Transfer};
