//! Dominance between journey metrics.
//!
//! Scans use two tiers of comparator: a permissive one while scanning, so
//! that candidates useful for *later* departures are not discarded, and a
//! stricter one to prune the final answer.

use super::metric::{TransferMetric, TravelTime};

/// Outcome of comparing two metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// The first argument is at least as good everywhere and better somewhere.
    FirstBetter,
    /// The second argument is at least as good everywhere and better somewhere.
    SecondBetter,
    /// Both are equal on every criterion.
    Equal,
    /// Each is better on some criterion.
    Incomparable,
}

impl Dominance {
    /// Swaps the roles of the two arguments.
    pub fn flip(self) -> Self {
        match self {
            Dominance::FirstBetter => Dominance::SecondBetter,
            Dominance::SecondBetter => Dominance::FirstBetter,
            other => other,
        }
    }
}

/// Pareto comparison of two criterion vectors where lower is better.
///
/// # Examples
///
/// ```
/// use transit_scan::journey::{pareto, Dominance};
///
/// assert_eq!(pareto(&[1, 2], &[1, 3]), Dominance::FirstBetter);
/// assert_eq!(pareto(&[1, 3], &[2, 1]), Dominance::Incomparable);
/// assert_eq!(pareto(&[4], &[4]), Dominance::Equal);
/// ```
pub fn pareto(a: &[i64], b: &[i64]) -> Dominance {
    debug_assert_eq!(a.len(), b.len());
    let mut a_better = false;
    let mut b_better = false;
    for (x, y) in a.iter().zip(b) {
        a_better |= x < y;
        b_better |= y < x;
    }
    match (a_better, b_better) {
        (false, false) => Dominance::Equal,
        (true, false) => Dominance::FirstBetter,
        (false, true) => Dominance::SecondBetter,
        (true, true) => Dominance::Incomparable,
    }
}

fn signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Decides dominance between two metrics.
pub trait Comparator<M> {
    fn dominates(&self, a: &M, b: &M) -> Dominance;
}

/// Intermediate comparator for profile scans.
///
/// Prefers later departure, earlier arrival and (where the metric tracks
/// them) fewer transfers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileComparator;

/// Final comparator: shorter travel time and (where tracked) fewer
/// transfers, regardless of when the journey departs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParetoComparator;

impl Comparator<TransferMetric> for ProfileComparator {
    fn dominates(&self, a: &TransferMetric, b: &TransferMetric) -> Dominance {
        pareto(
            &[
                -signed(a.departure_time()),
                signed(a.arrival_time()),
                i64::from(a.transfers()),
            ],
            &[
                -signed(b.departure_time()),
                signed(b.arrival_time()),
                i64::from(b.transfers()),
            ],
        )
    }
}

impl Comparator<TravelTime> for ProfileComparator {
    fn dominates(&self, a: &TravelTime, b: &TravelTime) -> Dominance {
        pareto(
            &[-signed(a.departure_time()), signed(a.arrival_time())],
            &[-signed(b.departure_time()), signed(b.arrival_time())],
        )
    }
}

impl Comparator<TransferMetric> for ParetoComparator {
    fn dominates(&self, a: &TransferMetric, b: &TransferMetric) -> Dominance {
        pareto(
            &[signed(a.travel_time()), i64::from(a.transfers())],
            &[signed(b.travel_time()), i64::from(b.transfers())],
        )
    }
}

impl Comparator<TravelTime> for ParetoComparator {
    fn dominates(&self, a: &TravelTime, b: &TravelTime) -> Dominance {
        pareto(&[signed(a.travel_time())], &[signed(b.travel_time())])
    }
}
