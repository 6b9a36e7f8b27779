//! Pareto frontier of journeys.

use super::arena::JourneyId;
use super::comparator::{Comparator, Dominance};

/// A set of mutually non-dominated journeys under a comparator.
///
/// # Invariants
///
/// No member dominates or equals another member.
#[derive(Debug, Clone)]
pub struct ParetoFrontier<M, C> {
    members: Vec<(JourneyId, M)>,
    comparator: C,
}

impl<M, C: Comparator<M>> ParetoFrontier<M, C> {
    pub fn new(comparator: C) -> Self {
        Self {
            members: Vec::new(),
            comparator,
        }
    }

    /// Offers a journey to the frontier.
    ///
    /// Returns `false` and leaves the frontier untouched if some member is at
    /// least as good as `metric`. Otherwise removes every member that
    /// `metric` dominates, inserts the journey and returns `true`.
    pub fn add(&mut self, id: JourneyId, metric: M) -> bool {
        let rejected = self.members.iter().any(|(_, existing)| {
            matches!(
                self.comparator.dominates(existing, &metric),
                Dominance::FirstBetter | Dominance::Equal
            )
        });
        if rejected {
            return false;
        }

        let comparator = &self.comparator;
        self.members
            .retain(|(_, existing)| comparator.dominates(&metric, existing) != Dominance::FirstBetter);
        self.members.push((id, metric));
        true
    }

    /// Whether some member is at least as good as `metric`.
    pub fn is_dominated(&self, metric: &M) -> bool {
        self.members.iter().any(|(_, existing)| {
            matches!(
                self.comparator.dominates(existing, metric),
                Dominance::FirstBetter | Dominance::Equal
            )
        })
    }

    pub fn members(&self) -> &[(JourneyId, M)] {
        &self.members
    }

    pub fn iter(&self) -> impl Iterator<Item = &(JourneyId, M)> {
        self.members.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = JourneyId> + '_ {
        self.members.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopId;
    use crate::journey::{JourneyArena, Metric, ParetoComparator, Step, Transfer, TravelTime};

    fn walk(arena: &mut JourneyArena<TravelTime>, dep: u64, secs: u64) -> (JourneyId, TravelTime) {
        let id = arena.genesis(Step::Transfer(Transfer::new(StopId(0), StopId(1), dep, secs)));
        (id, *arena.metric(id))
    }

    #[test]
    fn keeps_only_best() {
        let mut arena = JourneyArena::new();
        let mut frontier = ParetoFrontier::new(ParetoComparator);

        let (slow, m) = walk(&mut arena, 0, 100);
        assert!(frontier.add(slow, m));

        let (fast, m) = walk(&mut arena, 0, 50);
        assert!(frontier.add(fast, m));
        assert_eq!(frontier.ids().collect::<Vec<_>>(), vec![fast]);

        let (slower, m) = walk(&mut arena, 0, 70);
        assert!(!frontier.add(slower, m));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn rejects_equal() {
        let mut arena = JourneyArena::new();
        let mut frontier = ParetoFrontier::new(ParetoComparator);

        let (a, m) = walk(&mut arena, 0, 100);
        assert!(frontier.add(a, m));
        let (b, m) = walk(&mut arena, 500, 100);
        assert!(frontier.is_dominated(&m));
        assert!(!frontier.add(b, m));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn empty() {
        let frontier: ParetoFrontier<TravelTime, ParetoComparator> =
            ParetoFrontier::new(ParetoComparator);
        assert!(frontier.is_empty());
        let m = TravelTime::initial(&Step::Genesis { stop: StopId(0), time: 0 });
        assert!(!frontier.is_dominated(&m));
    }
}
