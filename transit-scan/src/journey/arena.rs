//! Arena of persistent journey chains.

use std::fmt;

use super::journey::Journey;
use super::metric::Metric;
use super::step::Step;

/// Handle to a journey node in a [`JourneyArena`].
///
/// Only meaningful for the arena that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JourneyId(usize);

impl fmt::Debug for JourneyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JourneyId({})", self.0)
    }
}

#[derive(Debug, Clone)]
struct Node<M> {
    previous: Option<JourneyId>,
    step: Step,
    metric: M,
}

/// Append-only storage for journey chains.
///
/// Each node holds one step, the metric of the chain ending at it, and a
/// link to the node it extends. Extending never copies, so chains share
/// their common tails and every [`JourneyId`] stays valid for the arena's
/// lifetime.
///
/// # Examples
///
/// ```
/// use transit_scan::domain::StopId;
/// use transit_scan::journey::{JourneyArena, Step, Transfer, TravelTime};
///
/// let mut arena = JourneyArena::<TravelTime>::new();
/// let start = arena.genesis(Step::Genesis { stop: StopId(0), time: 100 });
/// let walked = arena.extend(start, Step::Transfer(Transfer::new(StopId(0), StopId(1), 100, 60)));
///
/// assert_eq!(arena.metric(walked).travel_time(), 60);
/// assert_eq!(arena.chain_len(walked), 2);
/// ```
#[derive(Debug, Clone)]
pub struct JourneyArena<M> {
    nodes: Vec<Node<M>>,
}

impl<M: Metric> Default for JourneyArena<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Metric> JourneyArena<M> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, node: Node<M>) -> JourneyId {
        let id = JourneyId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn node(&self, id: JourneyId) -> &Node<M> {
        &self.nodes[id.0]
    }

    /// Starts a new chain with a single step.
    pub fn genesis(&mut self, step: Step) -> JourneyId {
        let metric = M::initial(&step);
        self.push(Node {
            previous: None,
            step,
            metric,
        })
    }

    /// Extends the chain ending at `previous` with `step`.
    pub fn extend(&mut self, previous: JourneyId, step: Step) -> JourneyId {
        let head = self.node(previous);
        let metric = head.metric.combine(&head.step, &step);
        self.push(Node {
            previous: Some(previous),
            step,
            metric,
        })
    }

    /// The step at the head of the chain.
    pub fn step(&self, id: JourneyId) -> &Step {
        &self.node(id).step
    }

    /// The metric of the whole chain ending at `id`.
    pub fn metric(&self, id: JourneyId) -> &M {
        &self.node(id).metric
    }

    /// Returns the node that `id` extends, or `None` for a chain start.
    pub fn previous(&self, id: JourneyId) -> Option<JourneyId> {
        self.node(id).previous
    }

    /// Steps of the chain, starting at `id` and following predecessor links.
    pub fn steps(&self, id: JourneyId) -> impl Iterator<Item = &Step> + '_ {
        std::iter::successors(Some(id), |&id| self.previous(id)).map(|id| self.step(id))
    }

    /// Returns the number of steps in the chain ending at `id`.
    pub fn chain_len(&self, id: JourneyId) -> usize {
        self.steps(id).count()
    }

    /// Builds a new chain holding the same steps in the opposite order.
    ///
    /// The metric is recomputed by replaying the steps, so reversing twice
    /// gives back the original steps and metric.
    pub fn reverse(&mut self, id: JourneyId) -> JourneyId {
        let steps: Vec<Step> = self.steps(id).cloned().collect();
        let mut steps = steps.into_iter();
        // A chain always has at least its own head step.
        let Some(first) = steps.next() else {
            return id;
        };
        let mut reversed = self.genesis(first);
        for step in steps {
            reversed = self.extend(reversed, step);
        }
        reversed
    }

    /// Copies the chain at `id` out of the arena, in chain order.
    pub fn to_journey(&self, id: JourneyId) -> Journey<M> {
        Journey::from_parts(self.steps(id).cloned().collect(), self.metric(id).clone())
    }

    /// Returns the number of nodes allocated so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
