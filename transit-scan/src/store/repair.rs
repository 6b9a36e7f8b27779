//! Same-departure trip repair.
//!
//! Zero-dwell stops produce several legs of one trip that share a departure
//! time. A stable sort keeps them in insertion order, which may not be the
//! order the vehicle drives them. For every such group the legs are
//! reordered by following arrival stop → departure stop inside the trip.
//! Groups whose legs do not form exactly one chain are left untouched.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::{Connection, TripId};

/// Outcome of a repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    /// Groups whose order was changed.
    pub repaired: usize,
    /// Groups that could not be resolved and kept their order.
    pub unresolved: usize,
}

/// Repair trip order inside runs of equal departure time.
///
/// `connections` must already be sorted by departure time.
pub(crate) fn repair_same_departure_trips(connections: &mut [Connection]) -> RepairStats {
    let mut stats = RepairStats::default();
    let mut start = 0;

    while start < connections.len() {
        let time = connections[start].departure_time();
        let end = start
            + connections[start..]
                .iter()
                .take_while(|c| c.departure_time() == time)
                .count();

        if end - start > 1 {
            repair_run(&mut connections[start..end], &mut stats);
        }
        start = end;
    }

    stats
}

/// Repair one run of connections sharing a departure time.
fn repair_run(run: &mut [Connection], stats: &mut RepairStats) {
    let mut by_trip: HashMap<TripId, Vec<usize>> = HashMap::new();
    for (pos, c) in run.iter().enumerate() {
        if let Some(trip) = c.trip() {
            by_trip.entry(trip).or_default().push(pos);
        }
    }

    let mut groups: Vec<(TripId, Vec<usize>)> =
        by_trip.into_iter().filter(|(_, p)| p.len() > 1).collect();
    // HashMap order is arbitrary; keep logging deterministic
    groups.sort_by_key(|(_, positions)| positions[0]);

    for (trip, positions) in groups {
        let members: Vec<&Connection> = positions.iter().map(|&p| &run[p]).collect();

        let Some(order) = chain_order(&members) else {
            warn!(
                trip = %trip,
                departure_time = run[positions[0]].departure_time(),
                legs = positions.len(),
                "cannot resolve same-departure trip chain, keeping original order"
            );
            stats.unresolved += 1;
            continue;
        };

        if order.iter().enumerate().all(|(i, &j)| i == j) {
            continue;
        }

        let reordered: Vec<Connection> = order.iter().map(|&i| members[i].clone()).collect();
        for (&pos, c) in positions.iter().zip(reordered) {
            run[pos] = c;
        }
        stats.repaired += 1;
    }
}

/// Order the legs of one trip so that each arrives where the next departs.
///
/// Returns indices into `legs`, or `None` if the legs do not form a single
/// unambiguous chain (branching, a cycle, or a gap).
fn chain_order(legs: &[&Connection]) -> Option<Vec<usize>> {
    let n = legs.len();
    let mut next: Vec<Option<usize>> = vec![None; n];
    let mut has_pred = vec![false; n];

    for i in 0..n {
        for j in 0..n {
            if i == j || legs[j].departure_stop() != legs[i].arrival_stop() {
                continue;
            }
            if next[i].is_some() || has_pred[j] {
                return None;
            }
            next[i] = Some(j);
            has_pred[j] = true;
        }
    }

    let mut heads = (0..n).filter(|&i| !has_pred[i]);
    let head = heads.next()?;
    if heads.next().is_some() {
        return None;
    }

    let mut order = Vec::with_capacity(n);
    let mut cursor = Some(head);
    while let Some(i) = cursor {
        order.push(i);
        cursor = next[i];
    }

    (order.len() == n).then_some(order)
}
