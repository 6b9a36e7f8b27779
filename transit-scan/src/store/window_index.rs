//! Coarse time-bucket index over a sorted connection slice.
//!
//! Bucket `k` covers departures in `[origin + k * window, origin + (k + 1) * window)`.
//! Only buckets holding at least one connection are stored, each with the
//! index of its first connection, so the index grows with the number of
//! connections rather than with the time span. A seek finds its bucket and
//! then only has to binary search inside it.

use crate::domain::{Connection, Time};

/// Sparse fixed-size time buckets over connections sorted by departure time.
#[derive(Debug, Clone, Default)]
pub struct WindowIndex {
    origin: Time,
    window_secs: u64,
    /// `(bucket, first connection index)`, ascending in both.
    starts: Vec<(u64, usize)>,
}

impl WindowIndex {
    /// Build the index. `connections` must be sorted by departure time.
    pub fn build(connections: &[Connection], window_secs: u64) -> Self {
        let window_secs = window_secs.max(1);
        let origin = connections.first().map_or(0, Connection::departure_time);

        let mut starts: Vec<(u64, usize)> = Vec::new();
        for (idx, c) in connections.iter().enumerate() {
            let bucket = (c.departure_time() - origin) / window_secs;
            if starts.last().is_none_or(|&(last, _)| last != bucket) {
                starts.push((bucket, idx));
            }
        }

        Self {
            origin,
            window_secs,
            starts,
        }
    }

    /// Returns the bucket width in seconds.
    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }

    /// Returns the number of non-empty buckets.
    pub fn bucket_count(&self) -> usize {
        self.starts.len()
    }

    /// Index of the first connection departing at or after `time`.
    pub fn lower_bound(&self, connections: &[Connection], time: Time) -> usize {
        if self.starts.is_empty() || time <= self.origin {
            return 0;
        }

        let bucket = (time - self.origin) / self.window_secs;
        let at = self.starts.partition_point(|&(b, _)| b < bucket);
        let Some(&(found, lo)) = self.starts.get(at) else {
            return connections.len();
        };
        if found > bucket {
            // Every connection of a later bucket departs after `time`.
            return lo;
        }

        let hi = self
            .starts
            .get(at + 1)
            .map_or(connections.len(), |&(_, start)| start);
        lo + connections[lo..hi].partition_point(|c| c.departure_time() < time)
    }

    /// Index of the first connection departing strictly after `time`.
    pub fn upper_bound(&self, connections: &[Connection], time: Time) -> usize {
        match time.checked_add(1) {
            Some(next) => self.lower_bound(connections, next),
            None => connections.len(),
        }
    }
}
