//! Time cursors over sealed stores.

use crate::domain::{Connection, Time};

use super::window_index::WindowIndex;

/// A bidirectional cursor over connections in departure time order.
///
/// After a seek the cursor sits between two connections and has no
/// current element; `move_next`/`move_previous` step onto one. A cursor is
/// meant to be walked in one direction after each seek.
pub trait ConnectionEnumerator {
    /// Position so that `move_next` yields the first connection departing
    /// at or after `time`.
    fn seek_forward(&mut self, time: Time);

    /// Position so that `move_previous` yields the last connection departing
    /// at or before `time`.
    fn seek_backward(&mut self, time: Time);

    /// Step to the next connection. Returns false once exhausted.
    fn move_next(&mut self) -> bool;

    /// Step to the previous connection. Returns false once exhausted.
    fn move_previous(&mut self) -> bool;

    /// The connection under the cursor, if any.
    fn current(&self) -> Option<&Connection>;
}

impl<E: ConnectionEnumerator + ?Sized> ConnectionEnumerator for Box<E> {
    fn seek_forward(&mut self, time: Time) {
        (**self).seek_forward(time)
    }

    fn seek_backward(&mut self, time: Time) {
        (**self).seek_backward(time)
    }

    fn move_next(&mut self) -> bool {
        (**self).move_next()
    }

    fn move_previous(&mut self) -> bool {
        (**self).move_previous()
    }

    fn current(&self) -> Option<&Connection> {
        (**self).current()
    }
}

/// Cursor over one sealed [`ConnectionStore`](super::ConnectionStore).
///
/// Seeks use the store's window index to bound the binary search.
#[derive(Debug, Clone)]
pub struct StoreEnumerator<'a> {
    connections: &'a [Connection],
    index: &'a WindowIndex,
    /// Index of the current connection; `-1` and `len` are the two ends.
    position: isize,
}

impl<'a> StoreEnumerator<'a> {
    pub(crate) fn new(connections: &'a [Connection], index: &'a WindowIndex) -> Self {
        Self {
            connections,
            index,
            position: -1,
        }
    }

    fn len(&self) -> isize {
        self.connections.len() as isize
    }
}

impl ConnectionEnumerator for StoreEnumerator<'_> {
    fn seek_forward(&mut self, time: Time) {
        self.position = self.index.lower_bound(self.connections, time) as isize - 1;
    }

    fn seek_backward(&mut self, time: Time) {
        self.position = self.index.upper_bound(self.connections, time) as isize;
    }

    fn move_next(&mut self) -> bool {
        if self.position < self.len() {
            self.position += 1;
        }
        self.position < self.len()
    }

    fn move_previous(&mut self) -> bool {
        if self.position >= 0 {
            self.position -= 1;
        }
        self.position >= 0
    }

    fn current(&self) -> Option<&Connection> {
        usize::try_from(self.position)
            .ok()
            .and_then(|i| self.connections.get(i))
    }
}

/// Cursor over nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyEnumerator;

impl ConnectionEnumerator for EmptyEnumerator {
    fn seek_forward(&mut self, _time: Time) {}

    fn seek_backward(&mut self, _time: Time) {}

    fn move_next(&mut self) -> bool {
        false
    }

    fn move_previous(&mut self) -> bool {
        false
    }

    fn current(&self) -> Option<&Connection> {
        None
    }
}
