//! K-way merge of connection cursors.
//!
//! N enumerators are combined into a balanced binary tree of
//! [`MergeEnumerator`] nodes. Each node holds one pending connection per
//! child and exposes the earlier one when moving forward (the later one when
//! moving backward). An exhausted child simply stops competing; its
//! sibling carries on alone.

use crate::domain::{Connection, Time};

use super::enumerator::{ConnectionEnumerator, EmptyEnumerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Binary merge node over two cursors.
pub struct MergeEnumerator<'a> {
    left: Box<dyn ConnectionEnumerator + 'a>,
    right: Box<dyn ConnectionEnumerator + 'a>,
    /// Direction the children are primed for; `None` right after a seek.
    primed: Option<Direction>,
    left_live: bool,
    right_live: bool,
    current: Option<Side>,
}

impl<'a> MergeEnumerator<'a> {
    pub fn new(
        left: Box<dyn ConnectionEnumerator + 'a>,
        right: Box<dyn ConnectionEnumerator + 'a>,
    ) -> Self {
        Self {
            left,
            right,
            primed: None,
            left_live: false,
            right_live: false,
            current: None,
        }
    }

    fn key(&self, side: Side) -> Option<Time> {
        let (live, child) = match side {
            Side::Left => (self.left_live, &self.left),
            Side::Right => (self.right_live, &self.right),
        };
        if live {
            child.current().map(|c| c.departure_time())
        } else {
            None
        }
    }

    /// Pick the child holding the globally next connection.
    ///
    /// Forward ties go left and backward ties go right, so walking backward
    /// visits exactly the reverse of the forward order.
    fn select(&mut self, direction: Direction) -> bool {
        // Exhausted children compare as the sentinel of their direction
        let sentinel = match direction {
            Direction::Forward => Time::MAX,
            Direction::Backward => Time::MIN,
        };
        let left = self.key(Side::Left);
        let right = self.key(Side::Right);

        self.current = if left.is_none() && right.is_none() {
            None
        } else {
            let l = left.unwrap_or(sentinel);
            let r = right.unwrap_or(sentinel);
            let take_left = match direction {
                Direction::Forward => l < r || (l == r && left.is_some()),
                Direction::Backward => l > r || (l == r && right.is_none()),
            };
            Some(if take_left { Side::Left } else { Side::Right })
        };
        self.current.is_some()
    }

    fn step(&mut self, direction: Direction) -> bool {
        match self.primed {
            Some(primed) if primed == direction => {
                let advance = |child: &mut Box<dyn ConnectionEnumerator + 'a>| match direction {
                    Direction::Forward => child.move_next(),
                    Direction::Backward => child.move_previous(),
                };
                match self.current {
                    Some(Side::Left) => self.left_live = advance(&mut self.left),
                    Some(Side::Right) => self.right_live = advance(&mut self.right),
                    None => return false,
                }
            }
            Some(_) => {
                // Changing direction without a seek: resume strictly beyond
                // the current departure time.
                let Some(time) = self.current().map(|c| c.departure_time()) else {
                    return false;
                };
                match direction {
                    Direction::Forward => match time.checked_add(1) {
                        Some(t) => self.seek_forward(t),
                        None => return false,
                    },
                    Direction::Backward => match time.checked_sub(1) {
                        Some(t) => self.seek_backward(t),
                        None => return false,
                    },
                }
                return self.step(direction);
            }
            None => {
                let (l, r) = match direction {
                    Direction::Forward => (self.left.move_next(), self.right.move_next()),
                    Direction::Backward => (self.left.move_previous(), self.right.move_previous()),
                };
                self.left_live = l;
                self.right_live = r;
                self.primed = Some(direction);
            }
        }
        self.select(direction)
    }

    fn reset(&mut self) {
        self.primed = None;
        self.left_live = false;
        self.right_live = false;
        self.current = None;
    }
}

impl ConnectionEnumerator for MergeEnumerator<'_> {
    fn seek_forward(&mut self, time: Time) {
        self.left.seek_forward(time);
        self.right.seek_forward(time);
        self.reset();
    }

    fn seek_backward(&mut self, time: Time) {
        self.left.seek_backward(time);
        self.right.seek_backward(time);
        self.reset();
    }

    fn move_next(&mut self) -> bool {
        self.step(Direction::Forward)
    }

    fn move_previous(&mut self) -> bool {
        self.step(Direction::Backward)
    }

    fn current(&self) -> Option<&Connection> {
        match self.current? {
            Side::Left => self.left.current(),
            Side::Right => self.right.current(),
        }
    }
}

/// Merge any number of cursors into one globally time-ordered cursor.
///
/// The tree is balanced, so every connection passes through
/// `O(log n)` comparisons. Zero inputs give an empty cursor and a single
/// input is returned unchanged.
pub fn merge_all<'a>(
    mut enumerators: Vec<Box<dyn ConnectionEnumerator + 'a>>,
) -> Box<dyn ConnectionEnumerator + 'a> {
    match enumerators.len() {
        0 => Box::new(EmptyEnumerator),
        1 => enumerators.remove(0),
        n => {
            let right = enumerators.split_off(n / 2);
            Box::new(MergeEnumerator::new(merge_all(enumerators), merge_all(right)))
        }
    }
}
