//! FIFO pairing queue for Battleship.

use std::collections::VecDeque;

use crate::identity::{ConnId, Identity};

/// Waiting players, oldest first. Holds at most one entry per connection;
/// the registry keeps players with a live match out of the queue entirely.
#[derive(Debug, Default)]
pub struct MatchQueue {
    waiting: VecDeque<Identity>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless the connection is already waiting. Returns whether the
    /// identity was added.
    pub fn enqueue(&mut self, identity: Identity) -> bool {
        if self.contains(identity.conn) {
            return false;
        }
        self.waiting.push_back(identity);
        true
    }

    /// The two oldest waiting players, in queue order, once at least two are
    /// waiting. Pairing happens as soon as possible; there is no lobby or
    /// confirmation step.
    pub fn pop_pair(&mut self) -> Option<(Identity, Identity)> {
        if self.waiting.len() < 2 {
            return None;
        }
        let first = self.waiting.pop_front()?;
        let second = self.waiting.pop_front()?;
        Some((first, second))
    }

    /// Drop a waiting entry, e.g. on disconnect. Returns whether an entry was
    /// removed.
    pub fn remove(&mut self, conn: ConnId) -> bool {
        let before = self.waiting.len();
        self.waiting.retain(|p| p.conn != conn);
        self.waiting.len() != before
    }

    pub fn contains(&self, conn: ConnId) -> bool {
        self.waiting.iter().any(|p| p.conn == conn)
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}
