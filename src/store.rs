//! External collaborators: per-user balances and the durable results ledger.

use core::fmt;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::identity::UserId;

/// A durable write of a finished match failed.
#[derive(Debug)]
pub struct LedgerError(pub String);

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ledger write failed: {}", self.0)
    }
}

impl std::error::Error for LedgerError {}

/// Per-user currency balance. Each update is an atomic read-modify-write;
/// the store serializes concurrent mutations of one user's balance.
pub trait BalanceStore: Send + Sync {
    fn balance(&self, user: UserId) -> i64;

    /// Atomic add. The core always pre-checks funds, so a negative balance
    /// only occurs if a caller skips the check.
    fn update(&self, user: UserId, delta: i64);
}

/// Durable record of finished matches. Best effort: failures are logged by
/// the caller, never retried and never surfaced to players.
pub trait GameLedger: Send + Sync {
    fn record_result(&self, winner: UserId, loser: UserId) -> Result<(), LedgerError>;
}

/// In-memory store backing tests and the simulator.
#[derive(Debug, Default)]
pub struct MemoryStore {
    balances: Mutex<HashMap<UserId, i64>>,
    results: Mutex<Vec<(UserId, UserId)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, user: UserId, amount: i64) {
        self.balances.lock().unwrap().insert(user, amount);
    }

    /// Recorded (winner, loser) pairs, oldest first.
    pub fn results(&self) -> Vec<(UserId, UserId)> {
        self.results.lock().unwrap().clone()
    }
}

impl BalanceStore for MemoryStore {
    fn balance(&self, user: UserId) -> i64 {
        *self.balances.lock().unwrap().get(&user).unwrap_or(&0)
    }

    fn update(&self, user: UserId, delta: i64) {
        *self.balances.lock().unwrap().entry(user).or_insert(0) += delta;
    }
}

impl GameLedger for MemoryStore {
    fn record_result(&self, winner: UserId, loser: UserId) -> Result<(), LedgerError> {
        self.results.lock().unwrap().push((winner, loser));
        Ok(())
    }
}
