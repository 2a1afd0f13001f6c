//! Shared result and error types for the game engines.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Result of a resolved shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShotOutcome {
    /// The target cell held a ship segment.
    Hit,
    /// The target cell was open water.
    Miss,
}

/// Errors returned by manual ship placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// The ship would extend past the board edge.
    OutOfBounds,
    /// The ship would cover a cell that is already occupied.
    Overlap,
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::OutOfBounds => write!(f, "ship placement is out of bounds"),
            BoardError::Overlap => write!(f, "ship placement overlaps another ship"),
        }
    }
}

/// Why a blackjack wager was refused. The only player-visible error in the
/// core; everything else illegal is absorbed as a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WagerError {
    /// Balance is lower than the requested bet.
    InsufficientFunds,
    /// Balance cannot cover the second stake of a double down.
    CannotCoverDouble,
}

impl fmt::Display for WagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WagerError::InsufficientFunds => write!(f, "insufficient funds"),
            WagerError::CannotCoverDouble => write!(f, "insufficient funds to double down"),
        }
    }
}
