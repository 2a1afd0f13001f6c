//! Battleship board state and random fleet placement.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::common::{BoardError, ShotOutcome};
use crate::config::{BOARD_SIZE, FLEET};

/// One cell of a board. Occupied cells never revert to `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Ship,
    Hit,
}

/// A 10×10 board owned by a single participant. Never shared between
/// sessions; the opponent only ever learns about it through shot results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    grid: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// An empty board with no ships placed.
    pub fn empty() -> Self {
        Board {
            grid: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Generate a board with the full fleet placed at random.
    ///
    /// Each ship samples a fresh orientation and origin until a legal spot
    /// turns up. Occupancy never exceeds 20 of 100 cells, so the rejection
    /// loop terminates quickly in practice. Ships may touch; only overlap is
    /// illegal.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut board = Board::empty();
        for len in FLEET {
            loop {
                let horizontal = rng.random();
                let row = rng.random_range(0..BOARD_SIZE);
                let col = rng.random_range(0..BOARD_SIZE);
                if board.place_ship(row, col, len, horizontal).is_ok() {
                    break;
                }
            }
        }
        board
    }

    /// Place one straight ship with its bow at (`row`, `col`). Random
    /// generation goes through the same checks; tests use this to build
    /// known layouts.
    pub fn place_ship(
        &mut self,
        row: usize,
        col: usize,
        len: usize,
        horizontal: bool,
    ) -> Result<(), BoardError> {
        let (dr, dc) = if horizontal { (0, 1) } else { (1, 0) };
        if row + dr * len.saturating_sub(1) >= BOARD_SIZE
            || col + dc * len.saturating_sub(1) >= BOARD_SIZE
        {
            return Err(BoardError::OutOfBounds);
        }
        for i in 0..len {
            if self.grid[row + dr * i][col + dc * i] != Cell::Empty {
                return Err(BoardError::Overlap);
            }
        }
        for i in 0..len {
            self.grid[row + dr * i][col + dc * i] = Cell::Ship;
        }
        Ok(())
    }

    /// Resolve a shot at (`row`, `col`): a ship segment becomes `Hit`, open
    /// water stays untouched. Coordinates must be in range.
    pub fn fire(&mut self, row: usize, col: usize) -> ShotOutcome {
        if self.grid[row][col] == Cell::Ship {
            self.grid[row][col] = Cell::Hit;
            ShotOutcome::Hit
        } else {
            ShotOutcome::Miss
        }
    }

    /// Cell state at (`row`, `col`).
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.grid[row][col]
    }

    /// The raw grid, for the owner's private view.
    pub fn grid(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.grid
    }

    /// Ship segments not yet hit.
    pub fn ships_remaining(&self) -> usize {
        self.grid
            .iter()
            .flatten()
            .filter(|&&c| c == Cell::Ship)
            .count()
    }

    /// True once every ship segment has been hit.
    pub fn all_sunk(&self) -> bool {
        self.ships_remaining() == 0
    }

    /// Cells holding a ship segment, hit or not.
    pub fn occupied_cells(&self) -> usize {
        self.grid
            .iter()
            .flatten()
            .filter(|&&c| c != Cell::Empty)
            .count()
    }
}
