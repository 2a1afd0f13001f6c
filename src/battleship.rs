//! Two-player Battleship session: authoritative boards, turn order, shots.

use rand::Rng;

use crate::board::Board;
use crate::common::ShotOutcome;
use crate::config::BOARD_SIZE;
use crate::identity::{ConnId, Identity, UserId};
use crate::protocol::{Event, GameOverReason, Outbound};

/// Lifecycle of a match. `Finished` and `Aborted` absorb every further
/// action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Playing,
    Finished,
    Aborted,
}

/// One shot fired during a match, append-only. The log doubles as the guard
/// against re-firing at a cell the shooter has already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotRecord {
    pub shooter: ConnId,
    pub row: u8,
    pub col: u8,
    pub outcome: ShotOutcome,
}

/// Authoritative state of one match between two participants.
pub struct BattleshipSession {
    players: [Identity; 2],
    boards: [Board; 2],
    shots: Vec<ShotRecord>,
    turn: ConnId,
    status: MatchStatus,
    winner: Option<ConnId>,
}

impl BattleshipSession {
    /// Start a match with freshly generated boards. The first player is the
    /// one who queued first and takes the first turn.
    pub fn new<R: Rng + ?Sized>(
        first: Identity,
        second: Identity,
        rng: &mut R,
    ) -> (Self, Vec<Outbound>) {
        let first_board = Board::random(rng);
        let second_board = Board::random(rng);
        Self::with_boards(first, second, first_board, second_board)
    }

    /// Start a match on the given boards.
    pub fn with_boards(
        first: Identity,
        second: Identity,
        first_board: Board,
        second_board: Board,
    ) -> (Self, Vec<Outbound>) {
        let turn = first.conn;
        let session = Self {
            players: [first, second],
            boards: [first_board, second_board],
            shots: Vec::new(),
            turn,
            status: MatchStatus::Playing,
            winner: None,
        };
        let mut events = Vec::with_capacity(4);
        for (idx, player) in session.players.iter().enumerate() {
            let opponent = &session.players[1 - idx];
            events.push(Outbound::new(
                player.conn,
                Event::GameStart {
                    opponent_name: opponent.name.clone(),
                    first_turn: turn,
                },
            ));
            events.push(Outbound::new(
                player.conn,
                Event::PrivateBoard {
                    grid: *session.boards[idx].grid(),
                },
            ));
        }
        (session, events)
    }

    /// Resolve a shot by `shooter` at (`row`, `col`).
    ///
    /// Illegal shots — wrong turn, out of range, a cell the shooter already
    /// resolved, or a match no longer in play — are dropped without events
    /// or state change. A hit keeps the turn with the shooter; a miss passes
    /// it. The win check only runs after a hit, since a miss cannot sink the
    /// last segment.
    pub fn handle_shot(&mut self, shooter: ConnId, row: u8, col: u8) -> Vec<Outbound> {
        if self.status != MatchStatus::Playing || shooter != self.turn {
            return Vec::new();
        }
        if row as usize >= BOARD_SIZE || col as usize >= BOARD_SIZE {
            return Vec::new();
        }
        if self
            .shots
            .iter()
            .any(|s| s.shooter == shooter && s.row == row && s.col == col)
        {
            return Vec::new();
        }
        let Some(shooter_idx) = self.idx(shooter) else {
            return Vec::new();
        };
        let target_idx = 1 - shooter_idx;

        let outcome = self.boards[target_idx].fire(row as usize, col as usize);
        self.shots.push(ShotRecord {
            shooter,
            row,
            col,
            outcome,
        });
        let mut events = self.broadcast(Event::ShotResult {
            shooter,
            row,
            col,
            outcome,
        });
        match outcome {
            ShotOutcome::Hit => {
                if self.boards[target_idx].all_sunk() {
                    self.status = MatchStatus::Finished;
                    self.winner = Some(shooter);
                    log::info!(
                        "battleship match finished, {} beat {}",
                        self.players[shooter_idx].name,
                        self.players[target_idx].name
                    );
                    events.extend(self.broadcast(Event::GameOver {
                        winner: shooter,
                        reason: None,
                    }));
                }
            }
            ShotOutcome::Miss => {
                self.turn = self.players[target_idx].conn;
                events.extend(self.broadcast(Event::TurnChange { turn: self.turn }));
            }
        }
        events
    }

    /// A participant dropped mid-match: the remaining player wins by
    /// walkover. The game-over event goes to the remaining player only; the
    /// disconnected side has no channel left to deliver to.
    pub fn handle_disconnect(&mut self, conn: ConnId) -> Vec<Outbound> {
        if self.status != MatchStatus::Playing {
            return Vec::new();
        }
        let Some(idx) = self.idx(conn) else {
            return Vec::new();
        };
        let remaining = self.players[1 - idx].clone();
        self.status = MatchStatus::Aborted;
        self.winner = Some(remaining.conn);
        log::info!(
            "{} left mid-match, {} wins by walkover",
            self.players[idx].name,
            remaining.name
        );
        vec![Outbound::new(
            remaining.conn,
            Event::GameOver {
                winner: remaining.conn,
                reason: Some(GameOverReason::OpponentDisconnected),
            },
        )]
    }

    /// Winner and loser user ids once the match has ended.
    pub fn verdict(&self) -> Option<(UserId, UserId)> {
        let winner = self.winner?;
        let idx = self.idx(winner)?;
        Some((self.players[idx].user, self.players[1 - idx].user))
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn turn(&self) -> ConnId {
        self.turn
    }

    pub fn winner(&self) -> Option<ConnId> {
        self.winner
    }

    pub fn players(&self) -> &[Identity; 2] {
        &self.players
    }

    pub fn shots(&self) -> &[ShotRecord] {
        &self.shots
    }

    /// The board owned by `conn`.
    pub fn board(&self, conn: ConnId) -> Option<&Board> {
        self.idx(conn).map(|i| &self.boards[i])
    }

    fn idx(&self, conn: ConnId) -> Option<usize> {
        self.players.iter().position(|p| p.conn == conn)
    }

    fn broadcast(&self, event: Event) -> Vec<Outbound> {
        self.players
            .iter()
            .map(|p| Outbound::new(p.conn, event.clone()))
            .collect()
    }
}
