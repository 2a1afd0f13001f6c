//! Typed actions and events crossing the chat-server boundary.
//!
//! Inbound actions arrive tagged with the caller's connection; outbound
//! events are addressed per participant. The chat server owns the transport;
//! these types only define what travels over it.

use serde::{Deserialize, Serialize};

use crate::blackjack::RoundStatus;
use crate::board::Cell;
use crate::cards::Card;
use crate::common::ShotOutcome;
use crate::config::BOARD_SIZE;
use crate::identity::ConnId;

/// Inbound, identity-scoped player actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    JoinBattleshipQueue,
    BattleshipShot { row: u8, col: u8 },
    BlackjackStart { bet: u32 },
    BlackjackHit,
    BlackjackStand,
    BlackjackDouble,
    Disconnect,
}

/// Matchmaking progress reported to a waiting player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueState {
    Waiting,
}

/// Why a match ended without being played to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    OpponentDisconnected,
}

/// A card as the player sees it. The dealer's hole card stays `Down` until
/// the round reaches a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardView {
    Up(Card),
    Down,
}

/// Outbound events delivered to a single connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    QueueStatus {
        status: QueueState,
    },
    GameStart {
        opponent_name: String,
        first_turn: ConnId,
    },
    /// Sent only to the board's owner. The opponent's board never leaves the
    /// server.
    PrivateBoard {
        grid: [[Cell; BOARD_SIZE]; BOARD_SIZE],
    },
    /// Broadcast to both participants; the only channel either side has for
    /// learning a shot's outcome.
    ShotResult {
        shooter: ConnId,
        row: u8,
        col: u8,
        outcome: ShotOutcome,
    },
    TurnChange {
        turn: ConnId,
    },
    GameOver {
        winner: ConnId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<GameOverReason>,
    },
    BlackjackState {
        player_hand: Vec<Card>,
        dealer_hand: Vec<CardView>,
        player_score: u32,
        dealer_score: Option<u32>,
        status: RoundStatus,
        bet: i64,
        balance: i64,
    },
    /// Reply to a blackjack action arriving with no round in progress.
    BlackjackBalance {
        balance: i64,
    },
    BlackjackError {
        message: String,
    },
}

/// An event addressed to one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: ConnId,
    pub event: Event,
}

impl Outbound {
    pub fn new(to: ConnId, event: Event) -> Self {
        Self { to, event }
    }
}
