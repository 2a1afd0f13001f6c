//! Session registry: routes identity-scoped actions to the owning session
//! and fans the resulting events out to per-connection delivery channels.
//!
//! One registry per process, created at server start and injected into the
//! request handlers. Each connected identity holds at most one live session
//! per game type; sessions are inserted when created and removed on their
//! terminal transition.

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::SmallRng;
use tokio::sync::mpsc::UnboundedSender;

use crate::battleship::{BattleshipSession, MatchStatus};
use crate::blackjack::BlackjackSession;
use crate::cards::Deck;
use crate::identity::{ConnId, Identity, UserId};
use crate::matchmaking::MatchQueue;
use crate::protocol::{Action, Event, Outbound, QueueState};
use crate::store::{BalanceStore, GameLedger};

/// Internal key for one Battleship match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MatchId(u64);

pub struct SessionRegistry {
    rng: SmallRng,
    store: Arc<dyn BalanceStore>,
    ledger: Arc<dyn GameLedger>,
    connections: HashMap<ConnId, Identity>,
    senders: HashMap<ConnId, UnboundedSender<Event>>,
    queue: MatchQueue,
    matches: HashMap<MatchId, BattleshipSession>,
    match_by_conn: HashMap<ConnId, MatchId>,
    // Keyed by user, not connection: a round survives a reconnect and is
    // replaced wholesale by the next start.
    blackjack: HashMap<UserId, BlackjackSession>,
    next_match: u64,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn BalanceStore>, ledger: Arc<dyn GameLedger>, rng: SmallRng) -> Self {
        Self {
            rng,
            store,
            ledger,
            connections: HashMap::new(),
            senders: HashMap::new(),
            queue: MatchQueue::new(),
            matches: HashMap::new(),
            match_by_conn: HashMap::new(),
            blackjack: HashMap::new(),
            next_match: 0,
        }
    }

    /// Register a connection and its delivery channel.
    pub fn connect(&mut self, identity: Identity, sender: UnboundedSender<Event>) {
        self.senders.insert(identity.conn, sender);
        self.connections.insert(identity.conn, identity);
    }

    /// Route one inbound action. Actions from unknown connections are
    /// dropped; sessions absorb anything illegal as a silent no-op.
    pub fn dispatch(&mut self, conn: ConnId, action: Action) {
        let Some(identity) = self.connections.get(&conn).cloned() else {
            return;
        };
        match action {
            Action::JoinBattleshipQueue => self.join_queue(identity),
            Action::BattleshipShot { row, col } => self.shot(conn, row, col),
            Action::BlackjackStart { bet } => self.blackjack_start(identity, bet as i64),
            Action::BlackjackHit => self.blackjack_hit(identity),
            Action::BlackjackStand => self.blackjack_stand(identity),
            Action::BlackjackDouble => self.blackjack_double(identity),
            Action::Disconnect => self.disconnect(conn),
        }
    }

    /// The match `conn` is playing in, if any.
    pub fn battleship_session(&self, conn: ConnId) -> Option<&BattleshipSession> {
        let id = self.match_by_conn.get(&conn)?;
        self.matches.get(id)
    }

    /// The blackjack round `user` is playing, if any.
    pub fn blackjack_session(&self, user: UserId) -> Option<&BlackjackSession> {
        self.blackjack.get(&user)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    fn join_queue(&mut self, identity: Identity) {
        if self.match_by_conn.contains_key(&identity.conn) {
            return;
        }
        let conn = identity.conn;
        let name = identity.name.clone();
        if !self.queue.enqueue(identity) {
            return;
        }
        self.deliver(
            conn,
            Event::QueueStatus {
                status: QueueState::Waiting,
            },
        );
        log::info!(
            "{} joined the battleship queue ({} waiting)",
            name,
            self.queue.len()
        );
        while let Some((first, second)) = self.queue.pop_pair() {
            self.start_match(first, second);
        }
    }

    fn start_match(&mut self, first: Identity, second: Identity) {
        let id = MatchId(self.next_match);
        self.next_match += 1;
        log::info!("battleship match started: {} vs {}", first.name, second.name);
        let first_conn = first.conn;
        let second_conn = second.conn;
        let (session, events) = BattleshipSession::new(first, second, &mut self.rng);
        self.match_by_conn.insert(first_conn, id);
        self.match_by_conn.insert(second_conn, id);
        self.matches.insert(id, session);
        self.send_all(events);
    }

    fn shot(&mut self, conn: ConnId, row: u8, col: u8) {
        let Some(&id) = self.match_by_conn.get(&conn) else {
            return;
        };
        let Some(session) = self.matches.get_mut(&id) else {
            return;
        };
        let events = session.handle_shot(conn, row, col);
        let over = session.status() != MatchStatus::Playing;
        self.send_all(events);
        if over {
            self.finish_match(id);
        }
    }

    fn disconnect(&mut self, conn: ConnId) {
        self.queue.remove(conn);
        if let Some(&id) = self.match_by_conn.get(&conn) {
            if let Some(session) = self.matches.get_mut(&id) {
                let events = session.handle_disconnect(conn);
                self.send_all(events);
            }
            self.finish_match(id);
        }
        self.connections.remove(&conn);
        self.senders.remove(&conn);
    }

    /// Drop a settled match and record its outcome. The ledger write is
    /// best effort: a failure is logged and the players still get their
    /// game-over event.
    fn finish_match(&mut self, id: MatchId) {
        let Some(session) = self.matches.remove(&id) else {
            return;
        };
        for player in session.players() {
            self.match_by_conn.remove(&player.conn);
        }
        if let Some((winner, loser)) = session.verdict() {
            if let Err(err) = self.ledger.record_result(winner, loser) {
                log::warn!("failed to record battleship result: {}", err);
            }
        }
    }

    fn blackjack_start(&mut self, identity: Identity, bet: i64) {
        let deck = Deck::shuffled(&mut self.rng);
        let result = BlackjackSession::start(
            identity.clone(),
            bet,
            deck,
            &mut self.rng,
            self.store.as_ref(),
        );
        match result {
            Ok(session) => {
                let snapshot = session.snapshot(self.store.balance(identity.user));
                self.blackjack.insert(identity.user, session);
                self.deliver(identity.conn, snapshot);
            }
            // A refused wager leaves any previous round in place.
            Err(err) => self.deliver(
                identity.conn,
                Event::BlackjackError {
                    message: err.to_string(),
                },
            ),
        }
    }

    fn blackjack_hit(&mut self, identity: Identity) {
        if !self.blackjack.contains_key(&identity.user) {
            self.blackjack_idle(identity);
            return;
        }
        let Some(session) = self.blackjack.get_mut(&identity.user) else {
            return;
        };
        session.hit(&mut self.rng, self.store.as_ref());
        let snapshot = session.snapshot(self.store.balance(identity.user));
        self.deliver(identity.conn, snapshot);
    }

    fn blackjack_stand(&mut self, identity: Identity) {
        if !self.blackjack.contains_key(&identity.user) {
            self.blackjack_idle(identity);
            return;
        }
        let Some(session) = self.blackjack.get_mut(&identity.user) else {
            return;
        };
        session.stand(&mut self.rng, self.store.as_ref());
        let snapshot = session.snapshot(self.store.balance(identity.user));
        self.deliver(identity.conn, snapshot);
    }

    fn blackjack_double(&mut self, identity: Identity) {
        if !self.blackjack.contains_key(&identity.user) {
            self.blackjack_idle(identity);
            return;
        }
        let Some(session) = self.blackjack.get_mut(&identity.user) else {
            return;
        };
        let result = session.double_down(&mut self.rng, self.store.as_ref());
        let snapshot = session.snapshot(self.store.balance(identity.user));
        if let Err(err) = result {
            self.deliver(
                identity.conn,
                Event::BlackjackError {
                    message: err.to_string(),
                },
            );
        }
        self.deliver(identity.conn, snapshot);
    }

    fn blackjack_idle(&mut self, identity: Identity) {
        let balance = self.store.balance(identity.user);
        self.deliver(identity.conn, Event::BlackjackBalance { balance });
    }

    fn send_all(&self, events: Vec<Outbound>) {
        for out in events {
            self.deliver(out.to, out.event);
        }
    }

    fn deliver(&self, to: ConnId, event: Event) {
        if let Some(sender) = self.senders.get(&to) {
            // A closed channel means the client is gone; nothing to do.
            let _ = sender.send(event);
        }
    }
}
