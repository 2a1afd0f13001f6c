use std::sync::Arc;

use arcade::{
    Action, BalanceStore, Board, Cell, ConnId, Event, GameOverReason, Identity, MemoryStore,
    QueueState, RoundStatus, SessionRegistry, ShotOutcome, UserId, BOARD_SIZE, FLEET_CELLS,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

struct Harness {
    registry: SessionRegistry,
    store: Arc<MemoryStore>,
    alice: Identity,
    bob: Identity,
    rx_alice: UnboundedReceiver<Event>,
    rx_bob: UnboundedReceiver<Event>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let mut registry =
        SessionRegistry::new(store.clone(), store.clone(), SmallRng::seed_from_u64(42));

    let alice = Identity::new(ConnId(1), UserId(10), "alice");
    let bob = Identity::new(ConnId(2), UserId(20), "bob");
    let (tx_alice, rx_alice) = unbounded_channel();
    let (tx_bob, rx_bob) = unbounded_channel();
    registry.connect(alice.clone(), tx_alice);
    registry.connect(bob.clone(), tx_bob);

    Harness {
        registry,
        store,
        alice,
        bob,
        rx_alice,
        rx_bob,
    }
}

fn drain(rx: &mut UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn find_cell(board: &Board, want: Cell) -> Option<(u8, u8)> {
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            if board.cell(row, col) == want {
                return Some((row as u8, col as u8));
            }
        }
    }
    None
}

#[test]
fn test_queue_pairs_first_two_players() {
    let mut h = harness();

    h.registry.dispatch(h.alice.conn, Action::JoinBattleshipQueue);
    assert_eq!(h.registry.queue_len(), 1);
    assert_eq!(
        drain(&mut h.rx_alice),
        vec![Event::QueueStatus {
            status: QueueState::Waiting,
        }]
    );
    assert!(h.registry.battleship_session(h.alice.conn).is_none());

    h.registry.dispatch(h.bob.conn, Action::JoinBattleshipQueue);
    assert_eq!(h.registry.queue_len(), 0);

    let session = h.registry.battleship_session(h.alice.conn).unwrap();
    assert_eq!(session.turn(), h.alice.conn);

    let alice_events = drain(&mut h.rx_alice);
    assert_eq!(alice_events.len(), 2);
    assert_eq!(
        alice_events[0],
        Event::GameStart {
            opponent_name: "bob".into(),
            first_turn: h.alice.conn,
        }
    );
    assert!(matches!(alice_events[1], Event::PrivateBoard { .. }));

    let bob_events = drain(&mut h.rx_bob);
    assert_eq!(bob_events.len(), 3);
    assert_eq!(
        bob_events[0],
        Event::QueueStatus {
            status: QueueState::Waiting,
        }
    );
    assert_eq!(
        bob_events[1],
        Event::GameStart {
            opponent_name: "alice".into(),
            first_turn: h.alice.conn,
        }
    );
}

#[test]
fn test_duplicate_queue_join_is_ignored() {
    let mut h = harness();
    h.registry.dispatch(h.alice.conn, Action::JoinBattleshipQueue);
    drain(&mut h.rx_alice);

    h.registry.dispatch(h.alice.conn, Action::JoinBattleshipQueue);
    assert_eq!(h.registry.queue_len(), 1);
    assert!(drain(&mut h.rx_alice).is_empty());
}

#[test]
fn test_player_in_a_match_cannot_requeue() {
    let mut h = harness();
    h.registry.dispatch(h.alice.conn, Action::JoinBattleshipQueue);
    h.registry.dispatch(h.bob.conn, Action::JoinBattleshipQueue);

    h.registry.dispatch(h.alice.conn, Action::JoinBattleshipQueue);
    assert_eq!(h.registry.queue_len(), 0);
}

#[test]
fn test_hit_keeps_turn_and_miss_passes_it() {
    let mut h = harness();
    h.registry.dispatch(h.alice.conn, Action::JoinBattleshipQueue);
    h.registry.dispatch(h.bob.conn, Action::JoinBattleshipQueue);
    drain(&mut h.rx_alice);
    drain(&mut h.rx_bob);

    let session = h.registry.battleship_session(h.alice.conn).unwrap();
    let (row, col) = find_cell(session.board(h.bob.conn).unwrap(), Cell::Ship).unwrap();
    h.registry
        .dispatch(h.alice.conn, Action::BattleshipShot { row, col });

    let events = drain(&mut h.rx_alice);
    assert_eq!(
        events,
        vec![Event::ShotResult {
            shooter: h.alice.conn,
            row,
            col,
            outcome: ShotOutcome::Hit,
        }]
    );
    assert_eq!(drain(&mut h.rx_bob), events);

    let session = h.registry.battleship_session(h.alice.conn).unwrap();
    assert_eq!(session.turn(), h.alice.conn);

    let (row, col) = find_cell(session.board(h.bob.conn).unwrap(), Cell::Empty).unwrap();
    h.registry
        .dispatch(h.alice.conn, Action::BattleshipShot { row, col });

    let events = drain(&mut h.rx_alice);
    assert_eq!(
        events,
        vec![
            Event::ShotResult {
                shooter: h.alice.conn,
                row,
                col,
                outcome: ShotOutcome::Miss,
            },
            Event::TurnChange { turn: h.bob.conn },
        ]
    );
    assert_eq!(drain(&mut h.rx_bob), events);
    let session = h.registry.battleship_session(h.alice.conn).unwrap();
    assert_eq!(session.turn(), h.bob.conn);
}

#[test]
fn test_sweeping_the_fleet_wins_and_records_the_result() {
    let mut h = harness();
    h.registry.dispatch(h.alice.conn, Action::JoinBattleshipQueue);
    h.registry.dispatch(h.bob.conn, Action::JoinBattleshipQueue);
    drain(&mut h.rx_alice);
    drain(&mut h.rx_bob);

    // every shot targets a ship cell, so the turn never leaves alice
    let mut shots = 0;
    while let Some(session) = h.registry.battleship_session(h.alice.conn) {
        let (row, col) = find_cell(session.board(h.bob.conn).unwrap(), Cell::Ship)
            .expect("a live match always has ship cells left");
        h.registry
            .dispatch(h.alice.conn, Action::BattleshipShot { row, col });
        shots += 1;
        assert!(shots <= FLEET_CELLS, "match should end after the last hit");
    }
    assert_eq!(shots, FLEET_CELLS);

    let events = drain(&mut h.rx_alice);
    assert_eq!(
        events.last(),
        Some(&Event::GameOver {
            winner: h.alice.conn,
            reason: None,
        })
    );
    let hits = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                Event::ShotResult {
                    outcome: ShotOutcome::Hit,
                    ..
                }
            )
        })
        .count();
    assert_eq!(hits, FLEET_CELLS);

    assert_eq!(h.store.results(), vec![(h.alice.user, h.bob.user)]);

    // the finished match is gone and both players may queue again
    h.registry.dispatch(h.alice.conn, Action::JoinBattleshipQueue);
    assert_eq!(h.registry.queue_len(), 1);
}

#[test]
fn test_disconnect_mid_match_is_a_walkover() {
    let mut h = harness();
    h.registry.dispatch(h.alice.conn, Action::JoinBattleshipQueue);
    h.registry.dispatch(h.bob.conn, Action::JoinBattleshipQueue);
    drain(&mut h.rx_alice);
    drain(&mut h.rx_bob);

    h.registry.dispatch(h.bob.conn, Action::Disconnect);

    assert_eq!(
        drain(&mut h.rx_alice),
        vec![Event::GameOver {
            winner: h.alice.conn,
            reason: Some(GameOverReason::OpponentDisconnected),
        }]
    );
    assert!(drain(&mut h.rx_bob).is_empty());
    assert_eq!(h.store.results(), vec![(h.alice.user, h.bob.user)]);
    assert!(h.registry.battleship_session(h.alice.conn).is_none());
}

#[test]
fn test_disconnect_while_waiting_leaves_the_queue() {
    let mut h = harness();
    h.registry.dispatch(h.alice.conn, Action::JoinBattleshipQueue);
    h.registry.dispatch(h.alice.conn, Action::Disconnect);
    assert_eq!(h.registry.queue_len(), 0);

    h.registry.dispatch(h.bob.conn, Action::JoinBattleshipQueue);
    assert_eq!(h.registry.queue_len(), 1);
    assert!(h.registry.battleship_session(h.bob.conn).is_none());
}

#[test]
fn test_blackjack_round_settles_consistently() {
    let mut h = harness();
    h.store.set_balance(h.alice.user, 1000);

    h.registry
        .dispatch(h.alice.conn, Action::BlackjackStart { bet: 100 });

    // stand straight away so only the deal decides the round
    loop {
        let session = h.registry.blackjack_session(h.alice.user).unwrap();
        if session.status() != RoundStatus::Playing {
            break;
        }
        h.registry.dispatch(h.alice.conn, Action::BlackjackStand);
    }

    let session = h.registry.blackjack_session(h.alice.user).unwrap();
    let expected = match session.status() {
        RoundStatus::Lose => 900,
        RoundStatus::Push => 1000,
        RoundStatus::Win => 1100,
        RoundStatus::Blackjack => 1150,
        RoundStatus::Playing => unreachable!(),
    };
    assert_eq!(h.store.balance(h.alice.user), expected);

    let events = drain(&mut h.rx_alice);
    let Some(Event::BlackjackState {
        status, balance, ..
    }) = events.last()
    else {
        panic!("last event must be a state snapshot");
    };
    assert_eq!(*status, session.status());
    assert_eq!(*balance, expected);
}

#[test]
fn test_blackjack_action_without_a_round_reports_balance() {
    let mut h = harness();
    h.store.set_balance(h.alice.user, 1000);

    h.registry.dispatch(h.alice.conn, Action::BlackjackHit);
    assert_eq!(
        drain(&mut h.rx_alice),
        vec![Event::BlackjackBalance { balance: 1000 }]
    );
}

#[test]
fn test_blackjack_insufficient_funds_is_surfaced() {
    let mut h = harness();
    h.store.set_balance(h.alice.user, 50);

    h.registry
        .dispatch(h.alice.conn, Action::BlackjackStart { bet: 100 });

    let events = drain(&mut h.rx_alice);
    assert_eq!(
        events,
        vec![Event::BlackjackError {
            message: "insufficient funds".into(),
        }]
    );
    assert!(h.registry.blackjack_session(h.alice.user).is_none());
    assert_eq!(h.store.balance(h.alice.user), 50);
}

#[test]
fn test_unknown_connections_are_dropped() {
    let mut h = harness();
    h.registry
        .dispatch(ConnId(99), Action::JoinBattleshipQueue);
    assert_eq!(h.registry.queue_len(), 0);
    assert!(drain(&mut h.rx_alice).is_empty());
    assert!(drain(&mut h.rx_bob).is_empty());
}
