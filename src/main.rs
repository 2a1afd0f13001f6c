//! Local simulator for the game engines: drives the registry with scripted
//! players and prints every delivered event as a JSON line.

use std::sync::Arc;

use arcade::{
    hand_score, init_logging, Action, BalanceStore, ConnId, Event, Identity, MatchStatus,
    MemoryStore, RoundStatus, SessionRegistry, UserId, BOARD_SIZE,
};
use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;

#[derive(Parser)]
#[command(author, version, about = "Drive the chat-server game engines locally")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a full Battleship match between two scripted players.
    Battleship {
        #[arg(long, help = "Fix RNG seed for a reproducible match")]
        seed: Option<u64>,
    },
    /// Play Blackjack rounds with a fixed-threshold player.
    Blackjack {
        #[arg(long, help = "Fix RNG seed for reproducible rounds")]
        seed: Option<u64>,
        #[arg(long, default_value_t = 100)]
        bet: u32,
        #[arg(long, default_value_t = 1)]
        rounds: u32,
        #[arg(long, default_value_t = 1000)]
        bankroll: i64,
    },
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

fn spawn_printer(conn: ConnId, mut rx: UnboundedReceiver<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let line = serde_json::json!({ "conn": conn, "event": event });
            println!("{}", line);
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Battleship { seed } => run_battleship(seed).await,
        Commands::Blackjack {
            seed,
            bet,
            rounds,
            bankroll,
        } => run_blackjack(seed, bet, rounds, bankroll).await,
    }
}

async fn run_battleship(seed: Option<u64>) -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mut registry = SessionRegistry::new(store.clone(), store.clone(), make_rng(seed));

    let alice = Identity::new(ConnId(1), UserId(1), "alice");
    let bob = Identity::new(ConnId(2), UserId(2), "bob");
    let (tx1, rx1) = unbounded_channel();
    let (tx2, rx2) = unbounded_channel();
    let printers = vec![
        spawn_printer(alice.conn, rx1),
        spawn_printer(bob.conn, rx2),
    ];
    registry.connect(alice.clone(), tx1);
    registry.connect(bob.clone(), tx2);

    registry.dispatch(alice.conn, Action::JoinBattleshipQueue);
    registry.dispatch(bob.conn, Action::JoinBattleshipQueue);

    // Each player sweeps the grid in scan order; the duplicate-shot guard
    // never triggers because each keeps their own cursor.
    let mut cursors = [0usize; 2];
    loop {
        let Some(session) = registry.battleship_session(alice.conn) else {
            break;
        };
        if session.status() != MatchStatus::Playing {
            break;
        }
        let turn = session.turn();
        let idx = if turn == alice.conn { 0 } else { 1 };
        if cursors[idx] >= BOARD_SIZE * BOARD_SIZE {
            break;
        }
        let (row, col) = (cursors[idx] / BOARD_SIZE, cursors[idx] % BOARD_SIZE);
        cursors[idx] += 1;
        registry.dispatch(
            turn,
            Action::BattleshipShot {
                row: row as u8,
                col: col as u8,
            },
        );
    }

    for (winner, loser) in store.results() {
        log::info!("recorded result: user {} beat user {}", winner, loser);
    }

    drop(registry);
    for printer in printers {
        printer.await?;
    }
    Ok(())
}

async fn run_blackjack(
    seed: Option<u64>,
    bet: u32,
    rounds: u32,
    bankroll: i64,
) -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let player = Identity::new(ConnId(1), UserId(1), "alice");
    store.set_balance(player.user, bankroll);

    let mut registry = SessionRegistry::new(store.clone(), store.clone(), make_rng(seed));
    let (tx, rx) = unbounded_channel();
    let printer = spawn_printer(player.conn, rx);
    registry.connect(player.clone(), tx);

    for _ in 0..rounds {
        registry.dispatch(player.conn, Action::BlackjackStart { bet });
        let mut tried_double = false;
        loop {
            let Some(session) = registry.blackjack_session(player.user) else {
                break;
            };
            if session.status() != RoundStatus::Playing {
                break;
            }
            let score = hand_score(session.player_hand());
            let action = if !tried_double
                && session.player_hand().len() == 2
                && (9..=11).contains(&score)
            {
                tried_double = true;
                Action::BlackjackDouble
            } else if score < 17 {
                Action::BlackjackHit
            } else {
                Action::BlackjackStand
            };
            registry.dispatch(player.conn, action);
        }
    }

    log::info!(
        "final balance for user {}: {}",
        player.user,
        store.balance(player.user)
    );

    drop(registry);
    printer.await?;
    Ok(())
}
