//! Single-player blackjack round against the house dealer.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cards::{hand_score, Card, Deck};
use crate::common::WagerError;
use crate::config::{BLACKJACK, DEALER_STANDS_ON};
use crate::identity::Identity;
use crate::protocol::{CardView, Event};
use crate::store::BalanceStore;

/// Lifecycle of a round. Everything except `Playing` is terminal; a new
/// round replaces the session object rather than reusing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Playing,
    Blackjack,
    Win,
    Lose,
    Push,
}

impl RoundStatus {
    pub fn is_terminal(self) -> bool {
        self != RoundStatus::Playing
    }
}

/// Authoritative state of one round: the shoe, both hands, and the wager.
///
/// The stake is debited before any card is dealt for it, and the payout is
/// credited exactly once, at the transition into a terminal status.
pub struct BlackjackSession {
    player: Identity,
    deck: Deck,
    player_hand: Vec<Card>,
    dealer_hand: Vec<Card>,
    bet: i64,
    status: RoundStatus,
}

impl BlackjackSession {
    /// Start a round: debit the stake, deal two cards each (player first),
    /// and resolve an immediate natural 21 without the player acting.
    pub fn start<R: Rng + ?Sized>(
        player: Identity,
        bet: i64,
        mut deck: Deck,
        rng: &mut R,
        store: &dyn BalanceStore,
    ) -> Result<Self, WagerError> {
        if store.balance(player.user) < bet {
            return Err(WagerError::InsufficientFunds);
        }
        store.update(player.user, -bet);
        log::info!("user {} started blackjack with bet {}", player.user, bet);

        let player_hand = vec![deck.draw(rng), deck.draw(rng)];
        let dealer_hand = vec![deck.draw(rng), deck.draw(rng)];
        let mut session = Self {
            player,
            deck,
            player_hand,
            dealer_hand,
            bet,
            status: RoundStatus::Playing,
        };
        if hand_score(&session.player_hand) == BLACKJACK {
            session.finish(RoundStatus::Blackjack, store);
        }
        Ok(session)
    }

    /// Draw one card for the player; going over 21 ends the round. A no-op
    /// on a settled round.
    pub fn hit<R: Rng + ?Sized>(&mut self, rng: &mut R, store: &dyn BalanceStore) {
        if self.status != RoundStatus::Playing {
            return;
        }
        let card = self.deck.draw(rng);
        self.player_hand.push(card);
        if hand_score(&self.player_hand) > BLACKJACK {
            self.finish(RoundStatus::Lose, store);
        }
    }

    /// The dealer plays out to hard 17 and the round resolves. A no-op on a
    /// settled round.
    pub fn stand<R: Rng + ?Sized>(&mut self, rng: &mut R, store: &dyn BalanceStore) {
        if self.status != RoundStatus::Playing {
            return;
        }
        self.play_dealer(rng);
        let outcome = self.compare();
        self.finish(outcome, store);
    }

    /// Double the stake and draw exactly one card; the round then ends
    /// either by bust or by the dealer playing out. Only legal on the
    /// opening two-card hand; the second stake is re-checked against the
    /// balance since the first was already taken.
    pub fn double_down<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        store: &dyn BalanceStore,
    ) -> Result<(), WagerError> {
        if self.status != RoundStatus::Playing || self.player_hand.len() != 2 {
            return Ok(());
        }
        if store.balance(self.player.user) < self.bet {
            return Err(WagerError::CannotCoverDouble);
        }
        store.update(self.player.user, -self.bet);
        self.bet *= 2;

        let card = self.deck.draw(rng);
        self.player_hand.push(card);
        if hand_score(&self.player_hand) > BLACKJACK {
            self.finish(RoundStatus::Lose, store);
        } else {
            self.play_dealer(rng);
            let outcome = self.compare();
            self.finish(outcome, store);
        }
        Ok(())
    }

    /// Snapshot sent to the player after every accepted action. The dealer's
    /// hole card and score stay hidden until the round is over.
    pub fn snapshot(&self, balance: i64) -> Event {
        let terminal = self.status.is_terminal();
        let dealer_hand = if terminal {
            self.dealer_hand.iter().map(|&c| CardView::Up(c)).collect()
        } else {
            let mut shown = Vec::with_capacity(2);
            if let Some(&up) = self.dealer_hand.first() {
                shown.push(CardView::Up(up));
            }
            shown.push(CardView::Down);
            shown
        };
        Event::BlackjackState {
            player_hand: self.player_hand.clone(),
            dealer_hand,
            player_score: hand_score(&self.player_hand),
            dealer_score: terminal.then(|| hand_score(&self.dealer_hand)),
            status: self.status,
            bet: self.bet,
            balance,
        }
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn bet(&self) -> i64 {
        self.bet
    }

    pub fn player(&self) -> &Identity {
        &self.player
    }

    pub fn player_hand(&self) -> &[Card] {
        &self.player_hand
    }

    pub fn dealer_hand(&self) -> &[Card] {
        &self.dealer_hand
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    fn play_dealer<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        while hand_score(&self.dealer_hand) < DEALER_STANDS_ON {
            let card = self.deck.draw(rng);
            self.dealer_hand.push(card);
        }
    }

    fn compare(&self) -> RoundStatus {
        let dealer = hand_score(&self.dealer_hand);
        let player = hand_score(&self.player_hand);
        if dealer > BLACKJACK || player > dealer {
            RoundStatus::Win
        } else if player < dealer {
            RoundStatus::Lose
        } else {
            RoundStatus::Push
        }
    }

    /// Enter a terminal state and settle the wager, once per round. A losing
    /// stake was already forfeited at debit time, so `Lose` credits nothing.
    fn finish(&mut self, status: RoundStatus, store: &dyn BalanceStore) {
        debug_assert!(self.status == RoundStatus::Playing && status.is_terminal());
        self.status = status;
        let payout = match status {
            RoundStatus::Win => self.bet * 2,
            RoundStatus::Blackjack => self.bet * 5 / 2,
            RoundStatus::Push => self.bet,
            RoundStatus::Lose | RoundStatus::Playing => 0,
        };
        if payout > 0 {
            store.update(self.player.user, payout);
        }
        log::info!(
            "blackjack round for user {} resolved {:?} (bet {})",
            self.player.user,
            status,
            self.bet
        );
    }
}
