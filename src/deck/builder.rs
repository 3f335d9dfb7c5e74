//! Deck construction
//!
//! A standard build is a uniformly shuffled 52-card deck. A focused build
//! guarantees every focus card appears exactly once and fills the rest of the
//! deck with a uniform draw (without replacement) from the remaining cards.
//!
//! Randomness is injected as any `rand::Rng`, so tests can pass a seeded
//! `StdRng` and get reproducible decks.

use rand::seq::SliceRandom;
use rand::Rng;

use super::models::Card;
use crate::error::{DrillError, Result};

/// Number of cards in a full deck
pub const FULL_DECK_SIZE: usize = 52;

/// Stateless deck builder
#[derive(Debug, Clone, Copy, Default)]
pub struct DeckBuilder;

impl DeckBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build a deck.
    ///
    /// With an empty `focus_cards` the full deck is returned shuffled and
    /// `target_size` is not consulted. Otherwise the deck holds exactly
    /// `target_size` distinct cards including every focus card once.
    /// Duplicate focus cards collapse to one.
    pub fn build_deck<R: Rng + ?Sized>(
        &self,
        focus_cards: &[Card],
        target_size: usize,
        rng: &mut R,
    ) -> Result<Vec<Card>> {
        let focus = dedup_focus(focus_cards);

        if focus.is_empty() {
            let mut deck = Card::full_deck();
            deck.shuffle(rng);
            return Ok(deck);
        }

        validate_plan(&focus, target_size)?;

        let mut remainder: Vec<Card> = Card::full_deck()
            .into_iter()
            .filter(|card| !focus.contains(card))
            .collect();

        // partial_shuffle leaves a uniform sample without replacement at the front
        let fill = target_size - focus.len();
        let (drawn, _) = remainder.partial_shuffle(rng, fill);

        let mut deck = focus;
        deck.extend_from_slice(drawn);
        deck.shuffle(rng);

        log::debug!("Built focused deck of {} cards", deck.len());
        Ok(deck)
    }
}

/// Check that a focused build of `target_size` cards is possible
pub fn validate_plan(focus_cards: &[Card], target_size: usize) -> Result<()> {
    let focus_count = dedup_focus(focus_cards).len();
    if focus_count == 0 {
        return Ok(());
    }
    if target_size < focus_count {
        return Err(DrillError::InvalidConfiguration(format!(
            "Deck size {} is smaller than the {} focus cards",
            target_size, focus_count
        )));
    }
    if target_size > FULL_DECK_SIZE {
        return Err(DrillError::InvalidConfiguration(format!(
            "Deck size {} exceeds the {} cards available",
            target_size, FULL_DECK_SIZE
        )));
    }
    Ok(())
}

fn dedup_focus(focus_cards: &[Card]) -> Vec<Card> {
    let mut focus: Vec<Card> = Vec::with_capacity(focus_cards.len());
    for card in focus_cards {
        if !focus.contains(card) {
            focus.push(*card);
        }
    }
    focus
}

/// Deals cards one at a time, rebuilding a fresh deck whenever the current
/// one runs out.
#[derive(Debug, Clone)]
pub struct Dealer {
    builder: DeckBuilder,
    focus_cards: Vec<Card>,
    target_size: usize,
    remaining: Vec<Card>,
}

impl Dealer {
    /// Validates the deck plan up front so that dealing can't fail later
    pub fn new(focus_cards: Vec<Card>, target_size: usize) -> Result<Self> {
        validate_plan(&focus_cards, target_size)?;
        Ok(Self {
            builder: DeckBuilder::new(),
            focus_cards,
            target_size,
            remaining: Vec::new(),
        })
    }

    pub fn standard() -> Self {
        Self {
            builder: DeckBuilder::new(),
            focus_cards: Vec::new(),
            target_size: FULL_DECK_SIZE,
            remaining: Vec::new(),
        }
    }

    pub fn focus_cards(&self) -> &[Card] {
        &self.focus_cards
    }

    pub fn is_focused(&self) -> bool {
        !self.focus_cards.is_empty()
    }

    /// Cards left before the next rebuild
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn deal<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Card> {
        if self.remaining.is_empty() {
            let mut deck = self
                .builder
                .build_deck(&self.focus_cards, self.target_size, rng)?;
            // Deal from the back so pop() preserves the shuffled order
            deck.reverse();
            self.remaining = deck;
        }
        self.remaining
            .pop()
            .ok_or_else(|| DrillError::InvalidConfiguration("Deck plan produced no cards".to_string()))
    }

    /// Drop the partially dealt deck
    pub fn reset(&mut self) {
        self.remaining.clear();
    }
}
