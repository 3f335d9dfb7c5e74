//! Playing cards and deck construction
//!
//! This module provides:
//! - The 52-card `Card` value type with short and long notation
//! - Standard and focused deck building with an injectable random source
//! - A `Dealer` that feeds a live session one card at a time

pub mod builder;
pub mod models;

pub use builder::{validate_plan, Dealer, DeckBuilder, FULL_DECK_SIZE};
pub use models::*;
