//! Rejection reasons reported by the engine.
//!
//! Every variant is recoverable: a rejected action leaves the game state
//! exactly as it was.

use crate::cards::CardId;
use crate::types::{Coord, Side};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("invalid move from {from} to {to}")]
    InvalidMove { from: Coord, to: Coord },

    #[error("invalid attack from {from} on {to}")]
    InvalidAttack { from: Coord, to: Coord },

    #[error("insufficient action points: need {required}, have {available}")]
    InsufficientActionPoints { required: u8, available: u8 },

    #[error("{card:?} needs one of its required units on the board")]
    MissingRequiredUnit { card: CardId },

    #[error("{card:?} cannot target {target:?}")]
    InvalidSkillTarget { card: CardId, target: Option<Coord> },

    /// The card's archetype has no legal target anywhere on the board.
    #[error("{card:?} has no valid targets")]
    NoValidTargets { card: CardId },

    #[error("{card:?} is not in hand")]
    CardNotInHand { card: CardId },

    #[error("side {side} acted out of turn")]
    OutOfTurn { side: Side },

    #[error("the game is over")]
    GameOver,

    /// An agent had nothing affordable to do; the caller passes the turn.
    #[error("no legal action available")]
    NoLegalAction,

    #[error("invalid layout: {reason}")]
    InvalidLayout { reason: String },
}

/// Result alias for engine operations.
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors loading a rules file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read rules file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse rules file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid rules: {0}")]
    Invalid(String),
}
