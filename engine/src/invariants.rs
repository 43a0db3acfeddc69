//! Game invariants - sanity checks that detect engine bugs.
//!
//! None of these can be violated through `apply_action`. In debug builds the
//! reducer checks them after every committed action; the property tests
//! check them after every step of a random game.

use crate::types::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct InvariantViolation {
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check every invariant. Empty when the state is sound.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut violation = |message: String| violations.push(InvariantViolation { message });
    let turn = state.turn;
    let mut ids = HashSet::new();

    for (at, piece) in state.board.pieces() {
        let st = &piece.state;

        if st.current_health > st.max_health {
            violation(format!(
                "{} at {at} has health {} > max {}",
                piece.kind, st.current_health, st.max_health
            ));
        }
        if st.is_dead() {
            violation(format!("{} at {at} is on the board with 0 health", piece.kind));
        }
        if !ids.insert(piece.id) {
            violation(format!("piece id {} appears twice", piece.id));
        }

        if let Some(b) = st.buffs.iter().find(|b| !b.is_live(turn)) {
            violation(format!("{} at {at} carries expired buff {:?}", piece.kind, b.kind));
        }
        if let Some(d) = st.debuffs.iter().find(|d| !d.is_live(turn)) {
            violation(format!("{} at {at} carries expired debuff {:?}", piece.kind, d.kind));
        }

        let buff_tags: HashSet<BuffTag> = st.buffs.iter().map(|b| b.kind.tag()).collect();
        if buff_tags.len() != st.buffs.len() {
            violation(format!("{} at {at} has a stacked buff", piece.kind));
        }
        let debuff_tags: HashSet<DebuffTag> = st.debuffs.iter().map(|d| d.kind.tag()).collect();
        if debuff_tags.len() != st.debuffs.len() {
            violation(format!("{} at {at} has a stacked debuff", piece.kind));
        }

        if st.derivative_expiry.is_some_and(|t| t <= turn) {
            violation(format!("derivative {} at {at} outlived its expiry", piece.kind));
        }
    }

    for effect in &state.cell_effects {
        if effect.expiry_turn <= turn {
            violation(format!("burning field at {} expired on turn {}", effect.at, effect.expiry_turn));
        }
    }

    for player in &state.players {
        if player.hand.len() > state.config.hand_capacity {
            violation(format!(
                "side {} holds {} cards > capacity {}",
                player.side, player.hand.len(), state.config.hand_capacity
            ));
        }
        if player.action_points > state.config.max_action_points {
            violation(format!(
                "side {} has {} action points > max {}",
                player.side, player.action_points, state.config.max_action_points
            ));
        }
    }

    violations
}

/// Panics listing every violation. Only active in debug builds.
#[cfg(debug_assertions)]
pub fn assert_invariants(state: &GameState) {
    let violations = check_invariants(state);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

#[cfg(not(debug_assertions))]
pub fn assert_invariants(_state: &GameState) {}
