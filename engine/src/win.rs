// ═══════════════════════════════════════════════════════════════════════
// Win evaluator
// A side loses when it has no living hero or no command structure left.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinEvaluation {
    Ongoing,
    Decided(Victory),
}

/// What a side still has standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SideStatus {
    pub heroes: usize,
    pub command_structures: usize,
}

impl SideStatus {
    pub fn loss(&self) -> Option<WinReason> {
        if self.heroes == 0 {
            Some(WinReason::HeroDestroyed)
        } else if self.command_structures == 0 {
            Some(WinReason::CommandStructureDestroyed)
        } else {
            None
        }
    }
}

pub fn side_status(state: &GameState, side: Side) -> SideStatus {
    let mut status = SideStatus::default();
    for (_, piece) in state.board.pieces() {
        if piece.owner != side || piece.state.is_dead() {
            continue;
        }
        let def = piece.def();
        if def.is_hero() {
            status.heroes += 1;
        }
        if def.is_command_structure() {
            status.command_structures += 1;
        }
    }
    debug_assert!(
        status.command_structures <= 1,
        "side {side} holds {} command structures",
        status.command_structures
    );
    status
}

/// Decide the game from the board alone. `acting` is the side whose turn
/// just ended; it loses a simultaneous double defeat.
pub fn evaluate(state: &GameState, acting: Side) -> WinEvaluation {
    let other = acting.opponent();
    let turn = state.turn;
    let decided = |winner: Side, reason: WinReason| {
        WinEvaluation::Decided(Victory { winner, reason, turn })
    };

    match (side_status(state, acting).loss(), side_status(state, other).loss()) {
        (None, None) => WinEvaluation::Ongoing,
        (Some(_), Some(_)) => decided(other, WinReason::MutualDestruction),
        (Some(reason), None) => decided(other, reason),
        (None, Some(reason)) => decided(acting, reason),
    }
}
