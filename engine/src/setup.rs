// ═══════════════════════════════════════════════════════════════════════
// Game setup — builds the initial GameState from a layout
// The layout (placements + decks) comes from outside; this module only
// validates it, shuffles the decks and deals opening hands.
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::{self, CardId};
use crate::catalog::{is_derivative_kind, unit_def};
use crate::config::RulesConfig;
use crate::error::{RuleError, RuleResult};
use crate::types::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// One unit placed before the first turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub side: Side,
    pub kind: UnitKind,
    pub at: Coord,
}

/// Starting army and decks for both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub placements: Vec<Placement>,
    /// Indexed by [`Side::index`]; shuffled at setup.
    pub decks: [Vec<CardId>; 2],
}

impl Layout {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

const BACK_RANK: [UnitKind; 8] = [
    UnitKind::Archer,
    UnitKind::Cavalry,
    UnitKind::Mage,
    UnitKind::Warlord,
    UnitKind::Castle,
    UnitKind::Warlock,
    UnitKind::Cavalry,
    UnitKind::Archer,
];

const FRONT_RANK: [UnitKind; 8] = [
    UnitKind::Footman,
    UnitKind::RoyalGuard,
    UnitKind::Pikeman,
    UnitKind::Samurai,
    UnitKind::Crab,
    UnitKind::Footman,
    UnitKind::RoyalGuard,
    UnitKind::Footman,
];

/// Mirrored sixteen-piece armies: side A on rows 6–7, side B on rows 0–1.
pub fn standard_layout() -> Layout {
    let mut placements = Vec::with_capacity(32);
    for side in Side::ALL {
        let (back, front) = match side {
            Side::A => (7, 6),
            Side::B => (0, 1),
        };
        for col in 0..BOARD_SIZE {
            placements.push(Placement { side, kind: BACK_RANK[col as usize], at: Coord::new(back, col) });
            placements.push(Placement { side, kind: FRONT_RANK[col as usize], at: Coord::new(front, col) });
        }
    }
    Layout { placements, decks: [cards::standard_deck(), cards::standard_deck()] }
}

fn invalid(reason: impl Into<String>) -> RuleError {
    RuleError::InvalidLayout { reason: reason.into() }
}

fn validate(layout: &Layout) -> RuleResult<()> {
    let mut seen = HashSet::new();
    for p in &layout.placements {
        if !p.at.is_on_board() {
            return Err(invalid(format!("{} placed off the board at {}", p.kind, p.at)));
        }
        if !seen.insert(p.at) {
            return Err(invalid(format!("two pieces placed at {}", p.at)));
        }
        if is_derivative_kind(p.kind) {
            return Err(invalid(format!("{} can only be created by a card", p.kind)));
        }
    }

    for side in Side::ALL {
        let defs: Vec<_> = layout.placements.iter()
            .filter(|p| p.side == side)
            .map(|p| unit_def(p.kind))
            .collect();
        let structures = defs.iter().filter(|d| d.is_command_structure()).count();
        if structures != 1 {
            return Err(invalid(format!("side {side} has {structures} command structures, expected 1")));
        }
        if !defs.iter().any(|d| d.is_hero()) {
            return Err(invalid(format!("side {side} has no hero")));
        }
    }
    Ok(())
}

/// Create the starting state. Side A moves first with full action points;
/// both sides hold an opening hand. The seed fixes the deck order.
pub fn create_initial_state(layout: &Layout, config: RulesConfig, seed: u64) -> RuleResult<GameState> {
    config.validate().map_err(|e| invalid(e.to_string()))?;
    validate(layout)?;

    let players = Side::ALL.map(|side| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ (side.index() as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let mut deck = layout.decks[side.index()].clone();
        deck.shuffle(&mut rng);
        let mut player = PlayerState::new(side, deck);
        player.draw(config.opening_hand, config.hand_capacity);
        player
    });

    let mut state = GameState {
        config,
        turn: 1,
        active: Side::A,
        board: Board::empty(),
        cell_effects: Vec::new(),
        players,
        next_piece_id: 1,
        seed,
        victory: None,
    };
    state.player_mut(Side::A).action_points = config.max_action_points;

    for p in &layout.placements {
        state.spawn(p.at, p.kind, p.side)
            .map_err(|_| invalid(format!("cell {} already occupied", p.at)))?;
    }

    debug!(seed, pieces = layout.placements.len(), "initial state created");
    Ok(state)
}
