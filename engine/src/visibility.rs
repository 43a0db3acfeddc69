// ═══════════════════════════════════════════════════════════════════════
// Visibility / Information Model
//
// Information is split between:
//   PUBLIC  — the board, every unit's health and effects, burning cells,
//             action points, hand and deck sizes, discard piles
//   PRIVATE — the cards in your own hand
//   HIDDEN  — deck order, for both sides
//
// This module produces a "player view" of the game state that only
// contains information that side is allowed to know, plus the legal
// queries precomputed for the active side. Agents MUST only receive
// PlayerView, never the raw GameState.
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::{card_def, CardId, TargetRule};
use crate::config::RulesConfig;
use crate::engine::Action;
use crate::rules;
use crate::skills;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// A unit as seen from either side. Unit state is public information, so
/// the whole `UnitState` is shown, flags and derivative expiry included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceView {
    pub at: Coord,
    pub id: u32,
    pub kind: UnitKind,
    pub owner: Side,
    pub state: UnitState,
}

/// Destinations or targets reachable from one of the viewer's pieces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reach {
    pub from: Coord,
    pub cells: Vec<Coord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayableCard {
    pub card: CardId,
    pub cost: u8,
    /// Empty for cards that take no target.
    pub targets: Vec<Coord>,
}

/// The view of the game state that one side is allowed to see.
/// This is what gets passed to an Agent's `decide`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    // ── Public info ────────────────────────────────────────
    pub viewer: Side,
    pub turn: u32,
    pub active: Side,
    pub config: RulesConfig,
    pub pieces: Vec<PieceView>,
    pub cell_effects: Vec<CellEffect>,
    pub opponent_action_points: u8,
    pub opponent_hand_size: usize,
    pub opponent_deck_size: usize,
    pub opponent_discard: Vec<CardId>,
    pub victory: Option<Victory>,

    // ── Private info (only for the viewer) ─────────────────
    pub action_points: u8,
    pub my_hand: Vec<CardId>,
    pub my_deck_size: usize,
    pub my_discard: Vec<CardId>,

    // ── Precomputed for the active side ────────────────────
    // Empty when it is not the viewer's turn. Not filtered by cost.
    pub moves: Vec<Reach>,
    pub charges: Vec<Reach>,
    pub attacks: Vec<Reach>,
    /// Cards in hand that are affordable and have a required unit on the board.
    pub playable: Vec<PlayableCard>,
}

/// Build the PlayerView for one side.
pub fn player_view(state: &GameState, viewer: Side) -> PlayerView {
    let me = state.player(viewer);
    let them = state.player(viewer.opponent());

    let pieces: Vec<PieceView> = state.board.pieces()
        .map(|(at, p)| PieceView { at, id: p.id, kind: p.kind, owner: p.owner, state: p.state.clone() })
        .collect();

    let my_turn = state.active == viewer && !state.is_over();
    let (mut moves, mut charges, mut attacks, mut playable) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());

    if my_turn {
        for from in state.board.coords_of(viewer) {
            let reach = |cells: Vec<Coord>| (!cells.is_empty()).then_some(Reach { from, cells });
            moves.extend(reach(rules::legal_moves(state, from)));
            charges.extend(reach(rules::charge_targets(state, from)));
            attacks.extend(reach(rules::legal_attacks(state, from)));
        }

        let mut hand = me.hand.clone();
        hand.sort_unstable();
        hand.dedup();
        for card in hand {
            if !skills::can_play(state, viewer, card) {
                continue;
            }
            let def = card_def(card);
            let targets = skills::valid_targets(state, viewer, card);
            if def.target != TargetRule::NoTarget && targets.is_empty() {
                continue;
            }
            playable.push(PlayableCard { card, cost: def.cost, targets });
        }
    }

    PlayerView {
        viewer,
        turn: state.turn,
        active: state.active,
        config: state.config,
        pieces,
        cell_effects: state.cell_effects.clone(),
        opponent_action_points: them.action_points,
        opponent_hand_size: them.hand.len(),
        opponent_deck_size: them.deck.len(),
        opponent_discard: them.discard.clone(),
        victory: state.victory,
        action_points: me.action_points,
        my_hand: me.hand.clone(),
        my_deck_size: me.deck.len(),
        my_discard: me.discard.clone(),
        moves,
        charges,
        attacks,
        playable,
    }
}

impl PlayerView {
    pub fn is_my_turn(&self) -> bool {
        self.active == self.viewer && self.victory.is_none()
    }

    pub fn piece_at(&self, at: Coord) -> Option<&PieceView> {
        self.pieces.iter().find(|p| p.at == at)
    }

    pub fn can_afford_move(&self) -> bool {
        self.action_points >= self.config.move_cost
    }

    pub fn can_afford_attack(&self) -> bool {
        self.action_points >= self.config.attack_cost
    }

    /// Every affordable action except `EndTurn`.
    pub fn legal_actions(&self) -> Vec<Action> {
        let mut out = Vec::new();
        if self.can_afford_move() {
            for reach in self.moves.iter().chain(&self.charges) {
                out.extend(reach.cells.iter().map(|&to| Action::Move { from: reach.from, to }));
            }
        }
        if self.can_afford_attack() {
            for reach in &self.attacks {
                out.extend(reach.cells.iter().map(|&to| Action::Attack { from: reach.from, to }));
            }
        }
        for p in &self.playable {
            if p.targets.is_empty() {
                out.push(Action::PlayCard { card: p.card, target: None });
            } else {
                out.extend(p.targets.iter().map(|&t| Action::PlayCard { card: p.card, target: Some(t) }));
            }
        }
        out
    }
}
