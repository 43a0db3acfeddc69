// ═══════════════════════════════════════════════════════════════════════
// Heuristic Agent — the built-in opponent policy.
//
// Priority per decision:
//   1. Attack, weighted by target category with a bonus for lethal hits
//   2. Occasionally, a buff card on a unit that is about to fight
//   3. A uniformly random move (charges included)
//   4. End the turn
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{ensure_turn, Agent};
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tactics_engine::cards::{card_def, Effect};
use tactics_engine::visibility::PieceView;
use tactics_engine::{unit_def, Action, Category, Coord, PlayerView, RuleError, Side};
use tracing::trace;

/// Chance of spending a turn step on a buff instead of moving.
const BUFF_CHANCE: f64 = 0.25;
/// Extra weight for an attack that should defeat its target.
const LETHAL_BONUS: u32 = 6;
/// Enemies this close count as "about to fight".
const ENGAGE_RADIUS: u8 = 2;

pub struct HeuristicAgent {
    side: Side,
    rng: ChaCha8Rng,
}

impl HeuristicAgent {
    pub fn new(side: Side, seed: u64) -> Self {
        HeuristicAgent {
            side,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn choose_attack(&mut self, view: &PlayerView) -> Option<Action> {
        if !view.can_afford_attack() {
            return None;
        }
        let mut candidates = Vec::new();
        let mut weights = Vec::new();
        for reach in &view.attacks {
            let Some(attacker) = view.piece_at(reach.from) else { continue };
            for &to in &reach.cells {
                let Some(target) = view.piece_at(to) else { continue };
                candidates.push(Action::Attack { from: reach.from, to });
                weights.push(target_weight(view, attacker, target));
            }
        }
        let dist = WeightedIndex::new(&weights).ok()?;
        Some(candidates[dist.sample(&mut self.rng)])
    }

    fn choose_buff(&mut self, view: &PlayerView) -> Option<Action> {
        let mut candidates = Vec::new();
        for playable in &view.playable {
            if !matches!(card_def(playable.card).effect, Effect::AttachBuff(_)) {
                continue;
            }
            for &at in &playable.targets {
                if about_to_fight(view, at) {
                    candidates.push(Action::PlayCard { card: playable.card, target: Some(at) });
                }
            }
        }
        if candidates.is_empty() || !self.rng.gen_bool(BUFF_CHANCE) {
            return None;
        }
        candidates.choose(&mut self.rng).copied()
    }

    fn choose_move(&mut self, view: &PlayerView) -> Option<Action> {
        if !view.can_afford_move() {
            return None;
        }
        let moves: Vec<Action> = view.moves.iter()
            .chain(&view.charges)
            .flat_map(|reach| reach.cells.iter().map(move |&to| Action::Move { from: reach.from, to }))
            .collect();
        moves.choose(&mut self.rng).copied()
    }
}

/// How attractive striking `target` with `attacker` is.
fn target_weight(view: &PlayerView, attacker: &PieceView, target: &PieceView) -> u32 {
    let target_def = unit_def(target.kind);
    let base = if target_def.is_command_structure() {
        4
    } else {
        match target_def.category {
            Category::Hero => 5,
            Category::Special => 3,
            Category::Basic => 2,
            Category::Structure => 1,
        }
    };
    let damage = unit_def(attacker.kind).attack_power + attacker.state.attack_bonus(view.turn);
    if damage >= target.state.current_health {
        base + LETHAL_BONUS
    } else {
        base
    }
}

/// Whether the viewer's piece at `at` has an enemy within striking distance.
fn about_to_fight(view: &PlayerView, at: Coord) -> bool {
    view.pieces.iter()
        .any(|p| p.owner != view.viewer && p.at.chebyshev(at) <= ENGAGE_RADIUS)
}

impl Agent for HeuristicAgent {
    fn name(&self) -> &str { "Heuristic" }
    fn side(&self) -> Side { self.side }

    fn decide(&mut self, view: &PlayerView) -> Result<Action, RuleError> {
        ensure_turn(view, self.side)?;
        if view.legal_actions().is_empty() {
            return Err(RuleError::NoLegalAction);
        }
        let action = self.choose_attack(view)
            .or_else(|| self.choose_buff(view))
            .or_else(|| self.choose_move(view))
            .unwrap_or(Action::EndTurn);
        trace!(side = %self.side, ?action, ap = view.action_points, "heuristic decision");
        Ok(action)
    }
}
