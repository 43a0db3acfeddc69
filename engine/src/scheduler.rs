// ═══════════════════════════════════════════════════════════════════════
// Effect scheduler — everything that happens between two side-turns
//
// Runs once per EndTurn, after the counter moves to `new_turn`:
//   1. unit buffs/debuffs at or past expiry are removed
//      (poison pays out, doom kills)
//   2. burning fields tick on their occupants, then burn out
//   3. derivative occupants past their lifetime leave the board
//   4. frost auras re-apply their slow to nearby enemies
// ═══════════════════════════════════════════════════════════════════════

use crate::combat::{self, Casualty, Hit};
use crate::types::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Penalty a frost aura applies to every enemy inside its radius.
pub const FROST_SLOW_PENALTY: u8 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerReport {
    pub turn: u32,
    pub expired_buffs: usize,
    pub expired_debuffs: usize,
    pub poison: Vec<Hit>,
    pub burns: Vec<Hit>,
    pub doomed: Vec<Casualty>,
    pub expired_derivatives: Vec<Casualty>,
    /// Pieces killed by poison or burning.
    pub casualties: Vec<Casualty>,
    pub slowed: Vec<Coord>,
}

/// Move the counter to `new_turn` and run the between-turns bookkeeping.
pub fn advance_turn(state: &mut GameState, new_turn: u32) -> SchedulerReport {
    state.turn = new_turn;
    let mut report = SchedulerReport { turn: new_turn, ..Default::default() };

    expire_unit_effects(state, &mut report);
    tick_cell_effects(state, &mut report);
    expire_derivatives(state, &mut report);
    report.slowed = propagate_auras(state);

    debug!(
        turn = new_turn,
        expired_buffs = report.expired_buffs,
        expired_debuffs = report.expired_debuffs,
        casualties = report.casualties.len() + report.doomed.len(),
        "scheduler ran"
    );
    report
}

fn immune(st: &UnitState, turn: u32) -> bool {
    st.flags.damage_immune || st.has_buff(turn, BuffTag::DamageImmune)
}

fn expire_unit_effects(state: &mut GameState, report: &mut SchedulerReport) {
    let turn = state.turn;
    let mut doomed = Vec::new();
    let mut poisoned = Vec::new();

    for (at, piece) in state.board.pieces_mut() {
        let st = &mut piece.state;

        let before = st.buffs.len();
        st.buffs.retain(|b| b.is_live(turn));
        report.expired_buffs += before - st.buffs.len();

        let (kept, expired): (Vec<Debuff>, Vec<Debuff>) =
            st.debuffs.drain(..).partition(|d| d.is_live(turn));
        st.debuffs = kept;
        report.expired_debuffs += expired.len();

        for debuff in expired {
            match debuff.kind {
                DebuffKind::Poison { damage } => {
                    let applied = if immune(st, turn) { 0 } else { damage };
                    let dealt = st.take_damage(applied);
                    combat::arm_enrage(st, turn, dealt);
                    report.poison.push(Hit { at, damage: dealt, blocked: false });
                    poisoned.push(at);
                }
                DebuffKind::Doom => doomed.push(at),
                _ => {}
            }
        }
    }

    for at in doomed {
        if let Some(casualty) = combat::remove_piece(state, at) {
            debug!(%at, kind = %casualty.kind, "doom claimed its holder");
            report.doomed.push(casualty);
        }
    }
    report.casualties.extend(combat::remove_dead(state, &poisoned));
}

fn tick_cell_effects(state: &mut GameState, report: &mut SchedulerReport) {
    let turn = state.turn;
    let ticking: Vec<CellEffect> = state.cell_effects.iter()
        .filter(|e| e.expiry_turn >= turn)
        .copied()
        .collect();

    for effect in &ticking {
        let Some(piece) = state.board.get_mut(effect.at) else { continue };
        let applied = if immune(&piece.state, turn) { 0 } else { effect.damage };
        let dealt = piece.state.take_damage(applied);
        combat::arm_enrage(&mut piece.state, turn, dealt);
        debug!(at = %effect.at, damage = dealt, "burning field ticked");
        report.burns.push(Hit { at: effect.at, damage: dealt, blocked: false });
    }
    state.cell_effects.retain(|e| e.expiry_turn > turn);

    let burnt: Vec<Coord> = report.burns.iter().map(|h| h.at).collect();
    report.casualties.extend(combat::remove_dead(state, &burnt));
}

fn expire_derivatives(state: &mut GameState, report: &mut SchedulerReport) {
    let turn = state.turn;
    let expired: Vec<Coord> = state.board.pieces()
        .filter(|(_, p)| p.state.derivative_expiry.is_some_and(|t| t <= turn))
        .map(|(at, _)| at)
        .collect();
    for at in expired {
        if let Some(casualty) = combat::remove_piece(state, at) {
            report.expired_derivatives.push(casualty);
        }
    }
}

/// Re-applies the slow of every live frost aura to enemies in its radius.
/// An existing slow is refreshed rather than duplicated. Returns the cells
/// that were slowed.
pub fn propagate_auras(state: &mut GameState) -> Vec<Coord> {
    let turn = state.turn;
    let auras: Vec<(Coord, Side, u8)> = state.board.pieces()
        .filter_map(|(at, p)| match p.state.buff(turn, BuffTag::FrostAura).map(|b| b.kind) {
            Some(BuffKind::FrostAura { radius }) => Some((at, p.owner, radius)),
            _ => None,
        })
        .collect();
    if auras.is_empty() {
        return Vec::new();
    }

    let expiry_turn = turn + 1;
    let mut slowed = Vec::new();
    for (at, piece) in state.board.pieces_mut() {
        let in_aura = auras.iter()
            .any(|&(src, owner, radius)| owner != piece.owner && src.chebyshev(at) <= radius);
        if !in_aura {
            continue;
        }
        let st = &mut piece.state;
        match st.debuffs.iter_mut().find(|d| d.kind.tag() == DebuffTag::Slow) {
            Some(existing) => existing.expiry_turn = existing.expiry_turn.max(expiry_turn),
            None => st.debuffs.push(Debuff {
                kind: DebuffKind::Slow { penalty: FROST_SLOW_PENALTY },
                expiry_turn,
            }),
        }
        slowed.push(at);
    }
    slowed
}
