// ═══════════════════════════════════════════════════════════════════════
// Combat resolution — one attack, committed atomically
//
// Order matters and is fixed:
//   1. damage = base power + live attack bonuses
//   2. guardian redirect (ends resolution)
//   3. one-shot shield (ends resolution, shield consumed)
//   4. damage immunity forces 0
//   5. apply damage
//   6. triggers: enrage, burning field, chain/area splash, reflect, glory
//   7. clear the dead
// ═══════════════════════════════════════════════════════════════════════

use crate::catalog::Caps;
use crate::error::{RuleError, RuleResult};
use crate::types::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackOutcome {
    Blocked,
    Damaged,
    Defeated,
}

/// Damage landing on one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub at: Coord,
    pub damage: u32,
    /// A shield absorbed the hit.
    pub blocked: bool,
}

/// A piece removed from the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Casualty {
    pub at: Coord,
    pub id: u32,
    pub kind: UnitKind,
    pub owner: Side,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackReport {
    pub attacker: Coord,
    pub target: Coord,
    pub outcome: AttackOutcome,
    /// Damage dealt by the main hit (to the guardian when redirected).
    pub damage: u32,
    pub redirected_to: Option<Coord>,
    pub splash: Vec<Hit>,
    pub reflected: Option<Hit>,
    pub ignited: Option<Coord>,
    pub stripped_buffs: usize,
    pub casualties: Vec<Casualty>,
}

impl AttackReport {
    fn new(attacker: Coord, target: Coord) -> Self {
        AttackReport {
            attacker,
            target,
            outcome: AttackOutcome::Damaged,
            damage: 0,
            redirected_to: None,
            splash: Vec::new(),
            reflected: None,
            ignited: None,
            stripped_buffs: 0,
            casualties: Vec::new(),
        }
    }
}

/// Resolve the piece at `from` attacking the piece at `to`.
/// Legality is the caller's business; this only requires both cells occupied.
pub fn resolve_attack(state: &mut GameState, from: Coord, to: Coord) -> RuleResult<AttackReport> {
    let turn = state.turn;
    let (attacker_side, damage, burning, chain, area, glory) = {
        let (Some(attacker), Some(_)) = (state.board.get(from), state.board.get(to)) else {
            return Err(RuleError::InvalidAttack { from, to });
        };
        let burning = match attacker.state.buff(turn, BuffTag::Burning).map(|b| b.kind) {
            Some(BuffKind::Burning { damage, duration }) => Some((damage, duration)),
            _ => None,
        };
        (
            attacker.owner,
            attacker.def().attack_power + attacker.state.attack_bonus(turn),
            burning,
            attacker.state.has_buff(turn, BuffTag::Chain),
            attacker.def().has(Caps::AREA_ATTACK),
            attacker.state.has_buff(turn, BuffTag::Glory),
        )
    };
    let target_side = attacker_side.opponent();
    let mut report = AttackReport::new(from, to);

    // The strike is committed: one-shot stances are spent whatever happens next.
    if let Some(attacker) = state.board.get_mut(from) {
        attacker.state.remove_buff(BuffTag::DrawStance);
    }

    // 2. Guardian redirect
    if let Some(guardian_at) = find_guardian(state, to, target_side) {
        let hit = strike(state, guardian_at, damage);
        report.damage = hit.map_or(0, |h| h.damage);
        report.redirected_to = Some(guardian_at);
        report.outcome = if hit.is_some_and(|h| h.blocked) {
            AttackOutcome::Blocked
        } else {
            AttackOutcome::Damaged
        };
        consume_glory(state, from);
        report.casualties = remove_dead(state, &[guardian_at]);
        debug!(%from, %to, guardian = %guardian_at, damage = report.damage, "hit redirected to guardian");
        return Ok(report);
    }

    // 3. One-shot shield
    let shielded = state.board.get(to).is_some_and(|p| p.state.has_buff(turn, BuffTag::Shield));
    if shielded {
        if let Some(target) = state.board.get_mut(to) {
            target.state.remove_buff(BuffTag::Shield);
        }
        report.outcome = AttackOutcome::Blocked;
        consume_glory(state, from);
        debug!(%from, %to, "hit blocked by shield");
        return Ok(report);
    }

    // 4–5. Immunity, then damage
    if let Some(hit) = strike(state, to, damage) {
        report.damage = hit.damage;
    }

    // 6. Triggers
    if let Some((burn, duration)) = burning {
        state.ignite(CellEffect {
            at: to,
            damage: burn,
            expiry_turn: turn + duration,
            source: attacker_side,
        });
        report.ignited = Some(to);
    }

    let mut splash_cells: Vec<Coord> = Vec::new();
    if chain {
        let dir = from.direction_to(to);
        splash_cells.extend(dir.lateral().iter().filter_map(|&d| to.offset(d, 1)));
    }
    if area {
        splash_cells.extend(ORTHOGONAL.iter().filter_map(|&d| to.offset(d, 1)));
    }
    splash_cells.sort_unstable();
    splash_cells.dedup();
    for cell in splash_cells {
        if state.board.owner(cell) != Some(target_side) {
            continue;
        }
        if let Some(hit) = strike(state, cell, damage) {
            report.splash.push(hit);
        }
    }

    let reflect = match state.board.get(to).and_then(|p| p.state.buff(turn, BuffTag::Reflect)).map(|b| b.kind) {
        Some(BuffKind::Reflect { damage }) => Some(damage),
        _ => None,
    };
    if let Some(counter) = reflect {
        report.reflected = strike(state, from, counter);
    }

    if glory {
        if let Some(target) = state.board.get_mut(to).filter(|p| !p.state.is_dead()) {
            report.stripped_buffs = target.state.buffs.len();
            target.state.buffs.clear();
        }
        consume_glory(state, from);
    }

    // 7. Clear the dead
    let mut cells = vec![to];
    cells.extend(report.splash.iter().map(|h| h.at));
    cells.push(from);
    report.casualties = remove_dead(state, &cells);
    report.outcome = if report.casualties.iter().any(|c| c.at == to) {
        AttackOutcome::Defeated
    } else {
        AttackOutcome::Damaged
    };

    debug!(
        %from, %to,
        damage = report.damage,
        outcome = ?report.outcome,
        splash = report.splash.len(),
        casualties = report.casualties.len(),
        "attack resolved"
    );
    Ok(report)
}

/// Secondary damage (splash, reflection, area spells): a shield absorbs it
/// and is consumed, immunity zeroes it. Dead pieces stay on the board until
/// [`remove_dead`] runs.
pub fn strike(state: &mut GameState, at: Coord, damage: u32) -> Option<Hit> {
    let turn = state.turn;
    let piece = state.board.get_mut(at)?;
    let st = &mut piece.state;
    if st.has_buff(turn, BuffTag::Shield) {
        st.remove_buff(BuffTag::Shield);
        return Some(Hit { at, damage: 0, blocked: true });
    }
    let applied = if st.flags.damage_immune || st.has_buff(turn, BuffTag::DamageImmune) {
        0
    } else {
        damage
    };
    let dealt = st.take_damage(applied);
    arm_enrage(st, turn, dealt);
    Some(Hit { at, damage: dealt, blocked: false })
}

/// Removes every piece at 0 health among `cells`.
pub fn remove_dead(state: &mut GameState, cells: &[Coord]) -> Vec<Casualty> {
    let mut out = Vec::new();
    for &at in cells {
        if state.board.get(at).is_some_and(|p| p.state.is_dead()) {
            if let Some(casualty) = remove_piece(state, at) {
                out.push(casualty);
            }
        }
    }
    out
}

/// Clears a cell outright, regardless of health.
pub fn remove_piece(state: &mut GameState, at: Coord) -> Option<Casualty> {
    let piece = state.board.take(at)?;
    debug!(%at, id = piece.id, kind = %piece.kind, owner = %piece.owner, "piece removed");
    Some(Casualty { at, id: piece.id, kind: piece.kind, owner: piece.owner })
}

/// Any damage actually taken triggers a waiting Enrage.
pub(crate) fn arm_enrage(st: &mut UnitState, turn: u32, dealt: u32) {
    if dealt == 0 {
        return;
    }
    if let Some(buff) = st.buff_mut(turn, BuffTag::Enrage) {
        if let BuffKind::Enrage { triggered, .. } = &mut buff.kind {
            *triggered = true;
        }
    }
}

fn consume_glory(state: &mut GameState, from: Coord) {
    if let Some(attacker) = state.board.get_mut(from) {
        attacker.state.remove_buff(BuffTag::Glory);
    }
}

/// First ally of `target` (row-major) whose live guardian radius covers it.
fn find_guardian(state: &GameState, target: Coord, side: Side) -> Option<Coord> {
    let turn = state.turn;
    state.board.pieces()
        .filter(|(at, p)| *at != target && p.owner == side)
        .find(|(at, p)| match p.state.buff(turn, BuffTag::Guardian).map(|b| b.kind) {
            Some(BuffKind::Guardian { radius }) => at.chebyshev(target) <= radius,
            _ => false,
        })
        .map(|(at, _)| at)
}
