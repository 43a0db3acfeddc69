// ═══════════════════════════════════════════════════════════════════════
// Rule engine — legal destinations and legal attack targets
//
// Every query here is a pure function of (board, turn, position). The same
// walk serves every unit type; capability flags decide where a ray stops.
// The crab, the royal guard and the forward-three striker are the only
// geometric special cases.
// ═══════════════════════════════════════════════════════════════════════

use crate::catalog::Caps;
use crate::types::*;

/// Movement rays `(direction, range)` for the piece, after buffs and debuffs.
/// Empty when the piece cannot move at all.
pub fn move_rays(piece: &Piece, turn: u32) -> Vec<(Dir, u8)> {
    let def = piece.def();
    let state = &piece.state;
    if def.has(Caps::IMMOBILE)
        || state.flags.cannot_move
        || state.has_debuff(turn, DebuffTag::Rooted)
    {
        return Vec::new();
    }

    let bonus = match state.buff(turn, BuffTag::Charge).map(|b| b.kind) {
        Some(BuffKind::Charge { move_bonus, .. }) => move_bonus,
        _ => 0,
    };
    let penalty = match state.debuff(turn, DebuffTag::Slow).map(|d| d.kind) {
        Some(DebuffKind::Slow { penalty }) => penalty,
        _ => 0,
    };
    let adjust = |base: u8| -> u8 {
        let boosted = base.saturating_add(bonus);
        if penalty > 0 {
            boosted.saturating_sub(penalty).max(1)
        } else {
            boosted
        }
    };

    if def.has(Caps::CRAB_MOVE) {
        let lateral = adjust(def.move_range);
        let vertical = adjust(1);
        return vec![
            (Dir::LEFT, lateral),
            (Dir::RIGHT, lateral),
            (Dir::UP, vertical),
            (Dir::DOWN, vertical),
        ];
    }

    let base = if def.has(Caps::FIRST_MOVE_DOUBLE) && !state.has_moved {
        def.move_range + 1
    } else {
        def.move_range
    };
    let range = adjust(base);
    def.move_dirs.iter().map(|&d| (d, range)).collect()
}

/// Empty cells the piece at `from` may move to.
pub fn legal_moves(state: &GameState, from: Coord) -> Vec<Coord> {
    let Some(piece) = state.board.get(from) else {
        return Vec::new();
    };
    let through_allies = piece.def().has(Caps::CAN_MOVE_THROUGH_ALLIES);

    let mut out = Vec::new();
    for (dir, range) in move_rays(piece, state.turn) {
        for step in 1..=range {
            let Some(cell) = from.offset(dir, step) else { break };
            match state.board.get(cell) {
                None => out.push(cell),
                Some(other) if through_allies && other.owner == piece.owner => continue,
                Some(_) => break,
            }
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// Enemy cells a charging piece may drive into: the first enemy along each
/// movement ray, within range. Requires a live charge buff, and a charge is
/// an attack, so anything that forbids attacking forbids charging too.
pub fn charge_targets(state: &GameState, from: Coord) -> Vec<Coord> {
    let Some(piece) = state.board.get(from) else {
        return Vec::new();
    };
    if !piece.state.has_buff(state.turn, BuffTag::Charge) || !can_strike(piece, state.turn) {
        return Vec::new();
    }
    let through_allies = piece.def().has(Caps::CAN_MOVE_THROUGH_ALLIES);

    let mut out = Vec::new();
    for (dir, range) in move_rays(piece, state.turn) {
        for step in 1..=range {
            let Some(cell) = from.offset(dir, step) else { break };
            match state.board.get(cell) {
                None => continue,
                Some(other) if other.owner == piece.owner => {
                    if through_allies {
                        continue;
                    }
                    break;
                }
                Some(other) => {
                    if !other.state.is_cloaked(state.turn) {
                        out.push(cell);
                    }
                    break;
                }
            }
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// Enemy cells the piece at `from` may attack.
pub fn legal_attacks(state: &GameState, from: Coord) -> Vec<Coord> {
    let Some(piece) = state.board.get(from) else {
        return Vec::new();
    };
    let def = piece.def();
    let turn = state.turn;
    if !can_strike(piece, turn) {
        return Vec::new();
    }

    let is_target = |cell: Coord| {
        state.board.get(cell)
            .is_some_and(|p| p.owner != piece.owner && !p.state.is_cloaked(turn))
    };

    let mut out = Vec::new();

    if def.has(Caps::FORWARD_ONLY_ATTACK) {
        let lanes: Vec<Lane> = match piece.state.buff(turn, BuffTag::DrawStance).map(|b| b.kind) {
            Some(BuffKind::DrawStance { lane, .. }) => vec![lane],
            _ => Lane::ALL.to_vec(),
        };
        for lane in lanes {
            let cell = Coord::checked(
                i16::from(from.row) + i16::from(piece.owner.forward()),
                i16::from(from.col) + i16::from(lane.dc()),
            );
            if let Some(cell) = cell.filter(|&c| is_target(c)) {
                out.push(cell);
            }
        }
        out.sort_unstable();
        return out;
    }

    let over_pieces = def.has(Caps::CAN_ATTACK_OVER_PIECES);
    let needs_ally = def.has(Caps::REQUIRES_ALLY_IN_FRONT);
    let min_distance = def.effective_min_distance();

    for &dir in def.attack_dirs {
        for step in 1..=def.attack_range {
            let Some(cell) = from.offset(dir, step) else { break };
            let occupant = state.board.get(cell);

            if step < min_distance {
                if occupant.is_some() && !over_pieces {
                    break;
                }
                continue;
            }

            match occupant {
                None => continue,
                Some(other) if other.owner == piece.owner => {
                    if over_pieces {
                        continue;
                    }
                    break;
                }
                Some(_) => {
                    let covered = !needs_ally || ally_between(state, from, dir, step, piece.owner);
                    if covered && is_target(cell) {
                        out.push(cell);
                    }
                    if !over_pieces {
                        break;
                    }
                }
            }
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

fn can_strike(piece: &Piece, turn: u32) -> bool {
    piece.def().attack_range > 0
        && !piece.state.flags.cannot_attack
        && !piece.state.has_debuff(turn, DebuffTag::Disarmed)
}

/// Whether a `side` occupant stands strictly between `from` and the cell
/// `step` cells along `dir`.
fn ally_between(state: &GameState, from: Coord, dir: Dir, step: u8, side: Side) -> bool {
    (1..step).any(|s| {
        from.offset(dir, s)
            .and_then(|c| state.board.owner(c))
            .is_some_and(|owner| owner == side)
    })
}

pub fn is_valid_move(state: &GameState, from: Coord, to: Coord) -> bool {
    legal_moves(state, from).contains(&to)
}

pub fn is_valid_charge(state: &GameState, from: Coord, to: Coord) -> bool {
    charge_targets(state, from).contains(&to)
}

pub fn is_valid_attack(state: &GameState, from: Coord, to: Coord) -> bool {
    legal_attacks(state, from).contains(&to)
}
