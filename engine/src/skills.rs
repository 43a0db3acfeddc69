// ═══════════════════════════════════════════════════════════════════════
// Skill resolver — card playability, targeting, effect application
//
// A card is a targeting archetype plus one `Effect` variant. Targeting is
// computed here from the archetype alone; effects go through a handful of
// generic appliers so adding a card never adds a code path.
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::{card_def, CardDef, CardId, Effect, TargetRule};
use crate::combat::{self, Casualty, Hit};
use crate::error::{RuleError, RuleResult};
use crate::scheduler;
use crate::types::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What a played card did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectReport {
    BuffAttached { at: Coord, buff: BuffTag, expiry_turn: u32 },
    DebuffAttached { at: Coord, debuff: DebuffTag, expiry_turn: u32 },
    /// The kind was already live on the target; nothing changed.
    AlreadyActive { at: Coord },
    Healed { at: Coord, amount: u32 },
    Spawned { at: Coord, id: u32, kind: UnitKind, expiry_turn: u32 },
    AreaDamage { hits: Vec<Hit>, casualties: Vec<Casualty> },
    /// Number of allies that received the buff.
    Rallied { count: usize },
}

fn owns_required(state: &GameState, side: Side, def: &CardDef) -> bool {
    state.board.pieces()
        .any(|(_, p)| p.owner == side && def.required.contains(&p.kind))
}

/// Enough action points, and a required unit on the board if the card names any.
pub fn check_playable(state: &GameState, side: Side, card: CardId) -> RuleResult<()> {
    let def = card_def(card);
    let available = state.player(side).action_points;
    if available < def.cost {
        return Err(RuleError::InsufficientActionPoints { required: def.cost, available });
    }
    if !def.required.is_empty() && !owns_required(state, side, def) {
        return Err(RuleError::MissingRequiredUnit { card });
    }
    Ok(())
}

pub fn can_play(state: &GameState, side: Side, card: CardId) -> bool {
    check_playable(state, side, card).is_ok()
}

/// Cells `side` may aim `card` at. Empty for untargeted cards.
pub fn valid_targets(state: &GameState, side: Side, card: CardId) -> Vec<Coord> {
    let def = card_def(card);
    let turn = state.turn;
    let visible = |p: &Piece| !p.state.is_cloaked(turn);

    let mut out: Vec<Coord> = match def.target {
        TargetRule::NoTarget => Vec::new(),
        TargetRule::AllyOfRequiredType => state.board.pieces()
            .filter(|(_, p)| p.owner == side && def.required.contains(&p.kind) && visible(p))
            .map(|(at, _)| at)
            .collect(),
        TargetRule::AnyAlly => state.board.pieces()
            .filter(|(_, p)| p.owner == side && visible(p))
            .map(|(at, _)| at)
            .collect(),
        TargetRule::AnyEnemy => state.board.pieces()
            .filter(|(_, p)| p.owner != side && visible(p))
            .map(|(at, _)| at)
            .collect(),
        TargetRule::EmptyHomeCell => Coord::all()
            .filter(|&at| side.is_home_row(at.row) && state.board.is_empty(at))
            .collect(),
        TargetRule::EnemyBasicNearController { radius } => {
            let controllers: Vec<Coord> = state.board.pieces()
                .filter(|(_, p)| p.owner == side && def.required.contains(&p.kind))
                .map(|(at, _)| at)
                .collect();
            state.board.pieces()
                .filter(|(_, p)| {
                    p.owner != side && p.def().category == Category::Basic && visible(p)
                })
                .filter(|(at, _)| controllers.iter().any(|c| c.chebyshev(*at) <= radius))
                .map(|(at, _)| at)
                .collect()
        }
    };
    out.sort_unstable();
    out
}

/// Validate and play `card` from `side`'s hand. Nothing changes on error.
pub fn play_card(
    state: &mut GameState,
    side: Side,
    card: CardId,
    target: Option<Coord>,
) -> RuleResult<EffectReport> {
    if !state.player(side).hand.contains(&card) {
        return Err(RuleError::CardNotInHand { card });
    }
    check_playable(state, side, card)?;
    validate_target(state, side, card, target)?;

    let report = apply_effect(state, side, card, target)?;

    let def = card_def(card);
    let player = state.player_mut(side);
    player.action_points -= def.cost;
    if let Some(pos) = player.hand.iter().position(|&c| c == card) {
        player.hand.remove(pos);
    }
    player.discard.push(card);

    debug!(%side, ?card, ?target, ?report, "card played");
    Ok(report)
}

fn validate_target(state: &GameState, side: Side, card: CardId, target: Option<Coord>) -> RuleResult<()> {
    let def = card_def(card);
    if def.target == TargetRule::NoTarget {
        return match target {
            None => Ok(()),
            Some(_) => Err(RuleError::InvalidSkillTarget { card, target }),
        };
    }

    let targets = valid_targets(state, side, card);
    if targets.is_empty() {
        if let TargetRule::EnemyBasicNearController { radius } = def.target {
            warn!(%side, ?card, radius, "no enemy basic unit within reach of a controller");
        }
        return Err(RuleError::NoValidTargets { card });
    }
    match target {
        Some(at) if targets.contains(&at) => Ok(()),
        _ => Err(RuleError::InvalidSkillTarget { card, target }),
    }
}

/// Apply the card's effect without spending anything. Targets are assumed
/// valid; a missing target or occupant is reported as `InvalidSkillTarget`.
pub fn apply_effect(
    state: &mut GameState,
    side: Side,
    card: CardId,
    target: Option<Coord>,
) -> RuleResult<EffectReport> {
    let def = card_def(card);
    let turn = state.turn;
    let expiry_turn = turn + def.duration;
    let invalid = || RuleError::InvalidSkillTarget { card, target };

    match def.effect {
        Effect::BuffAllAllies(kind) => {
            let mut count = 0;
            for (_, piece) in state.board.pieces_mut() {
                if piece.owner == side
                    && piece.def().category != Category::Structure
                    && piece.state.attach_buff(turn, kind, expiry_turn)
                {
                    count += 1;
                }
            }
            Ok(EffectReport::Rallied { count })
        }
        Effect::AttachBuff(kind) => {
            let at = target.ok_or_else(invalid)?;
            let piece = state.board.get_mut(at).ok_or_else(invalid)?;
            if !piece.state.attach_buff(turn, kind, expiry_turn) {
                return Ok(EffectReport::AlreadyActive { at });
            }
            if kind.tag() == BuffTag::FrostAura {
                scheduler::propagate_auras(state);
            }
            Ok(EffectReport::BuffAttached { at, buff: kind.tag(), expiry_turn })
        }
        Effect::AttachDebuff(kind) => {
            let at = target.ok_or_else(invalid)?;
            let piece = state.board.get_mut(at).ok_or_else(invalid)?;
            if !piece.state.attach_debuff(turn, kind, expiry_turn) {
                return Ok(EffectReport::AlreadyActive { at });
            }
            Ok(EffectReport::DebuffAttached { at, debuff: kind.tag(), expiry_turn })
        }
        Effect::HealToFull => {
            let at = target.ok_or_else(invalid)?;
            let st = &mut state.board.get_mut(at).ok_or_else(invalid)?.state;
            let amount = st.max_health - st.current_health;
            st.current_health = st.max_health;
            st.injured = false;
            Ok(EffectReport::Healed { at, amount })
        }
        Effect::SpawnDerivative(kind) => {
            let at = target.ok_or_else(invalid)?;
            let id = state.spawn(at, kind, side).map_err(|_| invalid())?;
            if let Some(piece) = state.board.get_mut(at) {
                piece.state.flags = StateFlags {
                    is_wall: kind == UnitKind::Wall,
                    is_derivative: true,
                    cannot_move: true,
                    cannot_attack: true,
                    damage_immune: false,
                };
                piece.state.derivative_expiry = Some(expiry_turn);
            }
            Ok(EffectReport::Spawned { at, id, kind, expiry_turn })
        }
        Effect::AreaDamage { damage, radius } => {
            let at = target.ok_or_else(invalid)?;
            let cells: Vec<Coord> = state.board.pieces()
                .filter(|(c, p)| p.owner != side && c.chebyshev(at) <= radius)
                .map(|(c, _)| c)
                .collect();
            let hits: Vec<Hit> = cells.iter()
                .filter_map(|&c| combat::strike(state, c, damage))
                .collect();
            let casualties = combat::remove_dead(state, &cells);
            Ok(EffectReport::AreaDamage { hits, casualties })
        }
    }
}
