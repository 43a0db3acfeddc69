// ═══════════════════════════════════════════════════════════════════════
// Game Engine — action validation, commit and turn sequencing
//
// Architecture:
//   The engine is a pure state machine. It never does I/O or calls agents.
//   Every call validates the whole action before touching the state, so a
//   rejected action leaves the state exactly as it was.
//
// Flow:
//   1. Runner builds a PlayerView for the active side and asks its agent
//   2. Runner calls `apply_action(state, side, action)`
//   3. Move / Attack / PlayCard spend action points and commit immediately
//   4. EndTurn runs the scheduler, evaluates the win condition and hands
//      the turn to the other side
//   5. Repeat until state.victory is Some
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::CardId;
use crate::combat::{self, AttackOutcome, AttackReport};
use crate::error::{RuleError, RuleResult};
use crate::invariants;
use crate::rules;
use crate::scheduler::{self, SchedulerReport};
use crate::skills::{self, EffectReport};
use crate::types::*;
use crate::win::{self, WinEvaluation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Actions a side can submit on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Step to an empty cell, or charge into an enemy while a charge buff is live.
    Move { from: Coord, to: Coord },
    Attack { from: Coord, to: Coord },
    PlayCard { card: CardId, target: Option<Coord> },
    EndTurn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub ended: Side,
    /// The turn that is now current.
    pub turn: u32,
    pub scheduler: SchedulerReport,
    pub evaluation: WinEvaluation,
    /// Cards the incoming side drew.
    pub drawn: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Moved { from: Coord, to: Coord },
    /// `advanced` is set when the charger took the defeated target's cell.
    Charged { report: AttackReport, advanced: bool },
    Attacked(AttackReport),
    CardPlayed { card: CardId, target: Option<Coord>, effect: EffectReport },
    TurnEnded(TurnSummary),
}

/// Apply `side`'s action. On error nothing has changed.
pub fn apply_action(state: &mut GameState, side: Side, action: Action) -> RuleResult<ActionOutcome> {
    let result = dispatch(state, side, action);
    match &result {
        Ok(_) => {
            debug!(%side, ?action, turn = state.turn, "action committed");
            invariants::assert_invariants(state);
        }
        Err(err) => debug!(%side, ?action, %err, "action rejected"),
    }
    result
}

/// Pure form of [`apply_action`]: the input is untouched and the new state
/// is returned alongside the outcome.
pub fn reduce(state: &GameState, side: Side, action: Action) -> RuleResult<(GameState, ActionOutcome)> {
    let mut next = state.clone();
    let outcome = apply_action(&mut next, side, action)?;
    Ok((next, outcome))
}

fn dispatch(state: &mut GameState, side: Side, action: Action) -> RuleResult<ActionOutcome> {
    if state.is_over() {
        return Err(RuleError::GameOver);
    }
    if side != state.active {
        return Err(RuleError::OutOfTurn { side });
    }

    check_on_board(action)?;

    match action {
        Action::Move { from, to } => move_piece(state, side, from, to),
        Action::Attack { from, to } => attack(state, side, from, to),
        Action::PlayCard { card, target } => {
            let effect = skills::play_card(state, side, card, target)?;
            Ok(ActionOutcome::CardPlayed { card, target, effect })
        }
        Action::EndTurn => Ok(ActionOutcome::TurnEnded(end_turn(state, side))),
    }
}

/// Coordinates arrive from outside (agents, JSON); anything off the board
/// is rejected before it can reach the board storage.
fn check_on_board(action: Action) -> RuleResult<()> {
    match action {
        Action::Move { from, to } if !(from.is_on_board() && to.is_on_board()) => {
            Err(RuleError::InvalidMove { from, to })
        }
        Action::Attack { from, to } if !(from.is_on_board() && to.is_on_board()) => {
            Err(RuleError::InvalidAttack { from, to })
        }
        Action::PlayCard { card, target: Some(at) } if !at.is_on_board() => {
            Err(RuleError::InvalidSkillTarget { card, target: Some(at) })
        }
        _ => Ok(()),
    }
}

fn require_action_points(state: &GameState, side: Side, required: u8) -> RuleResult<()> {
    let available = state.player(side).action_points;
    if available < required {
        return Err(RuleError::InsufficientActionPoints { required, available });
    }
    Ok(())
}

fn move_piece(state: &mut GameState, side: Side, from: Coord, to: Coord) -> RuleResult<ActionOutcome> {
    if state.board.owner(from) != Some(side) {
        return Err(RuleError::InvalidMove { from, to });
    }
    let charge = rules::is_valid_charge(state, from, to);
    if !charge && !rules::is_valid_move(state, from, to) {
        return Err(RuleError::InvalidMove { from, to });
    }
    let cost = state.config.move_cost;
    require_action_points(state, side, cost)?;

    if charge {
        let report = combat::resolve_attack(state, from, to)?;
        state.player_mut(side).action_points -= cost;
        let advanced = report.outcome == AttackOutcome::Defeated && state.board.relocate(from, to);
        let at = if advanced { to } else { from };
        if let Some(piece) = state.board.get_mut(at) {
            piece.state.has_moved = true;
        }
        return Ok(ActionOutcome::Charged { report, advanced });
    }

    state.board.relocate(from, to);
    if let Some(piece) = state.board.get_mut(to) {
        piece.state.has_moved = true;
    }
    state.player_mut(side).action_points -= cost;
    Ok(ActionOutcome::Moved { from, to })
}

fn attack(state: &mut GameState, side: Side, from: Coord, to: Coord) -> RuleResult<ActionOutcome> {
    if state.board.owner(from) != Some(side) || !rules::is_valid_attack(state, from, to) {
        return Err(RuleError::InvalidAttack { from, to });
    }
    let cost = state.config.attack_cost;
    require_action_points(state, side, cost)?;

    let report = combat::resolve_attack(state, from, to)?;
    state.player_mut(side).action_points -= cost;
    Ok(ActionOutcome::Attacked(report))
}

fn end_turn(state: &mut GameState, side: Side) -> TurnSummary {
    let new_turn = state.turn + 1;
    let scheduler = scheduler::advance_turn(state, new_turn);
    let evaluation = win::evaluate(state, side);
    state.player_mut(side).action_points = 0;

    let mut drawn = 0;
    match evaluation {
        WinEvaluation::Decided(victory) => {
            state.victory = Some(victory);
            info!(winner = %victory.winner, reason = %victory.reason, turn = victory.turn, "game decided");
        }
        WinEvaluation::Ongoing => {
            let next = side.opponent();
            let config = state.config;
            state.active = next;
            let player = state.player_mut(next);
            player.action_points = config.max_action_points;
            drawn = player.draw(config.draws_per_turn, config.hand_capacity);
            info!(ended = %side, next = %next, turn = new_turn, drawn, "turn ended");
        }
    }

    TurnSummary { ended: side, turn: new_turn, scheduler, evaluation, drawn }
}
