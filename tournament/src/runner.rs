// ═══════════════════════════════════════════════════════════════════════
// Game Runner — runs complete headless games with agents
//
// The loop asks the active side's agent for an action, submits it to the
// engine and repeats until the engine records a victory. An agent with
// nothing affordable gets its turn passed for it. Games that reach the
// action limit are recorded as draws.
// ═══════════════════════════════════════════════════════════════════════

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tactics_agents::{Agent, AgentKind};
use tactics_engine::{
    apply_action, create_initial_state, player_view, Action, ActionOutcome, GameState, Layout,
    RuleError, RulesConfig, Side, WinReason,
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("game setup failed: {0}")]
    Setup(#[source] RuleError),

    #[error("no agent plays side {0}")]
    MissingAgent(Side),

    #[error("agent {agent} ({side}) failed to decide: {source}")]
    AgentFailed { agent: String, side: Side, source: RuleError },

    #[error("agent {agent} ({side}) submitted {action:?}: {source}")]
    Rejected { agent: String, side: Side, action: Action, source: RuleError },
}

/// Result of a completed (or truncated) game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResult {
    pub seed: u64,
    /// `None` when the action limit was reached first.
    pub winner: Option<Side>,
    pub reason: Option<WinReason>,
    pub turns: u32,
    pub actions: usize,
    pub player_results: Vec<PlayerResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerResult {
    pub side: Side,
    pub agent_name: String,
    pub final_units: u32,
    pub final_health: u32,
    pub cards_played: u32,
    pub passes: u32,
}

impl GameResult {
    pub fn player(&self, side: Side) -> Option<&PlayerResult> {
        self.player_results.iter().find(|p| p.side == side)
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Run a complete game. Each agent controls the side it reports.
pub fn run_game(
    agents: &mut [Box<dyn Agent>],
    layout: &Layout,
    config: RulesConfig,
    seed: u64,
    max_actions: usize, // safety limit against games that never resolve
) -> Result<GameResult, RunError> {
    let mut state = create_initial_state(layout, config, seed).map_err(RunError::Setup)?;
    for side in Side::ALL {
        if !agents.iter().any(|a| a.side() == side) {
            return Err(RunError::MissingAgent(side));
        }
    }

    let mut actions = 0;
    let mut cards_played = [0u32; 2];
    let mut passes = [0u32; 2];

    while state.victory.is_none() {
        if actions >= max_actions {
            warn!(seed, actions, turn = state.turn, "action limit reached, recording a draw");
            break;
        }
        let side = state.active;
        let agent = agents.iter_mut()
            .find(|a| a.side() == side)
            .ok_or(RunError::MissingAgent(side))?;

        let view = player_view(&state, side);
        let action = match agent.decide(&view) {
            Ok(action) => action,
            Err(RuleError::NoLegalAction) => {
                debug!(%side, turn = state.turn, "nothing affordable, passing");
                passes[side.index()] += 1;
                Action::EndTurn
            }
            Err(source) => {
                return Err(RunError::AgentFailed { agent: agent.name().to_string(), side, source });
            }
        };

        match apply_action(&mut state, side, action) {
            Ok(ActionOutcome::CardPlayed { .. }) => cards_played[side.index()] += 1,
            Ok(_) => {}
            Err(source) => {
                return Err(RunError::Rejected { agent: agent.name().to_string(), side, action, source });
            }
        }
        actions += 1;
    }

    let result = build_result(&state, agents, seed, actions, cards_played, passes);
    match state.victory {
        Some(v) => info!(seed, winner = %v.winner, reason = %v.reason, turns = v.turn, actions, "game finished"),
        None => info!(seed, turns = state.turn, actions, "game drawn"),
    }
    Ok(result)
}

fn build_result(
    state: &GameState,
    agents: &[Box<dyn Agent>],
    seed: u64,
    actions: usize,
    cards_played: [u32; 2],
    passes: [u32; 2],
) -> GameResult {
    let player_results = Side::ALL.iter()
        .map(|&side| {
            let (units, health) = state.board.pieces()
                .filter(|(_, p)| p.owner == side)
                .fold((0, 0), |(n, hp), (_, p)| (n + 1, hp + p.state.current_health));
            PlayerResult {
                side,
                agent_name: agents.iter()
                    .find(|a| a.side() == side)
                    .map(|a| a.name().to_string())
                    .unwrap_or_default(),
                final_units: units,
                final_health: health,
                cards_played: cards_played[side.index()],
                passes: passes[side.index()],
            }
        })
        .collect();

    GameResult {
        seed,
        winner: state.victory.map(|v| v.winner),
        reason: state.victory.map(|v| v.reason),
        turns: state.turn,
        actions,
        player_results,
    }
}

/// A batch of games between two policies.
#[derive(Debug, Clone)]
pub struct Series {
    /// `matchup[0]` plays side A in even games and side B in odd ones.
    pub matchup: [AgentKind; 2],
    pub layout: Layout,
    pub config: RulesConfig,
    pub base_seed: u64,
    pub games: u32,
    pub max_actions: usize,
}

impl Series {
    pub fn seed_for(&self, game: u32) -> u64 {
        self.base_seed.wrapping_add(u64::from(game) * 1000)
    }

    /// Policies for sides A and B in the given game.
    pub fn sides_for(&self, game: u32) -> [AgentKind; 2] {
        if game % 2 == 0 {
            self.matchup
        } else {
            [self.matchup[1], self.matchup[0]]
        }
    }
}

/// Play every game of the series in parallel. Results come back in game order.
pub fn run_series(series: &Series) -> Vec<Result<GameResult, RunError>> {
    (0..series.games)
        .into_par_iter()
        .map(|game| {
            let seed = series.seed_for(game);
            let kinds = series.sides_for(game);
            let mut agents: Vec<Box<dyn Agent>> = Side::ALL.iter()
                .map(|&side| kinds[side.index()].build(side, seed.wrapping_add(side.index() as u64 + 1)))
                .collect();
            run_game(&mut agents, &series.layout, series.config, seed, series.max_actions)
        })
        .collect()
}
