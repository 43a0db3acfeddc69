// ═══════════════════════════════════════════════════════════════════════
// Agent Trait — interface that every opponent policy implements
//
// KEY DESIGN PRINCIPLE:
//   Agents receive a `PlayerView` (not raw GameState), which only
//   contains information the side is allowed to see.
//   This enforces information hiding at the type level.
//
//   The agent never gets to see:
//     - The opponent's hand
//     - Deck order, for either side
// ═══════════════════════════════════════════════════════════════════════

use tactics_engine::{Action, PlayerView, RuleError, Side};

/// Trait that all opponent policies implement.
pub trait Agent: Send + Sync {
    /// Human-readable name for this agent (e.g., "Random", "Heuristic").
    fn name(&self) -> &str;

    /// The side this agent is playing.
    fn side(&self) -> Side;

    /// Pick the next action for the active side.
    ///
    /// Returns `Err(RuleError::NoLegalAction)` when nothing is affordable;
    /// the game loop then passes the turn on the agent's behalf.
    fn decide(&mut self, view: &PlayerView) -> Result<Action, RuleError>;
}

/// Rejects a view that does not belong to `side` on its own turn.
pub(crate) fn ensure_turn(view: &PlayerView, side: Side) -> Result<(), RuleError> {
    if view.victory.is_some() {
        return Err(RuleError::GameOver);
    }
    if view.viewer != side || !view.is_my_turn() {
        return Err(RuleError::OutOfTurn { side });
    }
    Ok(())
}
