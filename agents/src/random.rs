// ═══════════════════════════════════════════════════════════════════════
// Random Agent — picks uniformly among every legal action.
// Serves as baseline and for testing game engine stability.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{ensure_turn, Agent};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tactics_engine::{Action, PlayerView, RuleError, Side};

pub struct RandomAgent {
    side: Side,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(side: Side, seed: u64) -> Self {
        RandomAgent {
            side,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str { "Random" }
    fn side(&self) -> Side { self.side }

    fn decide(&mut self, view: &PlayerView) -> Result<Action, RuleError> {
        ensure_turn(view, self.side)?;
        let mut options = view.legal_actions();
        if options.is_empty() {
            return Err(RuleError::NoLegalAction);
        }
        options.push(Action::EndTurn);
        options.choose(&mut self.rng).copied().ok_or(RuleError::NoLegalAction)
    }
}
