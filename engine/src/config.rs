// ═══════════════════════════════════════════════════════════════════════
// Rules configuration — action economy and hand limits
// ═══════════════════════════════════════════════════════════════════════

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Action points granted at the start of each side-turn.
    pub max_action_points: u8,
    pub move_cost: u8,
    pub attack_cost: u8,
    /// Cards a hand may hold; enforced when drawing.
    pub hand_capacity: usize,
    pub opening_hand: usize,
    pub draws_per_turn: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            max_action_points: 6,
            move_cost: 3,
            attack_cost: 2,
            hand_capacity: 5,
            opening_hand: 3,
            draws_per_turn: 1,
        }
    }
}

impl RulesConfig {
    /// Parse a JSON rules document. Missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: RulesConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_action_points == 0 {
            return Err(ConfigError::Invalid("max_action_points must be positive".into()));
        }
        if self.opening_hand > self.hand_capacity {
            return Err(ConfigError::Invalid(format!(
                "opening_hand {} exceeds hand_capacity {}",
                self.opening_hand, self.hand_capacity
            )));
        }
        Ok(())
    }
}
