pub mod types;
pub mod catalog;
pub mod cards;
pub mod config;
pub mod error;
pub mod rules;
pub mod combat;
pub mod scheduler;
pub mod skills;
pub mod win;
pub mod invariants;
pub mod setup;
pub mod engine;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use types::*;
pub use cards::{card_def, CardId};
pub use catalog::{unit_def, Caps, UnitDef};
pub use config::RulesConfig;
pub use error::{ConfigError, RuleError, RuleResult};
pub use engine::{apply_action, reduce, Action, ActionOutcome};
pub use rules::{charge_targets, legal_attacks, legal_moves};
pub use skills::{can_play, valid_targets};
pub use setup::{create_initial_state, standard_layout, Layout, Placement};
pub use visibility::{player_view, PlayerView};
