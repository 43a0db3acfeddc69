pub mod agent;
pub mod random;
pub mod heuristic;

pub use agent::Agent;
pub use random::RandomAgent;
pub use heuristic::HeuristicAgent;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tactics_engine::Side;

/// The policies the harness knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Random,
    Heuristic,
}

impl AgentKind {
    pub const ALL: [AgentKind; 2] = [AgentKind::Random, AgentKind::Heuristic];

    pub fn build(self, side: Side, seed: u64) -> Box<dyn Agent> {
        match self {
            AgentKind::Random => Box::new(RandomAgent::new(side, seed)),
            AgentKind::Heuristic => Box::new(HeuristicAgent::new(side, seed)),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AgentKind::Random => write!(f, "random"),
            AgentKind::Heuristic => write!(f, "heuristic"),
        }
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(AgentKind::Random),
            "heuristic" => Ok(AgentKind::Heuristic),
            other => Err(format!("unknown agent '{other}' (expected random or heuristic)")),
        }
    }
}
