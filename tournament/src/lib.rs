pub mod database;
pub mod runner;

pub use database::{Database, DbError, LeaderboardRow};
pub use runner::{run_game, run_series, GameResult, PlayerResult, RunError, Series};
