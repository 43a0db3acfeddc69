// ═══════════════════════════════════════════════════════════════════════
// Database — SQLite storage for tournament results and ELO ratings
// ═══════════════════════════════════════════════════════════════════════

use crate::runner::GameResult;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tactics_engine::Side;
use thiserror::Error;

pub const DEFAULT_ELO: f64 = 1500.0;
pub const DEFAULT_K: f64 = 32.0;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("unknown agent id {0}")]
    UnknownAgent(i64),
}

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub name: String,
    pub elo: f64,
    pub games: u32,
    pub wins: u32,
    pub draws: u32,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path.
    pub fn new(path: &str) -> DbResult<Self> {
        let db = Database { conn: Connection::open(path)? };
        db.create_schema()?;
        Ok(db)
    }

    /// In-memory database (useful for tests).
    pub fn in_memory() -> DbResult<Self> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.create_schema()?;
        Ok(db)
    }

    fn create_schema(&self) -> DbResult<()> {
        self.conn.execute_batch("
            CREATE TABLE IF NOT EXISTS agents (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE,
                elo         REAL NOT NULL DEFAULT 1500.0,
                games       INTEGER NOT NULL DEFAULT 0,
                wins        INTEGER NOT NULL DEFAULT 0,
                draws       INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS games (
                id          INTEGER PRIMARY KEY,
                seed        INTEGER NOT NULL,
                turns       INTEGER NOT NULL,
                actions     INTEGER NOT NULL,
                winner      TEXT,
                reason      TEXT,
                played_at   TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS game_players (
                id           INTEGER PRIMARY KEY,
                game_id      INTEGER NOT NULL REFERENCES games(id),
                agent_id     INTEGER NOT NULL REFERENCES agents(id),
                side         TEXT NOT NULL,
                units        INTEGER NOT NULL,
                health       INTEGER NOT NULL,
                cards_played INTEGER NOT NULL,
                passes       INTEGER NOT NULL
            );
        ")?;
        Ok(())
    }

    /// Register an agent (or return existing ID).
    pub fn register_agent(&self, name: &str) -> DbResult<i64> {
        self.conn.execute("INSERT OR IGNORE INTO agents (name) VALUES (?1)", params![name])?;
        let id = self.conn.query_row(
            "SELECT id FROM agents WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Store a finished game and bump per-agent counters.
    /// `agent_ids` maps each side to the registered agent that played it.
    pub fn store_game(&self, result: &GameResult, agent_ids: &[(Side, i64)]) -> DbResult<i64> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO games (seed, turns, actions, winner, reason) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                result.seed as i64,
                result.turns,
                result.actions as i64,
                result.winner.map(|s| s.to_string()),
                result.reason.map(|r| r.to_string()),
            ],
        )?;
        let game_id = tx.last_insert_rowid();

        for &(side, agent_id) in agent_ids {
            let Some(pr) = result.player(side) else { continue };
            tx.execute(
                "INSERT INTO game_players (game_id, agent_id, side, units, health, cards_played, passes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![game_id, agent_id, side.to_string(), pr.final_units, pr.final_health, pr.cards_played, pr.passes],
            )?;

            let won = result.winner == Some(side);
            tx.execute(
                "UPDATE agents SET games = games + 1, wins = wins + ?1, draws = draws + ?2 WHERE id = ?3",
                params![won as i64, result.is_draw() as i64, agent_id],
            )?;
        }

        tx.commit()?;
        Ok(game_id)
    }

    fn elo(&self, agent_id: i64) -> DbResult<f64> {
        self.conn
            .query_row("SELECT elo FROM agents WHERE id = ?1", params![agent_id], |row| row.get(0))
            .optional()?
            .ok_or(DbError::UnknownAgent(agent_id))
    }

    /// Standard two-player ELO update. `score_a` is 1.0 for a win by `a`,
    /// 0.5 for a draw and 0.0 for a loss.
    pub fn update_elo(&self, a: i64, b: i64, score_a: f64, k: f64) -> DbResult<()> {
        if a == b {
            return Ok(());
        }
        let elo_a = self.elo(a)?;
        let elo_b = self.elo(b)?;

        let expected_a = 1.0 / (1.0 + 10f64.powf((elo_b - elo_a) / 400.0));
        let delta = k * (score_a - expected_a);

        self.conn.execute("UPDATE agents SET elo = elo + ?1 WHERE id = ?2", params![delta, a])?;
        self.conn.execute("UPDATE agents SET elo = elo - ?1 WHERE id = ?2", params![delta, b])?;
        Ok(())
    }

    /// Register both agents of a game, store it and apply the rating change.
    pub fn record(&self, result: &GameResult) -> DbResult<i64> {
        let mut ids = Vec::with_capacity(2);
        for pr in &result.player_results {
            ids.push((pr.side, self.register_agent(&pr.agent_name)?));
        }
        let game_id = self.store_game(result, &ids)?;

        let id_of = |side: Side| ids.iter().find(|(s, _)| *s == side).map(|&(_, id)| id);
        if let (Some(a), Some(b)) = (id_of(Side::A), id_of(Side::B)) {
            let score_a = match result.winner {
                Some(Side::A) => 1.0,
                Some(Side::B) => 0.0,
                None => 0.5,
            };
            self.update_elo(a, b, score_a, DEFAULT_K)?;
        }
        Ok(game_id)
    }

    /// ELO leaderboard, best first.
    pub fn leaderboard(&self) -> DbResult<Vec<LeaderboardRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, elo, games, wins, draws FROM agents ORDER BY elo DESC, name ASC"
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(LeaderboardRow {
                name: row.get(0)?,
                elo: row.get(1)?,
                games: row.get(2)?,
                wins: row.get(3)?,
                draws: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Total number of games stored.
    pub fn game_count(&self) -> DbResult<u32> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::PlayerResult;
    use tactics_engine::WinReason;

    fn result(winner: Option<Side>, a: &str, b: &str) -> GameResult {
        let player = |side, name: &str| PlayerResult {
            side,
            agent_name: name.to_string(),
            final_units: 5,
            final_health: 300,
            cards_played: 2,
            passes: 0,
        };
        GameResult {
            seed: 42,
            winner,
            reason: winner.map(|_| WinReason::HeroDestroyed),
            turns: 30,
            actions: 120,
            player_results: vec![player(Side::A, a), player(Side::B, b)],
        }
    }

    #[test]
    fn test_register_agent_is_idempotent() {
        let db = Database::in_memory().unwrap();
        let id = db.register_agent("Heuristic").unwrap();
        assert_eq!(db.register_agent("Heuristic").unwrap(), id);
        assert_ne!(db.register_agent("Random").unwrap(), id);
    }

    #[test]
    fn test_record_updates_counts_and_elo() {
        let db = Database::in_memory().unwrap();
        db.record(&result(Some(Side::A), "Heuristic", "Random")).unwrap();
        assert_eq!(db.game_count().unwrap(), 1);

        let board = db.leaderboard().unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].name, "Heuristic");
        assert_eq!((board[0].games, board[0].wins), (1, 1));
        assert_eq!((board[1].games, board[1].wins), (1, 0));
        assert!((board[0].elo - (DEFAULT_ELO + DEFAULT_K / 2.0)).abs() < 1e-9);
        assert!((board[0].elo + board[1].elo - 2.0 * DEFAULT_ELO).abs() < 1e-9);
    }

    #[test]
    fn test_draw_between_equals_keeps_ratings() {
        let db = Database::in_memory().unwrap();
        db.record(&result(None, "Heuristic", "Random")).unwrap();
        for row in db.leaderboard().unwrap() {
            assert!((row.elo - DEFAULT_ELO).abs() < 1e-9);
            assert_eq!(row.draws, 1);
        }
    }

    #[test]
    fn test_self_play_leaves_rating_alone() {
        let db = Database::in_memory().unwrap();
        db.record(&result(Some(Side::B), "Random", "Random")).unwrap();
        let board = db.leaderboard().unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!((board[0].games, board[0].wins), (2, 1));
        assert!((board[0].elo - DEFAULT_ELO).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_agent_is_reported() {
        let db = Database::in_memory().unwrap();
        let a = db.register_agent("Random").unwrap();
        assert!(matches!(db.update_elo(a, 999, 1.0, DEFAULT_K), Err(DbError::UnknownAgent(999))));
    }
}
