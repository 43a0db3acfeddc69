// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for running games and tournaments
// ═══════════════════════════════════════════════════════════════════════

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tactics_agents::AgentKind;
use tactics_engine::{standard_layout, Layout, RulesConfig, Side};
use tactics_tournament::{run_game, run_series, Database, GameResult, Series};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tactics-runner", about = "Grid Tactics headless runner")]
struct Cli {
    /// JSON rules file overriding action point costs and hand sizes
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    /// JSON layout file replacing the standard armies and decks
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single game between two agents
    Play {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// Agent for side A: "random" or "heuristic"
        #[arg(short = 'a', long, default_value = "heuristic")]
        side_a: AgentKind,
        /// Agent for side B: "random" or "heuristic"
        #[arg(short = 'b', long, default_value = "random")]
        side_b: AgentKind,
        #[arg(long, default_value_t = 10_000)]
        max_actions: usize,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a series of games in parallel and store the results
    Tournament {
        #[arg(short, long, default_value_t = 100)]
        games: u32,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(short = 'a', long, default_value = "heuristic")]
        first: AgentKind,
        #[arg(short = 'b', long, default_value = "random")]
        second: AgentKind,
        #[arg(short, long, default_value = "results.db")]
        db: String,
        #[arg(long, default_value_t = 10_000)]
        max_actions: usize,
    },
    /// Show leaderboard from database
    Leaderboard {
        #[arg(short, long, default_value = "results.db")]
        db: String,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = load_setup(cli.rules.as_deref(), cli.layout.as_deref()).and_then(|(config, layout)| {
        match cli.command {
            Commands::Play { seed, side_a, side_b, max_actions, json } => {
                cmd_play(&layout, config, seed, [side_a, side_b], max_actions, json)
            }
            Commands::Tournament { games, seed, first, second, db, max_actions } => {
                let series = Series {
                    matchup: [first, second],
                    layout,
                    config,
                    base_seed: seed,
                    games,
                    max_actions,
                };
                cmd_tournament(&series, &db)
            }
            Commands::Leaderboard { db } => cmd_leaderboard(&db),
        }
    });

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_setup(rules: Option<&Path>, layout: Option<&Path>) -> Result<(RulesConfig, Layout), Box<dyn std::error::Error>> {
    let config = match rules {
        Some(path) => RulesConfig::load(path)?,
        None => RulesConfig::default(),
    };
    let layout = match layout {
        Some(path) => Layout::from_json(&std::fs::read_to_string(path)?)?,
        None => standard_layout(),
    };
    Ok((config, layout))
}

fn cmd_play(layout: &Layout, config: RulesConfig, seed: u64, kinds: [AgentKind; 2], max_actions: usize, json: bool) -> CliResult {
    let mut agents: Vec<_> = Side::ALL.iter()
        .map(|&side| kinds[side.index()].build(side, seed.wrapping_add(side.index() as u64 + 1)))
        .collect();
    let result = run_game(&mut agents, layout, config, seed, max_actions)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("=== Grid Tactics: {} (A) vs {} (B), seed={} ===\n", kinds[0], kinds[1], seed);
    print_result(&result);
    Ok(())
}

fn print_result(result: &GameResult) {
    match (result.winner, result.reason) {
        (Some(winner), Some(reason)) => println!("Winner: side {} ({})", winner, reason),
        _ => println!("Draw: action limit reached"),
    }
    println!("Turns: {}, actions: {}\n", result.turns, result.actions);
    for pr in &result.player_results {
        println!("  side {} {:10} -- units: {}, health: {}, cards played: {}, passes: {}",
            pr.side, pr.agent_name, pr.final_units, pr.final_health, pr.cards_played, pr.passes);
    }
}

fn cmd_tournament(series: &Series, db_path: &str) -> CliResult {
    println!("=== Tournament: {} games, {} vs {} ===\n", series.games, series.matchup[0], series.matchup[1]);

    let db = Database::new(db_path)?;
    let mut wins = [0u32; 2];
    let mut draws = 0u32;
    let mut errors = 0u32;

    for (game, outcome) in run_series(series).into_iter().enumerate() {
        match outcome {
            Ok(result) => {
                db.record(&result)?;
                match result.winner {
                    Some(side) => {
                        // matchup[0] plays side A in even games
                        let a_is_first = game % 2 == 0;
                        let first_won = (side == Side::A) == a_is_first;
                        wins[if first_won { 0 } else { 1 }] += 1;
                    }
                    None => draws += 1,
                }
            }
            Err(e) => {
                errors += 1;
                error!(game = game + 1, "{e}");
            }
        }
    }

    println!("--- Summary ({} games, {} errors) ---", series.games, errors);
    for (kind, w) in series.matchup.iter().zip(wins) {
        let pct = if series.games > 0 { w as f64 / series.games as f64 * 100.0 } else { 0.0 };
        println!("  {:10}: {:>4} wins ({:.1}%)", kind.to_string(), w, pct);
    }
    println!("  {:10}: {:>4}", "draws", draws);
    println!("\nResults saved to: {}", db_path);
    println!("Total games in DB: {}", db.game_count()?);
    Ok(())
}

fn cmd_leaderboard(db_path: &str) -> CliResult {
    let db = Database::new(db_path)?;
    let board = db.leaderboard()?;
    if board.is_empty() {
        println!("No agents found. Run some tournaments first.");
        return Ok(());
    }
    println!("=== Leaderboard ===\n");
    println!("{:<20} {:>8} {:>8} {:>8} {:>8}", "Agent", "ELO", "Games", "Wins", "Draws");
    println!("{}", "-".repeat(56));
    for row in &board {
        println!("{:<20} {:>8.1} {:>8} {:>8} {:>8}", row.name, row.elo, row.games, row.wins, row.draws);
    }
    Ok(())
}
