//! Property-based tests for the rule engine.
//!
//! Random legal play from the standard layout must keep every invariant,
//! and arbitrary (mostly illegal) actions must never change a state they
//! are rejected from.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tactics_engine::invariants::check_invariants;
use tactics_engine::{
    apply_action, create_initial_state, legal_attacks, legal_moves, player_view, reduce,
    standard_layout, Action, CardId, Coord, GameState, RulesConfig,
};

/// Plays `steps` random legal actions, ending the turn with probability ~1/6.
fn random_state(seed: u64, steps: usize) -> GameState {
    let mut state = create_initial_state(&standard_layout(), RulesConfig::default(), seed).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for _ in 0..steps {
        if state.is_over() {
            break;
        }
        let side = state.active;
        let mut actions = player_view(&state, side).legal_actions();
        actions.extend([Action::EndTurn; 2]);
        let action = *actions.choose(&mut rng).unwrap();
        apply_action(&mut state, side, action).unwrap();
    }
    state
}

/// Mostly on the board, sometimes just past its edge.
fn coord() -> impl Strategy<Value = Coord> {
    (0u8..10, 0u8..10).prop_map(|(row, col)| Coord { row, col })
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (coord(), coord()).prop_map(|(from, to)| Action::Move { from, to }),
        (coord(), coord()).prop_map(|(from, to)| Action::Attack { from, to }),
        (0usize..CardId::ALL.len(), proptest::option::of(coord()))
            .prop_map(|(i, target)| Action::PlayCard { card: CardId::ALL[i], target }),
        Just(Action::EndTurn),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every step of a random game leaves a sound state.
    #[test]
    fn prop_random_play_keeps_invariants(seed in any::<u64>(), steps in 0usize..300) {
        let mut state = create_initial_state(&standard_layout(), RulesConfig::default(), seed).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for _ in 0..steps {
            if state.is_over() {
                break;
            }
            let side = state.active;
            let mut actions = player_view(&state, side).legal_actions();
            actions.push(Action::EndTurn);
            let action = *actions.choose(&mut rng).unwrap();
            prop_assert!(apply_action(&mut state, side, action).is_ok(), "{:?} rejected", action);

            let violations = check_invariants(&state);
            prop_assert!(violations.is_empty(), "{:?}", violations);
            for (_, piece) in state.board.pieces() {
                prop_assert!(piece.state.current_health <= piece.state.max_health);
                prop_assert!(piece.state.current_health > 0);
            }
        }
    }

    /// Movement and attack queries are pure and only name sensible cells.
    #[test]
    fn prop_queries_idempotent(seed in any::<u64>(), steps in 0usize..200) {
        let state = random_state(seed, steps);
        for (at, piece) in state.board.pieces() {
            let moves = legal_moves(&state, at);
            prop_assert_eq!(&moves, &legal_moves(&state, at));
            prop_assert!(moves.iter().all(|&to| state.board.is_empty(to)));

            let attacks = legal_attacks(&state, at);
            prop_assert_eq!(&attacks, &legal_attacks(&state, at));
            prop_assert!(attacks.iter().all(|&to| state.board.owner(to) == Some(piece.owner.opponent())));
        }
    }

    /// A rejected action leaves the state untouched.
    #[test]
    fn prop_rejection_is_atomic(seed in any::<u64>(), steps in 0usize..120, action in action()) {
        let state = random_state(seed, steps);
        let side = state.active;
        let mut applied = state.clone();
        if apply_action(&mut applied, side, action).is_err() {
            prop_assert_eq!(&applied, &state);
        } else {
            let (reduced, _) = reduce(&state, side, action).unwrap();
            prop_assert_eq!(&reduced, &applied);
        }
    }

    /// Coordinates past the edge are refused and never reach a real cell.
    #[test]
    fn prop_off_board_actions_rejected(seed in any::<u64>(), steps in 0usize..120, action in action()) {
        let state = random_state(seed, steps);
        let off_board = match action {
            Action::Move { from, to } | Action::Attack { from, to } => !from.is_on_board() || !to.is_on_board(),
            Action::PlayCard { target: Some(at), .. } => !at.is_on_board(),
            _ => false,
        };
        prop_assume!(off_board);
        let mut applied = state.clone();
        prop_assert!(apply_action(&mut applied, state.active, action).is_err());
        prop_assert_eq!(&applied, &state);
    }

    /// After any end of turn nothing live has already run out.
    #[test]
    fn prop_no_stale_effects_after_end_turn(seed in any::<u64>(), steps in 0usize..200) {
        let mut state = random_state(seed, steps);
        prop_assume!(!state.is_over());
        let side = state.active;
        apply_action(&mut state, side, Action::EndTurn).unwrap();
        let turn = state.turn;
        for (_, piece) in state.board.pieces() {
            prop_assert!(piece.state.buffs.iter().all(|b| b.expiry_turn > turn));
            prop_assert!(piece.state.debuffs.iter().all(|d| d.expiry_turn > turn));
        }
        prop_assert!(state.cell_effects.iter().all(|e| e.expiry_turn > turn));
    }
}
