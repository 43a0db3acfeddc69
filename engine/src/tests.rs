// ═══════════════════════════════════════════════════════════════════════
// Test suite for the grid tactics engine
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::cards::CardId;
    use crate::combat::AttackOutcome;
    use crate::config::RulesConfig;
    use crate::engine::{apply_action, reduce, Action, ActionOutcome};
    use crate::error::RuleError;
    use crate::invariants::check_invariants;
    use crate::rules::{charge_targets, legal_attacks, legal_moves};
    use crate::scheduler::advance_turn;
    use crate::setup::{create_initial_state, standard_layout};
    use crate::skills::{can_play, valid_targets, EffectReport};
    use crate::types::*;
    use crate::visibility::player_view;
    use crate::win::{evaluate, WinEvaluation};

    // ── Helpers: hand-built boards ───────────────────────────────────────

    fn c(row: u8, col: u8) -> Coord {
        Coord::new(row, col)
    }

    /// Empty board, side A to act with full action points, no cards anywhere.
    fn blank() -> GameState {
        let config = RulesConfig::default();
        let mut state = GameState {
            config,
            turn: 1,
            active: Side::A,
            board: Board::empty(),
            cell_effects: Vec::new(),
            players: [PlayerState::new(Side::A, Vec::new()), PlayerState::new(Side::B, Vec::new())],
            next_piece_id: 1,
            seed: 0,
            victory: None,
        };
        state.player_mut(Side::A).action_points = config.max_action_points;
        state
    }

    /// Blank board plus a castle and a warlord per side, tucked in the corners
    /// so ending turns never decides the game.
    fn armies() -> GameState {
        let mut state = blank();
        put(&mut state, c(7, 4), UnitKind::Castle, Side::A);
        put(&mut state, c(7, 7), UnitKind::Warlord, Side::A);
        put(&mut state, c(0, 4), UnitKind::Castle, Side::B);
        put(&mut state, c(0, 7), UnitKind::Warlord, Side::B);
        state
    }

    fn put(state: &mut GameState, at: Coord, kind: UnitKind, side: Side) -> Coord {
        state.spawn(at, kind, side).expect("cell already occupied");
        at
    }

    fn buff(state: &mut GameState, at: Coord, kind: BuffKind, duration: u32) {
        let turn = state.turn;
        assert!(state.board.get_mut(at).unwrap().state.attach_buff(turn, kind, turn + duration));
    }

    fn debuff(state: &mut GameState, at: Coord, kind: DebuffKind, duration: u32) {
        let turn = state.turn;
        assert!(state.board.get_mut(at).unwrap().state.attach_debuff(turn, kind, turn + duration));
    }

    fn health(state: &GameState, at: Coord) -> u32 {
        state.piece(at).expect("no piece there").state.current_health
    }

    fn give(state: &mut GameState, side: Side, cards: &[CardId]) {
        state.player_mut(side).hand.extend_from_slice(cards);
    }

    fn attack(state: &mut GameState, from: Coord, to: Coord) -> crate::combat::AttackReport {
        let side = state.active;
        match apply_action(state, side, Action::Attack { from, to }) {
            Ok(ActionOutcome::Attacked(report)) => report,
            other => panic!("expected an attack, got {other:?}"),
        }
    }

    fn play(state: &mut GameState, card: CardId, target: Option<Coord>) -> Result<EffectReport, RuleError> {
        let side = state.active;
        apply_action(state, side, Action::PlayCard { card, target }).map(|outcome| match outcome {
            ActionOutcome::CardPlayed { effect, .. } => effect,
            other => panic!("expected a card outcome, got {other:?}"),
        })
    }

    fn end_turn(state: &mut GameState) {
        let side = state.active;
        apply_action(state, side, Action::EndTurn).unwrap();
    }

    /// Random legal play, checking invariants after every action.
    fn play_random_game(seed: u64, max_actions: usize) -> GameState {
        use rand::seq::SliceRandom;
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        let mut state = create_initial_state(&standard_layout(), RulesConfig::default(), seed).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for _ in 0..max_actions {
            if state.is_over() {
                break;
            }
            let side = state.active;
            let actions = player_view(&state, side).legal_actions();
            let action = match actions.choose(&mut rng) {
                Some(&a) if !rng.gen_bool(0.15) => a,
                _ => Action::EndTurn,
            };
            if let Err(e) = apply_action(&mut state, side, action) {
                panic!("legal action {action:?} rejected: {e}");
            }
            let violations = check_invariants(&state);
            assert!(violations.is_empty(), "{violations:?}");
        }
        state
    }

    // ═════════════════════════════════════════════════════════════════════
    // SETUP TESTS
    // ═════════════════════════════════════════════════════════════════════

    #[test]
    fn test_initial_state() {
        let state = create_initial_state(&standard_layout(), RulesConfig::default(), 42).unwrap();
        assert_eq!(state.turn, 1);
        assert_eq!(state.active, Side::A);
        assert!(state.victory.is_none());
        assert!(state.cell_effects.is_empty());
        assert!(check_invariants(&state).is_empty());
        // Owners come from the layout, never from rows
        for (at, piece) in state.board.pieces() {
            assert_eq!(piece.owner == Side::A, at.row >= 6, "{} at {at}", piece.kind);
        }
    }

    #[test]
    fn test_initial_legal_moves() {
        let state = create_initial_state(&standard_layout(), RulesConfig::default(), 42).unwrap();
        // Back rank is boxed in, except the cavalry which rides through its front rank
        assert!(legal_moves(&state, c(7, 3)).is_empty());
        assert_eq!(legal_moves(&state, c(7, 1)), vec![c(4, 1), c(5, 1)]);
        // Front-rank guard gets two cells on its first move
        assert_eq!(legal_moves(&state, c(6, 1)), vec![c(4, 1), c(5, 1)]);
    }

    // ═════════════════════════════════════════════════════════════════════
    // MOVEMENT TESTS
    // ═════════════════════════════════════════════════════════════════════

    #[test]
    fn test_scenario_guard_first_move_double() {
        let mut state = blank();
        let guard = put(&mut state, c(6, 1), UnitKind::RoyalGuard, Side::A);

        let first = legal_moves(&state, guard);
        assert!(first.contains(&c(4, 1)));
        assert!(first.contains(&c(6, 3)));

        apply_action(&mut state, Side::A, Action::Move { from: guard, to: c(5, 1) }).unwrap();
        assert!(state.piece(c(5, 1)).unwrap().state.has_moved);
        assert_eq!(legal_moves(&state, c(5, 1)), vec![c(4, 1), c(5, 0), c(5, 2), c(6, 1)]);
        assert!(!legal_moves(&state, c(5, 1)).contains(&c(3, 1)));
    }

    #[test]
    fn test_crab_moves_wide_not_tall() {
        let mut state = blank();
        let crab = put(&mut state, c(4, 4), UnitKind::Crab, Side::A);
        assert_eq!(
            legal_moves(&state, crab),
            vec![c(3, 4), c(4, 1), c(4, 2), c(4, 3), c(4, 5), c(4, 6), c(4, 7), c(5, 4)]
        );
    }

    #[test]
    fn test_cavalry_rides_through_allies() {
        let mut state = blank();
        let cavalry = put(&mut state, c(7, 1), UnitKind::Cavalry, Side::A);
        put(&mut state, c(6, 1), UnitKind::Footman, Side::A);
        put(&mut state, c(4, 1), UnitKind::Footman, Side::B);

        let moves = legal_moves(&state, cavalry);
        assert!(moves.contains(&c(5, 1)));
        assert!(!moves.contains(&c(6, 1)), "friendly cells are never destinations");
        assert!(!moves.contains(&c(4, 1)), "enemies stop the ray");
    }

    #[test]
    fn test_allies_block_ordinary_units() {
        let mut state = blank();
        let footman = put(&mut state, c(6, 0), UnitKind::Footman, Side::A);
        put(&mut state, c(5, 0), UnitKind::Footman, Side::A);
        put(&mut state, c(6, 1), UnitKind::Footman, Side::A);
        assert_eq!(legal_moves(&state, footman), vec![c(7, 0)]);
    }

    #[test]
    fn test_rooted_and_immobile() {
        let mut state = blank();
        let footman = put(&mut state, c(5, 5), UnitKind::Footman, Side::A);
        let castle = put(&mut state, c(7, 4), UnitKind::Castle, Side::A);
        assert!(legal_moves(&state, castle).is_empty());

        debuff(&mut state, footman, DebuffKind::Rooted, 2);
        assert!(legal_moves(&state, footman).is_empty());
    }

    #[test]
    fn test_slow_floors_range_at_one() {
        let mut state = blank();
        let cavalry = put(&mut state, c(4, 0), UnitKind::Cavalry, Side::A);
        debuff(&mut state, cavalry, DebuffKind::Slow { penalty: 5 }, 2);
        assert_eq!(legal_moves(&state, cavalry), vec![c(3, 0), c(4, 1), c(5, 0)]);
    }

    #[test]
    fn test_charge_buff_extends_range() {
        let mut state = blank();
        let cavalry = put(&mut state, c(7, 0), UnitKind::Cavalry, Side::A);
        assert!(!legal_moves(&state, cavalry).contains(&c(3, 0)));
        buff(&mut state, cavalry, BuffKind::Charge { move_bonus: 1, attack_bonus: 10 }, 1);
        assert!(legal_moves(&state, cavalry).contains(&c(3, 0)));
    }

    #[test]
    fn test_off_board_coordinates_rejected() {
        let mut state = blank();
        let footman = put(&mut state, c(6, 0), UnitKind::Footman, Side::A);
        put(&mut state, c(5, 0), UnitKind::Footman, Side::B);
        give(&mut state, Side::A, &[CardId::ShieldWall]);
        // Row-major storage would alias (5, 8) onto (6, 0)
        let off = Coord { row: 5, col: 8 };
        assert!(!off.is_on_board());
        assert!(state.board.get(off).is_none());
        assert!(legal_moves(&state, off).is_empty());

        let before = state.clone();
        let cases = [
            (Action::Move { from: off, to: c(5, 7) }, RuleError::InvalidMove { from: off, to: c(5, 7) }),
            (Action::Move { from: footman, to: Coord { row: 6, col: 9 } },
                RuleError::InvalidMove { from: footman, to: Coord { row: 6, col: 9 } }),
            (Action::Attack { from: off, to: c(5, 0) }, RuleError::InvalidAttack { from: off, to: c(5, 0) }),
            (Action::PlayCard { card: CardId::ShieldWall, target: Some(Coord { row: 9, col: 0 }) },
                RuleError::InvalidSkillTarget { card: CardId::ShieldWall, target: Some(Coord { row: 9, col: 0 }) }),
        ];
        for (action, expected) in cases {
            assert_eq!(apply_action(&mut state, Side::A, action).unwrap_err(), expected);
            assert_eq!(state, before);
        }
        assert_eq!(state.piece(footman).unwrap().kind, UnitKind::Footman);
        assert!(state.board.is_empty(c(5, 7)));
    }

    #[test]
    fn test_moving_onto_enemy_without_charge_rejected() {
        let mut state = blank();
        let cavalry = put(&mut state, c(7, 1), UnitKind::Cavalry, Side::A);
        put(&mut state, c(5, 1), UnitKind::Footman, Side::B);
        assert!(charge_targets(&state, cavalry).is_empty());

        let before = state.clone();
        let err = apply_action(&mut state, Side::A, Action::Move { from: cavalry, to: c(5, 1) }).unwrap_err();
        assert_eq!(err, RuleError::InvalidMove { from: cavalry, to: c(5, 1) });
        assert_eq!(state, before);
    }

    // ═════════════════════════════════════════════════════════════════════
    // ATTACK TARGETING TESTS
    // ═════════════════════════════════════════════════════════════════════

    #[test]
    fn test_archer_skips_adjacent_and_shoots_over() {
        let mut state = blank();
        let archer = put(&mut state, c(7, 0), UnitKind::Archer, Side::A);
        put(&mut state, c(6, 0), UnitKind::Footman, Side::A);
        put(&mut state, c(6, 1), UnitKind::Footman, Side::B);
        put(&mut state, c(4, 0), UnitKind::Footman, Side::B);

        assert_eq!(legal_attacks(&state, archer), vec![c(4, 0)]);
    }

    #[test]
    fn test_pikeman_needs_ally_in_front() {
        let mut state = blank();
        let pike = put(&mut state, c(6, 0), UnitKind::Pikeman, Side::A);
        put(&mut state, c(4, 0), UnitKind::Footman, Side::B);
        assert!(legal_attacks(&state, pike).is_empty());

        put(&mut state, c(5, 0), UnitKind::Footman, Side::A);
        assert_eq!(legal_attacks(&state, pike), vec![c(4, 0)]);
    }

    #[test]
    fn test_samurai_forward_three_and_draw_stance() {
        let mut state = blank();
        let samurai = put(&mut state, c(5, 3), UnitKind::Samurai, Side::A);
        for col in 2..=4 {
            put(&mut state, c(4, col), UnitKind::Footman, Side::B);
        }
        put(&mut state, c(5, 4), UnitKind::Footman, Side::B);

        assert_eq!(legal_attacks(&state, samurai), vec![c(4, 2), c(4, 3), c(4, 4)]);

        buff(&mut state, samurai, BuffKind::DrawStance { attack_bonus: 20, lane: Lane::Center }, 2);
        assert_eq!(legal_attacks(&state, samurai), vec![c(4, 3)]);
    }

    #[test]
    fn test_side_b_samurai_faces_down() {
        let mut state = blank();
        let samurai = put(&mut state, c(2, 3), UnitKind::Samurai, Side::B);
        put(&mut state, c(3, 3), UnitKind::Footman, Side::A);
        put(&mut state, c(1, 3), UnitKind::Footman, Side::A);
        assert_eq!(legal_attacks(&state, samurai), vec![c(3, 3)]);
    }

    #[test]
    fn test_tower_blocked_by_first_piece() {
        let mut state = blank();
        let tower = put(&mut state, c(7, 7), UnitKind::Tower, Side::A);
        put(&mut state, c(6, 7), UnitKind::Footman, Side::A);
        put(&mut state, c(5, 7), UnitKind::Footman, Side::B);
        put(&mut state, c(5, 5), UnitKind::Footman, Side::B);
        assert_eq!(legal_attacks(&state, tower), vec![c(5, 5)]);
    }

    #[test]
    fn test_cloaked_and_disarmed() {
        let mut state = blank();
        let footman = put(&mut state, c(5, 3), UnitKind::Footman, Side::A);
        let enemy = put(&mut state, c(4, 3), UnitKind::Footman, Side::B);
        assert_eq!(legal_attacks(&state, footman), vec![enemy]);

        buff(&mut state, enemy, BuffKind::Cloak, 2);
        assert!(legal_attacks(&state, footman).is_empty());

        state.board.get_mut(enemy).unwrap().state.buffs.clear();
        debuff(&mut state, footman, DebuffKind::Disarmed, 2);
        assert!(legal_attacks(&state, footman).is_empty());
    }

    #[test]
    fn test_disarmed_cavalry_cannot_charge() {
        let mut state = blank();
        let cavalry = put(&mut state, c(7, 1), UnitKind::Cavalry, Side::A);
        let footman = put(&mut state, c(5, 1), UnitKind::Footman, Side::B);
        buff(&mut state, cavalry, BuffKind::Charge { move_bonus: 1, attack_bonus: 10 }, 1);
        assert_eq!(charge_targets(&state, cavalry), vec![footman]);

        debuff(&mut state, cavalry, DebuffKind::Disarmed, 2);
        assert!(legal_attacks(&state, cavalry).is_empty());
        assert!(charge_targets(&state, cavalry).is_empty());

        let before = state.clone();
        let err = apply_action(&mut state, Side::A, Action::Move { from: cavalry, to: footman }).unwrap_err();
        assert_eq!(err, RuleError::InvalidMove { from: cavalry, to: footman });
        assert_eq!(state, before);
        assert_eq!(health(&state, footman), 60);
    }

    #[test]
    fn test_castle_and_wall_never_attack() {
        let mut state = blank();
        let castle = put(&mut state, c(5, 3), UnitKind::Castle, Side::A);
        put(&mut state, c(4, 3), UnitKind::Footman, Side::B);
        assert!(legal_attacks(&state, castle).is_empty());
    }

    #[test]
    fn test_queries_idempotent() {
        let state = create_initial_state(&standard_layout(), RulesConfig::default(), 9).unwrap();
        for (at, _) in state.board.pieces() {
            assert_eq!(legal_moves(&state, at), legal_moves(&state, at));
            assert_eq!(legal_attacks(&state, at), legal_attacks(&state, at));
        }
    }

    // ═════════════════════════════════════════════════════════════════════
    // COMBAT TESTS
    // ═════════════════════════════════════════════════════════════════════

    #[test]
    fn test_plain_hit() {
        let mut state = armies();
        let a = put(&mut state, c(5, 3), UnitKind::Footman, Side::A);
        let b = put(&mut state, c(4, 3), UnitKind::Footman, Side::B);

        let report = attack(&mut state, a, b);
        assert_eq!(report.outcome, AttackOutcome::Damaged);
        assert_eq!(report.damage, 20);
        assert_eq!(health(&state, b), 40);
        assert!(state.piece(b).unwrap().state.injured);
        assert_eq!(state.player(Side::A).action_points, 4);
    }

    #[test]
    fn test_defeat_clears_cell() {
        let mut state = armies();
        let a = put(&mut state, c(5, 3), UnitKind::Warlord, Side::A);
        let b = put(&mut state, c(4, 3), UnitKind::Archer, Side::B);

        let report = attack(&mut state, a, b);
        assert_eq!(report.outcome, AttackOutcome::Defeated);
        assert!(state.board.is_empty(b));
        assert_eq!(state.board.owner(b), None);
        assert_eq!(report.casualties.len(), 1);
    }

    #[test]
    fn test_scenario_shield_blocks_once() {
        let mut state = armies();
        let a = put(&mut state, c(5, 3), UnitKind::Warlord, Side::A);
        let b = put(&mut state, c(4, 3), UnitKind::Footman, Side::B);
        buff(&mut state, b, BuffKind::Shield, 2);

        let report = attack(&mut state, a, b);
        assert_eq!(report.outcome, AttackOutcome::Blocked);
        assert_eq!(health(&state, b), 60);
        assert!(!state.piece(b).unwrap().state.has_buff(state.turn, BuffTag::Shield));

        let report = attack(&mut state, a, b);
        assert_eq!(report.outcome, AttackOutcome::Damaged);
        assert_eq!(health(&state, b), 10);
    }

    #[test]
    fn test_guardian_takes_the_hit() {
        let mut state = armies();
        let a = put(&mut state, c(4, 3), UnitKind::Warlord, Side::A);
        let target = put(&mut state, c(3, 3), UnitKind::Footman, Side::B);
        let guard = put(&mut state, c(2, 3), UnitKind::RoyalGuard, Side::B);
        buff(&mut state, guard, BuffKind::Guardian { radius: 1 }, 2);

        let report = attack(&mut state, a, target);
        assert_eq!(report.redirected_to, Some(guard));
        assert_eq!(report.outcome, AttackOutcome::Damaged);
        assert_eq!(health(&state, target), 60);
        assert_eq!(health(&state, guard), 30);
    }

    #[test]
    fn test_damage_immunity() {
        let mut state = armies();
        let a = put(&mut state, c(5, 3), UnitKind::Warlord, Side::A);
        let b = put(&mut state, c(4, 3), UnitKind::Footman, Side::B);
        buff(&mut state, b, BuffKind::DamageImmune, 2);

        let report = attack(&mut state, a, b);
        assert_eq!(report.damage, 0);
        assert_eq!(health(&state, b), 60);
        // Immunity is not consumed
        assert!(state.piece(b).unwrap().state.has_buff(state.turn, BuffTag::DamageImmune));
    }

    #[test]
    fn test_reflect_strikes_back() {
        let mut state = armies();
        let a = put(&mut state, c(5, 3), UnitKind::Warlord, Side::A);
        let b = put(&mut state, c(4, 3), UnitKind::Crab, Side::B);
        buff(&mut state, b, BuffKind::Reflect { damage: 10 }, 2);

        let report = attack(&mut state, a, b);
        assert_eq!(report.reflected.map(|h| h.damage), Some(10));
        assert_eq!(health(&state, a), 140);
        assert_eq!(health(&state, b), 70);
    }

    #[test]
    fn test_enrage_arms_on_injury() {
        let mut state = armies();
        let a = put(&mut state, c(5, 3), UnitKind::Footman, Side::A);
        let b = put(&mut state, c(4, 3), UnitKind::Footman, Side::B);
        buff(&mut state, b, BuffKind::Enrage { attack_bonus: 15, triggered: false }, 3);
        assert_eq!(state.piece(b).unwrap().state.attack_bonus(state.turn), 0);

        attack(&mut state, a, b);
        assert_eq!(state.piece(b).unwrap().state.attack_bonus(state.turn), 15);
    }

    #[test]
    fn test_mage_area_attack_hits_enemies_only() {
        let mut state = armies();
        let mage = put(&mut state, c(6, 3), UnitKind::Mage, Side::A);
        let target = put(&mut state, c(4, 3), UnitKind::Footman, Side::B);
        let left = put(&mut state, c(4, 2), UnitKind::Footman, Side::B);
        let behind = put(&mut state, c(3, 3), UnitKind::Footman, Side::B);
        let ally = put(&mut state, c(4, 4), UnitKind::Footman, Side::A);

        let report = attack(&mut state, mage, target);
        assert_eq!(report.splash.len(), 2);
        assert_eq!(health(&state, target), 30);
        assert_eq!(health(&state, left), 30);
        assert_eq!(health(&state, behind), 30);
        assert_eq!(health(&state, ally), 60);
    }

    #[test]
    fn test_chain_hits_lateral_neighbours() {
        let mut state = armies();
        let archer = put(&mut state, c(7, 0), UnitKind::Archer, Side::A);
        let target = put(&mut state, c(5, 0), UnitKind::Footman, Side::B);
        let beside = put(&mut state, c(5, 1), UnitKind::Footman, Side::B);
        let behind = put(&mut state, c(4, 0), UnitKind::Footman, Side::B);
        buff(&mut state, archer, BuffKind::Chain, 2);

        attack(&mut state, archer, target);
        assert_eq!(health(&state, target), 30);
        assert_eq!(health(&state, beside), 30);
        assert_eq!(health(&state, behind), 60);
    }

    #[test]
    fn test_burning_arrows_ignite_cell() {
        let mut state = armies();
        let archer = put(&mut state, c(7, 0), UnitKind::Archer, Side::A);
        let target = put(&mut state, c(5, 0), UnitKind::Footman, Side::B);
        buff(&mut state, archer, BuffKind::Burning { damage: 10, duration: 3 }, 2);

        let report = attack(&mut state, archer, target);
        assert_eq!(report.ignited, Some(target));
        let field = state.cell_effect(target).unwrap();
        assert_eq!(field.expiry_turn, 4);
        assert_eq!(field.damage, 10);
    }

    #[test]
    fn test_glory_strips_buffs_and_is_consumed() {
        let mut state = armies();
        let warlord = put(&mut state, c(5, 3), UnitKind::Warlord, Side::A);
        let crab = put(&mut state, c(4, 3), UnitKind::Crab, Side::B);
        buff(&mut state, warlord, BuffKind::Glory { bonus: 30 }, 2);
        buff(&mut state, crab, BuffKind::Reflect { damage: 10 }, 2);

        let report = attack(&mut state, warlord, crab);
        assert_eq!(report.damage, 80);
        assert_eq!(report.stripped_buffs, 1);
        assert_eq!(health(&state, crab), 40);
        assert_eq!(health(&state, warlord), 140);
        assert!(state.piece(crab).unwrap().state.buffs.is_empty());
        assert!(!state.piece(warlord).unwrap().state.has_buff(state.turn, BuffTag::Glory));
    }

    #[test]
    fn test_charge_hits_then_advances_on_kill() {
        let mut state = armies();
        let cavalry = put(&mut state, c(7, 1), UnitKind::Cavalry, Side::A);
        let footman = put(&mut state, c(5, 1), UnitKind::Footman, Side::B);
        buff(&mut state, cavalry, BuffKind::Charge { move_bonus: 1, attack_bonus: 10 }, 1);
        assert_eq!(charge_targets(&state, cavalry), vec![footman]);

        let outcome = apply_action(&mut state, Side::A, Action::Move { from: cavalry, to: footman }).unwrap();
        let ActionOutcome::Charged { report, advanced } = outcome else { panic!("expected a charge") };
        assert_eq!(report.damage, 45);
        assert!(!advanced);
        assert_eq!(health(&state, footman), 15);
        assert_eq!(state.piece(cavalry).unwrap().kind, UnitKind::Cavalry);
        assert_eq!(state.player(Side::A).action_points, 3);

        let outcome = apply_action(&mut state, Side::A, Action::Move { from: cavalry, to: footman }).unwrap();
        let ActionOutcome::Charged { report, advanced } = outcome else { panic!("expected a charge") };
        assert_eq!(report.outcome, AttackOutcome::Defeated);
        assert!(advanced);
        assert!(state.board.is_empty(cavalry));
        assert_eq!(state.piece(footman).unwrap().kind, UnitKind::Cavalry);
        assert_eq!(state.board.owner(footman), Some(Side::A));
    }

    // ═════════════════════════════════════════════════════════════════════
    // SCHEDULER TESTS
    // ═════════════════════════════════════════════════════════════════════

    #[test]
    fn test_scenario_burning_cell_hits_new_occupant() {
        let mut state = armies();
        let archer = put(&mut state, c(7, 0), UnitKind::Archer, Side::A);
        let cell = put(&mut state, c(5, 0), UnitKind::Footman, Side::B);
        let relief = put(&mut state, c(4, 0), UnitKind::Footman, Side::B);
        buff(&mut state, archer, BuffKind::Burning { damage: 10, duration: 3 }, 2);

        attack(&mut state, archer, cell);
        assert_eq!(health(&state, cell), 30);
        end_turn(&mut state);
        assert_eq!(health(&state, cell), 20);

        apply_action(&mut state, Side::B, Action::Move { from: cell, to: c(5, 1) }).unwrap();
        apply_action(&mut state, Side::B, Action::Move { from: relief, to: cell }).unwrap();
        end_turn(&mut state);

        assert_eq!(state.turn, 3);
        assert_eq!(health(&state, cell), 50);
        assert_eq!(health(&state, c(5, 1)), 20);
        assert!(state.cell_effect(cell).is_some());
    }

    #[test]
    fn test_burning_field_burns_out() {
        let mut state = armies();
        state.ignite(CellEffect { at: c(4, 4), damage: 10, expiry_turn: 3, source: Side::A });
        advance_turn(&mut state, 2);
        assert_eq!(state.cell_effects.len(), 1);
        let report = advance_turn(&mut state, 3);
        // Nobody stands on it, so nothing burns; it still goes on its expiry turn
        assert_eq!(report.burns.len(), 0);
        assert!(state.cell_effects.is_empty());
    }

    #[test]
    fn test_buff_expiry() {
        let mut state = armies();
        let footman = put(&mut state, c(6, 0), UnitKind::Footman, Side::A);
        buff(&mut state, footman, BuffKind::Shield, 2);

        end_turn(&mut state);
        assert!(state.piece(footman).unwrap().state.has_buff(state.turn, BuffTag::Shield));
        end_turn(&mut state);
        assert!(state.piece(footman).unwrap().state.buffs.is_empty());
    }

    #[test]
    fn test_poison_pays_out_on_expiry() {
        let mut state = armies();
        let b = put(&mut state, c(3, 3), UnitKind::Footman, Side::B);
        debuff(&mut state, b, DebuffKind::Poison { damage: 30 }, 1);

        end_turn(&mut state);
        assert_eq!(health(&state, b), 30);
        assert!(state.piece(b).unwrap().state.debuffs.is_empty());
    }

    #[test]
    fn test_poison_kills_and_removes() {
        let mut state = armies();
        let b = put(&mut state, c(3, 3), UnitKind::Archer, Side::B);
        state.board.get_mut(b).unwrap().state.current_health = 20;
        debuff(&mut state, b, DebuffKind::Poison { damage: 30 }, 1);

        let report = advance_turn(&mut state, 2);
        assert_eq!(report.casualties.len(), 1);
        assert!(state.board.is_empty(b));
    }

    #[test]
    fn test_poison_and_burning_arm_enrage() {
        let mut state = armies();
        let poisoned = put(&mut state, c(3, 3), UnitKind::Footman, Side::B);
        let burnt = put(&mut state, c(3, 5), UnitKind::Footman, Side::B);
        for at in [poisoned, burnt] {
            buff(&mut state, at, BuffKind::Enrage { attack_bonus: 15, triggered: false }, 3);
        }
        debuff(&mut state, poisoned, DebuffKind::Poison { damage: 30 }, 1);
        state.ignite(CellEffect { at: burnt, damage: 10, expiry_turn: 3, source: Side::A });

        advance_turn(&mut state, 2);
        assert_eq!(health(&state, poisoned), 30);
        assert_eq!(health(&state, burnt), 50);
        assert_eq!(state.piece(poisoned).unwrap().state.attack_bonus(state.turn), 15);
        assert_eq!(state.piece(burnt).unwrap().state.attack_bonus(state.turn), 15);
    }

    #[test]
    fn test_doom_destroys_holder() {
        let mut state = armies();
        let b = put(&mut state, c(3, 3), UnitKind::Footman, Side::B);
        debuff(&mut state, b, DebuffKind::Doom, 1);

        let report = advance_turn(&mut state, 2);
        assert_eq!(report.doomed.len(), 1);
        assert!(state.board.is_empty(b));
    }

    #[test]
    fn test_frost_aura_refreshes_without_stacking() {
        let mut state = armies();
        let crab = put(&mut state, c(5, 3), UnitKind::Crab, Side::A);
        let near = put(&mut state, c(4, 3), UnitKind::Footman, Side::B);
        let far = put(&mut state, c(2, 3), UnitKind::Footman, Side::B);
        buff(&mut state, crab, BuffKind::FrostAura { radius: 1 }, 3);

        end_turn(&mut state);
        let slow = state.piece(near).unwrap().state.debuff(state.turn, DebuffTag::Slow).copied();
        assert_eq!(slow.map(|d| d.expiry_turn), Some(3));
        assert!(state.piece(far).unwrap().state.debuffs.is_empty());

        end_turn(&mut state);
        let debuffs = &state.piece(near).unwrap().state.debuffs;
        assert_eq!(debuffs.len(), 1);
        assert_eq!(debuffs[0].expiry_turn, 4);
    }

    #[test]
    fn test_no_stale_effects_after_end_turn() {
        let mut state = armies();
        let a = put(&mut state, c(6, 2), UnitKind::Footman, Side::A);
        buff(&mut state, a, BuffKind::Charge { move_bonus: 1, attack_bonus: 10 }, 1);
        buff(&mut state, a, BuffKind::Cloak, 2);
        end_turn(&mut state);
        for (_, piece) in state.board.pieces() {
            assert!(piece.state.buffs.iter().all(|b| b.expiry_turn > state.turn));
            assert!(piece.state.debuffs.iter().all(|d| d.expiry_turn > state.turn));
        }
    }

    // ═════════════════════════════════════════════════════════════════════
    // SKILL CARD TESTS
    // ═════════════════════════════════════════════════════════════════════

    #[test]
    fn test_non_stacking_buff_replay() {
        let mut state = armies();
        let footman = put(&mut state, c(6, 0), UnitKind::Footman, Side::A);
        give(&mut state, Side::A, &[CardId::ShieldWall, CardId::ShieldWall]);

        let first = play(&mut state, CardId::ShieldWall, Some(footman)).unwrap();
        assert_eq!(first, EffectReport::BuffAttached { at: footman, buff: BuffTag::Shield, expiry_turn: 3 });
        let second = play(&mut state, CardId::ShieldWall, Some(footman)).unwrap();
        assert_eq!(second, EffectReport::AlreadyActive { at: footman });

        assert_eq!(state.piece(footman).unwrap().state.buffs.len(), 1);
        assert_eq!(state.player(Side::A).action_points, 2);
        assert!(state.player(Side::A).hand.is_empty());
        assert_eq!(state.player(Side::A).discard.len(), 2);
    }

    #[test]
    fn test_missing_required_unit() {
        let mut state = armies();
        give(&mut state, Side::A, &[CardId::Charge]);
        assert!(!can_play(&state, Side::A, CardId::Charge));

        let before = state.clone();
        let err = play(&mut state, CardId::Charge, Some(c(7, 7))).unwrap_err();
        assert_eq!(err, RuleError::MissingRequiredUnit { card: CardId::Charge });
        assert_eq!(state, before);
    }

    #[test]
    fn test_card_needs_action_points_and_hand() {
        let mut state = armies();
        let err = play(&mut state, CardId::ShieldWall, Some(c(7, 7))).unwrap_err();
        assert_eq!(err, RuleError::CardNotInHand { card: CardId::ShieldWall });

        give(&mut state, Side::A, &[CardId::ShieldWall]);
        state.player_mut(Side::A).action_points = 1;
        let err = play(&mut state, CardId::ShieldWall, Some(c(7, 7))).unwrap_err();
        assert_eq!(err, RuleError::InsufficientActionPoints { required: 2, available: 1 });
    }

    #[test]
    fn test_required_type_targets() {
        let mut state = armies();
        let cavalry = put(&mut state, c(7, 1), UnitKind::Cavalry, Side::A);
        put(&mut state, c(6, 1), UnitKind::Footman, Side::A);
        assert_eq!(valid_targets(&state, Side::A, CardId::Charge), vec![cavalry]);

        give(&mut state, Side::A, &[CardId::Charge]);
        let err = play(&mut state, CardId::Charge, Some(c(6, 1))).unwrap_err();
        assert!(matches!(err, RuleError::InvalidSkillTarget { .. }));
    }

    #[test]
    fn test_cloaked_units_not_targetable() {
        let mut state = armies();
        let footman = put(&mut state, c(6, 0), UnitKind::Footman, Side::A);
        assert!(valid_targets(&state, Side::A, CardId::ShieldWall).contains(&footman));
        buff(&mut state, footman, BuffKind::Cloak, 2);
        assert!(!valid_targets(&state, Side::A, CardId::ShieldWall).contains(&footman));
        assert!(!valid_targets(&state, Side::B, CardId::Venom).contains(&footman));
    }

    #[test]
    fn test_stone_wall_spawns_and_expires() {
        let mut state = armies();
        give(&mut state, Side::A, &[CardId::StoneWall]);

        let err = play(&mut state, CardId::StoneWall, Some(c(3, 0))).unwrap_err();
        assert!(matches!(err, RuleError::InvalidSkillTarget { .. }));
        let err = play(&mut state, CardId::StoneWall, Some(c(7, 4))).unwrap_err();
        assert!(matches!(err, RuleError::InvalidSkillTarget { .. }));

        let report = play(&mut state, CardId::StoneWall, Some(c(5, 0))).unwrap();
        assert!(matches!(report, EffectReport::Spawned { kind: UnitKind::Wall, expiry_turn: 3, .. }));
        let wall = state.piece(c(5, 0)).unwrap();
        assert_eq!(wall.owner, Side::A);
        assert!(wall.state.flags.is_wall && wall.state.flags.is_derivative);
        assert!(legal_moves(&state, c(5, 0)).is_empty());

        end_turn(&mut state);
        assert!(state.piece(c(5, 0)).is_some());
        end_turn(&mut state);
        assert!(state.board.is_empty(c(5, 0)));
    }

    #[test]
    fn test_dominate_needs_basic_in_reach() {
        let mut state = armies();
        put(&mut state, c(5, 3), UnitKind::Warlock, Side::A);
        let far = put(&mut state, c(1, 1), UnitKind::Footman, Side::B);
        give(&mut state, Side::A, &[CardId::Dominate]);

        let err = play(&mut state, CardId::Dominate, Some(far)).unwrap_err();
        assert_eq!(err, RuleError::NoValidTargets { card: CardId::Dominate });

        let near = put(&mut state, c(3, 3), UnitKind::Footman, Side::B);
        let report = play(&mut state, CardId::Dominate, Some(near)).unwrap();
        assert_eq!(report, EffectReport::DebuffAttached { at: near, debuff: DebuffTag::Doom, expiry_turn: 2 });

        end_turn(&mut state);
        assert!(state.board.is_empty(near));
        assert!(state.piece(far).is_some());
    }

    #[test]
    fn test_meteor_area_damage() {
        let mut state = armies();
        let target = put(&mut state, c(3, 3), UnitKind::Footman, Side::B);
        let adjacent = put(&mut state, c(2, 4), UnitKind::Footman, Side::B);
        let far = put(&mut state, c(1, 1), UnitKind::Footman, Side::B);
        let ally = put(&mut state, c(4, 3), UnitKind::Footman, Side::A);
        give(&mut state, Side::A, &[CardId::Meteor]);

        let report = play(&mut state, CardId::Meteor, Some(target)).unwrap();
        let EffectReport::AreaDamage { hits, casualties } = report else { panic!("expected area damage") };
        assert_eq!(hits.len(), 2);
        assert!(casualties.is_empty());
        assert_eq!(health(&state, target), 40);
        assert_eq!(health(&state, adjacent), 40);
        assert_eq!(health(&state, far), 60);
        assert_eq!(health(&state, ally), 60);
    }

    #[test]
    fn test_mend_heals_to_full() {
        let mut state = armies();
        let footman = put(&mut state, c(6, 0), UnitKind::Footman, Side::A);
        state.board.get_mut(footman).unwrap().state.take_damage(50);
        give(&mut state, Side::A, &[CardId::Mend]);

        let report = play(&mut state, CardId::Mend, Some(footman)).unwrap();
        assert_eq!(report, EffectReport::Healed { at: footman, amount: 50 });
        assert_eq!(health(&state, footman), 60);
        assert!(!state.piece(footman).unwrap().state.injured);
    }

    #[test]
    fn test_war_drums_rallies_non_structures() {
        let mut state = armies();
        put(&mut state, c(6, 0), UnitKind::Footman, Side::A);
        give(&mut state, Side::A, &[CardId::WarDrums]);

        let err = play(&mut state, CardId::WarDrums, Some(c(6, 0))).unwrap_err();
        assert!(matches!(err, RuleError::InvalidSkillTarget { .. }));

        let report = play(&mut state, CardId::WarDrums, None).unwrap();
        assert_eq!(report, EffectReport::Rallied { count: 2 });
        assert!(!state.piece(c(7, 4)).unwrap().state.has_buff(state.turn, BuffTag::Charge));
    }

    // ═════════════════════════════════════════════════════════════════════
    // WIN CONDITION TESTS
    // ═════════════════════════════════════════════════════════════════════

    #[test]
    fn test_scenario_hero_destroyed() {
        let mut state = blank();
        put(&mut state, c(7, 4), UnitKind::Castle, Side::A);
        let warlord = put(&mut state, c(5, 3), UnitKind::Warlord, Side::A);
        put(&mut state, c(0, 4), UnitKind::Castle, Side::B);
        let oracle = put(&mut state, c(4, 3), UnitKind::Oracle, Side::B);
        state.board.get_mut(oracle).unwrap().state.current_health = 40;

        let report = attack(&mut state, warlord, oracle);
        assert_eq!(report.outcome, AttackOutcome::Defeated);
        assert!(state.victory.is_none(), "decided only when the turn ends");

        end_turn(&mut state);
        let victory = state.victory.unwrap();
        assert_eq!(victory.winner, Side::A);
        assert_eq!(victory.reason, WinReason::HeroDestroyed);
        assert_eq!(victory.reason.to_string(), "hero destroyed");

        let err = apply_action(&mut state, Side::B, Action::EndTurn).unwrap_err();
        assert_eq!(err, RuleError::GameOver);
    }

    #[test]
    fn test_command_structure_destroyed() {
        let mut state = armies();
        state.board.take(c(0, 4));
        assert_eq!(
            evaluate(&state, Side::A),
            WinEvaluation::Decided(Victory { winner: Side::A, reason: WinReason::CommandStructureDestroyed, turn: 1 })
        );
    }

    #[test]
    fn test_mutual_destruction_acting_side_loses() {
        let mut state = armies();
        state.board.take(c(7, 7));
        state.board.take(c(0, 7));
        let WinEvaluation::Decided(victory) = evaluate(&state, Side::A) else { panic!("expected a result") };
        assert_eq!(victory.winner, Side::B);
        assert_eq!(victory.reason, WinReason::MutualDestruction);
    }

    #[test]
    fn test_ongoing() {
        let state = armies();
        assert_eq!(evaluate(&state, Side::A), WinEvaluation::Ongoing);
    }

    // ═════════════════════════════════════════════════════════════════════
    // TURN & ACTION POINT TESTS
    // ═════════════════════════════════════════════════════════════════════

    #[test]
    fn test_scenario_action_points_run_out() {
        let mut state = armies();
        let footman = put(&mut state, c(6, 0), UnitKind::Footman, Side::A);
        state.player_mut(Side::A).action_points = 3;

        apply_action(&mut state, Side::A, Action::Move { from: footman, to: c(5, 0) }).unwrap();
        assert_eq!(state.player(Side::A).action_points, 0);

        let err = apply_action(&mut state, Side::A, Action::Move { from: c(5, 0), to: c(4, 0) }).unwrap_err();
        assert_eq!(err, RuleError::InsufficientActionPoints { required: 3, available: 0 });
    }

    #[test]
    fn test_out_of_turn_and_foreign_pieces() {
        let mut state = armies();
        let enemy = put(&mut state, c(1, 0), UnitKind::Footman, Side::B);

        let err = apply_action(&mut state, Side::B, Action::EndTurn).unwrap_err();
        assert_eq!(err, RuleError::OutOfTurn { side: Side::B });

        let err = apply_action(&mut state, Side::A, Action::Move { from: enemy, to: c(2, 0) }).unwrap_err();
        assert_eq!(err, RuleError::InvalidMove { from: enemy, to: c(2, 0) });
    }

    #[test]
    fn test_end_turn_hands_over() {
        let mut state = create_initial_state(&standard_layout(), RulesConfig::default(), 3).unwrap();
        end_turn(&mut state);
        assert_eq!(state.turn, 2);
        assert_eq!(state.active, Side::B);
        assert_eq!(state.player(Side::A).action_points, 0);
        assert_eq!(state.player(Side::B).action_points, 6);
        assert_eq!(state.player(Side::B).hand.len(), 4);
    }

    #[test]
    fn test_hand_capacity_enforced_on_draw() {
        let mut state = create_initial_state(&standard_layout(), RulesConfig::default(), 3).unwrap();
        for _ in 0..10 {
            end_turn(&mut state);
        }
        for side in Side::ALL {
            assert_eq!(state.player(side).hand.len(), 5);
        }
    }

    #[test]
    fn test_reduce_is_pure() {
        let state = create_initial_state(&standard_layout(), RulesConfig::default(), 5).unwrap();
        let (next, outcome) = reduce(&state, Side::A, Action::Move { from: c(6, 1), to: c(4, 1) }).unwrap();
        assert_eq!(outcome, ActionOutcome::Moved { from: c(6, 1), to: c(4, 1) });
        assert!(state.piece(c(4, 1)).is_none());
        assert_eq!(next.piece(c(4, 1)).unwrap().kind, UnitKind::RoyalGuard);
        assert!(reduce(&state, Side::B, Action::EndTurn).is_err());
    }

    // ═════════════════════════════════════════════════════════════════════
    // VISIBILITY TESTS
    // ═════════════════════════════════════════════════════════════════════

    #[test]
    fn test_player_view_hides_opponent_hand() {
        let state = create_initial_state(&standard_layout(), RulesConfig::default(), 11).unwrap();
        let view = player_view(&state, Side::A);
        assert_eq!(view.my_hand, state.player(Side::A).hand);
        assert_eq!(view.opponent_hand_size, 3);
        assert_eq!(view.pieces.len(), 32);
        assert!(!view.moves.is_empty());

        let theirs = player_view(&state, Side::B);
        assert!(theirs.moves.is_empty());
        assert!(theirs.legal_actions().is_empty());
    }

    #[test]
    fn test_view_actions_respect_action_points() {
        let mut state = create_initial_state(&standard_layout(), RulesConfig::default(), 11).unwrap();
        state.player_mut(Side::A).action_points = 2;
        let view = player_view(&state, Side::A);
        assert!(view.legal_actions().iter().all(|a| !matches!(a, Action::Move { .. })));
    }

    // ═════════════════════════════════════════════════════════════════════
    // FULL GAME SIMULATION TESTS
    // ═════════════════════════════════════════════════════════════════════

    #[test]
    fn test_deterministic_game() {
        let g1 = play_random_game(12345, 2000);
        let g2 = play_random_game(12345, 2000);
        assert_eq!(g1, g2);
    }

    #[test]
    fn test_stress_multiple_games() {
        for seed in 0..10u64 {
            let state = play_random_game(seed * 7919, 1500);
            assert!(state.is_over() || state.turn > 1, "game with seed {} never advanced", seed * 7919);
        }
    }
}
