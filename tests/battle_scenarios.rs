mod utils;

use pokebattle::game::{
    Action, BattleError, BattleMode, CombatCard, CreatureType, FixedClock, LogEntry, LogKind, Move,
    ScriptedRng, Side, WhoseTurn, Winner,
};
use utils::builders::{start_session, start_time};
use utils::*;

fn clock() -> FixedClock {
    FixedClock::new(start_time())
}

fn messages(log: &[LogEntry]) -> Vec<&str> {
    log.iter().map(|entry| entry.message.as_str()).collect()
}

fn team_card(card_id: u32, name: &str, hp: u32) -> CombatCard {
    CardBuilder::new(card_id, name)
        .hp(hp, hp)
        .with_move(0, Move::new("tackle", 40, CreatureType::Normal))
        .build()
}

// ============================================================================
// Duel Scenarios
// ============================================================================

#[test]
fn test_duel_super_effective_knockout() {
    let player = CardBuilder::new(1, "pikachu")
        .hp(120, 120)
        .stamina(200, 200)
        .attack(60)
        .types(&[CreatureType::Electric])
        .with_move(0, Move::new("thunderbolt", 80, CreatureType::Electric))
        .build();
    let ai = CardBuilder::new(2, "squirtle")
        .hp(70, 70)
        .attack(40)
        .defense(10)
        .types(&[CreatureType::Water])
        .with_move(0, Move::new("water-gun", 40, CreatureType::Water))
        .build();
    let mut session = start_session(BattleMode::Duel, vec![player], vec![ai]);
    let strategy = ScriptedStrategy::always(Action::Attack { move_idx: 0 });
    let mut rng = ScriptedRng::new(vec![0.999, 0.3]);

    let outcome = drive(
        &mut session,
        Action::Attack { move_idx: 0 },
        &mut rng,
        &strategy,
        &clock(),
    )
    .unwrap();

    let log = messages(&outcome.log);
    assert!(log.contains(&"Player chose to attack with thunderbolt."));
    assert!(log.contains(&"AI chose to attack with water-gun."));
    assert!(log.contains(&"Player dealt 160 damage to AI."));
    assert!(log.contains(&"AI dealt 12 damage to Player."));
    assert_eq!(
        log.last(),
        Some(&"AI's Pokemon was knocked out! Player wins.")
    );

    assert!(outcome.battle_ended);
    assert!(session.is_battle_over());
    assert_eq!(session.winner(), Winner::Player);
    assert_eq!(session.whose_turn(), WhoseTurn::None);
    assert_eq!(session.player_active().hp, 108);
    assert_eq!(session.player_active().stamina, 200 - 26);
    assert_eq!(session.ai_active().hp, 0);
    assert!(session.ai_active().is_knocked_out);
    assert_eq!(rng.consumed(), 2);
}

#[test]
fn test_three_double_passes_end_in_stalemate() {
    let mut session = start_session(
        BattleMode::Duel,
        vec![CardBuilder::new(1, "eevee").build()],
        vec![CardBuilder::new(2, "meowth").build()],
    );
    let strategy = ScriptedStrategy::always(Action::Pass);
    let mut rng = ScriptedRng::new(Vec::new());

    for expected in 1..=2u8 {
        let outcome = drive(&mut session, Action::Pass, &mut rng, &strategy, &clock()).unwrap();
        assert!(!outcome.battle_ended);
        assert_eq!(session.consecutive_passes(), expected);
        let line = format!("Both passed. Nothing happened! (Pass count: {expected}/3)");
        assert!(messages(&outcome.log).contains(&line.as_str()));
    }
    // Turn 2 was an AI-first turn; turn 3 is the player's again.
    assert_eq!(session.turn_number(), 3);
    assert_eq!(session.whose_turn(), WhoseTurn::Player);

    let outcome = drive(&mut session, Action::Pass, &mut rng, &strategy, &clock()).unwrap();
    assert!(outcome.battle_ended);
    assert_eq!(session.winner(), Winner::Draw);
    assert_eq!(session.turn_number(), 4);
    assert_eq!(session.consecutive_passes(), 3);
    assert_eq!(
        messages(&outcome.log).last(),
        Some(&"Stalemate! Both players passed 3 times in a row. Battle ends in a draw!")
    );
    assert_eq!(rng.consumed(), 0);
}

#[test]
fn test_any_non_pass_resets_pass_counter() {
    let mut session = start_session(
        BattleMode::Duel,
        vec![CardBuilder::new(1, "eevee").build()],
        vec![CardBuilder::new(2, "meowth").hp(500, 500).build()],
    );
    let strategy = ScriptedStrategy::always(Action::Pass);
    let mut rng = ScriptedRng::new(Vec::new()).with_fallback(0.5);

    drive(&mut session, Action::Pass, &mut rng, &strategy, &clock()).unwrap();
    drive(&mut session, Action::Pass, &mut rng, &strategy, &clock()).unwrap();
    assert_eq!(session.consecutive_passes(), 2);

    drive(
        &mut session,
        Action::Attack { move_idx: 0 },
        &mut rng,
        &strategy,
        &clock(),
    )
    .unwrap();
    assert_eq!(session.consecutive_passes(), 0);
    assert!(!session.is_battle_over());
}

#[test]
fn test_weak_attack_into_defense_is_blocked() {
    let player = CardBuilder::new(1, "rattata")
        .with_move(0, Move::new("pound", 20, CreatureType::Normal))
        .build();
    let ai = CardBuilder::new(2, "geodude").defense(8).build();
    let mut session = start_session(BattleMode::Duel, vec![player], vec![ai]);
    let strategy = ScriptedStrategy::always(Action::Defend);
    let mut rng = ScriptedRng::new(vec![0.999]);

    let outcome = drive(
        &mut session,
        Action::Attack { move_idx: 0 },
        &mut rng,
        &strategy,
        &clock(),
    )
    .unwrap();

    assert!(messages(&outcome.log).contains(&"AI blocked all damage!"));
    assert!(!outcome
        .log
        .iter()
        .any(|entry| entry.kind == LogKind::Damage));
    assert_eq!(session.ai_active().hp, 100);
    // ceil(hp_max / 2)
    assert_eq!(session.ai_active().stamina, 50);
    assert_eq!(session.player_active().stamina, 100 - 6);
    assert_eq!(session.turn_number(), 2);
}

#[test]
fn test_attack_through_defense_subtracts_defense_stat() {
    let player = CardBuilder::new(1, "machop")
        .attack(50)
        .with_move(0, Move::new("strength", 80, CreatureType::Normal))
        .build();
    let ai = CardBuilder::new(2, "onix").defense(5).build();
    let mut session = start_session(BattleMode::Duel, vec![player], vec![ai]);
    let strategy = ScriptedStrategy::always(Action::Defend);
    let mut rng = ScriptedRng::new(vec![0.999]);

    let outcome = drive(
        &mut session,
        Action::Attack { move_idx: 0 },
        &mut rng,
        &strategy,
        &clock(),
    )
    .unwrap();

    // 80 * 1.0 = 80, quartered to 20, minus 5 defense.
    assert!(messages(&outcome.log).contains(&"Player dealt 15 damage to AI (after defense)."));
    assert_eq!(session.ai_active().hp, 85);
}

#[test]
fn test_sacrifice_then_second_sacrifice_forbidden() {
    let player = CardBuilder::new(1, "machamp")
        .hp(150, 150)
        .stamina(20, 200)
        .build();
    let mut session = start_session(
        BattleMode::Duel,
        vec![player],
        vec![CardBuilder::new(2, "hitmonlee").build()],
    );
    let strategy = ScriptedStrategy::always(Action::Pass);
    let mut rng = ScriptedRng::new(Vec::new());

    let outcome = drive(&mut session, Action::Sacrifice, &mut rng, &strategy, &clock()).unwrap();
    assert_eq!(outcome.log.len(), 1);
    assert_eq!(outcome.log[0].kind, LogKind::Sacrifice);
    assert!(!outcome.turn_advanced);
    assert_eq!(session.player_active().hp, 140);
    assert_eq!(session.player_active().stamina, 120);
    assert_eq!(session.sacrifice_count(Side::Player, 0), 1);
    assert_eq!(session.whose_turn(), WhoseTurn::Player);
    assert_eq!(session.turn_number(), 1);

    let before = session.clone();
    let err = drive(&mut session, Action::Sacrifice, &mut rng, &strategy, &clock()).unwrap_err();
    assert!(matches!(err, BattleError::SacrificeForbidden(_)));
    assert_eq!(session, before);
}

// ============================================================================
// Team Scenarios
// ============================================================================

#[test]
fn test_team_knockout_forces_switch_and_new_round() {
    let mut player_deck: Vec<CombatCard> = (0..5)
        .map(|i| team_card(i + 1, &format!("p{i}"), 100))
        .collect();
    player_deck[0].hp = 1;
    let ai_deck: Vec<CombatCard> = (0..5)
        .map(|i| team_card(i + 10, &format!("a{i}"), 100))
        .collect();
    let mut session = start_session(BattleMode::Team, player_deck, ai_deck);
    let strategy = ScriptedStrategy::always(Action::Attack { move_idx: 0 });
    let mut rng = ScriptedRng::new(Vec::new()).with_fallback(0.999);

    let outcome = drive(&mut session, Action::Pass, &mut rng, &strategy, &clock()).unwrap();

    let log = messages(&outcome.log);
    assert!(log.contains(&"AI dealt 40 damage to Player."));
    assert!(log.contains(&"Player's p0 was knocked out!"));
    assert!(log.contains(&"Player switched to p1."));
    assert!(log.contains(&"Round 2 begins."));
    assert!(outcome.round_advanced);
    assert!(!outcome.battle_ended);

    assert!(session.player_deck()[0].is_knocked_out);
    assert_eq!(session.player_active_idx(), 1);
    assert_eq!(session.ai_active_idx(), 0);
    assert_eq!(session.round_number(), 2);
    assert_eq!(session.sacrifice_count(Side::Player, 1), 0);
    // Turn 2 is AI-first: its commit is already waiting.
    assert_eq!(session.turn_number(), 2);
    assert_eq!(session.whose_turn(), WhoseTurn::Player);
    assert!(session.pending_ai_move().is_some());
    assert!(!session.can_player_switch());
}

#[test]
fn test_team_battle_won_on_fifth_turn() {
    let mut player_deck = vec![team_card(1, "p0", 30), team_card(2, "p1", 30)];
    player_deck.extend((2..5).map(|i| team_card(i + 1, &format!("p{i}"), 300)));
    let ai_deck: Vec<CombatCard> = (0..5)
        .map(|i| team_card(i + 10, &format!("a{i}"), 30))
        .collect();
    let mut session = start_session(BattleMode::Team, player_deck, ai_deck);
    let strategy = ScriptedStrategy::always(Action::Attack { move_idx: 0 });
    let mut rng = ScriptedRng::new(Vec::new()).with_fallback(0.999);

    let mut last = None;
    for _ in 0..5 {
        assert!(!session.is_battle_over());
        last = Some(
            drive(
                &mut session,
                Action::Attack { move_idx: 0 },
                &mut rng,
                &strategy,
                &clock(),
            )
            .unwrap(),
        );
    }
    let outcome = last.unwrap();

    assert!(outcome.battle_ended);
    assert_eq!(session.winner(), Winner::Player);
    assert_eq!(
        messages(&outcome.log).last(),
        Some(&"AI has no Pokemon left! Player wins the battle!")
    );
    assert!(session.ai_deck().iter().all(|card| card.is_knocked_out));
    assert!(session.player_deck()[0].is_knocked_out);
    assert!(session.player_deck()[1].is_knocked_out);
    assert_eq!(session.player_active_idx(), 2);
    assert_eq!(session.player_active().hp, 300 - 3 * 40);
    assert_eq!(session.player_deck()[3].hp, 300);
    assert_eq!(session.player_deck()[4].hp, 300);
}

#[test]
fn test_team_surrender_switches_to_next_card() {
    let player_deck: Vec<CombatCard> = (0..5)
        .map(|i| team_card(i + 1, &format!("p{i}"), 100))
        .collect();
    let ai_deck: Vec<CombatCard> = (0..5)
        .map(|i| team_card(i + 10, &format!("a{i}"), 100))
        .collect();
    let mut session = start_session(BattleMode::Team, player_deck, ai_deck);
    let strategy = ScriptedStrategy::always(Action::Pass);
    let mut rng = ScriptedRng::new(Vec::new());

    let outcome = drive(&mut session, Action::Surrender, &mut rng, &strategy, &clock()).unwrap();

    assert!(!outcome.battle_ended);
    assert!(session.player_deck()[0].is_knocked_out);
    assert_eq!(session.player_active_idx(), 1);
    assert_eq!(session.round_number(), 2);
    assert!(!session.player_surrendered());
}

#[test]
fn test_duel_surrender_by_player() {
    let mut session = start_session(
        BattleMode::Duel,
        vec![CardBuilder::new(1, "eevee").build()],
        vec![CardBuilder::new(2, "meowth").build()],
    );
    let strategy = ScriptedStrategy::always(Action::Pass);
    let mut rng = ScriptedRng::new(Vec::new());

    let outcome = drive(&mut session, Action::Surrender, &mut rng, &strategy, &clock()).unwrap();

    assert!(outcome.battle_ended);
    assert_eq!(session.winner(), Winner::Ai);
    assert!(session.player_surrendered());
    assert_eq!(
        messages(&outcome.log),
        vec!["Player surrendered! AI wins the battle!"]
    );

    let err = drive(&mut session, Action::Pass, &mut rng, &strategy, &clock()).unwrap_err();
    assert_eq!(err, BattleError::BattleOver);
}
