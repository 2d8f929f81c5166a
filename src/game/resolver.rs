use serde::{Deserialize, Serialize};

use super::card::CombatCard;
use super::core::Side;
use super::damage::{compute_damage, roll_percent};
use super::log::LogEntry;
use super::rng::RngPort;
use super::type_chart::damage_multiplier;

/// A turn-consuming choice recorded for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Commit {
    Attack { move_idx: usize },
    Defend,
    Pass,
}

/// What the opponent committed, without the move index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Attack,
    Defend,
    Pass,
}

impl Commit {
    pub fn kind(&self) -> MoveKind {
        match self {
            Commit::Attack { .. } => MoveKind::Attack,
            Commit::Defend => MoveKind::Defend,
            Commit::Pass => MoveKind::Pass,
        }
    }

    pub fn commit_log(&self, side: Side, card: &CombatCard) -> LogEntry {
        match self {
            Commit::Attack { move_idx } => {
                let name = card
                    .moves
                    .get(*move_idx)
                    .map(|mv| mv.name.as_str())
                    .unwrap_or("an unknown move");
                LogEntry::attack_commit(side, name)
            }
            Commit::Defend => LogEntry::defend_commit(side),
            Commit::Pass => LogEntry::pass_commit(side),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnResolution {
    pub log: Vec<LogEntry>,
    pub both_passed: bool,
}

#[derive(Default)]
struct Deltas {
    damage: u32,
    stamina_cost: u32,
}

/// Applies both recorded commits to the two active cards.
///
/// Damage for the player is rolled before damage for the AI. All hp and stamina changes
/// are computed first and written at the end, so both cards change together.
pub fn resolve_turn(
    player: &mut CombatCard,
    ai: &mut CombatCard,
    player_commit: Commit,
    ai_commit: Commit,
    rng: &mut dyn RngPort,
) -> TurnResolution {
    let mut resolution = TurnResolution::default();
    let mut player_side = Deltas::default();
    let mut ai_side = Deltas::default();

    match (player_commit, ai_commit) {
        (Commit::Attack { move_idx: p }, Commit::Attack { move_idx: a }) => {
            let to_ai = roll_damage(player, p, ai, false, rng);
            let to_player = roll_damage(ai, a, player, false, rng);
            ai_side.damage = to_ai;
            player_side.damage = to_player;
            player_side.stamina_cost = move_cost(player, p);
            ai_side.stamina_cost = move_cost(ai, a);
            resolution.log.push(LogEntry::damage(Side::Player, to_ai, false));
            resolution.log.push(LogEntry::damage(Side::Ai, to_player, false));
        }
        (Commit::Attack { move_idx: p }, Commit::Defend) => {
            let raw = roll_damage(player, p, ai, true, rng);
            ai_side.damage = through_defense(raw, ai.defense, Side::Player, &mut resolution);
            player_side.stamina_cost = move_cost(player, p);
            ai_side.stamina_cost = ai.defend_cost();
        }
        (Commit::Attack { move_idx: p }, Commit::Pass) => {
            let to_ai = roll_damage(player, p, ai, false, rng);
            ai_side.damage = to_ai;
            player_side.stamina_cost = move_cost(player, p);
            resolution.log.push(LogEntry::damage(Side::Player, to_ai, false));
        }
        (Commit::Defend, Commit::Attack { move_idx: a }) => {
            let raw = roll_damage(ai, a, player, true, rng);
            player_side.damage = through_defense(raw, player.defense, Side::Ai, &mut resolution);
            player_side.stamina_cost = player.defend_cost();
            ai_side.stamina_cost = move_cost(ai, a);
        }
        (Commit::Defend, Commit::Defend) => {
            player_side.stamina_cost = player.defend_cost();
            ai_side.stamina_cost = ai.defend_cost();
            resolution.log.push(LogEntry::both_defended());
        }
        (Commit::Defend, Commit::Pass) => {
            player_side.stamina_cost = player.defend_cost();
        }
        (Commit::Pass, Commit::Attack { move_idx: a }) => {
            let to_player = roll_damage(ai, a, player, false, rng);
            player_side.damage = to_player;
            ai_side.stamina_cost = move_cost(ai, a);
            resolution.log.push(LogEntry::damage(Side::Ai, to_player, false));
        }
        (Commit::Pass, Commit::Defend) => {
            ai_side.stamina_cost = ai.defend_cost();
        }
        (Commit::Pass, Commit::Pass) => {
            resolution.both_passed = true;
        }
    }

    apply(player, &player_side);
    apply(ai, &ai_side);
    resolution
}

fn roll_damage(
    attacker: &CombatCard,
    move_idx: usize,
    defender: &CombatCard,
    defending: bool,
    rng: &mut dyn RngPort,
) -> u32 {
    let Some(mv) = attacker.moves.get(move_idx) else {
        return 0;
    };
    let percent = roll_percent(attacker.attack, rng);
    let multiplier = damage_multiplier(mv.move_type, &defender.types, attacker.is_legendary);
    compute_damage(mv.power, percent, multiplier, defending)
}

/// Subtracts the defense stat from a defend-reduced hit and logs the result.
fn through_defense(
    raw: u32,
    defense: u32,
    attacker: Side,
    resolution: &mut TurnResolution,
) -> u32 {
    if raw <= defense {
        resolution.log.push(LogEntry::blocked(attacker.opponent()));
        0
    } else {
        let net = raw - defense;
        resolution.log.push(LogEntry::damage(attacker, net, true));
        net
    }
}

fn move_cost(card: &CombatCard, move_idx: usize) -> u32 {
    card.moves
        .get(move_idx)
        .map(|mv| mv.stamina_cost)
        .unwrap_or(0)
}

fn apply(card: &mut CombatCard, deltas: &Deltas) {
    card.take_damage(deltas.damage);
    card.spend_stamina(deltas.stamina_cost);
    card.clamp();
}
