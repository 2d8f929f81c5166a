use serde::{Deserialize, Serialize};
use std::fmt;

use super::core::{Side, Winner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Turn,
    Commit,
    Damage,
    Block,
    Sacrifice,
    Pass,
    Knockout,
    Switch,
    Round,
    Surrender,
    Stalemate,
    BattleEnd,
    Invariant,
}

/// One battle log line. The message wording is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: LogKind,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl LogEntry {
    fn new(kind: LogKind, message: String) -> Self {
        Self { kind, message }
    }

    pub fn turn_header(turn: u32) -> Self {
        Self::new(LogKind::Turn, format!("--- Turn {turn} ---"))
    }

    pub fn attack_commit(side: Side, move_name: &str) -> Self {
        Self::new(
            LogKind::Commit,
            format!("{side} chose to attack with {move_name}."),
        )
    }

    pub fn defend_commit(side: Side) -> Self {
        Self::new(LogKind::Commit, format!("{side} chose defend."))
    }

    pub fn pass_commit(side: Side) -> Self {
        Self::new(LogKind::Commit, format!("{side} chose pass."))
    }

    pub fn damage(attacker: Side, amount: u32, after_defense: bool) -> Self {
        let suffix = if after_defense { " (after defense)" } else { "" };
        Self::new(
            LogKind::Damage,
            format!(
                "{attacker} dealt {amount} damage to {}{suffix}.",
                attacker.opponent()
            ),
        )
    }

    pub fn blocked(defender: Side) -> Self {
        Self::new(LogKind::Block, format!("{defender} blocked all damage!"))
    }

    pub fn both_defended() -> Self {
        Self::new(LogKind::Block, "Both defended. No damage dealt.".to_string())
    }

    pub fn sacrifice(side: Side, hp_cost: u32, stamina_gain: u32) -> Self {
        Self::new(
            LogKind::Sacrifice,
            format!("{side} sacrificed {hp_cost} HP and gained {stamina_gain} stamina."),
        )
    }

    pub fn both_passed(count: u8, limit: u8) -> Self {
        Self::new(
            LogKind::Pass,
            format!("Both passed. Nothing happened! (Pass count: {count}/{limit})"),
        )
    }

    pub fn knockout(side: Side, name: &str) -> Self {
        Self::new(LogKind::Knockout, format!("{side}'s {name} was knocked out!"))
    }

    pub fn switched(side: Side, name: &str) -> Self {
        Self::new(LogKind::Switch, format!("{side} switched to {name}."))
    }

    pub fn round_begins(round: u32) -> Self {
        Self::new(LogKind::Round, format!("Round {round} begins."))
    }

    pub fn duel_surrender(side: Side) -> Self {
        Self::new(
            LogKind::Surrender,
            format!("{side} surrendered! {} wins the battle!", side.opponent()),
        )
    }

    pub fn team_surrender(side: Side, name: &str) -> Self {
        Self::new(
            LogKind::Surrender,
            format!("{side} surrendered! {name} was knocked out!"),
        )
    }

    pub fn stalemate(limit: u8) -> Self {
        Self::new(
            LogKind::Stalemate,
            format!(
                "Stalemate! Both players passed {limit} times in a row. Battle ends in a draw!"
            ),
        )
    }

    /// Terminal line after a duel knockout.
    pub fn duel_result(winner: Winner) -> Self {
        let message = match winner {
            Winner::Player => "AI's Pokemon was knocked out! Player wins.".to_string(),
            Winner::Ai => "Player's Pokemon was knocked out! AI wins.".to_string(),
            Winner::Draw | Winner::Unresolved => {
                "Both Pokemon were knocked out! The battle ends in a draw.".to_string()
            }
        };
        Self::new(LogKind::BattleEnd, message)
    }

    /// Terminal line when a team runs out of combatants.
    pub fn team_result(winner: Winner) -> Self {
        let message = match winner {
            Winner::Player => "AI has no Pokemon left! Player wins the battle!".to_string(),
            Winner::Ai => "Player has no Pokemon left! AI wins the battle!".to_string(),
            Winner::Draw | Winner::Unresolved => {
                "Both teams are out of Pokemon! The battle ends in a draw.".to_string()
            }
        };
        Self::new(LogKind::BattleEnd, message)
    }

    pub fn invariant_violation(detail: &str) -> Self {
        Self::new(
            LogKind::Invariant,
            format!("Battle stopped after an internal error ({detail}). Declared a draw."),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_wording() {
        assert_eq!(
            LogEntry::damage(Side::Player, 160, false).message,
            "Player dealt 160 damage to AI."
        );
        assert_eq!(
            LogEntry::damage(Side::Ai, 7, true).message,
            "AI dealt 7 damage to Player (after defense)."
        );
    }

    #[test]
    fn test_commit_wording() {
        assert_eq!(
            LogEntry::attack_commit(Side::Player, "thunderbolt").message,
            "Player chose to attack with thunderbolt."
        );
        assert_eq!(LogEntry::defend_commit(Side::Ai).message, "AI chose defend.");
    }

    #[test]
    fn test_entries_serialize_with_kind() {
        let json = serde_json::to_value(LogEntry::blocked(Side::Ai)).unwrap();
        assert_eq!(json["kind"], "block");
        assert_eq!(json["message"], "AI blocked all damage!");

        let json = serde_json::to_value(LogEntry::duel_result(Winner::Player)).unwrap();
        assert_eq!(json["kind"], "battle_end");
    }
}
