use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::{BaseStats, BattleMode, CombatCard, LevelStats, Winner};

/// Final battle state handed to the reward calculation.
#[derive(Debug, Clone)]
pub struct BattleResult {
    pub session_id: String,
    pub user_id: i64,
    pub mode: BattleMode,
    pub winner: Winner,
    pub player_deck: Vec<CombatCard>,
    pub player_active_idx: usize,
    pub created_at: DateTime<Utc>,
}

/// Outcome from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleOutcome {
    Win,
    Loss,
    Draw,
}

impl BattleOutcome {
    /// `None` while the battle is still unresolved.
    pub fn from_winner(winner: Winner) -> Option<Self> {
        match winner {
            Winner::Player => Some(BattleOutcome::Win),
            Winner::Ai => Some(BattleOutcome::Loss),
            Winner::Draw => Some(BattleOutcome::Draw),
            Winner::Unresolved => None,
        }
    }
}

/// Persisted progression of one owned card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardProgress {
    pub card_id: u32,
    pub level: u32,
    pub xp: u32,
    pub base: BaseStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpGain {
    pub card_id: u32,
    pub name: String,
    pub xp: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpRecord {
    pub card_id: u32,
    pub old_level: u32,
    pub new_level: u32,
    pub old_stats: LevelStats,
    pub new_stats: LevelStats,
    /// Residual XP after the level-ups.
    pub xp: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleHistoryEntry {
    pub session_id: String,
    pub user_id: i64,
    pub mode: BattleMode,
    pub result: BattleOutcome,
    pub coins: u32,
    pub duration_secs: i64,
}

/// Everything one finished battle pays out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRecord {
    pub session_id: String,
    pub user_id: i64,
    pub result: BattleOutcome,
    pub coins: u32,
    pub xp_gains: Vec<XpGain>,
    /// Progress after applying the XP, one entry per card that had persisted progress.
    pub progress: Vec<CardProgress>,
    pub level_ups: Vec<LevelUpRecord>,
    pub history: BattleHistoryEntry,
}

impl RewardRecord {
    pub fn xp_for(&self, card_id: u32) -> u32 {
        self.xp_gains
            .iter()
            .filter(|gain| gain.card_id == card_id)
            .map(|gain| gain.xp)
            .sum()
    }
}
