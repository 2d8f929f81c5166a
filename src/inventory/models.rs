use serde::{Deserialize, Serialize};

use crate::game::BaseStats;
use crate::rewards::{BattleHistoryEntry, CardProgress};

/// A card in a user's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedCard {
    pub card_id: u32,
    /// Catalog creature name.
    pub name: String,
    pub level: u32,
    pub xp: u32,
    pub base: BaseStats,
}

impl OwnedCard {
    pub fn progress(&self) -> CardProgress {
        CardProgress {
            card_id: self.card_id,
            level: self.level,
            xp: self.xp,
            base: self.base,
        }
    }
}

/// Snapshot of a user's inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub user_id: i64,
    pub coins: u64,
    pub cards: Vec<OwnedCard>,
    pub history: Vec<BattleHistoryEntry>,
}

/// Whether a credit call changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditOutcome {
    Credited,
    /// The same session was credited before; nothing was applied.
    AlreadyCredited,
}
