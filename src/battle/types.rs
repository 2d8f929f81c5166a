use serde::{Deserialize, Serialize};

use crate::game::CombatCard;

/// One card of a requested deck: a catalog creature at a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub name: String,
    #[serde(default)]
    pub level: Option<u32>,
    /// Inventory id of an owned card. Owned cards battle at their stored level.
    #[serde(default)]
    pub card_id: Option<u32>,
}

impl DeckEntry {
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        Self {
            name: name.into(),
            level: Some(level),
            card_id: None,
        }
    }

    pub fn owned(name: impl Into<String>, card_id: u32) -> Self {
        Self {
            name: name.into(),
            level: None,
            card_id: Some(card_id),
        }
    }
}

/// Request payload for starting a battle
///
/// Without decks the player's inventory deck faces catalog creatures drawn at random.
#[derive(Debug, Deserialize)]
pub struct StartBattleRequest {
    pub mode: String,
    #[serde(default)]
    pub player_deck: Option<Vec<DeckEntry>>,
    #[serde(default)]
    pub ai_deck: Option<Vec<DeckEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub move_idx: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SwitchRequest {
    pub new_idx: usize,
}

#[derive(Debug, Deserialize)]
pub struct RewardCardRequest {
    pub card_index: usize,
}

/// The card added to the collection after a team win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardCardResponse {
    pub card_id: u32,
    pub card: CombatCard,
}
