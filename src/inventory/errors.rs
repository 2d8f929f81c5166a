use thiserror::Error;

use crate::game::BattleError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown creature: {0}")]
    NotFound(String),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Card {card_id} is not owned by user {user_id}")]
    CardNotOwned { user_id: i64, card_id: u32 },

    #[error("User {user_id} owns {owned} cards, {needed} needed")]
    NotEnoughCards {
        user_id: i64,
        needed: usize,
        owned: usize,
    },
}

impl From<CatalogError> for BattleError {
    fn from(err: CatalogError) -> Self {
        BattleError::CatalogLookupFailed(err.to_string())
    }
}

impl From<InventoryError> for BattleError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::CardNotOwned { .. } | InventoryError::NotEnoughCards { .. } => {
                BattleError::InvalidCard(err.to_string())
            }
            InventoryError::Repository(_) => BattleError::InventoryCreditFailed(err.to_string()),
        }
    }
}
