use thiserror::Error;

/// Every failure the battle core and the service around it can surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    // Precondition kinds: nothing changes when one of these is returned.
    #[error("Invalid mode: {0}")]
    InvalidMode(String),
    #[error("Deck size mismatch: {mode} needs {expected} cards per side, got {player} and {ai}")]
    DeckSizeMismatch {
        mode: String,
        expected: usize,
        player: usize,
        ai: usize,
    },
    #[error("Invalid card: {0}")]
    InvalidCard(String),
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Invalid move index: {0}")]
    InvalidMoveIndex(usize),
    #[error("Not enough stamina: need {needed}, have {available}")]
    InsufficientStamina { needed: u32, available: u32 },
    #[error("Sacrifice not allowed: {0}")]
    SacrificeForbidden(String),
    #[error("Switch not allowed: {0}")]
    SwitchNotAllowed(String),
    #[error("Cannot switch to a knocked out Pokemon")]
    TargetKnockedOut,
    #[error("Invalid index: {0}")]
    InvalidIndex(usize),
    #[error("Operation only available in 5v5 mode")]
    ModeUnsupported,
    #[error("Not your turn")]
    NotYourTurn,
    #[error("Battle is already over")]
    BattleOver,
    #[error("Battle is not over yet")]
    BattleNotOver,
    #[error("Only the winner can select a reward card")]
    NotWinner,
    #[error("Reward already claimed")]
    AlreadyClaimed,

    // Resource kinds.
    #[error("Battle session not found: {0}")]
    SessionNotFound(String),
    #[error("Failed to persist battle session: {0}")]
    PersistFailed(String),
    #[error("Catalog lookup failed: {0}")]
    CatalogLookupFailed(String),
    #[error("Failed to credit rewards: {0}")]
    InventoryCreditFailed(String),
    #[error("Storage unavailable: {0}")]
    StoreUnavailable(String),
}

impl BattleError {
    /// Stable machine-readable code for the transport layer.
    pub fn code(&self) -> &'static str {
        match self {
            BattleError::InvalidMode(_) => "INVALID_MODE",
            BattleError::DeckSizeMismatch { .. } => "DECK_SIZE_MISMATCH",
            BattleError::InvalidCard(_) => "INVALID_CARD",
            BattleError::InvalidAction(_) => "INVALID_ACTION",
            BattleError::InvalidMoveIndex(_) => "INVALID_MOVE_INDEX",
            BattleError::InsufficientStamina { .. } => "INSUFFICIENT_STAMINA",
            BattleError::SacrificeForbidden(_) => "SACRIFICE_FORBIDDEN",
            BattleError::SwitchNotAllowed(_) => "SWITCH_NOT_ALLOWED",
            BattleError::TargetKnockedOut => "TARGET_KNOCKED_OUT",
            BattleError::InvalidIndex(_) => "INVALID_INDEX",
            BattleError::ModeUnsupported => "MODE_UNSUPPORTED",
            BattleError::NotYourTurn => "NOT_YOUR_TURN",
            BattleError::BattleOver => "BATTLE_OVER",
            BattleError::BattleNotOver => "BATTLE_NOT_OVER",
            BattleError::NotWinner => "NOT_WINNER",
            BattleError::AlreadyClaimed => "ALREADY_CLAIMED",
            BattleError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            BattleError::PersistFailed(_) => "PERSIST_FAILED",
            BattleError::CatalogLookupFailed(_) => "CATALOG_LOOKUP_FAILED",
            BattleError::InventoryCreditFailed(_) => "INVENTORY_CREDIT_FAILED",
            BattleError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    pub fn is_resource(&self) -> bool {
        matches!(
            self,
            BattleError::SessionNotFound(_)
                | BattleError::PersistFailed(_)
                | BattleError::CatalogLookupFailed(_)
                | BattleError::InventoryCreditFailed(_)
                | BattleError::StoreUnavailable(_)
        )
    }

    pub fn is_precondition(&self) -> bool {
        !self.is_resource()
    }
}
