// Public API - what other modules can use
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use errors::StoreError;
pub use handlers::{
    apply_action, claim_rewards, get_battle, list_battles, select_reward_card, start_battle,
    switch_combatant,
};
pub use models::{SessionEnvelope, SessionSummary};
pub use repository::{InMemorySessionStore, PostgresSessionStore, SessionStore};
pub use service::{BattleService, BattleServiceBuilder, RngSource, SeededRngSource};
pub use types::{
    ActionRequest, DeckEntry, RewardCardRequest, RewardCardResponse, StartBattleRequest,
    SwitchRequest,
};

// Internal modules
mod cleanup_task;
mod errors;
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
