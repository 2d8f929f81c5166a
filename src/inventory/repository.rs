use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::game::{CatalogEntry, CombatCard};
use crate::rewards::{BattleHistoryEntry, CardProgress, RewardRecord};

use super::errors::{CatalogError, InventoryError};
use super::models::{CreditOutcome, InventorySummary, OwnedCard};
use super::seed::seed_catalog;

/// Read-only creature catalog.
#[async_trait]
pub trait CatalogPort: Send + Sync {
    async fn lookup(&self, name: &str) -> Result<CatalogEntry, CatalogError>;

    /// Every creature name, in a stable order.
    async fn names(&self) -> Result<Vec<String>, CatalogError>;
}

/// A user's collection, coins and battle history.
#[async_trait]
pub trait InventoryPort: Send + Sync {
    /// Persisted level and XP for the given card ids. Unknown ids are left out.
    async fn card_progress(
        &self,
        user_id: i64,
        card_ids: &[u32],
    ) -> Result<HashMap<u32, CardProgress>, InventoryError>;

    /// Applies coins, card progress and the history entry of `record` in one step.
    /// Keyed by the record's session id, so repeating a call changes nothing.
    async fn credit_rewards(
        &self,
        user_id: i64,
        record: &RewardRecord,
    ) -> Result<CreditOutcome, InventoryError>;

    /// Adds a card won in battle and returns its new inventory id.
    async fn add_card_to_collection(
        &self,
        user_id: i64,
        card: &CombatCard,
        base: &CatalogEntry,
    ) -> Result<u32, InventoryError>;

    /// The user's first `size` cards in id order.
    async fn deck(&self, user_id: i64, size: usize) -> Result<Vec<OwnedCard>, InventoryError>;

    async fn summary(&self, user_id: i64) -> Result<InventorySummary, InventoryError>;
}

#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    entries: Arc<BTreeMap<String, CatalogEntry>>,
}

impl InMemoryCatalog {
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.name.to_ascii_lowercase(), entry))
            .collect();
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Catalog pre-filled with the built-in creatures.
    pub fn seeded() -> Self {
        Self::new(seed_catalog())
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl CatalogPort for InMemoryCatalog {
    async fn lookup(&self, name: &str) -> Result<CatalogEntry, CatalogError> {
        self.entries
            .get(&name.trim().to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    async fn names(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[derive(Debug, Default)]
struct UserInventory {
    coins: u64,
    cards: BTreeMap<u32, OwnedCard>,
    history: Vec<BattleHistoryEntry>,
    credited_sessions: HashSet<String>,
}

#[derive(Debug, Default)]
struct InventoryState {
    users: HashMap<i64, UserInventory>,
    next_card_id: u32,
}

impl InventoryState {
    fn allocate_id(&mut self) -> u32 {
        self.next_card_id += 1;
        self.next_card_id
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryInventory {
    state: Arc<RwLock<InventoryState>>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives `user_id` a level-`level` copy of `entry`; returns the new card id.
    pub async fn grant(&self, user_id: i64, entry: &CatalogEntry, level: u32) -> u32 {
        let mut state = self.state.write().await;
        let card_id = state.allocate_id();
        let user = state.users.entry(user_id).or_default();
        user.cards.insert(
            card_id,
            OwnedCard {
                card_id,
                name: entry.name.clone(),
                level,
                xp: 0,
                base: entry.base,
            },
        );
        card_id
    }

    /// Overwrites the stored progress of one card.
    pub async fn set_progress(&self, user_id: i64, card_id: u32, level: u32, xp: u32) {
        let mut state = self.state.write().await;
        if let Some(card) = state
            .users
            .get_mut(&user_id)
            .and_then(|user| user.cards.get_mut(&card_id))
        {
            card.level = level;
            card.xp = xp;
        }
    }
}

#[async_trait]
impl InventoryPort for InMemoryInventory {
    async fn card_progress(
        &self,
        user_id: i64,
        card_ids: &[u32],
    ) -> Result<HashMap<u32, CardProgress>, InventoryError> {
        let state = self.state.read().await;
        let Some(user) = state.users.get(&user_id) else {
            return Ok(HashMap::new());
        };
        Ok(card_ids
            .iter()
            .filter_map(|id| user.cards.get(id))
            .map(|card| (card.card_id, card.progress()))
            .collect())
    }

    async fn credit_rewards(
        &self,
        user_id: i64,
        record: &RewardRecord,
    ) -> Result<CreditOutcome, InventoryError> {
        let mut state = self.state.write().await;
        let user = state.users.entry(user_id).or_default();
        if !user.credited_sessions.insert(record.session_id.clone()) {
            debug!(user_id, session_id = %record.session_id, "Rewards already credited");
            return Ok(CreditOutcome::AlreadyCredited);
        }

        user.coins += u64::from(record.coins);
        for progress in &record.progress {
            if let Some(card) = user.cards.get_mut(&progress.card_id) {
                card.level = progress.level;
                card.xp = progress.xp;
            }
        }
        user.history.push(record.history.clone());

        info!(
            user_id,
            session_id = %record.session_id,
            coins = record.coins,
            total_coins = user.coins,
            "Rewards credited"
        );
        Ok(CreditOutcome::Credited)
    }

    async fn add_card_to_collection(
        &self,
        user_id: i64,
        card: &CombatCard,
        base: &CatalogEntry,
    ) -> Result<u32, InventoryError> {
        let mut state = self.state.write().await;
        let card_id = state.allocate_id();
        let user = state.users.entry(user_id).or_default();
        user.cards.insert(
            card_id,
            OwnedCard {
                card_id,
                name: card.name.clone(),
                level: card.level,
                xp: 0,
                base: base.base,
            },
        );
        info!(user_id, card_id, name = %card.name, "Card added to collection");
        Ok(card_id)
    }

    async fn deck(&self, user_id: i64, size: usize) -> Result<Vec<OwnedCard>, InventoryError> {
        let state = self.state.read().await;
        let owned: Vec<OwnedCard> = state
            .users
            .get(&user_id)
            .map(|user| user.cards.values().take(size).cloned().collect())
            .unwrap_or_default();
        if owned.len() < size {
            return Err(InventoryError::NotEnoughCards {
                user_id,
                needed: size,
                owned: owned.len(),
            });
        }
        Ok(owned)
    }

    async fn summary(&self, user_id: i64) -> Result<InventorySummary, InventoryError> {
        let state = self.state.read().await;
        let Some(user) = state.users.get(&user_id) else {
            return Ok(InventorySummary {
                user_id,
                ..InventorySummary::default()
            });
        };
        Ok(InventorySummary {
            user_id,
            coins: user.coins,
            cards: user.cards.values().cloned().collect(),
            history: user.history.clone(),
        })
    }
}
