#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use pokebattle::battle::{
    InMemorySessionStore, RngSource, SessionEnvelope, SessionStore, SessionSummary, StoreError,
};
use pokebattle::game::{CatalogEntry, CombatCard, RngPort, ScriptedRng};
use pokebattle::inventory::{
    CreditOutcome, InMemoryInventory, InventoryError, InventoryPort, InventorySummary, OwnedCard,
};
use pokebattle::rewards::{CardProgress, RewardRecord};

// ============================================================================
// Session store that can be told to fail saves
// ============================================================================

pub struct FailingStore {
    inner: InMemorySessionStore,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: InMemorySessionStore::new(),
            fail_saves: AtomicBool::new(false),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn save(&self, envelope: &SessionEnvelope) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Database("disk full".to_string()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(envelope).await
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionEnvelope>, StoreError> {
        self.inner.get(session_id).await
    }

    async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        self.inner.delete(session_id).await
    }

    async fn expire_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        self.inner.expire_older_than(cutoff).await
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<SessionSummary>, StoreError> {
        self.inner.list_for_user(user_id).await
    }
}

// ============================================================================
// Inventory whose credit call can be made to fail
// ============================================================================

pub struct FailingInventory {
    inner: Arc<InMemoryInventory>,
    fail_credits: AtomicBool,
    credit_calls: AtomicUsize,
}

impl FailingInventory {
    pub fn new(inner: Arc<InMemoryInventory>) -> Self {
        Self {
            inner,
            fail_credits: AtomicBool::new(false),
            credit_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_credits(&self, fail: bool) {
        self.fail_credits.store(fail, Ordering::SeqCst);
    }

    pub fn credit_calls(&self) -> usize {
        self.credit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventoryPort for FailingInventory {
    async fn card_progress(
        &self,
        user_id: i64,
        card_ids: &[u32],
    ) -> Result<HashMap<u32, CardProgress>, InventoryError> {
        self.inner.card_progress(user_id, card_ids).await
    }

    async fn credit_rewards(
        &self,
        user_id: i64,
        record: &RewardRecord,
    ) -> Result<CreditOutcome, InventoryError> {
        self.credit_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_credits.load(Ordering::SeqCst) {
            return Err(InventoryError::Repository("connection reset".to_string()));
        }
        self.inner.credit_rewards(user_id, record).await
    }

    async fn add_card_to_collection(
        &self,
        user_id: i64,
        card: &CombatCard,
        base: &CatalogEntry,
    ) -> Result<u32, InventoryError> {
        self.inner.add_card_to_collection(user_id, card, base).await
    }

    async fn deck(&self, user_id: i64, size: usize) -> Result<Vec<OwnedCard>, InventoryError> {
        self.inner.deck(user_id, size).await
    }

    async fn summary(&self, user_id: i64) -> Result<InventorySummary, InventoryError> {
        self.inner.summary(user_id).await
    }
}

// ============================================================================
// RNG source replaying the same draws for every action
// ============================================================================

pub struct ScriptedRngSource {
    draws: Vec<f64>,
    fallback: f64,
}

impl ScriptedRngSource {
    pub fn constant(value: f64) -> Self {
        Self {
            draws: Vec::new(),
            fallback: value,
        }
    }

    pub fn new(draws: Vec<f64>, fallback: f64) -> Self {
        Self { draws, fallback }
    }
}

impl RngSource for ScriptedRngSource {
    fn new_seed(&self) -> u64 {
        1
    }

    fn for_step(&self, _seed: u64, _step: u64) -> Box<dyn RngPort + Send> {
        Box::new(ScriptedRng::new(self.draws.clone()).with_fallback(self.fallback))
    }
}
