use chrono::Duration;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::errors::StoreError;
use super::models::{SessionEnvelope, SessionSummary};
use super::repository::SessionStore;
use super::types::{DeckEntry, RewardCardResponse};
use crate::bot::{BotStrategy, EnhancedBotStrategy};
use crate::game::{
    Action, ActionOutcome, BattleError, BattleMode, BattleSession, Clock, CombatCard, RngPort,
    SeededRng, SessionView, SystemClock, TurnContext,
};
use crate::inventory::{
    CatalogPort, InMemoryCatalog, InMemoryInventory, InventoryError, InventoryPort,
};
use crate::rewards::{RewardCalculator, RewardRecord, RewardTable};
use crate::shared::AppError;

/// Step index reserved for drawing a random AI deck; actions count up from 0.
const AI_DECK_DRAW_STEP: u64 = u64::MAX;

/// Hands out session seeds and the per-action generator derived from them.
pub trait RngSource: Send + Sync {
    fn new_seed(&self) -> u64;

    fn for_step(&self, seed: u64, step: u64) -> Box<dyn RngPort + Send>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SeededRngSource;

impl RngSource for SeededRngSource {
    fn new_seed(&self) -> u64 {
        rand::random()
    }

    fn for_step(&self, seed: u64, step: u64) -> Box<dyn RngPort + Send> {
        Box::new(SeededRng::for_step(seed, step))
    }
}

pub struct BattleService {
    store: Arc<dyn SessionStore>,
    catalog: Arc<dyn CatalogPort>,
    inventory: Arc<dyn InventoryPort>,
    strategy: Arc<dyn BotStrategy>,
    rng_source: Arc<dyn RngSource>,
    clock: Arc<dyn Clock>,
    calculator: RewardCalculator,
    session_mutexes: Arc<RwLock<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl BattleService {
    pub fn builder(store: Arc<dyn SessionStore>) -> BattleServiceBuilder {
        BattleServiceBuilder::new(store)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.strategy_name()
    }

    /// Starts a battle between two explicit decks.
    #[instrument(skip(self, player_deck, ai_deck))]
    pub async fn start_battle(
        &self,
        user_id: i64,
        mode: &str,
        player_deck: Vec<DeckEntry>,
        ai_deck: Vec<DeckEntry>,
    ) -> Result<SessionView, AppError> {
        let mode: BattleMode = mode.parse()?;
        let expected = mode.deck_size();
        if player_deck.len() != expected || ai_deck.len() != expected {
            warn!(
                player = player_deck.len(),
                ai = ai_deck.len(),
                expected,
                "Rejected battle with wrong deck sizes"
            );
            return Err(BattleError::DeckSizeMismatch {
                mode: mode.to_string(),
                expected,
                player: player_deck.len(),
                ai: ai_deck.len(),
            }
            .into());
        }

        let player_cards = self.build_player_deck(user_id, &player_deck).await?;
        let mut ai_cards = Vec::with_capacity(ai_deck.len());
        for (idx, entry) in ai_deck.iter().enumerate() {
            let catalog_entry = self.catalog.lookup(&entry.name).await.map_err(BattleError::from)?;
            ai_cards.push(CombatCard::from_catalog(
                idx as u32 + 1,
                &catalog_entry,
                entry.level.unwrap_or(1),
            )?);
        }

        let seed = self.rng_source.new_seed();
        self.create_session(user_id, mode, player_cards, ai_cards, seed)
            .await
    }

    /// Starts a battle with the user's inventory deck against random catalog creatures at the
    /// player's rounded mean level.
    #[instrument(skip(self))]
    pub async fn start_random_battle(
        &self,
        user_id: i64,
        mode: &str,
    ) -> Result<SessionView, AppError> {
        let mode: BattleMode = mode.parse()?;
        let size = mode.deck_size();
        let owned = self
            .inventory
            .deck(user_id, size)
            .await
            .map_err(BattleError::from)?;

        let mut player_cards = Vec::with_capacity(size);
        for card in &owned {
            let entry = self.catalog.lookup(&card.name).await.map_err(BattleError::from)?;
            player_cards.push(CombatCard::from_catalog(card.card_id, &entry, card.level)?);
        }

        let total_levels: u32 = player_cards.iter().map(|card| card.level).sum();
        let ai_level = (f64::from(total_levels) / size as f64).round() as u32;

        let mut names = self.catalog.names().await.map_err(BattleError::from)?;
        if names.is_empty() {
            return Err(BattleError::CatalogLookupFailed("catalog is empty".to_string()).into());
        }

        let seed = self.rng_source.new_seed();
        let mut rng = self.rng_source.for_step(seed, AI_DECK_DRAW_STEP);
        let mut picks = Vec::with_capacity(size);
        for _ in 0..size {
            if names.is_empty() {
                break;
            }
            picks.push(names.swap_remove(rng.intn(names.len())));
        }
        // Small catalogs repeat creatures.
        while picks.len() < size {
            let repeat = picks[rng.intn(picks.len())].clone();
            picks.push(repeat);
        }

        let mut ai_cards = Vec::with_capacity(size);
        for (idx, name) in picks.iter().enumerate() {
            let entry = self.catalog.lookup(name).await.map_err(BattleError::from)?;
            ai_cards.push(CombatCard::from_catalog(idx as u32 + 1, &entry, ai_level)?);
        }

        self.create_session(user_id, mode, player_cards, ai_cards, seed)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_session(&self, session_id: &str, user_id: i64) -> Result<SessionView, AppError> {
        let session = self.load(session_id, user_id).await?;
        Ok(SessionView::new(&session, Vec::new()))
    }

    #[instrument(skip(self))]
    pub async fn list_sessions(&self, user_id: i64) -> Result<Vec<SessionSummary>, AppError> {
        let sessions = self
            .store
            .list_for_user(user_id)
            .await
            .map_err(BattleError::from)?;
        debug!(count = sessions.len(), "Listed battle sessions");
        Ok(sessions)
    }

    /// Applies one player action, runs the AI's response and persists the result.
    #[instrument(skip(self), fields(action = action.name()))]
    pub async fn apply_action(
        &self,
        session_id: &str,
        user_id: i64,
        action: Action,
    ) -> Result<SessionView, AppError> {
        let session_lock = self.session_lock(session_id).await;
        let _guard = session_lock.lock().await;

        let mut session = self.load(session_id, user_id).await?;
        let applied = {
            let mut rng = self
                .rng_source
                .for_step(session.rng_seed(), session.action_count());
            let mut ctx = TurnContext {
                rng: rng.as_mut(),
                strategy: self.strategy.as_ref(),
                clock: self.clock.as_ref(),
            };
            session.apply_action(action, &mut ctx)
        };
        let outcome = applied.map_err(|e| {
            warn!(session_id = %session_id, error = %e, "Action rejected");
            e
        })?;

        debug!(
            session_id = %session_id,
            turn_number = session.turn_number(),
            round_number = session.round_number(),
            battle_over = session.is_battle_over(),
            "Action applied"
        );
        self.commit(&mut session, outcome).await
    }

    /// Player-initiated switch in team mode.
    #[instrument(skip(self))]
    pub async fn switch_combatant(
        &self,
        session_id: &str,
        user_id: i64,
        new_idx: usize,
    ) -> Result<SessionView, AppError> {
        let session_lock = self.session_lock(session_id).await;
        let _guard = session_lock.lock().await;

        let mut session = self.load(session_id, user_id).await?;
        let outcome = session
            .switch_combatant(new_idx, self.clock.as_ref())
            .map_err(|e| {
                warn!(session_id = %session_id, error = %e, "Switch rejected");
                e
            })?;
        self.commit(&mut session, outcome).await
    }

    /// Retries the reward credit of a finished battle and returns the record.
    #[instrument(skip(self))]
    pub async fn claim_rewards(
        &self,
        session_id: &str,
        user_id: i64,
    ) -> Result<RewardRecord, AppError> {
        let session_lock = self.session_lock(session_id).await;
        let _guard = session_lock.lock().await;

        let mut session = self.load(session_id, user_id).await?;
        if !session.is_battle_over() {
            return Err(BattleError::BattleNotOver.into());
        }
        if session.reward_claimed() {
            return Err(BattleError::AlreadyClaimed.into());
        }

        let credited = self.settle_rewards(&mut session).await;
        self.persist(&session).await?;
        credited?;

        session.reward().cloned().ok_or_else(|| {
            BattleError::InventoryCreditFailed("reward record missing after credit".to_string())
                .into()
        })
    }

    /// Adds one AI card from a won team battle to the user's collection.
    #[instrument(skip(self))]
    pub async fn select_reward_card(
        &self,
        session_id: &str,
        user_id: i64,
        card_index: usize,
    ) -> Result<RewardCardResponse, AppError> {
        let session_lock = self.session_lock(session_id).await;
        let _guard = session_lock.lock().await;

        let mut session = self.load(session_id, user_id).await?;
        let card = session.claim_reward_card(card_index, self.clock.now())?;
        let entry = self.catalog.lookup(&card.name).await.map_err(BattleError::from)?;
        let card_id = self
            .inventory
            .add_card_to_collection(user_id, &card, &entry)
            .await
            .map_err(BattleError::from)?;
        self.persist(&session).await?;

        info!(
            session_id = %session_id,
            user_id,
            card_id,
            name = %card.name,
            "Reward card selected"
        );
        Ok(RewardCardResponse { card_id, card })
    }

    /// Drops sessions idle for longer than `ttl`; returns how many were removed.
    #[instrument(skip(self))]
    pub async fn expire_older_than(&self, ttl: Duration) -> Result<u64, AppError> {
        let cutoff = self.clock.now() - ttl;
        let removed = self
            .store
            .expire_older_than(cutoff)
            .await
            .map_err(BattleError::from)?;

        let mut locks = self.session_mutexes.write().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Ok(removed)
    }

    async fn build_player_deck(
        &self,
        user_id: i64,
        deck: &[DeckEntry],
    ) -> Result<Vec<CombatCard>, AppError> {
        let owned_ids: Vec<u32> = deck.iter().filter_map(|entry| entry.card_id).collect();
        let mut seen = HashSet::new();
        if let Some(card_id) = owned_ids.iter().find(|card_id| !seen.insert(**card_id)) {
            warn!(user_id, card_id = *card_id, "Rejected deck listing a card twice");
            return Err(BattleError::InvalidCard(format!(
                "card {card_id} appears more than once in the deck"
            ))
            .into());
        }
        let progress = if owned_ids.is_empty() {
            HashMap::new()
        } else {
            self.inventory
                .card_progress(user_id, &owned_ids)
                .await
                .map_err(BattleError::from)?
        };

        let mut cards = Vec::with_capacity(deck.len());
        for entry in deck {
            let catalog_entry = self.catalog.lookup(&entry.name).await.map_err(BattleError::from)?;
            let card = match entry.card_id {
                Some(card_id) => {
                    let owned = progress.get(&card_id).ok_or_else(|| {
                        BattleError::from(InventoryError::CardNotOwned {
                            user_id,
                            card_id,
                        })
                    })?;
                    CombatCard::from_catalog(card_id, &catalog_entry, owned.level)?
                }
                // Unowned cards carry id 0 and never match stored progress.
                None => CombatCard::from_catalog(0, &catalog_entry, entry.level.unwrap_or(1))?,
            };
            cards.push(card);
        }
        Ok(cards)
    }

    async fn create_session(
        &self,
        user_id: i64,
        mode: BattleMode,
        player_deck: Vec<CombatCard>,
        ai_deck: Vec<CombatCard>,
        seed: u64,
    ) -> Result<SessionView, AppError> {
        let session = BattleSession::start(
            Uuid::new_v4().to_string(),
            user_id,
            mode,
            player_deck,
            ai_deck,
            seed,
            self.clock.now(),
        )?;
        self.persist(&session).await?;

        info!(
            session_id = %session.id(),
            user_id,
            mode = %mode,
            strategy = self.strategy.strategy_name(),
            "Battle started"
        );
        Ok(SessionView::new(&session, Vec::new()))
    }

    /// Settles rewards on a terminal transition, then saves.
    async fn commit(
        &self,
        session: &mut BattleSession,
        outcome: ActionOutcome,
    ) -> Result<SessionView, AppError> {
        let credited = if outcome.battle_ended {
            info!(
                session_id = %session.id(),
                winner = %session.winner().as_str(),
                turn_number = session.turn_number(),
                "Battle ended"
            );
            self.settle_rewards(session).await
        } else {
            Ok(())
        };

        self.persist(session).await?;
        let view = SessionView::new(session, outcome.log);
        match credited {
            Ok(()) => Ok(view),
            Err(AppError::Battle(source)) => Err(AppError::RewardsPending {
                source,
                view: Box::new(view),
            }),
            Err(other) => Err(other),
        }
    }

    /// Computes the reward once and credits it. The session keeps `reward_claimed` false
    /// when the credit fails.
    async fn settle_rewards(&self, session: &mut BattleSession) -> Result<(), AppError> {
        if session.reward_claimed() {
            return Ok(());
        }

        let record = match session.reward() {
            Some(record) => record.clone(),
            None => {
                let result = session.result();
                let card_ids: Vec<u32> = result.player_deck.iter().map(|card| card.card_id).collect();
                let progress = self
                    .inventory
                    .card_progress(session.user_id(), &card_ids)
                    .await
                    .map_err(|e| {
                        warn!(session_id = %session.id(), error = %e, "Failed to load card progress");
                        BattleError::InventoryCreditFailed(e.to_string())
                    })?;
                let record = self
                    .calculator
                    .calculate(&result, &progress, self.clock.now())?;
                session.record_reward(record.clone())?;
                record
            }
        };

        self.inventory
            .credit_rewards(session.user_id(), &record)
            .await
            .map_err(|e| {
                warn!(session_id = %session.id(), error = %e, "Failed to credit rewards");
                BattleError::InventoryCreditFailed(e.to_string())
            })?;
        session.mark_reward_claimed(self.clock.now())?;

        info!(
            session_id = %session.id(),
            user_id = session.user_id(),
            coins = record.coins,
            level_ups = record.level_ups.len(),
            "Rewards credited"
        );
        Ok(())
    }

    async fn load(&self, session_id: &str, user_id: i64) -> Result<BattleSession, AppError> {
        let envelope = match self.store.get(session_id).await {
            Ok(Some(envelope)) => envelope,
            Ok(None) => return Err(BattleError::SessionNotFound(session_id.to_string()).into()),
            Err(StoreError::Unavailable(msg)) => {
                warn!(session_id = %session_id, error = %msg, "Session store unavailable");
                return Err(BattleError::StoreUnavailable(msg).into());
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Failed to load session");
                return Err(BattleError::SessionNotFound(session_id.to_string()).into());
            }
        };

        if envelope.user_id != user_id {
            warn!(session_id = %session_id, user_id, "Session belongs to another user");
            return Err(AppError::Forbidden(format!(
                "session {session_id} belongs to another user"
            )));
        }

        envelope.to_session().map_err(|e| {
            warn!(session_id = %session_id, error = %e, "Stored session could not be decoded");
            BattleError::SessionNotFound(session_id.to_string()).into()
        })
    }

    async fn persist(&self, session: &BattleSession) -> Result<(), BattleError> {
        let envelope = SessionEnvelope::from_session(session)
            .map_err(|e| BattleError::PersistFailed(e.to_string()))?;
        self.store.save(&envelope).await.map_err(|e| {
            warn!(session_id = %session.id(), error = %e, "Failed to save session");
            BattleError::PersistFailed(e.to_string())
        })
    }

    async fn session_lock(&self, session_id: &str) -> Arc<AsyncMutex<()>> {
        if let Some(lock) = self.session_mutexes.read().await.get(session_id) {
            return Arc::clone(lock);
        }
        let mut locks = self.session_mutexes.write().await;
        Arc::clone(
            locks
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        )
    }
}

pub struct BattleServiceBuilder {
    store: Arc<dyn SessionStore>,
    catalog: Arc<dyn CatalogPort>,
    inventory: Arc<dyn InventoryPort>,
    strategy: Arc<dyn BotStrategy>,
    rng_source: Arc<dyn RngSource>,
    clock: Arc<dyn Clock>,
    rewards: RewardTable,
}

impl BattleServiceBuilder {
    fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            catalog: Arc::new(InMemoryCatalog::seeded()),
            inventory: Arc::new(InMemoryInventory::new()),
            strategy: Arc::new(EnhancedBotStrategy::new()),
            rng_source: Arc::new(SeededRngSource),
            clock: Arc::new(SystemClock),
            rewards: RewardTable::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogPort>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_inventory(mut self, inventory: Arc<dyn InventoryPort>) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn BotStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_rng_source(mut self, rng_source: Arc<dyn RngSource>) -> Self {
        self.rng_source = rng_source;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_reward_table(mut self, rewards: RewardTable) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn build(self) -> BattleService {
        BattleService {
            store: self.store,
            catalog: self.catalog,
            inventory: self.inventory,
            strategy: self.strategy,
            rng_source: self.rng_source,
            clock: self.clock,
            calculator: RewardCalculator::new(self.rewards),
            session_mutexes: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
