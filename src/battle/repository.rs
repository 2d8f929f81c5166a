use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

use super::errors::StoreError;
use super::models::{SessionEnvelope, SessionSummary};
use crate::game::{BattleMode, Winner};

/// Persistence port for battle sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists the full snapshot under its id, replacing any previous one.
    async fn save(&self, envelope: &SessionEnvelope) -> Result<(), StoreError>;
    async fn get(&self, session_id: &str) -> Result<Option<SessionEnvelope>, StoreError>;
    /// Idempotent.
    async fn delete(&self, session_id: &str) -> Result<(), StoreError>;
    /// Removes sessions last updated before `cutoff`; returns how many were removed.
    async fn expire_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
    /// Newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<SessionSummary>, StoreError>;
}

/// In-memory implementation of SessionStore for development and testing
///
/// Envelopes keep the serialized state, so a save followed by a get goes through the
/// same encoding as the database.
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, SessionEnvelope>>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn session_count(&self) -> usize {
        self.lock().map(|sessions| sessions.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, SessionEnvelope>>, StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Unavailable("session map lock poisoned".to_string()))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    #[instrument(skip(self, envelope), fields(session_id = %envelope.id))]
    async fn save(&self, envelope: &SessionEnvelope) -> Result<(), StoreError> {
        let mut sessions = self.lock()?;
        sessions.insert(envelope.id.clone(), envelope.clone());
        debug!(battle_over = envelope.battle_over, "Session saved in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, session_id: &str) -> Result<Option<SessionEnvelope>, StoreError> {
        let sessions = self.lock()?;
        let envelope = sessions.get(session_id).cloned();
        if envelope.is_none() {
            debug!(session_id = %session_id, "Session not found in memory");
        }
        Ok(envelope)
    }

    #[instrument(skip(self))]
    async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        let mut sessions = self.lock()?;
        if sessions.remove(session_id).is_some() {
            debug!(session_id = %session_id, "Session deleted from memory");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn expire_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, envelope| envelope.updated_at >= cutoff);
        let removed = (before - sessions.len()) as u64;
        debug!(expired_sessions_removed = removed, "Expired sessions removed from memory");
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<SessionSummary>, StoreError> {
        let sessions = self.lock()?;
        let mut summaries: Vec<SessionSummary> = sessions
            .values()
            .filter(|envelope| envelope.user_id == user_id)
            .map(SessionEnvelope::summary)
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }
}

/// PostgreSQL implementation of SessionStore
///
/// Expects the `battle_sessions` table from `migrations/0001_battle_sessions.sql`.
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_mode(value: &str) -> Result<BattleMode, StoreError> {
    value
        .parse()
        .map_err(|e: crate::game::BattleError| StoreError::Decode(e.to_string()))
}

fn parse_winner(value: &str) -> Result<Winner, StoreError> {
    value
        .parse()
        .map_err(|e: crate::game::BattleError| StoreError::Decode(e.to_string()))
}

fn envelope_from_row(row: &PgRow) -> Result<SessionEnvelope, StoreError> {
    let mode: String = row.try_get("mode")?;
    let winner: String = row.try_get("winner")?;
    Ok(SessionEnvelope {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        mode: parse_mode(&mode)?,
        battle_over: row.try_get("battle_over")?,
        winner: parse_winner(&winner)?,
        state: row.try_get("state")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn summary_from_row(row: &PgRow) -> Result<SessionSummary, StoreError> {
    let mode: String = row.try_get("mode")?;
    let winner: String = row.try_get("winner")?;
    Ok(SessionSummary {
        id: row.try_get("id")?,
        mode: parse_mode(&mode)?,
        battle_over: row.try_get("battle_over")?,
        winner: parse_winner(&winner)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    #[instrument(skip(self, envelope), fields(session_id = %envelope.id))]
    async fn save(&self, envelope: &SessionEnvelope) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO battle_sessions (id, user_id, mode, battle_over, winner, state, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO UPDATE SET battle_over = EXCLUDED.battle_over, winner = EXCLUDED.winner, \
             state = EXCLUDED.state, updated_at = EXCLUDED.updated_at",
        )
        .bind(&envelope.id)
        .bind(envelope.user_id)
        .bind(envelope.mode.as_str())
        .bind(envelope.battle_over)
        .bind(envelope.winner.as_str())
        .bind(&envelope.state)
        .bind(envelope.created_at)
        .bind(envelope.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to save battle session");
            StoreError::from(e)
        })?;

        debug!("Session saved in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, session_id: &str) -> Result<Option<SessionEnvelope>, StoreError> {
        let row = sqlx::query(
            "SELECT id, user_id, mode, battle_over, winner, state, created_at, updated_at \
             FROM battle_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id = %session_id, "Failed to fetch battle session");
            StoreError::from(e)
        })?;

        row.as_ref().map(envelope_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM battle_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, session_id = %session_id, "Failed to delete battle session");
                StoreError::from(e)
            })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn expire_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM battle_sessions WHERE updated_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to expire battle sessions");
                StoreError::from(e)
            })?;

        let removed = result.rows_affected();
        debug!(expired_sessions_removed = removed, "Expired sessions removed");
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<SessionSummary>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, mode, battle_over, winner, created_at, updated_at \
             FROM battle_sessions WHERE user_id = $1 ORDER BY updated_at DESC, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id, "Failed to list battle sessions");
            StoreError::from(e)
        })?;

        rows.iter().map(summary_from_row).collect()
    }
}
