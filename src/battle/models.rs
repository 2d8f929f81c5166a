use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::StoreError;
use crate::game::{BattleMode, BattleSession, Winner};

/// Persisted form of a session: the serialized blob plus the columns the store indexes.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEnvelope {
    pub id: String,
    pub user_id: i64,
    pub mode: BattleMode,
    pub battle_over: bool,
    pub winner: Winner,
    pub state: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionEnvelope {
    pub fn from_session(session: &BattleSession) -> Result<Self, StoreError> {
        let state =
            serde_json::to_value(session).map_err(|e| StoreError::Encode(e.to_string()))?;
        Ok(Self {
            id: session.id().to_string(),
            user_id: session.user_id(),
            mode: session.mode(),
            battle_over: session.is_battle_over(),
            winner: session.winner(),
            state,
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        })
    }

    pub fn to_session(&self) -> Result<BattleSession, StoreError> {
        serde_json::from_value(self.state.clone()).map_err(|e| StoreError::Decode(e.to_string()))
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            mode: self.mode,
            battle_over: self.battle_over,
            winner: self.winner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Listing entry for a user's sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub mode: BattleMode,
    pub battle_over: bool,
    pub winner: Winner,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
