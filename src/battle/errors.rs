use thiserror::Error;

use crate::game::BattleError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt session blob: {0}")]
    Decode(String),

    #[error("Failed to encode session: {0}")]
    Encode(String),
}

impl From<StoreError> for BattleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => BattleError::StoreUnavailable(msg),
            other => BattleError::PersistFailed(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}
