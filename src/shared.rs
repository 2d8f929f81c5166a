use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::TokenConfig;
use crate::battle::BattleService;
use crate::game::{BattleError, SessionView};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub battle_service: Arc<BattleService>,
    pub token_config: TokenConfig,
}

impl AppState {
    pub fn new(battle_service: Arc<BattleService>, token_config: TokenConfig) -> Self {
        Self {
            battle_service,
            token_config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Battle(#[from] BattleError),

    /// The action was applied and saved but its reward credit failed. Carries the view so
    /// the caller still sees the action's log.
    #[error("{source}")]
    RewardsPending {
        source: BattleError,
        view: Box<SessionView>,
    },

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Battle(err) | AppError::RewardsPending { source: err, .. } => err.code(),
            AppError::JwtError(_) => "JWT_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Battle(err) | AppError::RewardsPending { source: err, .. } => {
                battle_status(err)
            }
            AppError::JwtError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn battle_status(err: &BattleError) -> StatusCode {
    match err {
        BattleError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        BattleError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        BattleError::BattleOver
        | BattleError::BattleNotOver
        | BattleError::AlreadyClaimed
        | BattleError::NotYourTurn => StatusCode::CONFLICT,
        other if other.is_resource() => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        if let AppError::RewardsPending { view, .. } = &self {
            body["session"] = json!(view);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::battle::repository::InMemorySessionStore;
    use crate::battle::SessionStore;

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        store: Option<Arc<dyn SessionStore>>,
        battle_service: Option<Arc<BattleService>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                store: None,
                battle_service: None,
            }
        }

        pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
            self.store = Some(store);
            self
        }

        pub fn with_battle_service(mut self, battle_service: Arc<BattleService>) -> Self {
            self.battle_service = Some(battle_service);
            self
        }

        pub fn build(self) -> AppState {
            let battle_service = self.battle_service.unwrap_or_else(|| {
                let store = self
                    .store
                    .unwrap_or_else(|| Arc::new(InMemorySessionStore::new()));
                Arc::new(BattleService::builder(store).build())
            });
            AppState {
                battle_service,
                token_config: TokenConfig::with_secret("test-secret", 1),
            }
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
