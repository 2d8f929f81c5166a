use axum::{extract::State, Json};
use tracing::{info, instrument};
use uuid::Uuid;

use super::types::TokenResponse;
use crate::shared::{AppError, AppState};

/// Positive 63-bit id taken from a fresh UUID v4.
fn new_guest_id() -> i64 {
    ((Uuid::new_v4().as_u128() >> 65) as i64).max(1)
}

/// HTTP handler creating a guest identity and its bearer token
///
/// POST /auth/token
/// Callers never choose the user id; each call mints a new one.
#[instrument(name = "issue_guest_token", skip(state))]
pub async fn issue_guest_token(
    State(state): State<AppState>,
) -> Result<Json<TokenResponse>, AppError> {
    let user_id = new_guest_id();
    let token = state.token_config.create_token(user_id)?;

    info!(user_id, "Guest token issued");

    Ok(Json(TokenResponse {
        token,
        user_id,
        expires_in_days: state.token_config.expiration_days,
    }))
}
