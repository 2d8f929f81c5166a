use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, instrument};

use super::models::SessionSummary;
use super::types::{
    ActionRequest, RewardCardRequest, RewardCardResponse, StartBattleRequest, SwitchRequest,
};
use crate::auth::UserClaims;
use crate::game::{Action, SessionView};
use crate::rewards::RewardRecord;
use crate::shared::{AppError, AppState};

/// HTTP handler for starting a battle
///
/// POST /battles
/// Explicit decks must come as a pair; without them the inventory deck is used.
#[instrument(name = "start_battle", skip(state, claims, request), fields(user_id = claims.user_id))]
pub async fn start_battle(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Json(request): Json<StartBattleRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let service = &state.battle_service;
    let view = match (request.player_deck, request.ai_deck) {
        (Some(player_deck), Some(ai_deck)) => {
            service
                .start_battle(claims.user_id, &request.mode, player_deck, ai_deck)
                .await?
        }
        (None, None) => {
            service
                .start_random_battle(claims.user_id, &request.mode)
                .await?
        }
        _ => {
            return Err(AppError::BadRequest(
                "player_deck and ai_deck must be given together".to_string(),
            ))
        }
    };

    info!(session_id = %view.id, mode = %view.mode, "Battle created");
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /battles
#[instrument(name = "list_battles", skip(state, claims), fields(user_id = claims.user_id))]
pub async fn list_battles(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<Vec<SessionSummary>>, AppError> {
    let sessions = state.battle_service.list_sessions(claims.user_id).await?;
    Ok(Json(sessions))
}

/// GET /battles/:id
#[instrument(name = "get_battle", skip(state, claims), fields(user_id = claims.user_id))]
pub async fn get_battle(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .battle_service
        .get_session(&session_id, claims.user_id)
        .await?;
    Ok(Json(view))
}

/// HTTP handler for one player action
///
/// POST /battles/:id/actions
/// Returns the session view with this request's log lines
#[instrument(name = "apply_action", skip(state, claims, request), fields(user_id = claims.user_id, action = %request.action))]
pub async fn apply_action(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(session_id): Path<String>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<SessionView>, AppError> {
    let action = Action::from_wire(&request.action, request.move_idx)?;
    let view = state
        .battle_service
        .apply_action(&session_id, claims.user_id, action)
        .await?;
    Ok(Json(view))
}

/// POST /battles/:id/switch
#[instrument(name = "switch_combatant", skip(state, claims, request), fields(user_id = claims.user_id))]
pub async fn switch_combatant(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(session_id): Path<String>,
    Json(request): Json<SwitchRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .battle_service
        .switch_combatant(&session_id, claims.user_id, request.new_idx)
        .await?;
    Ok(Json(view))
}

/// POST /battles/:id/rewards
#[instrument(name = "claim_rewards", skip(state, claims), fields(user_id = claims.user_id))]
pub async fn claim_rewards(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(session_id): Path<String>,
) -> Result<Json<RewardRecord>, AppError> {
    let record = state
        .battle_service
        .claim_rewards(&session_id, claims.user_id)
        .await?;
    Ok(Json(record))
}

/// POST /battles/:id/reward-card
#[instrument(name = "select_reward_card", skip(state, claims, request), fields(user_id = claims.user_id))]
pub async fn select_reward_card(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(session_id): Path<String>,
    Json(request): Json<RewardCardRequest>,
) -> Result<Json<RewardCardResponse>, AppError> {
    let response = state
        .battle_service
        .select_reward_card(&session_id, claims.user_id, request.card_index)
        .await?;
    Ok(Json(response))
}
