use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth, battle, shared::AppState};

/// Full HTTP surface. Battle routes sit behind the bearer-token middleware.
pub fn build_router(app_state: AppState) -> Router {
    let battle_routes = Router::new()
        .route("/battles", post(battle::start_battle).get(battle::list_battles))
        .route("/battles/:id", get(battle::get_battle))
        .route("/battles/:id/actions", post(battle::apply_action))
        .route("/battles/:id/switch", post(battle::switch_combatant))
        .route("/battles/:id/rewards", post(battle::claim_rewards))
        .route("/battles/:id/reward-card", post(battle::select_reward_card))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::jwt_auth,
        ));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/auth/token", post(auth::issue_guest_token))
        .merge(battle_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
