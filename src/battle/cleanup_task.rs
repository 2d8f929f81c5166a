use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument};

use super::service::BattleService;
use crate::shared::AppError;

/// Configuration for the session expiry task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often the task runs
    pub cleanup_interval: Duration,
    /// How long a session may sit untouched before it is removed
    pub session_ttl: chrono::Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(30 * 60),
            session_ttl: chrono::Duration::hours(24),
        }
    }
}

/// Periodically removes expired battle sessions. Runs until the runtime shuts down.
#[instrument(skip(battle_service))]
pub async fn start_cleanup_task(battle_service: Arc<BattleService>, config: CleanupConfig) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        session_ttl_secs = config.session_ttl.num_seconds(),
        "Starting session cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;

        match cleanup_expired_sessions(&battle_service, config.session_ttl).await {
            Ok(removed) => info!(removed, "Session cleanup completed"),
            Err(e) => error!(error = %e, "Session cleanup task failed"),
        }
    }
}

async fn cleanup_expired_sessions(
    battle_service: &BattleService,
    session_ttl: chrono::Duration,
) -> Result<u64, AppError> {
    battle_service.expire_older_than(session_ttl).await
}
