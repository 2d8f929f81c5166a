use pokebattle::{
    app::build_router,
    battle::{start_cleanup_task, BattleService, InMemorySessionStore, PostgresSessionStore, SessionStore},
    bot::BotStrategyFactory,
    config::ServerConfig,
    shared::AppState,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokebattle=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(bind_addr = %config.bind_addr, difficulty = %config.ai_difficulty, "Starting battle server");

    let store: Arc<dyn SessionStore> = match &config.database_url {
        Some(database_url) => match sqlx::PgPool::connect(database_url).await {
            Ok(pool) => {
                info!("Using PostgreSQL session store");
                Arc::new(PostgresSessionStore::new(pool))
            }
            Err(e) => {
                error!(error = %e, "Failed to connect to database");
                return;
            }
        },
        None => {
            info!("DATABASE_URL not set, using in-memory session store");
            Arc::new(InMemorySessionStore::new())
        }
    };

    let battle_service = Arc::new(
        BattleService::builder(store)
            .with_strategy(BotStrategyFactory::create_strategy(config.ai_difficulty))
            .build(),
    );

    tokio::spawn(start_cleanup_task(
        Arc::clone(&battle_service),
        config.cleanup.clone(),
    ));

    let app_state = AppState::new(battle_service, config.token_config());
    let app = build_router(app_state);

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, bind_addr = %config.bind_addr, "Failed to bind listener");
            return;
        }
    };
    info!("Server running on http://{}", config.bind_addr);
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
    }
}
