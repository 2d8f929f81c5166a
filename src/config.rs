use std::str::FromStr;
use std::time::Duration;

use crate::auth::TokenConfig;
use crate::battle::CleanupConfig;
use crate::bot::BotDifficulty;

const DEV_SECRET: &str = "pokebattle-dev-secret-change-in-production";

/// Server settings read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Sessions are kept in PostgreSQL when set, in memory otherwise.
    pub database_url: Option<String>,
    pub cleanup: CleanupConfig,
    pub ai_difficulty: BotDifficulty,
    pub jwt_secret: String,
    pub token_expiration_days: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            cleanup: CleanupConfig::default(),
            ai_difficulty: BotDifficulty::default(),
            jwt_secret: DEV_SECRET.to_string(),
            token_expiration_days: 30,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let session_ttl_secs: i64 = parse_or(&lookup, "SESSION_TTL_SECS", 24 * 60 * 60);
        let cleanup_interval_secs: u64 = parse_or(&lookup, "SESSION_CLEANUP_INTERVAL_SECS", 30 * 60);

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            cleanup: CleanupConfig {
                cleanup_interval: Duration::from_secs(cleanup_interval_secs.max(1)),
                session_ttl: chrono::Duration::seconds(session_ttl_secs.max(0)),
            },
            ai_difficulty: parse_or(&lookup, "AI_DIFFICULTY", defaults.ai_difficulty),
            jwt_secret: lookup("JWT_SECRET")
                .filter(|secret| !secret.is_empty())
                .unwrap_or(defaults.jwt_secret),
            token_expiration_days: parse_or(
                &lookup,
                "TOKEN_EXPIRATION_DAYS",
                defaults.token_expiration_days,
            ),
        }
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::with_secret(self.jwt_secret.clone(), self.token_expiration_days)
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
