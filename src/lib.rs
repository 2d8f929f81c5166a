// Library crate for the creature battle server
// This file exposes the public API for integration tests

pub mod app;
pub mod auth;
pub mod battle;
pub mod bot;
pub mod config;
pub mod game;
pub mod inventory;
pub mod rewards;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use battle::{BattleService, InMemorySessionStore, SessionStore};
pub use game::{Action, BattleError, BattleMode, BattleSession, SessionView, Winner};
pub use shared::{AppError, AppState};
