pub mod calculator;
pub mod leveling;
pub mod models;

pub use calculator::{participated, ModeRewards, RewardCalculator, RewardTable};
pub use leveling::{apply_xp, level_up, xp_to_next};
pub use models::*;
