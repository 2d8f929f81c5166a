pub mod basic_strategy;
pub mod enhanced_strategy;
pub mod strategy_factory;
pub mod types;

pub use basic_strategy::BasicBotStrategy;
pub use enhanced_strategy::EnhancedBotStrategy;
pub use strategy_factory::BotStrategyFactory;
pub use types::{first_alive_other, BotDifficulty, BotStrategy, DecisionContext};
