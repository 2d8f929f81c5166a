use std::sync::Arc;

use super::{
    basic_strategy::BasicBotStrategy,
    enhanced_strategy::EnhancedBotStrategy,
    types::{BotDifficulty, BotStrategy},
};

/// Factory for creating bot strategies based on difficulty level
pub struct BotStrategyFactory;

impl BotStrategyFactory {
    /// Create a strategy instance for the given difficulty level
    pub fn create_strategy(difficulty: BotDifficulty) -> Arc<dyn BotStrategy> {
        match difficulty {
            BotDifficulty::Easy => Arc::new(BasicBotStrategy::new()),
            // Hard shares the scored policy for now
            BotDifficulty::Medium | BotDifficulty::Hard => Arc::new(EnhancedBotStrategy::new()),
        }
    }
}
