// Public API
pub use card::{
    stats_at_level, BaseStats, CatalogEntry, CombatCard, LevelStats, Move, MAX_LEVEL,
    MOVES_PER_CARD,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use self::core::{
    Action, ActionOutcome, BattleMode, BattleSession, Side, TurnContext, WhoseTurn, Winner,
    STALEMATE_PASSES,
};
pub use damage::{compute_damage, roll_percent, DamageTable, DAMAGE_PERCENTS, DEFEND_MULTIPLIER};
pub use errors::BattleError;
pub use log::{LogEntry, LogKind};
pub use resolver::{resolve_turn, Commit, MoveKind, TurnResolution};
pub use rng::{RngPort, ScriptedRng, SeededRng};
pub use type_chart::{damage_multiplier, effectiveness, is_legendary_or_mythical, CreatureType};
pub use view::{AiCardView, SessionView};

pub mod sacrifice;

// Internal modules
mod card;
mod clock;
mod core;
mod damage;
mod errors;
mod log;
mod resolver;
mod rng;
mod type_chart;
mod view;
