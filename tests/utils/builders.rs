#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use pokebattle::game::{
    Action, ActionOutcome, BattleError, BattleMode, BattleSession, CombatCard, CreatureType,
    FixedClock, Move, RngPort, TurnContext,
};
use pokebattle::bot::BotStrategy;

// ============================================================================
// Card Construction
// ============================================================================

/// Builds combat cards with explicit stats. Defaults: 100 hp, 100 stamina, attack 50,
/// defense 0, Normal type, four copies of a 40-power Normal move costing 10.
pub struct CardBuilder {
    card: CombatCard,
}

impl CardBuilder {
    pub fn new(card_id: u32, name: &str) -> Self {
        Self {
            card: CombatCard {
                card_id,
                name: name.to_string(),
                level: 1,
                hp: 100,
                hp_max: 100,
                stamina: 100,
                stamina_max: 100,
                attack: 50,
                defense: 0,
                speed: 50,
                types: vec![CreatureType::Normal],
                moves: vec![Move::new("tackle", 40, CreatureType::Normal).with_cost(10); 4],
                sprite: None,
                is_knocked_out: false,
                is_legendary: false,
            },
        }
    }

    pub fn hp(mut self, hp: u32, hp_max: u32) -> Self {
        self.card.hp = hp;
        self.card.hp_max = hp_max;
        self
    }

    pub fn stamina(mut self, stamina: u32, stamina_max: u32) -> Self {
        self.card.stamina = stamina;
        self.card.stamina_max = stamina_max;
        self
    }

    pub fn attack(mut self, attack: u32) -> Self {
        self.card.attack = attack;
        self
    }

    pub fn defense(mut self, defense: u32) -> Self {
        self.card.defense = defense;
        self
    }

    pub fn types(mut self, types: &[CreatureType]) -> Self {
        self.card.types = types.to_vec();
        self
    }

    /// Replaces move `idx`.
    pub fn with_move(mut self, idx: usize, mv: Move) -> Self {
        self.card.moves[idx] = mv;
        self
    }

    pub fn build(self) -> CombatCard {
        self.card
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap()
}

pub fn start_session(
    mode: BattleMode,
    player_deck: Vec<CombatCard>,
    ai_deck: Vec<CombatCard>,
) -> BattleSession {
    BattleSession::start(
        "battle-1".to_string(),
        1,
        mode,
        player_deck,
        ai_deck,
        42,
        start_time(),
    )
    .unwrap()
}

/// Applies one player action with the given collaborators.
pub fn drive(
    session: &mut BattleSession,
    action: Action,
    rng: &mut dyn RngPort,
    strategy: &dyn BotStrategy,
    clock: &FixedClock,
) -> Result<ActionOutcome, BattleError> {
    let mut ctx = TurnContext {
        rng,
        strategy,
        clock,
    };
    session.apply_action(action, &mut ctx)
}
