use serde::{Deserialize, Serialize};

use super::damage::floor_damage;
use super::errors::BattleError;
use super::type_chart::{is_legendary_or_mythical, CreatureType};

pub const MOVES_PER_CARD: usize = 4;
pub const MAX_LEVEL: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub name: String,
    pub power: u32,
    pub stamina_cost: u32,
    #[serde(rename = "attack_type")]
    pub move_type: CreatureType,
}

impl Move {
    /// Move with the conventional stamina cost of a third of its power.
    pub fn new(name: impl Into<String>, power: u32, move_type: CreatureType) -> Self {
        Self {
            name: name.into(),
            power,
            stamina_cost: power / 3,
            move_type,
        }
    }

    pub fn with_cost(mut self, stamina_cost: u32) -> Self {
        self.stamina_cost = stamina_cost;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

/// Stats derived from base stats at a given level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub stamina_max: u32,
}

pub fn stats_at_level(base: &BaseStats, level: u32) -> LevelStats {
    let steps = f64::from(level.clamp(1, MAX_LEVEL) - 1);
    let scale = |value: u32, per_level: f64| floor_damage(f64::from(value) * (1.0 + steps * per_level));

    let speed = scale(base.speed, 0.01);
    LevelStats {
        hp: scale(base.hp, 0.03),
        attack: scale(base.attack, 0.02),
        defense: scale(base.defense, 0.02),
        speed,
        stamina_max: speed * 2,
    }
}

/// Read-only creature description served by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub base: BaseStats,
    pub types: Vec<CreatureType>,
    pub moves: Vec<Move>,
    #[serde(default)]
    pub sprite: Option<String>,
    #[serde(default)]
    pub is_legendary: bool,
    #[serde(default)]
    pub is_mythical: bool,
}

/// One combatant as it exists inside a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatCard {
    pub card_id: u32,
    pub name: String,
    pub level: u32,
    pub hp: u32,
    pub hp_max: u32,
    pub stamina: u32,
    pub stamina_max: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub types: Vec<CreatureType>,
    pub moves: Vec<Move>,
    #[serde(default)]
    pub sprite: Option<String>,
    pub is_knocked_out: bool,
    #[serde(default)]
    pub is_legendary: bool,
}

impl CombatCard {
    /// Converts a catalog entry at `level`, with hp and stamina at their maxima.
    pub fn from_catalog(
        card_id: u32,
        entry: &CatalogEntry,
        level: u32,
    ) -> Result<Self, BattleError> {
        let level = level.clamp(1, MAX_LEVEL);
        let stats = stats_at_level(&entry.base, level);

        let card = Self {
            card_id,
            name: entry.name.clone(),
            level,
            hp: stats.hp,
            hp_max: stats.hp,
            stamina: stats.stamina_max,
            stamina_max: stats.stamina_max,
            attack: stats.attack,
            defense: stats.defense,
            speed: stats.speed,
            types: entry.types.clone(),
            moves: entry.moves.clone(),
            sprite: entry.sprite.clone(),
            is_knocked_out: false,
            is_legendary: entry.is_legendary
                || entry.is_mythical
                || is_legendary_or_mythical(&entry.name),
        };
        card.validate()?;
        Ok(card)
    }

    /// Structural checks applied to every card entering a battle.
    pub fn validate(&self) -> Result<(), BattleError> {
        if self.moves.len() != MOVES_PER_CARD {
            return Err(BattleError::InvalidCard(format!(
                "{} has {} moves, expected {}",
                self.name,
                self.moves.len(),
                MOVES_PER_CARD
            )));
        }
        if self.types.is_empty() || self.types.len() > 2 {
            return Err(BattleError::InvalidCard(format!(
                "{} has {} types",
                self.name,
                self.types.len()
            )));
        }
        if self.hp_max == 0 || self.stamina_max == 0 {
            return Err(BattleError::InvalidCard(format!(
                "{} has a zero hp or stamina maximum",
                self.name
            )));
        }
        Ok(())
    }

    pub fn defend_cost(&self) -> u32 {
        self.hp_max.div_ceil(2)
    }

    pub fn can_attack(&self, move_idx: usize) -> bool {
        self.moves
            .get(move_idx)
            .is_some_and(|mv| self.stamina >= mv.stamina_cost)
    }

    pub fn can_attack_with_any(&self) -> bool {
        (0..self.moves.len()).any(|idx| self.can_attack(idx))
    }

    pub fn can_defend(&self) -> bool {
        self.stamina >= self.defend_cost()
    }

    pub fn is_alive(&self) -> bool {
        !self.is_knocked_out
    }

    pub fn hp_fraction(&self) -> f64 {
        fraction(self.hp, self.hp_max)
    }

    pub fn stamina_fraction(&self) -> f64 {
        fraction(self.stamina, self.stamina_max)
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
        self.sync_knockout();
    }

    pub fn spend_stamina(&mut self, amount: u32) {
        self.stamina = self.stamina.saturating_sub(amount);
    }

    pub fn restore_stamina(&mut self, amount: u32) {
        self.stamina = self.stamina.saturating_add(amount).min(self.stamina_max);
    }

    pub fn knock_out(&mut self) {
        self.hp = 0;
        self.sync_knockout();
    }

    /// Pulls hp and stamina back into range and refreshes the knocked-out flag.
    pub fn clamp(&mut self) {
        self.hp = self.hp.min(self.hp_max);
        self.stamina = self.stamina.min(self.stamina_max);
        self.sync_knockout();
    }

    fn sync_knockout(&mut self) {
        self.is_knocked_out = self.hp == 0;
    }
}

fn fraction(value: u32, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    f64::from(value) / f64::from(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pikachu() -> CatalogEntry {
        CatalogEntry {
            name: "pikachu".to_string(),
            base: BaseStats {
                hp: 100,
                attack: 55,
                defense: 40,
                speed: 90,
            },
            types: vec![CreatureType::Electric],
            moves: vec![
                Move::new("thunderbolt", 90, CreatureType::Electric),
                Move::new("quick-attack", 40, CreatureType::Normal),
                Move::new("iron-tail", 100, CreatureType::Steel),
                Move::new("spark", 65, CreatureType::Electric),
            ],
            sprite: None,
            is_legendary: false,
            is_mythical: false,
        }
    }

    #[test]
    fn test_conversion_starts_at_max() {
        let card = CombatCard::from_catalog(7, &pikachu(), 1).unwrap();
        assert_eq!(card.card_id, 7);
        assert_eq!(card.hp, 100);
        assert_eq!(card.hp_max, 100);
        assert_eq!(card.stamina, 180);
        assert_eq!(card.stamina_max, 180);
        assert!(!card.is_knocked_out);
        assert!(!card.is_legendary);
    }

    #[test]
    fn test_conversion_applies_level_scaling() {
        let card = CombatCard::from_catalog(1, &pikachu(), 11).unwrap();
        assert_eq!(card.level, 11);
        assert_eq!(card.hp_max, 130);
        assert_eq!(card.attack, 66);
        assert_eq!(card.defense, 48);
        assert_eq!(card.speed, 99);
        assert_eq!(card.stamina_max, 198);
    }

    #[test]
    fn test_conversion_rejects_wrong_move_count() {
        let mut entry = pikachu();
        entry.moves.pop();
        assert!(matches!(
            CombatCard::from_catalog(1, &entry, 1),
            Err(BattleError::InvalidCard(_))
        ));
    }

    #[test]
    fn test_legendary_flag_from_name() {
        let mut entry = pikachu();
        entry.name = "mewtwo".to_string();
        let card = CombatCard::from_catalog(1, &entry, 1).unwrap();
        assert!(card.is_legendary);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(2, 1)]
    #[case(3, 2)]
    #[case(70, 35)]
    #[case(121, 61)]
    fn test_defend_cost_rounds_up(#[case] hp_max: u32, #[case] expected: u32) {
        let mut card = CombatCard::from_catalog(1, &pikachu(), 1).unwrap();
        card.hp_max = hp_max;
        assert_eq!(card.defend_cost(), expected);
    }

    #[test]
    fn test_attack_at_exact_cost() {
        let mut card = CombatCard::from_catalog(1, &pikachu(), 1).unwrap();
        card.stamina = 30;
        assert!(card.can_attack(0));
        card.stamina = 29;
        assert!(!card.can_attack(0));
        assert!(card.can_attack(1));
        assert!(!card.can_attack(9));
    }

    #[test]
    fn test_mutators_clamp() {
        let mut card = CombatCard::from_catalog(1, &pikachu(), 1).unwrap();
        card.take_damage(40);
        assert_eq!(card.hp, 60);
        card.take_damage(500);
        assert_eq!(card.hp, 0);
        assert!(card.is_knocked_out);

        card.spend_stamina(1000);
        assert_eq!(card.stamina, 0);
        card.restore_stamina(1000);
        assert_eq!(card.stamina, card.stamina_max);
    }

    #[rstest]
    #[case(1, 100, 50, 60)]
    #[case(2, 103, 51, 60)]
    #[case(50, 247, 99, 89)]
    #[case(60, 247, 99, 89)]
    fn test_stats_at_level(
        #[case] level: u32,
        #[case] hp: u32,
        #[case] attack: u32,
        #[case] speed: u32,
    ) {
        let base = BaseStats {
            hp: 100,
            attack: 50,
            defense: 50,
            speed: 60,
        };
        let stats = stats_at_level(&base, level);
        assert_eq!(stats.hp, hp);
        assert_eq!(stats.attack, attack);
        assert_eq!(stats.speed, speed);
        assert_eq!(stats.stamina_max, speed * 2);
    }
}
