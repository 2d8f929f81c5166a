use super::card::CombatCard;
use super::damage::floor_damage;
use super::errors::BattleError;

pub const MAX_SACRIFICES: u8 = 3;

/// HP paid and share of max stamina regained, by how many sacrifices came before.
const SCHEDULE: [(u32, f64); MAX_SACRIFICES as usize] = [(10, 0.50), (15, 0.25), (20, 0.15)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SacrificeOutcome {
    pub hp_cost: u32,
    pub stamina_gain: u32,
}

pub fn step_cost(count: u8) -> Option<(u32, f64)> {
    SCHEDULE.get(usize::from(count)).copied()
}

/// Checks every precondition for the next sacrifice of `card`.
pub fn check(card: &CombatCard, count: u8) -> Result<(u32, f64), BattleError> {
    let Some((hp_cost, fraction)) = step_cost(count) else {
        return Err(BattleError::SacrificeForbidden(format!(
            "already sacrificed {MAX_SACRIFICES} times"
        )));
    };
    if card.is_knocked_out {
        return Err(BattleError::SacrificeForbidden(
            "knocked out Pokemon cannot sacrifice".to_string(),
        ));
    }
    // strictly below half
    if u64::from(card.stamina) * 2 >= u64::from(card.stamina_max) {
        return Err(BattleError::SacrificeForbidden(
            "stamina must be below half".to_string(),
        ));
    }
    if card.hp <= hp_cost {
        return Err(BattleError::SacrificeForbidden(format!(
            "need more than {hp_cost} HP"
        )));
    }
    Ok((hp_cost, fraction))
}

pub fn can_sacrifice(card: &CombatCard, count: u8) -> bool {
    check(card, count).is_ok()
}

/// Applies the next sacrifice step and bumps `count`.
pub fn apply(card: &mut CombatCard, count: &mut u8) -> Result<SacrificeOutcome, BattleError> {
    let (hp_cost, fraction) = check(card, *count)?;
    let gain = floor_damage(f64::from(card.stamina_max) * fraction);

    card.take_damage(hp_cost);
    let before = card.stamina;
    card.restore_stamina(gain);
    *count += 1;

    Ok(SacrificeOutcome {
        hp_cost,
        stamina_gain: card.stamina - before,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::Move;
    use crate::game::type_chart::CreatureType;
    use rstest::rstest;

    fn card(hp: u32, stamina: u32, stamina_max: u32) -> CombatCard {
        CombatCard {
            card_id: 1,
            name: "machop".to_string(),
            level: 1,
            hp,
            hp_max: 150,
            stamina,
            stamina_max,
            attack: 80,
            defense: 50,
            speed: stamina_max / 2,
            types: vec![CreatureType::Fighting],
            moves: vec![Move::new("karate-chop", 50, CreatureType::Fighting); 4],
            sprite: None,
            is_knocked_out: hp == 0,
            is_legendary: false,
        }
    }

    #[test]
    fn test_first_sacrifice() {
        let mut c = card(150, 20, 200);
        let mut count = 0;
        let outcome = apply(&mut c, &mut count).unwrap();
        assert_eq!(outcome.hp_cost, 10);
        assert_eq!(outcome.stamina_gain, 100);
        assert_eq!(c.hp, 140);
        assert_eq!(c.stamina, 120);
        assert_eq!(count, 1);
    }

    #[rstest]
    #[case(0, 10, 100)]
    #[case(1, 15, 50)]
    #[case(2, 20, 30)]
    fn test_schedule_steps(#[case] count: u8, #[case] hp_cost: u32, #[case] gain: u32) {
        let mut c = card(150, 0, 200);
        let mut counter = count;
        let outcome = apply(&mut c, &mut counter).unwrap();
        assert_eq!(outcome.hp_cost, hp_cost);
        assert_eq!(outcome.stamina_gain, gain);
        assert_eq!(counter, count + 1);
    }

    #[test]
    fn test_fourth_sacrifice_is_forbidden() {
        let c = card(150, 0, 200);
        assert!(matches!(check(&c, 3), Err(BattleError::SacrificeForbidden(_))));
    }

    #[test]
    fn test_exactly_half_stamina_is_rejected() {
        assert!(!can_sacrifice(&card(150, 100, 200), 0));
        assert!(can_sacrifice(&card(150, 99, 200), 0));
        // odd maximum: 50 of 101 is below half
        assert!(can_sacrifice(&card(150, 50, 101), 0));
        assert!(!can_sacrifice(&card(150, 51, 101), 0));
    }

    #[test]
    fn test_hp_equal_to_cost_is_rejected() {
        assert!(!can_sacrifice(&card(10, 0, 200), 0));
        assert!(can_sacrifice(&card(11, 0, 200), 0));
        assert!(!can_sacrifice(&card(15, 0, 200), 1));
    }

    #[test]
    fn test_gain_floors_share_of_max() {
        let mut c = card(150, 10, 101);
        let mut count = 0;
        let outcome = apply(&mut c, &mut count).unwrap();
        assert_eq!(outcome.stamina_gain, 50);
        assert_eq!(c.stamina, 60);

        let mut c = card(150, 0, 110);
        let mut count = 2;
        let outcome = apply(&mut c, &mut count).unwrap();
        assert_eq!(outcome.stamina_gain, 16);
        assert_eq!(c.hp, 130);
    }

    #[test]
    fn test_rejected_sacrifice_changes_nothing() {
        let mut c = card(150, 150, 200);
        let mut count = 1;
        assert!(apply(&mut c, &mut count).is_err());
        assert_eq!(c.hp, 150);
        assert_eq!(c.stamina, 150);
        assert_eq!(count, 1);
    }
}
