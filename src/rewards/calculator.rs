use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::game::{BattleError, BattleMode, CombatCard};

use super::leveling::level_up;
use super::models::{
    BattleHistoryEntry, BattleOutcome, BattleResult, CardProgress, RewardRecord, XpGain,
};

/// Coin and XP amounts for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeRewards {
    pub win_coins: u32,
    pub draw_coins: u32,
    pub loss_coins: u32,
    pub win_xp: u32,
    pub draw_xp: u32,
    pub loss_xp: u32,
}

impl ModeRewards {
    fn coins(&self, outcome: BattleOutcome) -> u32 {
        match outcome {
            BattleOutcome::Win => self.win_coins,
            BattleOutcome::Draw => self.draw_coins,
            BattleOutcome::Loss => self.loss_coins,
        }
    }

    fn xp(&self, outcome: BattleOutcome) -> u32 {
        match outcome {
            BattleOutcome::Win => self.win_xp,
            BattleOutcome::Draw => self.draw_xp,
            BattleOutcome::Loss => self.loss_xp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardTable {
    pub duel: ModeRewards,
    pub team: ModeRewards,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            duel: ModeRewards {
                win_coins: 50,
                draw_coins: 25,
                loss_coins: 10,
                win_xp: 20,
                draw_xp: 10,
                loss_xp: 0,
            },
            team: ModeRewards {
                win_coins: 150,
                draw_coins: 75,
                loss_coins: 25,
                win_xp: 15,
                draw_xp: 8,
                loss_xp: 0,
            },
        }
    }
}

impl RewardTable {
    pub fn for_mode(&self, mode: BattleMode) -> &ModeRewards {
        match mode {
            BattleMode::Duel => &self.duel,
            BattleMode::Team => &self.team,
        }
    }
}

/// A team card participated if it took damage or was knocked out.
pub fn participated(card: &CombatCard) -> bool {
    card.is_knocked_out || card.hp < card.hp_max
}

#[derive(Debug, Clone, Default)]
pub struct RewardCalculator {
    table: RewardTable,
}

impl RewardCalculator {
    pub fn new(table: RewardTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RewardTable {
        &self.table
    }

    /// Computes coins, XP and level-ups for a finished battle.
    ///
    /// `progress` holds the persisted level and XP per card id; cards without an entry
    /// still get their XP listed but produce no level-up record.
    pub fn calculate(
        &self,
        result: &BattleResult,
        progress: &HashMap<u32, CardProgress>,
        now: DateTime<Utc>,
    ) -> Result<RewardRecord, BattleError> {
        let outcome = BattleOutcome::from_winner(result.winner).ok_or(BattleError::BattleNotOver)?;
        let rewards = self.table.for_mode(result.mode);
        let coins = rewards.coins(outcome);
        let xp = rewards.xp(outcome);

        let xp_gains = if xp == 0 {
            Vec::new()
        } else {
            self.recipients(result, outcome)
                .map(|card| XpGain {
                    card_id: card.card_id,
                    name: card.name.clone(),
                    xp,
                })
                .collect()
        };

        let mut updated = Vec::new();
        let mut level_ups = Vec::new();
        for gain in &xp_gains {
            let Some(mut card_progress) = progress.get(&gain.card_id).copied() else {
                continue;
            };
            if let Some(record) = level_up(&mut card_progress, gain.xp) {
                level_ups.push(record);
            }
            updated.push(card_progress);
        }

        let duration_secs = (now - result.created_at).num_seconds().max(0);
        debug!(
            session_id = %result.session_id,
            outcome = ?outcome,
            coins,
            cards = xp_gains.len(),
            level_ups = level_ups.len(),
            "Rewards calculated"
        );

        Ok(RewardRecord {
            session_id: result.session_id.clone(),
            user_id: result.user_id,
            result: outcome,
            coins,
            xp_gains,
            progress: updated,
            level_ups,
            history: BattleHistoryEntry {
                session_id: result.session_id.clone(),
                user_id: result.user_id,
                mode: result.mode,
                result: outcome,
                coins,
                duration_secs,
            },
        })
    }

    fn recipients<'a>(
        &self,
        result: &'a BattleResult,
        outcome: BattleOutcome,
    ) -> Box<dyn Iterator<Item = &'a CombatCard> + 'a> {
        match (result.mode, outcome) {
            (BattleMode::Duel, _) => {
                Box::new(result.player_deck.get(result.player_active_idx).into_iter())
            }
            (BattleMode::Team, BattleOutcome::Win) => {
                Box::new(result.player_deck.iter().filter(|card| participated(card)))
            }
            (BattleMode::Team, _) => Box::new(result.player_deck.iter()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{BaseStats, CreatureType, Move, Winner};
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn card(card_id: u32, hp: u32) -> CombatCard {
        CombatCard {
            card_id,
            name: format!("card-{card_id}"),
            level: 1,
            hp,
            hp_max: 100,
            stamina: 50,
            stamina_max: 100,
            attack: 50,
            defense: 50,
            speed: 50,
            types: vec![CreatureType::Water],
            moves: vec![Move::new("surf", 90, CreatureType::Water); 4],
            sprite: None,
            is_knocked_out: hp == 0,
            is_legendary: false,
        }
    }

    fn result(mode: BattleMode, winner: Winner, deck: Vec<CombatCard>) -> BattleResult {
        BattleResult {
            session_id: "s-1".to_string(),
            user_id: 3,
            mode,
            winner,
            player_deck: deck,
            player_active_idx: 0,
            created_at: Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap(),
        }
    }

    fn later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap() + Duration::seconds(95)
    }

    #[rstest]
    #[case(BattleMode::Duel, Winner::Player, 50, 20)]
    #[case(BattleMode::Duel, Winner::Draw, 25, 10)]
    #[case(BattleMode::Duel, Winner::Ai, 10, 0)]
    fn test_duel_rewards(
        #[case] mode: BattleMode,
        #[case] winner: Winner,
        #[case] coins: u32,
        #[case] xp: u32,
    ) {
        let calculator = RewardCalculator::default();
        let record = calculator
            .calculate(&result(mode, winner, vec![card(9, 40)]), &HashMap::new(), later())
            .unwrap();
        assert_eq!(record.coins, coins);
        assert_eq!(record.xp_for(9), xp);
        assert_eq!(record.history.duration_secs, 95);
    }

    #[test]
    fn test_team_win_pays_participants_only() {
        let deck = vec![card(1, 0), card(2, 30), card(3, 99), card(4, 100), card(5, 100)];
        let calculator = RewardCalculator::default();
        let record = calculator
            .calculate(&result(BattleMode::Team, Winner::Player, deck), &HashMap::new(), later())
            .unwrap();

        assert_eq!(record.coins, 150);
        assert_eq!(record.result, BattleOutcome::Win);
        let ids: Vec<u32> = record.xp_gains.iter().map(|gain| gain.card_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(record.xp_gains.iter().all(|gain| gain.xp == 15));
        assert_eq!(record.xp_for(4), 0);
    }

    #[test]
    fn test_team_draw_pays_every_card() {
        let deck = vec![card(1, 0), card(2, 100), card(3, 100), card(4, 100), card(5, 0)];
        let record = RewardCalculator::default()
            .calculate(&result(BattleMode::Team, Winner::Draw, deck), &HashMap::new(), later())
            .unwrap();
        assert_eq!(record.coins, 75);
        assert_eq!(record.xp_gains.len(), 5);
        assert!(record.xp_gains.iter().all(|gain| gain.xp == 8));
    }

    #[test]
    fn test_team_loss_pays_no_xp() {
        let deck = vec![card(1, 0); 5];
        let record = RewardCalculator::default()
            .calculate(&result(BattleMode::Team, Winner::Ai, deck), &HashMap::new(), later())
            .unwrap();
        assert_eq!(record.coins, 25);
        assert!(record.xp_gains.is_empty());
        assert_eq!(record.history.result, BattleOutcome::Loss);
    }

    #[test]
    fn test_level_up_from_persisted_progress() {
        let progress = HashMap::from([(
            9,
            CardProgress {
                card_id: 9,
                level: 1,
                xp: 90,
                base: BaseStats {
                    hp: 100,
                    attack: 50,
                    defense: 50,
                    speed: 50,
                },
            },
        )]);
        let record = RewardCalculator::default()
            .calculate(
                &result(BattleMode::Duel, Winner::Player, vec![card(9, 100)]),
                &progress,
                later(),
            )
            .unwrap();
        assert_eq!(record.level_ups.len(), 1);
        assert_eq!(record.level_ups[0].new_level, 2);
        assert_eq!(record.progress[0].xp, 10);
    }

    #[test]
    fn test_unresolved_battle_is_rejected() {
        let err = RewardCalculator::default()
            .calculate(
                &result(BattleMode::Duel, Winner::Unresolved, vec![card(1, 100)]),
                &HashMap::new(),
                later(),
            )
            .unwrap_err();
        assert_eq!(err, BattleError::BattleNotOver);
    }

    #[test]
    fn test_win_always_pays_more_than_loss() {
        let table = RewardTable::default();
        for mode in [BattleMode::Duel, BattleMode::Team] {
            let rewards = table.for_mode(mode);
            assert!(rewards.win_coins > rewards.loss_coins);
        }
    }
}
