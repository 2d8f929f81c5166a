use tracing::debug;

use crate::game::{
    effectiveness, sacrifice, Action, BattleMode, CombatCard, MoveKind, RngPort,
};

use super::types::{first_alive_other, BotStrategy, DecisionContext};

const PASS_SCORE: f64 = 0.1;
const LOW_HP: f64 = 0.3;
const HIGH_HP: f64 = 0.7;
const DUEL_SURRENDER_HP: f64 = 0.1;
const DUEL_SURRENDER_CHANCE: f64 = 0.3;
const TEAM_SURRENDER_HP: f64 = 0.25;
const TEAM_SURRENDER_CHANCE: f64 = 0.4;
const TEAMMATE_MARGIN: f64 = 0.3;
const SWITCH_THRESHOLD: f64 = 0.3;

/// Scores every affordable option and picks the best one.
///
/// Attack moves are scored in index order, then defend, then pass. Ties keep the
/// earlier option.
pub struct EnhancedBotStrategy;

impl EnhancedBotStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Score for attacking with `move_idx`. Assumes the move exists.
    fn score_attack(&self, ctx: &DecisionContext<'_>, move_idx: usize) -> f64 {
        let mv = &ctx.ai_card.moves[move_idx];
        let power = f64::from(mv.power);
        let mut score = power / 100.0;

        let tm = effectiveness(mv.move_type, &ctx.player_card.types);
        if tm > 1.0 {
            score += 0.6 * (tm - 1.0);
        } else if tm < 1.0 {
            score -= 0.3 * (1.0 - tm);
        }

        match ctx.player_hint {
            Some(MoveKind::Defend) if mv.power >= 80 => score += 0.4,
            Some(MoveKind::Attack) => score -= 0.2,
            Some(MoveKind::Pass) => score += 0.5,
            _ => {}
        }

        // Free moves count their full power as efficiency.
        let efficiency = if mv.stamina_cost == 0 {
            power
        } else {
            power / f64::from(mv.stamina_cost)
        };
        score += 0.1 * efficiency;

        if ctx.ai_card.hp_fraction() < LOW_HP {
            score += 0.3;
        }
        score
    }

    fn score_defend(&self, ctx: &DecisionContext<'_>) -> f64 {
        let mut score = 0.0;
        match ctx.player_hint {
            Some(MoveKind::Attack) => {
                score += 0.7;
                let threatened = ctx
                    .player_card
                    .moves
                    .iter()
                    .any(|mv| effectiveness(mv.move_type, &ctx.ai_card.types) > 1.0);
                if threatened {
                    score += 0.3;
                }
            }
            Some(MoveKind::Defend) | Some(MoveKind::Pass) => score -= 0.5,
            None => {}
        }

        let hp = ctx.ai_card.hp_fraction();
        if hp < LOW_HP {
            score += 0.4;
        }
        if hp > HIGH_HP {
            score -= 0.2;
        }
        score
    }

    /// Fallback when neither attacking nor defending can be paid for.
    fn out_of_stamina(&self, ctx: &DecisionContext<'_>, rng: &mut dyn RngPort) -> Action {
        let card = ctx.ai_card;
        if sacrifice::can_sacrifice(card, ctx.sacrifice_count) {
            return Action::Sacrifice;
        }

        let hp = card.hp_fraction();
        let wants_out = match ctx.mode {
            BattleMode::Duel => {
                hp < DUEL_SURRENDER_HP
                    && card.stamina == 0
                    && rng.float64() < DUEL_SURRENDER_CHANCE
            }
            BattleMode::Team => {
                hp < TEAM_SURRENDER_HP
                    && ctx.has_healthier_teammate(TEAMMATE_MARGIN)
                    && card.stamina < card.stamina_max / 4
                    && rng.float64() < TEAM_SURRENDER_CHANCE
            }
        };

        if wants_out {
            Action::Surrender
        } else {
            Action::Pass
        }
    }
}

impl Default for EnhancedBotStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl BotStrategy for EnhancedBotStrategy {
    fn decide_action(&self, ctx: &DecisionContext<'_>, rng: &mut dyn RngPort) -> Action {
        let card = ctx.ai_card;
        if !card.can_attack_with_any() && !card.can_defend() {
            return self.out_of_stamina(ctx, rng);
        }

        let mut best = (Action::Pass, f64::NEG_INFINITY);
        let mut consider = |action: Action, score: f64| {
            if score > best.1 {
                best = (action, score);
            }
        };

        for move_idx in 0..card.moves.len() {
            if card.can_attack(move_idx) {
                consider(Action::Attack { move_idx }, self.score_attack(ctx, move_idx));
            }
        }
        if card.can_defend() {
            consider(Action::Defend, self.score_defend(ctx));
        }
        consider(Action::Pass, PASS_SCORE);

        debug!(
            card = %card.name,
            action = best.0.name(),
            score = best.1,
            "AI picked action"
        );
        best.0
    }

    fn choose_switch(&self, deck: &[CombatCard], active_idx: usize) -> Option<usize> {
        let active = deck.get(active_idx)?;
        if active.is_knocked_out {
            return first_alive_other(deck, active_idx);
        }

        let hp = active.hp_fraction();
        let stamina = active.stamina_fraction();
        if hp >= SWITCH_THRESHOLD && stamina >= SWITCH_THRESHOLD {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        let mut best_score = hp + stamina;
        for (idx, card) in deck.iter().enumerate() {
            if idx == active_idx || !card.is_alive() {
                continue;
            }
            let score = card.hp_fraction() + card.stamina_fraction();
            if score > best_score {
                best = Some((idx, score));
                best_score = score;
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn strategy_name(&self) -> &'static str {
        "EnhancedBotStrategy"
    }
}
