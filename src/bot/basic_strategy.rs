use tracing::debug;

use crate::game::{Action, CombatCard, RngPort};

use super::types::{first_alive_other, BotStrategy, DecisionContext};

/// Easy opponent: picks uniformly among the options it can pay for and never
/// sacrifices, surrenders or switches voluntarily.
pub struct BasicBotStrategy;

impl BasicBotStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Every attack and defend the active card can afford, plus pass.
    fn affordable_actions(&self, card: &CombatCard) -> Vec<Action> {
        let mut actions: Vec<Action> = (0..card.moves.len())
            .filter(|idx| card.can_attack(*idx))
            .map(|move_idx| Action::Attack { move_idx })
            .collect();
        if card.can_defend() {
            actions.push(Action::Defend);
        }
        actions.push(Action::Pass);
        actions
    }
}

impl Default for BasicBotStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl BotStrategy for BasicBotStrategy {
    fn decide_action(&self, ctx: &DecisionContext<'_>, rng: &mut dyn RngPort) -> Action {
        let actions = self.affordable_actions(ctx.ai_card);
        let pick = rng.intn(actions.len());
        let action = actions.get(pick).copied().unwrap_or(Action::Pass);
        debug!(
            card = %ctx.ai_card.name,
            options = actions.len(),
            action = action.name(),
            "Basic bot picked action"
        );
        action
    }

    fn choose_switch(&self, deck: &[CombatCard], active_idx: usize) -> Option<usize> {
        match deck.get(active_idx) {
            Some(card) if card.is_knocked_out => first_alive_other(deck, active_idx),
            _ => None,
        }
    }

    fn strategy_name(&self) -> &'static str {
        "BasicBotStrategy"
    }
}
