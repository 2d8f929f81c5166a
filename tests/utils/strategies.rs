#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use pokebattle::bot::{first_alive_other, BotStrategy, DecisionContext};
use pokebattle::game::{Action, RngPort};

/// Plays a fixed list of AI actions, then repeats the fallback. Switches only when the
/// active card is knocked out.
pub struct ScriptedStrategy {
    actions: Mutex<VecDeque<Action>>,
    fallback: Action,
}

impl ScriptedStrategy {
    pub fn new(actions: impl IntoIterator<Item = Action>, fallback: Action) -> Self {
        Self {
            actions: Mutex::new(actions.into_iter().collect()),
            fallback,
        }
    }

    /// Always the same action.
    pub fn always(action: Action) -> Self {
        Self::new([], action)
    }

    pub fn remaining(&self) -> usize {
        self.actions.lock().unwrap().len()
    }
}

impl BotStrategy for ScriptedStrategy {
    fn decide_action(&self, _ctx: &DecisionContext<'_>, _rng: &mut dyn RngPort) -> Action {
        self.actions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback)
    }

    fn choose_switch(&self, deck: &[pokebattle::game::CombatCard], active_idx: usize) -> Option<usize> {
        if deck.get(active_idx).is_some_and(|card| card.is_knocked_out) {
            first_alive_other(deck, active_idx)
        } else {
            None
        }
    }

    fn strategy_name(&self) -> &'static str {
        "ScriptedStrategy"
    }
}
