use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::game::{Action, BattleMode, CombatCard, MoveKind, RngPort};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BotDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Everything the computer opponent may look at when choosing an action.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub mode: BattleMode,
    pub ai_card: &'a CombatCard,
    pub player_card: &'a CombatCard,
    /// The player's commit for this turn; `None` when the AI commits first.
    pub player_hint: Option<MoveKind>,
    pub sacrifice_count: u8,
    pub ai_deck: &'a [CombatCard],
    pub ai_active_idx: usize,
}

impl DecisionContext<'_> {
    /// Whether another alive AI card is healthier than the active one by the given margin.
    pub fn has_healthier_teammate(&self, margin: f64) -> bool {
        let active = self.ai_card.hp_fraction();
        self.ai_deck
            .iter()
            .enumerate()
            .any(|(idx, card)| {
                idx != self.ai_active_idx && card.is_alive() && card.hp_fraction() > active + margin
            })
    }
}

/// Trait for computer-opponent decision making.
pub trait BotStrategy: Send + Sync {
    /// Pick the AI's next action. `Sacrifice` is re-asked after it is applied.
    fn decide_action(&self, ctx: &DecisionContext<'_>, rng: &mut dyn RngPort) -> Action;

    /// After a team-mode turn resolves: the index to switch to, if any.
    /// Must return an alive card when the active one is knocked out.
    fn choose_switch(&self, deck: &[CombatCard], active_idx: usize) -> Option<usize>;

    fn strategy_name(&self) -> &'static str;
}

/// Lowest-index alive card other than `active_idx`.
pub fn first_alive_other(deck: &[CombatCard], active_idx: usize) -> Option<usize> {
    deck.iter()
        .enumerate()
        .find(|(idx, card)| *idx != active_idx && card.is_alive())
        .map(|(idx, _)| idx)
}
