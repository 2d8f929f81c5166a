use chrono::{DateTime, Utc};
use serde::Serialize;

use super::card::CombatCard;
use super::core::{BattleMode, BattleSession, WhoseTurn, Winner};
use super::log::LogEntry;
use crate::rewards::RewardRecord;

/// What the caller may see of one AI card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AiCardView {
    Visible {
        #[serde(flatten)]
        card: CombatCard,
        is_active: bool,
        is_face_down: bool,
    },
    Hidden {
        card_id: u32,
        is_knocked_out: bool,
        is_active: bool,
        is_face_down: bool,
    },
}

/// Externalized session shape returned by every battle operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub id: String,
    pub mode: BattleMode,
    pub turn_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_number: Option<u32>,
    pub whose_turn: WhoseTurn,
    pub battle_over: bool,
    pub winner: Winner,
    pub reward_claimed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<RewardRecord>,
    pub can_switch: bool,
    pub player_deck: Vec<CombatCard>,
    pub player_active_idx: usize,
    pub ai_deck: Vec<AiCardView>,
    pub ai_active_idx: usize,
    pub log: Vec<LogEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionView {
    /// Builds the view with this request's log lines.
    ///
    /// In team mode inactive AI cards are face down until the battle is over.
    pub fn new(session: &BattleSession, log: Vec<LogEntry>) -> Self {
        let reveal_all = session.mode() == BattleMode::Duel || session.is_battle_over();
        let ai_active = session.ai_active_idx();

        let ai_deck = session
            .ai_deck()
            .iter()
            .enumerate()
            .map(|(idx, card)| {
                let is_active = idx == ai_active;
                if reveal_all || is_active {
                    AiCardView::Visible {
                        card: card.clone(),
                        is_active,
                        is_face_down: false,
                    }
                } else {
                    AiCardView::Hidden {
                        card_id: card.card_id,
                        is_knocked_out: card.is_knocked_out,
                        is_active: false,
                        is_face_down: !card.is_knocked_out,
                    }
                }
            })
            .collect();

        Self {
            id: session.id().to_string(),
            mode: session.mode(),
            turn_number: session.turn_number(),
            round_number: (session.mode() == BattleMode::Team).then(|| session.round_number()),
            whose_turn: session.whose_turn(),
            battle_over: session.is_battle_over(),
            winner: session.winner(),
            reward_claimed: session.reward_claimed(),
            reward: session.reward().cloned(),
            can_switch: session.can_player_switch(),
            player_deck: session.player_deck().to_vec(),
            player_active_idx: session.player_active_idx(),
            ai_deck,
            ai_active_idx: ai_active,
            log,
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        }
    }
}
