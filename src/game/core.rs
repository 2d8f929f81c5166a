use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error};

use super::card::CombatCard;
use super::clock::Clock;
use super::errors::BattleError;
use super::log::LogEntry;
use super::resolver::{resolve_turn, Commit};
use super::rng::RngPort;
use super::sacrifice::{self, MAX_SACRIFICES};
use crate::bot::{first_alive_other, BotStrategy, DecisionContext};
use crate::rewards::{BattleResult, RewardRecord};

/// Consecutive double passes that end the battle in a draw.
pub const STALEMATE_PASSES: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleMode {
    #[serde(rename = "1v1")]
    Duel,
    #[serde(rename = "5v5")]
    Team,
}

impl BattleMode {
    pub fn deck_size(self) -> usize {
        match self {
            BattleMode::Duel => 1,
            BattleMode::Team => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BattleMode::Duel => "1v1",
            BattleMode::Team => "5v5",
        }
    }
}

impl fmt::Display for BattleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BattleMode {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1v1" | "duel" => Ok(BattleMode::Duel),
            "5v5" | "team" => Ok(BattleMode::Team),
            other => Err(BattleError::InvalidMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Ai,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Ai,
            Side::Ai => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Player => "Player",
            Side::Ai => "AI",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhoseTurn {
    Player,
    Ai,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    #[default]
    Unresolved,
    Player,
    Ai,
    Draw,
}

impl Winner {
    pub fn as_str(self) -> &'static str {
        match self {
            Winner::Unresolved => "unresolved",
            Winner::Player => "player",
            Winner::Ai => "ai",
            Winner::Draw => "draw",
        }
    }
}

impl FromStr for Winner {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unresolved" => Ok(Winner::Unresolved),
            "player" => Ok(Winner::Player),
            "ai" => Ok(Winner::Ai),
            "draw" => Ok(Winner::Draw),
            other => Err(BattleError::InvalidAction(format!("unknown winner '{other}'"))),
        }
    }
}

impl From<Side> for Winner {
    fn from(side: Side) -> Self {
        match side {
            Side::Player => Winner::Player,
            Side::Ai => Winner::Ai,
        }
    }
}

/// An action submitted for a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Attack { move_idx: usize },
    Defend,
    Pass,
    Sacrifice,
    Surrender,
}

impl Action {
    /// Builds an action from its wire name. `attack` needs a move index; other actions
    /// ignore it.
    pub fn from_wire(action: &str, move_idx: Option<usize>) -> Result<Self, BattleError> {
        match action.trim().to_ascii_lowercase().as_str() {
            "attack" => move_idx
                .map(|move_idx| Action::Attack { move_idx })
                .ok_or_else(|| BattleError::InvalidAction("attack requires move_idx".to_string())),
            "defend" => Ok(Action::Defend),
            "pass" => Ok(Action::Pass),
            "sacrifice" => Ok(Action::Sacrifice),
            "surrender" => Ok(Action::Surrender),
            other => Err(BattleError::InvalidAction(format!("unknown action '{other}'"))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Attack { .. } => "attack",
            Action::Defend => "defend",
            Action::Pass => "pass",
            Action::Sacrifice => "sacrifice",
            Action::Surrender => "surrender",
        }
    }
}

/// Collaborators one `apply_action` call runs against.
pub struct TurnContext<'a> {
    pub rng: &'a mut dyn RngPort,
    pub strategy: &'a dyn BotStrategy,
    pub clock: &'a dyn Clock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub log: Vec<LogEntry>,
    pub turn_advanced: bool,
    pub round_advanced: bool,
    pub battle_ended: bool,
}

enum AiStep {
    Committed,
    Surrendered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSession {
    id: String,
    user_id: i64,
    mode: BattleMode,
    player_deck: Vec<CombatCard>,
    ai_deck: Vec<CombatCard>,
    player_active_idx: usize,
    ai_active_idx: usize,
    turn_number: u32,
    round_number: u32,
    /// Turns resolved since the current round began.
    round_turns: u32,
    /// Last turn whose header is in the log.
    #[serde(default)]
    header_turn: u32,
    whose_turn: WhoseTurn,
    battle_over: bool,
    winner: Winner,
    player_surrendered: bool,
    reward_claimed: bool,
    reward: Option<RewardRecord>,
    reward_card_claimed: bool,
    consecutive_passes: u8,
    pending_player_move: Option<Commit>,
    pending_ai_move: Option<Commit>,
    player_sacrifices: BTreeMap<usize, u8>,
    ai_sacrifices: BTreeMap<usize, u8>,
    /// The player's active card has resolved a turn since it came in.
    player_has_played_turn: bool,
    player_just_switched: bool,
    rng_seed: u64,
    action_count: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BattleSession {
    /// Creates a battle at turn 1 with the player to act.
    pub fn start(
        id: String,
        user_id: i64,
        mode: BattleMode,
        player_deck: Vec<CombatCard>,
        ai_deck: Vec<CombatCard>,
        rng_seed: u64,
        now: DateTime<Utc>,
    ) -> Result<Self, BattleError> {
        let expected = mode.deck_size();
        if player_deck.len() != expected || ai_deck.len() != expected {
            return Err(BattleError::DeckSizeMismatch {
                mode: mode.to_string(),
                expected,
                player: player_deck.len(),
                ai: ai_deck.len(),
            });
        }
        for card in player_deck.iter().chain(ai_deck.iter()) {
            card.validate()?;
        }

        let first_alive = |deck: &[CombatCard], side: Side| {
            deck.iter().position(|card| card.hp > 0).ok_or_else(|| {
                BattleError::InvalidCard(format!("{side} deck has no Pokemon able to battle"))
            })
        };
        let player_active_idx = first_alive(&player_deck, Side::Player)?;
        let ai_active_idx = first_alive(&ai_deck, Side::Ai)?;

        let mut session = Self {
            id,
            user_id,
            mode,
            player_deck,
            ai_deck,
            player_active_idx,
            ai_active_idx,
            turn_number: 1,
            round_number: 1,
            round_turns: 0,
            header_turn: 0,
            whose_turn: WhoseTurn::Player,
            battle_over: false,
            winner: Winner::Unresolved,
            player_surrendered: false,
            reward_claimed: false,
            reward: None,
            reward_card_claimed: false,
            consecutive_passes: 0,
            pending_player_move: None,
            pending_ai_move: None,
            player_sacrifices: BTreeMap::new(),
            ai_sacrifices: BTreeMap::new(),
            player_has_played_turn: false,
            player_just_switched: false,
            rng_seed,
            action_count: 0,
            created_at: now,
            updated_at: now,
        };
        for card in session
            .player_deck
            .iter_mut()
            .chain(session.ai_deck.iter_mut())
        {
            card.clamp();
        }
        session.player_sacrifices.insert(player_active_idx, 0);
        session.ai_sacrifices.insert(ai_active_idx, 0);

        debug!(
            session_id = %session.id,
            mode = %mode,
            "Battle session created"
        );
        Ok(session)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn mode(&self) -> BattleMode {
        self.mode
    }

    pub fn player_deck(&self) -> &[CombatCard] {
        &self.player_deck
    }

    pub fn ai_deck(&self) -> &[CombatCard] {
        &self.ai_deck
    }

    pub fn player_active_idx(&self) -> usize {
        self.player_active_idx
    }

    pub fn ai_active_idx(&self) -> usize {
        self.ai_active_idx
    }

    pub fn player_active(&self) -> &CombatCard {
        &self.player_deck[self.player_active_idx]
    }

    pub fn ai_active(&self) -> &CombatCard {
        &self.ai_deck[self.ai_active_idx]
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn whose_turn(&self) -> WhoseTurn {
        self.whose_turn
    }

    pub fn is_battle_over(&self) -> bool {
        self.battle_over
    }

    pub fn winner(&self) -> Winner {
        self.winner
    }

    pub fn player_surrendered(&self) -> bool {
        self.player_surrendered
    }

    pub fn reward_claimed(&self) -> bool {
        self.reward_claimed
    }

    pub fn reward(&self) -> Option<&RewardRecord> {
        self.reward.as_ref()
    }

    pub fn reward_card_claimed(&self) -> bool {
        self.reward_card_claimed
    }

    pub fn consecutive_passes(&self) -> u8 {
        self.consecutive_passes
    }

    pub fn pending_player_move(&self) -> Option<Commit> {
        self.pending_player_move
    }

    pub fn pending_ai_move(&self) -> Option<Commit> {
        self.pending_ai_move
    }

    pub fn sacrifice_count(&self, side: Side, idx: usize) -> u8 {
        let counts = match side {
            Side::Player => &self.player_sacrifices,
            Side::Ai => &self.ai_sacrifices,
        };
        counts.get(&idx).copied().unwrap_or(0)
    }

    pub fn sacrifice_counts(&self, side: Side) -> &BTreeMap<usize, u8> {
        match side {
            Side::Player => &self.player_sacrifices,
            Side::Ai => &self.ai_sacrifices,
        }
    }

    pub fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Number of accepted actions; combined with the seed it picks the RNG stream.
    pub fn action_count(&self) -> u64 {
        self.action_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the player could switch right now.
    pub fn can_player_switch(&self) -> bool {
        self.mode == BattleMode::Team
            && !self.battle_over
            && self.whose_turn == WhoseTurn::Player
            && self.round_turns == 0
            && self.player_has_played_turn
            && !self.player_just_switched
    }

    /// Applies one player action. On error the session is left exactly as it was.
    pub fn apply_action(
        &mut self,
        action: Action,
        ctx: &mut TurnContext<'_>,
    ) -> Result<ActionOutcome, BattleError> {
        let mut next = self.clone();
        let outcome = next.apply_action_inner(action, ctx)?;
        *self = next;
        Ok(outcome)
    }

    /// Player-initiated switch in team mode.
    pub fn switch_combatant(
        &mut self,
        new_idx: usize,
        clock: &dyn Clock,
    ) -> Result<ActionOutcome, BattleError> {
        if self.mode != BattleMode::Team {
            return Err(BattleError::ModeUnsupported);
        }
        if self.battle_over {
            return Err(BattleError::BattleOver);
        }
        let Some(target) = self.player_deck.get(new_idx) else {
            return Err(BattleError::InvalidIndex(new_idx));
        };
        if new_idx == self.player_active_idx {
            return Err(BattleError::SwitchNotAllowed(
                "that Pokemon is already active".to_string(),
            ));
        }
        if target.is_knocked_out {
            return Err(BattleError::TargetKnockedOut);
        }
        if self.whose_turn != WhoseTurn::Player {
            return Err(BattleError::SwitchNotAllowed("not your turn".to_string()));
        }
        if self.round_turns != 0 {
            return Err(BattleError::SwitchNotAllowed(
                "switching is only allowed at the start of a round".to_string(),
            ));
        }
        if self.player_just_switched {
            return Err(BattleError::SwitchNotAllowed(
                "already switched this round".to_string(),
            ));
        }
        if !self.player_has_played_turn {
            return Err(BattleError::SwitchNotAllowed(
                "the active Pokemon must battle for a turn first".to_string(),
            ));
        }

        let round_before = self.round_number;
        let mut log = Vec::new();
        self.player_active_idx = new_idx;
        self.player_has_played_turn = false;
        self.player_just_switched = true;
        log.push(LogEntry::switched(Side::Player, &self.player_deck[new_idx].name));
        self.begin_round(&mut log);

        self.action_count += 1;
        self.updated_at = clock.now();
        self.check_invariants(&mut log);
        Ok(ActionOutcome {
            log,
            turn_advanced: false,
            round_advanced: self.round_number != round_before,
            battle_ended: self.battle_over,
        })
    }

    /// Snapshot used by the reward calculation.
    pub fn result(&self) -> BattleResult {
        BattleResult {
            session_id: self.id.clone(),
            user_id: self.user_id,
            mode: self.mode,
            winner: self.winner,
            player_deck: self.player_deck.clone(),
            player_active_idx: self.player_active_idx,
            created_at: self.created_at,
        }
    }

    /// Stores the computed reward; credited later with [`BattleSession::mark_reward_claimed`].
    pub fn record_reward(&mut self, record: RewardRecord) -> Result<(), BattleError> {
        if !self.battle_over {
            return Err(BattleError::BattleNotOver);
        }
        if self.reward_claimed {
            return Err(BattleError::AlreadyClaimed);
        }
        self.reward = Some(record);
        Ok(())
    }

    pub fn mark_reward_claimed(&mut self, now: DateTime<Utc>) -> Result<(), BattleError> {
        if !self.battle_over {
            return Err(BattleError::BattleNotOver);
        }
        if self.reward_claimed {
            return Err(BattleError::AlreadyClaimed);
        }
        self.reward_claimed = true;
        self.updated_at = now;
        Ok(())
    }

    /// Takes one AI card as the prize for a team-mode win.
    pub fn claim_reward_card(
        &mut self,
        card_index: usize,
        now: DateTime<Utc>,
    ) -> Result<CombatCard, BattleError> {
        if !self.battle_over {
            return Err(BattleError::BattleNotOver);
        }
        if self.mode != BattleMode::Team {
            return Err(BattleError::ModeUnsupported);
        }
        if self.winner != Winner::Player {
            return Err(BattleError::NotWinner);
        }
        let Some(card) = self.ai_deck.get(card_index) else {
            return Err(BattleError::InvalidIndex(card_index));
        };
        if self.reward_card_claimed {
            return Err(BattleError::AlreadyClaimed);
        }
        let card = card.clone();
        self.reward_card_claimed = true;
        self.updated_at = now;
        Ok(card)
    }

    fn apply_action_inner(
        &mut self,
        action: Action,
        ctx: &mut TurnContext<'_>,
    ) -> Result<ActionOutcome, BattleError> {
        if self.battle_over {
            return Err(BattleError::BattleOver);
        }

        let turn_before = self.turn_number;
        let round_before = self.round_number;
        let mut log = Vec::new();

        // A session persisted mid-turn still owes the AI's first commit.
        if self.whose_turn == WhoseTurn::Ai && self.pending_ai_move.is_none() {
            if let AiStep::Surrendered = self.ai_step(ctx, &mut log) {
                return Ok(self.finish_action(ctx, log, turn_before, round_before));
            }
        }
        if self.whose_turn != WhoseTurn::Player {
            return Err(BattleError::NotYourTurn);
        }

        match action {
            Action::Sacrifice => self.player_sacrifice(&mut log)?,
            Action::Surrender => self.surrender(Side::Player, ctx, &mut log),
            Action::Attack { .. } | Action::Defend | Action::Pass => {
                let commit = self.validate_player_commit(action)?;
                self.player_commit(commit, ctx, &mut log);
            }
        }

        Ok(self.finish_action(ctx, log, turn_before, round_before))
    }

    fn finish_action(
        &mut self,
        ctx: &TurnContext<'_>,
        mut log: Vec<LogEntry>,
        turn_before: u32,
        round_before: u32,
    ) -> ActionOutcome {
        self.action_count += 1;
        self.updated_at = ctx.clock.now();
        self.check_invariants(&mut log);
        ActionOutcome {
            log,
            turn_advanced: self.turn_number != turn_before,
            round_advanced: self.round_number != round_before,
            battle_ended: self.battle_over,
        }
    }

    fn validate_player_commit(&self, action: Action) -> Result<Commit, BattleError> {
        let card = self.player_active();
        match action {
            Action::Attack { move_idx } => {
                let Some(mv) = card.moves.get(move_idx) else {
                    return Err(BattleError::InvalidMoveIndex(move_idx));
                };
                if !card.can_attack(move_idx) {
                    return Err(BattleError::InsufficientStamina {
                        needed: mv.stamina_cost,
                        available: card.stamina,
                    });
                }
                Ok(Commit::Attack { move_idx })
            }
            Action::Defend => {
                if !card.can_defend() {
                    return Err(BattleError::InsufficientStamina {
                        needed: card.defend_cost(),
                        available: card.stamina,
                    });
                }
                Ok(Commit::Defend)
            }
            Action::Pass => Ok(Commit::Pass),
            Action::Sacrifice | Action::Surrender => Err(BattleError::InvalidAction(format!(
                "{} is not a turn commit",
                action.name()
            ))),
        }
    }

    fn player_sacrifice(&mut self, log: &mut Vec<LogEntry>) -> Result<(), BattleError> {
        let idx = self.player_active_idx;
        let count = self.player_sacrifices.entry(idx).or_insert(0);
        let outcome = sacrifice::apply(&mut self.player_deck[idx], count)?;
        log.push(LogEntry::sacrifice(
            Side::Player,
            outcome.hp_cost,
            outcome.stamina_gain,
        ));
        Ok(())
    }

    fn player_commit(&mut self, commit: Commit, ctx: &mut TurnContext<'_>, log: &mut Vec<LogEntry>) {
        let ai_committed_first = self.pending_ai_move.is_some();
        self.log_turn_header(log);
        log.push(commit.commit_log(Side::Player, self.player_active()));
        self.pending_player_move = Some(commit);

        if !ai_committed_first {
            self.whose_turn = WhoseTurn::Ai;
            if let AiStep::Surrendered = self.ai_step(ctx, log) {
                return;
            }
        }
        self.resolve(ctx, log);
    }

    /// Lets the AI sacrifice as often as it wants, then commit or surrender.
    fn ai_step(&mut self, ctx: &mut TurnContext<'_>, log: &mut Vec<LogEntry>) -> AiStep {
        let hint = self.pending_player_move.map(|commit| commit.kind());

        for _ in 0..=MAX_SACRIFICES {
            let idx = self.ai_active_idx;
            let decision = {
                let decision_ctx = DecisionContext {
                    mode: self.mode,
                    ai_card: &self.ai_deck[idx],
                    player_card: &self.player_deck[self.player_active_idx],
                    player_hint: hint,
                    sacrifice_count: self.ai_sacrifices.get(&idx).copied().unwrap_or(0),
                    ai_deck: &self.ai_deck,
                    ai_active_idx: idx,
                };
                ctx.strategy.decide_action(&decision_ctx, &mut *ctx.rng)
            };

            match decision {
                Action::Sacrifice => {
                    let count = self.ai_sacrifices.entry(idx).or_insert(0);
                    match sacrifice::apply(&mut self.ai_deck[idx], count) {
                        Ok(outcome) => {
                            log.push(LogEntry::sacrifice(
                                Side::Ai,
                                outcome.hp_cost,
                                outcome.stamina_gain,
                            ));
                            continue;
                        }
                        Err(e) => {
                            debug!(session_id = %self.id, error = %e, "AI sacrifice rejected, passing");
                            self.ai_commit(Commit::Pass, log);
                            return AiStep::Committed;
                        }
                    }
                }
                Action::Surrender => {
                    self.surrender(Side::Ai, ctx, log);
                    return AiStep::Surrendered;
                }
                other => {
                    let commit = self.affordable_ai_commit(other);
                    self.ai_commit(commit, log);
                    return AiStep::Committed;
                }
            }
        }

        self.ai_commit(Commit::Pass, log);
        AiStep::Committed
    }

    /// Downgrades an AI choice it cannot pay for to a pass.
    fn affordable_ai_commit(&self, action: Action) -> Commit {
        let card = self.ai_active();
        match action {
            Action::Attack { move_idx } if card.can_attack(move_idx) => Commit::Attack { move_idx },
            Action::Defend if card.can_defend() => Commit::Defend,
            _ => Commit::Pass,
        }
    }

    fn ai_commit(&mut self, commit: Commit, log: &mut Vec<LogEntry>) {
        self.log_turn_header(log);
        log.push(commit.commit_log(Side::Ai, self.ai_active()));
        self.pending_ai_move = Some(commit);
        self.whose_turn = WhoseTurn::Player;
    }

    /// A turn restarted after a team surrender keeps its first header.
    fn log_turn_header(&mut self, log: &mut Vec<LogEntry>) {
        if self.header_turn != self.turn_number {
            self.header_turn = self.turn_number;
            log.push(LogEntry::turn_header(self.turn_number));
        }
    }

    fn resolve(&mut self, ctx: &mut TurnContext<'_>, log: &mut Vec<LogEntry>) {
        let (Some(player_commit), Some(ai_commit)) =
            (self.pending_player_move.take(), self.pending_ai_move.take())
        else {
            self.invariant_violation("turn resolved without both commits", log);
            return;
        };

        let player = &mut self.player_deck[self.player_active_idx];
        let ai = &mut self.ai_deck[self.ai_active_idx];
        let resolution = resolve_turn(player, ai, player_commit, ai_commit, &mut *ctx.rng);
        log.extend(resolution.log);

        if resolution.both_passed {
            self.consecutive_passes += 1;
            log.push(LogEntry::both_passed(
                self.consecutive_passes,
                STALEMATE_PASSES,
            ));
        } else {
            self.consecutive_passes = 0;
        }

        self.turn_number += 1;
        self.round_turns += 1;
        self.player_has_played_turn = true;
        self.player_just_switched = false;

        debug!(
            session_id = %self.id,
            turn_number = self.turn_number,
            consecutive_passes = self.consecutive_passes,
            "Turn resolved"
        );

        if self.consecutive_passes >= STALEMATE_PASSES {
            log.push(LogEntry::stalemate(STALEMATE_PASSES));
            self.finish(Winner::Draw);
            return;
        }

        self.handle_knockouts(ctx, log);
        if !self.battle_over {
            self.prepare_turn(ctx, log);
        }
    }

    fn handle_knockouts(&mut self, ctx: &mut TurnContext<'_>, log: &mut Vec<LogEntry>) {
        let player_down = self.player_active().is_knocked_out;
        let ai_down = self.ai_active().is_knocked_out;
        if player_down {
            log.push(LogEntry::knockout(Side::Player, &self.player_active().name));
        }
        if ai_down {
            log.push(LogEntry::knockout(Side::Ai, &self.ai_active().name));
        }

        match self.mode {
            BattleMode::Duel => {
                let winner = match (player_down, ai_down) {
                    (false, false) => return,
                    (true, true) => Winner::Draw,
                    (true, false) => Winner::Ai,
                    (false, true) => Winner::Player,
                };
                log.push(LogEntry::duel_result(winner));
                self.finish(winner);
            }
            BattleMode::Team => {
                let player_alive = self.side_has_alive(Side::Player);
                let ai_alive = self.side_has_alive(Side::Ai);
                let winner = match (player_alive, ai_alive) {
                    (true, true) => None,
                    (false, false) => Some(Winner::Draw),
                    (false, true) => Some(Winner::Ai),
                    (true, false) => Some(Winner::Player),
                };
                if let Some(winner) = winner {
                    log.push(LogEntry::team_result(winner));
                    self.finish(winner);
                    return;
                }

                let mut switched = false;
                if player_down {
                    self.force_player_switch(log);
                    switched = true;
                }
                if self.ai_switch(ctx, log) {
                    switched = true;
                }
                if switched {
                    self.begin_round(log);
                }
            }
        }
    }

    fn force_player_switch(&mut self, log: &mut Vec<LogEntry>) {
        if let Some(idx) = first_alive_other(&self.player_deck, self.player_active_idx) {
            self.player_active_idx = idx;
            self.player_has_played_turn = false;
            self.player_just_switched = false;
            log.push(LogEntry::switched(Side::Player, &self.player_deck[idx].name));
        }
    }

    /// Forced when the AI's active card is down, otherwise up to the strategy.
    fn ai_switch(&mut self, ctx: &TurnContext<'_>, log: &mut Vec<LogEntry>) -> bool {
        let active = self.ai_active_idx;
        let forced = self.ai_deck[active].is_knocked_out;
        let choice = ctx
            .strategy
            .choose_switch(&self.ai_deck, active)
            .filter(|idx| *idx != active && self.ai_deck.get(*idx).is_some_and(CombatCard::is_alive));

        let target = match (choice, forced) {
            (Some(idx), _) => idx,
            (None, true) => match first_alive_other(&self.ai_deck, active) {
                Some(idx) => idx,
                None => return false,
            },
            (None, false) => return false,
        };

        self.ai_active_idx = target;
        log.push(LogEntry::switched(Side::Ai, &self.ai_deck[target].name));
        true
    }

    fn begin_round(&mut self, log: &mut Vec<LogEntry>) {
        self.round_number += 1;
        self.round_turns = 0;
        self.player_sacrifices.insert(self.player_active_idx, 0);
        self.ai_sacrifices.insert(self.ai_active_idx, 0);
        log.push(LogEntry::round_begins(self.round_number));
    }

    /// Sets up the next turn: the player acts on odd turns, the AI commits first on even.
    fn prepare_turn(&mut self, ctx: &mut TurnContext<'_>, log: &mut Vec<LogEntry>) {
        if self.battle_over {
            return;
        }
        if self.turn_number % 2 == 1 {
            self.whose_turn = WhoseTurn::Player;
        } else {
            self.whose_turn = WhoseTurn::Ai;
            self.ai_step(ctx, log);
        }
    }

    fn surrender(&mut self, side: Side, ctx: &mut TurnContext<'_>, log: &mut Vec<LogEntry>) {
        match self.mode {
            BattleMode::Duel => {
                self.player_surrendered = side == Side::Player;
                log.push(LogEntry::duel_surrender(side));
                self.finish(side.opponent().into());
            }
            BattleMode::Team => {
                let name = match side {
                    Side::Player => {
                        let card = &mut self.player_deck[self.player_active_idx];
                        card.knock_out();
                        card.name.clone()
                    }
                    Side::Ai => {
                        let card = &mut self.ai_deck[self.ai_active_idx];
                        card.knock_out();
                        card.name.clone()
                    }
                };
                log.push(LogEntry::team_surrender(side, &name));
                self.pending_player_move = None;
                self.pending_ai_move = None;

                if !self.side_has_alive(side) {
                    self.player_surrendered = side == Side::Player;
                    let winner = side.opponent().into();
                    log.push(LogEntry::team_result(winner));
                    self.finish(winner);
                    return;
                }

                match side {
                    Side::Player => self.force_player_switch(log),
                    Side::Ai => {
                        self.ai_switch(ctx, log);
                    }
                }
                self.begin_round(log);
                self.prepare_turn(ctx, log);
            }
        }
    }

    fn side_has_alive(&self, side: Side) -> bool {
        let deck = match side {
            Side::Player => &self.player_deck,
            Side::Ai => &self.ai_deck,
        };
        deck.iter().any(CombatCard::is_alive)
    }

    fn finish(&mut self, winner: Winner) {
        self.battle_over = true;
        self.winner = winner;
        self.whose_turn = WhoseTurn::None;
        self.pending_player_move = None;
        self.pending_ai_move = None;
        debug!(session_id = %self.id, winner = ?winner, "Battle finished");
    }

    fn check_invariants(&mut self, log: &mut Vec<LogEntry>) {
        if let Some(detail) = self.find_violation() {
            self.invariant_violation(&detail, log);
        }
    }

    fn find_violation(&self) -> Option<String> {
        for card in self.player_deck.iter().chain(self.ai_deck.iter()) {
            if card.hp > card.hp_max || card.stamina > card.stamina_max {
                return Some(format!("{} is outside its hp or stamina range", card.name));
            }
            if card.is_knocked_out != (card.hp == 0) {
                return Some(format!("{} has a stale knocked-out flag", card.name));
            }
        }
        let counts_ok = self
            .player_sacrifices
            .values()
            .chain(self.ai_sacrifices.values())
            .all(|count| *count <= MAX_SACRIFICES);
        if !counts_ok {
            return Some("sacrifice counter above limit".to_string());
        }
        if self.consecutive_passes > STALEMATE_PASSES {
            return Some("pass counter above limit".to_string());
        }
        if self.battle_over != (self.winner != Winner::Unresolved) {
            return Some("winner does not match battle state".to_string());
        }
        if self.battle_over != (self.whose_turn == WhoseTurn::None) {
            return Some("turn owner does not match battle state".to_string());
        }
        if !self.battle_over {
            if self.player_active().is_knocked_out {
                return Some("player's active Pokemon is knocked out".to_string());
            }
            if self.ai_active().is_knocked_out {
                return Some("AI's active Pokemon is knocked out".to_string());
            }
        }
        None
    }

    fn invariant_violation(&mut self, detail: &str, log: &mut Vec<LogEntry>) {
        error!(session_id = %self.id, detail = %detail, "Battle invariant violated");
        for card in self.player_deck.iter_mut().chain(self.ai_deck.iter_mut()) {
            card.clamp();
        }
        log.push(LogEntry::invariant_violation(detail));
        self.finish(Winner::Draw);
    }
}
