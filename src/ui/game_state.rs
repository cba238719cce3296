//! Game state management for the Omok GUI
//!
//! Wraps one [`Session`]. Agent turns run through
//! [`Session::request_proposal`] and are polled once per frame, so the window
//! never blocks on the agent.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::agent::build_agent;
use crate::board::{Player, Pos};
use crate::config::{Difficulty, GameConfig};
use crate::error::{AgentError, SessionError};
use crate::record::{self, RecordSink, TrainingSink};
use crate::rules::winning_line;
use crate::session::{
    new_game_id, Advance, AgentTurn, FinishReason, MoveOutcome, Opponent, PendingProposal,
    Session,
};

/// Game mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Player vs agent
    PvE {
        human_color: Player,
        level: Difficulty,
    },
    /// Player vs Player (hotseat)
    PvP,
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::PvE {
            human_color: Player::Black,
            level: Difficulty::default(),
        }
    }
}

/// Where finished games go
#[derive(Clone)]
pub struct Persistence {
    pub archive: Arc<dyn RecordSink>,
    pub trainer: Option<Arc<dyn TrainingSink>>,
}

/// Main game state
pub struct GameState {
    pub session: Session,
    pub mode: GameMode,
    pub pending: Option<PendingProposal>,
    pub winning_line: Option<[Pos; 5]>,
    pub message: Option<String>,
    /// Start of the current turn
    pub turn_started: Instant,
    pub last_agent_time: Option<Duration>,
    config: GameConfig,
    persistence: Persistence,
}

impl GameState {
    pub fn new(
        mode: GameMode,
        config: GameConfig,
        persistence: Persistence,
    ) -> Result<Self, SessionError> {
        let opponent = match mode {
            GameMode::PvE { human_color, level } => Some(Opponent {
                color: human_color.opponent(),
                level,
                agent: build_agent(level, &config),
                ensure_legal: config.agent_ensure_legal,
            }),
            GameMode::PvP => None,
        };
        let session = Session::new(new_game_id(), config.board_size, opponent)?
            .with_model_version(config.model_version.clone());
        info!(game_id = session.id(), ?mode, "new game");

        Ok(Self {
            session,
            mode,
            pending: None,
            winning_line: None,
            message: None,
            turn_started: Instant::now(),
            last_agent_time: None,
            config,
            persistence,
        })
    }

    /// Same mode, fresh board. An unfinished game is archived as declared without a winner.
    pub fn restart(&mut self, mode: GameMode) {
        if !self.session.is_finished() && !self.session.history().is_empty() {
            self.archive(None, false);
        }
        match Self::new(mode, self.config.clone(), self.persistence.clone()) {
            Ok(state) => *self = state,
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    pub fn is_ai_turn(&self) -> bool {
        self.session.is_agent_turn()
    }

    pub fn is_ai_thinking(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_game_over(&self) -> bool {
        self.session.is_finished()
    }

    pub fn ai_thinking_elapsed(&self) -> Option<Duration> {
        self.pending.as_ref().map(PendingProposal::elapsed)
    }

    pub fn last_agent_turn(&self) -> Option<&AgentTurn> {
        self.session.last_agent_turn()
    }

    /// Attempt to place a stone for the side to move
    pub fn try_place_stone(&mut self, pos: Pos) -> Result<(), String> {
        if self.is_game_over() {
            return Err("Game is over".to_string());
        }
        if self.is_ai_thinking() || self.is_ai_turn() {
            return Err("Not your turn".to_string());
        }

        let player = self.session.current();
        let outcome = self
            .session
            .apply_move(pos.x as i32, pos.y as i32, player)
            .map_err(|err| format!("Rejected: {err}"))?;
        self.after_move(pos, player, outcome);
        Ok(())
    }

    fn after_move(&mut self, pos: Pos, player: Player, outcome: MoveOutcome) {
        self.message = None;
        self.turn_started = Instant::now();
        match outcome {
            MoveOutcome::Won { .. } => {
                self.winning_line = winning_line(self.session.board(), pos, player);
                self.archive(None, false);
            }
            MoveOutcome::Draw => self.archive(None, false),
            MoveOutcome::Continue { .. } | MoveOutcome::GameOver => {}
        }
    }

    pub fn start_ai_thinking(&mut self) {
        if self.pending.is_none() {
            self.pending = self.session.request_proposal();
        }
    }

    /// Resolve the agent's proposal once it has arrived or its time is up
    pub fn check_ai_result(&mut self) {
        let Some(pending) = &self.pending else {
            return;
        };
        let result = match pending.poll() {
            Some(result) => result,
            None if pending.elapsed() >= self.config.agent_timeout() => Err(AgentError::Timeout {
                ms: self.config.agent_timeout_ms,
            }),
            None => return,
        };

        let Some(pending) = self.pending.take() else {
            return;
        };
        self.last_agent_time = Some(pending.elapsed());

        match self.session.resolve_proposal(&pending, result) {
            Advance::Played { turn, outcome } => {
                self.after_move(turn.mv.pos(), turn.mv.player, outcome);
                if turn.fallback {
                    self.message = Some("Agent move replaced by fallback".to_string());
                }
            }
            Advance::Skipped => {
                self.turn_started = Instant::now();
                if self.is_game_over() {
                    self.archive(None, false);
                    self.message = Some("No legal move for either side".to_string());
                } else {
                    self.message = Some("Agent has no legal move, turn passed".to_string());
                }
            }
            Advance::Idle | Advance::Stale => {}
        }
    }

    /// The human side gives up
    pub fn resign(&mut self) {
        if self.is_game_over() {
            return;
        }
        let winner = match self.mode {
            GameMode::PvE { human_color, .. } => human_color.opponent(),
            GameMode::PvP => self.session.current().opponent(),
        };
        self.pending = None;
        self.archive(Some(winner), true);
    }

    /// Finish the session and hand the record to the background writer
    fn archive(&mut self, winner: Option<Player>, resign: bool) {
        let Some(record) = self.session.finish(winner, resign) else {
            return;
        };
        // The writer thread is not joined; the app exits without waiting on it
        drop(record::dispatch(
            record,
            Arc::clone(&self.persistence.archive),
            self.persistence.trainer.clone(),
        ));
    }

    /// One-line description of how the game ended
    pub fn result_text(&self) -> Option<String> {
        let reason = self.session.finish_reason()?;
        let text = match (self.session.winner(), reason) {
            (Some(winner), FinishReason::Five) => format!("{winner} wins with five"),
            (Some(winner), FinishReason::Resignation) => format!("{winner} wins by resignation"),
            (Some(winner), FinishReason::Declared) => format!("{winner} wins"),
            (_, FinishReason::BoardFull) => "Board full, no winner".to_string(),
            (None, _) => "Game abandoned".to_string(),
        };
        Some(text)
    }
}
