//! Game session state machine
//!
//! A session is `Active` from creation until a five, a full board or an
//! explicit [`Session::finish`] moves it to `Finished`. Every stone, human or
//! agent, enters through [`Session::apply_move`], which validates before it
//! mutates: a rejected move leaves the session exactly as it was.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::agent::{Agent, Proposal, ProposalInfo};
use crate::board::{Board, Move, Player, Pos, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::config::Difficulty;
use crate::error::{AgentError, MoveError, SessionError};
use crate::record::{GameRecord, RecordMeta, RuleFlags};
use crate::rules::{check_placement, first_legal_move, is_exact_five};

pub type SessionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Exactly five in a row on the board
    Five,
    /// No empty cell left and no five
    BoardFull,
    Resignation,
    /// Result reported by the client
    Declared,
}

/// The automated side of a session, fixed at creation
#[derive(Clone)]
pub struct Opponent {
    pub color: Player,
    pub level: Difficulty,
    pub agent: Arc<dyn Agent>,
    /// Passed through to [`Agent::propose_move`]
    pub ensure_legal: bool,
}

impl std::fmt::Debug for Opponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Opponent")
            .field("color", &self.color)
            .field("level", &self.level)
            .field("agent", &self.agent.name())
            .field("ensure_legal", &self.ensure_legal)
            .finish()
    }
}

/// Result of a successful [`Session::apply_move`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Stone placed, `next` to move
    Continue { next: Player },
    /// Stone placed and it made exactly five
    Won { winner: Player },
    /// Stone placed on the last empty cell
    Draw,
    /// Session was already finished; nothing changed
    GameOver,
}

/// How the automated side's move was chosen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentTurn {
    #[serde(rename = "move")]
    pub mv: Move,
    /// The proposal was unusable and the raster fallback picked the cell
    pub fallback: bool,
    pub info: Option<ProposalInfo>,
    /// Why the proposal was discarded
    pub discarded: Option<String>,
}

/// Result of [`Session::advance_if_automated_turn`]
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Not the agent's turn, or the session is finished
    Idle,
    Played { turn: AgentTurn, outcome: MoveOutcome },
    /// No legal cell exists for the agent. The turn passes to the other side
    /// without a stone, or the game ends when neither side can move.
    Skipped,
    /// The board moved on while the proposal was being computed
    Stale,
}

/// Serializable view of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub game_id: SessionId,
    pub size: usize,
    /// Cell codes indexed `[y][x]`
    pub board: Vec<Vec<u8>>,
    pub moves: Vec<Move>,
    pub winner: Option<Player>,
    pub current: Player,
    pub status: Status,
    pub finish_reason: Option<FinishReason>,
    pub ai_color: Option<Player>,
    pub last_agent_turn: Option<AgentTurn>,
}

/// An agent proposal being computed on a worker thread
pub struct PendingProposal {
    receiver: Receiver<Result<Proposal, AgentError>>,
    player: Player,
    move_number: usize,
    started: Instant,
}

impl PendingProposal {
    /// Block until the proposal arrives or `timeout` passes
    pub fn wait(&self, timeout: Duration) -> Result<Proposal, AgentError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(AgentError::Timeout {
                ms: timeout.as_millis() as u64,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(AgentError::Disconnected),
        }
    }

    /// Non-blocking check, for callers that poll every frame
    pub fn poll(&self) -> Option<Result<Proposal, AgentError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(AgentError::Disconnected)),
        }
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// One game
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    board: Board,
    history: Vec<Move>,
    current: Player,
    winner: Option<Player>,
    status: Status,
    finish_reason: Option<FinishReason>,
    resign: bool,
    /// The finished game has been handed to persistence
    archived: bool,
    opponent: Option<Opponent>,
    last_agent_turn: Option<AgentTurn>,
    model_version: String,
    started: Instant,
}

impl Session {
    pub fn new(
        id: impl Into<SessionId>,
        size: usize,
        opponent: Option<Opponent>,
    ) -> Result<Self, SessionError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(SessionError::InvalidSize {
                size,
                min: MIN_BOARD_SIZE,
                max: MAX_BOARD_SIZE,
            });
        }
        Ok(Self {
            id: id.into(),
            board: Board::new(size),
            history: Vec::new(),
            current: Player::Black,
            winner: None,
            status: Status::Active,
            finish_reason: None,
            resign: false,
            archived: false,
            opponent,
            last_agent_turn: None,
            model_version: String::from("none"),
            started: Instant::now(),
        })
    }

    /// Version tag written into the finished record
    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = version.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn current(&self) -> Player {
        self.current
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    pub fn is_finished(&self) -> bool {
        self.status == Status::Finished
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    pub fn opponent(&self) -> Option<&Opponent> {
        self.opponent.as_ref()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().copied()
    }

    pub fn last_agent_turn(&self) -> Option<&AgentTurn> {
        self.last_agent_turn.as_ref()
    }

    /// Active and the automated side is to move
    pub fn is_agent_turn(&self) -> bool {
        self.status == Status::Active
            && self.opponent.as_ref().map(|o| o.color) == Some(self.current)
    }

    /// Validate and play one stone
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn apply_move(&mut self, x: i32, y: i32, player: Player) -> Result<MoveOutcome, MoveError> {
        if self.status == Status::Finished {
            debug!("move on finished game ignored");
            return Ok(MoveOutcome::GameOver);
        }

        let pos = self.validate(x, y, player).inspect_err(|err| {
            warn!(reason = err.reason_code(), error = %err, "move rejected");
        })?;

        self.board.place_stone(pos, player.stone());
        self.history.push(Move::new(pos, player));

        if is_exact_five(&self.board, pos, player) {
            self.winner = Some(player);
            self.status = Status::Finished;
            self.finish_reason = Some(FinishReason::Five);
            info!(%player, moves = self.history.len(), "five in a row");
            return Ok(MoveOutcome::Won { winner: player });
        }

        if self.board.is_full() {
            self.status = Status::Finished;
            self.finish_reason = Some(FinishReason::BoardFull);
            info!(moves = self.history.len(), "board full, no winner");
            return Ok(MoveOutcome::Draw);
        }

        self.current = player.opponent();
        Ok(MoveOutcome::Continue { next: self.current })
    }

    /// Preconditions in order: bounds, emptiness, turn, double-three, overline
    fn validate(&self, x: i32, y: i32, player: Player) -> Result<Pos, MoveError> {
        let pos = self.board.pos(x, y).ok_or(MoveError::OutOfBounds { x, y })?;
        if !self.board.is_empty(pos) {
            return Err(MoveError::Occupied { pos });
        }
        if player != self.current {
            return Err(MoveError::WrongTurn {
                expected: self.current,
                got: player,
            });
        }
        check_placement(&self.board, pos, player)?;
        Ok(pos)
    }

    /// Start computing the agent's move on a worker thread.
    ///
    /// Returns `None` when it is not the agent's turn.
    pub fn request_proposal(&self) -> Option<PendingProposal> {
        if !self.is_agent_turn() {
            return None;
        }
        let opponent = self.opponent.as_ref()?;

        let agent = Arc::clone(&opponent.agent);
        let board = self.board.clone();
        let player = self.current;
        let ensure_legal = opponent.ensure_legal;
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            // The receiver may have given up waiting
            let _ = tx.send(agent.propose_move(&board, player, ensure_legal));
        });

        Some(PendingProposal {
            receiver: rx,
            player,
            move_number: self.history.len(),
            started: Instant::now(),
        })
    }

    /// Play the agent's move, substituting the first legal cell in raster
    /// order when the proposal is missing or illegal
    #[instrument(skip_all, fields(game_id = %self.id))]
    pub fn resolve_proposal(
        &mut self,
        pending: &PendingProposal,
        result: Result<Proposal, AgentError>,
    ) -> Advance {
        if !self.is_agent_turn()
            || self.current != pending.player
            || self.history.len() != pending.move_number
        {
            debug!("proposal no longer applies");
            return Advance::Stale;
        }
        let player = pending.player;

        let (pos, info, discarded) = match result {
            Ok(proposal) => match self.validate(proposal.x, proposal.y, player) {
                Ok(pos) => (Some(pos), Some(proposal.info), None),
                Err(err) => {
                    warn!(x = proposal.x, y = proposal.y, reason = err.reason_code(), "agent proposed an illegal move");
                    (None, Some(proposal.info), Some(err.to_string()))
                }
            },
            Err(err) => {
                warn!(error = %err, elapsed_ms = pending.elapsed().as_millis() as u64, "agent unavailable");
                (None, None, Some(err.to_string()))
            }
        };

        let fallback = pos.is_none();
        let Some(pos) = pos.or_else(|| first_legal_move(&self.board, player)) else {
            self.pass_turn(player);
            return Advance::Skipped;
        };

        match self.apply_move(pos.x as i32, pos.y as i32, player) {
            Ok(outcome) => {
                let turn = AgentTurn {
                    mv: Move::new(pos, player),
                    fallback,
                    info,
                    discarded,
                };
                info!(%pos, fallback, "agent played");
                self.last_agent_turn = Some(turn.clone());
                Advance::Played { turn, outcome }
            }
            Err(err) => {
                warn!(error = %err, "validated agent move refused");
                Advance::Skipped
            }
        }
    }

    /// Hand the move to the other side without placing a stone
    fn pass_turn(&mut self, player: Player) {
        let next = player.opponent();
        if first_legal_move(&self.board, next).is_none() {
            self.status = Status::Finished;
            self.finish_reason = Some(FinishReason::BoardFull);
            warn!(%player, moves = self.history.len(), "no legal move for either side");
            return;
        }
        warn!(%player, %next, "no legal move for agent, turn passed");
        self.current = next;
    }

    /// If the agent is to move, obtain its proposal within `timeout` and play it
    pub fn advance_if_automated_turn(&mut self, timeout: Duration) -> Advance {
        let Some(pending) = self.request_proposal() else {
            return Advance::Idle;
        };
        let result = pending.wait(timeout);
        self.resolve_proposal(&pending, result)
    }

    /// End the game with a declared result.
    ///
    /// Returns the record to archive the first time a finished game passes
    /// through here; afterwards this is a no-op. A game already decided on the
    /// board keeps its result.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn finish(&mut self, winner: Option<Player>, resign: bool) -> Option<GameRecord> {
        if self.archived {
            debug!("finish on archived game ignored");
            return None;
        }

        if self.status == Status::Active {
            self.status = Status::Finished;
            self.winner = winner;
            self.resign = resign;
            self.finish_reason = Some(if resign {
                FinishReason::Resignation
            } else {
                FinishReason::Declared
            });
            info!(?winner, resign, "game finished by request");
        }

        self.archived = true;
        Some(self.to_record())
    }

    pub fn to_record(&self) -> GameRecord {
        GameRecord {
            game_id: self.id.clone(),
            size: self.board.size(),
            rules: RuleFlags::default(),
            moves: self.history.clone(),
            winner: self.winner,
            resign: self.resign,
            duration_ms: Some(self.started.elapsed().as_millis() as u64),
            meta: RecordMeta {
                model_version: self.model_version.clone(),
                ai_level: self.opponent.as_ref().map(|o| o.level),
                ai_color: self.opponent.as_ref().map(|o| o.color),
            },
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            game_id: self.id.clone(),
            size: self.board.size(),
            board: self.board.rows(),
            moves: self.history.clone(),
            winner: self.winner,
            current: self.current,
            status: self.status,
            finish_reason: self.finish_reason,
            ai_color: self.opponent.as_ref().map(|o| o.color),
            last_agent_turn: self.last_agent_turn.clone(),
        }
    }
}
