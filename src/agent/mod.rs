//! Automated opponents
//!
//! The session core only knows the [`Agent`] contract: given a board and the
//! side to move, propose a cell. Whatever comes back is validated again by the
//! session, so an agent can be wrong without corrupting a game.
//!
//! Two agents ship with the crate:
//! - [`HeuristicAgent`]: center-distance ranking with difficulty-dependent noise
//! - [`ModelAgent`]: scores every cell through a [`PolicyScorer`] and plays the best
//!   unmasked one

pub mod heuristic;
pub mod model;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Player};
use crate::config::{Difficulty, GameConfig};
use crate::error::AgentError;

pub use heuristic::HeuristicAgent;
pub use model::{ModelAgent, PatternScorer, PolicyScorer};

/// What the agent reports alongside its move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalInfo {
    /// Which policy produced the move (`heuristic`, `greedy`, ...)
    pub policy: String,
    /// Number of candidate cells considered
    pub candidates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

/// A proposed move. Coordinates are signed so a misbehaving agent can be
/// detected instead of silently wrapped.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub x: i32,
    pub y: i32,
    pub info: ProposalInfo,
}

/// Move-proposal capability
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    /// Propose a move for `player`. With `ensure_legal` the agent should only
    /// return cells that pass both forbidden-move checks.
    fn propose_move(
        &self,
        board: &Board,
        player: Player,
        ensure_legal: bool,
    ) -> Result<Proposal, AgentError>;
}

/// Build the agent for a difficulty level
pub fn build_agent(level: Difficulty, config: &GameConfig) -> Arc<dyn Agent> {
    if level.uses_model() {
        Arc::new(ModelAgent::new(PatternScorer::new(config.model_version.clone())))
    } else {
        Arc::new(HeuristicAgent::new(level.preset(), config.seed))
    }
}
