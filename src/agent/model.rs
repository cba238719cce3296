//! Score-every-cell agent
//!
//! The agent asks a [`PolicyScorer`] for one score per cell, masks the cells it
//! may not play to negative infinity and plays the best of the rest. The crate
//! ships [`PatternScorer`], which rates a cell by the lines it would make for
//! the mover and the lines it would take away from the opponent. A learned
//! policy plugs in through the same trait.

use tracing::debug;

use crate::board::{Board, Player, Pos};
use crate::error::AgentError;
use crate::rules::line::{run_through, DIRECTIONS};
use crate::rules::check_placement;

use super::{Agent, Proposal, ProposalInfo};

/// Produces one score per cell, row-major (`y * size + x`)
pub trait PolicyScorer: Send + Sync {
    fn version(&self) -> &str;

    fn scores(&self, board: &Board, player: Player) -> Vec<f32>;
}

/// Line-shape scorer
///
/// Own runs are weighted slightly above blocking opponent runs of the same
/// length, so a winning five always beats blocking one.
pub struct PatternScorer {
    version: String,
}

/// Value of extending own line to `len` stones (index = run length, capped at 5)
const ATTACK: [f32; 6] = [0.0, 1.0, 10.0, 100.0, 1_000.0, 100_000.0];
/// Value of occupying the cell that would give the opponent `len` stones
const DEFENSE: [f32; 6] = [0.0, 0.0, 8.0, 80.0, 800.0, 50_000.0];
/// Penalty per unit of distance from the center
const CENTER_WEIGHT: f32 = 0.01;

impl PatternScorer {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    fn score_cell(board: &Board, pos: Pos, player: Player) -> f32 {
        let mut score = 0.0;
        for &(dx, dy) in &DIRECTIONS {
            let own = run_through(board, pos, player, dx, dy).min(5);
            let theirs = run_through(board, pos, player.opponent(), dx, dy).min(5);
            score += ATTACK[own] + DEFENSE[theirs];
        }

        let center = (board.size() as f32 - 1.0) / 2.0;
        let dist = (pos.x as f32 - center).abs() + (pos.y as f32 - center).abs();
        score - dist * CENTER_WEIGHT
    }
}

impl PolicyScorer for PatternScorer {
    fn version(&self) -> &str {
        &self.version
    }

    fn scores(&self, board: &Board, player: Player) -> Vec<f32> {
        let size = board.size();
        (0..size * size)
            .map(|idx| {
                let pos = Pos::from_index(idx, size);
                if board.is_empty(pos) {
                    Self::score_cell(board, pos, player)
                } else {
                    0.0
                }
            })
            .collect()
    }
}

/// Greedy agent over a [`PolicyScorer`]
pub struct ModelAgent<S: PolicyScorer> {
    scorer: S,
}

impl<S: PolicyScorer> ModelAgent<S> {
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }

    /// Scores with unplayable cells set to negative infinity
    pub fn masked_scores(&self, board: &Board, player: Player, ensure_legal: bool) -> Vec<f32> {
        let size = board.size();
        let mut scores = self.scorer.scores(board, player);
        scores.resize(size * size, f32::NEG_INFINITY);

        for (idx, score) in scores.iter_mut().enumerate() {
            let pos = Pos::from_index(idx, size);
            let playable = board.is_empty(pos)
                && (!ensure_legal || check_placement(board, pos, player).is_ok());
            if !playable || score.is_nan() {
                *score = f32::NEG_INFINITY;
            }
        }
        scores
    }
}

impl<S: PolicyScorer> Agent for ModelAgent<S> {
    fn name(&self) -> &str {
        "model"
    }

    fn propose_move(
        &self,
        board: &Board,
        player: Player,
        ensure_legal: bool,
    ) -> Result<Proposal, AgentError> {
        let scores = self.masked_scores(board, player, ensure_legal);

        // First maximum in raster order
        let mut best: Option<(usize, f32)> = None;
        for (idx, &score) in scores.iter().enumerate() {
            if score == f32::NEG_INFINITY {
                continue;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((idx, score));
            }
        }

        let (idx, score) = best.ok_or(AgentError::NoLegalMoves)?;
        let pos = Pos::from_index(idx, board.size());
        let candidates = scores.iter().filter(|s| **s != f32::NEG_INFINITY).count();
        debug!(%pos, score, candidates, "model agent pick");

        Ok(Proposal {
            x: pos.x as i32,
            y: pos.y as i32,
            info: ProposalInfo {
                policy: "greedy".to_string(),
                candidates,
                model_version: Some(self.scorer.version().to_string()),
            },
        })
    }
}
