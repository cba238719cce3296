//! Center-distance heuristic agent

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::board::{Board, Player, Pos};
use crate::config::LevelPreset;
use crate::error::AgentError;
use crate::rules::check_placement;

use super::{Agent, Proposal, ProposalInfo};

/// Plays the empty cell closest to the center. With probability `noise` the
/// ranking is thrown away and a random candidate is played instead.
pub struct HeuristicAgent {
    noise: f64,
    rng: Mutex<StdRng>,
}

impl HeuristicAgent {
    pub fn new(preset: LevelPreset, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            noise: preset.noise.clamp(0.0, 1.0),
            rng: Mutex::new(rng),
        }
    }

    /// Empty cells by squared distance to the center; ties stay in raster order
    pub fn ranked_candidates(board: &Board) -> Vec<Pos> {
        // Doubled coordinates keep the center integral on even boards
        let span = board.size() as i64 - 1;
        let mut cells: Vec<Pos> = board.empty_cells().collect();
        cells.sort_by_key(|pos| {
            let dx = 2 * pos.x as i64 - span;
            let dy = 2 * pos.y as i64 - span;
            dx * dx + dy * dy
        });
        cells
    }
}

impl Agent for HeuristicAgent {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn propose_move(
        &self,
        board: &Board,
        player: Player,
        ensure_legal: bool,
    ) -> Result<Proposal, AgentError> {
        let mut candidates = Self::ranked_candidates(board);
        if ensure_legal {
            candidates.retain(|&pos| check_placement(board, pos, player).is_ok());
        }

        if self.noise > 0.0 {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            if rng.gen_bool(self.noise) {
                candidates.shuffle(&mut *rng);
            }
        }

        let pos = candidates.first().copied().ok_or(AgentError::NoLegalMoves)?;
        Ok(Proposal {
            x: pos.x as i32,
            y: pos.y as i32,
            info: ProposalInfo {
                policy: "heuristic".to_string(),
                candidates: candidates.len(),
                model_version: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Stone;
    use crate::config::Difficulty;

    fn quiet() -> HeuristicAgent {
        HeuristicAgent::new(Difficulty::Insane.preset(), Some(1))
    }

    #[test]
    fn test_prefers_center() {
        let board = Board::new(15);
        let proposal = quiet().propose_move(&board, Player::Black, false).unwrap();
        assert_eq!((proposal.x, proposal.y), (7, 7));
        assert_eq!(proposal.info.candidates, 225);
    }

    #[test]
    fn test_ties_break_in_raster_order() {
        let mut board = Board::new(15);
        board.place_stone(Pos::new(7, 7), Stone::Black);
        let proposal = quiet().propose_move(&board, Player::White, false).unwrap();
        // (7,6) (6,7) (8,7) (7,8) are equidistant; (7,6) comes first in raster order
        assert_eq!((proposal.x, proposal.y), (7, 6));
    }

    #[test]
    fn test_even_board_center() {
        let ranked = HeuristicAgent::ranked_candidates(&Board::new(6));
        assert_eq!(&ranked[..4], &[Pos::new(2, 2), Pos::new(3, 2), Pos::new(2, 3), Pos::new(3, 3)]);
    }

    #[test]
    fn test_ensure_legal_filters_forbidden_center() {
        let mut board = Board::new(15);
        for (x, y) in [(6, 7), (8, 7), (7, 6), (7, 8)] {
            board.place_stone(Pos::new(x, y), Stone::Black);
        }
        // Without filtering the agent walks straight into the double-three
        let raw = quiet().propose_move(&board, Player::Black, false).unwrap();
        assert_eq!((raw.x, raw.y), (7, 7));

        let legal = quiet().propose_move(&board, Player::Black, true).unwrap();
        assert_ne!((legal.x, legal.y), (7, 7));
    }

    #[test]
    fn test_full_board_has_no_moves() {
        let mut board = Board::new(5);
        for idx in 0..25 {
            board.place_stone(Pos::from_index(idx, 5), Stone::White);
        }
        assert_eq!(
            quiet().propose_move(&board, Player::Black, false),
            Err(AgentError::NoLegalMoves)
        );
    }

    #[test]
    fn test_full_noise_still_plays_empty_cell() {
        let preset = LevelPreset { sims: 1, explore: 1.0, noise: 1.0 };
        let agent = HeuristicAgent::new(preset, Some(42));
        let mut board = Board::new(5);
        board.place_stone(Pos::new(2, 2), Stone::Black);
        for _ in 0..20 {
            let p = agent.propose_move(&board, Player::White, true).unwrap();
            assert!(board.is_empty(Pos::new(p.x as u8, p.y as u8)));
        }
    }
}
