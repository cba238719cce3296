//! Supervised samples for the training collaborator
//!
//! Every move of a finished game becomes one sample: the board as it was
//! before the move, the side that moved, and the cell it chose. Moves made by
//! the eventual winner carry more weight.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::board::{Board, Player, Pos, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::StoreError;

use super::{append_line, GameRecord};

/// Weight of a move played by the winner
pub const WINNER_WEIGHT: f32 = 1.5;
/// Weight of every other move
pub const BASE_WEIGHT: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Cell codes before the move, row-major
    pub board: Vec<u8>,
    pub player: Player,
    /// Index of the chosen cell, `y * size + x`
    pub target: usize,
    pub weight: f32,
}

/// Replay a record into samples. Moves that fall off the board stop the replay.
pub fn samples_from_record(record: &GameRecord) -> Vec<TrainingSample> {
    let size = record.size;
    if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        return Vec::new();
    }
    let mut board = Board::new(size);
    let mut samples = Vec::with_capacity(record.moves.len());

    for mv in &record.moves {
        let pos: Pos = mv.pos();
        if !board.contains(pos) {
            break;
        }
        let cells = board.rows().into_iter().flatten().collect();
        let weight = if record.winner == Some(mv.player) {
            WINNER_WEIGHT
        } else {
            BASE_WEIGHT
        };
        samples.push(TrainingSample {
            board: cells,
            player: mv.player,
            target: pos.to_index(size),
            weight,
        });
        board.place_stone(pos, mv.player.stone());
    }
    samples
}

/// Training collaborator: consumes finished games, reports how many samples it took
pub trait TrainingSink: Send + Sync {
    fn submit(&self, record: &GameRecord) -> Result<usize, StoreError>;
}

/// Writes samples as JSON lines for an offline trainer
pub struct SampleWriter {
    path: PathBuf,
    /// Only games on this board size are used
    size: usize,
    write_lock: Mutex<()>,
}

impl SampleWriter {
    pub fn new(path: impl Into<PathBuf>, size: usize) -> Self {
        Self {
            path: path.into(),
            size,
            write_lock: Mutex::new(()),
        }
    }
}

impl TrainingSink for SampleWriter {
    fn submit(&self, record: &GameRecord) -> Result<usize, StoreError> {
        if record.size != self.size {
            return Ok(0);
        }
        let samples = samples_from_record(record);
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        for sample in &samples {
            append_line(&self.path, &serde_json::to_string(sample)?)?;
        }
        Ok(samples.len())
    }
}
