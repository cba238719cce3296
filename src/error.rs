//! Error types for moves, sessions, agents and record storage.

use derive_more::{Display, Error};

use crate::board::{Player, Pos};

/// Why a move was refused. The session is left untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    #[display("({x}, {y}) is off the board")]
    OutOfBounds { x: i32, y: i32 },
    #[display("{pos} is already occupied")]
    Occupied { pos: Pos },
    #[display("not {got}'s turn, {expected} to move")]
    WrongTurn { expected: Player, got: Player },
    #[display("{pos} is a forbidden double-three")]
    DoubleThree { pos: Pos },
    #[display("{pos} would make an overline")]
    Overline { pos: Pos },
}

impl MoveError {
    /// Stable machine-readable reason
    pub fn reason_code(&self) -> &'static str {
        match self {
            MoveError::OutOfBounds { .. } => "out_of_bounds",
            MoveError::Occupied { .. } => "occupied",
            MoveError::WrongTurn { .. } => "wrong_turn",
            MoveError::DoubleThree { .. } => "double_three",
            MoveError::Overline { .. } => "overline",
        }
    }
}

#[derive(Debug, Display, Error)]
pub enum SessionError {
    #[display("game {id} not found")]
    NotFound {
        #[error(not(source))]
        id: String,
    },
    #[display("board size {size} is outside {min}..={max}")]
    InvalidSize { size: usize, min: usize, max: usize },
    #[display("move rejected: {source}")]
    Rejected { source: MoveError },
}

impl From<MoveError> for SessionError {
    fn from(source: MoveError) -> Self {
        SessionError::Rejected { source }
    }
}

/// The automated opponent could not deliver a usable proposal
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum AgentError {
    #[display("agent did not answer within {ms}ms")]
    Timeout { ms: u64 },
    #[display("no legal moves available")]
    NoLegalMoves,
    #[display("agent worker stopped without answering")]
    Disconnected,
}

/// Failure writing or reading game records
#[derive(Debug, Display, Error)]
pub enum StoreError {
    #[display("record io failed: {source}")]
    Io { source: std::io::Error },
    #[display("record encoding failed: {source}")]
    Encode { source: serde_json::Error },
}

impl From<std::io::Error> for StoreError {
    fn from(source: std::io::Error) -> Self {
        StoreError::Io { source }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(source: serde_json::Error) -> Self {
        StoreError::Encode { source }
    }
}

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("cannot read config: {source}")]
    Io { source: std::io::Error },
    #[display("cannot parse config: {source}")]
    Parse { source: toml::de::Error },
    #[display("board size {size} is outside {min}..={max}")]
    InvalidSize { size: usize, min: usize, max: usize },
}
