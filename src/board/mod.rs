//! Board representation for Omok

pub mod bitboard;
pub mod board;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

// Re-exports
pub use bitboard::Bitboard;
pub use board::Board;

/// Default board size (15x15)
pub const DEFAULT_BOARD_SIZE: usize = 15;
/// Smallest board that still fits a five
pub const MIN_BOARD_SIZE: usize = 5;
/// Largest board the A-Z column labels can address
pub const MAX_BOARD_SIZE: usize = 26;

/// Cell contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stone {
    Empty,
    Black,
    White,
}

impl Stone {
    /// Wire code used by board snapshots: 0 empty, 1 black, 2 white
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Stone::Empty => 0,
            Stone::Black => 1,
            Stone::White => 2,
        }
    }
}

/// A side in the game. Unlike [`Stone`] it can never be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Player {
    Black,
    White,
}

impl Player {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    #[inline]
    pub fn stone(self) -> Stone {
        match self {
            Player::Black => Stone::Black,
            Player::White => Stone::White,
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        self.stone().code()
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::Black => f.write_str("black"),
            Player::White => f.write_str("white"),
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> u8 {
        player.code()
    }
}

impl TryFrom<u8> for Player {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Player::Black),
            2 => Ok(Player::White),
            other => Err(format!("invalid player code {other}, expected 1 or 2")),
        }
    }
}

/// Position on the board: `x` is the column, `y` the row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: u8,
    pub y: u8,
}

impl Pos {
    #[inline]
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Row-major index on a board of the given size
    #[inline]
    pub fn to_index(self, size: usize) -> usize {
        self.y as usize * size + self.x as usize
    }

    #[inline]
    pub fn from_index(idx: usize, size: usize) -> Self {
        Self {
            x: (idx % size) as u8,
            y: (idx / size) as u8,
        }
    }

    /// Step `steps` cells along `(dx, dy)`, staying on a board of `size`
    #[inline]
    pub fn offset(self, dx: i32, dy: i32, steps: i32, size: usize) -> Option<Pos> {
        let x = self.x as i32 + dx * steps;
        let y = self.y as i32 + dy * steps;
        if x >= 0 && y >= 0 && (x as usize) < size && (y as usize) < size {
            Some(Pos::new(x as u8, y as u8))
        } else {
            None
        }
    }
}

/// Raster order: increasing y, then x
impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

/// A recorded stone placement. Serialized as `{"x", "y", "p"}` with `p` 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub x: u8,
    pub y: u8,
    #[serde(rename = "p")]
    pub player: Player,
}

impl Move {
    #[inline]
    pub fn new(pos: Pos, player: Player) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            player,
        }
    }

    #[inline]
    pub fn pos(&self) -> Pos {
        Pos::new(self.x, self.y)
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
