//! Board structure

use super::bitboard::Bitboard;
use super::{Player, Pos, Stone, DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE};

/// Square game board. Stores stones only; rules live in [`crate::rules`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    /// Black stones bitboard
    black: Bitboard,
    /// White stones bitboard
    white: Bitboard,
}

impl Board {
    pub fn new(size: usize) -> Self {
        debug_assert!(size > 0 && size <= MAX_BOARD_SIZE);
        Self {
            size,
            black: Bitboard::new(size * size),
            white: Bitboard::new(size * size),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Resolve signed coordinates to a position on this board
    #[inline]
    pub fn pos(&self, x: i32, y: i32) -> Option<Pos> {
        if x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size {
            Some(Pos::new(x as u8, y as u8))
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        (pos.x as usize) < self.size && (pos.y as usize) < self.size
    }

    /// Get stone at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        let idx = pos.to_index(self.size);
        if self.black.get(idx) {
            Stone::Black
        } else if self.white.get(idx) {
            Stone::White
        } else {
            Stone::Empty
        }
    }

    /// Check if position is empty
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.get(pos) == Stone::Empty
    }

    /// Place a stone without any rule checks.
    /// Game moves go through [`crate::session::Session::apply_move`].
    #[inline]
    pub fn place_stone(&mut self, pos: Pos, stone: Stone) {
        let idx = pos.to_index(self.size);
        match stone {
            Stone::Black => self.black.set(idx),
            Stone::White => self.white.set(idx),
            Stone::Empty => {
                self.black.clear(idx);
                self.white.clear(idx);
            }
        }
    }

    /// Get bitboard for a side
    #[inline]
    pub fn stones(&self, player: Player) -> &Bitboard {
        match player {
            Player::Black => &self.black,
            Player::White => &self.white,
        }
    }

    /// Total stones on board
    #[inline]
    pub fn stone_count(&self) -> u32 {
        self.black.count() + self.white.count()
    }

    #[inline]
    pub fn is_board_empty(&self) -> bool {
        self.black.is_empty() && self.white.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.stone_count() as usize == self.size * self.size
    }

    /// Empty cells in raster order (increasing y, then x)
    pub fn empty_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.size * self.size)
            .map(|idx| Pos::from_index(idx, self.size))
            .filter(|&pos| self.is_empty(pos))
    }

    /// Rows of cell codes (0 empty, 1 black, 2 white), indexed `[y][x]`
    pub fn rows(&self) -> Vec<Vec<u8>> {
        (0..self.size)
            .map(|y| {
                (0..self.size)
                    .map(|x| self.get(Pos::new(x as u8, y as u8)).code())
                    .collect()
            })
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE)
    }
}
