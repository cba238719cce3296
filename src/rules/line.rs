//! Line extraction shared by the forbidden-move and win checks

use crate::board::{Board, Player, Pos, Stone};

/// Direction vectors for line checking (4 directions)
pub const DIRECTIONS: [(i32, i32); 4] = [
    (1, 0),  // Horizontal
    (0, 1),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal NE
];

/// A cell seen from the mover's side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Own,
    Opponent,
}

impl Cell {
    #[inline]
    fn classify(stone: Stone, player: Player) -> Cell {
        if stone == Stone::Empty {
            Cell::Empty
        } else if stone == player.stone() {
            Cell::Own
        } else {
            Cell::Opponent
        }
    }
}

/// The full edge-to-edge line through a candidate cell, candidate included as `Own`
#[derive(Debug, Clone)]
pub struct Line {
    pub cells: Vec<Cell>,
    pub coords: Vec<Pos>,
    /// Index of the candidate within `cells`
    pub candidate: usize,
}

impl Line {
    /// Build the line through `pos` along `(dx, dy)`, substituting the mover's stone at `pos`
    pub fn through(board: &Board, pos: Pos, player: Player, dx: i32, dy: i32) -> Line {
        let size = board.size();

        // Walk back to the edge
        let mut start = pos;
        while let Some(prev) = start.offset(-dx, -dy, 1, size) {
            start = prev;
        }

        let mut cells = Vec::with_capacity(size);
        let mut coords = Vec::with_capacity(size);
        let mut candidate = 0;
        let mut cursor = Some(start);
        while let Some(cur) = cursor {
            if cur == pos {
                candidate = cells.len();
                cells.push(Cell::Own);
            } else {
                cells.push(Cell::classify(board.get(cur), player));
            }
            coords.push(cur);
            cursor = cur.offset(dx, dy, 1, size);
        }

        Line {
            cells,
            coords,
            candidate,
        }
    }
}

/// Contiguous stones of `player` stepping from `pos` along `(dx, dy)`, excluding `pos`
#[inline]
pub fn run_length(board: &Board, pos: Pos, player: Player, dx: i32, dy: i32) -> usize {
    let stone = player.stone();
    let mut count = 0;
    let mut cursor = pos.offset(dx, dy, 1, board.size());
    while let Some(cur) = cursor {
        if board.get(cur) != stone {
            break;
        }
        count += 1;
        cursor = cur.offset(dx, dy, 1, board.size());
    }
    count
}

/// Length of the run through `pos`, counting `pos` itself as the mover's stone
#[inline]
pub fn run_through(board: &Board, pos: Pos, player: Player, dx: i32, dy: i32) -> usize {
    1 + run_length(board, pos, player, dx, dy) + run_length(board, pos, player, -dx, -dy)
}
