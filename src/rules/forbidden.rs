//! Forbidden move rules: double-three and overline
//!
//! A double-three is a move that creates two or more open threes at once.
//! Open three: three stones of one color in a line with both flanks empty,
//! one move away from an unstoppable four. Three shapes are recognized on the
//! edge-to-edge line through the candidate:
//!
//! - `_OOO_` (flat three)
//! - `_O_OO_` and `_OO_O_` (split threes)
//! - any `OOO` flanked by empty cells inside a 7-cell window
//!
//! The flat and windowed shapes describe the same stones, so every match is
//! reduced to the coordinates of its three stones and counted once. Only threes
//! whose stones include the candidate count.
//!
//! An overline is six or more contiguous stones. Both rules bind both colors.

use std::collections::BTreeSet;

use tracing::debug;

use crate::board::{Board, Player, Pos};
use crate::error::MoveError;

use super::line::{run_through, Cell, Line, DIRECTIONS};

const E: Cell = Cell::Empty;
const O: Cell = Cell::Own;

/// `_OOO_`
const FLAT_THREE: [Cell; 5] = [E, O, O, O, E];
/// `_O_OO_` and `_OO_O_`
const SPLIT_THREES: [[Cell; 6]; 2] = [[E, O, E, O, O, E], [E, O, O, E, O, E]];
/// Window scanned for flanked consecutive threes
const WIDE_WINDOW: usize = 7;

/// One open three, identified by its stones in raster order
pub type OpenThree = [Pos; 3];

/// Collect the open threes on one line that contain the candidate
fn open_threes_in_line(line: &Line, found: &mut BTreeSet<OpenThree>) {
    let cells = &line.cells;
    let c = line.candidate;

    let mut record = |indices: [usize; 3]| {
        if indices.contains(&c) {
            let mut three = indices.map(|i| line.coords[i]);
            three.sort();
            found.insert(three);
        }
    };

    // _OOO_
    for (i, window) in cells.windows(FLAT_THREE.len()).enumerate() {
        if i <= c && c < i + FLAT_THREE.len() && window == FLAT_THREE {
            record([i + 1, i + 2, i + 3]);
        }
    }

    // _O_OO_ / _OO_O_
    for (i, window) in cells.windows(6).enumerate() {
        if !(i <= c && c < i + 6) {
            continue;
        }
        if window == SPLIT_THREES[0] {
            record([i + 1, i + 3, i + 4]);
        } else if window == SPLIT_THREES[1] {
            record([i + 1, i + 2, i + 4]);
        }
    }

    // OOO flanked by empties anywhere inside a 7-cell window; the three
    // starts at offset 1..=3 so both flanks stay inside the window
    for (i, window) in cells.windows(WIDE_WINDOW).enumerate() {
        if !(i <= c && c < i + WIDE_WINDOW) {
            continue;
        }
        for j in 1..=WIDE_WINDOW - 4 {
            if window[j..j + 3] == [O, O, O] && window[j - 1] == E && window[j + 3] == E {
                record([i + j, i + j + 1, i + j + 2]);
            }
        }
    }
}

/// Distinct open threes that placing `player` at `pos` would create.
///
/// Returns an empty list for occupied cells.
pub fn open_threes(board: &Board, pos: Pos, player: Player) -> Vec<OpenThree> {
    if !board.contains(pos) || !board.is_empty(pos) {
        return Vec::new();
    }

    let mut found = BTreeSet::new();
    for &(dx, dy) in &DIRECTIONS {
        let line = Line::through(board, pos, player, dx, dy);
        open_threes_in_line(&line, &mut found);
    }
    found.into_iter().collect()
}

/// Count how many distinct open threes would be created by placing at `pos`
pub fn count_open_threes(board: &Board, pos: Pos, player: Player) -> usize {
    open_threes(board, pos, player).len()
}

/// Check if move is a double-three (forbidden)
///
/// # Returns
/// `true` if the move creates two or more distinct open threes, `false` otherwise
/// (including when the cell is already occupied)
pub fn is_double_three(board: &Board, pos: Pos, player: Player) -> bool {
    let count = count_open_threes(board, pos, player);
    if count >= 2 {
        debug!(%pos, ?player, count, "double-three");
        return true;
    }
    false
}

/// Check if move would make six or more in a row (forbidden)
///
/// Returns `false` for occupied cells.
pub fn is_overline(board: &Board, pos: Pos, player: Player) -> bool {
    if !board.contains(pos) || !board.is_empty(pos) {
        return false;
    }
    DIRECTIONS
        .iter()
        .any(|&(dx, dy)| run_through(board, pos, player, dx, dy) > 5)
}

/// Apply both placement rules to an empty cell
pub fn check_placement(board: &Board, pos: Pos, player: Player) -> Result<(), MoveError> {
    if is_double_three(board, pos, player) {
        return Err(MoveError::DoubleThree { pos });
    }
    if is_overline(board, pos, player) {
        return Err(MoveError::Overline { pos });
    }
    Ok(())
}

/// Check if a move is legal
///
/// A move is legal if the position is on the board, empty, and neither a
/// double-three nor an overline.
pub fn is_legal_move(board: &Board, pos: Pos, player: Player) -> bool {
    board.contains(pos) && board.is_empty(pos) && check_placement(board, pos, player).is_ok()
}

/// First legal cell in raster order (increasing y, then x)
pub fn first_legal_move(board: &Board, player: Player) -> Option<Pos> {
    board
        .empty_cells()
        .find(|&pos| check_placement(board, pos, player).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Stone;

    fn place(board: &mut Board, stone: Stone, cells: &[(u8, u8)]) {
        for &(x, y) in cells {
            board.place_stone(Pos::new(x, y), stone);
        }
    }

    #[test]
    fn test_not_double_three_empty_board() {
        let board = Board::new(15);
        assert!(!is_double_three(&board, Pos::new(7, 7), Player::Black));
        assert_eq!(count_open_threes(&board, Pos::new(7, 7), Player::Black), 0);
    }

    #[test]
    fn test_occupied_cell_never_forbidden() {
        let mut board = Board::new(15);
        // Cross that would be a double-three at (7,7) if it were empty
        place(&mut board, Stone::Black, &[(6, 7), (8, 7), (7, 6), (7, 8)]);
        board.place_stone(Pos::new(7, 7), Stone::White);
        assert!(!is_double_three(&board, Pos::new(7, 7), Player::Black));

        // Five in a row with the candidate sitting on an occupied cell
        let mut board = Board::new(15);
        place(&mut board, Stone::Black, &[(0, 3), (1, 3), (2, 3), (3, 3), (4, 3), (5, 3)]);
        assert!(!is_overline(&board, Pos::new(5, 3), Player::Black));
    }

    #[test]
    fn test_flat_three_counted_once() {
        let mut board = Board::new(15);
        // _ B _ B _ : placing at 7 makes _ B B B _
        place(&mut board, Stone::Black, &[(6, 9), (8, 9)]);

        let threes = open_threes(&board, Pos::new(7, 9), Player::Black);
        assert_eq!(
            threes,
            vec![[Pos::new(6, 9), Pos::new(7, 9), Pos::new(8, 9)]],
            "flat and windowed shapes describe one three"
        );
    }

    #[test]
    fn test_split_three() {
        let mut board = Board::new(15);
        // _ B B _ B _ after placing at (9, 9)
        place(&mut board, Stone::Black, &[(6, 9), (7, 9)]);
        assert_eq!(count_open_threes(&board, Pos::new(9, 9), Player::Black), 1);

        // _ B _ B B _ after placing at (6, 9)
        let mut board = Board::new(15);
        place(&mut board, Stone::Black, &[(8, 9), (9, 9)]);
        assert_eq!(count_open_threes(&board, Pos::new(6, 9), Player::Black), 1);
    }

    #[test]
    fn test_three_with_room_on_both_sides() {
        let mut board = Board::new(15);
        // Candidate on the left end with a long empty run before it
        place(&mut board, Stone::Black, &[(8, 9), (9, 9)]);
        assert_eq!(count_open_threes(&board, Pos::new(7, 9), Player::Black), 1);
        assert!(is_legal_move(&board, Pos::new(7, 9), Player::Black));
        assert_eq!(first_legal_move(&board, Player::Black), Some(Pos::new(0, 0)));
    }

    /// Every shape in every direction, with the candidate at each of its stones
    #[test]
    fn test_candidate_at_each_stone_of_a_three() {
        let shapes: [&[i32]; 3] = [&[0, 1, 2], &[0, 2, 3], &[0, 1, 3]];
        let anchor = Pos::new(7, 7);

        for &(dx, dy) in &DIRECTIONS {
            for shape in shapes {
                let stones: Vec<Pos> = shape
                    .iter()
                    .filter_map(|&k| anchor.offset(dx, dy, k, 15))
                    .collect();
                assert_eq!(stones.len(), 3);

                for &candidate in &stones {
                    let mut board = Board::new(15);
                    for &pos in stones.iter().filter(|&&pos| pos != candidate) {
                        board.place_stone(pos, Stone::Black);
                    }
                    assert_eq!(
                        count_open_threes(&board, candidate, Player::Black),
                        1,
                        "shape {shape:?} along ({dx}, {dy}) with candidate {candidate}"
                    );
                    assert!(is_legal_move(&board, candidate, Player::Black));
                }
            }
        }
    }

    #[test]
    fn test_not_open_three_when_blocked() {
        let mut board = Board::new(15);
        // W B _ B _
        board.place_stone(Pos::new(5, 9), Stone::White);
        place(&mut board, Stone::Black, &[(6, 9), (8, 9)]);
        assert_eq!(count_open_threes(&board, Pos::new(7, 9), Player::Black), 0);
    }

    #[test]
    fn test_edge_blocks_three() {
        let mut board = Board::new(15);
        // Row 0: B _ B _ with the board edge left of the first B
        place(&mut board, Stone::Black, &[(0, 0), (2, 0)]);
        assert_eq!(count_open_threes(&board, Pos::new(1, 0), Player::Black), 0);

        // One cell of room before the edge is enough
        let mut board = Board::new(15);
        place(&mut board, Stone::Black, &[(1, 0), (3, 0)]);
        assert_eq!(count_open_threes(&board, Pos::new(2, 0), Player::Black), 1);
    }

    #[test]
    fn test_existing_three_nearby_not_counted() {
        let mut board = Board::new(15);
        // _ B B B _ _ ? : the three at x=2..4 does not involve x=6
        place(&mut board, Stone::Black, &[(2, 5), (3, 5), (4, 5)]);
        assert_eq!(count_open_threes(&board, Pos::new(6, 5), Player::Black), 0);
    }

    #[test]
    fn test_four_is_not_three() {
        let mut board = Board::new(15);
        place(&mut board, Stone::Black, &[(6, 9), (7, 9), (9, 9)]);
        assert_eq!(count_open_threes(&board, Pos::new(8, 9), Player::Black), 0);
    }

    #[test]
    fn test_double_three_cross_pattern() {
        let mut board = Board::new(15);
        //     x: 6 7 8
        // y 6:   . B .
        // y 7:   B _ B
        // y 8:   . B .
        place(&mut board, Stone::Black, &[(6, 7), (8, 7), (7, 6), (7, 8)]);
        assert!(is_double_three(&board, Pos::new(7, 7), Player::Black));
        assert!(!is_legal_move(&board, Pos::new(7, 7), Player::Black));
        assert_eq!(
            check_placement(&board, Pos::new(7, 7), Player::Black),
            Err(MoveError::DoubleThree { pos: Pos::new(7, 7) })
        );
    }

    #[test]
    fn test_double_three_diagonal_cross() {
        let mut board = Board::new(15);
        place(&mut board, Stone::White, &[(6, 6), (8, 8), (8, 6), (6, 8)]);
        assert_eq!(count_open_threes(&board, Pos::new(7, 7), Player::White), 2);
        assert!(is_double_three(&board, Pos::new(7, 7), Player::White), "white is bound too");
    }

    #[test]
    fn test_flat_plus_split_is_double_three() {
        let mut board = Board::new(15);
        // Horizontal flat: (5,7) (6,7) + candidate (7,7)
        // Vertical split: candidate (7,7) _ (7,9) (7,10)
        place(&mut board, Stone::Black, &[(5, 7), (6, 7), (7, 9), (7, 10)]);
        assert_eq!(count_open_threes(&board, Pos::new(7, 7), Player::Black), 2);
    }

    #[test]
    fn test_single_open_three_allowed() {
        let mut board = Board::new(15);
        place(&mut board, Stone::Black, &[(3, 3), (4, 4), (5, 5), (4, 3), (3, 4)]);
        // Row y=3 becomes _BBB_; nothing else through (5,3) forms a three
        assert_eq!(count_open_threes(&board, Pos::new(5, 3), Player::Black), 1);
        assert!(is_legal_move(&board, Pos::new(5, 3), Player::Black));

        // Column x=5 adds a second three
        board.place_stone(Pos::new(5, 4), Stone::Black);
        assert_eq!(count_open_threes(&board, Pos::new(5, 3), Player::Black), 2);
        assert!(is_double_three(&board, Pos::new(5, 3), Player::Black));
    }

    #[test]
    fn test_overline_detection() {
        let mut board = Board::new(15);
        place(&mut board, Stone::Black, &[(2, 4), (3, 4), (4, 4), (5, 4), (6, 4)]);
        assert!(is_overline(&board, Pos::new(7, 4), Player::Black));
        assert!(is_overline(&board, Pos::new(1, 4), Player::Black));
        assert!(!is_overline(&board, Pos::new(7, 4), Player::White));
        assert_eq!(
            check_placement(&board, Pos::new(7, 4), Player::Black),
            Err(MoveError::Overline { pos: Pos::new(7, 4) })
        );
    }

    #[test]
    fn test_filling_gap_into_six_is_overline() {
        let mut board = Board::new(15);
        // B B B _ B B : the gap joins six
        place(&mut board, Stone::Black, &[(0, 0), (1, 0), (2, 0), (4, 0), (5, 0)]);
        assert!(is_overline(&board, Pos::new(3, 0), Player::Black));
    }

    #[test]
    fn test_five_is_not_overline() {
        let mut board = Board::new(15);
        place(&mut board, Stone::Black, &[(2, 4), (3, 4), (4, 4), (5, 4)]);
        assert!(!is_overline(&board, Pos::new(6, 4), Player::Black));
    }

    #[test]
    fn test_first_legal_move_skips_forbidden_cells() {
        let mut board = Board::new(15);
        // Row 0: B B B B B _ B _ ...  (5,0) would make seven
        place(&mut board, Stone::Black, &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (6, 0)]);
        assert!(is_overline(&board, Pos::new(5, 0), Player::Black));
        assert_eq!(first_legal_move(&board, Player::Black), Some(Pos::new(7, 0)));
        // White is free to block there
        assert_eq!(first_legal_move(&board, Player::White), Some(Pos::new(5, 0)));
    }

    #[test]
    fn test_first_legal_move_none_on_full_board() {
        let mut board = Board::new(5);
        for idx in 0..25 {
            board.place_stone(Pos::from_index(idx, 5), Stone::Black);
        }
        assert_eq!(first_legal_move(&board, Player::White), None);
    }
}
