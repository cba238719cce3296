//! Win condition checking
//!
//! The only winning shape is exactly five in a row. Six or more is an
//! overline: forbidden to play, and never a win even if it reaches the board.

use crate::board::{Board, Player, Pos};

use super::line::{run_length, run_through, DIRECTIONS};

/// Check whether the stone at `pos` completes exactly five in a row.
///
/// `pos` is treated as holding `player`'s stone whether or not it has been
/// written yet.
#[inline]
pub fn is_exact_five(board: &Board, pos: Pos, player: Player) -> bool {
    DIRECTIONS
        .iter()
        .any(|&(dx, dy)| run_through(board, pos, player, dx, dy) == 5)
}

/// The five winning cells through `pos`, ordered from one end to the other
pub fn winning_line(board: &Board, pos: Pos, player: Player) -> Option<[Pos; 5]> {
    for &(dx, dy) in &DIRECTIONS {
        if run_through(board, pos, player, dx, dy) != 5 {
            continue;
        }
        let back = run_length(board, pos, player, -dx, -dy) as i32;
        let start = pos.offset(-dx, -dy, back, board.size())?;
        let mut line = [start; 5];
        for (i, cell) in line.iter_mut().enumerate().skip(1) {
            *cell = start.offset(dx, dy, i as i32, board.size())?;
        }
        return Some(line);
    }
    None
}
