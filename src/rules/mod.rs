//! Game rules for Omok with Renju-style restrictions
//!
//! This module implements the rule set:
//! - Forbidden moves (double-three, overline) for both colors
//! - Win condition (exactly five in a row)

pub mod forbidden;
pub mod line;
pub mod win;

// Re-exports for convenient access
pub use forbidden::{
    check_placement, count_open_threes, first_legal_move, is_double_three, is_legal_move,
    is_overline, open_threes, OpenThree,
};
pub use line::DIRECTIONS;
pub use win::{is_exact_five, winning_line};
