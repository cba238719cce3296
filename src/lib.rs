//! Omok (five-in-a-row) with renju-style restrictions
//!
//! - 15x15 board by default, any size from 5 to 26
//! - Exactly five in a row wins; six or more never does
//! - Double-three and overline are forbidden, for both colors
//! - Optional automated opponent whose proposals are re-validated, with a
//!   deterministic fallback when they are late or illegal
//!
//! # Architecture
//!
//! - [`board`]: board representation with bitboards
//! - [`rules`]: forbidden-move detection and the exact-five win check
//! - [`agent`]: automated opponents behind the [`Agent`] trait
//! - [`session`]: per-game state machine and the session registry
//! - [`record`]: finished-game archive and training samples
//! - [`config`]: TOML configuration and difficulty presets
//! - [`ui`]: egui desktop front-end
//!
//! # Quick Start
//!
//! ```
//! use omok::{MoveError, MoveOutcome, Player, Session};
//!
//! let mut session = Session::new("demo", 15, None)?;
//! session.apply_move(7, 7, Player::Black)?;
//! let outcome = session.apply_move(7, 8, Player::White)?;
//! assert_eq!(outcome, MoveOutcome::Continue { next: Player::Black });
//!
//! // White may not play out of turn
//! assert!(matches!(
//!     session.apply_move(0, 0, Player::White),
//!     Err(MoveError::WrongTurn { .. })
//! ));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod agent;
pub mod board;
pub mod config;
pub mod error;
pub mod record;
pub mod rules;
pub mod session;
pub mod ui;

// Re-export commonly used types for convenience
pub use agent::{build_agent, Agent, Proposal};
pub use board::{Board, Move, Player, Pos, Stone};
pub use config::{Difficulty, GameConfig};
pub use error::{AgentError, MoveError, SessionError};
pub use session::{Advance, MoveOutcome, NewGame, Session, SessionRegistry, Snapshot};
