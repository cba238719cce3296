//! Game sessions and the registry that owns them

pub mod game;
pub mod registry;

pub use game::{
    Advance, AgentTurn, FinishReason, MoveOutcome, Opponent, PendingProposal, Session,
    SessionId, Snapshot, Status,
};
pub use registry::{new_game_id, NewGame, SessionRegistry};
