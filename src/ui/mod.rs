//! Desktop front-end built on egui/eframe

mod app;
mod board_view;
mod game_state;
mod theme;

pub use app::OmokApp;
pub use game_state::{GameMode, GameState, Persistence};
