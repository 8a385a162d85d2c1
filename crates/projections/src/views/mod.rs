//! Read model views for the CQRS query side.

pub mod game_list;
pub mod player_list;

pub use game_list::{GameListView, GameStatus, GameSummary};
pub use player_list::{PlayerListView, PlayerSummary};
