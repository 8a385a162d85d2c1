//! Player aggregate and related types.

mod aggregate;
mod events;

pub use aggregate::Player;
pub use events::{
    PlayerCreatedData, PlayerDeletedData, PlayerEvent, PlayerEventKind, PlayerRenamedData,
};

use thiserror::Error;

/// Errors that can occur during player operations.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The player has not been created yet.
    #[error("Player not created")]
    NotCreated,

    /// The player already exists.
    #[error("Player already created")]
    AlreadyCreated,

    /// The player was deleted.
    #[error("Player is deleted")]
    Deleted,

    /// A player needs a name.
    #[error("Player name cannot be empty")]
    EmptyName,
}
