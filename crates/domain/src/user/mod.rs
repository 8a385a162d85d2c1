//! User identity aggregate.

mod aggregate;
mod events;

pub use aggregate::UserIdentity;
pub use events::{
    DisplayNameChangedData, PlayerLinkedData, UserDeactivatedData, UserEvent, UserEventKind,
    UserRegisteredData,
};

use thiserror::Error;

/// Errors that can occur during user identity operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not registered")]
    NotRegistered,

    #[error("User already registered: {email}")]
    AlreadyRegistered { email: String },

    #[error("User is deactivated")]
    Deactivated,

    #[error("Display name cannot be empty")]
    EmptyDisplayName,

    #[error("User already linked to player {player_id}")]
    PlayerAlreadyLinked { player_id: String },
}
