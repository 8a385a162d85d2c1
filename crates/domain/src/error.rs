//! Domain error types.

use common::EmptyIdentifierError;
use event_store::{EventStoreError, PublishError};
use thiserror::Error;

use crate::account::AccountError;
use crate::game::GameError;
use crate::player::PlayerError;
use crate::session::SessionError;
use crate::user::UserError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// At least one listener failed while a new event was published.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// The aggregate has no history.
    #[error("Unknown aggregate: {aggregate_type} with id {aggregate_id}")]
    UnknownAggregate {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// A creation command targeted an id that already has a history.
    #[error("Aggregate already exists: {aggregate_type} with id {aggregate_id}")]
    AlreadyExists {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// An identifier could not be built.
    #[error(transparent)]
    Identifier(#[from] EmptyIdentifierError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A game rule was violated.
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// A player rule was violated.
    #[error("Player error: {0}")]
    Player(#[from] PlayerError),

    /// A user identity rule was violated.
    #[error("User error: {0}")]
    User(#[from] UserError),

    /// A session rule was violated.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// An account rule was violated.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),
}

impl DomainError {
    /// Returns the event store error behind this error, if any.
    ///
    /// Store rejections reach aggregates wrapped in a [`PublishError`].
    pub fn store_error(&self) -> Option<&EventStoreError> {
        match self {
            DomainError::EventStore(e) => Some(e),
            DomainError::Publish(e) => e.store_error(),
            _ => None,
        }
    }
}
