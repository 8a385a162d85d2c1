//! Identifier value types shared across the workspace.

pub mod error;
pub mod types;

pub use error::EmptyIdentifierError;
pub use types::{AccountId, AggregateId, GameId, Identifier, PlayerId, SessionId, UserId};
