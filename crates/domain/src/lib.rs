//! Domain layer for the event-sourced game league.
//!
//! This crate provides:
//! - `DecisionProjection`, the replay engine every aggregate derives its state from
//! - `Aggregate` trait and `AggregateRoot` for event-sourced entities
//! - `Repository` for rebuilding aggregates from the event store
//! - Game, Player, UserIdentity, Session and Account aggregates

pub mod account;
pub mod aggregate;
pub mod error;
pub mod game;
pub mod player;
pub mod projection;
pub mod repository;
pub mod session;
pub mod user;

pub use account::{Account, AccountError, AccountEvent, Money};
pub use aggregate::{Aggregate, AggregateRoot, DomainEvent, EventKind};
pub use error::DomainError;
pub use game::{Game, GameError, GameEvent, Team};
pub use player::{Player, PlayerError, PlayerEvent};
pub use projection::{DecisionProjection, Mutator, ProjectionData};
pub use repository::Repository;
pub use session::{Session, SessionError, SessionEvent};
pub use user::{UserError, UserEvent, UserIdentity};
