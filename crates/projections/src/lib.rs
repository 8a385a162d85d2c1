//! Read models and projections for the CQRS query side.
//!
//! This crate provides the query side of the CQRS pattern:
//! - [`Projection`] trait for processing events into read models
//! - [`ProjectionListener`] to receive events straight from the publisher
//! - [`ProjectionProcessor`] for subscribing projections and rebuilding them from the store
//! - Two read model views: game list and player list

pub mod error;
pub mod processor;
pub mod projection;
pub mod views;

pub use error::{ProjectionError, Result};
pub use processor::ProjectionProcessor;
pub use projection::{Projection, ProjectionListener};
pub use views::{GameListView, GameStatus, GameSummary, PlayerListView, PlayerSummary};
