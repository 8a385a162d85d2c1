//! Append-only event log and event publisher.
//!
//! - [`EventEnvelope`]: a stored event with its aggregate identity and version
//! - [`EventStore`] trait and the [`InMemoryEventStore`] implementation
//! - [`EventPublisher`]: synchronous pub/sub that feeds the store and read models

pub mod error;
pub mod event;
pub mod memory;
pub mod publisher;
pub mod query;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, Version};
pub use memory::InMemoryEventStore;
pub use publisher::{
    EventListener, EventPublisher, ListenerError, ListenerFailure, PublishError, StoreListener,
};
pub use query::EventQuery;
pub use store::{EventStore, EventStoreExt, EventStream};
