use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{AggregateId, EventEnvelope, EventQuery, Result, Version};

/// A stream of events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<EventEnvelope>> + Send>>;

/// Append-only log of events across all aggregates.
///
/// Implementations never reorder, deduplicate or delete events: for any one
/// aggregate, retrieval order is append order. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends one event to the log.
    ///
    /// Fails with `MissingAggregateId` if the event does not name its
    /// aggregate, and with `ConcurrencyConflict` if its version is not the
    /// aggregate's current version plus one. Nothing is appended on failure.
    ///
    /// Returns the aggregate's version after the append.
    async fn append(&self, event: EventEnvelope) -> Result<Version>;

    /// Retrieves every event of one aggregate, in append order.
    ///
    /// Returns an empty list when the aggregate has no events.
    async fn get_events_of_aggregate(&self, aggregate_id: &AggregateId)
    -> Result<Vec<EventEnvelope>>;

    /// Retrieves events with the given discriminator, in append order.
    async fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventEnvelope>>;

    /// Retrieves events matching a query, in append order.
    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>>;

    /// Streams all events in the store, in append order.
    async fn stream_all_events(&self) -> Result<EventStream>;

    /// Gets the current version of an aggregate.
    ///
    /// Returns None if the aggregate has no events.
    async fn get_aggregate_version(&self, aggregate_id: &AggregateId) -> Result<Option<Version>>;
}

/// Extension trait providing convenience methods for event stores.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Checks if an aggregate exists (has any events).
    async fn aggregate_exists(&self, aggregate_id: &AggregateId) -> Result<bool> {
        Ok(self.get_aggregate_version(aggregate_id).await?.is_some())
    }
}

// Blanket implementation for all EventStore implementations
impl<T: EventStore + ?Sized> EventStoreExt for T {}
