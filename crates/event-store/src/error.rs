use thiserror::Error;

use crate::{AggregateId, Version};

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The event does not name the aggregate it belongs to.
    #[error("Event {event_type} has no aggregate id")]
    MissingAggregateId { event_type: String },

    /// The event's version does not follow the aggregate's current version.
    #[error(
        "Concurrency conflict for aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// An envelope was built without a required field.
    #[error("Incomplete event envelope: missing {0}")]
    IncompleteEnvelope(&'static str),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
