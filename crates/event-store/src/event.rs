use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AggregateId, EventStoreError};

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of an event within its aggregate's history.
///
/// An aggregate with no events is at version 0; its first event carries
/// version 1 and every later event increments by one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) for an aggregate without history.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the first version (1) for the first event.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored event: a domain event payload plus the metadata needed to file
/// it under its aggregate.
///
/// `aggregate_id` is optional only so that an envelope which cannot name its
/// aggregate can be represented and rejected by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// Discriminator of the event (e.g. "GameStarted").
    pub event_type: String,

    /// The aggregate this event belongs to.
    pub aggregate_id: Option<AggregateId>,

    /// Kind of aggregate (e.g. "Game").
    pub aggregate_type: String,

    /// The version of the aggregate after this event.
    pub version: Version,

    /// When the event was created.
    pub timestamp: DateTime<Utc>,

    /// The serialized domain event.
    pub payload: serde_json::Value,

    /// Additional metadata about the event.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl EventEnvelope {
    /// Creates a new event envelope builder.
    pub fn builder() -> EventEnvelopeBuilder {
        EventEnvelopeBuilder::default()
    }

    /// Returns true if this event belongs to the given aggregate.
    pub fn belongs_to(&self, aggregate_id: &AggregateId) -> bool {
        self.aggregate_id.as_ref() == Some(aggregate_id)
    }
}

/// Builder for constructing event envelopes.
#[derive(Debug, Default)]
pub struct EventEnvelopeBuilder {
    event_id: Option<EventId>,
    event_type: Option<String>,
    aggregate_id: Option<AggregateId>,
    aggregate_type: Option<String>,
    version: Option<Version>,
    timestamp: Option<DateTime<Utc>>,
    payload: Option<serde_json::Value>,
    metadata: HashMap<String, serde_json::Value>,
}

impl EventEnvelopeBuilder {
    /// Sets the event ID. If not set, a new ID will be generated.
    pub fn event_id(mut self, id: EventId) -> Self {
        self.event_id = Some(id);
        self
    }

    /// Sets the event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the aggregate ID.
    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    /// Sets the aggregate type.
    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    /// Sets the version.
    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the timestamp. If not set, the current time will be used.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Adds a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Builds the event envelope.
    ///
    /// The aggregate ID may be left unset; the store rejects such events.
    /// Every other field except ID, timestamp and metadata is required.
    pub fn build(self) -> Result<EventEnvelope, EventStoreError> {
        Ok(EventEnvelope {
            event_id: self.event_id.unwrap_or_default(),
            event_type: self
                .event_type
                .ok_or(EventStoreError::IncompleteEnvelope("event_type"))?,
            aggregate_id: self.aggregate_id,
            aggregate_type: self
                .aggregate_type
                .ok_or(EventStoreError::IncompleteEnvelope("aggregate_type"))?,
            version: self
                .version
                .ok_or(EventStoreError::IncompleteEnvelope("version"))?,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self
                .payload
                .ok_or(EventStoreError::IncompleteEnvelope("payload"))?,
            metadata: self.metadata,
        })
    }
}
