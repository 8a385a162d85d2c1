use crate::{AggregateId, EventEnvelope, Version};

/// Filter over the event log.
///
/// Every criterion left unset matches all events. Results keep the order in
/// which events were appended.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Only events of this aggregate.
    pub aggregate_id: Option<AggregateId>,

    /// Only events of this aggregate type (e.g. "Game").
    pub aggregate_type: Option<String>,

    /// Only events whose discriminator is one of these.
    pub event_types: Option<Vec<String>>,

    /// Only events at or after this version.
    pub from_version: Option<Version>,

    /// Maximum number of events to return.
    pub limit: Option<usize>,
}

impl EventQuery {
    /// Creates a query matching every event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for a single aggregate.
    pub fn for_aggregate(aggregate_id: AggregateId) -> Self {
        Self {
            aggregate_id: Some(aggregate_id),
            ..Default::default()
        }
    }

    /// Filters by aggregate ID.
    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    /// Filters by aggregate type.
    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    /// Filters by several event types (any of these).
    pub fn event_types<I, T>(mut self, event_types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.event_types = Some(event_types.into_iter().map(Into::into).collect());
        self
    }

    /// Filters to events starting from this version (inclusive).
    pub fn from_version(mut self, version: Version) -> Self {
        self.from_version = Some(version);
        self
    }

    /// Limits the number of events returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if the event satisfies every criterion except `limit`.
    pub fn matches(&self, event: &EventEnvelope) -> bool {
        if let Some(id) = &self.aggregate_id
            && event.aggregate_id.as_ref() != Some(id)
        {
            return false;
        }
        if let Some(aggregate_type) = &self.aggregate_type
            && &event.aggregate_type != aggregate_type
        {
            return false;
        }
        if let Some(types) = &self.event_types
            && !types.contains(&event.event_type)
        {
            return false;
        }
        if let Some(from) = self.from_version
            && event.version < from
        {
            return false;
        }
        true
    }
}
