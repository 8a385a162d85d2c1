use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventQuery, EventStoreError, Result, Version,
    store::{EventStore, EventStream},
};

#[derive(Default)]
struct Log {
    events: Vec<EventEnvelope>,
    versions: HashMap<AggregateId, Version>,
}

/// In-memory event store.
///
/// Events live for the lifetime of the process. Clones share the same log,
/// and the write lock serializes appends.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    log: Arc<RwLock<Log>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.log.read().await.events.len()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: EventEnvelope) -> Result<Version> {
        let Some(aggregate_id) = event.aggregate_id.clone() else {
            return Err(EventStoreError::MissingAggregateId {
                event_type: event.event_type,
            });
        };

        let mut log = self.log.write().await;

        let current = log
            .versions
            .get(&aggregate_id)
            .copied()
            .unwrap_or(Version::initial());
        let expected = current.next();
        if event.version != expected {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: event.version,
            });
        }

        tracing::debug!(
            aggregate_id = %aggregate_id,
            event_type = %event.event_type,
            version = %event.version,
            "appending event"
        );
        metrics::counter!("events_appended_total").increment(1);

        log.versions.insert(aggregate_id, event.version);
        log.events.push(event);

        Ok(expected)
    }

    async fn get_events_of_aggregate(
        &self,
        aggregate_id: &AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let log = self.log.read().await;
        Ok(log
            .events
            .iter()
            .filter(|e| e.belongs_to(aggregate_id))
            .cloned()
            .collect())
    }

    async fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventEnvelope>> {
        let log = self.log.read().await;
        Ok(log
            .events
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect())
    }

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>> {
        let log = self.log.read().await;
        let matching = log.events.iter().filter(|e| query.matches(e)).cloned();

        let events = match query.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        };
        Ok(events)
    }

    async fn stream_all_events(&self) -> Result<EventStream> {
        use futures_util::stream;

        let events = self.log.read().await.events.clone();
        let stream = stream::iter(events.into_iter().map(Ok));
        Ok(Box::pin(stream))
    }

    async fn get_aggregate_version(&self, aggregate_id: &AggregateId) -> Result<Option<Version>> {
        Ok(self.log.read().await.versions.get(aggregate_id).copied())
    }
}
