//! Loading aggregates from the event store.

use std::marker::PhantomData;
use std::sync::Arc;

use common::Identifier;
use event_store::{EventPublisher, EventStore, EventStoreExt, Version};

use crate::aggregate::Aggregate;
use crate::error::DomainError;

/// Rebuilds aggregates of one type from their stored history.
///
/// Every call replays from scratch; aggregate instances are never cached.
pub struct Repository<A, S>
where
    A: Aggregate,
    S: EventStore,
{
    store: S,
    publisher: Arc<EventPublisher>,
    _phantom: PhantomData<A>,
}

impl<A, S> Repository<A, S>
where
    A: Aggregate,
    S: EventStore,
{
    /// Creates a repository reading from `store`. Aggregates it returns emit
    /// through `publisher`.
    pub fn new(store: S, publisher: Arc<EventPublisher>) -> Self {
        Self {
            store,
            publisher,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads an existing aggregate.
    ///
    /// Fails with [`DomainError::UnknownAggregate`] when the aggregate has no
    /// events.
    #[tracing::instrument(skip(self, id), fields(id = %id))]
    pub async fn load(&self, id: &A::Id) -> Result<A, DomainError> {
        let aggregate_id = id.aggregate_id();
        let envelopes = self.store.get_events_of_aggregate(&aggregate_id).await?;

        let Some(last) = envelopes.last() else {
            return Err(DomainError::UnknownAggregate {
                aggregate_type: A::aggregate_type(),
                aggregate_id: aggregate_id.to_string(),
            });
        };
        let version = last.version;

        let history = envelopes
            .into_iter()
            .map(|envelope| serde_json::from_value::<A::Event>(envelope.payload))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(events = history.len(), %version, "aggregate rehydrated");
        metrics::histogram!("aggregate_replay_events").record(history.len() as f64);

        Ok(A::rehydrate(
            id.clone(),
            &history,
            version,
            Arc::clone(&self.publisher),
        ))
    }

    /// Returns an empty aggregate for a creation command.
    ///
    /// Fails with [`DomainError::AlreadyExists`] when the id already has a
    /// history.
    pub async fn new_aggregate(&self, id: &A::Id) -> Result<A, DomainError> {
        let aggregate_id = id.aggregate_id();
        if self.store.aggregate_exists(&aggregate_id).await? {
            return Err(DomainError::AlreadyExists {
                aggregate_type: A::aggregate_type(),
                aggregate_id: aggregate_id.to_string(),
            });
        }

        Ok(A::rehydrate(
            id.clone(),
            &[],
            Version::initial(),
            Arc::clone(&self.publisher),
        ))
    }
}
