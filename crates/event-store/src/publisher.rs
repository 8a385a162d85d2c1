//! Synchronous, typed pub/sub for stored events.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{EventEnvelope, EventStoreError, store::EventStore};

/// Error raised by a single listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The event store refused the event.
    #[error(transparent)]
    EventStore(#[from] EventStoreError),

    /// Any other listener failure.
    #[error("{0}")]
    Failed(String),
}

/// One listener that failed while an event was being published.
#[derive(Debug)]
pub struct ListenerFailure {
    /// Name of the failing listener.
    pub listener: &'static str,

    /// What went wrong.
    pub error: ListenerError,
}

/// Publishing finished, but at least one listener failed.
#[derive(Debug, Error)]
#[error("{} listener(s) failed while publishing {event_type}: {}", .failures.len(), describe(.failures))]
pub struct PublishError {
    /// Discriminator of the published event.
    pub event_type: String,

    /// Every failure, in invocation order.
    pub failures: Vec<ListenerFailure>,
}

impl PublishError {
    /// Returns true if the event store refused the event, so it was never
    /// committed.
    pub fn is_rejected(&self) -> bool {
        self.store_error().is_some()
    }

    /// Returns the store error if the event store listener rejected the event.
    pub fn store_error(&self) -> Option<&EventStoreError> {
        self.failures.iter().find_map(|f| match &f.error {
            ListenerError::EventStore(e) => Some(e),
            ListenerError::Failed(_) => None,
        })
    }
}

fn describe(failures: &[ListenerFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.listener, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Receives published events.
#[async_trait]
pub trait EventListener: Send + Sync {
    /// Name used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Handles one published event.
    async fn on_event(&self, event: &EventEnvelope) -> Result<(), ListenerError>;
}

/// Listener that appends every event it receives to an event store.
pub struct StoreListener<S: EventStore> {
    store: S,
}

impl<S: EventStore> StoreListener<S> {
    /// Creates a listener writing to `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: EventStore> EventListener for StoreListener<S> {
    fn name(&self) -> &'static str {
        "event-store"
    }

    async fn on_event(&self, event: &EventEnvelope) -> Result<(), ListenerError> {
        self.store.append(event.clone()).await?;
        Ok(())
    }
}

/// Dispatches events to registered listeners.
///
/// Delivery happens entirely inside [`publish`](Self::publish): listeners
/// registered with [`on_any`](Self::on_any) run first, then those registered
/// for the event's discriminator, each group in registration order.
/// Registration needs `&mut self`; wire everything up front, then share the
/// publisher behind an `Arc`.
#[derive(Default)]
pub struct EventPublisher {
    any: Vec<Arc<dyn EventListener>>,
    by_type: HashMap<String, Vec<Arc<dyn EventListener>>>,
}

impl EventPublisher {
    /// Creates a publisher with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a publisher whose first universal listener appends to `store`.
    pub fn with_store<S: EventStore + 'static>(store: S) -> Self {
        let mut publisher = Self::new();
        publisher.on_any(Arc::new(StoreListener::new(store)));
        publisher
    }

    /// Registers a listener for one event discriminator.
    pub fn on(&mut self, event_type: impl Into<String>, listener: Arc<dyn EventListener>) -> &mut Self {
        self.by_type.entry(event_type.into()).or_default().push(listener);
        self
    }

    /// Registers a listener for every event.
    pub fn on_any(&mut self, listener: Arc<dyn EventListener>) -> &mut Self {
        self.any.push(listener);
        self
    }

    /// Returns how many listeners would receive an event of this type.
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.any.len() + self.by_type.get(event_type).map_or(0, Vec::len)
    }

    /// Delivers `event` to every interested listener.
    ///
    /// A listener that fails with [`ListenerError::EventStore`] means the
    /// event was not stored: delivery stops there and no later listener sees
    /// it. Any other failure does not stop delivery to the others; all
    /// failures are reported together once every listener has run.
    #[tracing::instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub async fn publish(&self, event: &EventEnvelope) -> Result<(), PublishError> {
        let typed = self.by_type.get(&event.event_type).into_iter().flatten();
        let mut failures = Vec::new();

        for listener in self.any.iter().chain(typed) {
            let Err(error) = listener.on_event(event).await else {
                continue;
            };
            tracing::warn!(listener = listener.name(), %error, "listener failed");
            metrics::counter!("listener_failures_total").increment(1);

            let rejected = matches!(error, ListenerError::EventStore(_));
            failures.push(ListenerFailure {
                listener: listener.name(),
                error,
            });
            if rejected {
                metrics::counter!("events_rejected_total").increment(1);
                break;
            }
        }

        if failures.iter().all(|f| !matches!(f.error, ListenerError::EventStore(_))) {
            metrics::counter!("events_published_total").increment(1);
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PublishError {
                event_type: event.event_type.clone(),
                failures,
            })
        }
    }
}
