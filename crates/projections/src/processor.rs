//! Projection processor for feeding events to projections.

use std::sync::Arc;

use event_store::{EventEnvelope, EventPublisher, EventQuery, EventStore};

use crate::Result;
use crate::projection::{Projection, ProjectionListener};

/// Connects projections to the live event flow and rebuilds them from the
/// store.
///
/// The processor supports:
/// - Subscription: registers each projection on the publisher for its event types
/// - Single event delivery: delivers an event to every interested projection
/// - Rebuild: resets all projections and replays matching events from the store
pub struct ProjectionProcessor<S: EventStore> {
    store: S,
    projections: Vec<Arc<dyn Projection>>,
}

impl<S: EventStore> ProjectionProcessor<S> {
    /// Creates a new processor with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            projections: Vec::new(),
        }
    }

    /// Registers a projection with this processor.
    pub fn register(&mut self, projection: Arc<dyn Projection>) {
        self.projections.push(projection);
    }

    /// Returns the number of registered projections.
    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Registers every projection on `publisher` for the event types it
    /// handles.
    pub fn subscribe(&self, publisher: &mut EventPublisher) {
        for projection in &self.projections {
            let listener = Arc::new(ProjectionListener::new(Arc::clone(projection)));
            for event_type in projection.event_types() {
                publisher.on(*event_type, listener.clone());
            }
        }
    }

    /// Delivers a single event to the projections that handle its type.
    #[tracing::instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub async fn process_event(&self, event: &EventEnvelope) -> Result<()> {
        for projection in &self.projections {
            if projection.event_types().contains(&event.event_type.as_str()) {
                projection.handle(event).await?;
                metrics::counter!("projections_events_processed").increment(1);
            }
        }
        Ok(())
    }

    /// Resets all projections and replays their events from the store.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<()> {
        let mut events_processed = 0usize;

        for projection in &self.projections {
            projection.reset().await?;

            let query = EventQuery::new().event_types(projection.event_types().iter().copied());
            let events = self.store.query_events(query).await?;
            for event in &events {
                projection.handle(event).await?;
                metrics::counter!("projections_events_processed").increment(1);
            }
            events_processed += events.len();
        }

        tracing::info!(events_processed, "rebuild complete");

        Ok(())
    }
}
