//! Core projection trait and its publisher adapter.

use std::sync::Arc;

use async_trait::async_trait;
use event_store::{EventEnvelope, EventListener, ListenerError};

use crate::Result;

/// A projection that processes events and updates a read model.
///
/// Projections are the mechanism by which events are transformed into
/// denormalized read models optimized for queries. Handling the same event
/// twice must leave the read model unchanged.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Event discriminators this projection reacts to.
    fn event_types(&self) -> &'static [&'static str];

    /// Handles a single event, updating the projection's read model.
    async fn handle(&self, event: &EventEnvelope) -> Result<()>;

    /// Resets the projection to its initial state.
    async fn reset(&self) -> Result<()>;
}

/// Feeds events from an [`EventPublisher`](event_store::EventPublisher) into
/// a projection.
pub struct ProjectionListener {
    projection: Arc<dyn Projection>,
}

impl ProjectionListener {
    pub fn new(projection: Arc<dyn Projection>) -> Self {
        Self { projection }
    }
}

#[async_trait]
impl EventListener for ProjectionListener {
    fn name(&self) -> &'static str {
        self.projection.name()
    }

    async fn on_event(&self, event: &EventEnvelope) -> std::result::Result<(), ListenerError> {
        self.projection
            .handle(event)
            .await
            .map_err(|e| ListenerError::Failed(e.to_string()))?;
        metrics::counter!("projections_events_processed").increment(1);
        Ok(())
    }
}
