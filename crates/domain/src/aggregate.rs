//! Core aggregate and domain event traits.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use common::{AggregateId, Identifier};
use event_store::{EventEnvelope, EventPublisher, Version};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::DomainError;
use crate::projection::{DecisionProjection, ProjectionData};

/// Fieldless discriminator of a domain event.
///
/// Used as the key of a decision projection's handler table.
pub trait EventKind: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Returns the discriminator string stored in the event envelope.
    fn as_str(&self) -> &'static str;
}

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// The discriminator type of this event family.
    type Kind: EventKind;

    /// Returns the discriminator of this event.
    fn kind(&self) -> Self::Kind;

    /// Returns the event type name.
    ///
    /// This is used for serialization and event store filtering.
    fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }
}

/// State shared by every aggregate: identity, version, decision projection
/// and the publisher new events go through.
pub struct AggregateRoot<E: DomainEvent> {
    id: AggregateId,
    aggregate_type: &'static str,
    version: Version,
    projection: DecisionProjection<E>,
    publisher: Arc<EventPublisher>,
}

impl<E: DomainEvent> AggregateRoot<E> {
    /// Creates a root with an empty history.
    pub fn new(
        id: AggregateId,
        aggregate_type: &'static str,
        projection: DecisionProjection<E>,
        publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            id,
            aggregate_type,
            version: Version::initial(),
            projection,
            publisher,
        }
    }

    /// Replays `history` into the projection and sets the version.
    pub fn replay(&mut self, history: &[E], version: Version) {
        self.projection.apply_all(history);
        self.version = version;
    }

    /// Returns the canonical identity.
    pub fn id(&self) -> &AggregateId {
        &self.id
    }

    /// Returns the version of the last applied event.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Borrows the projection data.
    pub fn state(&self) -> &ProjectionData {
        self.projection.state()
    }

    /// Returns a detached copy of the projection data.
    pub fn snapshot(&self) -> ProjectionData {
        self.projection.data()
    }

    /// Publishes one new event and, once it is committed, applies it to the
    /// projection.
    ///
    /// If the event store rejects the event, neither the projection nor the
    /// version change and the error is returned. Failures of listeners that
    /// run after the store are logged; the event is committed, so the command
    /// still succeeds.
    pub async fn emit(&mut self, event: E) -> Result<(), DomainError> {
        let version = self.version.next();
        let envelope = EventEnvelope::builder()
            .aggregate_id(self.id.clone())
            .aggregate_type(self.aggregate_type)
            .event_type(event.event_type())
            .version(version)
            .payload(&event)?
            .build()?;

        match self.publisher.publish(&envelope).await {
            Ok(()) => {}
            Err(error) if error.is_rejected() => return Err(error.into()),
            Err(error) => {
                tracing::warn!(
                    aggregate_id = %self.id,
                    %error,
                    "event committed but some listeners failed"
                );
            }
        }

        tracing::debug!(
            aggregate_id = %self.id,
            event_type = event.event_type(),
            version = %version,
            "event emitted"
        );

        self.projection.apply(&event);
        self.version = version;
        Ok(())
    }
}

/// Trait for aggregates in an event-sourced system.
///
/// An aggregate derives all of its state from its own history through a
/// [`DecisionProjection`]. Command methods read that state, validate, and
/// emit at most one event through [`AggregateRoot::emit`].
pub trait Aggregate: Sized + Send + Sync {
    /// Typed identifier of this aggregate.
    type Id: Identifier;

    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str {
        <Self::Id as Identifier>::KIND
    }

    /// Registers one mutator per event kind.
    fn register(projection: &mut DecisionProjection<Self::Event>);

    /// Wraps a prepared root.
    fn from_root(id: Self::Id, root: AggregateRoot<Self::Event>) -> Self;

    /// Borrows the root.
    fn root(&self) -> &AggregateRoot<Self::Event>;

    /// Rebuilds the aggregate by replaying `history` in order.
    ///
    /// An empty history yields a fresh aggregate at version 0.
    fn rehydrate(
        id: Self::Id,
        history: &[Self::Event],
        version: Version,
        publisher: Arc<EventPublisher>,
    ) -> Self {
        let mut projection = DecisionProjection::new();
        Self::register(&mut projection);

        let mut root = AggregateRoot::new(
            id.aggregate_id(),
            Self::aggregate_type(),
            projection,
            publisher,
        );
        root.replay(history, version);
        Self::from_root(id, root)
    }

    /// Returns the current version.
    fn version(&self) -> Version {
        self.root().version()
    }

    /// Returns a detached copy of the derived state.
    fn snapshot(&self) -> ProjectionData {
        self.root().snapshot()
    }
}
