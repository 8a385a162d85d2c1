use common::PlayerId;

use crate::aggregate::{Aggregate, AggregateRoot};
use crate::error::DomainError;
use crate::projection::{DecisionProjection, Mutator, ProjectionData};

use super::{PlayerError, PlayerEvent, PlayerEventKind};

const IS_CREATED: &str = "isCreated";
const NAME: &str = "name";
const IS_DELETED: &str = "isDeleted";

/// A player that can join games.
pub struct Player {
    id: PlayerId,
    root: AggregateRoot<PlayerEvent>,
}

impl Aggregate for Player {
    type Id = PlayerId;
    type Event = PlayerEvent;

    fn register(projection: &mut DecisionProjection<PlayerEvent>) {
        for kind in PlayerEventKind::ALL {
            let mutator: Mutator<PlayerEvent> = match kind {
                PlayerEventKind::PlayerCreated => on_created,
                PlayerEventKind::PlayerRenamed => on_renamed,
                PlayerEventKind::PlayerDeleted => on_deleted,
            };
            projection.register(kind, mutator);
        }
    }

    fn from_root(id: PlayerId, root: AggregateRoot<PlayerEvent>) -> Self {
        Self { id, root }
    }

    fn root(&self) -> &AggregateRoot<PlayerEvent> {
        &self.root
    }
}

fn on_created(data: &mut ProjectionData, event: &PlayerEvent) {
    if let PlayerEvent::PlayerCreated(d) = event {
        data.set(IS_CREATED, true);
        data.set(NAME, &d.name);
    }
}

fn on_renamed(data: &mut ProjectionData, event: &PlayerEvent) {
    if let PlayerEvent::PlayerRenamed(d) = event {
        data.set(NAME, &d.name);
    }
}

fn on_deleted(data: &mut ProjectionData, _event: &PlayerEvent) {
    data.set(IS_DELETED, true);
}

impl Player {
    /// Returns the player's id.
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Returns the current name.
    pub fn name(&self) -> Option<String> {
        self.root.state().string(NAME).map(String::from)
    }

    /// Returns true once the player was created.
    pub fn is_created(&self) -> bool {
        self.root.state().flag(IS_CREATED)
    }

    /// Returns true once the player was deleted.
    pub fn is_deleted(&self) -> bool {
        self.root.state().flag(IS_DELETED)
    }

    /// Creates the player.
    pub async fn create(&mut self, name: &str) -> Result<(), DomainError> {
        if self.is_created() {
            return Err(PlayerError::AlreadyCreated.into());
        }
        if name.trim().is_empty() {
            return Err(PlayerError::EmptyName.into());
        }

        self.root.emit(PlayerEvent::player_created(name)).await
    }

    /// Changes the player's name.
    pub async fn rename(&mut self, name: &str) -> Result<(), DomainError> {
        self.ensure_active()?;
        if name.trim().is_empty() {
            return Err(PlayerError::EmptyName.into());
        }

        self.root.emit(PlayerEvent::player_renamed(name)).await
    }

    /// Deletes the player.
    pub async fn delete(&mut self) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.root.emit(PlayerEvent::player_deleted()).await
    }

    fn ensure_active(&self) -> Result<(), PlayerError> {
        if !self.is_created() {
            return Err(PlayerError::NotCreated);
        }
        if self.is_deleted() {
            return Err(PlayerError::Deleted);
        }
        Ok(())
    }
}
