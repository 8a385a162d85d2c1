//! Player domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{DomainEvent, EventKind};

/// Events that can occur on a player aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PlayerEvent {
    /// Player was created.
    PlayerCreated(PlayerCreatedData),

    /// Player changed name.
    PlayerRenamed(PlayerRenamedData),

    /// Player was deleted.
    PlayerDeleted(PlayerDeletedData),
}

/// Discriminator of [`PlayerEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerEventKind {
    PlayerCreated,
    PlayerRenamed,
    PlayerDeleted,
}

impl PlayerEventKind {
    /// Every player event kind.
    pub const ALL: [PlayerEventKind; 3] = [
        PlayerEventKind::PlayerCreated,
        PlayerEventKind::PlayerRenamed,
        PlayerEventKind::PlayerDeleted,
    ];
}

impl EventKind for PlayerEventKind {
    fn as_str(&self) -> &'static str {
        match self {
            PlayerEventKind::PlayerCreated => "PlayerCreated",
            PlayerEventKind::PlayerRenamed => "PlayerRenamed",
            PlayerEventKind::PlayerDeleted => "PlayerDeleted",
        }
    }
}

impl DomainEvent for PlayerEvent {
    type Kind = PlayerEventKind;

    fn kind(&self) -> PlayerEventKind {
        match self {
            PlayerEvent::PlayerCreated(_) => PlayerEventKind::PlayerCreated,
            PlayerEvent::PlayerRenamed(_) => PlayerEventKind::PlayerRenamed,
            PlayerEvent::PlayerDeleted(_) => PlayerEventKind::PlayerDeleted,
        }
    }
}

/// Data for PlayerCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCreatedData {
    /// Display name of the player.
    pub name: String,

    /// When the player was created.
    pub created_at: DateTime<Utc>,
}

/// Data for PlayerRenamed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRenamedData {
    /// New display name.
    pub name: String,
}

/// Data for PlayerDeleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDeletedData {
    /// When the player was deleted.
    pub deleted_at: DateTime<Utc>,
}

impl PlayerEvent {
    /// Creates a PlayerCreated event.
    pub fn player_created(name: impl Into<String>) -> Self {
        PlayerEvent::PlayerCreated(PlayerCreatedData {
            name: name.into(),
            created_at: Utc::now(),
        })
    }

    /// Creates a PlayerRenamed event.
    pub fn player_renamed(name: impl Into<String>) -> Self {
        PlayerEvent::PlayerRenamed(PlayerRenamedData { name: name.into() })
    }

    /// Creates a PlayerDeleted event.
    pub fn player_deleted() -> Self {
        PlayerEvent::PlayerDeleted(PlayerDeletedData {
            deleted_at: Utc::now(),
        })
    }
}
