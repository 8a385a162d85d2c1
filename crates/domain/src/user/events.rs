//! User identity domain events.

use chrono::{DateTime, Utc};
use common::PlayerId;
use serde::{Deserialize, Serialize};

use crate::aggregate::{DomainEvent, EventKind};

/// Events that can occur on a user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UserEvent {
    UserRegistered(UserRegisteredData),
    DisplayNameChanged(DisplayNameChangedData),
    PlayerLinked(PlayerLinkedData),
    UserDeactivated(UserDeactivatedData),
}

/// Discriminator of [`UserEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserEventKind {
    UserRegistered,
    DisplayNameChanged,
    PlayerLinked,
    UserDeactivated,
}

impl UserEventKind {
    /// Every user event kind.
    pub const ALL: [UserEventKind; 4] = [
        UserEventKind::UserRegistered,
        UserEventKind::DisplayNameChanged,
        UserEventKind::PlayerLinked,
        UserEventKind::UserDeactivated,
    ];
}

impl EventKind for UserEventKind {
    fn as_str(&self) -> &'static str {
        match self {
            UserEventKind::UserRegistered => "UserRegistered",
            UserEventKind::DisplayNameChanged => "DisplayNameChanged",
            UserEventKind::PlayerLinked => "PlayerLinked",
            UserEventKind::UserDeactivated => "UserDeactivated",
        }
    }
}

impl DomainEvent for UserEvent {
    type Kind = UserEventKind;

    fn kind(&self) -> UserEventKind {
        match self {
            UserEvent::UserRegistered(_) => UserEventKind::UserRegistered,
            UserEvent::DisplayNameChanged(_) => UserEventKind::DisplayNameChanged,
            UserEvent::PlayerLinked(_) => UserEventKind::PlayerLinked,
            UserEvent::UserDeactivated(_) => UserEventKind::UserDeactivated,
        }
    }
}

/// Data for UserRegistered event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegisteredData {
    pub display_name: String,
    pub registered_at: DateTime<Utc>,
}

/// Data for DisplayNameChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayNameChangedData {
    pub display_name: String,
}

/// Data for PlayerLinked event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerLinkedData {
    /// Player profile the user plays as.
    pub player_id: PlayerId,
}

/// Data for UserDeactivated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDeactivatedData {
    pub deactivated_at: DateTime<Utc>,
}

impl UserEvent {
    /// Creates a UserRegistered event.
    pub fn user_registered(display_name: impl Into<String>) -> Self {
        UserEvent::UserRegistered(UserRegisteredData {
            display_name: display_name.into(),
            registered_at: Utc::now(),
        })
    }

    /// Creates a DisplayNameChanged event.
    pub fn display_name_changed(display_name: impl Into<String>) -> Self {
        UserEvent::DisplayNameChanged(DisplayNameChangedData {
            display_name: display_name.into(),
        })
    }

    /// Creates a PlayerLinked event.
    pub fn player_linked(player_id: PlayerId) -> Self {
        UserEvent::PlayerLinked(PlayerLinkedData { player_id })
    }

    /// Creates a UserDeactivated event.
    pub fn user_deactivated() -> Self {
        UserEvent::UserDeactivated(UserDeactivatedData {
            deactivated_at: Utc::now(),
        })
    }
}
