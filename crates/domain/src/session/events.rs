//! Session domain events.

use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

use crate::aggregate::{DomainEvent, EventKind};

/// Events that can occur on a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    SessionOpened(SessionOpenedData),
    SessionRefreshed(SessionRefreshedData),
    SessionClosed(SessionClosedData),
}

/// Discriminator of [`SessionEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEventKind {
    SessionOpened,
    SessionRefreshed,
    SessionClosed,
}

impl SessionEventKind {
    /// Every session event kind.
    pub const ALL: [SessionEventKind; 3] = [
        SessionEventKind::SessionOpened,
        SessionEventKind::SessionRefreshed,
        SessionEventKind::SessionClosed,
    ];
}

impl EventKind for SessionEventKind {
    fn as_str(&self) -> &'static str {
        match self {
            SessionEventKind::SessionOpened => "SessionOpened",
            SessionEventKind::SessionRefreshed => "SessionRefreshed",
            SessionEventKind::SessionClosed => "SessionClosed",
        }
    }
}

impl DomainEvent for SessionEvent {
    type Kind = SessionEventKind;

    fn kind(&self) -> SessionEventKind {
        match self {
            SessionEvent::SessionOpened(_) => SessionEventKind::SessionOpened,
            SessionEvent::SessionRefreshed(_) => SessionEventKind::SessionRefreshed,
            SessionEvent::SessionClosed(_) => SessionEventKind::SessionClosed,
        }
    }
}

/// Data for SessionOpened event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOpenedData {
    /// Owner of the session.
    pub user_id: UserId,
    pub opened_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Data for SessionRefreshed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRefreshedData {
    pub expires_at: DateTime<Utc>,
}

/// Data for SessionClosed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClosedData {
    pub closed_at: DateTime<Utc>,
}
