//! Session aggregate.

mod aggregate;
mod events;

pub use aggregate::Session;
pub use events::{
    SessionClosedData, SessionEvent, SessionEventKind, SessionOpenedData, SessionRefreshedData,
};

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

/// How long a session stays valid after being opened or refreshed.
pub const SESSION_TTL: TimeDelta = TimeDelta::hours(24);

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not opened")]
    NotOpened,

    #[error("Session already opened")]
    AlreadyOpened,

    #[error("Session is closed")]
    Closed,

    #[error("Session expired at {expires_at}")]
    Expired { expires_at: DateTime<Utc> },
}
