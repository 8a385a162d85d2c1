use chrono::{DateTime, Utc};
use common::{SessionId, UserId};

use crate::aggregate::{Aggregate, AggregateRoot};
use crate::error::DomainError;
use crate::projection::{DecisionProjection, Mutator, ProjectionData};

use super::{
    SESSION_TTL, SessionClosedData, SessionError, SessionEvent, SessionEventKind,
    SessionOpenedData, SessionRefreshedData,
};

const IS_OPENED: &str = "isOpened";
const USER_ID: &str = "userId";
const OPENED_AT: &str = "openedAt";
const EXPIRES_AT: &str = "expiresAt";
const IS_CLOSED: &str = "isClosed";

/// A login session of one user.
///
/// A session is active from the moment it is opened until it is closed or
/// its expiry passes. Refreshing pushes the expiry forward by [`SESSION_TTL`].
pub struct Session {
    id: SessionId,
    root: AggregateRoot<SessionEvent>,
}

impl Aggregate for Session {
    type Id = SessionId;
    type Event = SessionEvent;

    fn register(projection: &mut DecisionProjection<SessionEvent>) {
        for kind in SessionEventKind::ALL {
            let mutator: Mutator<SessionEvent> = match kind {
                SessionEventKind::SessionOpened => on_opened,
                SessionEventKind::SessionRefreshed => on_refreshed,
                SessionEventKind::SessionClosed => on_closed,
            };
            projection.register(kind, mutator);
        }
    }

    fn from_root(id: SessionId, root: AggregateRoot<SessionEvent>) -> Self {
        Self { id, root }
    }

    fn root(&self) -> &AggregateRoot<SessionEvent> {
        &self.root
    }
}

fn on_opened(data: &mut ProjectionData, event: &SessionEvent) {
    if let SessionEvent::SessionOpened(d) = event {
        data.set(IS_OPENED, true);
        data.set(USER_ID, &d.user_id);
        data.set(OPENED_AT, d.opened_at);
        data.set(EXPIRES_AT, d.expires_at);
    }
}

fn on_refreshed(data: &mut ProjectionData, event: &SessionEvent) {
    if let SessionEvent::SessionRefreshed(d) = event {
        data.set(EXPIRES_AT, d.expires_at);
    }
}

fn on_closed(data: &mut ProjectionData, _event: &SessionEvent) {
    data.set(IS_CLOSED, true);
}

impl Session {
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the owner of the session.
    pub fn user_id(&self) -> Option<UserId> {
        self.root.state().read(USER_ID)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.root.state().read(EXPIRES_AT)
    }

    pub fn is_opened(&self) -> bool {
        self.root.state().flag(IS_OPENED)
    }

    pub fn is_closed(&self) -> bool {
        self.root.state().flag(IS_CLOSED)
    }

    /// Returns true if the session is open, not closed and not expired at
    /// `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_opened()
            && !self.is_closed()
            && self.expires_at().is_some_and(|expires_at| now < expires_at)
    }

    /// Opens the session for `user_id`.
    pub async fn open(&mut self, user_id: UserId) -> Result<(), DomainError> {
        self.open_at(user_id, Utc::now()).await
    }

    pub async fn open_at(&mut self, user_id: UserId, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_opened() {
            return Err(SessionError::AlreadyOpened.into());
        }

        let event = SessionEvent::SessionOpened(SessionOpenedData {
            user_id,
            opened_at: now,
            expires_at: now + SESSION_TTL,
        });
        self.root.emit(event).await
    }

    /// Extends the session's expiry to `now + SESSION_TTL`.
    pub async fn refresh_at(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_open()?;
        if let Some(expires_at) = self.expires_at()
            && now >= expires_at
        {
            return Err(SessionError::Expired { expires_at }.into());
        }

        let event = SessionEvent::SessionRefreshed(SessionRefreshedData {
            expires_at: now + SESSION_TTL,
        });
        self.root.emit(event).await
    }

    /// Closes the session.
    pub async fn close(&mut self) -> Result<(), DomainError> {
        self.ensure_open()?;

        let event = SessionEvent::SessionClosed(SessionClosedData {
            closed_at: Utc::now(),
        });
        self.root.emit(event).await
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if !self.is_opened() {
            return Err(SessionError::NotOpened);
        }
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        Ok(())
    }
}
