use common::{PlayerId, UserId};

use crate::aggregate::{Aggregate, AggregateRoot};
use crate::error::DomainError;
use crate::projection::{DecisionProjection, Mutator, ProjectionData};

use super::{UserError, UserEvent, UserEventKind};

const IS_REGISTERED: &str = "isRegistered";
const DISPLAY_NAME: &str = "displayName";
const PLAYER_ID: &str = "playerId";
const IS_DEACTIVATED: &str = "isDeactivated";

/// A registered user, identified by email address.
pub struct UserIdentity {
    id: UserId,
    root: AggregateRoot<UserEvent>,
}

impl Aggregate for UserIdentity {
    type Id = UserId;
    type Event = UserEvent;

    fn register(projection: &mut DecisionProjection<UserEvent>) {
        for kind in UserEventKind::ALL {
            let mutator: Mutator<UserEvent> = match kind {
                UserEventKind::UserRegistered => on_registered,
                UserEventKind::DisplayNameChanged => on_display_name_changed,
                UserEventKind::PlayerLinked => on_player_linked,
                UserEventKind::UserDeactivated => on_deactivated,
            };
            projection.register(kind, mutator);
        }
    }

    fn from_root(id: UserId, root: AggregateRoot<UserEvent>) -> Self {
        Self { id, root }
    }

    fn root(&self) -> &AggregateRoot<UserEvent> {
        &self.root
    }
}

fn on_registered(data: &mut ProjectionData, event: &UserEvent) {
    if let UserEvent::UserRegistered(d) = event {
        data.set(IS_REGISTERED, true);
        data.set(DISPLAY_NAME, &d.display_name);
    }
}

fn on_display_name_changed(data: &mut ProjectionData, event: &UserEvent) {
    if let UserEvent::DisplayNameChanged(d) = event {
        data.set(DISPLAY_NAME, &d.display_name);
    }
}

fn on_player_linked(data: &mut ProjectionData, event: &UserEvent) {
    if let UserEvent::PlayerLinked(d) = event {
        data.set(PLAYER_ID, &d.player_id);
    }
}

fn on_deactivated(data: &mut ProjectionData, _event: &UserEvent) {
    data.set(IS_DEACTIVATED, true);
}

impl UserIdentity {
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Email address the identity is keyed by.
    pub fn email(&self) -> &str {
        self.id.as_str()
    }

    pub fn display_name(&self) -> Option<String> {
        self.root.state().string(DISPLAY_NAME).map(String::from)
    }

    /// Returns the linked player profile.
    pub fn player_id(&self) -> Option<PlayerId> {
        self.root.state().read(PLAYER_ID)
    }

    pub fn is_registered(&self) -> bool {
        self.root.state().flag(IS_REGISTERED)
    }

    pub fn is_deactivated(&self) -> bool {
        self.root.state().flag(IS_DEACTIVATED)
    }

    /// Registers the identity.
    pub async fn register(&mut self, display_name: &str) -> Result<(), DomainError> {
        if self.is_registered() {
            return Err(UserError::AlreadyRegistered {
                email: self.email().to_string(),
            }
            .into());
        }
        if display_name.trim().is_empty() {
            return Err(UserError::EmptyDisplayName.into());
        }

        self.root.emit(UserEvent::user_registered(display_name)).await
    }

    pub async fn change_display_name(&mut self, display_name: &str) -> Result<(), DomainError> {
        self.ensure_active()?;
        if display_name.trim().is_empty() {
            return Err(UserError::EmptyDisplayName.into());
        }

        self.root
            .emit(UserEvent::display_name_changed(display_name))
            .await
    }

    /// Links the player profile this user plays as. A user links at most
    /// one player.
    pub async fn link_player(&mut self, player_id: PlayerId) -> Result<(), DomainError> {
        self.ensure_active()?;
        if let Some(linked) = self.player_id() {
            return Err(UserError::PlayerAlreadyLinked {
                player_id: linked.to_string(),
            }
            .into());
        }

        self.root.emit(UserEvent::player_linked(player_id)).await
    }

    pub async fn deactivate(&mut self) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.root.emit(UserEvent::user_deactivated()).await
    }

    fn ensure_active(&self) -> Result<(), UserError> {
        if !self.is_registered() {
            return Err(UserError::NotRegistered);
        }
        if self.is_deactivated() {
            return Err(UserError::Deactivated);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_store::{EventPublisher, InMemoryEventStore, Version};
    use std::sync::Arc;

    async fn registered_user() -> (InMemoryEventStore, UserIdentity) {
        let store = InMemoryEventStore::new();
        let publisher = Arc::new(EventPublisher::with_store(store.clone()));
        let mut user = UserIdentity::rehydrate(
            UserId::new("cedric@example.com").unwrap(),
            &[],
            Version::initial(),
            publisher,
        );
        user.register("Cedric").await.unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_register_and_rename() {
        let (_, mut user) = registered_user().await;
        user.change_display_name("Ced").await.unwrap();

        assert_eq!(user.email(), "cedric@example.com");
        assert_eq!(user.display_name().as_deref(), Some("Ced"));
    }

    #[tokio::test]
    async fn test_register_twice_fails() {
        let (_, mut user) = registered_user().await;
        assert!(matches!(
            user.register("Again").await,
            Err(DomainError::User(UserError::AlreadyRegistered { .. }))
        ));
    }

    #[tokio::test]
    async fn test_link_player_once() {
        let (store, mut user) = registered_user().await;
        let player = PlayerId::new("p1").unwrap();

        user.link_player(player.clone()).await.unwrap();
        assert_eq!(user.player_id(), Some(player));

        let result = user.link_player(PlayerId::new("p2").unwrap()).await;
        assert!(matches!(
            result,
            Err(DomainError::User(UserError::PlayerAlreadyLinked { .. }))
        ));
        assert_eq!(store.event_count().await, 2);
    }

    #[tokio::test]
    async fn test_deactivated_user_rejects_commands() {
        let (_, mut user) = registered_user().await;
        user.deactivate().await.unwrap();

        assert!(matches!(
            user.change_display_name("x").await,
            Err(DomainError::User(UserError::Deactivated))
        ));
        assert!(matches!(
            user.deactivate().await,
            Err(DomainError::User(UserError::Deactivated))
        ));
    }
}
