//! Player list read model.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::PlayerEvent;
use event_store::{EventEnvelope, Version};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::projection::Projection;
use crate::{ProjectionError, Result};

/// Summary of a player in the player list.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub player_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    version: Version,
}

#[derive(Default)]
struct PlayerTable {
    live: HashMap<String, PlayerSummary>,
    deleted: HashMap<String, Version>,
}

/// Read model listing every player that has not been deleted, keyed by
/// player id. Deleted players are remembered so that replayed creations are
/// dropped.
#[derive(Clone, Default)]
pub struct PlayerListView {
    players: Arc<RwLock<PlayerTable>>,
}

impl PlayerListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_player(&self, player_id: &str) -> Option<PlayerSummary> {
        self.players.read().await.live.get(player_id).cloned()
    }

    /// Gets all players sorted by name.
    pub async fn get_all_players(&self) -> Vec<PlayerSummary> {
        let mut players: Vec<_> = self.players.read().await.live.values().cloned().collect();
        players.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.player_id.cmp(&b.player_id)));
        players
    }
}

#[async_trait]
impl Projection for PlayerListView {
    fn name(&self) -> &'static str {
        "PlayerListView"
    }

    fn event_types(&self) -> &'static [&'static str] {
        &["PlayerCreated", "PlayerRenamed", "PlayerDeleted"]
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        let Some(aggregate_id) = &event.aggregate_id else {
            return Err(ProjectionError::MissingAggregateId {
                event_type: event.event_type.clone(),
            });
        };
        let player_event: PlayerEvent = serde_json::from_value(event.payload.clone())?;
        let player_id = aggregate_id.value().to_string();

        let mut players = self.players.write().await;

        match player_event {
            PlayerEvent::PlayerCreated(_) if players.deleted.contains_key(&player_id) => {
                tracing::debug!(%player_id, "creation of a deleted player ignored");
            }
            PlayerEvent::PlayerCreated(data) => {
                players
                    .live
                    .entry(player_id)
                    .or_insert_with_key(|player_id| PlayerSummary {
                        player_id: player_id.clone(),
                        name: data.name,
                        created_at: data.created_at,
                        updated_at: data.created_at,
                        version: event.version,
                    });
            }
            PlayerEvent::PlayerRenamed(data) => {
                if let Some(player) = players.live.get_mut(&player_id)
                    && event.version > player.version
                {
                    player.name = data.name;
                    player.version = event.version;
                    player.updated_at = event.timestamp;
                }
            }
            PlayerEvent::PlayerDeleted(_) => {
                if players
                    .live
                    .get(&player_id)
                    .is_some_and(|player| event.version <= player.version)
                {
                    return Ok(());
                }
                players.live.remove(&player_id);
                let tombstone = players.deleted.entry(player_id).or_insert(event.version);
                *tombstone = (*tombstone).max(event.version);
            }
        }

        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        *self.players.write().await = PlayerTable::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AggregateId;
    use domain::DomainEvent;

    fn make_envelope(player_id: &str, version: i64, event: &PlayerEvent) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(AggregateId::new("Player", player_id))
            .aggregate_type("Player")
            .event_type(event.event_type())
            .version(Version::new(version))
            .payload(event)
            .unwrap()
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_rename_delete() {
        let view = PlayerListView::new();

        view.handle(&make_envelope("p1", 1, &PlayerEvent::player_created("Cedric")))
            .await
            .unwrap();
        view.handle(&make_envelope("p2", 1, &PlayerEvent::player_created("Alice")))
            .await
            .unwrap();
        view.handle(&make_envelope("p1", 2, &PlayerEvent::player_renamed("Ced")))
            .await
            .unwrap();

        let names: Vec<_> = view
            .get_all_players()
            .await
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Alice", "Ced"]);

        view.handle(&make_envelope("p2", 2, &PlayerEvent::player_deleted()))
            .await
            .unwrap();
        assert!(view.get_player("p2").await.is_none());
        assert_eq!(view.get_all_players().await.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_rename_is_ignored() {
        let view = PlayerListView::new();
        view.handle(&make_envelope("p1", 1, &PlayerEvent::player_created("Cedric")))
            .await
            .unwrap();
        view.handle(&make_envelope("p1", 3, &PlayerEvent::player_renamed("New")))
            .await
            .unwrap();
        view.handle(&make_envelope("p1", 2, &PlayerEvent::player_renamed("Old")))
            .await
            .unwrap();

        assert_eq!(view.get_player("p1").await.unwrap().name, "New");
    }

    #[tokio::test]
    async fn test_deleted_player_stays_deleted() {
        let view = PlayerListView::new();
        view.handle(&make_envelope("p1", 1, &PlayerEvent::player_created("Cedric")))
            .await
            .unwrap();
        view.handle(&make_envelope("p1", 2, &PlayerEvent::player_renamed("Ced")))
            .await
            .unwrap();

        // Not newer than the rename, so it comes from a stale writer
        view.handle(&make_envelope("p1", 2, &PlayerEvent::player_deleted()))
            .await
            .unwrap();
        assert_eq!(view.get_player("p1").await.unwrap().name, "Ced");

        view.handle(&make_envelope("p1", 3, &PlayerEvent::player_deleted()))
            .await
            .unwrap();
        view.handle(&make_envelope("p1", 1, &PlayerEvent::player_created("Cedric")))
            .await
            .unwrap();

        assert!(view.get_player("p1").await.is_none());
        assert!(view.get_all_players().await.is_empty());
    }
}
