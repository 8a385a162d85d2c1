//! Game list read model: one summary per live game.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{GameEvent, Team};
use event_store::{EventEnvelope, Version};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::projection::Projection;
use crate::{ProjectionError, Result};

/// Where a game is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Created,
    Started,
    Ended,
}

/// Summary of a game in the game list.
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub game_id: String,
    pub name: String,
    pub status: GameStatus,
    pub player_count: usize,
    pub points_blue: u32,
    pub points_red: u32,
    pub winner: Option<Team>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    players: Vec<String>,
    #[serde(skip)]
    version: Version,
}

#[derive(Default)]
struct GameTable {
    live: HashMap<String, GameSummary>,
    /// Version of the `GameDeleted` event for every deleted game.
    deleted: HashMap<String, Version>,
}

/// Read model listing every game that has not been deleted.
///
/// Each summary remembers the last version it applied, so an event delivered
/// twice is ignored the second time. Deleted games leave a tombstone so a late
/// `GameCreated` cannot bring them back.
#[derive(Clone, Default)]
pub struct GameListView {
    games: Arc<RwLock<GameTable>>,
}

impl GameListView {
    /// Creates a new empty game list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the summary of one game.
    pub async fn get_game(&self, game_id: &str) -> Option<GameSummary> {
        self.games.read().await.live.get(game_id).cloned()
    }

    /// Gets all games, oldest first.
    pub async fn get_all_games(&self) -> Vec<GameSummary> {
        let mut games: Vec<_> = self.games.read().await.live.values().cloned().collect();
        games.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.game_id.cmp(&b.game_id))
        });
        games
    }

    /// Gets games in the given lifecycle state.
    pub async fn get_games_by_status(&self, status: GameStatus) -> Vec<GameSummary> {
        self.get_all_games()
            .await
            .into_iter()
            .filter(|g| g.status == status)
            .collect()
    }
}

const GAME_EVENT_TYPES: &[&str] = &[
    "GameCreated",
    "PlayerAddedToTeam",
    "GameStarted",
    "GoalScored",
    "GameEnded",
    "GameDeleted",
];

#[async_trait]
impl Projection for GameListView {
    fn name(&self) -> &'static str {
        "GameListView"
    }

    fn event_types(&self) -> &'static [&'static str] {
        GAME_EVENT_TYPES
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        let Some(aggregate_id) = &event.aggregate_id else {
            return Err(ProjectionError::MissingAggregateId {
                event_type: event.event_type.clone(),
            });
        };
        let game_event: GameEvent = serde_json::from_value(event.payload.clone())?;
        let game_id = aggregate_id.value().to_string();

        let mut games = self.games.write().await;

        if let GameEvent::GameCreated(data) = &game_event {
            if games.deleted.contains_key(&game_id) {
                tracing::debug!(%game_id, "creation of a deleted game ignored");
                return Ok(());
            }
            games.live.entry(game_id).or_insert_with_key(|game_id| GameSummary {
                game_id: game_id.clone(),
                name: data.name.clone(),
                status: GameStatus::Created,
                player_count: 0,
                points_blue: 0,
                points_red: 0,
                winner: None,
                created_at: data.created_at,
                updated_at: data.created_at,
                players: Vec::new(),
                version: event.version,
            });
            return Ok(());
        }

        if let GameEvent::GameDeleted(_) = game_event {
            if games
                .live
                .get(&game_id)
                .is_some_and(|game| event.version <= game.version)
            {
                return Ok(());
            }
            games.live.remove(&game_id);
            let tombstone = games.deleted.entry(game_id).or_insert(event.version);
            *tombstone = (*tombstone).max(event.version);
            return Ok(());
        }

        let Some(game) = games.live.get_mut(&game_id) else {
            tracing::debug!(%game_id, event_type = %event.event_type, "event for unlisted game");
            return Ok(());
        };
        if event.version <= game.version {
            return Ok(());
        }

        match game_event {
            GameEvent::PlayerAddedToTeam(data) => {
                if !game.players.contains(&data.player) {
                    game.players.push(data.player);
                    game.player_count = game.players.len();
                }
            }
            GameEvent::GameStarted(_) => game.status = GameStatus::Started,
            GameEvent::GoalScored(data) => match data.team {
                Team::Blue => game.points_blue += 1,
                Team::Red => game.points_red += 1,
            },
            GameEvent::GameEnded(_) => {
                game.status = GameStatus::Ended;
                game.winner = match game.points_blue.cmp(&game.points_red) {
                    std::cmp::Ordering::Greater => Some(Team::Blue),
                    std::cmp::Ordering::Less => Some(Team::Red),
                    std::cmp::Ordering::Equal => None,
                };
            }
            _ => {}
        }
        game.version = event.version;
        game.updated_at = event.timestamp;

        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        *self.games.write().await = GameTable::default();
        Ok(())
    }
}
