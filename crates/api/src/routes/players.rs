//! Player profile endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::PlayerId;
use domain::Player;
use event_store::EventStore;
use projections::PlayerSummary;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct PlayerRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct PlayerCreatedResponse {
    pub player_id: String,
}

#[derive(Serialize)]
pub struct PlayerResponse {
    pub id: String,
    pub name: String,
}

impl From<&Player> for PlayerResponse {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id().as_str().to_string(),
            name: player.name().unwrap_or_default(),
        }
    }
}

/// POST /players
#[tracing::instrument(skip(state, req))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<PlayerRequest>,
) -> Result<(StatusCode, Json<PlayerCreatedResponse>), ApiError> {
    let player_id = PlayerId::generate();
    let mut player = state.players.new_aggregate(&player_id).await?;
    player.create(&req.name).await?;

    metrics::counter!("players_created_total").increment(1);

    Ok((
        StatusCode::CREATED,
        Json(PlayerCreatedResponse {
            player_id: player_id.as_str().to_string(),
        }),
    ))
}

/// GET /players: every live player, sorted by name.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<PlayerSummary>> {
    Json(state.player_list.get_all_players().await)
}

/// GET /players/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let player = load_player(&state, &id).await?;
    if player.is_deleted() {
        return Err(ApiError::NotFound(format!("Player {id} not found")));
    }
    Ok(Json(PlayerResponse::from(&player)))
}

/// PUT /players/{id}: rename a player.
#[tracing::instrument(skip(state, req))]
pub async fn rename<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<PlayerRequest>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let mut player = load_player(&state, &id).await?;
    player.rename(&req.name).await?;
    Ok(Json(PlayerResponse::from(&player)))
}

/// DELETE /players/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut player = load_player(&state, &id).await?;
    player.delete().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_player<S: EventStore>(state: &AppState<S>, id: &str) -> Result<Player, ApiError> {
    let player_id = PlayerId::new(id)?;
    Ok(state.players.load(&player_id).await?)
}
