//! Game command and query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{GameId, Identifier};
use domain::game::{CommentAddedData, GameReviewedData};
use domain::{Game, Team};
use event_store::EventStore;
use projections::{GameStatus, GameSummary};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateGameRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct AddPlayerRequest {
    pub player: String,
    pub team: String,
}

#[derive(Deserialize)]
pub struct GoalRequest {
    pub player: String,
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub author: String,
    pub text: String,
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub author: String,
    pub stars: u8,
    pub text: String,
}

#[derive(Deserialize)]
pub struct ListGamesParams {
    pub status: Option<GameStatus>,
}

// -- Response types --

#[derive(Serialize)]
pub struct GameCreatedResponse {
    pub game_id: String,
}

#[derive(Serialize)]
pub struct GameResponse {
    pub id: String,
    pub name: String,
    pub status: GameStatus,
    pub blue: Vec<String>,
    pub red: Vec<String>,
    pub points_blue: i64,
    pub points_red: i64,
    pub winner: Option<Team>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub comments: Vec<CommentAddedData>,
    pub reviews: Vec<GameReviewedData>,
    pub version: i64,
}

impl From<&Game> for GameResponse {
    fn from(game: &Game) -> Self {
        let status = if game.is_ended() {
            GameStatus::Ended
        } else if game.is_started() {
            GameStatus::Started
        } else {
            GameStatus::Created
        };

        Self {
            id: game.id().as_str().to_string(),
            name: game.name().unwrap_or_default(),
            status,
            blue: game.members(Team::Blue),
            red: game.members(Team::Red),
            points_blue: game.points(Team::Blue),
            points_red: game.points(Team::Red),
            winner: game.winner(),
            started_at: game.started_at(),
            ended_at: game.ended_at(),
            comments: game.comments(),
            reviews: game.reviews(),
            version: domain::Aggregate::version(game).as_i64(),
        }
    }
}

/// Response type for event envelope data.
#[derive(Serialize)]
pub struct EventEnvelopeResponse {
    pub event_id: String,
    pub event_type: String,
    pub aggregate_id: String,
    pub version: i64,
    pub timestamp: String,
    pub payload: serde_json::Value,
}

// -- Handlers --

/// POST /games: create a new game with a generated id.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameCreatedResponse>), ApiError> {
    let game_id = GameId::generate();
    let mut game = state.games.new_aggregate(&game_id).await?;
    game.create(&req.name).await?;

    metrics::counter!("games_created_total").increment(1);
    tracing::info!(%game_id, "game created");

    Ok((
        StatusCode::CREATED,
        Json(GameCreatedResponse {
            game_id: game_id.as_str().to_string(),
        }),
    ))
}

/// GET /games: list live games from the game list view.
#[tracing::instrument(skip(state, params))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListGamesParams>,
) -> Json<Vec<GameSummary>> {
    let games = match params.status {
        Some(status) => state.game_list.get_games_by_status(status).await,
        None => state.game_list.get_all_games().await,
    };
    Json(games)
}

/// GET /games/{id}: replay a game from its history.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let game = load_game(&state, &id).await?;
    if game.is_deleted() {
        return Err(ApiError::NotFound(format!("Game {id} not found")));
    }
    Ok(Json(GameResponse::from(&game)))
}

/// POST /games/{id}/players: put a player on a team.
#[tracing::instrument(skip(state, req))]
pub async fn add_player<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AddPlayerRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let team: Team = req
        .team
        .parse()
        .map_err(|e: domain::game::ParseTeamError| ApiError::BadRequest(e.to_string()))?;

    let mut game = load_game(&state, &id).await?;
    game.add_player(&req.player, team).await?;
    Ok(Json(GameResponse::from(&game)))
}

/// POST /games/{id}/start
#[tracing::instrument(skip(state))]
pub async fn start<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut game = load_game(&state, &id).await?;
    game.start().await?;
    Ok(Json(GameResponse::from(&game)))
}

/// POST /games/{id}/goals: score a goal for the player's team.
#[tracing::instrument(skip(state, req))]
pub async fn add_goal<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<GoalRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut game = load_game(&state, &id).await?;
    game.add_goal(&req.player).await?;
    Ok(Json(GameResponse::from(&game)))
}

/// POST /games/{id}/end
#[tracing::instrument(skip(state))]
pub async fn end<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut game = load_game(&state, &id).await?;
    game.end().await?;
    Ok(Json(GameResponse::from(&game)))
}

/// POST /games/{id}/comments
#[tracing::instrument(skip(state, req))]
pub async fn comment<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut game = load_game(&state, &id).await?;
    game.comment(&req.author, &req.text).await?;
    Ok(Json(GameResponse::from(&game)))
}

/// POST /games/{id}/reviews: rate an ended game from 1 to 5 stars.
#[tracing::instrument(skip(state, req))]
pub async fn review<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut game = load_game(&state, &id).await?;
    game.review(&req.author, req.stars, &req.text).await?;
    Ok(Json(GameResponse::from(&game)))
}

/// DELETE /games/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut game = load_game(&state, &id).await?;
    game.delete().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /games/{id}/events: list the stored history of a game.
#[tracing::instrument(skip(state))]
pub async fn events<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EventEnvelopeResponse>>, ApiError> {
    let game_id = GameId::new(id.as_str())?;

    let envelopes = state
        .event_store
        .get_events_of_aggregate(&game_id.aggregate_id())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if envelopes.is_empty() {
        return Err(ApiError::NotFound(format!("Game {id} not found")));
    }

    let responses = envelopes
        .into_iter()
        .map(|e| EventEnvelopeResponse {
            event_id: e.event_id.to_string(),
            event_type: e.event_type,
            aggregate_id: e.aggregate_id.map(|a| a.to_string()).unwrap_or_default(),
            version: e.version.as_i64(),
            timestamp: e.timestamp.to_rfc3339(),
            payload: e.payload,
        })
        .collect();

    Ok(Json(responses))
}

async fn load_game<S: EventStore>(state: &AppState<S>, id: &str) -> Result<Game, ApiError> {
    let game_id = GameId::new(id)?;
    Ok(state.games.load(&game_id).await?)
}
