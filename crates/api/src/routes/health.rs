//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use event_store::EventStore;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub games: usize,
    pub players: usize,
}

/// GET /health: liveness plus the size of the read views.
pub async fn check<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        games: state.game_list.get_all_games().await.len(),
        players: state.player_list.get_all_players().await.len(),
    })
}
