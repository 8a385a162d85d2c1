//! HTTP API server with observability for the game league.
//!
//! Provides REST endpoints for games and players, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{Game, Player, Repository};
use event_store::{EventPublisher, EventStore};
use metrics_exporter_prometheus::PrometheusHandle;
use projections::{GameListView, PlayerListView, ProjectionProcessor};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub event_store: S,
    pub games: Repository<Game, S>,
    pub players: Repository<Player, S>,
    pub game_list: GameListView,
    pub player_list: PlayerListView,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route(
            "/games",
            post(routes::games::create::<S>).get(routes::games::list::<S>),
        )
        .route(
            "/games/{id}",
            get(routes::games::get::<S>).delete(routes::games::delete::<S>),
        )
        .route("/games/{id}/players", post(routes::games::add_player::<S>))
        .route("/games/{id}/start", post(routes::games::start::<S>))
        .route("/games/{id}/goals", post(routes::games::add_goal::<S>))
        .route("/games/{id}/end", post(routes::games::end::<S>))
        .route("/games/{id}/comments", post(routes::games::comment::<S>))
        .route("/games/{id}/reviews", post(routes::games::review::<S>))
        .route("/games/{id}/events", get(routes::games::events::<S>))
        .route(
            "/players",
            post(routes::players::create::<S>).get(routes::players::list::<S>),
        )
        .route(
            "/players/{id}",
            get(routes::players::get::<S>)
                .put(routes::players::rename::<S>)
                .delete(routes::players::delete::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the store, the publisher, the read views and the repositories.
///
/// The returned processor can rebuild the views from the store; live updates
/// already flow through the publisher.
pub fn create_default_state<S: EventStore + Clone + 'static>(
    event_store: S,
) -> (Arc<AppState<S>>, Arc<ProjectionProcessor<S>>) {
    let game_list = GameListView::new();
    let player_list = PlayerListView::new();

    let mut processor = ProjectionProcessor::new(event_store.clone());
    processor.register(Arc::new(game_list.clone()));
    processor.register(Arc::new(player_list.clone()));

    let mut publisher = EventPublisher::with_store(event_store.clone());
    processor.subscribe(&mut publisher);
    let publisher = Arc::new(publisher);

    let state = Arc::new(AppState {
        games: Repository::new(event_store.clone(), Arc::clone(&publisher)),
        players: Repository::new(event_store.clone(), publisher),
        event_store,
        game_list,
        player_list,
    });

    (state, Arc::new(processor))
}
