//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::EmptyIdentifierError;
use domain::{AccountError, DomainError, GameError, PlayerError, UserError};
use event_store::EventStoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => (domain_error_status(&err), err.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "internal server error");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

/// Picks the status for a domain error: unknown aggregates are 404, bad
/// arguments 400, rule violations against the current state 409.
fn domain_error_status(err: &DomainError) -> StatusCode {
    if let Some(EventStoreError::ConcurrencyConflict { .. }) = err.store_error() {
        return StatusCode::CONFLICT;
    }

    match err {
        DomainError::UnknownAggregate { .. } => StatusCode::NOT_FOUND,
        DomainError::AlreadyExists { .. } => StatusCode::CONFLICT,
        DomainError::Identifier(_) => StatusCode::BAD_REQUEST,
        DomainError::Game(game_err) => match game_err {
            GameError::EmptyName
            | GameError::EmptyPlayerName
            | GameError::UnknownPlayer { .. }
            | GameError::MissingAuthor
            | GameError::CommentTooLong { .. }
            | GameError::InvalidReviewStars { .. }
            | GameError::ReviewTooLong { .. } => StatusCode::BAD_REQUEST,
            GameError::NotCreated
            | GameError::AlreadyCreated
            | GameError::Deleted
            | GameError::AlreadyStarted
            | GameError::NotStarted
            | GameError::AlreadyEnded
            | GameError::AlreadyTeamMember { .. }
            | GameError::NotEnded => StatusCode::CONFLICT,
        },
        DomainError::Player(PlayerError::EmptyName) => StatusCode::BAD_REQUEST,
        DomainError::Player(_) => StatusCode::CONFLICT,
        DomainError::User(UserError::EmptyDisplayName) => StatusCode::BAD_REQUEST,
        DomainError::User(_) => StatusCode::CONFLICT,
        DomainError::Session(_) => StatusCode::CONFLICT,
        DomainError::Account(AccountError::InvalidAmount { .. }) => StatusCode::BAD_REQUEST,
        DomainError::Account(_) => StatusCode::CONFLICT,
        DomainError::EventStore(_) | DomainError::Publish(_) | DomainError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<EmptyIdentifierError> for ApiError {
    fn from(err: EmptyIdentifierError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
