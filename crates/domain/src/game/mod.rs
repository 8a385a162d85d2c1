//! Game aggregate and related types.

mod aggregate;
mod events;
mod team;

pub use aggregate::Game;
pub use events::{
    CommentAddedData, GameCreatedData, GameDeletedData, GameEndedData, GameEvent, GameEventKind,
    GameReviewedData, GameStartedData, GoalScoredData, PlayerAddedToTeamData,
};
pub use team::{ParseTeamError, Team};

use thiserror::Error;

/// Longest accepted comment, in characters.
pub const MAX_COMMENT_LENGTH: usize = 280;

/// Longest accepted review text, in characters.
pub const MAX_REVIEW_LENGTH: usize = 1000;

/// Errors that can occur during game operations.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Game not created")]
    NotCreated,

    #[error("Game already created")]
    AlreadyCreated,

    #[error("Game name cannot be empty")]
    EmptyName,

    #[error("Game is deleted")]
    Deleted,

    #[error("Game already started")]
    AlreadyStarted,

    #[error("Game not started")]
    NotStarted,

    #[error("Game already ended")]
    AlreadyEnded,

    /// Goals can only be scored by players on a team.
    #[error("Unknown player: {player}")]
    UnknownPlayer { player: String },

    #[error("Player {player} is already on team {team}")]
    AlreadyTeamMember { player: String, team: Team },

    #[error("Player name cannot be empty")]
    EmptyPlayerName,

    #[error("Author is required")]
    MissingAuthor,

    #[error("Comment too long: {length} characters (max {max})")]
    CommentTooLong { length: usize, max: usize },

    /// Reviews need a game whose end time has passed.
    #[error("Game not ended")]
    NotEnded,

    #[error("Invalid review stars: {stars} (must be between 1 and 5)")]
    InvalidReviewStars { stars: u8 },

    #[error("Review too long: {length} characters (max {max})")]
    ReviewTooLong { length: usize, max: usize },
}
