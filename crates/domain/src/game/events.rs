//! Game domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{DomainEvent, EventKind};

use super::Team;

/// Events that can occur on a game aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GameEvent {
    /// Game was created.
    GameCreated(GameCreatedData),

    /// Player joined a team, or switched to it.
    PlayerAddedToTeam(PlayerAddedToTeamData),

    /// Game kicked off.
    GameStarted(GameStartedData),

    /// A player scored for their team.
    GoalScored(GoalScoredData),

    /// Game finished.
    GameEnded(GameEndedData),

    /// Someone commented on the game.
    CommentAdded(CommentAddedData),

    /// Someone reviewed the finished game.
    GameReviewed(GameReviewedData),

    /// Game was deleted.
    GameDeleted(GameDeletedData),
}

/// Discriminator of [`GameEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEventKind {
    GameCreated,
    PlayerAddedToTeam,
    GameStarted,
    GoalScored,
    GameEnded,
    CommentAdded,
    GameReviewed,
    GameDeleted,
}

impl GameEventKind {
    /// Every game event kind.
    pub const ALL: [GameEventKind; 8] = [
        GameEventKind::GameCreated,
        GameEventKind::PlayerAddedToTeam,
        GameEventKind::GameStarted,
        GameEventKind::GoalScored,
        GameEventKind::GameEnded,
        GameEventKind::CommentAdded,
        GameEventKind::GameReviewed,
        GameEventKind::GameDeleted,
    ];
}

impl EventKind for GameEventKind {
    fn as_str(&self) -> &'static str {
        match self {
            GameEventKind::GameCreated => "GameCreated",
            GameEventKind::PlayerAddedToTeam => "PlayerAddedToTeam",
            GameEventKind::GameStarted => "GameStarted",
            GameEventKind::GoalScored => "GoalScored",
            GameEventKind::GameEnded => "GameEnded",
            GameEventKind::CommentAdded => "CommentAdded",
            GameEventKind::GameReviewed => "GameReviewed",
            GameEventKind::GameDeleted => "GameDeleted",
        }
    }
}

impl DomainEvent for GameEvent {
    type Kind = GameEventKind;

    fn kind(&self) -> GameEventKind {
        match self {
            GameEvent::GameCreated(_) => GameEventKind::GameCreated,
            GameEvent::PlayerAddedToTeam(_) => GameEventKind::PlayerAddedToTeam,
            GameEvent::GameStarted(_) => GameEventKind::GameStarted,
            GameEvent::GoalScored(_) => GameEventKind::GoalScored,
            GameEvent::GameEnded(_) => GameEventKind::GameEnded,
            GameEvent::CommentAdded(_) => GameEventKind::CommentAdded,
            GameEvent::GameReviewed(_) => GameEventKind::GameReviewed,
            GameEvent::GameDeleted(_) => GameEventKind::GameDeleted,
        }
    }
}

/// Data for GameCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCreatedData {
    /// Name of the game.
    pub name: String,

    /// When the game was created.
    pub created_at: DateTime<Utc>,
}

/// Data for PlayerAddedToTeam event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerAddedToTeamData {
    /// Player name.
    pub player: String,

    /// Team joined.
    pub team: Team,
}

/// Data for GameStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStartedData {
    /// When the game started.
    pub started_at: DateTime<Utc>,
}

/// Data for GoalScored event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalScoredData {
    /// Scorer.
    pub player: String,

    /// Team credited with the goal.
    pub team: Team,
}

/// Data for GameEnded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEndedData {
    /// When the game ended.
    pub ended_at: DateTime<Utc>,
}

/// Data for CommentAdded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAddedData {
    /// Author of the comment.
    pub author: String,

    /// Comment body.
    pub text: String,

    /// When the comment was posted.
    pub commented_at: DateTime<Utc>,
}

/// Data for GameReviewed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameReviewedData {
    /// Author of the review.
    pub author: String,

    /// Rating from 1 to 5.
    pub stars: u8,

    /// Review body.
    pub text: String,

    /// When the review was posted.
    pub reviewed_at: DateTime<Utc>,
}

/// Data for GameDeleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDeletedData {
    /// When the game was deleted.
    pub deleted_at: DateTime<Utc>,
}

impl GameEvent {
    /// Creates a GameCreated event.
    pub fn game_created(name: impl Into<String>) -> Self {
        GameEvent::GameCreated(GameCreatedData {
            name: name.into(),
            created_at: Utc::now(),
        })
    }

    /// Creates a PlayerAddedToTeam event.
    pub fn player_added_to_team(player: impl Into<String>, team: Team) -> Self {
        GameEvent::PlayerAddedToTeam(PlayerAddedToTeamData {
            player: player.into(),
            team,
        })
    }

    /// Creates a GameStarted event.
    pub fn game_started(started_at: DateTime<Utc>) -> Self {
        GameEvent::GameStarted(GameStartedData { started_at })
    }

    /// Creates a GoalScored event.
    pub fn goal_scored(player: impl Into<String>, team: Team) -> Self {
        GameEvent::GoalScored(GoalScoredData {
            player: player.into(),
            team,
        })
    }

    /// Creates a GameEnded event.
    pub fn game_ended(ended_at: DateTime<Utc>) -> Self {
        GameEvent::GameEnded(GameEndedData { ended_at })
    }

    /// Creates a CommentAdded event.
    pub fn comment_added(author: impl Into<String>, text: impl Into<String>) -> Self {
        GameEvent::CommentAdded(CommentAddedData {
            author: author.into(),
            text: text.into(),
            commented_at: Utc::now(),
        })
    }

    /// Creates a GameReviewed event.
    pub fn game_reviewed(author: impl Into<String>, stars: u8, text: impl Into<String>) -> Self {
        GameEvent::GameReviewed(GameReviewedData {
            author: author.into(),
            stars,
            text: text.into(),
            reviewed_at: Utc::now(),
        })
    }

    /// Creates a GameDeleted event.
    pub fn game_deleted() -> Self {
        GameEvent::GameDeleted(GameDeletedData {
            deleted_at: Utc::now(),
        })
    }
}
