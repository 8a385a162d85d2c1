use chrono::{DateTime, Utc};
use common::GameId;

use crate::aggregate::{Aggregate, AggregateRoot};
use crate::error::DomainError;
use crate::projection::{DecisionProjection, Mutator, ProjectionData};

use super::{
    CommentAddedData, GameError, GameEvent, GameEventKind, GameReviewedData, MAX_COMMENT_LENGTH,
    MAX_REVIEW_LENGTH, Team,
};

const IS_CREATED: &str = "isCreated";
const NAME: &str = "name";
const IS_STARTED: &str = "isStarted";
const STARTED_AT: &str = "startedAt";
const IS_ENDED: &str = "isEnded";
const ENDED_AT: &str = "endedAt";
const IS_DELETED: &str = "isDeleted";
const PLAYERS: &str = "players";
const WINNER: &str = "winner";
const COMMENTS: &str = "comments";
const REVIEWS: &str = "reviews";

/// A game between the blue and the red team.
///
/// Lifecycle: created, then players join, then started, goals scored, then
/// ended. Comments are accepted at any point; reviews only once the game
/// has ended. A deleted game accepts nothing.
pub struct Game {
    id: GameId,
    root: AggregateRoot<GameEvent>,
}

impl Aggregate for Game {
    type Id = GameId;
    type Event = GameEvent;

    fn register(projection: &mut DecisionProjection<GameEvent>) {
        for kind in GameEventKind::ALL {
            let mutator: Mutator<GameEvent> = match kind {
                GameEventKind::GameCreated => on_created,
                GameEventKind::PlayerAddedToTeam => on_player_added,
                GameEventKind::GameStarted => on_started,
                GameEventKind::GoalScored => on_goal_scored,
                GameEventKind::GameEnded => on_ended,
                GameEventKind::CommentAdded => on_comment_added,
                GameEventKind::GameReviewed => on_reviewed,
                GameEventKind::GameDeleted => on_deleted,
            };
            projection.register(kind, mutator);
        }
    }

    fn from_root(id: GameId, root: AggregateRoot<GameEvent>) -> Self {
        Self { id, root }
    }

    fn root(&self) -> &AggregateRoot<GameEvent> {
        &self.root
    }
}

fn on_created(data: &mut ProjectionData, event: &GameEvent) {
    if let GameEvent::GameCreated(d) = event {
        data.set(IS_CREATED, true);
        data.set(NAME, &d.name);
        data.set(IS_STARTED, false);
        data.set(IS_ENDED, false);
        data.set(IS_DELETED, false);
        data.set(PLAYERS, Vec::<String>::new());
        for team in [Team::Blue, Team::Red] {
            data.set(team.members_key(), Vec::<String>::new());
            data.set(team.points_key(), 0);
        }
        data.set(COMMENTS, Vec::<CommentAddedData>::new());
        data.set(REVIEWS, Vec::<GameReviewedData>::new());
    }
}

fn on_player_added(data: &mut ProjectionData, event: &GameEvent) {
    if let GameEvent::PlayerAddedToTeam(d) = event {
        data.push_unique(PLAYERS, &d.player);
        data.remove_from_list(d.team.opponent().members_key(), &d.player);
        data.push_unique(d.team.members_key(), &d.player);
    }
}

fn on_started(data: &mut ProjectionData, event: &GameEvent) {
    if let GameEvent::GameStarted(d) = event {
        data.set(IS_STARTED, true);
        data.set(STARTED_AT, d.started_at);
    }
}

fn on_goal_scored(data: &mut ProjectionData, event: &GameEvent) {
    if let GameEvent::GoalScored(d) = event {
        data.increment(d.team.points_key(), 1);
    }
}

fn on_ended(data: &mut ProjectionData, event: &GameEvent) {
    if let GameEvent::GameEnded(d) = event {
        data.set(IS_ENDED, true);
        data.set(ENDED_AT, d.ended_at);

        let blue = data.int(Team::Blue.points_key());
        let red = data.int(Team::Red.points_key());
        let winner = match blue.cmp(&red) {
            std::cmp::Ordering::Greater => Some(Team::Blue),
            std::cmp::Ordering::Less => Some(Team::Red),
            std::cmp::Ordering::Equal => None,
        };
        data.set(WINNER, winner);
    }
}

fn on_comment_added(data: &mut ProjectionData, event: &GameEvent) {
    if let GameEvent::CommentAdded(d) = event {
        data.push(COMMENTS, d);
    }
}

fn on_reviewed(data: &mut ProjectionData, event: &GameEvent) {
    if let GameEvent::GameReviewed(d) = event {
        data.push(REVIEWS, d);
    }
}

fn on_deleted(data: &mut ProjectionData, _event: &GameEvent) {
    data.set(IS_DELETED, true);
}

impl Game {
    /// Returns the game's id.
    pub fn id(&self) -> &GameId {
        &self.id
    }

    /// Returns the game's name.
    pub fn name(&self) -> Option<String> {
        self.state().string(NAME).map(String::from)
    }

    pub fn is_created(&self) -> bool {
        self.state().flag(IS_CREATED)
    }

    pub fn is_started(&self) -> bool {
        self.state().flag(IS_STARTED)
    }

    pub fn is_ended(&self) -> bool {
        self.state().flag(IS_ENDED)
    }

    pub fn is_deleted(&self) -> bool {
        self.state().flag(IS_DELETED)
    }

    /// Returns every player who ever joined, in join order.
    pub fn players(&self) -> Vec<String> {
        self.state().strings(PLAYERS)
    }

    /// Returns the current members of `team`.
    pub fn members(&self, team: Team) -> Vec<String> {
        self.state().strings(team.members_key())
    }

    /// Returns the team `player` currently plays for.
    pub fn team_of(&self, player: &str) -> Option<Team> {
        [Team::Blue, Team::Red]
            .into_iter()
            .find(|team| self.state().list_contains(team.members_key(), player))
    }

    /// Returns the goals scored by `team`.
    pub fn points(&self, team: Team) -> i64 {
        self.state().int(team.points_key())
    }

    /// Returns the winner of an ended game; `None` on a draw or while the
    /// game is still running.
    pub fn winner(&self) -> Option<Team> {
        self.state().read::<Option<Team>>(WINNER).flatten()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.state().read(STARTED_AT)
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.state().read(ENDED_AT)
    }

    /// Returns the comments in posting order.
    pub fn comments(&self) -> Vec<CommentAddedData> {
        self.state().read(COMMENTS).unwrap_or_default()
    }

    /// Returns the reviews in posting order.
    pub fn reviews(&self) -> Vec<GameReviewedData> {
        self.state().read(REVIEWS).unwrap_or_default()
    }

    fn state(&self) -> &ProjectionData {
        self.root.state()
    }

    /// Creates the game.
    pub async fn create(&mut self, name: &str) -> Result<(), DomainError> {
        if self.is_created() {
            return Err(GameError::AlreadyCreated.into());
        }
        if name.trim().is_empty() {
            return Err(GameError::EmptyName.into());
        }

        self.root.emit(GameEvent::game_created(name)).await
    }

    /// Puts `player` on `team`, moving them off the other team if needed.
    pub async fn add_player(&mut self, player: &str, team: Team) -> Result<(), DomainError> {
        self.ensure_active()?;
        if self.is_ended() {
            return Err(GameError::AlreadyEnded.into());
        }
        if player.trim().is_empty() {
            return Err(GameError::EmptyPlayerName.into());
        }
        if self.team_of(player) == Some(team) {
            return Err(GameError::AlreadyTeamMember {
                player: player.to_string(),
                team,
            }
            .into());
        }

        self.root
            .emit(GameEvent::player_added_to_team(player, team))
            .await
    }

    /// Starts the game.
    pub async fn start(&mut self) -> Result<(), DomainError> {
        self.ensure_active()?;
        if self.is_started() {
            return Err(GameError::AlreadyStarted.into());
        }

        self.root.emit(GameEvent::game_started(Utc::now())).await
    }

    /// Scores a goal for the team `player` currently plays for.
    pub async fn add_goal(&mut self, player: &str) -> Result<(), DomainError> {
        self.ensure_active()?;
        if !self.is_started() {
            return Err(GameError::NotStarted.into());
        }
        if self.is_ended() {
            return Err(GameError::AlreadyEnded.into());
        }
        let Some(team) = self.team_of(player) else {
            return Err(GameError::UnknownPlayer {
                player: player.to_string(),
            }
            .into());
        };

        self.root.emit(GameEvent::goal_scored(player, team)).await
    }

    /// Ends the game. The winner is decided from the score.
    pub async fn end(&mut self) -> Result<(), DomainError> {
        self.end_at(Utc::now()).await
    }

    /// Ends the game at a given time.
    pub async fn end_at(&mut self, ended_at: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_active()?;
        if !self.is_started() {
            return Err(GameError::NotStarted.into());
        }
        if self.is_ended() {
            return Err(GameError::AlreadyEnded.into());
        }

        self.root.emit(GameEvent::game_ended(ended_at)).await
    }

    /// Adds a comment.
    pub async fn comment(&mut self, author: &str, text: &str) -> Result<(), DomainError> {
        self.ensure_active()?;
        if author.trim().is_empty() {
            return Err(GameError::MissingAuthor.into());
        }
        let length = text.chars().count();
        if length > MAX_COMMENT_LENGTH {
            return Err(GameError::CommentTooLong {
                length,
                max: MAX_COMMENT_LENGTH,
            }
            .into());
        }

        self.root.emit(GameEvent::comment_added(author, text)).await
    }

    /// Reviews the game.
    pub async fn review(&mut self, author: &str, stars: u8, text: &str) -> Result<(), DomainError> {
        self.review_at(author, stars, text, Utc::now()).await
    }

    /// Reviews the game, judging "already ended" against `now`.
    pub async fn review_at(
        &mut self,
        author: &str,
        stars: u8,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_active()?;
        match self.ended_at() {
            Some(ended_at) if self.is_ended() && ended_at <= now => {}
            _ => return Err(GameError::NotEnded.into()),
        }
        if !(1..=5).contains(&stars) {
            return Err(GameError::InvalidReviewStars { stars }.into());
        }
        if author.trim().is_empty() {
            return Err(GameError::MissingAuthor.into());
        }
        let length = text.chars().count();
        if length > MAX_REVIEW_LENGTH {
            return Err(GameError::ReviewTooLong {
                length,
                max: MAX_REVIEW_LENGTH,
            }
            .into());
        }

        self.root
            .emit(GameEvent::game_reviewed(author, stars, text))
            .await
    }

    /// Deletes the game.
    pub async fn delete(&mut self) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.root.emit(GameEvent::game_deleted()).await
    }

    fn ensure_active(&self) -> Result<(), GameError> {
        if !self.is_created() {
            return Err(GameError::NotCreated);
        }
        if self.is_deleted() {
            return Err(GameError::Deleted);
        }
        Ok(())
    }
}
