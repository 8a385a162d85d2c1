//! Integration tests for the Game and Player aggregates.
//!
//! Every command goes through the repository, so each step rebuilds the
//! aggregate from the stored history before deciding.

use std::sync::Arc;

use common::{GameId, Identifier};
use domain::{
    Aggregate, DomainError, DomainEvent, Game, GameError, GameEvent, Repository, Team,
};
use event_store::{EventPublisher, EventStore, InMemoryEventStore, Version};

fn create_repository() -> (InMemoryEventStore, Repository<Game, InMemoryEventStore>) {
    let store = InMemoryEventStore::new();
    let publisher = Arc::new(EventPublisher::with_store(store.clone()));
    (store.clone(), Repository::new(store, publisher))
}

async fn create_game(repo: &Repository<Game, InMemoryEventStore>, raw: &str) -> GameId {
    let id = GameId::new(raw).unwrap();
    repo.new_aggregate(&id).await.unwrap().create("Friday match").await.unwrap();
    id
}

mod game_lifecycle {
    use super::*;

    #[tokio::test]
    async fn full_game_blue_wins_two_to_one() {
        let (store, repo) = create_repository();
        let id = create_game(&repo, "g1").await;

        repo.load(&id).await.unwrap().add_player("cedric", Team::Blue).await.unwrap();
        repo.load(&id).await.unwrap().add_player("franck", Team::Red).await.unwrap();
        repo.load(&id).await.unwrap().start().await.unwrap();
        for scorer in ["cedric", "cedric", "franck"] {
            repo.load(&id).await.unwrap().add_goal(scorer).await.unwrap();
        }
        repo.load(&id).await.unwrap().end().await.unwrap();

        let game = repo.load(&id).await.unwrap();
        let data = game.snapshot();
        assert_eq!(data.string("winner"), Some("blue"));
        assert_eq!(data.int("pointsTeamBlue"), 2);
        assert_eq!(data.int("pointsTeamRed"), 1);
        assert_eq!(game.winner(), Some(Team::Blue));
        assert_eq!(game.version(), Version::new(8));

        let types: Vec<_> = store
            .get_events_of_aggregate(&id.aggregate_id())
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(
            types,
            vec![
                "GameCreated",
                "PlayerAddedToTeam",
                "PlayerAddedToTeam",
                "GameStarted",
                "GoalScored",
                "GoalScored",
                "GoalScored",
                "GameEnded",
            ]
        );
    }

    #[tokio::test]
    async fn reviews_after_end() {
        let (_, repo) = create_repository();
        let id = create_game(&repo, "g1").await;

        let mut game = repo.load(&id).await.unwrap();
        game.add_player("cedric", Team::Blue).await.unwrap();
        game.start().await.unwrap();
        game.end().await.unwrap();
        game.comment("franck", "close one").await.unwrap();
        game.review("franck", 4, "fun to watch").await.unwrap();

        let reloaded = repo.load(&id).await.unwrap();
        assert_eq!(reloaded.comments().len(), 1);
        assert_eq!(reloaded.reviews()[0].author, "franck");
        assert_eq!(reloaded.snapshot(), game.snapshot());
    }
}

mod team_membership {
    use super::*;

    #[tokio::test]
    async fn switching_teams_moves_the_player() {
        let (_, repo) = create_repository();
        let id = create_game(&repo, "g1").await;

        repo.load(&id).await.unwrap().add_player("toto", Team::Red).await.unwrap();
        repo.load(&id).await.unwrap().add_player("toto", Team::Blue).await.unwrap();

        let game = repo.load(&id).await.unwrap();
        let data = game.snapshot();
        assert!(!data.strings("teamRedMembers").contains(&"toto".to_string()));
        assert!(data.strings("teamBlueMembers").contains(&"toto".to_string()));
        assert_eq!(
            data.strings("players").iter().filter(|p| *p == "toto").count(),
            1
        );
        assert_eq!(game.team_of("toto"), Some(Team::Blue));
    }

    #[tokio::test]
    async fn goal_counts_for_current_team() {
        let (_, repo) = create_repository();
        let id = create_game(&repo, "g1").await;

        let mut game = repo.load(&id).await.unwrap();
        game.add_player("toto", Team::Red).await.unwrap();
        game.add_player("toto", Team::Blue).await.unwrap();
        game.start().await.unwrap();
        game.add_goal("toto").await.unwrap();

        assert_eq!(game.points(Team::Blue), 1);
        assert_eq!(game.points(Team::Red), 0);
    }
}

mod atomicity {
    use super::*;

    #[tokio::test]
    async fn rejected_command_emits_nothing() {
        let (store, repo) = create_repository();
        let id = create_game(&repo, "g1").await;
        let mut game = repo.load(&id).await.unwrap();
        let before = game.snapshot();
        let count = store.event_count().await;

        let result = game.end().await;

        assert!(matches!(result, Err(DomainError::Game(GameError::NotStarted))));
        assert_eq!(store.event_count().await, count);
        assert_eq!(game.snapshot(), before);
        assert_eq!(repo.load(&id).await.unwrap().snapshot(), before);
    }

    #[tokio::test]
    async fn stale_aggregate_is_rejected_by_the_store() {
        let (store, repo) = create_repository();
        let id = create_game(&repo, "g1").await;

        let mut first = repo.load(&id).await.unwrap();
        let mut second = repo.load(&id).await.unwrap();
        first.start().await.unwrap();

        let result = second.add_player("cedric", Team::Blue).await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.store_error(),
            Some(event_store::EventStoreError::ConcurrencyConflict { .. })
        ));
        assert_eq!(store.event_count().await, 2);
        assert!(second.players().is_empty());
    }

    struct BrokenView;

    #[async_trait::async_trait]
    impl event_store::EventListener for BrokenView {
        fn name(&self) -> &'static str {
            "broken-view"
        }

        async fn on_event(
            &self,
            _event: &event_store::EventEnvelope,
        ) -> Result<(), event_store::ListenerError> {
            Err(event_store::ListenerError::Failed("view down".to_string()))
        }
    }

    #[tokio::test]
    async fn committed_command_succeeds_when_a_view_fails() {
        let store = InMemoryEventStore::new();
        let mut publisher = EventPublisher::with_store(store.clone());
        publisher.on("GameStarted", Arc::new(BrokenView));
        let repo = Repository::new(store.clone(), Arc::new(publisher));
        let id = create_game(&repo, "g1").await;

        let mut game = repo.load(&id).await.unwrap();
        game.start().await.unwrap();

        assert!(game.is_started());
        assert!(repo.load(&id).await.unwrap().is_started());
        assert_eq!(game.version(), Version::new(2));
        assert_eq!(store.event_count().await, 2);
    }

    #[tokio::test]
    async fn unknown_game_is_reported() {
        let (_, repo) = create_repository();

        let result = repo.load(&GameId::new("missing").unwrap()).await;

        assert!(matches!(result, Err(DomainError::UnknownAggregate { .. })));
    }
}

mod replay {
    use super::*;

    fn history() -> Vec<GameEvent> {
        vec![
            GameEvent::game_created("Friday match"),
            GameEvent::player_added_to_team("cedric", Team::Blue),
            GameEvent::player_added_to_team("franck", Team::Red),
            GameEvent::game_started(chrono::Utc::now()),
            GameEvent::goal_scored("franck", Team::Red),
            GameEvent::game_ended(chrono::Utc::now()),
        ]
    }

    #[test]
    fn replaying_the_same_history_gives_the_same_state() {
        let events = history();
        let publisher = Arc::new(EventPublisher::new());
        let id = GameId::new("g1").unwrap();

        let a = Game::rehydrate(id.clone(), &events, Version::new(6), Arc::clone(&publisher));
        let b = Game::rehydrate(id, &events, Version::new(6), publisher);

        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.winner(), Some(Team::Red));
    }

    #[test]
    fn events_survive_the_payload_round_trip() {
        for event in history() {
            let json = serde_json::to_value(&event).unwrap();
            let back: GameEvent = serde_json::from_value(json).unwrap();
            assert_eq!(back.event_type(), event.event_type());
        }
    }
}
