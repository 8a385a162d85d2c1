//! Integration tests: aggregate commands → EventPublisher → list views.

use std::sync::Arc;

use common::{GameId, PlayerId};
use domain::{Game, Player, Repository, Team};
use event_store::{EventPublisher, EventStoreError, InMemoryEventStore};
use projections::{GameListView, GameStatus, PlayerListView, ProjectionProcessor};

struct Fixture {
    store: InMemoryEventStore,
    games: Repository<Game, InMemoryEventStore>,
    players: Repository<Player, InMemoryEventStore>,
    processor: ProjectionProcessor<InMemoryEventStore>,
    game_list: GameListView,
    player_list: PlayerListView,
}

/// Helper to wire the store, the publisher, both repositories and both views.
fn setup() -> Fixture {
    let store = InMemoryEventStore::new();
    let game_list = GameListView::new();
    let player_list = PlayerListView::new();

    let mut processor = ProjectionProcessor::new(store.clone());
    processor.register(Arc::new(game_list.clone()));
    processor.register(Arc::new(player_list.clone()));

    let mut publisher = EventPublisher::with_store(store.clone());
    processor.subscribe(&mut publisher);
    let publisher = Arc::new(publisher);

    Fixture {
        games: Repository::new(store.clone(), Arc::clone(&publisher)),
        players: Repository::new(store.clone(), publisher),
        store,
        processor,
        game_list,
        player_list,
    }
}

#[tokio::test]
async fn test_game_lifecycle_updates_game_list() {
    let fx = setup();
    let id = GameId::new("g1").unwrap();

    let mut game = fx.games.new_aggregate(&id).await.unwrap();
    game.create("Friday match").await.unwrap();
    game.add_player("cedric", Team::Blue).await.unwrap();
    game.add_player("franck", Team::Red).await.unwrap();
    game.start().await.unwrap();

    let summary = fx.game_list.get_game("g1").await.unwrap();
    assert_eq!(summary.status, GameStatus::Started);
    assert_eq!(summary.player_count, 2);

    let mut game = fx.games.load(&id).await.unwrap();
    game.add_goal("cedric").await.unwrap();
    game.add_goal("cedric").await.unwrap();
    game.add_goal("franck").await.unwrap();
    game.end().await.unwrap();

    let summary = fx.game_list.get_game("g1").await.unwrap();
    assert_eq!(summary.status, GameStatus::Ended);
    assert_eq!((summary.points_blue, summary.points_red), (2, 1));
    assert_eq!(summary.winner, Some(Team::Blue));
}

#[tokio::test]
async fn test_rejected_command_leaves_views_untouched() {
    let fx = setup();
    let id = GameId::new("g1").unwrap();

    let mut game = fx.games.new_aggregate(&id).await.unwrap();
    game.create("Friday match").await.unwrap();
    assert!(game.end().await.is_err());

    let summary = fx.game_list.get_game("g1").await.unwrap();
    assert_eq!(summary.status, GameStatus::Created);
    assert_eq!(fx.store.event_count().await, 1);
}

#[tokio::test]
async fn test_stale_delete_keeps_game_listed() {
    let fx = setup();
    let id = GameId::new("g1").unwrap();
    let mut game = fx.games.new_aggregate(&id).await.unwrap();
    game.create("Friday match").await.unwrap();

    let mut fresh = fx.games.load(&id).await.unwrap();
    let mut stale = fx.games.load(&id).await.unwrap();
    fresh.start().await.unwrap();

    let err = stale.delete().await.unwrap_err();
    assert!(matches!(
        err.store_error(),
        Some(EventStoreError::ConcurrencyConflict { .. })
    ));
    assert!(!stale.is_deleted());

    let summary = fx.game_list.get_game("g1").await.unwrap();
    assert_eq!(summary.status, GameStatus::Started);
    assert_eq!(fx.store.event_count().await, 2);
}

#[tokio::test]
async fn test_stale_player_delete_keeps_player_listed() {
    let fx = setup();
    let id = PlayerId::new("p1").unwrap();
    let mut player = fx.players.new_aggregate(&id).await.unwrap();
    player.create("Cedric").await.unwrap();

    let mut fresh = fx.players.load(&id).await.unwrap();
    let mut stale = fx.players.load(&id).await.unwrap();
    fresh.rename("Ced").await.unwrap();

    assert!(stale.delete().await.is_err());

    let summary = fx.player_list.get_player("p1").await.unwrap();
    assert_eq!(summary.name, "Ced");
}

#[tokio::test]
async fn test_player_list_follows_player_commands() {
    let fx = setup();

    for (raw, name) in [("p1", "Cedric"), ("p2", "Franck")] {
        let mut player = fx
            .players
            .new_aggregate(&PlayerId::new(raw).unwrap())
            .await
            .unwrap();
        player.create(name).await.unwrap();
    }
    let mut p1 = fx.players.load(&PlayerId::new("p1").unwrap()).await.unwrap();
    p1.rename("Ced").await.unwrap();
    let mut p2 = fx.players.load(&PlayerId::new("p2").unwrap()).await.unwrap();
    p2.delete().await.unwrap();

    let players = fx.player_list.get_all_players().await;
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].player_id, "p1");
    assert_eq!(players[0].name, "Ced");
}

#[tokio::test]
async fn test_rebuild_matches_live_views() {
    let fx = setup();

    for raw in ["g1", "g2", "g3"] {
        let mut game = fx
            .games
            .new_aggregate(&GameId::new(raw).unwrap())
            .await
            .unwrap();
        game.create(raw).await.unwrap();
        game.add_player("cedric", Team::Blue).await.unwrap();
        game.start().await.unwrap();
    }
    let mut g2 = fx.games.load(&GameId::new("g2").unwrap()).await.unwrap();
    g2.delete().await.unwrap();

    let live: Vec<_> = fx
        .game_list
        .get_all_games()
        .await
        .into_iter()
        .map(|g| (g.game_id, g.status, g.player_count))
        .collect();

    fx.processor.rebuild_all().await.unwrap();

    let rebuilt: Vec<_> = fx
        .game_list
        .get_all_games()
        .await
        .into_iter()
        .map(|g| (g.game_id, g.status, g.player_count))
        .collect();
    assert_eq!(rebuilt, live);
    assert_eq!(rebuilt.len(), 2);
}
