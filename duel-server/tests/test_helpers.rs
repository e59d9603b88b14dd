use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use uuid::Uuid;

use duel_persistence::{connection::connect_to_memory_database, RoomRepository};
use duel_server::catalog::CatalogCache;
use duel_server::realtime::RoomHub;
use duel_server::room_service::RoomService;
use duel_types::{Category, Descriptions, Difficulty, PlayerInfo, Room, Word, WordCatalog};

/// Creates a catalog with predictable word texts per tier. Every word gets
/// one synonym, `syn-<word>`, so synonym matching is testable.
pub fn test_catalog(per_tier: usize) -> WordCatalog {
    let make = |prefix: &str, difficulty: Difficulty, count: usize| {
        (0..count)
            .map(|i| {
                let word = format!("{prefix}{i}");
                Word {
                    word: word.clone(),
                    category: "general".to_string(),
                    difficulty,
                    descriptions: Descriptions {
                        easy: format!("{word} easy description"),
                        medium: format!("{word} medium description"),
                        hard: format!("{word} hard description"),
                    },
                    hint: format!("hint-{word}"),
                    synonyms: vec![format!("syn-{word}")],
                }
            })
            .collect::<Vec<_>>()
    };

    WordCatalog {
        easy: make("easyword", Difficulty::Easy, per_tier),
        medium: make("mediumword", Difficulty::Medium, per_tier),
        hard: make("hardword", Difficulty::Hard, per_tier),
        categories: vec![Category {
            id: "general".to_string(),
            name: "כללי".to_string(),
        }],
    }
}

pub fn make_player(name: &str) -> PlayerInfo {
    PlayerInfo {
        id: Uuid::new_v4(),
        name: name.to_string(),
    }
}

/// Test setup that provides the service wired to an in-memory database and
/// a fresh hub.
pub struct TestDuelSetup {
    pub service: Arc<RoomService>,
    pub hub: Arc<RoomHub>,
}

impl TestDuelSetup {
    pub async fn new() -> Self {
        Self::with_limits(30, 30).await
    }

    pub async fn with_limits(words_per_duel: usize, seconds_per_word: i64) -> Self {
        Self::with_catalog(test_catalog(12), words_per_duel, seconds_per_word).await
    }

    pub async fn with_catalog(
        catalog: WordCatalog,
        words_per_duel: usize,
        seconds_per_word: i64,
    ) -> Self {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let hub = Arc::new(RoomHub::new());
        let service = Arc::new(RoomService::new(
            RoomRepository::new(db),
            Arc::new(CatalogCache::preloaded(catalog)),
            hub.clone(),
            words_per_duel,
            seconds_per_word,
        ));

        Self { service, hub }
    }

    /// Create a room, seat a guest, and start the match.
    pub async fn room_in_play(&self) -> (Room, PlayerInfo, PlayerInfo) {
        let host = make_player("דנה");
        let guest = make_player("יובל");

        let room = self.service.create_room(host.clone()).await.unwrap();
        self.service.join_room(&room.code, guest.clone()).await.unwrap();
        let room = self.service.start_room(&room.code, host.id).await.unwrap();

        (room, host, guest)
    }
}
