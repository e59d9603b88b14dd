use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::CatalogCache;
use crate::realtime::RoomHub;
use duel_core::{matcher, normalize_room_code, select_words, AdvanceOutcome};
use duel_persistence::{RepoError, RoomRepository};
use duel_types::{Attempt, PlayerId, PlayerInfo, Room, RoomError, RoomEvent};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RepoError> for ServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Room(e) => ServiceError::Room(e),
            other => ServiceError::Internal(anyhow::anyhow!(other)),
        }
    }
}

/// What a guess submission did. The fresh room row rides along on a correct
/// answer so the submitting client converges without waiting for the push.
#[derive(Debug, Clone, Serialize)]
pub struct GuessReply {
    pub is_correct: bool,
    pub attempt: Attempt,
    pub room: Option<Room>,
}

/// Server-side orchestration of one duel room: repositories for the
/// authoritative rows, the hub for best-effort notifications, the catalog
/// for word content. Every mutation republishes the fresh row.
pub struct RoomService {
    rooms: RoomRepository,
    catalog: Arc<CatalogCache>,
    hub: Arc<RoomHub>,
    words_per_duel: usize,
    seconds_per_word: i64,
}

impl RoomService {
    pub fn new(
        rooms: RoomRepository,
        catalog: Arc<CatalogCache>,
        hub: Arc<RoomHub>,
        words_per_duel: usize,
        seconds_per_word: i64,
    ) -> Self {
        Self {
            rooms,
            catalog,
            hub,
            words_per_duel,
            seconds_per_word,
        }
    }

    pub fn seconds_per_word(&self) -> i64 {
        self.seconds_per_word
    }

    /// Create a room: draw this duel's word sequence and persist the row
    /// with a fresh shareable code.
    pub async fn create_room(&self, host: PlayerInfo) -> Result<Room, ServiceError> {
        let catalog = self.catalog.get().await?;

        let words = {
            let mut rng = StdRng::from_os_rng();
            select_words(&catalog, self.words_per_duel, &mut rng)
        };
        if words.is_empty() {
            warn!("word catalog is empty; refusing to create a room");
            return Err(RoomError::EmptyCatalog.into());
        }
        if words.len() < self.words_per_duel {
            warn!(
                selected = words.len(),
                wanted = self.words_per_duel,
                "catalog too small, creating a shorter duel"
            );
        }

        let order = words.into_iter().map(|w| w.word).collect();
        let room = self.rooms.create_room(&host, order).await?;
        Ok(room)
    }

    pub async fn get_room(&self, code: &str) -> Result<Room, ServiceError> {
        let code = normalize_room_code(code);
        Ok(self
            .rooms
            .find_by_code(&code)
            .await?
            .ok_or(RoomError::RoomNotFound)?)
    }

    pub async fn join_room(&self, code: &str, player: PlayerInfo) -> Result<Room, ServiceError> {
        let code = normalize_room_code(code);
        let room = self.rooms.join_room(&code, &player).await?;
        self.publish_room(&room);
        Ok(room)
    }

    pub async fn start_room(&self, code: &str, by: PlayerId) -> Result<Room, ServiceError> {
        let code = normalize_room_code(code);
        let room = self.rooms.start_room(&code, by).await?;
        self.publish_room(&room);
        Ok(room)
    }

    /// Arbitrate a guess: match it against the word the player was shown,
    /// then either run the award-and-advance transaction or append an
    /// incorrect attempt. First correct answer wins the word; a racing
    /// second correct answer surfaces as `StaleWordIndex`.
    pub async fn submit_guess(
        &self,
        code: &str,
        by: PlayerId,
        word_index: i32,
        guess: &str,
    ) -> Result<GuessReply, ServiceError> {
        let code = normalize_room_code(code);
        let room = self
            .rooms
            .find_by_code(&code)
            .await?
            .ok_or(RoomError::RoomNotFound)?;

        let target = room
            .words_order
            .get(word_index.max(0) as usize)
            .ok_or(RoomError::StaleWordIndex {
                submitted: word_index,
            })?;

        // Content edits can drop a word mid-game; fall back to matching
        // the bare word text with no synonyms.
        let catalog = self.catalog.get().await?;
        let is_correct = match catalog.find(target) {
            Some(entry) => matcher::is_correct(guess, &entry.word, &entry.synonyms),
            None => matcher::is_correct(guess, target, &[]),
        };

        if is_correct {
            let (room, attempt, outcome) = self
                .rooms
                .record_correct_guess(&code, by, word_index, guess)
                .await?;

            if outcome == AdvanceOutcome::Finished {
                info!(code = %code, "duel finished");
            }
            self.publish_attempt(&room, &attempt);
            self.publish_room(&room);

            Ok(GuessReply {
                is_correct: true,
                attempt,
                room: Some(room),
            })
        } else {
            let attempt = self
                .rooms
                .record_incorrect_guess(&code, by, word_index, guess)
                .await?;
            self.publish_attempt(&room, &attempt);

            Ok(GuessReply {
                is_correct: false,
                attempt,
                room: None,
            })
        }
    }

    /// Host-driven scoreless advance once the word's countdown ran out.
    pub async fn advance_on_timeout(
        &self,
        code: &str,
        by: PlayerId,
        word_index: i32,
    ) -> Result<Room, ServiceError> {
        let code = normalize_room_code(code);
        let (room, _) = self
            .rooms
            .advance_on_timeout(&code, by, word_index, self.seconds_per_word)
            .await?;
        self.publish_room(&room);
        Ok(room)
    }

    /// Relay an ephemeral typing signal to the room channel. Nothing is
    /// stored; absent subscribers simply never see it.
    pub fn notify_typing(&self, code: &str, player_id: PlayerId) {
        let code = normalize_room_code(code);
        self.hub.publish(&code, RoomEvent::Typing { player_id });
    }

    /// Remove `waiting` rooms older than the retention window.
    pub async fn cleanup_stale_rooms(
        &self,
        retention: chrono::Duration,
    ) -> Result<u64, ServiceError> {
        let cutoff = chrono::Utc::now() - retention;
        Ok(self.rooms.delete_stale_waiting_rooms(cutoff).await?)
    }

    fn publish_room(&self, room: &Room) {
        self.hub
            .publish(&room.code, RoomEvent::RoomUpdated { room: room.clone() });
    }

    fn publish_attempt(&self, room: &Room, attempt: &Attempt) {
        let player_name = room
            .name_of(attempt.player_id)
            .unwrap_or("שחקן")
            .to_string();
        self.hub.publish(
            &room.code,
            RoomEvent::AttemptRecorded {
                attempt: attempt.clone(),
                player_name,
            },
        );
    }
}
