use async_trait::async_trait;

use duel_types::{ApiError, PlayerId, PlayerInfo, Room};

/// Outcome of a guess submission as arbitrated by the server. The fresh
/// room row rides along on a correct answer.
#[derive(Debug, Clone)]
pub struct GuessOutcome {
    pub is_correct: bool,
    pub room: Option<Room>,
}

/// The store operations the controller needs. The production
/// implementation speaks HTTP to the duel server; tests drive the
/// controller against an in-memory fake.
#[async_trait]
pub trait RoomApi: Send + Sync {
    async fn fetch_room(&self, code: &str) -> Result<Option<Room>, ApiError>;
    async fn join_room(&self, code: &str, player: &PlayerInfo) -> Result<Room, ApiError>;
    async fn start_room(&self, code: &str, by: PlayerId) -> Result<Room, ApiError>;
    async fn submit_guess(
        &self,
        code: &str,
        by: PlayerId,
        word_index: i32,
        guess: &str,
    ) -> Result<GuessOutcome, ApiError>;
    async fn advance_on_timeout(
        &self,
        code: &str,
        by: PlayerId,
        word_index: i32,
    ) -> Result<Room, ApiError>;
    async fn send_typing(&self, code: &str, by: PlayerId) -> Result<(), ApiError>;
}
