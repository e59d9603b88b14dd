use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{AttemptId, PlayerId, RoomId};

/// One recorded guess submission. Append-only; a room accumulates attempts
/// without limit, from either player, for any word index.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Attempt {
    pub id: AttemptId,
    pub room_id: RoomId,
    pub player_id: PlayerId,
    pub word_index: i32,
    pub guess: String,
    pub is_correct: bool,
    pub submitted_at: DateTime<Utc>,
}

impl Attempt {
    pub fn new(
        room_id: RoomId,
        player_id: PlayerId,
        word_index: i32,
        guess: String,
        is_correct: bool,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            room_id,
            player_id,
            word_index,
            guess,
            is_correct,
            submitted_at,
        }
    }
}
