use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{PlayerId, RoomId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,  // Created, host waiting for a second player
    Playing,  // Countdown elapsed, words being presented
    Finished, // Terminal, room is read-only
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::Playing => "playing",
            RoomStatus::Finished => "finished",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(RoomStatus::Waiting),
            "playing" => Some(RoomStatus::Playing),
            "finished" => Some(RoomStatus::Finished),
            _ => None,
        }
    }
}

/// Which seat a player occupies in a room. Seat one is always the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Seat {
    Host,
    Guest,
}

/// The authoritative state of one duel. Clients treat their local copy as a
/// cache of this row and rebuild from it whenever a fresher one is observed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Room {
    pub id: RoomId,
    pub code: String,
    pub status: RoomStatus,
    pub player1_id: PlayerId,
    pub player1_name: String,
    pub player2_id: Option<PlayerId>,
    pub player2_name: Option<String>,
    pub player1_score: i32,
    pub player2_score: i32,
    pub current_word_index: i32,
    pub words_order: Vec<String>,
    pub word_started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Room {
    pub fn is_host(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id
    }

    pub fn seat_of(&self, player_id: PlayerId) -> Option<Seat> {
        if self.player1_id == player_id {
            Some(Seat::Host)
        } else if self.player2_id == Some(player_id) {
            Some(Seat::Guest)
        } else {
            None
        }
    }

    pub fn score_of(&self, seat: Seat) -> i32 {
        match seat {
            Seat::Host => self.player1_score,
            Seat::Guest => self.player2_score,
        }
    }

    pub fn name_of(&self, player_id: PlayerId) -> Option<&str> {
        match self.seat_of(player_id)? {
            Seat::Host => Some(self.player1_name.as_str()),
            Seat::Guest => self.player2_name.as_deref(),
        }
    }

    pub fn total_words(&self) -> i32 {
        self.words_order.len() as i32
    }

    /// The word text for the current index, while one exists.
    pub fn current_word(&self) -> Option<&str> {
        self.words_order
            .get(self.current_word_index as usize)
            .map(String::as_str)
    }

    /// True once `other` reflects a strictly later point in this room's
    /// lifecycle than `self`. Status ordering first, then word index.
    pub fn is_superseded_by(&self, other: &Room) -> bool {
        other.status > self.status
            || (other.status == self.status && other.current_word_index > self.current_word_index)
    }
}

/// Identity a client presents when creating or joining a room.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
}
