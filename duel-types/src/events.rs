use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{Attempt, PlayerId, Room};

/// Events published on a room's broadcast channel. Delivery is best-effort;
/// clients must stay correct on polling alone.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// The room row changed; the payload is the fresh authoritative row.
    RoomUpdated { room: Room },
    /// A guess was recorded for this room.
    AttemptRecorded {
        attempt: Attempt,
        player_name: String,
    },
    /// Ephemeral typing signal. Never persisted.
    Typing { player_id: PlayerId },
}

/// Frames a client may send over the room socket. Game actions go through
/// the HTTP API; the socket only carries ephemeral signals.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Typing { player_id: PlayerId },
}
