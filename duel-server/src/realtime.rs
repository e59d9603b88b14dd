use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use duel_types::RoomEvent;

/// Events buffered per subscriber before a slow socket starts missing
/// them. Missing is fine; polling is the correctness backstop.
const CHANNEL_CAPACITY: usize = 64;

/// Per-room broadcast channels keyed by room code. Best-effort fan-out of
/// row changes, attempt inserts, and typing signals to every subscribed
/// client of that room.
pub struct RoomHub {
    channels: DashMap<String, broadcast::Sender<RoomEvent>>,
}

impl RoomHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to a room's events, creating its channel on first use.
    pub fn subscribe(&self, code: &str) -> broadcast::Receiver<RoomEvent> {
        self.channels
            .entry(code.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to whoever is listening on this room. A room with
    /// no subscribers drops its channel; events are never queued for
    /// clients that are not connected.
    pub fn publish(&self, code: &str, event: RoomEvent) {
        let Some(sender) = self.channels.get(code).map(|entry| entry.value().clone()) else {
            return;
        };

        if sender.send(event).is_err() {
            debug!(code, "dropping idle room channel");
            // Re-check under the map lock: a subscriber may have arrived.
            self.channels
                .remove_if(code, |_, sender| sender.receiver_count() == 0);
        }
    }

    pub fn subscriber_count(&self, code: &str) -> usize {
        self.channels
            .get(code)
            .map(|entry| entry.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new()
    }
}
