use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Protocol-level rejections. These are expected outcomes of racing clients
/// and bad input, not transport failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum RoomError {
    #[error("room not found")]
    RoomNotFound,
    #[error("room already has two players")]
    RoomFull,
    #[error("room is no longer accepting players")]
    AlreadyStarted,
    #[error("only the host may perform this action")]
    NotHost,
    #[error("player is not seated in this room")]
    NotSeated,
    #[error("cannot start without a second player")]
    MissingOpponent,
    #[error("room is not in play")]
    NotPlaying,
    #[error("word index {submitted} is no longer current")]
    StaleWordIndex { submitted: i32 },
    #[error("word is still within its countdown")]
    TimerNotExpired,
    #[error("word catalog has no words")]
    EmptyCatalog,
    #[error("could not allocate an unused room code")]
    CodeCollision,
}

/// Transport-level failure talking to the store or the server. The acting
/// client does not retry; the next successful read is the recovery path.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error("transport failure: {0}")]
    Transport(String),
}
