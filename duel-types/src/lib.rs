pub mod attempt;
pub mod errors;
pub mod events;
pub mod room;
pub mod word;

// Re-export all types
pub use attempt::*;
pub use errors::*;
pub use events::*;
pub use room::*;
pub use word::*;

pub type RoomId = uuid::Uuid;
pub type PlayerId = uuid::Uuid;
pub type AttemptId = uuid::Uuid;
