pub mod attempt_repository;
pub mod room_repository;

pub use attempt_repository::AttemptRepository;
pub use room_repository::{RepoError, RoomRepository};
