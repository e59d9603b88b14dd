pub mod attempts;
pub mod prelude;
pub mod rooms;
