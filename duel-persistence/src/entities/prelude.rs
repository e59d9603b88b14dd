pub use super::attempts::Entity as Attempts;
pub use super::rooms::Entity as Rooms;
