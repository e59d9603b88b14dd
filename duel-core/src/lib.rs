pub mod code;
pub mod consts;
pub mod hints;
pub mod matcher;
pub mod room;
pub mod selector;
pub mod solo;

// Re-export main components
pub use code::*;
pub use hints::*;
pub use matcher::*;
pub use room::*;
pub use selector::*;
pub use solo::*;
