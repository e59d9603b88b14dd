pub mod api;
pub mod controller;

pub use api::*;
pub use controller::*;
