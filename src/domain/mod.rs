pub mod models;
pub mod services;
pub mod dnd;
pub mod errors;

pub use models::*;
pub use services::*;
pub use dnd::*;
pub use errors::*;
