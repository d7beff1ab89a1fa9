//! Infrastructure layer providing external service integrations.
//!
//! This module contains implementations for external concerns: the
//! key-value store and versioned payload codec, local credential storage,
//! and CSV export.

pub mod persistence;
pub mod auth;
pub mod export;

pub use persistence::*;
pub use auth::*;
pub use export::*;
