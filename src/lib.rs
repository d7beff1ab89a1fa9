//! WanderPlan - Terminal Trip Planner Library
//!
//! A terminal-based trip planner built in Rust: a day-by-day itinerary
//! board with an unassigned-activity pool, drag-and-drop moves, versioned
//! local persistence, booking cost estimates, and local credential storage.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
