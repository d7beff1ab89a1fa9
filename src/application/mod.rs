//! Application layer managing state and business workflows.
//!
//! This module coordinates between the domain layer and presentation layer:
//! [`planner`] owns and mutates the trip aggregate, [`state`] carries the
//! UI application state around it.

pub mod planner;
pub mod state;

pub use planner::*;
pub use state::*;
