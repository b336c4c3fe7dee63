//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunPhase`: The phase of a bundling run (validating, fetching, ready, archiving, ...)

mod run_state;

pub use run_state::RunPhase;
