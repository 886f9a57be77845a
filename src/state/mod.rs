//! STATE.yaml Management Module
//!
//! Handles persistence of run state, including:
//! - The busy/idle fence serializing reconciliation passes
//! - Last-run telemetry for `changelogd status`

mod manager;

pub use manager::{RunState, RunStateManager};
