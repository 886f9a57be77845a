// Changelogd - Changelog Reconciliation Tool
// Polls a source-control host for merged pull requests and appends release rows to a wiki page

pub mod cli;
pub mod clients;
pub mod config;
pub mod dates;
pub mod error;
pub mod markup;
pub mod models;
pub mod reconcile;
pub mod state;
pub mod table;
pub mod version;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use config::Settings;
pub use error::{ApiError, Stage, SyncError, System};
pub use models::{ChangeRequest, Page, ReconcileOutcome, TableEntry};
pub use reconcile::reconcile;
pub use state::RunStateManager;
