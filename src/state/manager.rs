//! RunStateManager - STATE.yaml CRUD operations
//!
//! The state file serves two purposes: a busy/idle fence so a periodic
//! trigger cannot start a second pass while one is in flight, and telemetry
//! about the last completed pass for `changelogd status`. The fence is
//! advisory and reclaimed after a configurable staleness window, so a
//! crashed pass cannot wedge the tool forever.

use crate::error::SyncError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const STATE_FILE: &str = "STATE.yaml";

/// Persisted run state.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunState {
    /// Schema version
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Set while a pass is running; the busy fence
    #[serde(default)]
    pub busy_since: Option<DateTime<Utc>>,

    /// When the last pass finished
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,

    /// "ok" or the error text of the last pass
    #[serde(default)]
    pub last_outcome: Option<String>,

    /// Rows admitted by the last successful pass
    #[serde(default)]
    pub last_admitted: Option<usize>,
}

fn default_schema_version() -> String {
    "1".to_string()
}

/// State manager for one state directory.
pub struct RunStateManager {
    state_dir: PathBuf,
    state: RunState,
}

impl RunStateManager {
    /// Load or create state in the given directory.
    pub fn load(state_dir: impl Into<PathBuf>) -> Result<Self> {
        let state_dir = state_dir.into();
        let state_path = state_dir.join(STATE_FILE);

        let state = if state_path.exists() {
            let content =
                std::fs::read_to_string(&state_path).context("Failed to read STATE.yaml")?;
            serde_yaml::from_str(&content).context("Failed to parse STATE.yaml")?
        } else {
            RunState {
                schema_version: default_schema_version(),
                ..RunState::default()
            }
        };

        Ok(Self { state_dir, state })
    }

    /// Default per-user state directory.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("changelogd")
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn path(&self) -> PathBuf {
        self.state_dir.join(STATE_FILE)
    }

    /// Save state to STATE.yaml.
    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.state_dir).context("Failed to create state directory")?;
        let content =
            serde_yaml::to_string(&self.state).context("Failed to serialize STATE.yaml")?;
        std::fs::write(self.path(), content).context("Failed to write STATE.yaml")?;
        Ok(())
    }

    /// Take the busy fence for a new pass.
    ///
    /// Fails with [`SyncError::Busy`] when a fresh fence is already held; a
    /// fence older than `stale_after` is treated as a leftover from a
    /// crashed pass and reclaimed.
    pub fn begin_pass(&mut self, stale_after: Duration) -> std::result::Result<(), SyncError> {
        if let Some(busy_since) = self.state.busy_since {
            let age = Utc::now().signed_duration_since(busy_since);
            let stale =
                chrono::Duration::from_std(stale_after).unwrap_or(chrono::Duration::MAX);
            if age < stale {
                return Err(SyncError::Busy {
                    started_at: busy_since.to_rfc3339(),
                });
            }
        }

        self.state.busy_since = Some(Utc::now());
        self.save().map_err(|e| SyncError::State(e.to_string()))
    }

    /// Release the fence and record how the pass went.
    pub fn finish_pass(&mut self, outcome: &str, admitted: Option<usize>) -> Result<()> {
        self.state.busy_since = None;
        self.state.last_run_at = Some(Utc::now());
        self.state.last_outcome = Some(outcome.to_string());
        if admitted.is_some() {
            self.state.last_admitted = admitted;
        }
        self.save()
    }
}
