use serde::{Deserialize, Serialize};

/// A wiki page as returned by the document store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// Page identifier
    pub id: String,

    /// Page title, written back unchanged
    pub title: String,

    /// Storage-format body markup
    pub body: String,

    /// Monotonic version number used for the optimistic write check
    pub version: u64,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconcileOutcome {
    /// Number of candidate change requests admitted and written
    pub admitted: usize,

    /// Page version after the pass (unchanged when nothing was admitted)
    pub page_version: u64,

    /// True when the pass skipped the write
    pub dry_run: bool,

    /// One line per admitted request, in the order the rows were appended
    #[serde(default)]
    pub summaries: Vec<String>,
}
