//! External collaborators, specified at their interface boundary.
//!
//! The reconciliation core only sees these two traits; the reqwest-backed
//! implementations live in the submodules and the integration tests swap in
//! in-memory doubles.

pub mod github;
pub mod wiki;

pub use github::GithubClient;
pub use wiki::WikiClient;

use crate::error::ApiError;
use crate::models::{ChangeRequest, Page};
use async_trait::async_trait;

/// Source-control host holding the change requests.
#[async_trait]
pub trait ChangeRequestSource: Send + Sync {
    /// Closed change requests against the repository, most recently updated
    /// first. `base` restricts to requests targeting that branch.
    async fn list_closed(
        &self,
        owner: &str,
        repo: &str,
        base: Option<&str>,
    ) -> Result<Vec<ChangeRequest>, ApiError>;

    /// Full record for a single change request; unlike the listing, this
    /// includes the merger identity.
    async fn detail(&self, owner: &str, repo: &str, number: u64) -> Result<ChangeRequest, ApiError>;

    /// File contents at a commit. `Ok(None)` when the path does not exist at
    /// that ref; any other failure is an error.
    async fn file_at_ref(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<Vec<u8>>, ApiError>;
}

/// Wiki holding the changelog document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_page(&self, page_id: &str) -> Result<Page, ApiError>;

    /// Versioned write. `new_version` must be exactly the fetched version
    /// plus one; the store answers a concurrent update with
    /// [`ApiError::Conflict`].
    async fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        new_version: u64,
    ) -> Result<Page, ApiError>;
}
