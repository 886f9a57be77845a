use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A merge proposal fetched from the source-control host.
///
/// Read-only to the reconciliation core, with one exception: the version
/// extractor may fill in `merged_by` when the detail endpoint is consulted
/// anyway. That enrichment is idempotent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeRequest {
    /// Pull request number, unique per repository
    pub number: u64,

    /// Title line
    pub title: String,

    /// Free-text description, if any
    #[serde(default)]
    pub body: Option<String>,

    /// Login of the author
    pub author: String,

    /// Login of whoever merged it (detail endpoint only)
    #[serde(default)]
    pub merged_by: Option<String>,

    /// Merge timestamp; present iff the request was merged
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,

    /// Target branch the request was merged into
    pub base_branch: String,

    /// Head commit of the request's branch
    pub head_sha: String,

    /// Merge commit created on the target branch, if any
    #[serde(default)]
    pub merge_commit_sha: Option<String>,

    /// Web URL of the request
    pub html_url: String,
}

impl ChangeRequest {
    pub fn new(number: u64, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            body: None,
            author: author.into(),
            merged_by: None,
            merged_at: None,
            base_branch: "main".to_string(),
            head_sha: String::new(),
            merge_commit_sha: None,
            html_url: String::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_merged_at(mut self, merged_at: DateTime<Utc>) -> Self {
        self.merged_at = Some(merged_at);
        self
    }

    pub fn with_merged_by(mut self, merged_by: impl Into<String>) -> Self {
        self.merged_by = Some(merged_by.into());
        self
    }

    pub fn with_base_branch(mut self, branch: impl Into<String>) -> Self {
        self.base_branch = branch.into();
        self
    }

    pub fn with_head_sha(mut self, sha: impl Into<String>) -> Self {
        self.head_sha = sha.into();
        self
    }

    pub fn with_merge_commit_sha(mut self, sha: impl Into<String>) -> Self {
        self.merge_commit_sha = Some(sha.into());
        self
    }

    pub fn with_html_url(mut self, url: impl Into<String>) -> Self {
        self.html_url = url.into();
        self
    }

    /// Whether the request was actually merged (closed-without-merge has no timestamp).
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    /// Commit to fetch the manifest at: the merge commit, or the head commit
    /// when the host recorded no merge commit.
    pub fn manifest_ref(&self) -> &str {
        self.merge_commit_sha.as_deref().unwrap_or(&self.head_sha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_is_merged_requires_timestamp() {
        let cr = ChangeRequest::new(7, "Fix typo", "alice");
        assert!(!cr.is_merged());

        let merged = cr.with_merged_at(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert!(merged.is_merged());
    }

    #[test]
    fn test_manifest_ref_prefers_merge_commit() {
        let cr = ChangeRequest::new(7, "Fix typo", "alice")
            .with_head_sha("feedface")
            .with_merge_commit_sha("cafebabe");
        assert_eq!(cr.manifest_ref(), "cafebabe");

        let cr = ChangeRequest::new(8, "Fix typo", "alice").with_head_sha("feedface");
        assert_eq!(cr.manifest_ref(), "feedface");
    }
}
