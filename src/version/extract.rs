//! Version extraction for one change request.
//!
//! An ordered list of fallible strategies; the first success wins and a
//! failure inside one strategy never propagates past its boundary:
//! 1. manifest fetched at the merge commit (head commit when none exists)
//! 2. pattern scan of the title, then the body
//! 3. empty string

use crate::clients::ChangeRequestSource;
use crate::models::ChangeRequest;
use regex::Regex;

/// The manifest-fetch capability, bundled so the extractor takes a single
/// optional argument. Absent in offline contexts and in most unit tests.
pub struct ManifestLookup<'a> {
    pub source: &'a dyn ChangeRequestSource,
    pub owner: &'a str,
    pub repo: &'a str,
    /// Repository path of the manifest, e.g. "package.json"
    pub path: &'a str,
}

/// Derive a version string for the change request. Returns the empty string
/// when no strategy produces one.
///
/// When a manifest lookup is supplied, the change request is also enriched
/// with the merger identity from the detail endpoint (the call is made
/// anyway, so this saves a second round trip later). The enrichment is
/// idempotent: an already-known merger is never overwritten.
pub async fn extract_version(
    cr: &mut ChangeRequest,
    manifest: Option<&ManifestLookup<'_>>,
) -> String {
    if let Some(lookup) = manifest {
        if let Some(version) = from_manifest(cr, lookup).await {
            return version;
        }
    }

    if let Some(version) = from_text(&cr.title) {
        return version;
    }
    if let Some(version) = cr.body.as_deref().and_then(from_text) {
        return version;
    }

    String::new()
}

/// Strategy 1: declared version field of the manifest at the merge commit.
///
/// Every failure mode here (network error, missing file, malformed JSON,
/// missing field) answers `None` and the caller falls through to the text
/// scan.
async fn from_manifest(cr: &mut ChangeRequest, lookup: &ManifestLookup<'_>) -> Option<String> {
    if cr.merged_by.is_none() {
        if let Ok(detail) = lookup.source.detail(lookup.owner, lookup.repo, cr.number).await {
            cr.merged_by = detail.merged_by;
        }
    }

    let bytes = lookup
        .source
        .file_at_ref(lookup.owner, lookup.repo, lookup.path, cr.manifest_ref())
        .await
        .ok()??;

    let manifest: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let version = manifest.get("version")?.as_str()?.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.trim_start_matches('v').to_string())
    }
}

/// Strategy 2: scan free text for an optional `v`/`version` prefix followed
/// by MAJOR.MINOR[.PATCH][-PRERELEASE]. The prefix is not part of the result.
fn from_text(text: &str) -> Option<String> {
    let pattern = Regex::new(
        r"(?i)\b(?:(?:v|version)[\s:]*)?(\d+\.\d+(?:\.\d+)?(?:-[0-9a-z][0-9a-z.-]*)?)\b",
    )
    .ok()?;
    pattern.captures(text).map(|cap| cap[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_from_text_variants() {
        assert_eq!(from_text("Release v1.2.3: add x"), Some("1.2.3".to_string()));
        assert_eq!(from_text("bump to 2.0"), Some("2.0".to_string()));
        assert_eq!(from_text("Version: 1.4.0-rc.2"), Some("1.4.0-rc.2".to_string()));
        assert_eq!(from_text("fix login timeout"), None);
        assert_eq!(from_text(""), None);
    }

    /// Source double: counts detail calls, serves a fixed manifest.
    struct FakeSource {
        manifest: Option<Vec<u8>>,
        manifest_fails: bool,
        detail_calls: AtomicUsize,
    }

    impl FakeSource {
        fn with_manifest(json: &str) -> Self {
            Self {
                manifest: Some(json.as_bytes().to_vec()),
                manifest_fails: false,
                detail_calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                manifest: None,
                manifest_fails: true,
                detail_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChangeRequestSource for FakeSource {
        async fn list_closed(
            &self,
            _owner: &str,
            _repo: &str,
            _base: Option<&str>,
        ) -> Result<Vec<ChangeRequest>, ApiError> {
            Ok(Vec::new())
        }

        async fn detail(
            &self,
            _owner: &str,
            _repo: &str,
            number: u64,
        ) -> Result<ChangeRequest, ApiError> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            Ok(ChangeRequest::new(number, "detail", "alice").with_merged_by("bob"))
        }

        async fn file_at_ref(
            &self,
            _owner: &str,
            _repo: &str,
            _path: &str,
            _git_ref: &str,
        ) -> Result<Option<Vec<u8>>, ApiError> {
            if self.manifest_fails {
                return Err(ApiError::Timeout {
                    system: crate::error::System::SourceControl,
                });
            }
            Ok(self.manifest.clone())
        }
    }

    fn lookup<'a>(source: &'a FakeSource) -> ManifestLookup<'a> {
        ManifestLookup {
            source,
            owner: "acme",
            repo: "widget",
            path: "package.json",
        }
    }

    #[tokio::test]
    async fn test_manifest_version_wins_over_title() {
        let source = FakeSource::with_manifest(r#"{"version": "3.1.4"}"#);
        let mut cr = ChangeRequest::new(42, "Release v1.2.3", "alice").with_head_sha("abc");

        let version = extract_version(&mut cr, Some(&lookup(&source))).await;
        assert_eq!(version, "3.1.4");
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_title_scan() {
        let source = FakeSource::failing();
        let mut cr = ChangeRequest::new(42, "Release v1.2.3", "alice").with_head_sha("abc");

        let version = extract_version(&mut cr, Some(&lookup(&source))).await;
        assert_eq!(version, "1.2.3");
    }

    #[tokio::test]
    async fn test_malformed_manifest_degrades_to_body_scan() {
        let source = FakeSource::with_manifest("not json at all");
        let mut cr = ChangeRequest::new(42, "fix login", "alice")
            .with_head_sha("abc")
            .with_body("bump to version 2.5.0");

        let version = extract_version(&mut cr, Some(&lookup(&source))).await;
        assert_eq!(version, "2.5.0");
    }

    #[tokio::test]
    async fn test_no_strategy_yields_empty() {
        let mut cr = ChangeRequest::new(42, "fix login", "alice");
        let version = extract_version(&mut cr, None).await;
        assert_eq!(version, "");
    }

    #[tokio::test]
    async fn test_enrichment_fills_merger_and_is_idempotent() {
        let source = FakeSource::with_manifest(r#"{"version": "3.1.4"}"#);
        let mut cr = ChangeRequest::new(42, "Release", "alice").with_head_sha("abc");

        extract_version(&mut cr, Some(&lookup(&source))).await;
        assert_eq!(cr.merged_by.as_deref(), Some("bob"));
        assert_eq!(source.detail_calls.load(Ordering::SeqCst), 1);

        // Second run: merger already known, no extra round trip, same record
        let before = cr.clone();
        extract_version(&mut cr, Some(&lookup(&source))).await;
        assert_eq!(cr, before);
        assert_eq!(source.detail_calls.load(Ordering::SeqCst), 1);
    }
}
