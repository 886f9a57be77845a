//! The reconciliation pass: fetch -> filter -> format -> merge -> write.
//!
//! Admission is two-pass so the expensive manifest lookups only run for
//! candidates that already survived the free date filter. The head entry is
//! computed once from the pre-existing document and frozen for the whole
//! pass; every admission decision is made against that same baseline, which
//! keeps admitted rows mutually order-independent.

use crate::clients::{ChangeRequestSource, DocumentStore};
use crate::config::Settings;
use crate::error::{ApiError, Stage, SyncError};
use crate::models::{ChangeRequest, ReconcileOutcome, ReconciliationResult, TableEntry};
use crate::table;
use crate::version::{self, ManifestLookup};
use futures::future::join_all;
use std::time::Duration;
use tokio::time::timeout;

/// Run one full reconciliation pass and write the result back.
pub async fn reconcile(
    settings: &Settings,
    source: &dyn ChangeRequestSource,
    store: &dyn DocumentStore,
) -> Result<ReconcileOutcome, SyncError> {
    run_pass(settings, source, store, false).await
}

/// Run one full pass but skip the write.
pub async fn reconcile_dry_run(
    settings: &Settings,
    source: &dyn ChangeRequestSource,
    store: &dyn DocumentStore,
) -> Result<ReconcileOutcome, SyncError> {
    run_pass(settings, source, store, true).await
}

async fn run_pass(
    settings: &Settings,
    source: &dyn ChangeRequestSource,
    store: &dyn DocumentStore,
    dry_run: bool,
) -> Result<ReconcileOutcome, SyncError> {
    let owner = settings.github.owner.as_str();
    let repo = settings.github.repo.as_str();
    let branch = settings.github.branch.as_str();

    let candidates = source
        .list_closed(owner, repo, Some(branch))
        .await
        .map_err(|source| SyncError::Transport {
            stage: Stage::ListingCandidates,
            source,
        })?;

    // The listing may include closed-without-merge requests and, depending on
    // the host, requests against other branches; re-check both here.
    let candidates: Vec<ChangeRequest> = candidates
        .into_iter()
        .filter(|cr| cr.is_merged() && cr.base_branch == branch)
        .collect();

    let page = store
        .get_page(&settings.wiki.page_id)
        .await
        .map_err(|source| SyncError::Transport {
            stage: Stage::ReadingDocument,
            source,
        })?;

    let state = table::parse_changelog(&page.body);
    let head = state.head().cloned();

    let survivors = pass_one(candidates, &state);

    let lookup = ManifestLookup {
        source,
        owner,
        repo,
        path: &settings.sync.manifest_path,
    };
    let per_request = Duration::from_secs(settings.sync.request_timeout_secs);

    // Lookups are independent and run concurrently; decisions wait for all
    // of them and are then made sequentially against the frozen head.
    let extracted: Vec<(ChangeRequest, String)> = join_all(survivors.into_iter().map(|mut cr| {
        let lookup = &lookup;
        async move {
            let version = match timeout(per_request, version::extract_version(&mut cr, Some(lookup))).await {
                Ok(version) => version,
                // Timed-out manifest lookup degrades to the offline scan
                Err(_) => version::extract_version(&mut cr, None).await,
            };
            (cr, version)
        }
    }))
    .await;

    let mut admitted: Vec<(ChangeRequest, String)> = extracted
        .into_iter()
        .filter(|(_, version)| admits(version, head.as_ref()))
        .collect();

    // Append chronologically so the newest release lands last in the table
    admitted.sort_by_key(|(cr, _)| (cr.merged_at, cr.number));

    let rows: Vec<String> = admitted
        .iter()
        .map(|(cr, version)| table::format_row(cr, version))
        .collect();
    let summaries: Vec<String> = admitted
        .iter()
        .map(|(cr, version)| {
            let shown = if version.is_empty() {
                "(no version)"
            } else {
                version.as_str()
            };
            format!("#{} {}: {}", cr.number, shown, cr.title)
        })
        .collect();

    if rows.is_empty() || dry_run {
        return Ok(ReconcileOutcome {
            admitted: rows.len(),
            page_version: page.version,
            dry_run,
            summaries,
        });
    }

    let merged_body = table::merge_rows(&page.body, &rows);
    let updated = store
        .update_page(&page.id, &page.title, &merged_body, page.version + 1)
        .await
        .map_err(|err| match err {
            ApiError::Conflict { .. } => SyncError::Conflict {
                page_id: page.id.clone(),
                expected_version: page.version + 1,
            },
            other => SyncError::Transport {
                stage: Stage::WritingDocument,
                source: other,
            },
        })?;

    Ok(ReconcileOutcome {
        admitted: rows.len(),
        page_version: updated.version,
        dry_run: false,
        summaries,
    })
}

/// Pass 1: cheap, no I/O. Exact duplicates drop first; when the table has a
/// head, only candidates merged strictly after the head's release instant
/// stay in.
pub fn pass_one(
    candidates: Vec<ChangeRequest>,
    state: &ReconciliationResult,
) -> Vec<ChangeRequest> {
    candidates
        .into_iter()
        .filter(|cr| !state.contains_change_request(cr.number))
        .filter(|cr| match state.head() {
            Some(head) => cr
                .merged_at
                .map(|merged_at| merged_at > head.released_at)
                .unwrap_or(false),
            None => true,
        })
        .collect()
}

/// Pass 2 decision for one survivor. An empty extracted version admits
/// unconditionally (the date filter already passed it); a non-empty one must
/// beat the head version, unless the table has no head version at all.
pub fn admits(version: &str, head: Option<&TableEntry>) -> bool {
    if version.is_empty() {
        return true;
    }
    match head.map(|h| h.version.as_str()).filter(|v| !v.is_empty()) {
        Some(head_version) => version::is_newer(version, head_version),
        None => true,
    }
}
