//! Typed errors for a reconciliation pass.
//!
//! Fatal errors abort the pass with zero admitted rows and name the stage
//! that failed. Manifest lookups are the one deliberately non-fatal path:
//! their failures degrade inside the version extractor and never reach here.

use thiserror::Error;

/// External system an API error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum System {
    SourceControl,
    Wiki,
}

impl std::fmt::Display for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            System::SourceControl => write!(f, "source control"),
            System::Wiki => write!(f, "wiki"),
        }
    }
}

/// Stage of the pass a fatal transport error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ListingCandidates,
    ReadingDocument,
    WritingDocument,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::ListingCandidates => write!(f, "listing candidates"),
            Stage::ReadingDocument => write!(f, "reading document"),
            Stage::WritingDocument => write!(f, "writing document"),
        }
    }
}

/// Error from one of the HTTP collaborators.
///
/// 401, 403 and 404 get distinct variants so the operator message can say
/// "bad credential" vs "rate-limited" vs "wrong page id" instead of a bare
/// status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{system}: bad credential (HTTP 401)")]
    Unauthorized { system: System },

    #[error("{system}: forbidden or rate-limited (HTTP 403)")]
    Forbidden { system: System },

    #[error("{system}: {resource} not found (HTTP 404)")]
    NotFound { system: System, resource: String },

    #[error("{system}: version conflict (HTTP 409)")]
    Conflict { system: System },

    #[error("{system}: unexpected HTTP {status}")]
    Status { system: System, status: u16 },

    #[error("{system}: request timed out")]
    Timeout { system: System },

    #[error("{system}: network error: {message}")]
    Network { system: System, message: String },

    #[error("{system}: malformed response: {message}")]
    Decode { system: System, message: String },
}

impl ApiError {
    /// Map a non-2xx HTTP status to the matching variant.
    pub fn from_status(system: System, status: u16, resource: &str) -> Self {
        match status {
            401 => ApiError::Unauthorized { system },
            403 => ApiError::Forbidden { system },
            404 => ApiError::NotFound {
                system,
                resource: resource.to_string(),
            },
            409 => ApiError::Conflict { system },
            _ => ApiError::Status { system, status },
        }
    }

    /// Wrap a reqwest transport failure.
    pub fn from_request(system: System, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout { system }
        } else if err.is_decode() {
            ApiError::Decode {
                system,
                message: err.to_string(),
            }
        } else {
            ApiError::Network {
                system,
                message: err.to_string(),
            }
        }
    }
}

/// Fatal outcome of a reconciliation pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Required identifier or credential missing; raised before any network call.
    #[error("configuration: {0}")]
    Config(String),

    /// Another pass holds the run fence.
    #[error("another sync started at {started_at} is still running")]
    Busy { started_at: String },

    /// A fatal fetch or write failed. Names the stage and the underlying status.
    #[error("{stage} failed: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: ApiError,
    },

    /// The page moved under us between read and write. Not retried.
    #[error("page {page_id} was changed by another writer (expected version {expected_version})")]
    Conflict { page_id: String, expected_version: u64 },

    /// Run-state file could not be read or written.
    #[error("run state: {0}")]
    State(String),
}
