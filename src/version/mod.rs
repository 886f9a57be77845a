//! Version ordering: total order over version strings.
//!
//! Valid semantic versions are compared with the semver crate (fully
//! compliant with Semantic Versioning 2.0.0, including pre-release
//! precedence). Everything else falls back to numeric component comparison,
//! so "1.2.3.4"-style and truncated "1.2"-style versions still order
//! sensibly. Empty or missing versions sort strictly oldest.

pub mod extract;

pub use extract::{extract_version, ManifestLookup};

use std::cmp::Ordering;

/// Compare two version strings.
///
/// Rules, in order:
/// - a non-empty version is newer than an empty one; two empties are equal
/// - both parse as semver: semver precedence decides
/// - otherwise: dot-separated numeric components left to right, missing
///   trailing components count as 0, non-numeric label text is ignored
pub fn compare(a: &str, b: &str) -> Ordering {
    let a = normalize(a);
    let b = normalize(b);

    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    if let (Ok(a_parsed), Ok(b_parsed)) = (semver::Version::parse(a), semver::Version::parse(b)) {
        return a_parsed.cmp(&b_parsed);
    }

    numeric_compare(a, b)
}

/// Whether `a` denotes a strictly newer release than `b`.
pub fn is_newer(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Greater
}

/// Drop surrounding whitespace and a leading 'v' prefix.
fn normalize(version: &str) -> &str {
    version.trim().trim_start_matches('v')
}

/// Component-wise numeric comparison for non-semver inputs.
fn numeric_compare(a: &str, b: &str) -> Ordering {
    let a_parts: Vec<u64> = a.split('.').map(leading_number).collect();
    let b_parts: Vec<u64> = b.split('.').map(leading_number).collect();

    let len = a_parts.len().max(b_parts.len());
    for i in 0..len {
        // Missing trailing components compare as 0, so "1.2" == "1.2.0"
        let a_component = a_parts.get(i).copied().unwrap_or(0);
        let b_component = b_parts.get(i).copied().unwrap_or(0);
        match a_component.cmp(&b_component) {
            Ordering::Equal => {}
            other => return other,
        }
    }

    Ordering::Equal
}

/// Leading digits of a component; label text like "3-rc1" reads as 3,
/// fully non-numeric components read as 0.
fn leading_number(part: &str) -> u64 {
    let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}
