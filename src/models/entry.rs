use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// One reconcilable row recovered from the document's changelog table.
///
/// Ephemeral: built by the table parser for a single pass and thrown away.
/// The document itself is the durable state.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    /// Version string as found in the version cell (possibly empty)
    pub version: String,

    /// Release-date cell content, verbatim
    pub released_raw: String,

    /// Parsed release instant
    pub released_at: DateTime<Utc>,

    /// Pull request number recovered from the reference cell, if any
    pub change_request: Option<u64>,
}

/// Parsed table state for one reconciliation pass.
///
/// Entries are sorted descending by release instant, ties broken by
/// descending version, so the first entry is the head. The head is computed
/// once per pass and never advanced while candidates are admitted.
///
/// `referenced_numbers` covers every data row, including rows that did not
/// qualify as entries (missing version or unparseable date): a row written
/// for a version-less change request must still suppress that number on the
/// next pass.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationResult {
    pub entries: Vec<TableEntry>,

    /// Change-request numbers found in any data row's reference cell
    pub referenced_numbers: BTreeSet<u64>,
}

impl ReconciliationResult {
    /// Most recently released entry, if the table had any reconcilable rows.
    pub fn head(&self) -> Option<&TableEntry> {
        self.entries.first()
    }

    /// Whether any data row already references the given pull request number.
    pub fn contains_change_request(&self, number: u64) -> bool {
        self.referenced_numbers.contains(&number)
            || self.entries.iter().any(|e| e.change_request == Some(number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(version: &str, number: Option<u64>) -> TableEntry {
        TableEntry {
            version: version.to_string(),
            released_raw: "2024-01-01".to_string(),
            released_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            change_request: number,
        }
    }

    #[test]
    fn test_head_is_first_entry() {
        let result = ReconciliationResult {
            entries: vec![entry("2.0.0", Some(10)), entry("1.0.0", Some(5))],
            ..Default::default()
        };
        assert_eq!(result.head().unwrap().version, "2.0.0");
        assert!(ReconciliationResult::default().head().is_none());
    }

    #[test]
    fn test_contains_change_request() {
        let result = ReconciliationResult {
            entries: vec![entry("1.0.0", Some(5)), entry("0.9.0", None)],
            referenced_numbers: BTreeSet::from([5, 17]),
        };
        assert!(result.contains_change_request(5));
        // Rows excluded from entries still suppress their number
        assert!(result.contains_change_request(17));
        assert!(!result.contains_change_request(6));
    }
}
