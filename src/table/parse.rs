//! Table parsing: document body -> reconciliation state.
//!
//! Only the first table of the document is considered. Rows that lack a
//! version or a parseable release date stay untouched in the document but
//! are excluded from reconciliation state; their reference cell is still
//! scanned so the change-request number keeps suppressing duplicates.

use crate::dates;
use crate::markup::{self, Element};
use crate::models::{ReconciliationResult, TableEntry};
use crate::version;
use regex::Regex;
use std::collections::BTreeSet;

use super::{COL_REFERENCE, COL_RELEASED, COL_VERSION};

/// Extract reconcilable entries from the first table in the document.
///
/// Entries come back sorted descending by release instant, ties broken by
/// descending version; the first entry is the head.
pub fn parse_changelog(body: &str) -> ReconciliationResult {
    let nodes = markup::parse_fragment(body);
    let Some(table) = markup::find_first(&nodes, "table") else {
        return ReconciliationResult::default();
    };

    let mut entries = Vec::new();
    let mut referenced_numbers = BTreeSet::new();

    for row in table.find_all("tr") {
        if !row.find_all("th").is_empty() {
            continue; // header row
        }

        let cells: Vec<&Element> = row
            .child_elements()
            .into_iter()
            .filter(|el| el.tag == "td")
            .collect();

        let number = cells
            .get(COL_REFERENCE)
            .and_then(|cell| reference_number(&cell.text()));
        if let Some(number) = number {
            referenced_numbers.insert(number);
        }

        let version = match cells.get(COL_VERSION) {
            Some(cell) => version_cell_text(cell),
            None => continue,
        };
        let released_raw = match cells.get(COL_RELEASED) {
            Some(cell) => date_cell_text(cell),
            None => continue,
        };
        if version.is_empty() || released_raw.is_empty() {
            continue;
        }
        let Some(released_at) = dates::parse_release_date(&released_raw) else {
            continue;
        };

        entries.push(TableEntry {
            version,
            released_raw,
            released_at,
            change_request: number,
        });
    }

    entries.sort_by(|a, b| {
        b.released_at
            .cmp(&a.released_at)
            .then_with(|| version::compare(&b.version, &a.version))
    });

    ReconciliationResult {
        entries,
        referenced_numbers,
    }
}

/// Version cells are often wrapped in a heading; strip that before falling
/// back to generic tag-stripping.
fn version_cell_text(cell: &Element) -> String {
    for level in ["h1", "h2", "h3", "h4", "h5", "h6"] {
        if let Some(heading) = cell.find_first(level) {
            return heading.text();
        }
    }
    cell.text()
}

/// Date cells written by this tool carry a `<time datetime="...">` token;
/// hand-written ones are free text.
fn date_cell_text(cell: &Element) -> String {
    if let Some(time) = cell.find_first("time") {
        if let Some(datetime) = time.attr("datetime") {
            let datetime = datetime.trim();
            if !datetime.is_empty() {
                return datetime.to_string();
            }
        }
        let inner = time.text();
        if !inner.is_empty() {
            return inner;
        }
    }
    cell.text()
}

/// First `#<digits>` token in the reference cell.
fn reference_number(text: &str) -> Option<u64> {
    let pattern = Regex::new(r"#(\d+)").ok()?;
    pattern.captures(text)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row(version: &str, reference: &str, released: &str) -> String {
        format!(
            "<tr><td>Release</td><td>{version}</td><td>{reference}</td><td>alice</td>\
             <td>desc</td><td>Published</td><td>{released}</td><td></td></tr>"
        )
    }

    fn doc(rows: &[String]) -> String {
        format!(
            "<p>intro</p><table><tbody>{}{}</tbody></table>",
            super::super::HEADER_ROW,
            rows.concat()
        )
    }

    #[test]
    fn test_parses_entries_and_head() {
        let body = doc(&[
            row("<h3>1.0.0</h3>", "#10", "2024-01-01"),
            row("<h3>1.1.0</h3>", "#11", "2024-02-01"),
        ]);
        let state = parse_changelog(&body);

        assert_eq!(state.entries.len(), 2);
        let head = state.head().unwrap();
        assert_eq!(head.version, "1.1.0");
        assert_eq!(head.change_request, Some(11));
        assert_eq!(
            head.released_at,
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_header_row_is_ignored() {
        let body = doc(&[row("2.0", "#1", "2024-01-01")]);
        let state = parse_changelog(&body);
        assert_eq!(state.entries.len(), 1);
    }

    #[test]
    fn test_time_wrapper_and_heading_wrapper_are_stripped() {
        let body = doc(&[row(
            "<h2>3.4.5</h2>",
            r##"<a href="https://example.com/pr/42">#42</a>"##,
            r#"<time datetime="2024-03-01" />"#,
        )]);
        let state = parse_changelog(&body);

        let head = state.head().unwrap();
        assert_eq!(head.version, "3.4.5");
        assert_eq!(head.released_raw, "2024-03-01");
        assert_eq!(head.change_request, Some(42));
    }

    #[test]
    fn test_rows_without_version_or_date_are_excluded_but_still_referenced() {
        let body = doc(&[
            row("", "#7", "2024-01-01"),
            row("1.0", "#8", ""),
            row("1.1", "#9", "not a date"),
            row("1.2", "#10", "2024-04-01"),
        ]);
        let state = parse_changelog(&body);

        assert_eq!(state.entries.len(), 1);
        assert_eq!(state.head().unwrap().change_request, Some(10));
        for number in [7, 8, 9, 10] {
            assert!(state.contains_change_request(number), "#{number}");
        }
    }

    #[test]
    fn test_date_tie_breaks_by_version() {
        let body = doc(&[
            row("1.0.1", "#1", "2024-01-01"),
            row("1.0.2", "#2", "2024-01-01"),
        ]);
        let state = parse_changelog(&body);
        assert_eq!(state.head().unwrap().version, "1.0.2");
    }

    #[test]
    fn test_document_without_table_is_empty_state() {
        let state = parse_changelog("<p>nothing here yet</p>");
        assert!(state.entries.is_empty());
        assert!(state.head().is_none());
    }

    #[test]
    fn test_only_first_table_is_considered() {
        let first = doc(&[row("1.0", "#1", "2024-01-01")]);
        let body = format!(
            "{first}<table><tbody>{}</tbody></table>",
            row("9.9", "#99", "2030-01-01")
        );
        let state = parse_changelog(&body);

        assert_eq!(state.entries.len(), 1);
        assert_eq!(state.head().unwrap().version, "1.0");
    }
}
