//! Table merging: splice freshly formatted rows into the document.
//!
//! The document is never rebuilt from the parse tree. New rows are inserted
//! into the original string at a byte offset taken from the tree, so all
//! existing content, table rows included, is preserved exactly.

use crate::markup;

use super::{HEADER_ROW, SECTION_HEADING};

/// Insert the formatted rows before the closing boundary of the first table,
/// or synthesize a table when the document has none. With zero rows the
/// input comes back unchanged.
pub fn merge_rows(body: &str, rows: &[String]) -> String {
    if rows.is_empty() {
        return body.to_string();
    }
    let added = rows.concat();

    let nodes = markup::parse_fragment(body);
    if let Some(table) = markup::find_first(&nodes, "table") {
        let insert_at = table
            .find_first("tbody")
            .map(|tbody| tbody.content_end)
            .unwrap_or(table.content_end);

        let mut out = String::with_capacity(body.len() + added.len());
        out.push_str(&body[..insert_at]);
        out.push_str(&added);
        out.push_str(&body[insert_at..]);
        return out;
    }

    let mut out = String::with_capacity(body.len() + added.len() + 128);
    out.push_str(body);
    out.push_str(SECTION_HEADING);
    out.push_str("<table><tbody>");
    out.push_str(HEADER_ROW);
    out.push_str(&added);
    out.push_str("</tbody></table>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW_A: &str = "<tr><td>Release</td><td><h3>1.1.0</h3></td><td>#11</td><td>a</td><td>d</td><td>s</td><td><time datetime=\"2024-02-01\" /></td><td></td></tr>";
    const ROW_B: &str = "<tr><td>Release</td><td><h3>1.2.0</h3></td><td>#12</td><td>a</td><td>d</td><td>s</td><td><time datetime=\"2024-03-01\" /></td><td></td></tr>";

    #[test]
    fn test_zero_rows_is_byte_identical() {
        let body = "<p>intro</p>\n<table><tbody><tr><td>x</td></tr></tbody></table>\n<p>outro</p>";
        assert_eq!(merge_rows(body, &[]), body);
    }

    #[test]
    fn test_rows_inserted_before_tbody_close() {
        let body = "<p>intro</p><table><tbody><tr><th>h</th></tr></tbody></table><p>outro</p>";
        let merged = merge_rows(body, &[ROW_A.to_string(), ROW_B.to_string()]);

        let expected = format!(
            "<p>intro</p><table><tbody><tr><th>h</th></tr>{ROW_A}{ROW_B}</tbody></table><p>outro</p>"
        );
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_table_without_tbody_uses_table_close() {
        let body = "<table><tr><th>h</th></tr></table>";
        let merged = merge_rows(body, &[ROW_A.to_string()]);
        assert_eq!(merged, format!("<table><tr><th>h</th></tr>{ROW_A}</table>"));
    }

    #[test]
    fn test_synthesizes_table_when_none_exists() {
        let body = "<p>release notes live here</p>";
        let merged = merge_rows(body, &[ROW_A.to_string()]);

        assert!(merged.starts_with(body));
        assert!(merged.contains(SECTION_HEADING));
        assert!(merged.contains(HEADER_ROW));
        assert!(merged.contains(ROW_A));
        assert!(merged.ends_with("</tbody></table>"));
    }

    #[test]
    fn test_existing_rows_and_surroundings_survive_merge() {
        let body = format!("<h1>Changelog</h1><table><tbody>{HEADER_ROW}{ROW_A}</tbody></table><p>footer</p>");
        let merged = merge_rows(&body, &[ROW_B.to_string()]);

        assert!(merged.starts_with("<h1>Changelog</h1>"));
        assert!(merged.ends_with("<p>footer</p>"));
        let a_at = merged.find(ROW_A).unwrap();
        let b_at = merged.find(ROW_B).unwrap();
        assert!(a_at < b_at, "new row appended after existing rows");
    }
}
