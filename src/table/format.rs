//! Row formatting: one admitted change request -> row markup.
//!
//! The template is deterministic so a later parse of our own output recovers
//! the same number and version. The release date is emitted as a
//! machine-readable `<time datetime>` token, never free text.

use crate::markup::escape;
use crate::models::ChangeRequest;
use regex::Regex;

/// Fixed indicator for the status column.
const STATUS_PUBLISHED: &str = "\u{2705} Published";

/// Render the change request and its derived version as one table row.
pub fn format_row(cr: &ChangeRequest, version: &str) -> String {
    let reference = if cr.html_url.is_empty() {
        format!("#{}", cr.number)
    } else {
        format!(r#"<a href="{}">#{}</a>"#, escape(&cr.html_url), cr.number)
    };

    let released = cr
        .merged_at
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let artifact = artifact_link(cr.body.as_deref().unwrap_or(""))
        .map(|url| format!(r#"<a href="{}">build</a>"#, escape(&url)))
        .unwrap_or_default();

    format!(
        "<tr><td>Release</td><td><h3>{}</h3></td><td>{}</td><td>{}</td><td>{}</td>\
         <td>{}</td><td><time datetime=\"{}\" /></td><td>{}</td></tr>",
        escape(version),
        reference,
        attribution(cr),
        escape(&cr.title),
        STATUS_PUBLISHED,
        released,
        artifact,
    )
}

/// Attribution cell: author, plus the merger when known and different.
fn attribution(cr: &ChangeRequest) -> String {
    match cr.merged_by.as_deref() {
        Some(merger) if merger == cr.author => {
            format!("authored and merged by {}", escape(&cr.author))
        }
        Some(merger) => format!("{}, merged by {}", escape(&cr.author), escape(merger)),
        None => escape(&cr.author),
    }
}

/// Labeled artifact link in the body: `artifact|build|release` + `link|url:`
/// followed by a URL token.
fn artifact_link(body: &str) -> Option<String> {
    let pattern =
        Regex::new(r"(?i)\b(?:artifact|build|release)[ _-]?(?:link|url)\s*:\s*(\S+)").ok()?;
    let url = pattern.captures(body)?.get(1)?.as_str();
    let url = url.trim_end_matches(['.', ',', ')', ']', ';']);
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url.to_string())
    } else {
        None
    }
}
