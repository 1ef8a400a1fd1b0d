//! Table file writer
//!
//! Only present edges are written, so absent pairs created while browsing the grid never reach
//! the file.

use crate::error::{TraceError, TraceResult};
use crate::table::TableDocument;

/// Banner written on the first line when no other banner is configured
pub const DEFAULT_BANNER: &str = "' list files";

/// Renders a document in table file format.
///
/// Fails with [`TraceError::UnrepresentableKey`] when a present edge has a key the table parser
/// could not read back, so nothing is written in place of that edge.
pub fn serialize_table(document: &TableDocument, banner: &str) -> TraceResult<String> {
    let mut output = String::new();

    output.push_str(banner.trim_end_matches(['\r', '\n']));
    output.push('\n');

    for group in &document.groups {
        output.push_str(&format!("' {}\n", group.file_name));
    }

    output.push('\n');

    for (row_key, col_key, value) in document.matrix.present_edges() {
        check_key(row_key)?;
        check_key(col_key)?;
        output.push_str(&format!(
            "{} --> {} ' {}\n",
            row_key,
            col_key,
            single_line(&value.description)
        ));
    }

    Ok(output)
}

/// Arrow endpoints are single-space separated `file:id` tokens ahead of the `'` description
fn check_key(key: &str) -> TraceResult<()> {
    let unrepresentable = |reason: &str| TraceError::UnrepresentableKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    match key.split_once(':') {
        Some((file, _)) if !file.is_empty() => {}
        _ => return Err(unrepresentable("not of the form file:id")),
    }
    if key.chars().any(char::is_whitespace) {
        return Err(unrepresentable("contains whitespace"));
    }
    if key.contains('\'') {
        return Err(unrepresentable("contains a quote"));
    }

    Ok(())
}

/// Collapses every line break sequence into a single space
fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}
