//! Table files
//!
//! A table file names the list files whose elements form the matrix axes and then lists the
//! present edges between those elements:
//!
//! ```text
//! ' list files
//! 'x.list
//! 'y.list
//!
//! x.list:1 --> y.list:2 ' description
//! y.list:3 <-- x.list:1 ' reversed arrow
//! ```

use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::error::{TraceError, TraceResult};
use crate::list::{parse_list, HeaderElement};
use crate::matrix::{Mark, Matrix};
use crate::storage::FileStore;

/// Elements of one list file plus their collapse state on each axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderGroup {
    pub file_name: String,
    pub elements: Vec<HeaderElement>,
    pub is_row_expanded: bool,
    pub is_col_expanded: bool,
}

impl HeaderGroup {
    /// Creates a group expanded on both axes
    pub fn new(file_name: impl Into<String>, elements: Vec<HeaderElement>) -> Self {
        Self {
            file_name: file_name.into(),
            elements,
            is_row_expanded: true,
            is_col_expanded: true,
        }
    }

    /// Number of grid rows this group occupies
    pub fn row_span(&self) -> usize {
        if self.is_row_expanded {
            self.elements.len()
        } else {
            1
        }
    }

    /// Number of grid columns this group occupies
    pub fn col_span(&self) -> usize {
        if self.is_col_expanded {
            self.elements.len()
        } else {
            1
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.elements.iter().any(|e| e.matrix_key() == key)
    }
}

/// A loaded table: its path, its groups in declaration order and its matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDocument {
    pub file_path: PathBuf,
    pub groups: Vec<HeaderGroup>,
    pub matrix: Matrix,
}

impl TableDocument {
    pub fn new(file_path: impl Into<PathBuf>, groups: Vec<HeaderGroup>, matrix: Matrix) -> Self {
        Self {
            file_path: file_path.into(),
            groups,
            matrix,
        }
    }

    /// List file names in declaration order
    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.file_name.clone()).collect()
    }

    pub fn group(&self, file_name: &str) -> Option<&HeaderGroup> {
        self.groups.iter().find(|g| g.file_name == file_name)
    }

    fn group_mut(&mut self, file_name: &str) -> TraceResult<&mut HeaderGroup> {
        self.groups
            .iter_mut()
            .find(|g| g.file_name == file_name)
            .ok_or_else(|| TraceError::UnknownGroup(file_name.to_string()))
    }

    /// Flips the row expand flag of a group, returning the new state
    pub fn toggle_row(&mut self, file_name: &str) -> TraceResult<bool> {
        let group = self.group_mut(file_name)?;
        group.is_row_expanded = !group.is_row_expanded;
        Ok(group.is_row_expanded)
    }

    /// Flips the column expand flag of a group, returning the new state
    pub fn toggle_col(&mut self, file_name: &str) -> TraceResult<bool> {
        let group = self.group_mut(file_name)?;
        group.is_col_expanded = !group.is_col_expanded;
        Ok(group.is_col_expanded)
    }

    /// Finds the element with the given matrix key in any group
    pub fn element(&self, key: &str) -> Option<&HeaderElement> {
        self.groups
            .iter()
            .flat_map(|g| g.elements.iter())
            .find(|e| e.matrix_key() == key)
    }

    /// Matrix keys with present edges that no group declares; they are kept but never displayed
    pub fn orphaned_keys(&self) -> Vec<String> {
        let mut orphans: Vec<String> = self
            .matrix
            .present_edges()
            .flat_map(|(row, col, _)| [row, col])
            .filter(|key| !self.groups.iter().any(|g| g.contains_key(key)))
            .map(str::to_string)
            .collect();
        orphans.sort();
        orphans.dedup();
        orphans
    }
}

/// Outcome of parsing a table file: the document plus any skipped lines
#[derive(Debug)]
pub struct TableParse {
    pub document: TableDocument,
    /// `MalformedArrowLine` errors for lines that were skipped
    pub warnings: Vec<TraceError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    SkipInitialLine,
    ReadFileName,
    ReadArrow,
}

#[derive(Debug, PartialEq, Eq)]
struct Arrow {
    from: String,
    to: String,
    description: String,
}

/// Loads and parses one list file named in a table, resolved next to the table file
pub fn load_group(store: &dyn FileStore, table_path: &Path, name: &str) -> TraceResult<HeaderGroup> {
    let dir = store.directory_of(table_path);
    let list_path = store.join_path(&dir, name);

    let text = store.read_file(&list_path).map_err(|e| match e {
        TraceError::Io { path, source } => TraceError::UnresolvedListReference {
            name: name.to_string(),
            path,
            source,
        },
        other => other,
    })?;

    let elements = parse_list(name, &text);
    debug!("loaded {} elements from {:?}", elements.len(), list_path);
    Ok(HeaderGroup::new(name, elements))
}

/// Parses table file text, loading every referenced list file through `store`.
///
/// Fails as a whole if any list file cannot be loaded. Malformed arrow lines are skipped and
/// returned as warnings.
pub fn parse_table(file_path: &Path, text: &str, store: &dyn FileStore) -> TraceResult<TableParse> {
    let mut groups: Vec<HeaderGroup> = Vec::new();
    let mut matrix = Matrix::new();
    let mut warnings = Vec::new();

    let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
    let mut state = ReadState::SkipInitialLine;
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        match state {
            ReadState::SkipInitialLine => {
                state = ReadState::ReadFileName;
                index += 1;
            }
            ReadState::ReadFileName => {
                let Some(rest) = line.strip_prefix('\'') else {
                    // Re-examine this line as an arrow
                    state = ReadState::ReadArrow;
                    continue;
                };

                let group = load_group(store, file_path, rest.trim())?;
                match groups.iter_mut().find(|g| g.file_name == group.file_name) {
                    Some(existing) => *existing = group,
                    None => groups.push(group),
                }
                index += 1;
            }
            ReadState::ReadArrow => {
                match parse_arrow(line, index + 1) {
                    Ok(Some(arrow)) => {
                        matrix.register_arrow(&arrow.from, &arrow.to, Mark::Present, arrow.description)
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("{}: {}", file_path.display(), e);
                        warnings.push(e);
                    }
                }
                index += 1;
            }
        }
    }

    debug!(
        "parsed {:?}: {} groups, {} edges, {} warnings",
        file_path,
        groups.len(),
        matrix.present_count(),
        warnings.len()
    );

    Ok(TableParse {
        document: TableDocument::new(file_path, groups, matrix),
        warnings,
    })
}

fn parse_arrow(line: &str, line_no: usize) -> TraceResult<Option<Arrow>> {
    if !line.contains(" --> ") && !line.contains(" <-- ") {
        return Ok(None);
    }

    let malformed = |reason: &str| TraceError::MalformedArrowLine {
        line_no,
        line: line.to_string(),
        reason: reason.to_string(),
    };

    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() < 3 {
        return Err(malformed("expected `left operator right`"));
    }

    let left = split_endpoint(tokens[0]).ok_or_else(|| malformed("left side is not file:id"))?;
    let right = split_endpoint(tokens[2]).ok_or_else(|| malformed("right side is not file:id"))?;

    let description = extract_description(line);

    let (from, to) = match tokens[1] {
        "-->" => (left, right),
        "<--" => (right, left),
        _ => return Err(malformed("operator must be separated by single spaces")),
    };

    Ok(Some(Arrow {
        from,
        to,
        description,
    }))
}

/// Text after the last `'` of the line, trimmed.
///
/// A description wrapped in quotes (`'causes'`) leaves nothing after the closing quote; the
/// quoted text is used instead.
fn extract_description(line: &str) -> String {
    let Some(last) = line.rfind('\'') else {
        return String::new();
    };

    let tail = line[last + 1..].trim();
    if !tail.is_empty() {
        return tail.to_string();
    }

    match line[..last].rfind('\'') {
        Some(open) => line[open + 1..last].trim().to_string(),
        None => String::new(),
    }
}

/// `file:id` from an arrow token; the id is everything after the first `:`
fn split_endpoint(token: &str) -> Option<String> {
    let (file, id) = token.split_once(':')?;
    if file.is_empty() {
        return None;
    }
    Some(format!("{}:{}", file, id))
}

/// Parses a `a.list + b.list` selection of list files.
///
/// Returns `Ok(None)` for empty input. Every entry must end with `.{list_extension}`.
pub fn parse_list_selection(text: &str, list_extension: &str) -> TraceResult<Option<Vec<String>>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let suffix = format!(".{}", list_extension);
    let names: Vec<String> = text.split('+').map(|s| s.trim().to_string()).collect();

    if let Some(bad) = names.iter().find(|n| !n.ends_with(&suffix)) {
        return Err(TraceError::InvalidListSelection(format!(
            "'{}' does not end with {}",
            bad, suffix
        )));
    }

    Ok(Some(names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryFileStore;

    fn store() -> MemoryFileStore {
        MemoryFileStore::new()
            .with_file("/d/x.list", "1, Alpha\n2, Beta")
            .with_file("/d/y.list", "a, Apple\nb, Banana\nc, Cherry")
    }

    fn parse(text: &str) -> TableParse {
        parse_table(Path::new("/d/t.table"), text, &store()).unwrap()
    }

    #[test]
    fn test_parse_example_table() {
        let parsed = parse("' list files\n'x.list\n\nx.list:1 --> x.list:2 'causes'\n");
        let doc = parsed.document;

        assert_eq!(doc.groups.len(), 1);
        assert_eq!(doc.groups[0].file_name, "x.list");
        assert_eq!(doc.groups[0].elements.len(), 2);
        assert!(doc.groups[0].is_row_expanded && doc.groups[0].is_col_expanded);

        let edges: Vec<_> = doc.matrix.present_edges().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].0, "x.list:1");
        assert_eq!(edges[0].1, "x.list:2");
        assert_eq!(edges[0].2.description, "causes");
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_description_after_last_quote() {
        let doc = parse("banner\n'x.list\n\nx.list:1 --> x.list:2 ' causes\n").document;
        assert_eq!(doc.matrix.value("x.list:1", "x.list:2").description, "causes");
    }

    #[test]
    fn test_extract_description() {
        assert_eq!(extract_description("a:1 --> b:1"), "");
        assert_eq!(extract_description("a:1 --> b:1 '"), "");
        assert_eq!(extract_description("a:1 --> b:1 ' one ' two "), "two");
        assert_eq!(extract_description("a:1 --> b:1 'quoted text'"), "quoted text");
    }

    #[test]
    fn test_reverse_arrow() {
        let doc = parse("banner\n'x.list\n'y.list\n\ny.list:a <-- x.list:1 ' why\n").document;
        assert!(doc.matrix.value("x.list:1", "y.list:a").mark.is_present());
        assert!(!doc.matrix.value("y.list:a", "x.list:1").mark.is_present());
        assert_eq!(doc.matrix.value("x.list:1", "y.list:a").description, "why");
    }

    #[test]
    fn test_endpoint_id_may_contain_colon() -> anyhow::Result<()> {
        let store = MemoryFileStore::new().with_file("/d/x.list", "a:b, Alpha\n2, Beta");
        let text = "banner\n'x.list\n\nx.list:a:b --> x.list:2 ' nested\n";
        let parsed = parse_table(Path::new("/d/t.table"), text, &store)?;
        let doc = parsed.document;

        assert!(parsed.warnings.is_empty());
        assert!(doc.element("x.list:a:b").is_some());
        let value = doc.matrix.value("x.list:a:b", "x.list:2");
        assert!(value.mark.is_present());
        assert_eq!(value.description, "nested");
        assert!(doc.matrix.get("x.list:a", "x.list:2").is_none());
        assert!(doc.orphaned_keys().is_empty());

        Ok(())
    }

    #[test]
    fn test_first_line_always_skipped() {
        let doc = parse("'x.list\n'y.list\n").document;
        assert_eq!(doc.group_names(), vec!["y.list"]);
    }

    #[test]
    fn test_group_order_follows_declaration() {
        let doc = parse("banner\n'y.list\n'x.list\n").document;
        assert_eq!(doc.group_names(), vec!["y.list", "x.list"]);
    }

    #[test]
    fn test_separator_line_may_be_an_arrow() {
        let doc = parse("banner\n'x.list\nx.list:1 --> x.list:2\n").document;
        assert_eq!(doc.matrix.present_count(), 1);
        assert_eq!(doc.matrix.value("x.list:1", "x.list:2").description, "");
    }

    #[test]
    fn test_non_arrow_lines_ignored() {
        let parsed = parse("banner\n'x.list\n\nsome note\n'x.list late quote\nx.list:1 -> x.list:2\n");
        assert_eq!(parsed.document.matrix.present_count(), 0);
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.document.groups.len(), 1);
    }

    #[test]
    fn test_malformed_arrow_lines_are_warnings() {
        let parsed = parse(
            "banner\n'x.list\n\nx.list:1  --> x.list:2\nx.list:1 --> nofile\nx.list:2 --> x.list:1 ' ok\n",
        );

        assert_eq!(parsed.warnings.len(), 2);
        assert!(matches!(
            parsed.warnings[0],
            TraceError::MalformedArrowLine { line_no: 4, .. }
        ));
        assert!(matches!(
            parsed.warnings[1],
            TraceError::MalformedArrowLine { line_no: 5, .. }
        ));
        assert_eq!(parsed.document.matrix.present_count(), 1);
    }

    #[test]
    fn test_duplicate_edges_overwrite() {
        let doc = parse("banner\n'x.list\n\nx.list:1 --> x.list:2 ' old\nx.list:1 --> x.list:2 ' new\n")
            .document;
        assert_eq!(doc.matrix.present_count(), 1);
        assert_eq!(doc.matrix.value("x.list:1", "x.list:2").description, "new");
    }

    #[test]
    fn test_missing_list_file_aborts_parse() {
        let err = parse_table(
            Path::new("/d/t.table"),
            "banner\n'x.list\n'missing.list\n\nx.list:1 --> x.list:2\n",
            &store(),
        )
        .unwrap_err();

        assert!(err.is_io());
        match err {
            TraceError::UnresolvedListReference { name, path, .. } => {
                assert_eq!(name, "missing.list");
                assert_eq!(path, PathBuf::from("/d/missing.list"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_orphaned_keys() {
        let doc = parse("banner\n'x.list\n\nx.list:1 --> z.list:9\n").document;
        assert_eq!(doc.orphaned_keys(), vec!["z.list:9".to_string()]);
    }

    #[test]
    fn test_toggle_keeps_group_order() -> anyhow::Result<()> {
        let mut doc = parse("banner\n'x.list\n'y.list\n").document;
        assert!(!doc.toggle_row("x.list")?);
        assert!(!doc.toggle_col("y.list")?);
        assert!(doc.toggle_row("x.list")?);
        assert_eq!(doc.group_names(), vec!["x.list", "y.list"]);
        assert!(matches!(doc.toggle_row("nope.list"), Err(TraceError::UnknownGroup(_))));
        Ok(())
    }

    #[test]
    fn test_parse_list_selection() {
        assert_eq!(parse_list_selection("", "list").unwrap(), None);
        assert_eq!(
            parse_list_selection(" x.list +y.list ", "list").unwrap(),
            Some(vec!["x.list".to_string(), "y.list".to_string()])
        );
        assert!(matches!(
            parse_list_selection("x.list + notes.txt", "list"),
            Err(TraceError::InvalidListSelection(_))
        ));
    }
}
