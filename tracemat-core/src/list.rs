//! Reference list files
//!
//! A list file enumerates the elements one axis group of a table is built from: one element per
//! line, comma separated, first field the id and last field the label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::TraceResult;
use crate::storage::FileStore;

/// How header elements are printed in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Label only
    #[default]
    Label,
    /// `id:label`
    Debug,
    /// `file:id:label`
    Qualified,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Label => write!(f, "label"),
            DisplayMode::Debug => write!(f, "debug"),
            DisplayMode::Qualified => write!(f, "qualified"),
        }
    }
}

/// One element of a list file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeaderElement {
    pub source_file_name: String,
    pub id: String,
    pub label: String,
}

impl HeaderElement {
    pub fn new(
        source_file_name: impl Into<String>,
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            source_file_name: source_file_name.into(),
            id: id.into(),
            label: label.into(),
        }
    }

    /// Key of this element in the matrix: `file:id`
    pub fn matrix_key(&self) -> String {
        format!("{}:{}", self.source_file_name, self.id)
    }

    /// Text shown in header cells
    pub fn display(&self, mode: DisplayMode) -> String {
        match mode {
            DisplayMode::Label => self.label.clone(),
            DisplayMode::Debug => format!("{}:{}", self.id, self.label),
            DisplayMode::Qualified => {
                format!("{}:{}:{}", self.source_file_name, self.id, self.label)
            }
        }
    }
}

/// Parses list file text into header elements, one per line.
///
/// Blank lines are not filtered and produce an element with an empty id and label.
pub fn parse_list(file_name: &str, text: &str) -> Vec<HeaderElement> {
    text.split('\n')
        .map(str::trim)
        .map(|line| {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let id = fields.first().copied().unwrap_or("");
            let label = fields.last().copied().unwrap_or("");
            HeaderElement::new(file_name, id, label)
        })
        .collect()
}

/// Writes elements back in `id, label` form
pub fn list_to_text(elements: &[HeaderElement]) -> String {
    elements
        .iter()
        .map(|e| format!("{}, {}", e.id, e.label))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Raw text of a list file being edited, with the last saved text for change detection
#[derive(Debug, Clone)]
pub struct ListBuffer {
    path: PathBuf,
    saved: String,
    /// Text as currently edited
    pub current: String,
}

impl ListBuffer {
    /// Loads the list file through the store
    pub fn open(store: &dyn FileStore, path: impl AsRef<Path>) -> TraceResult<Self> {
        let path = path.as_ref().to_path_buf();
        let text = store.read_file(&path)?;
        Ok(Self {
            path,
            saved: text.clone(),
            current: text,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the edited text is non-empty and differs from what was last saved
    pub fn is_dirty(&self) -> bool {
        !self.current.is_empty() && self.current != self.saved
    }

    /// Elements of the current text
    pub fn elements(&self) -> Vec<HeaderElement> {
        parse_list(&crate::storage::file_name_from_path(&self.path), &self.current)
    }

    /// Writes the current text and marks it saved
    pub fn save(&mut self, store: &dyn FileStore) -> TraceResult<()> {
        store.write_file(&self.path, &self.current)?;
        self.saved = self.current.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryFileStore;

    #[test]
    fn test_parse_list_basic() {
        let elements = parse_list("x.list", "1, Alpha\n2, Beta");
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0], HeaderElement::new("x.list", "1", "Alpha"));
        assert_eq!(elements[1].matrix_key(), "x.list:2");
    }

    #[test]
    fn test_parse_list_uses_last_field_as_label() {
        let elements = parse_list("x.list", "  7 , ignored, also ignored ,  Gamma  ");
        assert_eq!(elements[0].id, "7");
        assert_eq!(elements[0].label, "Gamma");
    }

    #[test]
    fn test_parse_list_single_field_is_id_and_label() {
        let elements = parse_list("x.list", "solo");
        assert_eq!(elements[0].id, "solo");
        assert_eq!(elements[0].label, "solo");
    }

    #[test]
    fn test_parse_list_keeps_blank_lines() {
        // Known quirk: blank lines become empty elements instead of being dropped
        let elements = parse_list("x.list", "1, Alpha\n\n2, Beta\n");
        assert_eq!(elements.len(), 4);
        assert_eq!(elements[1], HeaderElement::new("x.list", "", ""));
        assert_eq!(elements[3], HeaderElement::new("x.list", "", ""));
    }

    #[test]
    fn test_parse_list_handles_crlf() {
        let elements = parse_list("x.list", "1, Alpha\r\n2, Beta\r\n");
        assert_eq!(elements[0].label, "Alpha");
        assert_eq!(elements[1].label, "Beta");
    }

    #[test]
    fn test_list_text_round_trip_keeps_pairs() {
        let original = parse_list("x.list", "1, a, Alpha\n2,Beta\nq-3 , Gamma Delta");
        let reparsed = parse_list("x.list", &list_to_text(&original));

        let pairs = |els: &[HeaderElement]| -> Vec<(String, String)> {
            els.iter().map(|e| (e.id.clone(), e.label.clone())).collect()
        };
        assert_eq!(pairs(&original), pairs(&reparsed));
    }

    #[test]
    fn test_display_modes() {
        let e = HeaderElement::new("x.list", "1", "Alpha");
        assert_eq!(e.display(DisplayMode::Label), "Alpha");
        assert_eq!(e.display(DisplayMode::Debug), "1:Alpha");
        assert_eq!(e.display(DisplayMode::Qualified), "x.list:1:Alpha");
    }

    #[test]
    fn test_list_buffer_dirty_tracking() -> anyhow::Result<()> {
        let store = MemoryFileStore::new().with_file("/d/x.list", "1, Alpha");
        let mut buffer = ListBuffer::open(&store, "/d/x.list")?;
        assert!(!buffer.is_dirty());

        buffer.current = String::new();
        assert!(!buffer.is_dirty(), "empty text is never dirty");

        buffer.current = "1, Alpha\n2, Beta".to_string();
        assert!(buffer.is_dirty());
        assert_eq!(buffer.elements().len(), 2);
        assert_eq!(buffer.elements()[1].source_file_name, "x.list");

        buffer.save(&store)?;
        assert!(!buffer.is_dirty());
        assert_eq!(store.get("/d/x.list").as_deref(), Some("1, Alpha\n2, Beta"));

        Ok(())
    }
}
