//! Sparse traceability matrix
//!
//! Edges are stored as `row_key -> col_key -> MatrixValue`, where the row key is the source of the
//! arrow and the column key its target. Keys are element matrix keys (`file:id`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Symbol written for a present edge
pub const PRESENT_SYMBOL: &str = "〇";
/// Symbol shown for an absent edge
pub const ABSENT_SYMBOL: &str = "-";

/// Whether a relationship exists between two elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Mark {
    #[default]
    Absent,
    Present,
}

impl Mark {
    /// Reads a mark symbol; anything but `〇` is absent
    pub fn from_symbol(symbol: &str) -> Self {
        if symbol.trim() == PRESENT_SYMBOL {
            Mark::Present
        } else {
            Mark::Absent
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Mark::Present => PRESENT_SYMBOL,
            Mark::Absent => ABSENT_SYMBOL,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Mark::Present)
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Value stored for one (row, col) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MatrixValue {
    pub mark: Mark,
    pub description: String,
    /// Highlight state set by the impact scope analyzer, never persisted
    #[serde(skip)]
    pub should_paint_self: bool,
}

static DEFAULT_VALUE: MatrixValue = MatrixValue {
    mark: Mark::Absent,
    description: String::new(),
    should_paint_self: false,
};

impl MatrixValue {
    pub fn new(mark: Mark, description: impl Into<String>) -> Self {
        Self {
            mark,
            description: description.into(),
            should_paint_self: false,
        }
    }

    /// True when this value carries nothing worth showing or saving
    pub fn is_default(&self) -> bool {
        !self.mark.is_present() && self.description.is_empty()
    }
}

/// Sparse directed graph of element relationships
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matrix {
    rows: BTreeMap<String, BTreeMap<String, MatrixValue>>,
}

impl Matrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the mark and description of the edge `from -> to`, keeping its highlight state
    pub fn register_arrow(
        &mut self,
        from: &str,
        to: &str,
        mark: Mark,
        description: impl Into<String>,
    ) {
        let value = self.value_mut(from, to);
        value.mark = mark;
        value.description = description.into();
    }

    /// Value of a pair, or the default value when the pair was never stored
    pub fn value(&self, row_key: &str, col_key: &str) -> &MatrixValue {
        self.get(row_key, col_key).unwrap_or(&DEFAULT_VALUE)
    }

    /// Mutable value of a pair, inserting the default value when missing
    pub fn value_mut(&mut self, row_key: &str, col_key: &str) -> &mut MatrixValue {
        self.rows
            .entry(row_key.to_string())
            .or_default()
            .entry(col_key.to_string())
            .or_default()
    }

    /// Stored value of a pair without falling back to the default
    pub fn get(&self, row_key: &str, col_key: &str) -> Option<&MatrixValue> {
        self.rows.get(row_key).and_then(|cols| cols.get(col_key))
    }

    /// Every stored pair, including absent ones, in key order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &MatrixValue)> {
        self.rows.iter().flat_map(|(row, cols)| {
            cols.iter()
                .map(move |(col, value)| (row.as_str(), col.as_str(), value))
        })
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = (&str, &str, &mut MatrixValue)> {
        self.rows.iter_mut().flat_map(|(row, cols)| {
            cols.iter_mut()
                .map(move |(col, value)| (row.as_str(), col.as_str(), value))
        })
    }

    /// Pairs whose mark is present
    pub fn present_edges(&self) -> impl Iterator<Item = (&str, &str, &MatrixValue)> {
        self.entries().filter(|(_, _, value)| value.mark.is_present())
    }

    pub fn present_count(&self) -> usize {
        self.present_edges().count()
    }

    /// Pairs currently flagged by the impact scope analyzer
    pub fn highlighted_edges(&self) -> Vec<(String, String)> {
        self.entries()
            .filter(|(_, _, value)| value.should_paint_self)
            .map(|(row, col, _)| (row.to_string(), col.to_string()))
            .collect()
    }
}
