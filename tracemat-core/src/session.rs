//! Interactive table session
//!
//! Holds a loaded document together with the state a viewer needs between renders: whether the
//! impact scope is shown, which cell selected it, and a pending edit. Hosts render
//! [`TableSession::grid`] and feed clicks back through [`TableSession::click`] and
//! [`TableSession::double_click`].

use log::info;
use serde::Serialize;
use std::path::Path;

use crate::error::{TraceError, TraceResult};
use crate::impact::{clear_impact_scope, compute_impact_scope};
use crate::layout::{layout, CellAction, Grid, GridCell};
use crate::list::DisplayMode;
use crate::matrix::Mark;
use crate::serializer::serialize_table;
use crate::storage::FileStore;
use crate::table::{load_group, parse_list_selection, parse_table, TableDocument};

/// Position of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

/// Result of a single click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    /// A group label was clicked and its expand flag flipped
    Toggled { group: String, expanded: bool },
    /// The impact scope of `start_key` is now shown
    ImpactShown { start_key: String },
    /// Highlight mode was left and every flag cleared
    ImpactCleared,
}

/// Edit of a single matrix pair, as presented by the edit popup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditRequest {
    pub row_key: String,
    pub col_key: String,
    pub mark: Mark,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct TableSession {
    document: TableDocument,
    display_mode: DisplayMode,
    /// Cell whose click started highlight mode
    selected: Option<GridPos>,
    highlight_active: bool,
    pending_edit: Option<EditRequest>,
}

impl TableSession {
    pub fn new(document: TableDocument, display_mode: DisplayMode) -> Self {
        Self {
            document,
            display_mode,
            selected: None,
            highlight_active: false,
            pending_edit: None,
        }
    }

    /// Reads and parses a table file, returning the session and any skipped-line warnings
    pub fn open(
        store: &dyn FileStore,
        path: &Path,
        display_mode: DisplayMode,
    ) -> TraceResult<(Self, Vec<TraceError>)> {
        let text = store.read_file(path)?;
        let parsed = parse_table(path, &text, store)?;
        info!(
            "opened {:?} ({} groups, {} edges)",
            path,
            parsed.document.groups.len(),
            parsed.document.matrix.present_count()
        );
        Ok((Self::new(parsed.document, display_mode), parsed.warnings))
    }

    /// Re-reads the table from disk; the current document is kept if anything fails
    pub fn reload(&mut self, store: &dyn FileStore) -> TraceResult<Vec<TraceError>> {
        let path = self.document.file_path.clone();
        let text = store.read_file(&path)?;
        let parsed = parse_table(&path, &text, store)?;

        self.document = parsed.document;
        self.leave_highlight();
        self.pending_edit = None;
        Ok(parsed.warnings)
    }

    pub fn document(&self) -> &TableDocument {
        &self.document
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn is_highlight_active(&self) -> bool {
        self.highlight_active
    }

    pub fn selected(&self) -> Option<GridPos> {
        self.selected
    }

    pub fn pending_edit(&self) -> Option<&EditRequest> {
        self.pending_edit.as_ref()
    }

    /// Flips a group's row expand flag
    pub fn toggle_row(&mut self, group: &str) -> TraceResult<bool> {
        self.document.toggle_row(group)
    }

    /// Flips a group's column expand flag
    pub fn toggle_col(&mut self, group: &str) -> TraceResult<bool> {
        self.document.toggle_col(group)
    }

    /// Current display grid
    pub fn grid(&self) -> Grid {
        layout(&self.document, self.highlight_active, self.display_mode)
    }

    fn cell_at(grid: &Grid, row: usize, col: usize) -> TraceResult<&GridCell> {
        grid.cell(row, col).ok_or(TraceError::CellOutOfRange {
            row,
            col,
            rows: grid.rows(),
            cols: grid.cols(),
        })
    }

    /// Handles a click on the cell at (row, col) of the current grid.
    ///
    /// Group labels toggle their group. Outside highlight mode a present edge starts it with the
    /// edge's column element as the start of the impact scope. In highlight mode any other
    /// content cell ends it.
    pub fn click(&mut self, row: usize, col: usize) -> TraceResult<ClickOutcome> {
        let grid = self.grid();
        let cell = Self::cell_at(&grid, row, col)?;

        match &cell.action {
            CellAction::ToggleRowGroup { group } => {
                let expanded = self.document.toggle_row(group)?;
                return Ok(ClickOutcome::Toggled {
                    group: group.clone(),
                    expanded,
                });
            }
            CellAction::ToggleColGroup { group } => {
                let expanded = self.document.toggle_col(group)?;
                return Ok(ClickOutcome::Toggled {
                    group: group.clone(),
                    expanded,
                });
            }
            CellAction::None => return Ok(ClickOutcome::Ignored),
            CellAction::Edge { .. } | CellAction::Aggregate => {}
        }

        let pos = GridPos { row, col };
        if self.highlight_active {
            if self.selected == Some(pos) {
                return Ok(ClickOutcome::Ignored);
            }
            self.leave_highlight();
            return Ok(ClickOutcome::ImpactCleared);
        }

        match &cell.action {
            CellAction::Edge { col_key, .. } if cell.mark == Some(Mark::Present) => {
                let start_key = col_key.clone();
                self.show_impact(&start_key);
                self.selected = Some(pos);
                Ok(ClickOutcome::ImpactShown { start_key })
            }
            _ => Ok(ClickOutcome::Ignored),
        }
    }

    /// Enters highlight mode for the impact scope of `start_key`
    pub fn show_impact(&mut self, start_key: &str) {
        clear_impact_scope(&mut self.document.matrix);
        compute_impact_scope(&mut self.document.matrix, start_key);
        self.highlight_active = true;
        self.selected = None;
    }

    /// Leaves highlight mode and clears every flag
    pub fn leave_highlight(&mut self) {
        clear_impact_scope(&mut self.document.matrix);
        self.highlight_active = false;
        self.selected = None;
    }

    /// Opens the edit popup for a single-pair cell; returns `None` for other cells or while an
    /// edit is already pending
    pub fn double_click(&mut self, row: usize, col: usize) -> TraceResult<Option<EditRequest>> {
        if self.pending_edit.is_some() {
            return Ok(None);
        }

        let grid = self.grid();
        let cell = Self::cell_at(&grid, row, col)?;

        let CellAction::Edge { row_key, col_key } = &cell.action else {
            return Ok(None);
        };

        let value = self.document.matrix.value(row_key, col_key);
        let edit = EditRequest {
            row_key: row_key.clone(),
            col_key: col_key.clone(),
            mark: value.mark,
            description: value.description.clone(),
        };
        self.pending_edit = Some(edit.clone());
        Ok(Some(edit))
    }

    /// Discards the pending edit
    pub fn cancel_edit(&mut self) {
        self.pending_edit = None;
    }

    /// Applies the pending edit with the values entered by the user; false when none is pending
    pub fn commit_edit(&mut self, mark: Mark, description: impl Into<String>) -> bool {
        let Some(edit) = self.pending_edit.take() else {
            return false;
        };
        self.set_edge(&edit.row_key, &edit.col_key, mark, description);
        true
    }

    /// Sets the mark and description of one pair and leaves highlight mode
    pub fn set_edge(
        &mut self,
        row_key: &str,
        col_key: &str,
        mark: Mark,
        description: impl Into<String>,
    ) {
        self.document
            .matrix
            .register_arrow(row_key, col_key, mark, description);
        self.leave_highlight();
    }

    /// Replaces the referenced list files from a `a.list + b.list` selection.
    ///
    /// Returns false when the selection is empty or names the current files. All list files are
    /// loaded before any group is replaced.
    pub fn set_list_files(
        &mut self,
        store: &dyn FileStore,
        selection: &str,
        list_extension: &str,
    ) -> TraceResult<bool> {
        let Some(names) = parse_list_selection(selection, list_extension)? else {
            return Ok(false);
        };
        if names == self.document.group_names() {
            return Ok(false);
        }

        let mut groups = Vec::with_capacity(names.len());
        for name in &names {
            groups.push(load_group(store, &self.document.file_path, name)?);
        }

        info!("list files of {:?} set to {}", self.document.file_path, names.join(" + "));
        self.document.groups = groups;
        Ok(true)
    }

    /// Writes the document back to its table file
    pub fn save(&self, store: &dyn FileStore, banner: &str) -> TraceResult<()> {
        let text = serialize_table(&self.document, banner)?;
        store.write_file(&self.document.file_path, &text)?;
        info!(
            "saved {:?} ({} edges)",
            self.document.file_path,
            self.document.matrix.present_count()
        );
        Ok(())
    }
}
