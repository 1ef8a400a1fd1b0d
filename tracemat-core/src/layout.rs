//! Grid layout
//!
//! Projects a [`TableDocument`] into a 2-D grid of display cells. The first two rows hold the
//! column headers (group label, then element labels) and the first two columns hold the row
//! headers. Every group occupies one row/column per element when expanded on that axis, or a
//! single aggregated row/column when collapsed.
//!
//! Cells are plain descriptors: instead of click handlers they carry a [`CellAction`] the host
//! dispatches (see [`crate::session::TableSession`]).

use serde::Serialize;

use crate::list::{DisplayMode, HeaderElement};
use crate::matrix::{Mark, Matrix};
use crate::table::{HeaderGroup, TableDocument};

/// Rows (and columns) taken by the two-level headers
pub const HEADER_SIZE: usize = 2;

const EXPANDED_PREFIX: &str = "▼";
const COLLAPSED_PREFIX: &str = "▶";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Header,
    Content,
}

/// Size of a merged cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub rows: usize,
    pub cols: usize,
}

/// What the host should do when a cell is clicked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellAction {
    #[default]
    None,
    /// Group label in the row headers
    ToggleRowGroup { group: String },
    /// Group label in the column headers
    ToggleColGroup { group: String },
    /// A single matrix pair; clicking selects it, double clicking edits it
    Edge { row_key: String, col_key: String },
    /// Summary of a collapsed group
    Aggregate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub kind: CellKind,
    pub value: String,
    /// False for cells covered by a merged neighbour
    pub visible: bool,
    pub span: Option<Span>,
    pub highlight: bool,
    /// Edge description shown on hover
    pub tooltip: Option<String>,
    /// Mark of the cell (aggregated for summary cells); `None` for headers
    pub mark: Option<Mark>,
    pub action: CellAction,
}

impl GridCell {
    fn new(kind: CellKind) -> Self {
        Self {
            kind,
            value: String::new(),
            visible: true,
            span: None,
            highlight: false,
            tooltip: None,
            mark: None,
            action: CellAction::None,
        }
    }
}

/// Row-major grid of display cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<GridCell>,
}

impl Grid {
    fn new(rows: usize, cols: usize) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let kind = if r < HEADER_SIZE || c < HEADER_SIZE {
                    CellKind::Header
                } else {
                    CellKind::Content
                };
                cells.push(GridCell::new(kind));
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    fn at(&mut self, row: usize, col: usize) -> &mut GridCell {
        &mut self.cells[row * self.cols + col]
    }

    /// Cells of one row, including hidden ones
    pub fn row(&self, row: usize) -> &[GridCell] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    /// Merges the rectangle between two corners into its top-left cell
    fn merge(&mut self, from_row: usize, from_col: usize, to_row: usize, to_col: usize) {
        let (top, bottom) = (from_row.min(to_row), from_row.max(to_row));
        let (left, right) = (from_col.min(to_col), from_col.max(to_col));

        for r in top..=bottom {
            for c in left..=right {
                let cell = self.at(r, c);
                if r == top && c == left {
                    cell.visible = true;
                    cell.span = Some(Span {
                        rows: bottom - top + 1,
                        cols: right - left + 1,
                    });
                } else {
                    cell.visible = false;
                }
            }
        }
    }

    /// Content cells flagged for emphasis, as (row, col)
    pub fn highlighted_positions(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.highlight)
            .map(|(i, _)| (i / self.cols, i % self.cols))
            .collect()
    }
}

fn group_label(group: &HeaderGroup, expanded: bool) -> String {
    let prefix = if expanded {
        EXPANDED_PREFIX
    } else {
        COLLAPSED_PREFIX
    };
    format!("{}{}", prefix, group.file_name)
}

/// Lays out the document as a display grid.
///
/// With `highlight_active`, content cells backed by edges flagged by the impact scope analyzer
/// are marked `highlight`.
pub fn layout(document: &TableDocument, highlight_active: bool, mode: DisplayMode) -> Grid {
    let groups = &document.groups;
    let rows = HEADER_SIZE + groups.iter().map(HeaderGroup::row_span).sum::<usize>();
    let cols = HEADER_SIZE + groups.iter().map(HeaderGroup::col_span).sum::<usize>();
    let mut grid = Grid::new(rows, cols);

    // Blank corner
    grid.merge(0, 0, 1, 1);

    // Column headers
    let mut col = HEADER_SIZE;
    for group in groups {
        let span = group.col_span();
        if span == 0 {
            continue;
        }
        if group.is_col_expanded {
            grid.merge(0, col, 0, col + span - 1);
            for (offset, element) in group.elements.iter().enumerate() {
                let cell = grid.at(1, col + offset);
                cell.visible = true;
                cell.value = element.display(mode);
            }
        }
        let cell = grid.at(0, col);
        cell.value = group_label(group, group.is_col_expanded);
        cell.action = CellAction::ToggleColGroup {
            group: group.file_name.clone(),
        };
        col += span;
    }

    // Row headers
    let mut row = HEADER_SIZE;
    for group in groups {
        let span = group.row_span();
        if span == 0 {
            continue;
        }
        if group.is_row_expanded {
            grid.merge(row, 0, row + span - 1, 0);
            for (offset, element) in group.elements.iter().enumerate() {
                let cell = grid.at(row + offset, 1);
                cell.visible = true;
                cell.value = element.display(mode);
            }
        }
        let cell = grid.at(row, 0);
        cell.value = group_label(group, group.is_row_expanded);
        cell.action = CellAction::ToggleRowGroup {
            group: group.file_name.clone(),
        };
        row += span;
    }

    // Content
    let matrix = &document.matrix;
    let mut base_row = HEADER_SIZE;
    for row_group in groups {
        let mut base_col = HEADER_SIZE;
        for col_group in groups {
            fill_block(
                &mut grid,
                matrix,
                row_group,
                col_group,
                (base_row, base_col),
                highlight_active,
            );
            base_col += col_group.col_span();
        }
        base_row += row_group.row_span();
    }

    grid
}

/// Fills the content block where `row_group` meets `col_group`
fn fill_block(
    grid: &mut Grid,
    matrix: &Matrix,
    row_group: &HeaderGroup,
    col_group: &HeaderGroup,
    (base_row, base_col): (usize, usize),
    highlight_active: bool,
) {
    match (row_group.is_row_expanded, col_group.is_col_expanded) {
        (true, true) => {
            for (i, row_element) in row_group.elements.iter().enumerate() {
                for (j, col_element) in col_group.elements.iter().enumerate() {
                    let row_key = row_element.matrix_key();
                    let col_key = col_element.matrix_key();
                    let value = matrix.value(&row_key, &col_key);

                    let cell = grid.at(base_row + i, base_col + j);
                    cell.value = value.mark.symbol().to_string();
                    cell.mark = Some(value.mark);
                    cell.tooltip = value
                        .mark
                        .is_present()
                        .then(|| value.description.clone())
                        .filter(|d| !d.is_empty());
                    cell.highlight = highlight_active && value.should_paint_self;
                    cell.action = CellAction::Edge { row_key, col_key };
                }
            }
        }
        (true, false) => {
            for (i, row_element) in row_group.elements.iter().enumerate() {
                let summary = aggregate(
                    matrix,
                    std::slice::from_ref(row_element),
                    &col_group.elements,
                );
                set_summary(grid.at(base_row + i, base_col), summary, highlight_active);
            }
        }
        (false, true) => {
            for (j, col_element) in col_group.elements.iter().enumerate() {
                let summary = aggregate(
                    matrix,
                    &row_group.elements,
                    std::slice::from_ref(col_element),
                );
                set_summary(grid.at(base_row, base_col + j), summary, highlight_active);
            }
        }
        (false, false) => {
            let summary = aggregate(matrix, &row_group.elements, &col_group.elements);
            set_summary(grid.at(base_row, base_col), summary, highlight_active);
        }
    }
}

/// OR of marks and highlight flags over a cross product of elements
fn aggregate(matrix: &Matrix, rows: &[HeaderElement], cols: &[HeaderElement]) -> (Mark, bool) {
    let mut mark = Mark::Absent;
    let mut paint = false;
    for row_element in rows {
        let row_key = row_element.matrix_key();
        for col_element in cols {
            let value = matrix.value(&row_key, &col_element.matrix_key());
            if value.mark.is_present() {
                mark = Mark::Present;
            }
            paint |= value.should_paint_self;
        }
    }
    (mark, paint)
}

fn set_summary(cell: &mut GridCell, (mark, paint): (Mark, bool), highlight_active: bool) {
    cell.value = mark.symbol().to_string();
    cell.mark = Some(mark);
    cell.highlight = highlight_active && paint;
    cell.action = CellAction::Aggregate;
}
