//! Terminal rendering of layout grids

use colored::Colorize;

use tracemat_core::{CellKind, Grid, GridCell, HEADER_SIZE};

const SEPARATOR: &str = " | ";

fn text_of(cell: &GridCell, color: bool) -> String {
    if cell.highlight && !color {
        format!("*{}", cell.value)
    } else {
        cell.value.clone()
    }
}

fn width_of(text: &str) -> usize {
    text.chars().count()
}

/// Column widths wide enough for every visible cell, spans included
fn column_widths(grid: &Grid, color: bool) -> Vec<usize> {
    let mut widths = vec![1; grid.cols()];

    for r in 0..grid.rows() {
        for (c, cell) in grid.row(r).iter().enumerate() {
            let span = cell.span.map(|s| s.cols).unwrap_or(1);
            if cell.visible && span <= 1 {
                widths[c] = widths[c].max(width_of(&text_of(cell, color)));
            }
        }
    }

    // Widen the last column of a span whose text does not fit
    for r in 0..grid.rows() {
        for (c, cell) in grid.row(r).iter().enumerate() {
            let span = cell.span.map(|s| s.cols).unwrap_or(1);
            if !cell.visible || span <= 1 {
                continue;
            }
            let available = widths[c..c + span].iter().sum::<usize>() + SEPARATOR.len() * (span - 1);
            let needed = width_of(&text_of(cell, color));
            if needed > available {
                widths[c + span - 1] += needed - available;
            }
        }
    }

    widths
}

/// Renders the grid as aligned text; with `color`, headers are bold and highlighted cells are
/// shaded, otherwise highlighted cells are prefixed with `*`
pub fn render_grid(grid: &Grid, color: bool) -> String {
    let widths = column_widths(grid, color);
    let mut output = String::new();

    for r in 0..grid.rows() {
        let row = grid.row(r);
        let mut parts = Vec::new();
        let mut c = 0;

        while c < grid.cols() {
            let cell = &row[c];
            if !cell.visible {
                parts.push(" ".repeat(widths[c]));
                c += 1;
                continue;
            }

            let span = cell.span.map(|s| s.cols).unwrap_or(1).max(1);
            let width = widths[c..c + span].iter().sum::<usize>() + SEPARATOR.len() * (span - 1);
            let text = text_of(cell, color);
            let padded = format!("{}{}", text, " ".repeat(width.saturating_sub(width_of(&text))));

            let styled = if !color {
                padded
            } else if cell.highlight {
                padded.as_str().black().on_yellow().to_string()
            } else if cell.kind == CellKind::Header {
                padded.as_str().bold().to_string()
            } else {
                padded
            };

            parts.push(styled);
            c += span;
        }

        output.push_str(parts.join(SEPARATOR).trim_end());
        output.push('\n');

        if r + 1 == HEADER_SIZE {
            let total = widths.iter().sum::<usize>() + SEPARATOR.len() * (widths.len() - 1);
            output.push_str(&"-".repeat(total));
            output.push('\n');
        }
    }

    output
}
