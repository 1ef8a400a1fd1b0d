use anyhow::Result;
use inquire::{Select, Text};
use std::path::PathBuf;

use tracemat_core::{EditRequest, Mark, ABSENT_SYMBOL, PRESENT_SYMBOL};

/// Prompts the user for a directory; `None` when nothing was entered
pub fn prompt_directory() -> Result<Option<PathBuf>> {
    let input = Text::new("Directory with list and table files:").prompt()?;
    let input = input.trim();

    if input.is_empty() {
        return Ok(None);
    }

    Ok(Some(PathBuf::from(input)))
}

/// Prompts for the mark and description of an edge, starting from its current values
pub fn prompt_edit(edit: &EditRequest) -> Result<(Mark, String)> {
    println!("{} --> {}", edit.row_key, edit.col_key);

    let options = vec![PRESENT_SYMBOL, ABSENT_SYMBOL];
    let start = if edit.mark.is_present() { 0 } else { 1 };
    let symbol = Select::new("Mark:", options)
        .with_starting_cursor(start)
        .prompt()?;

    let description = Text::new("Description:")
        .with_initial_value(&edit.description)
        .prompt()?;

    Ok((Mark::from_symbol(symbol), description))
}

/// Prompts for a `a.list + b.list` selection, prefilled with the current files
pub fn prompt_list_selection(current: &[String]) -> Result<String> {
    let initial = current.join(" + ");
    let selection = Text::new("List files:")
        .with_initial_value(&initial)
        .prompt()?;
    Ok(selection)
}
