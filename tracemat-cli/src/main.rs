mod cli;
mod prompts;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;

use tracemat_core::{
    file_name_from_path, get_config_path, impacted_elements, DisplayMode, FileStore, ListBuffer,
    LocalFileStore, Mark, TableSession, TraceConfig, TraceError,
};

use crate::cli::{Cli, Command, ConfigCommand, DisplayArg, MarkArg};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => get_config_path()?,
    };
    let mut config = TraceConfig::load(&config_path)?;
    if let Some(display) = cli.display {
        config.display_mode = display_mode(display);
    }

    let store = LocalFileStore::new();

    match &cli.command {
        Command::Files { dir } => list_files(&store, &config, dir.as_deref())?,
        Command::List { path } => show_list(&store, path)?,
        Command::Show {
            table,
            collapse_rows,
            collapse_cols,
            select,
            json,
        } => show_table(
            &store,
            &config,
            table,
            collapse_rows,
            collapse_cols,
            select.as_deref(),
            *json,
        )?,
        Command::Impact { table, element } => show_impact(&store, &config, table, element)?,
        Command::Set {
            table,
            from,
            to,
            mark,
            description,
        } => set_edge(&store, &config, table, from, to, *mark, description)?,
        Command::Edit { table, from, to } => edit_edge(&store, &config, table, from, to)?,
        Command::Lists { table, selection } => {
            set_list_files(&store, &config, table, selection.as_deref())?
        }
        Command::Config(cmd) => handle_config_command(cmd, &mut config, &config_path)?,
    }

    Ok(())
}

fn display_mode(arg: DisplayArg) -> DisplayMode {
    match arg {
        DisplayArg::Label => DisplayMode::Label,
        DisplayArg::Debug => DisplayMode::Debug,
        DisplayArg::Qualified => DisplayMode::Qualified,
    }
}

fn mark_of(arg: MarkArg) -> Mark {
    match arg {
        MarkArg::Present => Mark::Present,
        MarkArg::Absent => Mark::Absent,
    }
}

/// Opens a table, printing skipped lines as warnings
fn open_session(store: &dyn FileStore, config: &TraceConfig, table: &Path) -> Result<TableSession> {
    let (session, warnings) = TableSession::open(store, table, config.display_mode)
        .with_context(|| format!("Failed to open table {:?}", table))?;

    for warning in &warnings {
        eprintln!("{} {}", "warning:".yellow(), warning);
    }

    Ok(session)
}

fn list_files(store: &dyn FileStore, config: &TraceConfig, dir: Option<&Path>) -> Result<()> {
    let dir = match dir.map(Path::to_path_buf).or_else(|| config.default_dir.clone()) {
        Some(dir) => dir,
        None => match prompts::prompt_directory()? {
            Some(dir) => dir,
            None => anyhow::bail!("No directory was selected"),
        },
    };

    let lists = store.list_files_with_extension(&dir, &config.list_extension)?;
    let tables = store.list_files_with_extension(&dir, &config.table_extension)?;

    if lists.is_empty() && tables.is_empty() {
        println!("{}", format!("No list or table files in {}", dir.display()).as_str().yellow());
        return Ok(());
    }

    for path in &lists {
        println!("{:<6} {}", "list".cyan(), path.display());
    }
    for path in &tables {
        println!("{:<6} {}", "table".green(), path.display());
    }

    Ok(())
}

fn show_list(store: &dyn FileStore, path: &Path) -> Result<()> {
    let buffer = ListBuffer::open(store, path)?;
    let elements = buffer.elements();

    println!("{}", file_name_from_path(path).as_str().blue());
    println!("{:<12} | {}", "ID", "Label");
    println!("{}", "-".repeat(40));
    for element in &elements {
        println!("{:<12} | {}", element.id, element.label);
    }

    Ok(())
}

fn show_table(
    store: &dyn FileStore,
    config: &TraceConfig,
    table: &Path,
    collapse_rows: &[String],
    collapse_cols: &[String],
    select: Option<&[usize]>,
    json: bool,
) -> Result<()> {
    let mut session = open_session(store, config, table)?;

    for group in collapse_rows {
        let expanded = session
            .document()
            .group(group)
            .map(|g| g.is_row_expanded)
            .ok_or_else(|| TraceError::UnknownGroup(group.clone()))?;
        if expanded {
            session.toggle_row(group)?;
        }
    }
    for group in collapse_cols {
        let expanded = session
            .document()
            .group(group)
            .map(|g| g.is_col_expanded)
            .ok_or_else(|| TraceError::UnknownGroup(group.clone()))?;
        if expanded {
            session.toggle_col(group)?;
        }
    }

    if let Some([row, col]) = select {
        let outcome = session.click(*row, *col)?;
        log::info!("click ({}, {}): {:?}", row, col, outcome);
    }

    let grid = session.grid();
    if json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
        return Ok(());
    }

    println!("{}", table.display().to_string().as_str().blue());
    print!("{}", render::render_grid(&grid, true));

    let orphans = session.document().orphaned_keys();
    if !orphans.is_empty() {
        println!(
            "{} {}",
            "Edges to undeclared elements:".yellow(),
            orphans.join(", ")
        );
    }

    Ok(())
}

fn show_impact(
    store: &dyn FileStore,
    config: &TraceConfig,
    table: &Path,
    element: &str,
) -> Result<()> {
    let mut session = open_session(store, config, table)?;
    session.show_impact(element);

    let document = session.document();
    let sources = impacted_elements(&document.matrix);
    if sources.is_empty() {
        println!("{}", format!("Nothing reaches {}", element).as_str().yellow());
        return Ok(());
    }

    let describe = |key: &str| match document.element(key) {
        Some(e) => format!("{} ({})", key, e.display(config.display_mode)),
        None => key.to_string(),
    };

    println!("{} {}", "Impact scope of".blue(), describe(element));
    for key in &sources {
        println!("  {}", describe(key.as_str()));
    }

    println!("\n{}:", "Edges".green());
    for (row_key, col_key) in document.matrix.highlighted_edges() {
        let description = &document.matrix.value(&row_key, &col_key).description;
        if description.is_empty() {
            println!("  {} --> {}", row_key, col_key.as_str().cyan());
        } else {
            println!("  {} --> {} - {}", row_key, col_key.as_str().cyan(), description);
        }
    }

    Ok(())
}

fn set_edge(
    store: &dyn FileStore,
    config: &TraceConfig,
    table: &Path,
    from: &str,
    to: &str,
    mark: MarkArg,
    description: &str,
) -> Result<()> {
    let mut session = open_session(store, config, table)?;
    warn_undeclared(&session, &[from, to]);

    session.set_edge(from, to, mark_of(mark), description);
    session.save(store, &config.banner)?;

    println!(
        "{} {} --> {} ({})",
        "Saved".green(),
        from,
        to,
        mark_of(mark)
    );
    Ok(())
}

fn edit_edge(
    store: &dyn FileStore,
    config: &TraceConfig,
    table: &Path,
    from: &str,
    to: &str,
) -> Result<()> {
    let mut session = open_session(store, config, table)?;
    warn_undeclared(&session, &[from, to]);

    let value = session.document().matrix.value(from, to);
    let edit = tracemat_core::EditRequest {
        row_key: from.to_string(),
        col_key: to.to_string(),
        mark: value.mark,
        description: value.description.clone(),
    };

    let (mark, description) = prompts::prompt_edit(&edit)?;
    session.set_edge(from, to, mark, description);
    session.save(store, &config.banner)?;

    println!("{} {} --> {} ({})", "Saved".green(), from, to, mark);
    Ok(())
}

fn warn_undeclared(session: &TableSession, keys: &[&str]) {
    for key in keys {
        if session.document().element(key).is_none() {
            eprintln!(
                "{} {} is not declared by any list file of this table",
                "warning:".yellow(),
                key
            );
        }
    }
}

fn set_list_files(
    store: &dyn FileStore,
    config: &TraceConfig,
    table: &Path,
    selection: Option<&str>,
) -> Result<()> {
    let mut session = open_session(store, config, table)?;

    let selection = match selection {
        Some(s) => s.to_string(),
        None => prompts::prompt_list_selection(&session.document().group_names())?,
    };

    if !session.set_list_files(store, &selection, &config.list_extension)? {
        println!("{}", "List files unchanged.".yellow());
        return Ok(());
    }

    session.save(store, &config.banner)?;
    println!(
        "{} {}",
        "List files set to".green(),
        session.document().group_names().join(" + ")
    );
    Ok(())
}

fn handle_config_command(
    cmd: &ConfigCommand,
    config: &mut TraceConfig,
    config_path: &Path,
) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            println!("{}: {}", "Display mode".blue(), config.display_mode);
            println!("{}: {}", "Banner".blue(), config.banner);
            println!("{}: {}", "List extension".blue(), config.list_extension);
            println!("{}: {}", "Table extension".blue(), config.table_extension);
            let default_dir = config
                .default_dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("{}: {}", "Default directory".blue(), default_dir);
        }
        ConfigCommand::Path => {
            println!("{}", config_path.display());
        }
        ConfigCommand::Set {
            display,
            banner,
            default_dir,
        } => {
            if let Some(display) = display {
                config.display_mode = display_mode(*display);
            }
            if let Some(banner) = banner {
                config.banner = banner.clone();
            }
            if let Some(dir) = default_dir {
                config.default_dir = Some(dir.clone());
            }
            config.save(config_path)?;
            println!("{} {}", "Saved config to".green(), config_path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const TABLE: &str = "' list files\n'x.list\n\nx.list:1 --> x.list:2 ' causes\n";

    fn workspace() -> Result<tempfile::TempDir> {
        let dir = tempdir()?;
        fs::write(dir.path().join("x.list"), "1, Alpha\n2, Beta")?;
        fs::write(dir.path().join("y.list"), "a, Apple")?;
        fs::write(dir.path().join("t.table"), TABLE)?;
        Ok(dir)
    }

    #[test]
    fn test_set_edge_writes_table() -> Result<()> {
        let dir = workspace()?;
        let table = dir.path().join("t.table");
        let store = LocalFileStore::new();
        let config = TraceConfig::default();

        set_edge(&store, &config, &table, "x.list:2", "x.list:1", MarkArg::Present, "back")?;
        set_edge(&store, &config, &table, "x.list:1", "x.list:2", MarkArg::Absent, "")?;

        let written = fs::read_to_string(&table)?;
        assert_eq!(written, "' list files\n' x.list\n\nx.list:2 --> x.list:1 ' back\n");
        Ok(())
    }

    #[test]
    fn test_set_edge_with_unwritable_key_leaves_file() -> Result<()> {
        let dir = workspace()?;
        let table = dir.path().join("t.table");
        let store = LocalFileStore::new();

        let result = set_edge(
            &store,
            &TraceConfig::default(),
            &table,
            "x.list:q 3",
            "x.list:1",
            MarkArg::Present,
            "",
        );

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&table)?, TABLE);
        Ok(())
    }

    #[test]
    fn test_set_list_files_saves_selection() -> Result<()> {
        let dir = workspace()?;
        let table = dir.path().join("t.table");
        let store = LocalFileStore::new();

        set_list_files(&store, &TraceConfig::default(), &table, Some("x.list + y.list"))?;

        let written = fs::read_to_string(&table)?;
        assert!(written.starts_with("' list files\n' x.list\n' y.list\n\n"));
        assert!(written.contains("x.list:1 --> x.list:2 ' causes"));
        Ok(())
    }

    #[test]
    fn test_set_list_files_rejects_bad_selection() -> Result<()> {
        let dir = workspace()?;
        let table = dir.path().join("t.table");
        let store = LocalFileStore::new();

        let result = set_list_files(&store, &TraceConfig::default(), &table, Some("x.txt"));

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&table)?, TABLE);
        Ok(())
    }

    #[test]
    fn test_read_only_handlers() -> Result<()> {
        let dir = workspace()?;
        let store = LocalFileStore::new();
        let config = TraceConfig::default();
        let table = dir.path().join("t.table");

        list_files(&store, &config, Some(dir.path()))?;
        show_list(&store, &dir.path().join("x.list"))?;
        show_table(&store, &config, &table, &[], &["x.list".to_string()], None, true)?;
        show_impact(&store, &config, &table, "x.list:2")?;

        assert!(show_table(&store, &config, &table, &["nope.list".to_string()], &[], None, false)
            .is_err());
        assert!(list_files(&store, &config, Some(dir.path().join("absent").as_path())).is_err());
        Ok(())
    }

    #[test]
    fn test_config_set_writes_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.yaml");
        let mut config = TraceConfig::default();

        let cmd = ConfigCommand::Set {
            display: Some(DisplayArg::Qualified),
            banner: None,
            default_dir: Some(dir.path().to_path_buf()),
        };
        handle_config_command(&cmd, &mut config, &path)?;

        let loaded = TraceConfig::load(&path)?;
        assert_eq!(loaded.display_mode, DisplayMode::Qualified);
        assert_eq!(loaded.default_dir.as_deref(), Some(dir.path()));
        Ok(())
    }
}
