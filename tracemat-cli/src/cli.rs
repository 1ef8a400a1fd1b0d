use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Traceability matrices over plain-text list and table files")]
pub struct Cli {
    /// Path to the config file (defaults to TRACEMAT_CONFIG or the user config dir)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured header display mode
    #[clap(long, global = true, value_enum)]
    pub display: Option<DisplayArg>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DisplayArg {
    Label,
    Debug,
    Qualified,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum MarkArg {
    Present,
    Absent,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the list and table files of a directory
    Files {
        /// Directory to scan (prompted for when omitted and not configured)
        #[clap(long, short = 'd')]
        dir: Option<PathBuf>,
    },

    /// Show the elements of a list file
    List {
        /// Path to the list file
        path: PathBuf,
    },

    /// Render a table as a grid
    Show {
        /// Path to the table file
        table: PathBuf,

        /// Groups to collapse along the row axis
        #[clap(long, value_delimiter = ',')]
        collapse_rows: Vec<String>,

        /// Groups to collapse along the column axis
        #[clap(long, value_delimiter = ',')]
        collapse_cols: Vec<String>,

        /// Click the grid cell at ROW COL before rendering
        #[clap(long, num_args = 2, value_names = ["ROW", "COL"])]
        select: Option<Vec<usize>>,

        /// Print the grid as JSON cell descriptors
        #[clap(long)]
        json: bool,
    },

    /// Print every element and edge that reaches an element
    Impact {
        /// Path to the table file
        table: PathBuf,

        /// Element key (file:id)
        element: String,
    },

    /// Set one edge and save the table
    Set {
        /// Path to the table file
        table: PathBuf,

        /// Source element key (file:id)
        #[clap(long)]
        from: String,

        /// Target element key (file:id)
        #[clap(long)]
        to: String,

        /// Edge mark
        #[clap(long, value_enum, default_value = "present")]
        mark: MarkArg,

        /// Edge description
        #[clap(long, default_value = "")]
        description: String,
    },

    /// Edit one edge interactively and save the table
    Edit {
        /// Path to the table file
        table: PathBuf,

        /// Source element key (file:id)
        #[clap(long)]
        from: String,

        /// Target element key (file:id)
        #[clap(long)]
        to: String,
    },

    /// Replace the list files a table refers to, e.g. "a.list + b.list"
    Lists {
        /// Path to the table file
        table: PathBuf,

        /// New selection; prompted for when omitted
        selection: Option<String>,
    },

    /// Show or change configuration
    #[clap(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the active configuration
    Show,

    /// Print the path of the config file
    Path,

    /// Change configuration values
    Set {
        /// Header display mode
        #[clap(long, value_enum)]
        display: Option<DisplayArg>,

        /// Banner line written to table files
        #[clap(long)]
        banner: Option<String>,

        /// Default directory for `files`
        #[clap(long)]
        default_dir: Option<PathBuf>,
    },
}
