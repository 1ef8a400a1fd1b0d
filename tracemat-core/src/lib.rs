pub mod config;
pub mod error;
pub mod impact;
pub mod layout;
pub mod list;
pub mod matrix;
pub mod serializer;
pub mod session;
pub mod storage;
pub mod table;

// Re-export commonly used types
pub use config::{get_config_path, TraceConfig};
pub use error::{TraceError, TraceResult};
pub use impact::{clear_impact_scope, compute_impact_scope, impacted_elements};
pub use layout::{layout, CellAction, CellKind, Grid, GridCell, Span, HEADER_SIZE};
pub use list::{list_to_text, parse_list, DisplayMode, HeaderElement, ListBuffer};
pub use matrix::{Mark, Matrix, MatrixValue, ABSENT_SYMBOL, PRESENT_SYMBOL};
pub use serializer::{serialize_table, DEFAULT_BANNER};
pub use session::{ClickOutcome, EditRequest, GridPos, TableSession};
pub use storage::{file_name_from_path, FileStore, LocalFileStore, MemoryFileStore};
pub use table::{
    load_group, parse_list_selection, parse_table, HeaderGroup, TableDocument, TableParse,
};
