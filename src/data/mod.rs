//! Decision table module
//!
//! Loading, validation and writing of CSV decision tables.

pub mod loader;
pub mod table;
pub mod writer;

// Re-export commonly used items
pub use loader::{load_data, prepare_for_discretization};
pub use table::DecisionTable;
pub(crate) use writer::output_error;
pub use writer::{output_path, report_path, write_discretized, write_report};
