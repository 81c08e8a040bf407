//! Discretizer - greedy cut-based discretization for decision tables
//!
//! Reads a CSV decision table (numeric condition attributes followed by a
//! symbolic decision column), finds a small set of cuts that discerns objects
//! with different decisions and rewrites every value as an interval.

use std::fmt;
use std::path::PathBuf;

// Public re-exports
pub mod config;
pub mod data;
pub mod discretize;
pub mod models;
pub mod runner;
pub mod util;

// Common error types
#[derive(Debug)]
pub enum DiscretizeError {
    /// I/O operation failed
    Io(std::io::Error),
    /// Input file does not exist
    NotFound(PathBuf),
    /// Input file has zero bytes
    EmptyFile(PathBuf),
    /// Input file has no header or no data rows
    NoData(PathBuf),
    /// Table structure is not a valid decision table
    InvalidData(String),
    /// CSV input could not be parsed
    Csv(csv::Error),
    /// Configuration validation or parsing error
    Config(String),
    /// Run history or report persistence error
    Persistence(String),
    /// Background work was cancelled
    Cancelled(String),
    /// Background worker failed without being cancelled
    Worker(String),
}

impl fmt::Display for DiscretizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscretizeError::Io(err) => write!(f, "I/O error: {}", err),
            DiscretizeError::NotFound(path) => {
                write!(f, "The file '{}' does not exist", path.display())
            }
            DiscretizeError::EmptyFile(path) => {
                write!(f, "The file '{}' is empty", path.display())
            }
            DiscretizeError::NoData(path) => {
                write!(f, "The file '{}' contains no data", path.display())
            }
            DiscretizeError::InvalidData(msg) => write!(f, "Invalid dataset: {}", msg),
            DiscretizeError::Csv(err) => write!(f, "CSV error: {}", err),
            DiscretizeError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DiscretizeError::Persistence(msg) => write!(f, "Persistence error: {}", msg),
            DiscretizeError::Cancelled(msg) => write!(f, "Cancelled: {}", msg),
            DiscretizeError::Worker(msg) => write!(f, "Worker error: {}", msg),
        }
    }
}

impl std::error::Error for DiscretizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiscretizeError::Io(err) => Some(err),
            DiscretizeError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DiscretizeError {
    fn from(err: std::io::Error) -> Self {
        DiscretizeError::Io(err)
    }
}

impl From<csv::Error> for DiscretizeError {
    fn from(err: csv::Error) -> Self {
        DiscretizeError::Csv(err)
    }
}

impl From<serde_json::Error> for DiscretizeError {
    fn from(err: serde_json::Error) -> Self {
        DiscretizeError::Persistence(format!("JSON serialization error: {}", err))
    }
}

impl From<toml::de::Error> for DiscretizeError {
    fn from(err: toml::de::Error) -> Self {
        DiscretizeError::Config(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for DiscretizeError {
    fn from(err: toml::ser::Error) -> Self {
        DiscretizeError::Config(format!("TOML serialization error: {}", err))
    }
}

/// Result type alias for discretizer operations
pub type Result<T> = std::result::Result<T, DiscretizeError>;

/// Error handling utilities
pub mod error {
    use super::DiscretizeError;

    /// Whether processing of a batch may continue after this error.
    ///
    /// Problems with one input file are reported and skipped. Configuration,
    /// output and worker failures abort the batch.
    pub fn is_recoverable(error: &DiscretizeError) -> bool {
        matches!(
            error,
            DiscretizeError::NotFound(_)
                | DiscretizeError::EmptyFile(_)
                | DiscretizeError::NoData(_)
                | DiscretizeError::InvalidData(_)
                | DiscretizeError::Csv(_)
        )
    }

    /// Convert error to user-friendly message with suggestions
    pub fn user_friendly_message(error: &DiscretizeError) -> String {
        match error {
            DiscretizeError::NotFound(path) => format!(
                "Error: The file '{}' does not exist. Check the path and try again.",
                path.display()
            ),
            DiscretizeError::EmptyFile(path) => {
                format!("Error: The file '{}' is empty.", path.display())
            }
            DiscretizeError::NoData(path) => {
                format!("Error: The file '{}' contains no data.", path.display())
            }
            DiscretizeError::InvalidData(msg) => format!("Error: {}.", msg),
            DiscretizeError::Config(msg) => {
                format!("Configuration error: {}. Check your settings.", msg)
            }
            DiscretizeError::Persistence(_) => {
                "Failed to save results. Check disk space and permissions.".to_string()
            }
            DiscretizeError::Io(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                "Permission denied. Check file permissions.".to_string()
            }
            _ => error.to_string(),
        }
    }

    /// Process exit code for a fatal error
    pub fn exit_code(error: &DiscretizeError) -> i32 {
        match error {
            DiscretizeError::Config(_) => 2,
            DiscretizeError::Cancelled(_) => 130,
            _ => 1,
        }
    }
}

// Common types and constants
pub const APP_NAME: &str = "discretizer";
pub const CONFIG_FILE: &str = "discretizer.toml";
pub const HISTORY_FILE: &str = "history.json";
pub const MAX_HISTORY: usize = 100;
pub const OUTPUT_SUFFIX: &str = "discretized.csv";
pub const REPORT_SUFFIX: &str = "report.json";
pub const DEFAULT_INPUTS: &[&str] = &["qewrty.csv", "test_data.csv", "iris.csv"];
