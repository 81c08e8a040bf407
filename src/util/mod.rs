//! Utility functions module
//!
//! Contains helpers for formatting cut values, coverage, sizes and
//! elapsed times.

pub mod format;

// Re-export commonly used functions
pub use format::{format_bytes, format_coverage, format_cut, format_elapsed, parse_coverage};
