//! Data models module
//!
//! Contains discretization results, run statistics, reports and
//! run history records.

pub mod result;

// Re-export commonly used types
pub use result::{
    AttributeCuts,
    DiscretizationReport,
    DiscretizationResult,
    DiscretizationStats,
    RunRecord,
};
