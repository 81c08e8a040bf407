//! Discretization engine
//!
//! Conflicting pair enumeration, candidate cuts and the greedy search
//! that picks cuts until the chosen criterion is met.

pub mod cuts;
pub mod greedy;
pub mod pairs;

// Re-export commonly used types
pub use cuts::{candidate_cuts, Cut, CutSet, Interval};
pub use greedy::{Criterion, Discretizer, ProgressUpdate};
pub use pairs::{conflicting_pairs, ObjectPair, SeparationSet};

use crate::data::DecisionTable;
use crate::models::DiscretizationResult;
use crate::Result;

/// Discretize a table with one criterion, without progress reporting.
pub fn discretize_data(table: &DecisionTable, criterion: Criterion) -> Result<DiscretizationResult> {
    Discretizer::new(criterion)?.run(table, None)
}
