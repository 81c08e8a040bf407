//! Greedy cut selection
//!
//! Each iteration scores every candidate cut by the number of conflicting
//! pairs it separates that no chosen cut separates yet, and keeps the best.
//! Gains for all candidates of an attribute are computed in one sweep over
//! the unseparated pairs using a difference array over candidate indices.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::data::DecisionTable;
use crate::discretize::cuts::{candidate_cuts, Cut, CutSet};
use crate::discretize::pairs::{conflicting_pairs, ObjectPair, SeparationSet};
use crate::models::{DiscretizationResult, DiscretizationStats};
use crate::{DiscretizeError, Result};

/// Stopping and tie-breaking rule for the greedy search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Criterion {
    /// Add cuts until no cut separates another pair
    Main,
    /// Stop once the separated fraction reaches `target_coverage`; among
    /// equally good cuts prefer attributes that are already cut
    Secondary {
        /// Fraction of conflicting pairs to separate (0.0, 1.0]
        target_coverage: f64,
    },
}

impl Criterion {
    /// Short name used in output file names
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Main => "main",
            Criterion::Secondary { .. } => "secondary",
        }
    }

    fn is_satisfied(&self, separation: &SeparationSet) -> bool {
        match self {
            Criterion::Main => separation.is_complete(),
            Criterion::Secondary { target_coverage } => {
                separation.coverage() >= *target_coverage
            }
        }
    }

    fn prefers_used_attributes(&self) -> bool {
        matches!(self, Criterion::Secondary { .. })
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Main => write!(f, "main"),
            Criterion::Secondary { target_coverage } => {
                write!(f, "secondary (target {:.0}%)", target_coverage * 100.0)
            }
        }
    }
}

/// Progress update sent after every accepted cut
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Iterations completed so far
    pub iteration: usize,
    /// Attribute name and value of the cut just added
    pub attribute: String,
    pub cut: f64,
    /// Pairs newly separated by this cut
    pub gain: usize,
    /// Pairs separated so far
    pub separated_pairs: usize,
    /// Total conflicting pairs
    pub total_pairs: usize,
    /// Elapsed time since start
    pub elapsed: Duration,
}

impl ProgressUpdate {
    /// Fraction of conflicting pairs separated (0.0 to 1.0)
    pub fn coverage(&self) -> f64 {
        if self.total_pairs == 0 {
            1.0
        } else {
            self.separated_pairs as f64 / self.total_pairs as f64
        }
    }
}

/// Candidate cuts of one attribute plus, for every conflicting pair, the
/// half-open range of candidate indices that separate it.
struct AttributeCandidates {
    cuts: Vec<f64>,
    ranges: Vec<(u32, u32)>,
}

impl AttributeCandidates {
    fn build(column: &[f64], pairs: &[ObjectPair]) -> Self {
        let cuts = candidate_cuts(column);
        let ranges = pairs
            .iter()
            .map(|pair| {
                let (a, b) = (column[pair.left], column[pair.right]);
                let (low, high) = if a <= b { (a, b) } else { (b, a) };
                let start = cuts.partition_point(|c| *c < low);
                let end = cuts.partition_point(|c| *c < high);
                (start as u32, end as u32)
            })
            .collect();
        Self { cuts, ranges }
    }

    /// Gain of every candidate against the current separation state
    fn gains(&self, separation: &SeparationSet) -> Vec<usize> {
        let mut diff = vec![0isize; self.cuts.len() + 1];
        for (index, &(start, end)) in self.ranges.iter().enumerate() {
            if start < end && !separation.is_separated(index) {
                diff[start as usize] += 1;
                diff[end as usize] -= 1;
            }
        }

        let mut running = 0isize;
        diff.iter()
            .take(self.cuts.len())
            .map(|d| {
                running += d;
                running as usize
            })
            .collect()
    }

    fn separates(&self, pair_index: usize, cut_index: usize) -> bool {
        let (start, end) = self.ranges[pair_index];
        (start as usize) <= cut_index && cut_index < end as usize
    }
}

/// Greedy discretizer for a single criterion
#[derive(Debug, Clone)]
pub struct Discretizer {
    criterion: Criterion,
}

impl Discretizer {
    /// Create a discretizer, rejecting an out-of-range coverage target
    pub fn new(criterion: Criterion) -> Result<Self> {
        if let Criterion::Secondary { target_coverage } = criterion {
            if !(target_coverage > 0.0 && target_coverage <= 1.0) {
                return Err(DiscretizeError::Config(format!(
                    "Target coverage must be in (0, 1], got {}",
                    target_coverage
                )));
            }
        }
        Ok(Self { criterion })
    }

    /// Run the greedy search and rewrite the table as intervals.
    ///
    /// Progress updates are dropped when the channel is full. A closed
    /// channel means the caller gave up and aborts the run.
    pub fn run(
        &self,
        table: &DecisionTable,
        progress_tx: Option<&mpsc::Sender<ProgressUpdate>>,
    ) -> Result<DiscretizationResult> {
        let start_time = Instant::now();

        let pairs = conflicting_pairs(table);
        info!(
            "Generated {} object pairs with different decisions.",
            pairs.len()
        );
        if !pairs.is_empty() && !table.is_consistent() {
            warn!("Table is inconsistent; some pairs cannot be separated by any cut");
        }

        let candidates: Vec<AttributeCandidates> = (0..table.num_attributes())
            .map(|attribute| AttributeCandidates::build(&table.column(attribute), &pairs))
            .collect();

        let mut cuts = CutSet::new(table.attribute_names().to_vec());
        let mut separation = SeparationSet::new(pairs.len());
        let mut iterations = 0;

        while !self.criterion.is_satisfied(&separation) {
            let Some((attribute, cut_index, gain)) = self.best_cut(&candidates, &cuts, &separation)
            else {
                break;
            };

            let value = candidates[attribute].cuts[cut_index];
            cuts.insert(Cut { attribute, value });
            for pair_index in 0..pairs.len() {
                if candidates[attribute].separates(pair_index, cut_index) {
                    separation.mark(pair_index);
                }
            }
            iterations += 1;

            let name = &table.attribute_names()[attribute];
            debug!(
                "Added cut {} on attribute '{}', separated {} new pairs.",
                value, name, gain
            );

            if let Some(tx) = progress_tx {
                if tx.is_closed() {
                    return Err(DiscretizeError::Cancelled(
                        "progress receiver dropped".to_string(),
                    ));
                }
                // A full channel only means the display is behind
                let _ = tx.try_send(ProgressUpdate {
                    iteration: iterations,
                    attribute: name.clone(),
                    cut: value,
                    gain,
                    separated_pairs: separation.count(),
                    total_pairs: separation.len(),
                    elapsed: start_time.elapsed(),
                });
            }
        }

        let rows = (0..table.num_objects())
            .map(|object| {
                let mut row: Vec<String> = table
                    .row(object)
                    .iter()
                    .enumerate()
                    .map(|(attribute, value)| cuts.interval(attribute, *value).to_string())
                    .collect();
                row.push(table.decision(object).to_string());
                row
            })
            .collect();

        let stats = DiscretizationStats {
            total_pairs: separation.len(),
            separated_pairs: separation.count(),
            cuts_added: cuts.total(),
            coverage: separation.coverage(),
            iterations,
            elapsed: start_time.elapsed(),
        };
        info!(
            "Criterion {}: {} cuts, {}/{} pairs separated",
            self.criterion, stats.cuts_added, stats.separated_pairs, stats.total_pairs
        );

        Ok(DiscretizationResult {
            criterion: self.criterion,
            header: table.header(),
            cuts,
            rows,
            stats,
        })
    }

    /// Best `(attribute, candidate index, gain)`, or None if nothing gains
    fn best_cut(
        &self,
        candidates: &[AttributeCandidates],
        cuts: &CutSet,
        separation: &SeparationSet,
    ) -> Option<(usize, usize, usize)> {
        let mut best: Option<(usize, usize, usize)> = None;

        for (attribute, attribute_candidates) in candidates.iter().enumerate() {
            let used = !cuts.for_attribute(attribute).is_empty();
            for (cut_index, gain) in attribute_candidates.gains(separation).into_iter().enumerate()
            {
                if gain == 0 {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some((best_attribute, _, best_gain)) => {
                        gain > best_gain
                            || (gain == best_gain
                                && self.criterion.prefers_used_attributes()
                                && used
                                && cuts.for_attribute(best_attribute).is_empty())
                    }
                };
                if better {
                    best = Some((attribute, cut_index, gain));
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&[f64]], decisions: &[&str]) -> DecisionTable {
        let attributes = (0..columns.len()).map(|i| format!("attr{}", i + 1)).collect();
        let rows = (0..decisions.len())
            .map(|row| columns.iter().map(|c| c[row]).collect())
            .collect();
        DecisionTable::new(
            attributes,
            "decision".into(),
            rows,
            decisions.iter().map(|d| d.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_basic_main_criterion() {
        let t = table(
            &[&[1.0, 2.0, 3.0, 4.0, 5.0], &[0.5, 1.5, 2.5, 3.5, 4.5]],
            &["A", "B", "A", "B", "A"],
        );
        let result = Discretizer::new(Criterion::Main).unwrap().run(&t, None).unwrap();

        assert_eq!(result.stats.total_pairs, 6);
        assert_eq!(result.stats.separated_pairs, 6);
        assert_eq!(result.stats.coverage, 1.0);
        // Four boundaries between alternating labels, all on the first attribute
        assert_eq!(result.cuts.for_attribute(0), &[1.5, 2.5, 3.5, 4.5]);
        assert!(result.cuts.for_attribute(1).is_empty());
        assert_eq!(result.stats.cuts_added, 4);
        assert_eq!(result.rows[0], vec!["(-inf; 1.5]", "(-inf; inf)", "A"]);
        assert_eq!(result.rows[4], vec!["(4.5; inf)", "(-inf; inf)", "A"]);
    }

    #[test]
    fn test_first_cut_has_largest_gain() {
        let t = table(&[&[1.0, 2.0, 3.0, 4.0, 5.0]], &["A", "B", "A", "B", "A"]);
        let (tx, mut rx) = mpsc::channel(16);
        Discretizer::new(Criterion::Main)
            .unwrap()
            .run(&t, Some(&tx))
            .unwrap();

        let first = rx.try_recv().unwrap();
        assert_eq!(first.iteration, 1);
        assert_eq!(first.cut, 2.5);
        assert_eq!(first.gain, 3);
        assert_eq!(first.separated_pairs, 3);
    }

    #[test]
    fn test_already_separated() {
        let t = table(&[&[1.0, 2.0, 1.1, 2.1]], &["A", "B", "A", "B"]);
        let result = Discretizer::new(Criterion::Main).unwrap().run(&t, None).unwrap();
        assert_eq!(result.stats.cuts_added, 1);
        assert_eq!(result.stats.coverage, 1.0);
        assert_eq!(result.cuts.for_attribute(0), &[1.55]);
    }

    #[test]
    fn test_extreme_values_fully_separated() {
        for (low, high) in [(1.0000000000000002, 1.0000000000000004), (1e308, 1.7e308)] {
            let t = table(&[&[low, high]], &["A", "B"]);
            let result = Discretizer::new(Criterion::Main).unwrap().run(&t, None).unwrap();
            assert_eq!(result.stats.cuts_added, 1);
            assert_eq!(result.stats.coverage, 1.0);
            assert_ne!(result.rows[0][0], result.rows[1][0]);
        }
    }

    #[test]
    fn test_single_class() {
        let t = table(&[&[1.0, 2.0, 3.0]], &["A", "A", "A"]);
        let result = Discretizer::new(Criterion::Main).unwrap().run(&t, None).unwrap();
        assert_eq!(result.stats.total_pairs, 0);
        assert_eq!(result.stats.cuts_added, 0);
        assert_eq!(result.stats.coverage, 1.0);
        assert!(result.rows.iter().all(|row| row[0] == "(-inf; inf)"));
    }

    #[test]
    fn test_inconsistent_table_stops() {
        let t = table(&[&[1.0, 1.0, 2.0]], &["A", "B", "B"]);
        let result = Discretizer::new(Criterion::Main).unwrap().run(&t, None).unwrap();
        assert_eq!(result.stats.total_pairs, 2);
        assert_eq!(result.stats.separated_pairs, 1);
        assert_eq!(result.stats.cuts_added, 1);
        assert_eq!(result.stats.coverage, 0.5);
    }

    #[test]
    fn test_secondary_stops_at_target() {
        let t = table(
            &[&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]],
            &["A", "B", "A", "B", "A", "B", "A", "B"],
        );
        let main = Discretizer::new(Criterion::Main).unwrap().run(&t, None).unwrap();
        let secondary = Discretizer::new(Criterion::Secondary {
            target_coverage: 0.5,
        })
        .unwrap()
        .run(&t, None)
        .unwrap();

        assert_eq!(main.stats.cuts_added, 7);
        assert!(secondary.stats.cuts_added < main.stats.cuts_added);
        assert!(secondary.stats.coverage >= 0.5);
        assert!(secondary.stats.coverage < main.stats.coverage);
    }

    #[test]
    fn test_secondary_prefers_used_attribute_on_tie() {
        // attr2 wins the first round outright; afterwards isolating object 4
        // is worth two pairs on either attribute
        let t = table(
            &[&[0.0, 0.0, 0.0, 0.0, 1.0], &[1.0, 2.0, 3.0, 4.0, 5.0]],
            &["A", "A", "B", "B", "A"],
        );

        let main = Discretizer::new(Criterion::Main).unwrap().run(&t, None).unwrap();
        assert_eq!(main.cuts.for_attribute(0), &[0.5]);
        assert_eq!(main.cuts.for_attribute(1), &[2.5]);
        assert_eq!(main.cuts.attributes_used(), 2);

        let secondary = Discretizer::new(Criterion::Secondary {
            target_coverage: 1.0,
        })
        .unwrap()
        .run(&t, None)
        .unwrap();
        assert_eq!(secondary.stats.coverage, 1.0);
        assert!(secondary.cuts.for_attribute(0).is_empty());
        assert_eq!(secondary.cuts.for_attribute(1), &[2.5, 4.5]);
        assert_eq!(secondary.cuts.attributes_used(), 1);
    }

    #[test]
    fn test_invalid_target_rejected() {
        assert!(Discretizer::new(Criterion::Secondary { target_coverage: 0.0 }).is_err());
        assert!(Discretizer::new(Criterion::Secondary { target_coverage: 1.5 }).is_err());
    }

    #[test]
    fn test_closed_channel_cancels() {
        let t = table(&[&[1.0, 2.0]], &["A", "B"]);
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let result = Discretizer::new(Criterion::Main).unwrap().run(&t, Some(&tx));
        assert!(matches!(result, Err(DiscretizeError::Cancelled(_))));
    }
}
