//! Discretization result data models
//!
//! Contains structures for storing and serializing discretization results,
//! run statistics and the run history records.

use crate::discretize::{Criterion, CutSet};
use crate::util::{format_coverage, format_elapsed};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Statistics collected during one greedy run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscretizationStats {
    /// Number of object pairs with different decisions
    pub total_pairs: usize,
    /// Pairs separated by the chosen cuts
    pub separated_pairs: usize,
    /// Number of cuts across all attributes
    pub cuts_added: usize,
    /// `separated_pairs / total_pairs`, 1.0 when there are no pairs
    pub coverage: f64,
    /// Greedy iterations performed
    pub iterations: usize,
    /// Wall time of the search and relabelling
    #[serde(with = "duration_serde")]
    pub elapsed: Duration,
}

/// Complete outcome of discretizing one table with one criterion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscretizationResult {
    /// Criterion that drove the search
    pub criterion: Criterion,
    /// Original header: attributes then decision
    pub header: Vec<String>,
    /// Chosen cuts per attribute
    pub cuts: CutSet,
    /// Interval labels per object, decision last
    pub rows: Vec<Vec<String>>,
    /// Run statistics
    pub stats: DiscretizationStats,
}

/// JSON report written next to the discretized table
#[derive(Debug, Serialize, Deserialize)]
pub struct DiscretizationReport {
    pub input: PathBuf,
    pub criterion: Criterion,
    pub cuts: Vec<AttributeCuts>,
    pub stats: DiscretizationStats,
}

/// Cuts of a single attribute, as written in reports
#[derive(Debug, Serialize, Deserialize)]
pub struct AttributeCuts {
    pub attribute: String,
    pub cuts: Vec<f64>,
}

/// One entry of the persisted run history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Timestamp when the run finished
    pub timestamp: DateTime<Utc>,
    /// Input CSV file
    pub input: PathBuf,
    /// Discretized CSV written for this run, if any
    pub output: Option<PathBuf>,
    /// Criterion used
    pub criterion: Criterion,
    /// Objects and attributes in the input table
    pub objects: usize,
    pub attributes: usize,
    /// Run statistics
    pub stats: DiscretizationStats,
    /// Operating system and architecture
    pub host: String,
}

impl DiscretizationResult {
    /// Distinct interval labels used for one attribute, in row order
    pub fn distinct_intervals(&self, attribute: usize) -> Vec<&str> {
        let mut seen = Vec::new();
        for row in &self.rows {
            let label = row[attribute].as_str();
            if !seen.contains(&label) {
                seen.push(label);
            }
        }
        seen
    }

    /// Build the JSON report for this result
    pub fn report(&self, input: PathBuf) -> DiscretizationReport {
        DiscretizationReport {
            input,
            criterion: self.criterion,
            cuts: self
                .cuts
                .iter()
                .map(|(attribute, cuts)| AttributeCuts {
                    attribute: attribute.to_string(),
                    cuts: cuts.to_vec(),
                })
                .collect(),
            stats: self.stats.clone(),
        }
    }
}

impl RunRecord {
    /// Create a record stamped with the current time and host
    pub fn new(
        input: PathBuf,
        output: Option<PathBuf>,
        result: &DiscretizationResult,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            input,
            output,
            criterion: result.criterion,
            objects: result.rows.len(),
            attributes: result.header.len().saturating_sub(1),
            stats: result.stats.clone(),
            host: detect_host(),
        }
    }

    /// Get a human-readable summary of the run
    pub fn summary(&self) -> String {
        format!(
            "{} - {} - {} - {} cuts - {}/{} pairs ({}) - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.input.display(),
            self.criterion,
            self.stats.cuts_added,
            self.stats.separated_pairs,
            self.stats.total_pairs,
            format_coverage(self.stats.coverage),
            format_elapsed(self.stats.elapsed)
        )
    }
}

fn detect_host() -> String {
    format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)
}

// Durations are stored as nanoseconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // u64 nanoseconds cover ~584 years and serialize with every format
        (duration.as_nanos() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretize::Cut;

    fn create_test_result() -> DiscretizationResult {
        let mut cuts = CutSet::new(vec!["attr1".to_string(), "attr2".to_string()]);
        cuts.insert(Cut {
            attribute: 0,
            value: 1.5,
        });

        DiscretizationResult {
            criterion: Criterion::Main,
            header: vec!["attr1".into(), "attr2".into(), "decision".into()],
            cuts,
            rows: vec![
                vec!["(-inf; 1.5]".into(), "(-inf; inf)".into(), "A".into()],
                vec!["(1.5; inf)".into(), "(-inf; inf)".into(), "B".into()],
                vec!["(-inf; 1.5]".into(), "(-inf; inf)".into(), "A".into()],
            ],
            stats: DiscretizationStats {
                total_pairs: 2,
                separated_pairs: 2,
                cuts_added: 1,
                coverage: 1.0,
                iterations: 1,
                elapsed: Duration::from_millis(3),
            },
        }
    }

    #[test]
    fn test_distinct_intervals() {
        let result = create_test_result();
        assert_eq!(
            result.distinct_intervals(0),
            vec!["(-inf; 1.5]", "(1.5; inf)"]
        );
        assert_eq!(result.distinct_intervals(1), vec!["(-inf; inf)"]);
    }

    #[test]
    fn test_report_lists_every_attribute() {
        let report = create_test_result().report(PathBuf::from("data.csv"));
        assert_eq!(report.cuts.len(), 2);
        assert_eq!(report.cuts[0].attribute, "attr1");
        assert_eq!(report.cuts[0].cuts, vec![1.5]);
        assert!(report.cuts[1].cuts.is_empty());
    }

    #[test]
    fn test_run_record_summary() {
        let result = create_test_result();
        let record = RunRecord::new(PathBuf::from("data.csv"), None, &result);

        assert_eq!(record.objects, 3);
        assert_eq!(record.attributes, 2);
        assert!(record.timestamp <= Utc::now());

        let summary = record.summary();
        assert!(summary.contains("data.csv"));
        assert!(summary.contains("main"));
        assert!(summary.contains("1 cuts"));
        assert!(summary.contains("100.0%"));
    }

    #[test]
    fn test_run_record_serde() {
        let record = RunRecord::new(
            PathBuf::from("data.csv"),
            Some(PathBuf::from("data.csv_main_discretized.csv")),
            &create_test_result(),
        );
        let json = serde_json::to_string(&record).expect("Failed to serialize");
        let restored: RunRecord = serde_json::from_str(&json).expect("Failed to deserialize");

        assert_eq!(restored.stats, record.stats);
        assert_eq!(restored.criterion, Criterion::Main);
        assert_eq!(restored.output, record.output);
    }
}
