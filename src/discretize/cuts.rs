//! Cut points and interval labels

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::format_cut;

/// A threshold on one attribute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    /// Attribute index in column order
    pub attribute: usize,
    pub value: f64,
}

/// Midpoints between consecutive distinct values, ascending.
///
/// Every candidate `c` for neighbours `low < high` satisfies
/// `low <= c < high`, so it separates values on both sides.
pub fn candidate_cuts(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();

    let mut cuts: Vec<f64> = sorted.windows(2).map(|w| midpoint(w[0], w[1])).collect();
    cuts.dedup();
    cuts
}

/// Halving first keeps large values finite. Between adjacent floats the
/// midpoint rounds onto `high`, so fall back to `low`.
fn midpoint(low: f64, high: f64) -> f64 {
    let mid = low / 2.0 + high / 2.0;
    if low <= mid && mid < high {
        mid
    } else {
        low
    }
}

/// Interval an attribute value falls into under a set of cuts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interval {
    /// No cuts on the attribute
    Unbounded,
    /// `(-inf; right]`
    Below(f64),
    /// `(left; right]`
    Between(f64, f64),
    /// `(left; inf)`
    Above(f64),
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Unbounded => write!(f, "(-inf; inf)"),
            Interval::Below(right) => write!(f, "(-inf; {}]", format_cut(*right)),
            Interval::Between(left, right) => {
                write!(f, "({}; {}]", format_cut(*left), format_cut(*right))
            }
            Interval::Above(left) => write!(f, "({}; inf)", format_cut(*left)),
        }
    }
}

/// Sorted, duplicate-free cuts for every attribute of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutSet {
    attributes: Vec<String>,
    cuts: Vec<Vec<f64>>,
}

impl CutSet {
    /// Empty cut set over the given attributes
    pub fn new(attributes: Vec<String>) -> Self {
        let cuts = vec![Vec::new(); attributes.len()];
        Self { attributes, cuts }
    }

    /// Insert a cut; returns false if it was already present
    pub fn insert(&mut self, cut: Cut) -> bool {
        let cuts = &mut self.cuts[cut.attribute];
        match cuts.binary_search_by(|c| c.total_cmp(&cut.value)) {
            Ok(_) => false,
            Err(position) => {
                cuts.insert(position, cut.value);
                true
            }
        }
    }

    pub fn contains(&self, cut: Cut) -> bool {
        self.cuts[cut.attribute]
            .binary_search_by(|c| c.total_cmp(&cut.value))
            .is_ok()
    }

    pub fn for_attribute(&self, attribute: usize) -> &[f64] {
        &self.cuts[attribute]
    }

    pub fn attribute_names(&self) -> &[String] {
        &self.attributes
    }

    /// Total number of cuts across attributes
    pub fn total(&self) -> usize {
        self.cuts.iter().map(Vec::len).sum()
    }

    /// Number of attributes with at least one cut
    pub fn attributes_used(&self) -> usize {
        self.cuts.iter().filter(|c| !c.is_empty()).count()
    }

    /// Interval for `value` on `attribute`
    pub fn interval(&self, attribute: usize, value: f64) -> Interval {
        let cuts = &self.cuts[attribute];
        if cuts.is_empty() {
            return Interval::Unbounded;
        }

        // First cut with value <= cut closes the interval
        let position = cuts.partition_point(|c| *c < value);
        match position {
            0 => Interval::Below(cuts[0]),
            p if p == cuts.len() => Interval::Above(cuts[p - 1]),
            p => Interval::Between(cuts[p - 1], cuts[p]),
        }
    }

    /// Iterate over `(attribute name, cuts)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.attributes
            .iter()
            .map(String::as_str)
            .zip(self.cuts.iter().map(Vec::as_slice))
    }
}
