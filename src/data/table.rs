//! In-memory decision table
//!
//! Objects are rows; each row holds one numeric value per condition
//! attribute plus a symbolic decision label.

use std::collections::{BTreeMap, HashMap};

use crate::{DiscretizeError, Result};

/// A decision table with numeric condition attributes
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTable {
    attributes: Vec<String>,
    decision: String,
    rows: Vec<Vec<f64>>,
    decisions: Vec<String>,
}

impl DecisionTable {
    /// Build a table, checking that every row has one value per attribute
    /// and that every row has a decision.
    pub fn new(
        attributes: Vec<String>,
        decision: String,
        rows: Vec<Vec<f64>>,
        decisions: Vec<String>,
    ) -> Result<Self> {
        if attributes.is_empty() {
            return Err(DiscretizeError::InvalidData(
                "the dataset must contain at least one attribute and one decision column"
                    .to_string(),
            ));
        }

        if rows.len() != decisions.len() {
            return Err(DiscretizeError::InvalidData(format!(
                "{} rows but {} decisions",
                rows.len(),
                decisions.len()
            )));
        }

        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != attributes.len())
        {
            return Err(DiscretizeError::InvalidData(format!(
                "row {} has {} attribute values, expected {}",
                index + 1,
                row.len(),
                attributes.len()
            )));
        }

        Ok(Self {
            attributes,
            decision,
            rows,
            decisions,
        })
    }

    /// Condition attribute names in column order
    pub fn attribute_names(&self) -> &[String] {
        &self.attributes
    }

    /// Name of the decision column
    pub fn decision_name(&self) -> &str {
        &self.decision
    }

    /// Full header: attributes followed by the decision
    pub fn header(&self) -> Vec<String> {
        let mut header = self.attributes.clone();
        header.push(self.decision.clone());
        header
    }

    pub fn num_objects(&self) -> usize {
        self.rows.len()
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, object: usize, attribute: usize) -> f64 {
        self.rows[object][attribute]
    }

    pub fn row(&self, object: usize) -> &[f64] {
        &self.rows[object]
    }

    pub fn decision(&self, object: usize) -> &str {
        &self.decisions[object]
    }

    pub fn decisions(&self) -> &[String] {
        &self.decisions
    }

    /// All values of one attribute, in object order
    pub fn column(&self, attribute: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[attribute]).collect()
    }

    /// Number of objects per decision class, ordered by label
    pub fn class_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for decision in &self.decisions {
            *counts.entry(decision.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Whether no two objects share all attribute values yet differ in decision.
    ///
    /// An inconsistent table can never reach full pair coverage.
    pub fn is_consistent(&self) -> bool {
        let mut seen: HashMap<Vec<u64>, &str> = HashMap::with_capacity(self.rows.len());
        for (row, decision) in self.rows.iter().zip(&self.decisions) {
            // -0.0 and 0.0 must compare equal here
            let key: Vec<u64> = row.iter().map(|v| (v + 0.0).to_bits()).collect();
            match seen.get(&key) {
                Some(existing) if *existing != decision.as_str() => return false,
                Some(_) => {}
                None => {
                    seen.insert(key, decision.as_str());
                }
            }
        }
        true
    }
}
