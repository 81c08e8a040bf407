//! Conflicting object pairs and their separation state

use crate::data::DecisionTable;

/// Two objects with different decisions, `left < right`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectPair {
    pub left: usize,
    pub right: usize,
}

impl ObjectPair {
    /// Whether a cut at `cut` puts the two values on opposite sides
    pub fn separated_by(&self, column: &[f64], cut: f64) -> bool {
        let (a, b) = (column[self.left], column[self.right]);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        low <= cut && cut < high
    }
}

/// Every pair of objects with different decisions, in lexicographic order
pub fn conflicting_pairs(table: &DecisionTable) -> Vec<ObjectPair> {
    let decisions = table.decisions();
    let mut pairs = Vec::new();
    for left in 0..decisions.len() {
        for right in (left + 1)..decisions.len() {
            if decisions[left] != decisions[right] {
                pairs.push(ObjectPair { left, right });
            }
        }
    }
    pairs
}

/// Tracks which conflicting pairs are already separated by chosen cuts
#[derive(Debug, Clone)]
pub struct SeparationSet {
    words: Vec<u64>,
    len: usize,
    count: usize,
}

impl SeparationSet {
    /// Empty set over `len` pairs
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
            count: 0,
        }
    }

    pub fn is_separated(&self, index: usize) -> bool {
        self.words[index / 64] & (1 << (index % 64)) != 0
    }

    /// Mark a pair; returns true if it was not separated before
    pub fn mark(&mut self, index: usize) -> bool {
        let word = &mut self.words[index / 64];
        let bit = 1 << (index % 64);
        if *word & bit != 0 {
            return false;
        }
        *word |= bit;
        self.count += 1;
        true
    }

    /// Number of separated pairs
    pub fn count(&self) -> usize {
        self.count
    }

    /// Total number of tracked pairs
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_complete(&self) -> bool {
        self.count == self.len
    }

    /// Fraction of separated pairs; 1.0 when there is nothing to separate
    pub fn coverage(&self) -> f64 {
        if self.len == 0 {
            1.0
        } else {
            self.count as f64 / self.len as f64
        }
    }
}
