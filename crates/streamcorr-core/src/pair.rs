//! Pair identities: which two streams a correlation operator consumes and
//! which matrix cell its results target.

use serde::Serialize;
use thiserror::Error;

/// Ordered pair of stream indices with `row < col`.
///
/// A `PairId` names exactly one correlation operator and one off-diagonal
/// cell of the output matrix. It is fixed at topology-construction time and
/// travels inside every [`CorrelationResult`](crate::message::CorrelationResult),
/// so the aggregator recovers cell identity from the message itself rather
/// than from the port it arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PairId {
    row: usize,
    col: usize,
}

/// Rejected pair coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pair identity requires row < col, got ({row}, {col})")]
pub struct InvalidPair {
    pub row: usize,
    pub col: usize,
}

impl PairId {
    /// Build a pair identity, enforcing `row < col`.
    pub fn new(row: usize, col: usize) -> Result<Self, InvalidPair> {
        if row < col {
            Ok(Self { row, col })
        } else {
            Err(InvalidPair { row, col })
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Collision-free integer key for this pair.
    ///
    /// Both the wiring layer and any external delivery mechanism can derive
    /// stable names from this single function, so no identity ever depends
    /// on string parsing.
    pub fn key(&self) -> u64 {
        ((self.row as u64) << 32) | self.col as u64
    }

    /// Deterministic port/node name derived from [`PairId::key`].
    ///
    /// Used both for the operator node and for the aggregator input port it
    /// feeds.
    pub fn port_name(&self) -> String {
        format!("corr_{}_{}", self.row, self.col)
    }
}

impl std::fmt::Display for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Enumerate every unordered pair `(h, j)` with `h < j < variable_count`,
/// in row-major order. Yields exactly `n * (n - 1) / 2` pairs.
pub fn unordered_pairs(variable_count: usize) -> Vec<PairId> {
    let mut pairs = Vec::with_capacity(variable_count * variable_count.saturating_sub(1) / 2);
    for h in 0..variable_count {
        for j in (h + 1)..variable_count {
            pairs.push(PairId { row: h, col: j });
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_enforces_order() {
        assert!(PairId::new(0, 1).is_ok());
        assert!(PairId::new(1, 1).is_err());
        assert!(PairId::new(2, 1).is_err());
    }

    #[test]
    fn test_pair_count_formula() {
        for n in 2..=8 {
            assert_eq!(unordered_pairs(n).len(), n * (n - 1) / 2);
        }
        assert!(unordered_pairs(0).is_empty());
        assert!(unordered_pairs(1).is_empty());
    }

    #[test]
    fn test_keys_are_collision_free() {
        let pairs = unordered_pairs(16);
        let keys: HashSet<u64> = pairs.iter().map(|p| p.key()).collect();
        let names: HashSet<String> = pairs.iter().map(|p| p.port_name()).collect();
        assert_eq!(keys.len(), pairs.len());
        assert_eq!(names.len(), pairs.len());
    }

    #[test]
    fn test_port_name_is_stable() {
        let pair = PairId::new(3, 7).unwrap();
        assert_eq!(pair.port_name(), "corr_3_7");
        assert_eq!(pair.key(), (3u64 << 32) | 7);
    }
}
