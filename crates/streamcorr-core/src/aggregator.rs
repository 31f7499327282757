//! Assembles per-pair correlation results into completed matrices.

use std::collections::BTreeMap;

use crate::config::ConfigError;
use crate::element::{AGGREGATOR_NODE, Element, PORT_OUTPUT, StepError};
use crate::matrix::CorrelationMatrix;
use crate::message::{CorrelationResult, MatrixFrame, Message};
use crate::pair::unordered_pairs;

/// In-progress matrix for one batch number.
struct MatrixState {
    matrix: CorrelationMatrix,
    filled: usize,
}

impl MatrixState {
    fn new(dim: usize) -> Self {
        Self {
            matrix: CorrelationMatrix::identity(dim),
            filled: 0,
        }
    }
}

/// Collects results from every pair operator, keyed by batch number.
///
/// Results for one batch arrive in arbitrary order from N·(N−1)/2
/// independent operators, and batches interleave freely — a late operator
/// may still be on batch 1 while others report batch 3. Completion depends
/// only on the fill count reaching N·(N−1)/2, never on arrival order.
///
/// Each coefficient is written at the **transpose** `(col, row)` of its
/// pair identity, matching the pipeline's historical cell addressing; the
/// mirror cell `(row, col)` stays unset.
pub struct MatrixAggregator {
    dim: usize,
    required: usize,
    max_pending: usize,
    pending: BTreeMap<u64, MatrixState>,
}

impl MatrixAggregator {
    pub fn new(dim: usize, max_pending: usize) -> Result<Self, ConfigError> {
        if dim < 2 {
            return Err(ConfigError::VariableCount(dim));
        }
        if max_pending == 0 {
            return Err(ConfigError::MaxPendingBatches(max_pending));
        }
        Ok(Self {
            dim,
            required: dim * (dim - 1) / 2,
            max_pending,
            pending: BTreeMap::new(),
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Results needed to complete one batch: N·(N−1)/2.
    pub fn required_fills(&self) -> usize {
        self.required
    }

    /// Batches currently held incomplete.
    pub fn pending_batches(&self) -> usize {
        self.pending.len()
    }

    /// Place one result, returning the completed frame if it was the last
    /// missing cell for its batch.
    ///
    /// The state for a completed batch is removed immediately; incomplete
    /// batches are bounded by `max_pending` — opening one more evicts the
    /// oldest (lowest) pending batch number.
    pub fn accept(
        &mut self,
        result: CorrelationResult,
    ) -> Result<Option<MatrixFrame>, StepError> {
        if result.pair.col() >= self.dim {
            return Err(StepError::PairOutOfRange {
                pair: result.pair,
                dim: self.dim,
            });
        }

        if !self.pending.contains_key(&result.batch) && self.pending.len() >= self.max_pending {
            if let Some((evicted, state)) = self.pending.pop_first() {
                log::warn!(
                    "evicting stale batch {} ({}/{} cells filled)",
                    evicted,
                    state.filled,
                    self.required
                );
            }
        }

        let state = self
            .pending
            .entry(result.batch)
            .or_insert_with(|| MatrixState::new(self.dim));
        state
            .matrix
            .set(result.pair.col(), result.pair.row(), result.coefficient);
        state.filled += 1;

        if state.filled < self.required {
            return Ok(None);
        }

        let state = self
            .pending
            .remove(&result.batch)
            .expect("entry inserted above");
        log::debug!("batch {} complete, emitting matrix", result.batch);
        Ok(Some(MatrixFrame {
            batch: result.batch,
            matrix: state.matrix,
        }))
    }
}

impl Element for MatrixAggregator {
    fn name(&self) -> String {
        AGGREGATOR_NODE.to_string()
    }

    fn input_ports(&self) -> Vec<String> {
        unordered_pairs(self.dim)
            .iter()
            .map(|p| p.port_name())
            .collect()
    }

    fn output_ports(&self) -> Vec<String> {
        vec![PORT_OUTPUT.to_string()]
    }

    fn process(
        &mut self,
        port: &str,
        message: Message,
    ) -> Result<Vec<(String, Message)>, StepError> {
        let result = match message {
            Message::Result(result) => result,
            other => {
                return Err(StepError::PayloadMismatch {
                    node: self.name(),
                    port: port.to_string(),
                    payload: other.kind(),
                });
            }
        };
        // The identity travels with the message; the port is only a wiring
        // convenience, but a mismatch between the two means bad wiring.
        if port != result.pair.port_name() {
            return Err(StepError::MisroutedResult {
                pair: result.pair,
                port: port.to_string(),
            });
        }

        Ok(self
            .accept(result)?
            .map(|frame| (PORT_OUTPUT.to_string(), Message::Matrix(frame)))
            .into_iter()
            .collect())
    }
}
