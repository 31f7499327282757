//! Immutable payloads crossing component boundaries.
//!
//! Nothing mutable is shared between components: a source hands samples to
//! its operators, operators hand results to the aggregator, and the
//! aggregator hands completed frames to the sink — always by value.

use serde::Serialize;

use crate::matrix::CorrelationMatrix;
use crate::pair::PairId;

/// One generated value plus the producing stream's identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Index of the producing stream.
    pub stream: usize,
    /// The drawn value.
    pub value: f64,
}

/// Which of an operator's two input channels a sample arrived on.
///
/// The channel is a property of the message's origin, resolved from the
/// destination port at delivery time — never inferred by trying one buffer
/// and falling back on the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Channel {
    One,
    Two,
}

impl Channel {
    /// The operator input port carrying this channel.
    pub fn port_name(&self) -> &'static str {
        match self {
            Self::One => crate::element::PORT_INPUT1,
            Self::Two => crate::element::PORT_INPUT2,
        }
    }

    /// Resolve a channel from an operator input port name.
    pub fn from_port(port: &str) -> Option<Self> {
        match port {
            crate::element::PORT_INPUT1 => Some(Self::One),
            crate::element::PORT_INPUT2 => Some(Self::Two),
            _ => None,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.port_name())
    }
}

/// One windowed correlation, emitted exactly once per completed window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationResult {
    /// Sample Pearson coefficient; `NaN` for degenerate windows.
    pub coefficient: f64,
    /// Per-operator window index, monotonically increasing from 0.
    pub batch: u64,
    /// Identity of the producing operator and its target matrix cell.
    pub pair: PairId,
}

/// A completed correlation matrix for one batch number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixFrame {
    pub batch: u64,
    pub matrix: CorrelationMatrix,
}

/// Port-level payload union.
///
/// Every message an external delivery mechanism moves along an edge is one
/// of these variants; all of them are plain immutable data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Message {
    /// Broadcast start signal: how many samples each source must produce.
    Trigger { iterations: u64 },
    Sample(Sample),
    Result(CorrelationResult),
    Matrix(MatrixFrame),
}

impl Message {
    /// Short payload name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Trigger { .. } => "trigger",
            Self::Sample(_) => "sample",
            Self::Result(_) => "result",
            Self::Matrix(_) => "matrix",
        }
    }
}
