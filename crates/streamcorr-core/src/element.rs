//! The processing contract every pipeline component exposes to an external
//! execution engine.
//!
//! There is no shared component base and no shared mutable state: each
//! component is an independent type implementing [`Element`]. An engine
//! invokes `process` with one inbound message at a time (components are
//! non-reentrant) and delivers the returned `(port, message)` pairs along
//! whatever edges the topology declares.

use thiserror::Error;

use crate::message::Message;
use crate::pair::PairId;

/// Trigger input port on the trigger node and every source.
pub const PORT_ITERATIONS: &str = "iterations";
/// Default output port on trigger, sources, operators and the aggregator.
pub const PORT_OUTPUT: &str = "output";
/// First operator input channel.
pub const PORT_INPUT1: &str = "input1";
/// Second operator input channel.
pub const PORT_INPUT2: &str = "input2";
/// Node name of the trigger fan-out.
pub const TRIGGER_NODE: &str = "trigger";
/// Node name of the matrix aggregator.
pub const AGGREGATOR_NODE: &str = "matrix";

/// Node name of a stream source.
pub fn source_node_name(stream: usize) -> String {
    format!("source{stream}")
}

/// A message arrived somewhere it cannot be handled.
///
/// These are structural failures — bad wiring, not bad data — and they
/// abort processing on first contact instead of being absorbed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error("node `{node}` has no input port `{port}`")]
    UnknownPort { node: String, port: String },
    #[error("port `{port}` on node `{node}` does not accept {payload} payloads")]
    PayloadMismatch {
        node: String,
        port: String,
        payload: &'static str,
    },
    #[error("result for pair {pair} arrived on aggregator port `{port}`")]
    MisroutedResult { pair: PairId, port: String },
    #[error("result for pair {pair} does not fit a {dim}x{dim} matrix")]
    PairOutOfRange { pair: PairId, dim: usize },
}

/// Anything exposing `process(inputs) -> outputs`.
///
/// The engine owns scheduling and delivery; an element only transforms its
/// private state given one inbound message and reports what it emitted and
/// where. The source's rate-limiting pause happens inside its `process`
/// call — that is the one intrinsically blocking step in the pipeline.
pub trait Element {
    /// Node name this element answers to in the topology.
    fn name(&self) -> String;

    /// Input port names, fixed at construction.
    fn input_ports(&self) -> Vec<String>;

    /// Output port names, fixed at construction.
    fn output_ports(&self) -> Vec<String>;

    /// Handle one inbound message, returning emitted `(port, message)`
    /// pairs in emission order.
    fn process(&mut self, port: &str, message: Message)
    -> Result<Vec<(String, Message)>, StepError>;
}

/// Broadcast node: forwards the start trigger to every source.
#[derive(Debug, Clone, Default)]
pub struct TriggerFanout;

impl Element for TriggerFanout {
    fn name(&self) -> String {
        TRIGGER_NODE.to_string()
    }

    fn input_ports(&self) -> Vec<String> {
        vec![PORT_ITERATIONS.to_string()]
    }

    fn output_ports(&self) -> Vec<String> {
        vec![PORT_OUTPUT.to_string()]
    }

    fn process(
        &mut self,
        port: &str,
        message: Message,
    ) -> Result<Vec<(String, Message)>, StepError> {
        if port != PORT_ITERATIONS {
            return Err(StepError::UnknownPort {
                node: self.name(),
                port: port.to_string(),
            });
        }
        match message {
            Message::Trigger { .. } => Ok(vec![(PORT_OUTPUT.to_string(), message)]),
            other => Err(StepError::PayloadMismatch {
                node: self.name(),
                port: port.to_string(),
                payload: other.kind(),
            }),
        }
    }
}
