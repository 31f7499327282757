//! Pure topology construction: nodes, ports, edges, and the assembled
//! pipeline.
//!
//! Nothing here talks to a scheduler. `build_topology` returns a plain
//! graph value an external execution engine can wire however it likes, and
//! [`Pipeline::build`] instantiates the matching components. There is no
//! process-wide registry; everything a run needs lives in the returned
//! values.

use serde::Serialize;
use thiserror::Error;

use crate::aggregator::MatrixAggregator;
use crate::config::{ConfigError, PipelineConfig};
use crate::element::{
    AGGREGATOR_NODE, Element, PORT_INPUT1, PORT_INPUT2, PORT_ITERATIONS, PORT_OUTPUT,
    TRIGGER_NODE, TriggerFanout, source_node_name,
};
use crate::operator::PairCorrelationOperator;
use crate::pair::unordered_pairs;
use crate::source::RandomStreamSource;

/// Role of a node in the dataflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Trigger,
    Source,
    Correlator,
    Aggregator,
}

/// One named node and its port surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSpec {
    pub name: String,
    pub kind: NodeKind,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

/// Directed binding from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub from_node: String,
    pub from_port: String,
    pub to_node: String,
    pub to_port: String,
}

/// Structural wiring failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WiringError {
    #[error("duplicate node name `{0}`")]
    DuplicateNode(String),
    #[error("duplicate port `{port}` on node `{node}`")]
    DuplicatePort { node: String, port: String },
    #[error("edge references unknown port `{port}` on node `{node}`")]
    UnknownEndpoint { node: String, port: String },
}

/// The dataflow graph consumed by an external execution engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topology {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<Edge>,
}

impl Topology {
    pub fn node(&self, name: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Nodes of one kind.
    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &NodeSpec> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    /// Check node-name uniqueness, per-node port uniqueness, and that every
    /// edge endpoint names an existing port.
    pub fn validate(&self) -> Result<(), WiringError> {
        let mut names = std::collections::HashSet::new();
        for node in &self.nodes {
            if !names.insert(node.name.as_str()) {
                return Err(WiringError::DuplicateNode(node.name.clone()));
            }
            let mut ports = std::collections::HashSet::new();
            for port in node.inputs.iter().chain(&node.outputs) {
                if !ports.insert(port.as_str()) {
                    return Err(WiringError::DuplicatePort {
                        node: node.name.clone(),
                        port: port.clone(),
                    });
                }
            }
        }
        for edge in &self.edges {
            self.check_endpoint(&edge.from_node, &edge.from_port, false)?;
            self.check_endpoint(&edge.to_node, &edge.to_port, true)?;
        }
        Ok(())
    }

    fn check_endpoint(&self, node: &str, port: &str, input: bool) -> Result<(), WiringError> {
        let missing = || WiringError::UnknownEndpoint {
            node: node.to_string(),
            port: port.to_string(),
        };
        let spec = self.node(node).ok_or_else(missing)?;
        let ports = if input { &spec.inputs } else { &spec.outputs };
        if ports.iter().any(|p| p == port) {
            Ok(())
        } else {
            Err(missing())
        }
    }
}

/// Build the graph for `variable_count` streams: one trigger fan-out, N
/// sources, one correlator per unordered pair, one aggregator with a
/// distinct input port per pair.
pub fn build_topology(variable_count: usize) -> Result<Topology, BuildError> {
    if variable_count < 2 {
        return Err(ConfigError::VariableCount(variable_count).into());
    }

    let pairs = unordered_pairs(variable_count);
    let mut nodes = Vec::with_capacity(variable_count + pairs.len() + 2);
    let mut edges = Vec::new();

    nodes.push(NodeSpec {
        name: TRIGGER_NODE.to_string(),
        kind: NodeKind::Trigger,
        inputs: vec![PORT_ITERATIONS.to_string()],
        outputs: vec![PORT_OUTPUT.to_string()],
    });

    for stream in 0..variable_count {
        let name = source_node_name(stream);
        nodes.push(NodeSpec {
            name: name.clone(),
            kind: NodeKind::Source,
            inputs: vec![PORT_ITERATIONS.to_string()],
            outputs: vec![PORT_OUTPUT.to_string()],
        });
        edges.push(Edge {
            from_node: TRIGGER_NODE.to_string(),
            from_port: PORT_OUTPUT.to_string(),
            to_node: name,
            to_port: PORT_ITERATIONS.to_string(),
        });
    }

    for pair in &pairs {
        let name = pair.port_name();
        nodes.push(NodeSpec {
            name: name.clone(),
            kind: NodeKind::Correlator,
            inputs: vec![PORT_INPUT1.to_string(), PORT_INPUT2.to_string()],
            outputs: vec![PORT_OUTPUT.to_string()],
        });
        edges.push(Edge {
            from_node: source_node_name(pair.row()),
            from_port: PORT_OUTPUT.to_string(),
            to_node: name.clone(),
            to_port: PORT_INPUT1.to_string(),
        });
        edges.push(Edge {
            from_node: source_node_name(pair.col()),
            from_port: PORT_OUTPUT.to_string(),
            to_node: name.clone(),
            to_port: PORT_INPUT2.to_string(),
        });
        edges.push(Edge {
            from_node: name,
            from_port: PORT_OUTPUT.to_string(),
            to_node: AGGREGATOR_NODE.to_string(),
            to_port: pair.port_name(),
        });
    }

    nodes.push(NodeSpec {
        name: AGGREGATOR_NODE.to_string(),
        kind: NodeKind::Aggregator,
        inputs: pairs.iter().map(|p| p.port_name()).collect(),
        outputs: vec![PORT_OUTPUT.to_string()],
    });

    let topology = Topology { nodes, edges };
    topology.validate()?;
    Ok(topology)
}

/// Construction failure: bad parameters or bad wiring.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Wiring(#[from] WiringError),
}

/// A built pipeline: topology plus the component instances behind it.
pub struct Pipeline {
    pub config: PipelineConfig,
    pub topology: Topology,
    pub trigger: TriggerFanout,
    pub sources: Vec<RandomStreamSource>,
    pub operators: Vec<PairCorrelationOperator>,
    pub aggregator: MatrixAggregator,
}

impl Pipeline {
    /// Build with OS-seeded sources.
    pub fn build(config: &PipelineConfig) -> Result<Self, BuildError> {
        Self::assemble(config, None)
    }

    /// Build with deterministically derived per-source seeds.
    pub fn build_seeded(config: &PipelineConfig, seed: u64) -> Result<Self, BuildError> {
        Self::assemble(config, Some(seed))
    }

    fn assemble(config: &PipelineConfig, seed: Option<u64>) -> Result<Self, BuildError> {
        config.validate()?;
        let topology = build_topology(config.variable_count)?;

        let mut sources = Vec::with_capacity(config.variable_count);
        for stream in 0..config.variable_count {
            let source = match seed {
                Some(seed) => RandomStreamSource::with_seed(
                    stream,
                    config.sampling_rate,
                    derive_seed(seed, stream),
                )?,
                None => RandomStreamSource::new(stream, config.sampling_rate)?,
            };
            sources.push(source);
        }

        let mut operators = Vec::with_capacity(config.pair_count());
        for pair in unordered_pairs(config.variable_count) {
            operators.push(PairCorrelationOperator::new(pair, config.window_size)?);
        }

        let aggregator =
            MatrixAggregator::new(config.variable_count, config.max_pending_batches)?;

        Ok(Self {
            config: config.clone(),
            topology,
            trigger: TriggerFanout,
            sources,
            operators,
            aggregator,
        })
    }

    /// Every component behind the topology, for an engine to drive.
    pub fn elements_mut(&mut self) -> Vec<&mut dyn Element> {
        let mut elements: Vec<&mut dyn Element> = Vec::with_capacity(
            2 + self.sources.len() + self.operators.len(),
        );
        elements.push(&mut self.trigger);
        for source in &mut self.sources {
            elements.push(source);
        }
        for operator in &mut self.operators {
            elements.push(operator);
        }
        elements.push(&mut self.aggregator);
        elements
    }
}

/// Stream-specific seed derived from one run seed (splitmix-style spread).
fn derive_seed(seed: u64, stream: usize) -> u64 {
    seed.wrapping_add((stream as u64 + 1).wrapping_mul(0x9E3779B97F4A7C15))
}
