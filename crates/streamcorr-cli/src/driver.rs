//! Minimal synchronous driver for a built pipeline.
//!
//! This is a reference stand-in for the external execution engine: a FIFO
//! message pump over the topology's edges, delivering one message to one
//! component at a time. It upholds the core's correctness boundary (no
//! component is ever re-entered) and makes no guarantee beyond per-channel
//! FIFO order. Matrices emitted on the aggregator's unconnected output port
//! are collected as the run's result.

use std::collections::{HashMap, VecDeque};

use streamcorr_core::{
    Element, MatrixFrame, Message, PORT_ITERATIONS, Pipeline, StepError, TRIGGER_NODE,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DriverError {
    #[error("message addressed to unknown node `{0}`")]
    UnknownNode(String),
    #[error(transparent)]
    Step(#[from] StepError),
}

/// Broadcast the start trigger and pump messages until the pipeline drains.
pub fn execute(pipeline: &mut Pipeline) -> Result<Vec<MatrixFrame>, DriverError> {
    let iterations = pipeline.config.iteration_count;

    let mut routes: HashMap<(String, String), Vec<(String, String)>> = HashMap::new();
    for edge in &pipeline.topology.edges {
        routes
            .entry((edge.from_node.clone(), edge.from_port.clone()))
            .or_default()
            .push((edge.to_node.clone(), edge.to_port.clone()));
    }

    let mut elements: HashMap<String, &mut dyn Element> = HashMap::new();
    for element in pipeline.elements_mut() {
        elements.insert(element.name(), element);
    }

    let mut queue: VecDeque<(String, String, Message)> = VecDeque::new();
    queue.push_back((
        TRIGGER_NODE.to_string(),
        PORT_ITERATIONS.to_string(),
        Message::Trigger { iterations },
    ));

    let mut frames = Vec::new();
    while let Some((node, port, message)) = queue.pop_front() {
        let element = elements
            .get_mut(&node)
            .ok_or_else(|| DriverError::UnknownNode(node.clone()))?;
        for (out_port, out_message) in element.process(&port, message)? {
            match routes.get(&(node.clone(), out_port)) {
                Some(targets) => {
                    for (to_node, to_port) in targets {
                        queue.push_back((to_node.clone(), to_port.clone(), out_message.clone()));
                    }
                }
                // Unconnected output: the aggregator's frames end here.
                None => {
                    if let Message::Matrix(frame) = out_message {
                        frames.push(frame);
                    }
                }
            }
        }
    }

    log::debug!("pipeline drained, {} completed matrices", frames.len());
    Ok(frames)
}
