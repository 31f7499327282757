//! # streamcorr-core
//!
//! **Streaming pairwise correlation over windowed random sample streams.**
//!
//! `streamcorr-core` implements a small dataflow pipeline: N uniform random
//! sample streams feed one windowed Pearson correlation operator per
//! unordered stream pair, and a single aggregator assembles every pair's
//! per-window result into an N×N correlation matrix.
//!
//! ## Quick Start
//!
//! ```no_run
//! use streamcorr_core::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::new(10, 100.0, 5, 15);
//! let mut pipeline = Pipeline::build(&config).unwrap();
//!
//! // 10 sources, 45 pair operators, one aggregator with 45 input ports.
//! assert_eq!(pipeline.sources.len(), 10);
//! assert_eq!(pipeline.operators.len(), 45);
//! assert_eq!(pipeline.aggregator.required_fills(), 45);
//! # let _ = pipeline.elements_mut();
//! ```
//!
//! ## Architecture
//!
//! Trigger → N sources (parallel) → N·(N−1)/2 pair operators → aggregator → sink
//!
//! Each component is an independent type implementing [`Element`]: a
//! synchronous, non-reentrant transformation of private state given one
//! inbound message. Scheduling and message delivery belong to an external
//! execution engine; the core only promises that outputs are reported with
//! the port they were emitted on, and [`Topology`] describes the wiring as
//! plain data (named nodes, named ports, directed edges).
//!
//! Two behavioral quirks are deliberate and documented on
//! [`PairCorrelationOperator`] and [`MatrixAggregator`]: correlation windows
//! use (and drain) `window_size − 1` samples although firing waits for
//! `window_size`, and each coefficient is written at the transposed cell of
//! its pair identity, leaving the mirror cell unset.

pub mod aggregator;
pub mod config;
pub mod element;
pub mod matrix;
pub mod message;
pub mod operator;
pub mod pair;
pub mod source;
pub mod stats;
pub mod topology;

pub use aggregator::MatrixAggregator;
pub use config::{ConfigError, DEFAULT_MAX_PENDING_BATCHES, PipelineConfig};
pub use element::{
    AGGREGATOR_NODE, Element, PORT_INPUT1, PORT_INPUT2, PORT_ITERATIONS, PORT_OUTPUT,
    StepError, TRIGGER_NODE, TriggerFanout, source_node_name,
};
pub use matrix::CorrelationMatrix;
pub use message::{Channel, CorrelationResult, MatrixFrame, Message, Sample};
pub use operator::PairCorrelationOperator;
pub use pair::{InvalidPair, PairId, unordered_pairs};
pub use source::RandomStreamSource;
pub use stats::pearson;
pub use topology::{
    BuildError, Edge, NodeKind, NodeSpec, Pipeline, Topology, WiringError, build_topology,
};

/// Crate version, exposed for CLI `--version` output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
