//! Construction-time pipeline configuration.
//!
//! Every parameter is validated before any component is built; a bad value
//! aborts construction with an error naming the offending parameter.

use serde::Serialize;
use thiserror::Error;

/// Default bound on concurrently pending (incomplete) matrix batches.
pub const DEFAULT_MAX_PENDING_BATCHES: usize = 64;

/// Rejected configuration parameter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("variable_count must be at least 2, got {0}")]
    VariableCount(usize),
    #[error("sampling_rate must be positive and finite, got {0}")]
    SamplingRate(f64),
    #[error("window_size must be at least 1, got {0}")]
    WindowSize(usize),
    #[error("max_pending_batches must be at least 1, got {0}")]
    MaxPendingBatches(usize),
}

/// Static parameters of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    /// Number of generated streams; also the matrix dimension N.
    pub variable_count: usize,
    /// Target samples per second for each stream.
    pub sampling_rate: f64,
    /// Samples required per channel before an operator fires.
    pub window_size: usize,
    /// Total samples each stream produces. Zero emits nothing.
    pub iteration_count: u64,
    /// Incomplete batches retained by the aggregator before the oldest is
    /// evicted.
    pub max_pending_batches: usize,
}

impl PipelineConfig {
    /// Configuration with the default pending-batch bound.
    pub fn new(
        variable_count: usize,
        sampling_rate: f64,
        window_size: usize,
        iteration_count: u64,
    ) -> Self {
        Self {
            variable_count,
            sampling_rate,
            window_size,
            iteration_count,
            max_pending_batches: DEFAULT_MAX_PENDING_BATCHES,
        }
    }

    /// Validate every parameter, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.variable_count < 2 {
            return Err(ConfigError::VariableCount(self.variable_count));
        }
        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return Err(ConfigError::SamplingRate(self.sampling_rate));
        }
        if self.window_size == 0 {
            return Err(ConfigError::WindowSize(self.window_size));
        }
        if self.max_pending_batches == 0 {
            return Err(ConfigError::MaxPendingBatches(self.max_pending_batches));
        }
        Ok(())
    }

    /// Number of pair operators (and aggregator input ports): N·(N−1)/2.
    pub fn pair_count(&self) -> usize {
        self.variable_count * (self.variable_count - 1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config_passes() {
        let cfg = PipelineConfig::new(10, 100.0, 5, 15);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.pair_count(), 45);
    }

    #[test]
    fn test_zero_iterations_allowed() {
        let cfg = PipelineConfig::new(3, 1.0, 2, 0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_small_variable_count() {
        for n in [0, 1] {
            let cfg = PipelineConfig::new(n, 100.0, 5, 15);
            assert_eq!(cfg.validate(), Err(ConfigError::VariableCount(n)));
        }
    }

    #[test]
    fn test_rejects_bad_sampling_rate() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = PipelineConfig::new(3, rate, 5, 15);
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::SamplingRate(_))
            ));
        }
    }

    #[test]
    fn test_rejects_zero_window() {
        let cfg = PipelineConfig::new(3, 100.0, 0, 15);
        assert_eq!(cfg.validate(), Err(ConfigError::WindowSize(0)));
    }

    #[test]
    fn test_error_messages_name_the_parameter() {
        let err = PipelineConfig::new(1, 100.0, 5, 15).validate().unwrap_err();
        assert!(err.to_string().contains("variable_count"));
        let err = PipelineConfig::new(3, 0.0, 5, 15).validate().unwrap_err();
        assert!(err.to_string().contains("sampling_rate"));
    }
}
