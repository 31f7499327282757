//! Uniform random stream sources.

use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ConfigError;
use crate::element::{Element, PORT_ITERATIONS, PORT_OUTPUT, StepError, source_node_name};
use crate::message::{Message, Sample};

/// Half-open range every generated value is drawn from.
const SAMPLE_RANGE: std::ops::Range<f64> = 0.0..100.0;

/// One bounded uniform sample stream.
///
/// Given an iteration count, the source produces exactly that many samples,
/// each drawn uniformly from `[0, 100)`, pausing `1 / sampling_rate` seconds
/// before each emission so the long-run emission rate approximates the
/// configured rate. The pause is the only blocking step in the whole
/// pipeline.
pub struct RandomStreamSource {
    stream: usize,
    sampling_rate: f64,
    rng: StdRng,
}

impl RandomStreamSource {
    /// Source with an OS-seeded generator.
    pub fn new(stream: usize, sampling_rate: f64) -> Result<Self, ConfigError> {
        Self::from_rng(stream, sampling_rate, StdRng::from_os_rng())
    }

    /// Source with a fixed seed, for reproducible runs.
    pub fn with_seed(stream: usize, sampling_rate: f64, seed: u64) -> Result<Self, ConfigError> {
        Self::from_rng(stream, sampling_rate, StdRng::seed_from_u64(seed))
    }

    fn from_rng(stream: usize, sampling_rate: f64, rng: StdRng) -> Result<Self, ConfigError> {
        if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
            return Err(ConfigError::SamplingRate(sampling_rate));
        }
        Ok(Self {
            stream,
            sampling_rate,
            rng,
        })
    }

    pub fn stream(&self) -> usize {
        self.stream
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Emit exactly `iterations` samples through `emit`, pacing each one.
    ///
    /// An iteration count of zero emits nothing.
    pub fn run(&mut self, iterations: u64, emit: &mut dyn FnMut(Sample)) {
        let pause = Duration::from_secs_f64(1.0 / self.sampling_rate);
        for _ in 0..iterations {
            thread::sleep(pause);
            let value = self.rng.random_range(SAMPLE_RANGE);
            emit(Sample {
                stream: self.stream,
                value,
            });
        }
    }
}

impl Element for RandomStreamSource {
    fn name(&self) -> String {
        source_node_name(self.stream)
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
        let iterations = match message {
            Message::Trigger { iterations } => iterations,
            other => {
                return Err(StepError::PayloadMismatch {
                    node: self.name(),
                    port: port.to_string(),
                    payload: other.kind(),
                });
            }
        };

        let mut out = Vec::with_capacity(iterations as usize);
        self.run(iterations, &mut |sample| {
            out.push((PORT_OUTPUT.to_string(), Message::Sample(sample)));
        });
        log::debug!("source {} emitted {} samples", self.stream, out.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn collect(source: &mut RandomStreamSource, iterations: u64) -> Vec<Sample> {
        let mut samples = Vec::new();
        source.run(iterations, &mut |s| samples.push(s));
        samples
    }

    #[test]
    fn test_emits_exact_count() {
        let mut source = RandomStreamSource::with_seed(0, 1e6, 1).unwrap();
        assert_eq!(collect(&mut source, 25).len(), 25);
    }

    #[test]
    fn test_zero_iterations_emit_nothing() {
        let mut source = RandomStreamSource::with_seed(0, 1e6, 1).unwrap();
        assert!(collect(&mut source, 0).is_empty());
    }

    #[test]
    fn test_values_in_range_and_tagged() {
        let mut source = RandomStreamSource::with_seed(4, 1e6, 99).unwrap();
        for sample in collect(&mut source, 200) {
            assert_eq!(sample.stream, 4);
            assert!((0.0..100.0).contains(&sample.value));
        }
    }

    #[test]
    fn test_seeded_streams_replay() {
        let mut a = RandomStreamSource::with_seed(0, 1e6, 7).unwrap();
        let mut b = RandomStreamSource::with_seed(0, 1e6, 7).unwrap();
        assert_eq!(collect(&mut a, 50), collect(&mut b, 50));
    }

    #[test]
    fn test_rejects_nonpositive_rate() {
        assert!(matches!(
            RandomStreamSource::new(0, 0.0),
            Err(ConfigError::SamplingRate(_))
        ));
        assert!(matches!(
            RandomStreamSource::new(0, -5.0),
            Err(ConfigError::SamplingRate(_))
        ));
    }

    #[test]
    fn test_rate_paces_emissions() {
        // 20 samples at 200 Hz sleep at least 100 ms in total.
        let mut source = RandomStreamSource::with_seed(0, 200.0, 3).unwrap();
        let started = Instant::now();
        collect(&mut source, 20);
        assert!(started.elapsed() >= Duration::from_millis(95));
    }

    #[test]
    fn test_process_wraps_samples() {
        let mut source = RandomStreamSource::with_seed(2, 1e6, 5).unwrap();
        let out = source
            .process(PORT_ITERATIONS, Message::Trigger { iterations: 3 })
            .unwrap();
        assert_eq!(out.len(), 3);
        for (port, message) in out {
            assert_eq!(port, PORT_OUTPUT);
            assert!(matches!(message, Message::Sample(s) if s.stream == 2));
        }
    }

    #[test]
    fn test_process_rejects_sample_payload() {
        let mut source = RandomStreamSource::with_seed(0, 1e6, 5).unwrap();
        let err = source
            .process(
                PORT_ITERATIONS,
                Message::Sample(Sample {
                    stream: 9,
                    value: 1.0,
                }),
            )
            .unwrap_err();
        assert!(matches!(err, StepError::PayloadMismatch { .. }));
    }
}
