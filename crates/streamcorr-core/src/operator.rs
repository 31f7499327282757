//! Pairwise windowed-correlation operators.

use crate::config::ConfigError;
use crate::element::{Element, PORT_INPUT1, PORT_INPUT2, PORT_OUTPUT, StepError};
use crate::message::{Channel, CorrelationResult, Message};
use crate::pair::PairId;
use crate::stats;

/// Correlates two independently-arriving sample channels in sliding windows.
///
/// Samples are buffered per channel. After any append, once **both** buffers
/// hold at least `window_size` samples the operator fires: it correlates the
/// first `window_size - 1` elements of each buffer, emits the result with
/// the current batch number, drains that prefix from both buffers, and
/// increments the batch counter.
///
/// Note the off-by-one: the computed window and the advance both use
/// `window_size - 1` elements even though firing waits for `window_size`.
/// Successive windows therefore overlap by one element, and `window_size`
/// is one larger than the number of samples actually correlated. This is
/// the long-standing behavior of the pipeline and is kept as-is; with
/// `window_size == 1` the window is empty, the coefficient is `NaN`, and
/// nothing is drained, so the operator fires on every append once both
/// channels are non-empty.
pub struct PairCorrelationOperator {
    pair: PairId,
    window_size: usize,
    batch: u64,
    channel1: Vec<f64>,
    channel2: Vec<f64>,
}

impl PairCorrelationOperator {
    pub fn new(pair: PairId, window_size: usize) -> Result<Self, ConfigError> {
        if window_size == 0 {
            return Err(ConfigError::WindowSize(window_size));
        }
        Ok(Self {
            pair,
            window_size,
            batch: 0,
            channel1: Vec::new(),
            channel2: Vec::new(),
        })
    }

    pub fn pair(&self) -> PairId {
        self.pair
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Next batch number to be emitted.
    pub fn batch(&self) -> u64 {
        self.batch
    }

    /// Samples currently buffered on one channel.
    pub fn buffered(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::One => &self.channel1,
            Channel::Two => &self.channel2,
        }
    }

    /// Append a sample to the tagged channel and fire if both windows are
    /// full.
    ///
    /// At most one result is produced per append. If the other channel
    /// never delivers, the operator simply never fires — a stalled channel
    /// is silent, not an error.
    pub fn push(&mut self, channel: Channel, value: f64) -> Option<CorrelationResult> {
        match channel {
            Channel::One => self.channel1.push(value),
            Channel::Two => self.channel2.push(value),
        }

        if self.channel1.len() < self.window_size || self.channel2.len() < self.window_size {
            return None;
        }

        let take = self.window_size - 1;
        let coefficient = stats::pearson(&self.channel1[..take], &self.channel2[..take]);
        let result = CorrelationResult {
            coefficient,
            batch: self.batch,
            pair: self.pair,
        };
        self.channel1.drain(..take);
        self.channel2.drain(..take);
        self.batch += 1;
        log::debug!(
            "operator {} fired batch {} (r = {})",
            self.pair,
            result.batch,
            coefficient
        );
        Some(result)
    }
}

impl Element for PairCorrelationOperator {
    fn name(&self) -> String {
        self.pair.port_name()
    }

    fn input_ports(&self) -> Vec<String> {
        vec![PORT_INPUT1.to_string(), PORT_INPUT2.to_string()]
    }

    fn output_ports(&self) -> Vec<String> {
        vec![PORT_OUTPUT.to_string()]
    }

    fn process(
        &mut self,
        port: &str,
        message: Message,
    ) -> Result<Vec<(String, Message)>, StepError> {
        let Some(channel) = Channel::from_port(port) else {
            return Err(StepError::UnknownPort {
                node: self.name(),
                port: port.to_string(),
            });
        };
        let sample = match message {
            Message::Sample(sample) => sample,
            other => {
                return Err(StepError::PayloadMismatch {
                    node: self.name(),
                    port: port.to_string(),
                    payload: other.kind(),
                });
            }
        };

        Ok(self
            .push(channel, sample.value)
            .map(|result| (PORT_OUTPUT.to_string(), Message::Result(result)))
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operator(window: usize) -> PairCorrelationOperator {
        PairCorrelationOperator::new(PairId::new(0, 1).unwrap(), window).unwrap()
    }

    #[test]
    fn test_linear_channels_fire_with_unit_coefficient() {
        let mut op = operator(3);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            assert!(op.push(Channel::One, v).is_none());
        }
        assert!(op.push(Channel::Two, 2.0).is_none());
        assert!(op.push(Channel::Two, 4.0).is_none());
        // Third sample on channel 2 completes both windows.
        let result = op.push(Channel::Two, 6.0).expect("operator must fire");
        assert_eq!(result.batch, 0);
        assert_eq!(result.pair, PairId::new(0, 1).unwrap());
        assert!((result.coefficient - 1.0).abs() < 1e-12);

        // The advance drops window_size - 1 = 2 elements from each buffer.
        assert_eq!(op.buffered(Channel::One), &[3.0, 4.0, 5.0]);
        assert_eq!(op.buffered(Channel::Two), &[6.0]);
        assert_eq!(op.batch(), 1);
    }

    #[test]
    fn test_overlapping_windows_share_one_element() {
        // Channel 1: [1..5], channel 2: [2,4,6,8,10], window 3. The first
        // firing correlates [1,2]/[2,4] and leaves [3,4,5]/[6]; the sample
        // that met the firing threshold (3 resp. 6) is carried into the
        // next full buffer, so once channel 2 catches up the operator fires
        // again over [3,4]/[6,8].
        let mut op = operator(3);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            assert!(op.push(Channel::One, v).is_none());
        }
        let mut fired = Vec::new();
        for v in [2.0, 4.0, 6.0, 8.0, 10.0] {
            fired.extend(op.push(Channel::Two, v));
        }
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].batch, 0);
        assert!((fired[0].coefficient - 1.0).abs() < 1e-12);
        assert_eq!(fired[1].batch, 1);
        assert!((fired[1].coefficient - 1.0).abs() < 1e-12);
        assert_eq!(op.buffered(Channel::One), &[5.0]);
        assert_eq!(op.buffered(Channel::Two), &[10.0]);
    }

    #[test]
    fn test_zero_variance_window_emits_nan() {
        let mut op = operator(4);
        for _ in 0..4 {
            op.push(Channel::One, 7.0);
        }
        let mut last = None;
        for v in [1.0, 2.0, 3.0, 4.0] {
            last = op.push(Channel::Two, v).or(last);
        }
        let result = last.expect("operator must fire");
        assert!(result.coefficient.is_nan());
    }

    #[test]
    fn test_stalled_channel_never_fires() {
        let mut op = operator(3);
        for v in 0..100 {
            assert!(op.push(Channel::One, v as f64).is_none());
        }
        assert_eq!(op.batch(), 0);
        assert_eq!(op.buffered(Channel::Two).len(), 0);
    }

    #[test]
    fn test_window_one_fires_empty_window() {
        let mut op = operator(1);
        assert!(op.push(Channel::One, 1.0).is_none());
        let first = op.push(Channel::Two, 2.0).expect("both channels non-empty");
        assert_eq!(first.batch, 0);
        assert!(first.coefficient.is_nan());
        // Nothing was drained, so every further append fires again.
        let second = op.push(Channel::One, 3.0).expect("fires on every append");
        assert_eq!(second.batch, 1);
        assert_eq!(op.buffered(Channel::One), &[1.0, 3.0]);
        assert_eq!(op.buffered(Channel::Two), &[2.0]);
    }

    #[test]
    fn test_batch_counter_increments_across_windows() {
        let mut op = operator(2);
        let mut batches = Vec::new();
        for v in 0..6 {
            op.push(Channel::One, v as f64);
            if let Some(r) = op.push(Channel::Two, (v * 3) as f64) {
                batches.push(r.batch);
            }
        }
        // Window 2 drains one element per firing, so every interleaved
        // append pair past the first fires once.
        assert_eq!(batches, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_deterministic_replay() {
        let feed = |op: &mut PairCorrelationOperator| {
            let mut results = Vec::new();
            for v in 0..40 {
                results.extend(op.push(Channel::One, (v as f64).sin() * 10.0));
                results.extend(op.push(Channel::Two, (v as f64).cos() * 10.0));
            }
            results
        };
        let mut a = operator(5);
        let mut b = operator(5);
        assert_eq!(feed(&mut a), feed(&mut b));
    }

    #[test]
    fn test_rejects_zero_window() {
        assert!(matches!(
            PairCorrelationOperator::new(PairId::new(0, 1).unwrap(), 0),
            Err(ConfigError::WindowSize(0))
        ));
    }

    #[test]
    fn test_process_requires_known_channel_port() {
        let mut op = operator(3);
        let err = op
            .process(
                "input3",
                Message::Sample(crate::message::Sample {
                    stream: 0,
                    value: 1.0,
                }),
            )
            .unwrap_err();
        assert!(matches!(err, StepError::UnknownPort { .. }));
    }

    #[test]
    fn test_process_routes_by_port_tag() {
        let mut op = operator(2);
        op.process(
            PORT_INPUT1,
            Message::Sample(crate::message::Sample {
                stream: 0,
                value: 1.0,
            }),
        )
        .unwrap();
        let out = op
            .process(
                PORT_INPUT2,
                Message::Sample(crate::message::Sample {
                    stream: 1,
                    value: 2.0,
                }),
            )
            .unwrap();
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0].1, Message::Result(_)));
        assert_eq!(op.buffered(Channel::One).len(), 1);
        assert_eq!(op.buffered(Channel::Two).len(), 1);
    }
}
