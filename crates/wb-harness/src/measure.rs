//! Timing of world update steps.
//!
//! One sample is `iterations` repetitions of {update the world; drain
//! its concurrent work}. Assertions made after a sample therefore always
//! see a fully-settled world. The harness reports the raw per-sample
//! distribution and judges nothing; pass/fail thresholds belong to the
//! caller or an external reporting sink.

use std::time::{Duration, Instant};

use wb_runtime::World;

use crate::error::HarnessResult;

/// Fixed number of discarded step+drain cycles before sampling.
pub const WARMUP_CYCLES: u32 = 2;

const MIN_ADAPTIVE_SAMPLES: usize = 4;
const MAX_ADAPTIVE_SAMPLES: usize = 32;
const STABLE_RELATIVE_DEVIATION: f64 = 0.05;

/// How many samples a measurement records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCount {
    /// Keep sampling until the distribution stabilizes (bounded to
    /// 4..=32 samples).
    Adaptive,
    /// Record exactly this many samples.
    Fixed(usize),
}

/// Configuration for one measurement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureConfig {
    iterations: u32,
    samples: SampleCount,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            iterations: 1,
            samples: SampleCount::Adaptive,
        }
    }
}

impl MeasureConfig {
    /// Set how many step+drain cycles one sample batches. Values below
    /// 1 are treated as 1. With more than one iteration per sample,
    /// pair the config with an explicit sample count so the run length
    /// stays under the caller's control.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// Record exactly `count` samples (at least 1).
    pub fn with_sample_count(mut self, count: usize) -> Self {
        self.samples = SampleCount::Fixed(count.max(1));
        self
    }

    /// Step+drain cycles per sample.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// The configured sampling mode.
    pub fn samples(&self) -> SampleCount {
        self.samples
    }
}

/// The per-sample duration distribution of one measurement run.
#[derive(Debug, Clone)]
pub struct StepTimings {
    samples: Vec<Duration>,
}

impl StepTimings {
    /// The recorded per-sample durations, in collection order.
    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    /// Number of recorded samples.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// The fastest sample, or zero when nothing was recorded.
    pub fn min(&self) -> Duration {
        self.samples.iter().min().copied().unwrap_or(Duration::ZERO)
    }

    /// The slowest sample, or zero when nothing was recorded.
    pub fn max(&self) -> Duration {
        self.samples.iter().max().copied().unwrap_or(Duration::ZERO)
    }

    /// Sum of all samples.
    pub fn total(&self) -> Duration {
        self.samples.iter().sum()
    }

    /// Arithmetic mean of the samples, or zero when nothing was
    /// recorded.
    pub fn mean(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.total() / self.samples.len() as u32
    }

    /// Median of the samples (midpoint average for even counts), or
    /// zero when nothing was recorded.
    pub fn median(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2
        } else {
            sorted[mid]
        }
    }

    /// Population standard deviation of the samples.
    pub fn std_dev(&self) -> Duration {
        Duration::from_secs_f64(std_dev_secs(&self.samples))
    }
}

fn std_dev_secs(samples: &[Duration]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().map(Duration::as_secs_f64).sum::<f64>() / n;
    let variance = samples
        .iter()
        .map(|s| (s.as_secs_f64() - mean).powi(2))
        .sum::<f64>()
        / n;
    variance.sqrt()
}

fn is_stable(samples: &[Duration]) -> bool {
    let n = samples.len() as f64;
    let mean = samples.iter().map(Duration::as_secs_f64).sum::<f64>() / n;
    if mean <= 0.0 {
        return true;
    }
    std_dev_secs(samples) / mean < STABLE_RELATIVE_DEVIATION
}

/// Repeatedly execute one world update step and record per-sample
/// timing.
///
/// Runs [`WARMUP_CYCLES`] discarded step+drain cycles, then samples per
/// the config: with the default single iteration the sample count is
/// chosen adaptively until the measurement is stable; with batched
/// iterations the caller controls the count explicitly.
pub fn measure_world_update(
    world: &mut World,
    config: &MeasureConfig,
) -> HarnessResult<StepTimings> {
    for _ in 0..WARMUP_CYCLES {
        step_and_drain(world)?;
    }

    let mut samples = Vec::new();
    match config.samples() {
        SampleCount::Fixed(count) => {
            for _ in 0..count {
                samples.push(record_sample(world, config.iterations())?);
            }
        }
        SampleCount::Adaptive => loop {
            samples.push(record_sample(world, config.iterations())?);
            if samples.len() >= MAX_ADAPTIVE_SAMPLES {
                break;
            }
            if samples.len() >= MIN_ADAPTIVE_SAMPLES && is_stable(&samples) {
                break;
            }
        },
    }
    Ok(StepTimings { samples })
}

fn record_sample(world: &mut World, iterations: u32) -> HarnessResult<Duration> {
    let start = Instant::now();
    for _ in 0..iterations {
        step_and_drain(world)?;
    }
    Ok(start.elapsed())
}

fn step_and_drain(world: &mut World) -> HarnessResult<()> {
    world.update()?;
    world.complete_all_tasks();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timings(millis: &[u64]) -> StepTimings {
        StepTimings {
            samples: millis.iter().map(|&m| Duration::from_millis(m)).collect(),
        }
    }

    #[test]
    fn config_defaults_to_one_adaptive_iteration() {
        let config = MeasureConfig::default();
        assert_eq!(config.iterations(), 1);
        assert_eq!(config.samples(), SampleCount::Adaptive);
    }

    #[test]
    fn config_clamps_zero_values() {
        let config = MeasureConfig::default().with_iterations(0).with_sample_count(0);
        assert_eq!(config.iterations(), 1);
        assert_eq!(config.samples(), SampleCount::Fixed(1));
    }

    #[test]
    fn stats_over_a_known_distribution() {
        let t = timings(&[10, 20, 30, 40]);
        assert_eq!(t.sample_count(), 4);
        assert_eq!(t.min(), Duration::from_millis(10));
        assert_eq!(t.max(), Duration::from_millis(40));
        assert_eq!(t.mean(), Duration::from_millis(25));
        assert_eq!(t.median(), Duration::from_millis(25));
        assert_eq!(t.total(), Duration::from_millis(100));
    }

    #[test]
    fn median_of_odd_count_is_the_middle_sample() {
        assert_eq!(timings(&[30, 10, 20]).median(), Duration::from_millis(20));
    }

    #[test]
    fn empty_timings_report_zero() {
        let t = timings(&[]);
        assert_eq!(t.mean(), Duration::ZERO);
        assert_eq!(t.median(), Duration::ZERO);
        assert_eq!(t.std_dev(), Duration::ZERO);
    }

    #[test]
    fn identical_samples_are_stable() {
        assert!(is_stable(&[Duration::from_millis(10); 4]));
    }

    #[test]
    fn widely_spread_samples_are_not_stable() {
        assert!(!is_stable(&[
            Duration::from_millis(1),
            Duration::from_millis(100),
            Duration::from_millis(1),
            Duration::from_millis(100),
        ]));
    }
}
