#![allow(dead_code)]

use dhat::HeapStats;
use rand::SeedableRng;
use rand_distr::{Distribution, Pareto};

/// Slack on top of the relative accuracy, for rounding in `ln`/`exp`.
const FLOAT_SLACK: f64 = 1e-12;

/// Exact quantiles over every value added, used as the ground truth for sketches.
///
/// Quantile queries that cannot be answered (empty dataset, quantile outside of `[0, 1]`) return NaN.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    values: Vec<f64>,
    sorted: bool,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        self.values.push(value);
        self.sorted = false;
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Lower quantile: the value of rank `floor(q * (n - 1))`.
    pub fn quantile(&mut self, q: f64) -> f64 {
        self.lower_quantile(q)
    }

    pub fn lower_quantile(&mut self, q: f64) -> f64 {
        self.value_at_rank(q, f64::floor)
    }

    /// Upper quantile: the value of rank `ceil(q * (n - 1))`.
    pub fn upper_quantile(&mut self, q: f64) -> f64 {
        self.value_at_rank(q, f64::ceil)
    }

    pub fn min(&mut self) -> f64 {
        self.lower_quantile(0.0)
    }

    pub fn max(&mut self) -> f64 {
        self.upper_quantile(1.0)
    }

    pub fn merge(&mut self, other: &Dataset) {
        other.values.iter().for_each(|value| self.add(*value));
    }

    fn value_at_rank(&mut self, q: f64, round: fn(f64) -> f64) -> f64 {
        if !(0.0..=1.0).contains(&q) || self.values.is_empty() {
            return f64::NAN;
        }

        self.sort();
        let rank = round(q * (self.values.len() - 1) as f64);
        self.values[rank as usize]
    }

    fn sort(&mut self) {
        if !self.sorted {
            self.values.sort_by(f64::total_cmp);
            self.sorted = true;
        }
    }
}

/// Returns `true` if `actual` is within `relative_accuracy` of `expected`.
pub fn within_relative_accuracy(actual: f64, expected: f64, relative_accuracy: f64) -> bool {
    (actual - expected).abs() <= (relative_accuracy + FLOAT_SLACK) * expected.abs()
}

pub fn make_points(size: usize) -> Vec<f64> {
    // Generate a set of samples that roughly correspond to the latency of a
    // typical web service, in microseconds, with a gamma distribution: big hump
    // at the beginning with a long tail.  We limit this so the samples
    // represent latencies that bottom out at 15 milliseconds and tail off all
    // the way up to 10 seconds.
    make_points_with_seed(size, 0xC0FFEE)
}

pub fn make_points_with_seed(size: usize, seed: u64) -> Vec<f64> {
    let distribution = Pareto::new(1.0, 1.0).expect("pareto distribution should be valid");

    let mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
    distribution
        .sample_iter(&mut rng)
        // Scale by 10,000 to get microseconds.
        .map(|n| n * 10_000.0)
        .filter(|n| *n > 15_000.0 && *n < 10_000_000.0)
        .take(size)
        .collect::<Vec<_>>()
}

pub fn dataset_of(values: &[f64]) -> Dataset {
    let mut dataset = Dataset::new();
    values.iter().for_each(|value| dataset.add(*value));
    dataset
}

/// Heap usage between two points of a `dhat` profile.
pub struct HeapDelta {
    pub total_blocks: u64,
    pub curr_blocks: usize,
    pub curr_bytes: usize,
}

impl HeapDelta {
    pub fn between(before: &HeapStats, after: &HeapStats) -> Self {
        Self {
            total_blocks: after.total_blocks - before.total_blocks,
            curr_blocks: after.curr_blocks - before.curr_blocks,
            curr_bytes: after.curr_bytes - before.curr_bytes,
        }
    }
}
