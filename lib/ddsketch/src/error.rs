//! Error types.

use snafu::Snafu;

/// Errors that can occur when building, updating, or querying a sketch.
///
/// Every failure is reported before any state is touched, so a call that returns an error leaves the sketch exactly as
/// it was.
#[derive(Clone, Debug, PartialEq, Snafu)]
pub enum SketchError {
    /// The relative accuracy was not strictly between 0 and 1.
    #[snafu(display("Relative accuracy must be between 0 and 1 (exclusive), got {}.", relative_accuracy))]
    InvalidAccuracy {
        /// The rejected relative accuracy.
        relative_accuracy: f64,
    },

    /// The gamma value was not strictly greater than 1.
    #[snafu(display("Gamma must be greater than 1, got {}.", gamma))]
    InvalidGamma {
        /// The rejected gamma.
        gamma: f64,
    },

    /// A bounded store was configured with no room for any bin.
    #[snafu(display("Maximum number of bins must be at least 1, got {}.", max_num_bins))]
    InvalidBinLimit {
        /// The rejected bin limit.
        max_num_bins: usize,
    },

    /// The value lies outside of the range that the index mapping can represent.
    #[snafu(display("Value {} is outside of the trackable range [{}, {}].", value, min, max))]
    ValueOutOfRange {
        /// The rejected value.
        value: f64,

        /// Minimum indexable value of the mapping.
        min: f64,

        /// Maximum indexable value of the mapping.
        max: f64,
    },

    /// The count was negative.
    #[snafu(display("Count cannot be negative, got {}.", count))]
    NegativeCount {
        /// The rejected count.
        count: i64,
    },

    /// The quantile was not within `[0, 1]`.
    #[snafu(display("Quantile must be between 0 and 1 (inclusive), got {}.", quantile))]
    InvalidQuantile {
        /// The rejected quantile.
        quantile: f64,
    },

    /// The sketch (or store) holds no values.
    #[snafu(display("No values have been added."))]
    EmptyState,

    /// The sketches being merged do not use equivalent index mappings.
    #[snafu(display("Cannot merge sketches with different index mappings."))]
    IncompatibleMapping,
}
