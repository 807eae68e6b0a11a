//! Logarithmic index mapping implementation.

use std::fmt;

use super::IndexMapping;
use crate::error::SketchError;

/// Largest argument to `exp` that is known not to overflow, with some room to spare.
const EXP_OVERFLOW: f64 = 7.094361393031e+02;

/// Logarithmic index mapping for DDSketch.
///
/// Maps values to indices using: `index = floor(ln(value) * multiplier + offset)`, where `multiplier = 1 / ln(gamma)`,
/// `gamma = (1 + alpha) / (1 - alpha)` and `alpha` is the relative accuracy.
///
/// This mapping is memory-optimal: for a given relative accuracy, it needs the fewest indices to cover a given range of
/// values.
///
/// Indices are kept within the range of an `i16`, which bounds the span of values that can be indexed. The bounds are
/// computed once at construction, and are available through [`IndexMapping::min_indexable_value`] and
/// [`IndexMapping::max_indexable_value`].
#[derive(Clone, Debug, PartialEq)]
pub struct LogarithmicMapping {
    /// The relative accuracy guarantee.
    relative_accuracy: f64,
    /// Precomputed 1/ln(gamma).
    multiplier: f64,
    /// Constant shift applied to every index.
    normalized_index_offset: f64,
    /// Minimum value that can be indexed.
    min_indexable_value: f64,
    /// Maximum value that can be indexed.
    max_indexable_value: f64,
}

impl LogarithmicMapping {
    /// Creates a new logarithmic mapping with the given relative accuracy.
    ///
    /// # Errors
    ///
    /// If the relative accuracy is not strictly between 0 and 1, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use ddsketch::LogarithmicMapping;
    ///
    /// // Create a mapping with 1% relative accuracy
    /// let mapping = LogarithmicMapping::new(0.01).unwrap();
    /// ```
    pub fn new(relative_accuracy: f64) -> Result<Self, SketchError> {
        if relative_accuracy.is_nan() || relative_accuracy <= 0.0 || relative_accuracy >= 1.0 {
            return Err(SketchError::InvalidAccuracy { relative_accuracy });
        }

        // ln(gamma) = ln((1 + alpha) / (1 - alpha)) = ln(1 + 2 * alpha / (1 - alpha))
        let multiplier = 1.0 / (2.0 * relative_accuracy / (1.0 - relative_accuracy)).ln_1p();
        Ok(Self::from_parts(relative_accuracy, multiplier, 0.0))
    }

    /// Creates a new logarithmic mapping with the given gamma value and index offset.
    ///
    /// The relative accuracy is derived from gamma as `1 - 2 / (1 + gamma)`.
    ///
    /// An index offset far outside the `i16` index range, or an infinite gamma, leaves the mapping with no indexable
    /// values: `min_indexable_value` then exceeds `max_indexable_value` and every value is rejected as out of range.
    ///
    /// # Errors
    ///
    /// If gamma is not strictly greater than 1, an error is returned.
    pub fn with_gamma(gamma: f64, index_offset: f64) -> Result<Self, SketchError> {
        if gamma.is_nan() || gamma <= 1.0 {
            return Err(SketchError::InvalidGamma { gamma });
        }

        let relative_accuracy = 1.0 - 2.0 / (1.0 + gamma);
        let multiplier = 1.0 / gamma.ln();
        Ok(Self::from_parts(relative_accuracy, multiplier, index_offset))
    }

    fn from_parts(relative_accuracy: f64, multiplier: f64, normalized_index_offset: f64) -> Self {
        let mut mapping = Self {
            relative_accuracy,
            multiplier,
            normalized_index_offset,
            min_indexable_value: 0.0,
            max_indexable_value: 0.0,
        };
        mapping.min_indexable_value = mapping.compute_min_indexable_value();
        mapping.max_indexable_value = mapping.compute_max_indexable_value();
        mapping
    }

    fn compute_min_indexable_value(&self) -> f64 {
        // Keeps `index(value) >= i16::MIN`, and keeps `value(index(value))` a normal float.
        let index_bound = ((f64::from(i16::MIN) - self.normalized_index_offset) / self.multiplier + 1.0).exp();
        let float_bound = f64::MIN_POSITIVE * (1.0 + self.relative_accuracy) / (1.0 - self.relative_accuracy);
        index_bound.max(float_bound)
    }

    fn compute_max_indexable_value(&self) -> f64 {
        // Keeps `index(value) <= i16::MAX`, and keeps `exp` from overflowing in `value(index(value))`.
        let index_bound = ((f64::from(i16::MAX) - self.normalized_index_offset) / self.multiplier - 1.0).exp();
        let float_bound = EXP_OVERFLOW.exp() / (1.0 + self.relative_accuracy);
        index_bound.min(float_bound)
    }
}

impl IndexMapping for LogarithmicMapping {
    #[inline]
    fn index(&self, value: f64) -> i32 {
        let index = value.ln() * self.multiplier + self.normalized_index_offset;
        if index >= 0.0 {
            index as i32
        } else {
            // Faster than `floor`. Exact negative integers land one bin lower.
            (index as i32) - 1
        }
    }

    #[inline]
    fn value(&self, index: i32) -> f64 {
        ((f64::from(index) - self.normalized_index_offset) / self.multiplier).exp() * (1.0 + self.relative_accuracy)
    }

    fn relative_accuracy(&self) -> f64 {
        self.relative_accuracy
    }

    fn min_indexable_value(&self) -> f64 {
        self.min_indexable_value
    }

    fn max_indexable_value(&self) -> f64 {
        self.max_indexable_value
    }

    fn gamma(&self) -> f64 {
        (1.0 / self.multiplier).exp()
    }

    fn multiplier(&self) -> f64 {
        self.multiplier
    }

    fn index_offset(&self) -> f64 {
        self.normalized_index_offset
    }
}

impl fmt::Display for LogarithmicMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "relative_accuracy: {}, multiplier: {}, normalized_index_offset: {}",
            self.relative_accuracy, self.multiplier, self.normalized_index_offset
        )
    }
}
