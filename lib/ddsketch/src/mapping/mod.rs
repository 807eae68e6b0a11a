//! Index mapping.

use crate::common::{within_tolerance, MAPPING_EQUALITY_TOLERANCE};

mod logarithmic;
pub use self::logarithmic::LogarithmicMapping;

/// Maps values to bin indices and vice versa.
///
/// The mapping defines the relationship between floating-point values and integer bin indices, determining the relative
/// accuracy of the sketch. Mappings are immutable once built, and can be shared freely between sketches.
pub trait IndexMapping: Clone + Send + Sync {
    /// Returns the index of the bin for the given value.
    ///
    /// The value must lie within `[min_indexable_value, max_indexable_value]`.
    fn index(&self, value: f64) -> i32;

    /// Returns the representative value for the given index.
    ///
    /// The representative value of any bin is within the relative accuracy of every value that maps to that bin.
    fn value(&self, index: i32) -> f64;

    /// Returns the relative accuracy of this mapping.
    fn relative_accuracy(&self) -> f64;

    /// Returns the smallest value that can be indexed.
    fn min_indexable_value(&self) -> f64;

    /// Returns the largest value that can be indexed.
    fn max_indexable_value(&self) -> f64;

    /// Returns the gamma value (ratio between consecutive bin boundaries) for this mapping.
    fn gamma(&self) -> f64;

    /// Returns the scale factor applied to the logarithm of a value.
    fn multiplier(&self) -> f64;

    /// Returns the index offset used by this mapping.
    ///
    /// The index offset shifts all bin indices by a constant value.
    fn index_offset(&self) -> f64;

    /// Returns `true` if this mapping and `other` produce the same indices.
    ///
    /// Only the derived parameters are compared, within an absolute tolerance of
    /// [`MAPPING_EQUALITY_TOLERANCE`](crate::MAPPING_EQUALITY_TOLERANCE), so two mappings built through different
    /// constructors may be judged interchangeable.
    fn is_equivalent_to(&self, other: &Self) -> bool {
        within_tolerance(self.multiplier(), other.multiplier(), MAPPING_EQUALITY_TOLERANCE)
            && within_tolerance(self.index_offset(), other.index_offset(), MAPPING_EQUALITY_TOLERANCE)
    }
}
