//! DDSketch orchestrator.

use std::{num::NonZeroUsize, sync::Arc};

use tracing::debug;

use crate::error::SketchError;
use crate::mapping::{IndexMapping, LogarithmicMapping};
use crate::store::{Bins, CollapsingHighestDenseStore, CollapsingLowestDenseStore, DenseStore, Store};

/// A fast and fully-mergeable quantile sketch with relative-error guarantees.
///
/// A sketch pairs an [`IndexMapping`], which turns values into bin indices and back, with a [`Store`], which counts how
/// many values fell into each bin. Any value returned by a quantile query is within the relative accuracy of the mapping
/// of the true value at that quantile, as long as the store has not collapsed the bins holding it.
///
/// Only values within `[min_indexable_value, max_indexable_value]` of the mapping can be tracked, which excludes zero
/// and negative values.
///
/// The mapping is immutable and shared (via `Arc`) between a sketch and its clones, while each clone owns its own
/// store. A sketch performs no internal synchronization: callers that update a sketch from multiple threads must
/// serialize access to it themselves.
///
/// # Example
///
/// ```
/// use ddsketch::DDSketch;
///
/// let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
/// sketch.add(1.0).unwrap();
/// sketch.add(2.0).unwrap();
/// sketch.add(3.0).unwrap();
///
/// let median = sketch.value_at_quantile(0.5).unwrap();
/// assert!((median - 2.0).abs() <= 0.02);
/// ```
#[derive(Clone, Debug)]
pub struct DDSketch<M: IndexMapping = LogarithmicMapping, S: Store = DenseStore> {
    /// The index mapping for this sketch.
    mapping: Arc<M>,

    /// Bin counts.
    store: S,
}

impl DDSketch<LogarithmicMapping, DenseStore> {
    /// Creates a new `DDSketch` with the given relative accuracy.
    ///
    /// Uses a logarithmic mapping and an unbounded dense store.
    ///
    /// # Errors
    ///
    /// If the relative accuracy is not strictly between `0` and `1`, an error is returned.
    pub fn with_relative_accuracy(relative_accuracy: f64) -> Result<Self, SketchError> {
        Self::log_unbounded_dense(relative_accuracy)
    }

    /// Creates a new `DDSketch` with a logarithmic mapping and an unbounded dense store.
    ///
    /// # Errors
    ///
    /// If the relative accuracy is not strictly between `0` and `1`, an error is returned.
    pub fn log_unbounded_dense(relative_accuracy: f64) -> Result<Self, SketchError> {
        let mapping = LogarithmicMapping::new(relative_accuracy)?;
        Ok(Self::new(mapping, DenseStore::new()))
    }
}

impl DDSketch<LogarithmicMapping, CollapsingLowestDenseStore> {
    /// Creates a new `DDSketch` with a logarithmic mapping and a store that collapses its lowest bins once it holds
    /// `max_num_bins` bins.
    ///
    /// This works well for tracking values like time durations/latencies where the tail latencies (higher percentiles)
    /// matter most.
    ///
    /// # Errors
    ///
    /// If the relative accuracy is not strictly between `0` and `1`, or `max_num_bins` is zero, an error is returned.
    pub fn log_collapsing_lowest_dense(relative_accuracy: f64, max_num_bins: usize) -> Result<Self, SketchError> {
        let mapping = LogarithmicMapping::new(relative_accuracy)?;
        let store = CollapsingLowestDenseStore::new(bin_limit(max_num_bins)?);
        Ok(Self::new(mapping, store))
    }
}

impl DDSketch<LogarithmicMapping, CollapsingHighestDenseStore> {
    /// Creates a new `DDSketch` with a logarithmic mapping and a store that collapses its highest bins once it holds
    /// `max_num_bins` bins.
    ///
    /// # Errors
    ///
    /// If the relative accuracy is not strictly between `0` and `1`, or `max_num_bins` is zero, an error is returned.
    pub fn log_collapsing_highest_dense(relative_accuracy: f64, max_num_bins: usize) -> Result<Self, SketchError> {
        let mapping = LogarithmicMapping::new(relative_accuracy)?;
        let store = CollapsingHighestDenseStore::new(bin_limit(max_num_bins)?);
        Ok(Self::new(mapping, store))
    }
}

impl<M: IndexMapping, S: Store> DDSketch<M, S> {
    /// Creates a new `DDSketch` with the given mapping and store.
    pub fn new(mapping: M, store: S) -> Self {
        Self::with_shared_mapping(Arc::new(mapping), store)
    }

    /// Creates a new `DDSketch` with a mapping that is shared with other sketches.
    pub fn with_shared_mapping(mapping: Arc<M>, store: S) -> Self {
        Self { mapping, store }
    }

    /// Adds a single value to the sketch.
    ///
    /// # Errors
    ///
    /// If the value cannot be indexed by the mapping, an error is returned and the sketch is left unchanged.
    pub fn add(&mut self, value: f64) -> Result<(), SketchError> {
        self.add_with_count(value, 1)
    }

    /// Adds a value to the sketch with the given count.
    ///
    /// This is useful for weighted values or pre-aggregated data. A count of zero is accepted and changes nothing.
    ///
    /// # Errors
    ///
    /// If the value cannot be indexed by the mapping, or the count is negative, an error is returned and the sketch is
    /// left unchanged.
    pub fn add_with_count(&mut self, value: f64, count: i64) -> Result<(), SketchError> {
        let min = self.mapping.min_indexable_value();
        let max = self.mapping.max_indexable_value();
        if !(min..=max).contains(&value) {
            return Err(SketchError::ValueOutOfRange { value, min, max });
        }

        if count < 0 {
            return Err(SketchError::NegativeCount { count });
        }

        let index = self.mapping.index(value);
        self.store.add(index, count.unsigned_abs());
        Ok(())
    }

    /// Returns the approximate value at the given quantile.
    ///
    /// Quantiles follow the "lower" convention: for `n` values, the value at quantile `q` is the value of rank
    /// `floor(q * (n - 1))` among them, in ascending order.
    ///
    /// # Errors
    ///
    /// If the quantile is not within `[0, 1]`, or the sketch is empty, an error is returned.
    pub fn value_at_quantile(&self, quantile: f64) -> Result<f64, SketchError> {
        let index = self.index_at_quantile(quantile)?;
        Ok(self.mapping.value(index))
    }

    /// Returns the index of the bin holding the value at the given quantile.
    ///
    /// # Errors
    ///
    /// If the quantile is not within `[0, 1]`, or the sketch is empty, an error is returned.
    pub fn index_at_quantile(&self, quantile: f64) -> Result<i32, SketchError> {
        if !(0.0..=1.0).contains(&quantile) {
            return Err(SketchError::InvalidQuantile { quantile });
        }

        let count = self.store.total_count();
        if count == 0 {
            return Err(SketchError::EmptyState);
        }

        let rank = quantile * (count - 1) as f64;
        self.store.key_at_rank(rank).ok_or(SketchError::EmptyState)
    }

    /// Returns the approximate values at each of the given quantiles, in the same order.
    ///
    /// # Errors
    ///
    /// If any quantile is not within `[0, 1]`, or the sketch is empty, the first error encountered is returned.
    pub fn values_at_quantiles(&self, quantiles: &[f64]) -> Result<Vec<f64>, SketchError> {
        quantiles.iter().map(|quantile| self.value_at_quantile(*quantile)).collect()
    }

    /// Returns the approximate minimum value added to the sketch.
    ///
    /// # Errors
    ///
    /// If the sketch is empty, an error is returned.
    pub fn min_value(&self) -> Result<f64, SketchError> {
        let index = self.store.min_index().ok_or(SketchError::EmptyState)?;
        Ok(self.mapping.value(index))
    }

    /// Returns the approximate maximum value added to the sketch.
    ///
    /// # Errors
    ///
    /// If the sketch is empty, an error is returned.
    pub fn max_value(&self) -> Result<f64, SketchError> {
        let index = self.store.max_index().ok_or(SketchError::EmptyState)?;
        Ok(self.mapping.value(index))
    }

    /// Merges another sketch into this one.
    ///
    /// # Errors
    ///
    /// If the two sketches do not use equivalent mappings, an error is returned and neither sketch is changed.
    pub fn merge(&mut self, other: &Self) -> Result<(), SketchError> {
        if !self.mapping.is_equivalent_to(other.mapping()) {
            debug!(
                multiplier = self.mapping.multiplier(),
                index_offset = self.mapping.index_offset(),
                other_multiplier = other.mapping.multiplier(),
                other_index_offset = other.mapping.index_offset(),
                "Refusing to merge sketches with incompatible index mappings."
            );
            return Err(SketchError::IncompatibleMapping);
        }

        self.store.merge(&other.store);
        Ok(())
    }

    /// Returns `true` if the sketch is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns the total number of values added to the sketch.
    pub fn count(&self) -> u64 {
        self.store.total_count()
    }

    /// Clears the sketch, removing all values.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Returns the non-empty bins of the sketch, in ascending index order.
    pub fn bins(&self) -> Bins<'_> {
        self.store.bins()
    }

    /// Returns a reference to the index mapping.
    pub fn mapping(&self) -> &M {
        &self.mapping
    }

    /// Returns a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the relative accuracy of this sketch.
    pub fn relative_accuracy(&self) -> f64 {
        self.mapping.relative_accuracy()
    }
}

impl<M: IndexMapping, S: Store + PartialEq> PartialEq for DDSketch<M, S> {
    fn eq(&self, other: &Self) -> bool {
        self.mapping.is_equivalent_to(other.mapping()) && self.store == other.store
    }
}

/// Validates the bin limit of a collapsing store.
pub(crate) fn bin_limit(max_num_bins: usize) -> Result<NonZeroUsize, SketchError> {
    NonZeroUsize::new(max_num_bins).ok_or(SketchError::InvalidBinLimit { max_num_bins })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::store::Bin;

    macro_rules! assert_rel_acc_eq {
        ($rel_acc:expr, $actual:expr, $expected:expr) => {
            let rel_acc = $rel_acc;
            let actual = $actual;
            let expected = $expected;
            let diff = (actual - expected).abs();
            let max_error = rel_acc * expected.abs();
            assert!(
                diff <= max_error,
                "expected {} (+/-{}, {} - {}), got {}",
                expected,
                max_error,
                expected - max_error,
                expected + max_error,
                actual
            );
        };
    }

    fn sketch_with(values: &[f64]) -> DDSketch {
        let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
        for value in values {
            sketch.add(*value).unwrap();
        }
        sketch
    }

    /// 1000 ascending values from 1.5 to ~1.5e6.
    fn six_orders_of_magnitude() -> Vec<f64> {
        (0..1000).map(|i| 1.5 * 10f64.powf(6.0 * f64::from(i) / 1000.0)).collect()
    }

    #[test]
    fn test_invalid_construction() {
        assert_eq!(
            DDSketch::with_relative_accuracy(0.0).unwrap_err(),
            SketchError::InvalidAccuracy { relative_accuracy: 0.0 }
        );
        assert_eq!(
            DDSketch::log_collapsing_lowest_dense(1.0, 10).unwrap_err(),
            SketchError::InvalidAccuracy { relative_accuracy: 1.0 }
        );
        assert_eq!(
            DDSketch::log_collapsing_lowest_dense(0.01, 0).unwrap_err(),
            SketchError::InvalidBinLimit { max_num_bins: 0 }
        );
        assert_eq!(
            DDSketch::log_collapsing_highest_dense(0.01, 0).unwrap_err(),
            SketchError::InvalidBinLimit { max_num_bins: 0 }
        );
    }

    #[test]
    fn test_empty_sketch() {
        let sketch = DDSketch::with_relative_accuracy(0.01).unwrap();

        assert!(sketch.is_empty());
        assert_eq!(sketch.count(), 0);
        assert_eq!(sketch.bins().count(), 0);
        for q in [0.0, 0.5, 1.0] {
            assert_eq!(sketch.value_at_quantile(q), Err(SketchError::EmptyState));
            assert_eq!(sketch.index_at_quantile(q), Err(SketchError::EmptyState));
        }
        assert_eq!(sketch.min_value(), Err(SketchError::EmptyState));
        assert_eq!(sketch.max_value(), Err(SketchError::EmptyState));
        assert_eq!(sketch.values_at_quantiles(&[0.5]), Err(SketchError::EmptyState));
    }

    #[test]
    fn test_single_value() {
        let sketch = sketch_with(&[42.0]);

        assert!(!sketch.is_empty());
        assert_eq!(sketch.count(), 1);

        for q in [0.0, 0.5, 1.0] {
            assert_rel_acc_eq!(0.01, sketch.value_at_quantile(q).unwrap(), 42.0);
        }
        assert_rel_acc_eq!(0.01, sketch.min_value().unwrap(), 42.0);
        assert_rel_acc_eq!(0.01, sketch.max_value().unwrap(), 42.0);
    }

    #[test]
    fn test_median_of_small_set() {
        let sketch = sketch_with(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_rel_acc_eq!(0.01, sketch.value_at_quantile(0.5).unwrap(), 3.0);
        assert_rel_acc_eq!(0.01, sketch.value_at_quantile(1.0).unwrap(), 5.0);
        assert_eq!(sketch.index_at_quantile(0.0).unwrap(), sketch.mapping().index(1.0));

        // Lower quantile convention: rank floor(0.3 * 4) = 1.
        assert_rel_acc_eq!(0.01, sketch.value_at_quantile(0.3).unwrap(), 2.0);
    }

    #[test]
    fn test_index_at_quantile() {
        let sketch = sketch_with(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let index = sketch.index_at_quantile(0.5).unwrap();
        assert_eq!(index, sketch.mapping().index(3.0));
        assert_eq!(sketch.mapping().value(index), sketch.value_at_quantile(0.5).unwrap());
    }

    #[test]
    fn test_invalid_quantile() {
        let sketch = sketch_with(&[1.0]);

        for q in [-0.1, 1.1, f64::INFINITY] {
            assert_eq!(sketch.value_at_quantile(q), Err(SketchError::InvalidQuantile { quantile: q }));
            assert_eq!(sketch.index_at_quantile(q), Err(SketchError::InvalidQuantile { quantile: q }));
        }
        assert!(matches!(
            sketch.value_at_quantile(f64::NAN),
            Err(SketchError::InvalidQuantile { quantile }) if quantile.is_nan()
        ));

        // Quantile validation comes first, even on an empty sketch.
        let empty = DDSketch::with_relative_accuracy(0.01).unwrap();
        assert_eq!(
            empty.value_at_quantile(2.0),
            Err(SketchError::InvalidQuantile { quantile: 2.0 })
        );
    }

    #[test]
    fn test_values_at_quantiles() {
        let sketch = sketch_with(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let values = sketch.values_at_quantiles(&[0.25, 0.5, 1.0]).unwrap();
        assert_eq!(values.len(), 3);
        assert_rel_acc_eq!(0.01, values[0], 2.0);
        assert_rel_acc_eq!(0.01, values[1], 3.0);
        assert_rel_acc_eq!(0.01, values[2], 5.0);

        assert!(sketch.values_at_quantiles(&[]).unwrap().is_empty());
        assert_eq!(
            sketch.values_at_quantiles(&[0.5, 1.5, -1.0]),
            Err(SketchError::InvalidQuantile { quantile: 1.5 })
        );
    }

    #[test]
    fn test_out_of_range_values() {
        let mut sketch = sketch_with(&[1.0]);
        let min = sketch.mapping().min_indexable_value();
        let max = sketch.mapping().max_indexable_value();

        for value in [0.0, -1.0, min / 2.0, max * 2.0, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(sketch.add(value), Err(SketchError::ValueOutOfRange { value, min, max }));
        }
        assert!(matches!(
            sketch.add(f64::NAN),
            Err(SketchError::ValueOutOfRange { value, .. }) if value.is_nan()
        ));
        assert_eq!(sketch.count(), 1);

        // The bounds themselves are indexable.
        sketch.add(min).unwrap();
        sketch.add(max).unwrap();
        assert_eq!(sketch.count(), 3);
    }

    #[test]
    fn test_extreme_offset_rejects_every_value() {
        let mapping = LogarithmicMapping::with_gamma(1.02, 1e6).unwrap();
        let mut sketch = DDSketch::new(mapping, DenseStore::default());

        for value in [f64::MIN_POSITIVE, 1e-9, 1.0, 1e9] {
            assert!(matches!(sketch.add(value), Err(SketchError::ValueOutOfRange { .. })));
        }
        assert!(sketch.is_empty());
    }

    #[test]
    fn test_add_with_count() {
        let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
        sketch.add_with_count(10.0, 3).unwrap();
        sketch.add(100.0).unwrap();

        assert_eq!(sketch.count(), 4);
        assert_rel_acc_eq!(0.01, sketch.value_at_quantile(0.5).unwrap(), 10.0);
        assert_rel_acc_eq!(0.01, sketch.value_at_quantile(1.0).unwrap(), 100.0);
    }

    #[test]
    fn test_add_with_invalid_count() {
        let mut sketch = sketch_with(&[1.0]);
        let before = sketch.clone();

        assert_eq!(sketch.add_with_count(2.0, -1), Err(SketchError::NegativeCount { count: -1 }));
        assert_eq!(sketch, before);

        // Range validation is reported first.
        assert!(matches!(
            sketch.add_with_count(-2.0, -1),
            Err(SketchError::ValueOutOfRange { .. })
        ));

        // Zero counts are accepted but do nothing.
        sketch.add_with_count(2.0, 0).unwrap();
        assert_eq!(sketch, before);
        assert_eq!(sketch.bins().count(), 1);
    }

    #[test]
    fn test_min_max() {
        let sketch = sketch_with(&[5.0, 1000.0, 1.5, 20.0]);

        assert_rel_acc_eq!(0.01, sketch.min_value().unwrap(), 1.5);
        assert_rel_acc_eq!(0.01, sketch.max_value().unwrap(), 1000.0);
    }

    #[test]
    fn test_merge() {
        let mut sketch1 = sketch_with(&[10.0, 20.0, 30.0]);
        let sketch2 = sketch_with(&[40.0, 50.0]);

        sketch1.merge(&sketch2).unwrap();

        assert_eq!(sketch1.count(), 5);
        assert_rel_acc_eq!(0.01, sketch1.value_at_quantile(1.0).unwrap(), 50.0);
        assert_rel_acc_eq!(0.01, sketch1.value_at_quantile(0.0).unwrap(), 10.0);
        assert_eq!(sketch2.count(), 2);
    }

    #[test]
    fn test_merge_empty() {
        let mut sketch = sketch_with(&[1.0, 2.0]);
        let before = sketch.clone();
        sketch.merge(&sketch_with(&[])).unwrap();
        assert_eq!(sketch, before);

        let mut empty = sketch_with(&[]);
        empty.merge(&before).unwrap();
        assert_eq!(empty, before);
    }

    #[test]
    fn test_merge_incompatible() {
        let mut sketch1 = sketch_with(&[1.0, 2.0]);
        let mut sketch2 = DDSketch::with_relative_accuracy(0.02).unwrap();
        sketch2.add(3.0).unwrap();

        let before1 = sketch1.bins().collect::<Vec<_>>();
        let before2 = sketch2.bins().collect::<Vec<_>>();

        assert_eq!(sketch1.merge(&sketch2), Err(SketchError::IncompatibleMapping));
        assert_eq!(sketch2.merge(&sketch1), Err(SketchError::IncompatibleMapping));

        assert_eq!(sketch1.bins().collect::<Vec<_>>(), before1);
        assert_eq!(sketch2.bins().collect::<Vec<_>>(), before2);
        assert_eq!(sketch1.count(), 2);
        assert_eq!(sketch2.count(), 1);
    }

    #[test]
    fn test_merge_equivalent_mappings() {
        let mapping = LogarithmicMapping::new(0.01).unwrap();
        let by_gamma = LogarithmicMapping::with_gamma(mapping.gamma(), 0.0).unwrap();

        let mut sketch1 = DDSketch::new(mapping, DenseStore::new());
        sketch1.add(1.0).unwrap();
        let mut sketch2 = DDSketch::new(by_gamma, DenseStore::new());
        sketch2.add(2.0).unwrap();

        sketch1.merge(&sketch2).unwrap();
        assert_eq!(sketch1.count(), 2);
    }

    #[test]
    fn test_shared_mapping() {
        let mapping = Arc::new(LogarithmicMapping::new(0.01).unwrap());
        let mut sketch1 = DDSketch::with_shared_mapping(Arc::clone(&mapping), DenseStore::new());
        let mut sketch2 = DDSketch::with_shared_mapping(Arc::clone(&mapping), DenseStore::new());
        sketch1.add(1.0).unwrap();
        sketch2.add(1.0).unwrap();

        sketch1.merge(&sketch2).unwrap();
        assert_eq!(sketch1.bins().collect::<Vec<_>>(), vec![Bin::new(mapping.index(1.0), 2)]);
        assert!(Arc::ptr_eq(&sketch1.mapping, &mapping));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = sketch_with(&[1.0, 2.0]);
        let mut copy = original.clone();
        copy.add(3.0).unwrap();

        assert_eq!(original.count(), 2);
        assert_eq!(copy.count(), 3);
        assert!(Arc::ptr_eq(&original.mapping, &copy.mapping));
    }

    #[test]
    fn test_clear() {
        let mut sketch = sketch_with(&[1.0, 2.0]);
        sketch.clear();

        assert!(sketch.is_empty());
        assert_eq!(sketch.min_value(), Err(SketchError::EmptyState));

        sketch.add(3.0).unwrap();
        assert_rel_acc_eq!(0.01, sketch.value_at_quantile(0.5).unwrap(), 3.0);
    }

    #[test]
    fn test_bins_match_inserted_indices() {
        let sketch = sketch_with(&[1.0, 1.0, 100.0]);
        let mapping = sketch.mapping();

        assert_eq!(
            sketch.bins().collect::<Vec<_>>(),
            vec![Bin::new(mapping.index(1.0), 2), Bin::new(mapping.index(100.0), 1)]
        );
    }

    #[test]
    fn test_collapsing_lowest_keeps_high_quantiles() {
        let relative_accuracy = 0.02;
        let mut sketch = DDSketch::log_collapsing_lowest_dense(relative_accuracy, 10).unwrap();

        let values = six_orders_of_magnitude();
        for value in &values {
            sketch.add(*value).unwrap();
        }

        assert_eq!(sketch.count(), 1000);
        assert!(sketch.bins().count() <= 10);
        assert!(sketch.store().is_collapsed());

        let expected_p99 = values[(0.99 * 999.0) as usize];
        assert_rel_acc_eq!(relative_accuracy, sketch.value_at_quantile(0.99).unwrap(), expected_p99);
        assert_rel_acc_eq!(relative_accuracy, sketch.max_value().unwrap(), values[999]);

        // The low end has been folded away.
        assert!(sketch.min_value().unwrap() > values[0] * (1.0 + relative_accuracy));
    }

    #[test]
    fn test_collapsing_highest_keeps_low_quantiles() {
        let relative_accuracy = 0.02;
        let mut sketch = DDSketch::log_collapsing_highest_dense(relative_accuracy, 10).unwrap();

        let values = six_orders_of_magnitude();
        for value in &values {
            sketch.add(*value).unwrap();
        }

        assert!(sketch.bins().count() <= 10);
        assert!(sketch.store().is_collapsed());

        let expected_p1 = values[(0.01 * 999.0) as usize];
        assert_rel_acc_eq!(relative_accuracy, sketch.value_at_quantile(0.01).unwrap(), expected_p1);
        assert_rel_acc_eq!(relative_accuracy, sketch.min_value().unwrap(), values[0]);
        assert!(sketch.max_value().unwrap() < values[999] * (1.0 - relative_accuracy));
    }

    proptest! {
        #[test]
        fn property_test_count_conservation(
            entries in prop::collection::vec((1.0e-3f64..1.0e6, 0i64..100), 0..100),
        ) {
            let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
            for (value, count) in &entries {
                sketch.add_with_count(*value, *count).unwrap();
            }

            let expected = entries.iter().map(|(_, count)| *count as u64).sum::<u64>();
            prop_assert_eq!(sketch.count(), expected);
            prop_assert_eq!(sketch.bins().map(|bin| bin.count()).sum::<u64>(), expected);
        }

        #[test]
        fn property_test_merge_count_conservation(
            left in prop::collection::vec(1.0e-3f64..1.0e6, 0..100),
            right in prop::collection::vec(1.0e-3f64..1.0e6, 0..100),
            max_num_bins in 1usize..32,
        ) {
            let mut left_sketch = DDSketch::log_collapsing_lowest_dense(0.01, max_num_bins).unwrap();
            left.iter().for_each(|value| left_sketch.add(*value).unwrap());
            let mut right_sketch = DDSketch::log_collapsing_lowest_dense(0.01, max_num_bins).unwrap();
            right.iter().for_each(|value| right_sketch.add(*value).unwrap());

            left_sketch.merge(&right_sketch).unwrap();

            prop_assert_eq!(left_sketch.count(), (left.len() + right.len()) as u64);
            prop_assert!(left_sketch.bins().count() <= max_num_bins);
        }

        #[test]
        fn property_test_merge_commutative(
            left in prop::collection::vec(1.0e-3f64..1.0e6, 0..100),
            right in prop::collection::vec(1.0e-3f64..1.0e6, 0..100),
        ) {
            let left_sketch = sketch_with(&left);
            let right_sketch = sketch_with(&right);

            let mut left_then_right = left_sketch.clone();
            left_then_right.merge(&right_sketch).unwrap();
            let mut right_then_left = right_sketch.clone();
            right_then_left.merge(&left_sketch).unwrap();

            prop_assert_eq!(left_then_right, right_then_left);
        }
    }
}
