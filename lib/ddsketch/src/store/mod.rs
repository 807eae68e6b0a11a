//! Store implementations for DDSketch bins.
//!
//! A store manages the bin counts produced by an index mapping. Different implementations provide different
//! memory/accuracy trade-offs.

use std::num::NonZeroUsize;

mod bins;
pub use self::bins::{Bin, Bins};

mod collapsing_highest;
pub use self::collapsing_highest::CollapsingHighestDenseStore;

mod collapsing_lowest;
pub use self::collapsing_lowest::CollapsingLowestDenseStore;

mod configured;
pub use self::configured::ConfiguredStore;

mod dense;
pub use self::dense::DenseStore;

/// Default maximum number of bins for the collapsing stores.
pub const DEFAULT_MAX_NUM_BINS: NonZeroUsize = match NonZeroUsize::new(2048) {
    Some(n) => n,
    None => panic!("default bin limit must be non-zero"),
};

/// A store for DDSketch bins.
///
/// Different implementations provide different memory/accuracy trade-offs:
///
/// - [`DenseStore`]: Contiguous array storage, grows unbounded. Best for data with a bounded range of values.
/// - [`CollapsingLowestDenseStore`]: Dense storage with a maximum bin limit. When the limit is exceeded, lowest-indexed
///   bins are collapsed. Best when higher quantiles (e.g., p99) are more important.
/// - [`CollapsingHighestDenseStore`]: Dense storage with a maximum bin limit. When the limit is exceeded,
///   highest-indexed bins are collapsed. Best when lower quantiles (e.g., p1) are more important.
/// - [`ConfiguredStore`]: Any of the above, chosen at runtime.
///
/// Every store keeps its total count equal to the sum of its bin counts, saturating at `u64::MAX`.
pub trait Store: Clone + Send + Sync {
    /// Adds a count to the bin at the given index.
    ///
    /// Adding a count of zero does nothing. Collapsing stores may add the count to a neighboring bin instead, if the
    /// index falls outside of the range they are able to keep.
    fn add(&mut self, index: i32, count: u64);

    /// Adds the count of the given bin.
    fn add_bin(&mut self, bin: Bin) {
        self.add(bin.index(), bin.count());
    }

    /// Returns the total count across all bins.
    fn total_count(&self) -> u64;

    /// Returns whether the store is empty.
    fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// Returns the minimum index with a non-zero count, or `None` if empty.
    fn min_index(&self) -> Option<i32>;

    /// Returns the maximum index with a non-zero count, or `None` if empty.
    fn max_index(&self) -> Option<i32>;

    /// Returns the index of the bin containing the given rank, or `None` if empty.
    ///
    /// The rank is 0-indexed, so rank 0 is the first observation. The first bin whose cumulative count exceeds the rank
    /// is returned. Ranks at or beyond the total count resolve to the maximum index.
    fn key_at_rank(&self, rank: f64) -> Option<i32>;

    /// Merges another store into this one.
    ///
    /// `other` is left untouched.
    fn merge(&mut self, other: &Self);

    /// Returns the non-empty bins of the store, in ascending index order.
    fn bins(&self) -> Bins<'_>;

    /// Clears all bins from the store.
    fn clear(&mut self);
}
