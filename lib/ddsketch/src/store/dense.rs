use tracing::trace;

use super::bins::BinArray;
use super::{Bins, Store};

/// A dense store using contiguous array storage.
///
/// This store grows unbounded to accommodate any range of indices. Memory usage is proportional to the range of indices
/// observed, not to the number of observations, so it is memory-efficient when the indices are clustered together but
/// can use significant memory if indices are widely scattered.
///
/// Use this store when:
/// - You have a bounded range of input values
/// - Memory usage is not a concern
/// - You need the fastest possible insertion performance
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DenseStore {
    bins: BinArray,
}

impl DenseStore {
    /// Creates an empty `DenseStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures the store can accommodate every index in `[lo, hi]`, growing if necessary.
    fn grow(&mut self, lo: i32, hi: i32) {
        let (lo, hi) = self.bins.union(lo, hi);
        if !self.bins.covers(lo, hi) {
            trace!(min_index = lo, max_index = hi, "Growing dense store.");
            self.bins.remap(lo, hi, usize::MAX);
        }
    }
}

impl Store for DenseStore {
    fn add(&mut self, index: i32, count: u64) {
        if count == 0 {
            return;
        }

        self.grow(index, index);
        self.bins.increment(index, count);
    }

    fn total_count(&self) -> u64 {
        self.bins.total_count()
    }

    fn min_index(&self) -> Option<i32> {
        self.bins.min_index()
    }

    fn max_index(&self) -> Option<i32> {
        self.bins.max_index()
    }

    fn key_at_rank(&self, rank: f64) -> Option<i32> {
        self.bins.key_at_rank(rank)
    }

    fn merge(&mut self, other: &Self) {
        let Some((other_min, other_max)) = other.bins.range() else {
            return;
        };

        // Grow once to the combined range, rather than once per bin.
        self.grow(other_min, other_max);
        for bin in other.bins() {
            self.bins.increment(bin.index(), bin.count());
        }
    }

    fn bins(&self) -> Bins<'_> {
        self.bins.bins()
    }

    fn clear(&mut self) {
        self.bins.clear();
    }
}
