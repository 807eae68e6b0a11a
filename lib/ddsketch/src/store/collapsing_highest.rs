use std::num::NonZeroUsize;

use tracing::{debug, trace};

use super::bins::{span, BinArray};
use super::{Bins, Store, DEFAULT_MAX_NUM_BINS};

/// A dense store that collapses highest-indexed bins when capacity is exceeded.
///
/// This store maintains a maximum number of bins. When adding a new index would exceed this limit, the highest-indexed
/// bins are collapsed (merged into the highest bin that is kept), sacrificing accuracy for higher quantiles to preserve
/// accuracy for lower quantiles.
///
/// Use this store when:
/// - You need bounded memory usage
/// - Lower quantiles (e.g., p1, p5, p50) are more important than higher quantiles
#[derive(Clone, Debug, PartialEq)]
pub struct CollapsingHighestDenseStore {
    bins: BinArray,
    max_num_bins: NonZeroUsize,
    is_collapsed: bool,
}

impl CollapsingHighestDenseStore {
    /// Creates an empty `CollapsingHighestDenseStore` with the given maximum number of bins.
    pub fn new(max_num_bins: NonZeroUsize) -> Self {
        Self {
            bins: BinArray::default(),
            max_num_bins,
            is_collapsed: false,
        }
    }

    /// Returns the maximum number of non-empty bins this store keeps.
    pub fn max_num_bins(&self) -> usize {
        self.max_num_bins.get()
    }

    /// Returns `true` if this store has collapsed bins.
    ///
    /// If true, accuracy guarantees may not hold for higher quantiles.
    pub fn is_collapsed(&self) -> bool {
        self.is_collapsed
    }

    /// Marks this store as holding collapsed data, such as bins replayed from a collapsed store.
    pub(super) fn mark_collapsed(&mut self) {
        self.is_collapsed = true;
    }

    /// Ensures the store can accommodate `[lo, hi]`, collapsing the highest bins if necessary.
    ///
    /// Returns the highest index that is still kept.
    fn grow(&mut self, lo: i32, hi: i32) -> i32 {
        let limit = self.max_num_bins.get();
        let (lo, hi) = self.bins.union(lo, hi);

        if span(lo, hi) <= limit as u64 {
            if !self.bins.covers(lo, hi) {
                self.bins.remap(lo, hi, limit);
            }
            return hi;
        }

        let highest_kept = (i64::from(lo) + limit as i64 - 1) as i32;
        let needs_remap =
            self.bins.max_index().is_some_and(|max| max > highest_kept) || !self.bins.covers(lo, highest_kept);

        if !self.is_collapsed {
            debug!(
                max_num_bins = limit,
                highest_kept, "Bin limit reached. Collapsing highest bins; high quantiles lose their accuracy guarantee."
            );
        } else if needs_remap {
            trace!(max_num_bins = limit, highest_kept, "Collapsing highest bins.");
        }

        if needs_remap {
            self.bins.remap(lo, highest_kept, limit);
        }
        self.is_collapsed = true;
        highest_kept
    }
}

impl Store for CollapsingHighestDenseStore {
    fn add(&mut self, index: i32, count: u64) {
        if count == 0 {
            return;
        }

        let highest_kept = self.grow(index, index);
        self.bins.increment(index.min(highest_kept), count);
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

        let highest_kept = self.grow(other_min, other_max);
        for bin in other.bins() {
            self.bins.increment(bin.index().min(highest_kept), bin.count());
        }

        if other.is_collapsed {
            self.is_collapsed = true;
        }
    }

    fn bins(&self) -> Bins<'_> {
        self.bins.bins()
    }

    fn clear(&mut self) {
        self.bins.clear();
        self.is_collapsed = false;
    }
}

impl Default for CollapsingHighestDenseStore {
    /// Creates a collapsing highest dense store with a default of 2048 bins.
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NUM_BINS)
    }
}
