use std::num::NonZeroUsize;

use tracing::{debug, trace};

use super::bins::{span, BinArray};
use super::{Bins, Store, DEFAULT_MAX_NUM_BINS};

/// A dense store that collapses lowest-indexed bins when capacity is exceeded.
///
/// This store maintains a maximum number of bins. When adding a new index would exceed this limit, the lowest-indexed
/// bins are collapsed (merged into the lowest bin that is kept), sacrificing accuracy for lower quantiles to preserve
/// accuracy for higher quantiles.
///
/// Collapsing is irreversible: once bins have been merged, there is no way to tell which of the original indices their
/// counts came from.
///
/// Use this store when:
/// - You need bounded memory usage
/// - Higher quantiles (e.g., p95, p99) are more important than lower quantiles
/// - You're tracking latencies or other metrics where the tail matters most
#[derive(Clone, Debug, PartialEq)]
pub struct CollapsingLowestDenseStore {
    bins: BinArray,

    /// Maximum number of bins to maintain.
    max_num_bins: NonZeroUsize,

    /// Whether collapsing has occurred (accuracy may be compromised for low quantiles).
    is_collapsed: bool,
}

impl CollapsingLowestDenseStore {
    /// Creates an empty `CollapsingLowestDenseStore` with the given maximum number of bins.
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
    /// If true, accuracy guarantees may not hold for lower quantiles.
    pub fn is_collapsed(&self) -> bool {
        self.is_collapsed
    }

    /// Marks this store as holding collapsed data, such as bins replayed from a collapsed store.
    pub(super) fn mark_collapsed(&mut self) {
        self.is_collapsed = true;
    }

    /// Ensures the store can accommodate `[lo, hi]`, collapsing the lowest bins if necessary.
    ///
    /// Returns the lowest index that is still kept: counts for any index below it must be added to it instead.
    fn grow(&mut self, lo: i32, hi: i32) -> i32 {
        let limit = self.max_num_bins.get();
        let (lo, hi) = self.bins.union(lo, hi);

        if span(lo, hi) <= limit as u64 {
            if !self.bins.covers(lo, hi) {
                self.bins.remap(lo, hi, limit);
            }
            return lo;
        }

        // Incoming indices below the window are clamped by the caller, so existing bins only need to move when some of
        // them fall below it, or when the window itself is not allocated yet.
        let lowest_kept = (i64::from(hi) - limit as i64 + 1) as i32;
        let needs_remap =
            self.bins.min_index().is_some_and(|min| min < lowest_kept) || !self.bins.covers(lowest_kept, hi);

        if !self.is_collapsed {
            debug!(
                max_num_bins = limit,
                lowest_kept, "Bin limit reached. Collapsing lowest bins; low quantiles lose their accuracy guarantee."
            );
        } else if needs_remap {
            trace!(max_num_bins = limit, lowest_kept, "Collapsing lowest bins.");
        }

        if needs_remap {
            self.bins.remap(lowest_kept, hi, limit);
        }
        self.is_collapsed = true;
        lowest_kept
    }
}

impl Store for CollapsingLowestDenseStore {
    fn add(&mut self, index: i32, count: u64) {
        if count == 0 {
            return;
        }

        let lowest_kept = self.grow(index, index);
        self.bins.increment(index.max(lowest_kept), count);
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

        let lowest_kept = self.grow(other_min, other_max);
        for bin in other.bins() {
            self.bins.increment(bin.index().max(lowest_kept), bin.count());
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

impl Default for CollapsingLowestDenseStore {
    /// Creates a collapsing lowest dense store with a default of 2048 bins.
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NUM_BINS)
    }
}
