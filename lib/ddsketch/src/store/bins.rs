use std::iter::{Enumerate, FusedIterator};
use std::slice;

use serde::{Deserialize, Serialize};

/// Allocation granularity of a bin array, in bins.
const GROWTH_INCREMENT: usize = 64;

/// A sketch bin: an index and the number of observations that fell into it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Bin {
    index: i32,
    count: u64,
}

impl Bin {
    /// Creates a bin for the given index and count.
    pub fn new(index: i32, count: u64) -> Self {
        Self { index, count }
    }

    /// Returns the index of the bin.
    pub fn index(&self) -> i32 {
        self.index
    }

    /// Returns the number of observations within the bin.
    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Iterator over the non-empty bins of a store, in ascending index order.
///
/// The iterator borrows the store, so the store cannot be modified while bins are being read. Calling
/// [`Store::bins`](super::Store::bins) again after modifying the store starts a fresh pass over its current contents.
#[derive(Clone, Debug)]
pub struct Bins<'a> {
    counts: Enumerate<slice::Iter<'a, u64>>,
    first_index: i32,
}

impl<'a> Bins<'a> {
    fn new(counts: &'a [u64], first_index: i32) -> Self {
        Self {
            counts: counts.iter().enumerate(),
            first_index,
        }
    }

    fn bin_at(&self, position: usize, count: u64) -> Bin {
        let index = i64::from(self.first_index) + position as i64;
        Bin::new(index as i32, count)
    }
}

impl Iterator for Bins<'_> {
    type Item = Bin;

    fn next(&mut self) -> Option<Self::Item> {
        let (position, count) = self.counts.find(|(_, count)| **count > 0)?;
        Some(self.bin_at(position, *count))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.counts.size_hint().1)
    }
}

impl DoubleEndedIterator for Bins<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (position, count) = self.counts.rfind(|(_, count)| **count > 0)?;
        Some(self.bin_at(position, *count))
    }
}

impl FusedIterator for Bins<'_> {}

/// Number of indices in `[lo, hi]`.
pub(super) fn span(lo: i32, hi: i32) -> u64 {
    (i64::from(hi) - i64::from(lo) + 1) as u64
}

/// Contiguous bin counts, shared by all of the dense store variants.
///
/// `counts[i]` holds the count for index `offset + i`. The array is allocated with some headroom around the occupied
/// range so that most insertions do not need to reallocate, and is re-laid out whenever an index falls outside of it.
/// `min_index` and `max_index` track the lowest and highest non-empty bins, and are only meaningful when the array is
/// not empty.
#[derive(Clone, Debug, Default)]
pub(super) struct BinArray {
    counts: Vec<u64>,
    offset: i32,
    min_index: i32,
    max_index: i32,
    total_count: u64,
}

impl BinArray {
    pub(super) fn total_count(&self) -> u64 {
        self.total_count
    }

    pub(super) fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Returns the lowest and highest non-empty indices.
    pub(super) fn range(&self) -> Option<(i32, i32)> {
        (!self.is_empty()).then_some((self.min_index, self.max_index))
    }

    pub(super) fn min_index(&self) -> Option<i32> {
        self.range().map(|(min, _)| min)
    }

    pub(super) fn max_index(&self) -> Option<i32> {
        self.range().map(|(_, max)| max)
    }

    /// Number of allocated bins, empty or not.
    #[cfg(test)]
    pub(super) fn capacity(&self) -> usize {
        self.counts.len()
    }

    /// Returns the smallest range covering both the non-empty bins and `[lo, hi]`.
    pub(super) fn union(&self, lo: i32, hi: i32) -> (i32, i32) {
        match self.range() {
            Some((min, max)) => (min.min(lo), max.max(hi)),
            None => (lo, hi),
        }
    }

    /// Returns `true` if every index in `[lo, hi]` has an allocated slot.
    pub(super) fn covers(&self, lo: i32, hi: i32) -> bool {
        let end = i64::from(self.offset) + self.counts.len() as i64;
        !self.counts.is_empty() && lo >= self.offset && i64::from(hi) < end
    }

    /// Re-lays out the array so that every index in `[lo, hi]` has a slot.
    ///
    /// The new allocation never exceeds `max_len` bins, which must be at least the size of `[lo, hi]`. Non-empty bins
    /// that fall outside of `[lo, hi]` are folded into the nearest end of it: their counts are added to the bin at `lo`
    /// or `hi`. That folding cannot be undone.
    pub(super) fn remap(&mut self, lo: i32, hi: i32, max_len: usize) {
        let desired = span(lo, hi) as usize;
        let len = grown_length(desired, self.counts.len()).min(max_len).max(desired);

        // Center the requested range within the new allocation, leaving headroom on both sides.
        let slack = (len - desired) as i64;
        let highest_offset = i64::from(i32::MAX) - len as i64 + 1;
        let offset = (i64::from(lo) - slack / 2).clamp(i64::from(i32::MIN), highest_offset) as i32;

        let mut counts = vec![0u64; len];
        for bin in self.bins() {
            let slot = (i64::from(bin.index().clamp(lo, hi)) - i64::from(offset)) as usize;
            counts[slot] = counts[slot].saturating_add(bin.count());
        }

        self.counts = counts;
        self.offset = offset;
        if !self.is_empty() {
            self.min_index = self.min_index.clamp(lo, hi);
            self.max_index = self.max_index.clamp(lo, hi);
        }
    }

    /// Adds `count` to the bin at `index`.
    ///
    /// The index must already have a slot (see [`covers`](Self::covers)), and `count` must be non-zero.
    pub(super) fn increment(&mut self, index: i32, count: u64) {
        let slot = (i64::from(index) - i64::from(self.offset)) as usize;
        self.counts[slot] = self.counts[slot].saturating_add(count);

        if self.is_empty() {
            self.min_index = index;
            self.max_index = index;
        } else {
            self.min_index = self.min_index.min(index);
            self.max_index = self.max_index.max(index);
        }
        self.total_count = self.total_count.saturating_add(count);
    }

    /// Returns the index of the bin holding the observation at the given 0-based rank.
    ///
    /// Ranks below zero resolve to the lowest bin, and ranks at or beyond the total count resolve to the highest bin.
    pub(super) fn key_at_rank(&self, rank: f64) -> Option<i32> {
        if self.is_empty() {
            return None;
        }

        let mut cumulative = 0u64;
        for bin in self.bins() {
            cumulative = cumulative.saturating_add(bin.count());
            if cumulative as f64 > rank {
                return Some(bin.index());
            }
        }

        Some(self.max_index)
    }

    pub(super) fn bins(&self) -> Bins<'_> {
        match self.range() {
            Some((min, max)) => {
                let start = (i64::from(min) - i64::from(self.offset)) as usize;
                let end = (i64::from(max) - i64::from(self.offset)) as usize;
                Bins::new(&self.counts[start..=end], min)
            }
            None => Bins::new(&[], 0),
        }
    }

    pub(super) fn clear(&mut self) {
        self.counts.clear();
        self.offset = 0;
        self.min_index = 0;
        self.max_index = 0;
        self.total_count = 0;
    }
}

impl PartialEq for BinArray {
    fn eq(&self, other: &Self) -> bool {
        // Allocation layout is not observable, only the non-empty bins are.
        self.total_count == other.total_count && self.bins().eq(other.bins())
    }
}

/// Returns the number of bins to allocate to hold `desired` bins, given `current` allocated bins.
///
/// Arrays that must grow at least double in size, so growth is amortized over insertions.
fn grown_length(desired: usize, current: usize) -> usize {
    if desired <= current {
        return current;
    }

    desired
        .max(current.saturating_mul(2))
        .div_ceil(GROWTH_INCREMENT)
        .saturating_mul(GROWTH_INCREMENT)
}
