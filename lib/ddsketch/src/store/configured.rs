use tracing::debug;

use super::{Bins, CollapsingHighestDenseStore, CollapsingLowestDenseStore, DenseStore, Store};

/// A store whose strategy is chosen at runtime.
///
/// This is the store built from a [`SketchConfiguration`](crate::SketchConfiguration), where the strategy comes from
/// configuration rather than from the type system.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfiguredStore {
    /// Grows without bound.
    UnboundedDense(DenseStore),

    /// Collapses the lowest bins once the bin limit is reached.
    CollapsingLowestDense(CollapsingLowestDenseStore),

    /// Collapses the highest bins once the bin limit is reached.
    CollapsingHighestDense(CollapsingHighestDenseStore),
}

impl ConfiguredStore {
    /// Returns `true` if bins have been collapsed, either by this store or by a collapsed store merged into it.
    ///
    /// Unbounded stores never collapse, and keep returning `false` even after merging a collapsed store.
    pub fn is_collapsed(&self) -> bool {
        match self {
            Self::UnboundedDense(_) => false,
            Self::CollapsingLowestDense(store) => store.is_collapsed(),
            Self::CollapsingHighestDense(store) => store.is_collapsed(),
        }
    }

    fn strategy(&self) -> &'static str {
        match self {
            Self::UnboundedDense(_) => "unbounded_dense",
            Self::CollapsingLowestDense(_) => "collapsing_lowest_dense",
            Self::CollapsingHighestDense(_) => "collapsing_highest_dense",
        }
    }
}

impl Default for ConfiguredStore {
    fn default() -> Self {
        Self::UnboundedDense(DenseStore::default())
    }
}

impl Store for ConfiguredStore {
    fn add(&mut self, index: i32, count: u64) {
        match self {
            Self::UnboundedDense(store) => store.add(index, count),
            Self::CollapsingLowestDense(store) => store.add(index, count),
            Self::CollapsingHighestDense(store) => store.add(index, count),
        }
    }

    fn total_count(&self) -> u64 {
        match self {
            Self::UnboundedDense(store) => store.total_count(),
            Self::CollapsingLowestDense(store) => store.total_count(),
            Self::CollapsingHighestDense(store) => store.total_count(),
        }
    }

    fn min_index(&self) -> Option<i32> {
        match self {
            Self::UnboundedDense(store) => store.min_index(),
            Self::CollapsingLowestDense(store) => store.min_index(),
            Self::CollapsingHighestDense(store) => store.min_index(),
        }
    }

    fn max_index(&self) -> Option<i32> {
        match self {
            Self::UnboundedDense(store) => store.max_index(),
            Self::CollapsingLowestDense(store) => store.max_index(),
            Self::CollapsingHighestDense(store) => store.max_index(),
        }
    }

    fn key_at_rank(&self, rank: f64) -> Option<i32> {
        match self {
            Self::UnboundedDense(store) => store.key_at_rank(rank),
            Self::CollapsingLowestDense(store) => store.key_at_rank(rank),
            Self::CollapsingHighestDense(store) => store.key_at_rank(rank),
        }
    }

    fn merge(&mut self, other: &Self) {
        match (self, other) {
            (Self::UnboundedDense(store), Self::UnboundedDense(other)) => store.merge(other),
            (Self::CollapsingLowestDense(store), Self::CollapsingLowestDense(other)) => store.merge(other),
            (Self::CollapsingHighestDense(store), Self::CollapsingHighestDense(other)) => store.merge(other),
            (store, other) => {
                // Different strategies: replay the other store's bins through our own collapsing rules.
                debug!(
                    into = store.strategy(),
                    from = other.strategy(),
                    "Merging stores with different strategies bin by bin."
                );
                other.bins().for_each(|bin| store.add_bin(bin));

                if other.is_collapsed() {
                    match store {
                        Self::UnboundedDense(_) => {}
                        Self::CollapsingLowestDense(store) => store.mark_collapsed(),
                        Self::CollapsingHighestDense(store) => store.mark_collapsed(),
                    }
                }
            }
        }
    }

    fn bins(&self) -> Bins<'_> {
        match self {
            Self::UnboundedDense(store) => store.bins(),
            Self::CollapsingLowestDense(store) => store.bins(),
            Self::CollapsingHighestDense(store) => store.bins(),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::UnboundedDense(store) => store.clear(),
            Self::CollapsingLowestDense(store) => store.clear(),
            Self::CollapsingHighestDense(store) => store.clear(),
        }
    }
}
