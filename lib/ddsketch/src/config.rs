//! Sketch configuration.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::SketchError;
use crate::mapping::{IndexMapping as _, LogarithmicMapping};
use crate::sketch::{bin_limit, DDSketch};
use crate::store::{
    CollapsingHighestDenseStore, CollapsingLowestDenseStore, ConfiguredStore, DenseStore, DEFAULT_MAX_NUM_BINS,
};

const fn default_relative_accuracy() -> f64 {
    0.01
}

const fn default_max_num_bins() -> usize {
    DEFAULT_MAX_NUM_BINS.get()
}

/// Store strategy of a configured sketch.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfiguration {
    /// A dense store that grows without bound.
    #[default]
    UnboundedDense,

    /// A dense store that collapses its lowest bins once it holds `max_num_bins` bins.
    CollapsingLowestDense {
        /// Maximum number of bins.
        ///
        /// Defaults to 2048.
        #[serde(default = "default_max_num_bins")]
        max_num_bins: usize,
    },

    /// A dense store that collapses its highest bins once it holds `max_num_bins` bins.
    CollapsingHighestDense {
        /// Maximum number of bins.
        ///
        /// Defaults to 2048.
        #[serde(default = "default_max_num_bins")]
        max_num_bins: usize,
    },
}

impl StoreConfiguration {
    fn build(&self) -> Result<ConfiguredStore, SketchError> {
        Ok(match self {
            Self::UnboundedDense => ConfiguredStore::UnboundedDense(DenseStore::new()),
            Self::CollapsingLowestDense { max_num_bins } => {
                ConfiguredStore::CollapsingLowestDense(CollapsingLowestDenseStore::new(bin_limit(*max_num_bins)?))
            }
            Self::CollapsingHighestDense { max_num_bins } => {
                ConfiguredStore::CollapsingHighestDense(CollapsingHighestDenseStore::new(bin_limit(*max_num_bins)?))
            }
        })
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawSketchConfiguration {
    /// Relative accuracy of the sketch.
    ///
    /// Must be strictly between 0 and 1. Defaults to 0.01 (1%).
    relative_accuracy: f64,

    /// Store strategy of the sketch.
    ///
    /// Defaults to an unbounded dense store.
    store: StoreConfiguration,
}

impl Default for RawSketchConfiguration {
    fn default() -> Self {
        Self {
            relative_accuracy: default_relative_accuracy(),
            store: StoreConfiguration::default(),
        }
    }
}

/// A validated description of a sketch.
///
/// Deserializes from a structure such as:
///
/// ```yaml
/// relative_accuracy: 0.01
/// store:
///   type: collapsing_lowest_dense
///   max_num_bins: 2048
/// ```
///
/// Invalid parameters are rejected during deserialization. Every sketch built from the same configuration shares a single
/// index mapping, so they can all be merged with one another.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(try_from = "RawSketchConfiguration")]
pub struct SketchConfiguration {
    mapping: Arc<LogarithmicMapping>,
    store: StoreConfiguration,
}

impl SketchConfiguration {
    /// Creates a new `SketchConfiguration`.
    ///
    /// # Errors
    ///
    /// If the relative accuracy is not strictly between `0` and `1`, or a collapsing store has a bin limit of zero, an
    /// error is returned.
    pub fn new(relative_accuracy: f64, store: StoreConfiguration) -> Result<Self, SketchError> {
        let mapping = LogarithmicMapping::new(relative_accuracy)?;
        if let StoreConfiguration::CollapsingLowestDense { max_num_bins }
        | StoreConfiguration::CollapsingHighestDense { max_num_bins } = store
        {
            bin_limit(max_num_bins)?;
        }

        Ok(Self {
            mapping: Arc::new(mapping),
            store,
        })
    }

    /// Returns the configured relative accuracy.
    pub fn relative_accuracy(&self) -> f64 {
        self.mapping.relative_accuracy()
    }

    /// Returns the configured store strategy.
    pub fn store(&self) -> &StoreConfiguration {
        &self.store
    }

    /// Builds an empty sketch from this configuration.
    ///
    /// # Errors
    ///
    /// If the store configuration is invalid, an error is returned.
    pub fn build(&self) -> Result<DDSketch<LogarithmicMapping, ConfiguredStore>, SketchError> {
        let store = self.store.build()?;
        Ok(DDSketch::with_shared_mapping(Arc::clone(&self.mapping), store))
    }
}

impl TryFrom<RawSketchConfiguration> for SketchConfiguration {
    type Error = SketchError;

    fn try_from(raw: RawSketchConfiguration) -> Result<Self, Self::Error> {
        Self::new(raw.relative_accuracy, raw.store)
    }
}
