//! A DDSketch implementation: fully-mergeable quantile sketches with relative-error guarantees.
//!
//! A [`DDSketch`] maps each value to a bin through an [`IndexMapping`], and counts values per bin in a [`Store`]. Any
//! quantile read back from the sketch is within the relative accuracy of the mapping of the true value, and sketches
//! built with equivalent mappings can be merged without losing that guarantee.
//!
//! Memory is bounded either by the range of values seen ([`DenseStore`]) or by a fixed number of bins
//! ([`CollapsingLowestDenseStore`], [`CollapsingHighestDenseStore`]), at the cost of accuracy at one end of the
//! distribution once the limit is reached.
//!
//! # Example
//!
//! Quantiles follow the lower convention: the value at quantile `q` is the one at rank `floor(q * (count - 1))` in
//! sorted order, so `p99` of 1000 values is the 990th smallest.
//!
//! ```
//! use ddsketch::DDSketch;
//!
//! let mut sketch = DDSketch::log_collapsing_lowest_dense(0.01, 2048).unwrap();
//! for latency_ms in 1..=1000 {
//!     sketch.add(f64::from(latency_ms)).unwrap();
//! }
//!
//! let p99 = sketch.value_at_quantile(0.99).unwrap();
//! assert!((p99 - 990.0).abs() <= 990.0 * 0.01);
//!
//! let max = sketch.max_value().unwrap();
//! assert!((max - 1000.0).abs() <= 1000.0 * 0.01);
//! ```
#![deny(warnings)]
#![deny(missing_docs)]

mod common;
pub use self::common::MAPPING_EQUALITY_TOLERANCE;

mod config;
pub use self::config::{SketchConfiguration, StoreConfiguration};

mod error;
pub use self::error::SketchError;

pub mod mapping;
pub use self::mapping::{IndexMapping, LogarithmicMapping};

mod sketch;
pub use self::sketch::DDSketch;

pub mod store;
pub use self::store::{
    Bin, Bins, CollapsingHighestDenseStore, CollapsingLowestDenseStore, ConfiguredStore, DenseStore, Store,
};
