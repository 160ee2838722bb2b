//! # tfstats
//!
//! Permutation-corrected significance for time-frequency neuroimaging
//! statistics.
//!
//! Given an observed statistic indexed (voxel, time, frequency) and the
//! per-permutation maximum/minimum null arrays indexed (sample, time,
//! frequency), this crate provides:
//! - Pooling of time and/or frequency bins into the null sample axis
//! - Family-wise correction over time and/or frequency (extremum reduction)
//! - Critical values with the achieved (discrete) alpha
//! - Corrected p-values and significance masks
//!
//! ## Quick Start
//!
//! ```ignore
//! use tfstats::{Adjustment, Axis, Tail, TimeFreqSnpmResults};
//!
//! let results = TimeFreqSnpmResults::new(stat, vox, rankings, max_dist, min_dist)?;
//!
//! // Corrected over time and frequency: a single critical value
//! let threshold = results.threshold(0.05, Tail::Positive)?;
//! println!("{:?} at alpha {}", threshold.critical_value(), threshold.achieved_alpha());
//!
//! // Pool time bins, keep one threshold per frequency bin
//! let per_freq = results.threshold_with(
//!     0.05,
//!     Tail::Negative,
//!     &Adjustment::none().pool(Axis::Time),
//! )?;
//! ```
//!
//! ## Choosing alpha
//!
//! With `N` null samples per bin, at most `floor(alpha * N)` samples may sit
//! in the rejection region. The achieved alpha is reported alongside every
//! threshold and never exceeds the requested level; a level that no sample
//! count can honour is an error, not a clamp.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod error;
mod result;
mod snpm;
#[cfg(feature = "parallel")]
mod thread_pool;
mod types;

// Functional modules
pub mod output;
pub mod statistics;
pub mod voxels;

// Re-exports for public API
pub use config::{Config, ENV_CACHE, ENV_CORRECT, ENV_POOL};
pub use error::{Result, StatsError};
pub use result::Threshold;
pub use snpm::TimeFreqSnpmResults;
pub use statistics::{fix_distribution, NullDistribution};
pub use types::{Adjustment, Axis, AxisSet, Tail, Voxel};
