//! Threshold result type.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::types::{Adjustment, Tail};

/// Critical statistic values for one (alpha, tail, adjustment) request.
///
/// Grids are indexed (time, frequency). Corrected or pooled axes have length
/// 1 and broadcast over every bin of the statistic; a fully corrected
/// request yields a single scalar, see [`Threshold::critical_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Tail the threshold applies to.
    pub tail: Tail,
    /// Pooling/correction used to build the null distribution.
    pub adjustment: Adjustment,
    /// Significance level asked for.
    pub requested_alpha: f64,
    /// Null samples per bin after pooling.
    pub sample_count: usize,
    /// Critical value per remaining bin.
    pub critical_values: Array2<f64>,
    /// Fraction of null samples at or beyond each bin's critical value.
    ///
    /// Never exceeds `requested_alpha`.
    pub achieved_alphas: Array2<f64>,
}

impl Threshold {
    /// Largest achieved alpha over all bins.
    ///
    /// This is the level the whole threshold guarantees.
    pub fn achieved_alpha(&self) -> f64 {
        self.achieved_alphas
            .iter()
            .copied()
            .fold(0.0_f64, f64::max)
    }

    /// The single critical value of a fully reduced threshold.
    ///
    /// Returns `None` when per-bin values remain.
    pub fn critical_value(&self) -> Option<f64> {
        match self.critical_values.dim() {
            (1, 1) => Some(self.critical_values[[0, 0]]),
            _ => None,
        }
    }

    /// Critical value aligned with statistic bin (`time`, `freq`).
    pub fn critical_at(&self, time: usize, freq: usize) -> Option<f64> {
        let (time_bins, freq_bins) = self.critical_values.dim();
        let t = if time_bins == 1 { 0 } else { time };
        let f = if freq_bins == 1 { 0 } else { freq };
        self.critical_values.get((t, f)).copied()
    }

    /// Whether `stat` at (`time`, `freq`) lies at or beyond the critical value.
    ///
    /// Out-of-range bins are never significant.
    pub fn is_significant(&self, stat: f64, time: usize, freq: usize) -> bool {
        match (self.critical_at(time, freq), self.tail) {
            (Some(c), Tail::Positive) => stat >= c,
            (Some(c), Tail::Negative) => stat <= c,
            (None, _) => false,
        }
    }
}
