//! Critical-value and p-value lookup on sorted null samples.
//!
//! Every function here assumes its input is sorted ascending (as produced by
//! [`fix_distribution`](super::fix_distribution)) and free of NaN. Lookups
//! are binary searches, so a query costs O(log n).

use crate::error::{Result, StatsError};
use crate::types::Tail;

/// Slack added before flooring `alpha * n`, so that e.g. `0.29 * 100`
/// (which is `28.999...` in floating point) still allows 29 samples.
const ALPHA_INDEX_EPSILON: f64 = 1e-9;

/// A critical value read off one sorted null lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalValue {
    /// Statistic value at the boundary of the rejection region.
    pub value: f64,
    /// Index of `value` in the sorted lane.
    pub index: usize,
    /// Fraction of null samples at or beyond `value`.
    pub achieved_alpha: f64,
}

/// Check that `alpha` lies strictly inside (0, 1).
///
/// # Errors
///
/// Returns [`StatsError::InvalidAlpha`] otherwise (including NaN).
pub fn validate_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(StatsError::alpha(alpha, "alpha must lie strictly between 0 and 1"))
    }
}

/// Largest number of null samples allowed in the rejection region.
///
/// This is `floor(alpha * n)`, with `m / n <= alpha` holding exactly in
/// floating point.
pub fn rejection_count(alpha: f64, n: usize) -> usize {
    let mut m = (alpha * n as f64 + ALPHA_INDEX_EPSILON).floor() as usize;
    // The slack must not lift m past alpha.
    while m > 0 && m as f64 / n as f64 > alpha {
        m -= 1;
    }
    m
}

/// Number of samples `<= x`.
pub fn count_at_or_below(sorted: &[f64], x: f64) -> usize {
    sorted.partition_point(|&v| v <= x)
}

/// Number of samples `>= x`.
pub fn count_at_or_above(sorted: &[f64], x: f64) -> usize {
    sorted.len() - sorted.partition_point(|&v| v < x)
}

/// Corrected p-value of `observed` against a sorted null lane.
///
/// Negative tail: fraction of samples `<= observed`.
/// Positive tail: fraction of samples `>= observed`.
///
/// Returns NaN for an empty lane or a NaN `observed` (a masked point).
pub fn tail_p_value(sorted: &[f64], observed: f64, tail: Tail) -> f64 {
    if sorted.is_empty() || observed.is_nan() {
        return f64::NAN;
    }
    let count = match tail {
        Tail::Negative => count_at_or_below(sorted, observed),
        Tail::Positive => count_at_or_above(sorted, observed),
    };
    count as f64 / sorted.len() as f64
}

/// Find the critical value for `alpha` on a sorted null lane.
///
/// With `m = floor(alpha * n)`, the negative-tail critical value is the
/// `m`-th smallest sample and the positive-tail value the `m`-th largest.
/// When ties at that position would put more than `m` samples at or beyond
/// it, the boundary moves inward to the next distinct value. The achieved
/// alpha is therefore never above the requested one.
///
/// # Errors
///
/// [`StatsError::InvalidAlpha`] if alpha is outside (0, 1), if the lane is
/// too short for a single sample to fit in the rejection region, or if ties
/// leave no admissible boundary.
pub fn critical_value(sorted: &[f64], alpha: f64, tail: Tail) -> Result<CriticalValue> {
    validate_alpha(alpha)?;

    let n = sorted.len();
    let m = rejection_count(alpha, n);
    if m == 0 {
        let needed = (1.0 / alpha).ceil();
        return Err(StatsError::alpha(
            alpha,
            format!("{n} null samples cannot resolve this level (at least {needed} needed)"),
        ));
    }

    let index = match tail {
        Tail::Negative => {
            let index = m - 1;
            if count_at_or_below(sorted, sorted[index]) <= m {
                index
            } else {
                // Step below the run of ties.
                let first_tie = sorted.partition_point(|&v| v < sorted[index]);
                first_tie.checked_sub(1).ok_or_else(|| {
                    StatsError::alpha(alpha, "ties at the lowest null value exceed the rejection region")
                })?
            }
        }
        Tail::Positive => {
            let index = n - m;
            if count_at_or_above(sorted, sorted[index]) <= m {
                index
            } else {
                // Step above the run of ties.
                let past_tie = sorted.partition_point(|&v| v <= sorted[index]);
                if past_tie == n {
                    return Err(StatsError::alpha(
                        alpha,
                        "ties at the highest null value exceed the rejection region",
                    ));
                }
                past_tie
            }
        }
    };

    let value = sorted[index];
    Ok(CriticalValue {
        value,
        index,
        achieved_alpha: tail_p_value(sorted, value, tail),
    })
}
