//! Pooling and family-wise correction of permutation null distributions.
//!
//! A raw null array has shape (samples, time, frequency). Pooling an axis
//! folds it into the sample axis, multiplying the number of samples by that
//! axis's length. Correcting an axis replaces it with its extremum (max for
//! the positive tail, min for the negative tail). Both leave the treated axis
//! at length 1 so the array stays three-dimensional. The result is sorted
//! along the sample axis so quantiles can be read off by index.

use ndarray::{Array3, ArrayView3, Axis as ArrayAxis};

use crate::error::{Result, StatsError};
use crate::statistics::quantile::{critical_value, tail_p_value, CriticalValue};
use crate::types::{Adjustment, Axis, Tail};

/// Pool, correct and sort a (samples, time, frequency) null array.
///
/// Pooling runs first, then correction, then an ascending sort of every lane
/// along axis 0. The output is in standard (row-major) layout with shape
/// `(S * pooled lengths, T or 1, F or 1)`.
///
/// # Errors
///
/// Returns [`StatsError::InvalidAxisRequest`] when an axis is both pooled
/// and corrected.
pub fn fix_distribution(
    source: ArrayView3<'_, f64>,
    tail: Tail,
    adjustment: &Adjustment,
) -> Result<Array3<f64>> {
    adjustment.validate()?;

    let mut dist = source.to_owned();
    for axis in adjustment.pool.iter() {
        dist = pool_axis(dist, axis)?;
    }
    for axis in adjustment.correct.iter() {
        dist = correct_axis(&dist, axis, tail);
    }
    sort_samples(&mut dist);

    Ok(dist.as_standard_layout().into_owned())
}

/// Merge `axis` into the sample axis.
///
/// A length-1 axis is returned untouched.
fn pool_axis(dist: Array3<f64>, axis: Axis) -> Result<Array3<f64>> {
    let index = axis.index();
    if dist.len_of(ArrayAxis(index)) == 1 {
        return Ok(dist);
    }

    // Bring the pooled axis next to the sample axis: (S, A, B).
    let mut view = dist.view();
    view.swap_axes(1, index);
    let (samples, pooled, rest) = view.dim();
    let values: Vec<f64> = view.iter().copied().collect();

    let mut merged = Array3::from_shape_vec((samples * pooled, 1, rest), values).map_err(|_| {
        StatsError::shape(
            format!("pooled {axis} axis"),
            samples * pooled * rest,
            dist.len(),
        )
    })?;
    merged.swap_axes(1, index);
    Ok(merged)
}

/// Reduce `axis` to length 1 with the tail's extremum.
fn correct_axis(dist: &Array3<f64>, axis: Axis, tail: Tail) -> Array3<f64> {
    let array_axis = ArrayAxis(axis.index());
    let reduce = tail.reducer();
    dist.fold_axis(array_axis, tail.identity(), |&acc, &x| reduce(acc, x))
        .insert_axis(array_axis)
}

fn sort_samples(dist: &mut Array3<f64>) {
    for mut lane in dist.lanes_mut(ArrayAxis(0)) {
        let mut values = lane.to_vec();
        values.sort_unstable_by(|a, b| a.total_cmp(b));
        for (slot, value) in lane.iter_mut().zip(values) {
            *slot = value;
        }
    }
}

/// A pooled, corrected and sorted null distribution ready for lookups.
///
/// Samples are stored per (time, frequency) bin so each lane is a
/// contiguous sorted slice.
#[derive(Debug, Clone)]
pub struct NullDistribution {
    tail: Tail,
    adjustment: Adjustment,
    sample_count: usize,
    bins: (usize, usize),
    lanes: Vec<Vec<f64>>,
}

impl NullDistribution {
    /// Transform a raw null array into a lookup-ready distribution.
    ///
    /// # Errors
    ///
    /// Propagates [`fix_distribution`] errors.
    pub fn from_raw(source: ArrayView3<'_, f64>, tail: Tail, adjustment: Adjustment) -> Result<Self> {
        let sorted = fix_distribution(source, tail, &adjustment)?;
        let (sample_count, time_bins, freq_bins) = sorted.dim();
        let lanes = sorted
            .lanes(ArrayAxis(0))
            .into_iter()
            .map(|lane| lane.to_vec())
            .collect();

        Ok(Self {
            tail,
            adjustment,
            sample_count,
            bins: (time_bins, freq_bins),
            lanes,
        })
    }

    /// Tail this distribution was built for.
    pub fn tail(&self) -> Tail {
        self.tail
    }

    /// Pooling/correction applied to the raw array.
    pub fn adjustment(&self) -> Adjustment {
        self.adjustment
    }

    /// Number of samples per bin after pooling.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Remaining (time, frequency) extents; reduced axes have length 1.
    pub fn bins(&self) -> (usize, usize) {
        self.bins
    }

    /// Full (samples, time, frequency) array, sorted along axis 0.
    pub fn to_array(&self) -> Array3<f64> {
        let (_, freq_bins) = self.bins;
        Array3::from_shape_fn(
            (self.sample_count, self.bins.0, freq_bins),
            |(k, t, f)| self.lanes[t * freq_bins + f][k],
        )
    }

    /// Sorted samples aligned with the statistic at (`time`, `freq`).
    ///
    /// Reduced axes broadcast: any index maps onto their single bin.
    /// Returns `None` if an index is outside a non-reduced axis.
    pub fn lane(&self, time: usize, freq: usize) -> Option<&[f64]> {
        let (time_bins, freq_bins) = self.bins;
        let t = if time_bins == 1 { 0 } else { time };
        let f = if freq_bins == 1 { 0 } else { freq };
        if t >= time_bins || f >= freq_bins {
            return None;
        }
        self.lanes.get(t * freq_bins + f).map(Vec::as_slice)
    }

    /// Corrected p-value of `observed` at (`time`, `freq`).
    pub fn p_value(&self, observed: f64, time: usize, freq: usize) -> Option<f64> {
        self.lane(time, freq)
            .map(|lane| tail_p_value(lane, observed, self.tail))
    }

    /// Critical value for every remaining bin, in row-major (time, freq) order.
    ///
    /// # Errors
    ///
    /// [`StatsError::InvalidAlpha`] if any bin cannot resolve `alpha`.
    pub fn critical_values(&self, alpha: f64) -> Result<Vec<CriticalValue>> {
        self.lanes
            .iter()
            .map(|lane| critical_value(lane, alpha, self.tail))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn ramp(s: usize, t: usize, f: usize) -> Array3<f64> {
        // Distinct, unsorted values so sorting is observable
        Array3::from_shape_fn((s, t, f), |(i, j, k)| {
            (((i * 31 + j * 7 + k * 3) % 97) as f64) - 48.0
        })
    }

    fn is_sorted_along_samples(a: &Array3<f64>) -> bool {
        a.lanes(ArrayAxis(0))
            .into_iter()
            .all(|lane| lane.windows(2).into_iter().all(|w| w[0] <= w[1]))
    }

    #[test]
    fn test_pool_time_shape() {
        let raw = ramp(16, 10, 4);
        let adj = Adjustment::none().pool(Axis::Time);
        let out = fix_distribution(raw.view(), Tail::Positive, &adj).unwrap();
        assert_eq!(out.dim(), (160, 1, 4));
        assert!(is_sorted_along_samples(&out));
    }

    #[test]
    fn test_pool_frequency_shape() {
        let raw = ramp(16, 10, 4);
        let adj = Adjustment::none().pool(Axis::Frequency);
        let out = fix_distribution(raw.view(), Tail::Positive, &adj).unwrap();
        assert_eq!(out.dim(), (64, 10, 1));
    }

    #[test]
    fn test_pool_keeps_every_value_once() {
        let raw = ramp(5, 3, 2);
        let adj = Adjustment::none().pool(Axis::Frequency);
        let out = fix_distribution(raw.view(), Tail::Negative, &adj).unwrap();
        for t in 0..3 {
            let mut expected: Vec<f64> = raw
                .index_axis(ArrayAxis(1), t)
                .iter()
                .copied()
                .collect();
            expected.sort_by(|a, b| a.total_cmp(b));
            let got: Vec<f64> = out.index_axis(ArrayAxis(1), t).iter().copied().collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_pool_both_axes() {
        let raw = ramp(16, 10, 4);
        let adj = Adjustment::none().pool(Axis::Time).pool(Axis::Frequency);
        let out = fix_distribution(raw.view(), Tail::Positive, &adj).unwrap();
        assert_eq!(out.dim(), (640, 1, 1));

        let mut expected: Vec<f64> = raw.iter().copied().collect();
        expected.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(out.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_correct_time_negative_tail() {
        let raw = ramp(16, 10, 4);
        let adj = Adjustment::none().correct(Axis::Time);
        let out = fix_distribution(raw.view(), Tail::Negative, &adj).unwrap();
        assert_eq!(out.dim(), (16, 1, 4));

        for f in 0..4 {
            let mut expected: Vec<f64> = (0..16)
                .map(|s| (0..10).map(|t| raw[[s, t, f]]).fold(f64::INFINITY, f64::min))
                .collect();
            expected.sort_by(|a, b| a.total_cmp(b));
            let got: Vec<f64> = (0..16).map(|s| out[[s, 0, f]]).collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_correct_both_axes_positive_tail() {
        let raw = ramp(16, 10, 4);
        let out = fix_distribution(raw.view(), Tail::Positive, &Adjustment::full_correction()).unwrap();
        assert_eq!(out.dim(), (16, 1, 1));

        let mut expected: Vec<f64> = raw
            .outer_iter()
            .map(|plane| plane.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect();
        expected.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(out.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_pool_then_correct() {
        let raw = ramp(8, 6, 3);
        let adj = Adjustment::none().pool(Axis::Time).correct(Axis::Frequency);
        let out = fix_distribution(raw.view(), Tail::Positive, &adj).unwrap();
        assert_eq!(out.dim(), (48, 1, 1));

        let mut expected: Vec<f64> = Vec::new();
        for s in 0..8 {
            for t in 0..6 {
                expected.push((0..3).map(|f| raw[[s, t, f]]).fold(f64::NEG_INFINITY, f64::max));
            }
        }
        expected.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(out.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_no_adjustment_is_pure_sort() {
        let raw = ramp(16, 10, 4);
        let out = fix_distribution(raw.view(), Tail::Negative, &Adjustment::none()).unwrap();
        assert_eq!(out.dim(), raw.dim());

        let mut expected = raw.clone();
        sort_samples(&mut expected);
        assert_eq!(out, expected);
        assert!(is_sorted_along_samples(&out));
    }

    #[test]
    fn test_overlap_rejected() {
        let raw = ramp(4, 3, 2);
        let adj = Adjustment::none().pool(Axis::Time).correct(Axis::Time);
        assert!(matches!(
            fix_distribution(raw.view(), Tail::Positive, &adj),
            Err(StatsError::InvalidAxisRequest(_))
        ));
    }

    #[test]
    fn test_size_one_axis_does_not_multiply_samples() {
        let raw = ramp(16, 1, 4);
        let adj = Adjustment::none().pool(Axis::Time);
        let out = fix_distribution(raw.view(), Tail::Positive, &adj).unwrap();
        assert_eq!(out.dim(), (16, 1, 4));
    }

    #[test]
    fn test_null_distribution_lane_broadcasts() {
        let raw = ramp(16, 10, 4);
        let dist = NullDistribution::from_raw(
            raw.view(),
            Tail::Positive,
            Adjustment::none().correct(Axis::Time),
        )
        .unwrap();

        assert_eq!(dist.bins(), (1, 4));
        assert_eq!(dist.sample_count(), 16);
        assert_eq!(dist.lane(0, 2), dist.lane(9, 2));
        assert!(dist.lane(0, 4).is_none());
        assert_eq!(dist.to_array().dim(), (16, 1, 4));
    }

    #[test]
    fn test_null_distribution_round_trips_array() {
        let raw = ramp(6, 3, 2);
        let dist = NullDistribution::from_raw(raw.view(), Tail::Negative, Adjustment::none()).unwrap();
        let sorted = fix_distribution(raw.view(), Tail::Negative, &Adjustment::none()).unwrap();
        assert_eq!(dist.to_array(), sorted);
    }
}
