//! `TimeFreqSnpmResults`: validated permutation results and their queries.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use ndarray::{Array2, Array3, ArrayView3, Zip};

use crate::config::Config;
use crate::error::{Result, StatsError};
use crate::result::Threshold;
use crate::statistics::{validate_alpha, NullDistribution};
use crate::types::{Adjustment, Tail, Voxel};

type DistributionKey = (Tail, Adjustment);

/// Permutation-test results for a (voxel, time, frequency) statistic.
///
/// Holds the observed statistic, its voxel coordinates, the uncorrected
/// rankings and the per-permutation max/min null arrays. Transformed null
/// distributions are built on demand and cached per (tail, adjustment);
/// the cache is lock-guarded so a shared reference can be queried from
/// several threads.
///
/// # Example
///
/// ```ignore
/// use tfstats::{Tail, TimeFreqSnpmResults};
///
/// let results = TimeFreqSnpmResults::new(stat, vox, rankings, max_dist, min_dist)?;
/// let threshold = results.threshold(0.05, Tail::Positive)?;
/// println!("critical value {:?} at alpha {}", threshold.critical_value(), threshold.achieved_alpha());
/// ```
#[derive(Debug)]
pub struct TimeFreqSnpmResults {
    stat: Array3<f64>,
    voxels: Vec<Voxel>,
    rankings: Array3<f64>,
    max_dist: Array3<f64>,
    min_dist: Array3<f64>,
    config: Config,
    cache: RwLock<HashMap<DistributionKey, Arc<NullDistribution>>>,
}

impl TimeFreqSnpmResults {
    /// Build from raw arrays with the default configuration.
    ///
    /// # Errors
    ///
    /// [`StatsError::ShapeMismatch`] if the arrays disagree on their extents;
    /// [`StatsError::NonFiniteNull`] if a null array holds NaN or infinity.
    pub fn new(
        stat: Array3<f64>,
        voxels: Vec<Voxel>,
        rankings: Array3<f64>,
        max_dist: Array3<f64>,
        min_dist: Array3<f64>,
    ) -> Result<Self> {
        Self::with_config(stat, voxels, rankings, max_dist, min_dist, Config::default())
    }

    /// Build from raw arrays with an explicit configuration.
    ///
    /// # Errors
    ///
    /// [`StatsError::ShapeMismatch`] if the arrays disagree on their extents;
    /// [`StatsError::NonFiniteNull`] if a null array holds NaN or infinity;
    /// [`StatsError::InvalidAxisRequest`] if the configured default
    /// adjustment pools and corrects the same axis.
    pub fn with_config(
        stat: Array3<f64>,
        voxels: Vec<Voxel>,
        rankings: Array3<f64>,
        max_dist: Array3<f64>,
        min_dist: Array3<f64>,
        config: Config,
    ) -> Result<Self> {
        validate_shapes(&stat, &voxels, &rankings, &max_dist, &min_dist)?;
        config.adjustment().validate()?;

        tracing::debug!(
            voxels = voxels.len(),
            time_bins = stat.dim().1,
            freq_bins = stat.dim().2,
            permutations = max_dist.dim().0,
            "constructed time-frequency SnPM results"
        );

        Ok(Self {
            stat,
            voxels,
            rankings,
            max_dist,
            min_dist,
            config,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Observed statistic, indexed (voxel, time, frequency).
    pub fn stat(&self) -> &Array3<f64> {
        &self.stat
    }

    /// Voxel coordinates aligned with the statistic's first axis.
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Uncorrected percentile rankings, same shape as the statistic.
    pub fn rankings(&self) -> &Array3<f64> {
        &self.rankings
    }

    /// Per-permutation maxima, indexed (sample, time, frequency).
    pub fn max_dist(&self) -> &Array3<f64> {
        &self.max_dist
    }

    /// Per-permutation minima, indexed (sample, time, frequency).
    pub fn min_dist(&self) -> &Array3<f64> {
        &self.min_dist
    }

    /// Configuration in effect.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of permutations in the null arrays.
    pub fn permutations(&self) -> usize {
        self.max_dist.dim().0
    }

    /// Raw null array for a tail: maxima for positive, minima for negative.
    pub fn raw_distribution(&self, tail: Tail) -> ArrayView3<'_, f64> {
        match tail {
            Tail::Positive => self.max_dist.view(),
            Tail::Negative => self.min_dist.view(),
        }
    }

    /// Pooled, corrected and sorted null distribution for a request.
    ///
    /// Served from the cache when caching is enabled.
    ///
    /// # Errors
    ///
    /// [`StatsError::InvalidAxisRequest`] if an axis is both pooled and
    /// corrected.
    pub fn distribution(&self, tail: Tail, adjustment: &Adjustment) -> Result<Arc<NullDistribution>> {
        adjustment.validate()?;
        let key = (tail, *adjustment);

        if self.config.cache_distributions {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(dist) = cache.get(&key) {
                tracing::trace!(%tail, correct = %adjustment.correct, pool = %adjustment.pool, "distribution cache hit");
                return Ok(Arc::clone(dist));
            }
        }

        let dist = Arc::new(NullDistribution::from_raw(
            self.raw_distribution(tail),
            tail,
            *adjustment,
        )?);
        tracing::debug!(
            %tail,
            correct = %adjustment.correct,
            pool = %adjustment.pool,
            samples = dist.sample_count(),
            time_bins = dist.bins().0,
            freq_bins = dist.bins().1,
            "transformed null distribution"
        );

        if self.config.cache_distributions {
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            // Another thread may have raced us here; keep the first entry.
            let cached = cache.entry(key).or_insert_with(|| Arc::clone(&dist));
            return Ok(Arc::clone(cached));
        }
        Ok(dist)
    }

    /// Populate the cache for a request ahead of concurrent use.
    ///
    /// # Errors
    ///
    /// Same as [`TimeFreqSnpmResults::distribution`].
    pub fn precompute(&self, tail: Tail, adjustment: &Adjustment) -> Result<()> {
        self.distribution(tail, adjustment).map(|_| ())
    }

    /// Number of cached distributions.
    pub fn cached_distributions(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Critical value(s) using the configured default adjustment.
    ///
    /// With the default configuration both time and frequency are corrected,
    /// so the result holds a single scalar.
    ///
    /// # Errors
    ///
    /// See [`TimeFreqSnpmResults::threshold_with`].
    pub fn threshold(&self, alpha: f64, tail: Tail) -> Result<Threshold> {
        self.threshold_with(alpha, tail, &self.config.adjustment())
    }

    /// Critical value(s) for an explicit pooling/correction request.
    ///
    /// The returned [`Threshold`] reports the achieved alpha, which is at
    /// most `alpha` and usually slightly below it because the number of
    /// null samples is finite.
    ///
    /// # Errors
    ///
    /// [`StatsError::InvalidAlpha`] if alpha is outside (0, 1) or cannot be
    /// resolved with the available samples; [`StatsError::InvalidAxisRequest`]
    /// for an invalid adjustment.
    pub fn threshold_with(&self, alpha: f64, tail: Tail, adjustment: &Adjustment) -> Result<Threshold> {
        validate_alpha(alpha)?;
        let dist = self.distribution(tail, adjustment)?;
        let critical = dist.critical_values(alpha)?;

        let bins = dist.bins();
        let to_grid = |values: Vec<f64>| {
            Array2::from_shape_vec(bins, values)
                .map_err(|_| StatsError::shape("threshold grid", format!("{bins:?}"), critical.len()))
        };
        let critical_values = to_grid(critical.iter().map(|c| c.value).collect())?;
        let achieved_alphas = to_grid(critical.iter().map(|c| c.achieved_alpha).collect())?;

        let threshold = Threshold {
            tail,
            adjustment: *adjustment,
            requested_alpha: alpha,
            sample_count: dist.sample_count(),
            critical_values,
            achieved_alphas,
        };
        tracing::debug!(
            %tail,
            requested_alpha = alpha,
            achieved_alpha = threshold.achieved_alpha(),
            samples = threshold.sample_count,
            "computed threshold"
        );
        Ok(threshold)
    }

    /// Corrected p-value of the observed statistic at one point.
    ///
    /// # Errors
    ///
    /// [`StatsError::ShapeMismatch`] if the point is outside the statistic;
    /// [`StatsError::InvalidAxisRequest`] for an invalid adjustment.
    pub fn corrected_p_value(
        &self,
        voxel: usize,
        time: usize,
        freq: usize,
        tail: Tail,
        adjustment: &Adjustment,
    ) -> Result<f64> {
        let observed = *self.stat.get((voxel, time, freq)).ok_or_else(|| {
            StatsError::shape(
                "statistic index",
                format!("< {:?}", self.stat.dim()),
                format!("{:?}", (voxel, time, freq)),
            )
        })?;
        let dist = self.distribution(tail, adjustment)?;
        dist.p_value(observed, time, freq).ok_or_else(|| {
            StatsError::shape(
                "null distribution bin",
                format!("< {:?}", dist.bins()),
                format!("{:?}", (time, freq)),
            )
        })
    }

    /// Corrected p-value of every statistic point.
    ///
    /// NaN statistic points (masked voxels) map to NaN.
    ///
    /// # Errors
    ///
    /// [`StatsError::InvalidAxisRequest`] for an invalid adjustment.
    pub fn p_value_map(&self, tail: Tail, adjustment: &Adjustment) -> Result<Array3<f64>> {
        let dist = self.distribution(tail, adjustment)?;
        let lookup = |(_, t, f): (usize, usize, usize), p: &mut f64, &s: &f64| {
            // Bins always exist: the null shares the statistic's time/freq extents.
            *p = dist.p_value(s, t, f).unwrap_or(f64::NAN);
        };

        let mut p_values = Array3::zeros(self.stat.dim());
        #[cfg(feature = "parallel")]
        crate::thread_pool::install(|| {
            Zip::indexed(&mut p_values)
                .and(&self.stat)
                .par_for_each(lookup)
        });
        #[cfg(not(feature = "parallel"))]
        Zip::indexed(&mut p_values).and(&self.stat).for_each(lookup);

        Ok(p_values)
    }

    /// Points whose statistic lies at or beyond the corrected threshold.
    ///
    /// Returns the mask together with the threshold used to build it.
    ///
    /// # Errors
    ///
    /// See [`TimeFreqSnpmResults::threshold_with`].
    pub fn significance_mask(
        &self,
        alpha: f64,
        tail: Tail,
        adjustment: &Adjustment,
    ) -> Result<(Array3<bool>, Threshold)> {
        let threshold = self.threshold_with(alpha, tail, adjustment)?;
        let mask = Array3::from_shape_fn(self.stat.dim(), |(v, t, f)| {
            threshold.is_significant(self.stat[[v, t, f]], t, f)
        });
        Ok((mask, threshold))
    }

    /// Uncorrected significance from the rankings array.
    ///
    /// Positive tail: `ranking >= 1 - alpha`. Negative tail:
    /// `ranking <= alpha`.
    ///
    /// # Errors
    ///
    /// [`StatsError::InvalidAlpha`] if alpha is outside (0, 1).
    pub fn uncorrected_mask(&self, alpha: f64, tail: Tail) -> Result<Array3<bool>> {
        validate_alpha(alpha)?;
        Ok(match tail {
            Tail::Positive => self.rankings.mapv(|r| r >= 1.0 - alpha),
            Tail::Negative => self.rankings.mapv(|r| r <= alpha),
        })
    }
}

fn validate_shapes(
    stat: &Array3<f64>,
    voxels: &[Voxel],
    rankings: &Array3<f64>,
    max_dist: &Array3<f64>,
    min_dist: &Array3<f64>,
) -> Result<()> {
    let (n_vox, n_time, n_freq) = stat.dim();

    if voxels.len() != n_vox {
        return Err(StatsError::shape("voxel list length", n_vox, voxels.len()));
    }
    if rankings.dim() != stat.dim() {
        return Err(StatsError::shape(
            "rankings",
            format!("{:?}", stat.dim()),
            format!("{:?}", rankings.dim()),
        ));
    }
    if max_dist.dim() != min_dist.dim() {
        return Err(StatsError::shape(
            "min_dist",
            format!("{:?}", max_dist.dim()),
            format!("{:?}", min_dist.dim()),
        ));
    }
    let (n_perm, dist_time, dist_freq) = max_dist.dim();
    if (dist_time, dist_freq) != (n_time, n_freq) {
        return Err(StatsError::shape(
            "null distribution (time, freq)",
            format!("{:?}", (n_time, n_freq)),
            format!("{:?}", (dist_time, dist_freq)),
        ));
    }
    if n_perm == 0 {
        return Err(StatsError::shape("null distribution samples", ">= 1", 0));
    }
    for (what, dist) in [("max_dist", max_dist), ("min_dist", min_dist)] {
        let count = dist.iter().filter(|v| !v.is_finite()).count();
        if count > 0 {
            return Err(StatsError::NonFiniteNull {
                what: what.to_string(),
                count,
            });
        }
    }
    Ok(())
}
