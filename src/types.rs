//! Axis, tail and voxel types shared across the crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};

/// Integer voxel coordinate (i, j, k).
pub type Voxel = [usize; 3];

/// Which end of the null distribution a test looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tail {
    /// Unusually large statistics; uses the per-permutation maximum.
    Positive,
    /// Unusually small statistics; uses the per-permutation minimum.
    Negative,
}

impl Tail {
    /// Reduction applied when correcting over an axis.
    ///
    /// Max for the positive tail, min for the negative tail.
    pub fn reducer(self) -> fn(f64, f64) -> f64 {
        match self {
            Tail::Positive => f64::max,
            Tail::Negative => f64::min,
        }
    }

    /// Neutral element of [`Tail::reducer`].
    pub fn identity(self) -> f64 {
        match self {
            Tail::Positive => f64::NEG_INFINITY,
            Tail::Negative => f64::INFINITY,
        }
    }

    /// Short name, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Tail::Positive => "pos",
            Tail::Negative => "neg",
        }
    }
}

impl fmt::Display for Tail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tail {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pos" | "positive" | "+" => Ok(Tail::Positive),
            "neg" | "negative" | "-" => Ok(Tail::Negative),
            other => Err(StatsError::InvalidAxisRequest(format!(
                "unknown tail '{other}' (expected 'pos' or 'neg')"
            ))),
        }
    }
}

/// Structural axis of a (sample, time, frequency) null array.
///
/// The sample axis is deliberately not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    /// Axis 1: time bins.
    Time,
    /// Axis 2: frequency bins.
    Frequency,
}

impl Axis {
    /// Both structural axes, in array order.
    pub const ALL: [Axis; 2] = [Axis::Time, Axis::Frequency];

    /// Position of this axis in a 3-axis array.
    pub const fn index(self) -> usize {
        match self {
            Axis::Time => 1,
            Axis::Frequency => 2,
        }
    }

    /// Convert an array axis index into a structural axis.
    ///
    /// # Errors
    ///
    /// Index 0 is the sample axis and anything above 2 does not exist;
    /// both are reported as [`StatsError::InvalidAxisRequest`].
    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            1 => Ok(Axis::Time),
            2 => Ok(Axis::Frequency),
            0 => Err(StatsError::InvalidAxisRequest(
                "axis 0 is the sample axis and cannot be pooled or corrected".to_string(),
            )),
            n => Err(StatsError::InvalidAxisRequest(format!(
                "axis {n} is outside the structural axes (1 = time, 2 = frequency)"
            ))),
        }
    }

    const fn bit(self) -> u8 {
        1 << (self.index() - 1)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Time => f.write_str("time"),
            Axis::Frequency => f.write_str("frequency"),
        }
    }
}

impl FromStr for Axis {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "time" | "t" => Ok(Axis::Time),
            "frequency" | "freq" | "f" => Ok(Axis::Frequency),
            other => match other.parse::<usize>() {
                Ok(n) => Axis::from_index(n),
                Err(_) => Err(StatsError::InvalidAxisRequest(format!(
                    "unknown axis '{other}'"
                ))),
            },
        }
    }
}

/// A set of structural axes.
///
/// Naming the same axis twice collapses to one member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Axis>", from = "Vec<Axis>")]
pub struct AxisSet(u8);

impl AxisSet {
    /// No axes.
    pub const EMPTY: AxisSet = AxisSet(0);

    /// Time and frequency.
    pub const ALL: AxisSet = AxisSet(0b11);

    /// Set containing a single axis.
    pub const fn single(axis: Axis) -> Self {
        AxisSet(axis.bit())
    }

    /// Add an axis, returning the new set.
    #[must_use]
    pub const fn with(self, axis: Axis) -> Self {
        AxisSet(self.0 | axis.bit())
    }

    /// Whether `axis` is a member.
    pub const fn contains(self, axis: Axis) -> bool {
        self.0 & axis.bit() != 0
    }

    /// Whether the set has no members.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members shared with `other`.
    pub const fn intersection(self, other: AxisSet) -> AxisSet {
        AxisSet(self.0 & other.0)
    }

    /// Members not in `other`.
    pub const fn difference(self, other: AxisSet) -> AxisSet {
        AxisSet(self.0 & !other.0)
    }

    /// Members in array order.
    pub fn iter(self) -> impl Iterator<Item = Axis> {
        Axis::ALL.into_iter().filter(move |a| self.contains(*a))
    }

    /// Build a set from integer array indices (1 = time, 2 = frequency).
    ///
    /// # Errors
    ///
    /// Fails on the sample axis or any index outside the structural axes.
    pub fn from_indices(indices: &[usize]) -> Result<Self> {
        indices
            .iter()
            .try_fold(AxisSet::EMPTY, |set, &i| Ok(set.with(Axis::from_index(i)?)))
    }
}

impl FromIterator<Axis> for AxisSet {
    fn from_iter<I: IntoIterator<Item = Axis>>(iter: I) -> Self {
        iter.into_iter().fold(AxisSet::EMPTY, AxisSet::with)
    }
}

impl From<Vec<Axis>> for AxisSet {
    fn from(axes: Vec<Axis>) -> Self {
        axes.into_iter().collect()
    }
}

impl From<AxisSet> for Vec<Axis> {
    fn from(set: AxisSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Display for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|a| a.to_string()).collect();
        write!(f, "({})", names.join(", "))
    }
}

impl FromStr for AxisSet {
    type Err = StatsError;

    /// Parse a comma-separated list such as `"time,freq"`; empty means none.
    fn from_str(s: &str) -> Result<Self> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .try_fold(AxisSet::EMPTY, |set, part| Ok(set.with(part.parse()?)))
    }
}

/// Which axes to correct and which to pool for one distribution request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Adjustment {
    /// Axes collapsed to their extremum (family-wise correction).
    pub correct: AxisSet,
    /// Axes merged into the sample axis.
    pub pool: AxisSet,
}

impl Adjustment {
    /// No pooling and no correction: a plain per-bin distribution.
    pub const fn none() -> Self {
        Adjustment {
            correct: AxisSet::EMPTY,
            pool: AxisSet::EMPTY,
        }
    }

    /// Correct over both time and frequency.
    pub const fn full_correction() -> Self {
        Adjustment {
            correct: AxisSet::ALL,
            pool: AxisSet::EMPTY,
        }
    }

    /// Add an axis to the correction set.
    #[must_use]
    pub const fn correct(mut self, axis: Axis) -> Self {
        self.correct = self.correct.with(axis);
        self
    }

    /// Add an axis to the pooling set.
    #[must_use]
    pub const fn pool(mut self, axis: Axis) -> Self {
        self.pool = self.pool.with(axis);
        self
    }

    /// Build from integer axis indices, as used by array-oriented callers.
    ///
    /// # Errors
    ///
    /// Fails if either list names the sample axis or a non-existent axis,
    /// or if the two lists overlap.
    pub fn from_indices(correct: &[usize], pool: &[usize]) -> Result<Self> {
        let adjustment = Adjustment {
            correct: AxisSet::from_indices(correct)?,
            pool: AxisSet::from_indices(pool)?,
        };
        adjustment.validate()?;
        Ok(adjustment)
    }

    /// Check that no axis is both pooled and corrected.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidAxisRequest`] naming the shared axes.
    pub fn validate(&self) -> Result<()> {
        let overlap = self.correct.intersection(self.pool);
        if overlap.is_empty() {
            Ok(())
        } else {
            Err(StatsError::InvalidAxisRequest(format!(
                "axes {overlap} cannot be both pooled and corrected"
            )))
        }
    }
}
