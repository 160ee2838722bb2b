//! Fixed-schema persistence for [`TimeFreqSnpmResults`].
//!
//! The archive is an explicit, versioned record: voxel coordinates plus four
//! row-major array records. It encodes to JSON for inspection or to
//! MessagePack for compact on-disk storage. Decoding always re-runs the
//! result constructor, so a loaded archive satisfies the same shape
//! invariants as one built in memory.

use std::fs;
use std::path::Path;

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Result, StatsError};
use crate::snpm::TimeFreqSnpmResults;
use crate::types::Voxel;

/// Current schema version.
pub const ARCHIVE_VERSION: u32 = 1;

/// A 3-axis array stored as its shape plus row-major data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayRecord {
    /// Extents of the three axes.
    pub shape: [usize; 3],
    /// Row-major values; length is the product of `shape`.
    pub data: Vec<f64>,
}

impl ArrayRecord {
    /// Capture an array in row-major order.
    pub fn from_array(array: &Array3<f64>) -> Self {
        let (a, b, c) = array.dim();
        Self {
            shape: [a, b, c],
            data: array.iter().copied().collect(),
        }
    }

    /// Rebuild the array, checking the data length against the shape.
    ///
    /// # Errors
    ///
    /// [`StatsError::MalformedArchive`] if the lengths disagree.
    pub fn into_array(self, name: &str) -> Result<Array3<f64>> {
        let [a, b, c] = self.shape;
        let found = self.data.len();
        Array3::from_shape_vec((a, b, c), self.data).map_err(|_| {
            StatsError::MalformedArchive(format!(
                "{name}: shape {:?} needs {} values, found {found}",
                self.shape,
                a * b * c
            ))
        })
    }
}

/// Serialized form of a [`TimeFreqSnpmResults`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultArchive {
    /// Schema version, see [`ARCHIVE_VERSION`].
    pub version: u32,
    /// Voxel coordinates aligned with the statistic's first axis.
    pub voxels: Vec<Voxel>,
    /// Observed statistic.
    pub stat: ArrayRecord,
    /// Uncorrected rankings.
    pub rankings: ArrayRecord,
    /// Per-permutation maxima.
    pub max_dist: ArrayRecord,
    /// Per-permutation minima.
    pub min_dist: ArrayRecord,
}

impl ResultArchive {
    /// Snapshot the raw arrays of a result object.
    pub fn from_results(results: &TimeFreqSnpmResults) -> Self {
        Self {
            version: ARCHIVE_VERSION,
            voxels: results.voxels().to_vec(),
            stat: ArrayRecord::from_array(results.stat()),
            rankings: ArrayRecord::from_array(results.rankings()),
            max_dist: ArrayRecord::from_array(results.max_dist()),
            min_dist: ArrayRecord::from_array(results.min_dist()),
        }
    }

    /// Rebuild a result object with the default configuration.
    ///
    /// # Errors
    ///
    /// [`StatsError::MalformedArchive`] for an unknown version or bad record,
    /// [`StatsError::ShapeMismatch`] if the arrays disagree.
    pub fn into_results(self) -> Result<TimeFreqSnpmResults> {
        self.into_results_with(Config::default())
    }

    /// Rebuild a result object with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Same as [`ResultArchive::into_results`].
    pub fn into_results_with(self, config: Config) -> Result<TimeFreqSnpmResults> {
        if self.version != ARCHIVE_VERSION {
            return Err(StatsError::MalformedArchive(format!(
                "unsupported archive version {} (expected {ARCHIVE_VERSION})",
                self.version
            )));
        }
        TimeFreqSnpmResults::with_config(
            self.stat.into_array("stat")?,
            self.voxels,
            self.rankings.into_array("rankings")?,
            self.max_dist.into_array("max_dist")?,
            self.min_dist.into_array("min_dist")?,
            config,
        )
    }

    /// Compact JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Pretty-printed JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    ///
    /// # Errors
    ///
    /// [`StatsError::Json`] if the text is not a valid archive.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// MessagePack encoding with named fields.
    ///
    /// # Errors
    ///
    /// [`StatsError::MsgpackEncode`] if serialization fails.
    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    /// Decode from MessagePack.
    ///
    /// # Errors
    ///
    /// [`StatsError::MsgpackDecode`] if the bytes are not a valid archive.
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

/// Write a result object to `path` as MessagePack.
///
/// # Errors
///
/// [`StatsError::ArchiveIo`] if the file cannot be written.
pub fn save(results: &TimeFreqSnpmResults, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let bytes = ResultArchive::from_results(results).to_msgpack()?;
    fs::write(path, bytes).map_err(|source| StatsError::ArchiveIo {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "saved results archive");
    Ok(())
}

/// Read a result object written by [`save`].
///
/// # Errors
///
/// [`StatsError::ArchiveIo`] if the file cannot be read; decode and shape
/// errors as for [`ResultArchive::into_results`].
pub fn load(path: impl AsRef<Path>) -> Result<TimeFreqSnpmResults> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| StatsError::ArchiveIo {
        path: path.to_path_buf(),
        source,
    })?;
    ResultArchive::from_msgpack(&bytes)?.into_results()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_results() -> TimeFreqSnpmResults {
        let stat = Array3::from_shape_fn((2, 3, 2), |(v, t, f)| (v * 6 + t * 2 + f) as f64);
        let rankings = stat.mapv(|x| x / 12.0);
        let max_dist = Array3::from_shape_fn((4, 3, 2), |(s, t, f)| (s + t + f) as f64);
        let min_dist = max_dist.mapv(|x| -x);
        TimeFreqSnpmResults::new(stat, vec![[0, 0, 0], [1, 0, 0]], rankings, max_dist, min_dist)
            .unwrap()
    }

    #[test]
    fn test_json_round_trip() {
        let results = make_results();
        let archive = ResultArchive::from_results(&results);
        let json = archive.to_json().unwrap();
        assert!(json.contains("\"version\":1"));

        let restored = ResultArchive::from_json(&json).unwrap().into_results().unwrap();
        assert_eq!(restored.stat(), results.stat());
        assert_eq!(restored.voxels(), results.voxels());
        assert_eq!(restored.min_dist(), results.min_dist());
    }

    #[test]
    fn test_msgpack_round_trip() {
        let results = make_results();
        let bytes = ResultArchive::from_results(&results).to_msgpack().unwrap();
        let restored = ResultArchive::from_msgpack(&bytes).unwrap().into_results().unwrap();
        assert_eq!(restored.rankings(), results.rankings());
        assert_eq!(restored.max_dist(), results.max_dist());
    }

    #[test]
    fn test_bad_record_length_rejected() {
        let mut archive = ResultArchive::from_results(&make_results());
        archive.stat.data.pop();
        assert!(matches!(
            archive.into_results(),
            Err(StatsError::MalformedArchive(_))
        ));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut archive = ResultArchive::from_results(&make_results());
        archive.version = 99;
        assert!(matches!(
            archive.into_results(),
            Err(StatsError::MalformedArchive(_))
        ));
    }

    #[test]
    fn test_inconsistent_shapes_rejected_on_decode() {
        let mut archive = ResultArchive::from_results(&make_results());
        archive.voxels.push([2, 0, 0]);
        assert!(matches!(
            archive.into_results(),
            Err(StatsError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_garbage_input_is_error() {
        assert!(matches!(ResultArchive::from_json("{"), Err(StatsError::Json(_))));
        assert!(matches!(
            ResultArchive::from_msgpack(&[0xc1]),
            Err(StatsError::MsgpackDecode(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/nonexistent/tfstats/archive.msgpack").unwrap_err();
        assert!(matches!(err, StatsError::ArchiveIo { .. }));
    }
}
