//! Error type shared by construction, queries and persistence.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Everything that can go wrong building or querying a result object.
#[derive(Debug, Error)]
pub enum StatsError {
    /// Raw arrays disagree on their extents.
    #[error("shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        /// Which array or axis failed the check.
        what: String,
        /// Expected extent(s).
        expected: String,
        /// Actual extent(s).
        found: String,
    },

    /// Pooling/correction sets overlap or name a non-structural axis.
    #[error("invalid axis request: {0}")]
    InvalidAxisRequest(String),

    /// Alpha outside (0, 1), or no achievable critical index.
    #[error("invalid alpha {alpha}: {reason}")]
    InvalidAlpha {
        /// The requested significance level.
        alpha: f64,
        /// Why it cannot be honoured.
        reason: String,
    },

    /// A null array holds NaN or infinite samples.
    #[error("{what} holds {count} non-finite samples")]
    NonFiniteNull {
        /// Which null array failed the check.
        what: String,
        /// Number of offending samples.
        count: usize,
    },

    /// Archive file could not be read or written.
    #[error("archive I/O failed for {path}")]
    ArchiveIo {
        /// Path we attempted to access.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// JSON archive could not be encoded or decoded.
    #[error("JSON archive error")]
    Json(#[from] serde_json::Error),

    /// MessagePack archive could not be encoded.
    #[error("MessagePack encode error")]
    MsgpackEncode(#[from] rmp_serde::encode::Error),

    /// MessagePack archive could not be decoded.
    #[error("MessagePack decode error")]
    MsgpackDecode(#[from] rmp_serde::decode::Error),

    /// Archive decoded but its contents do not form a valid record.
    #[error("malformed archive: {0}")]
    MalformedArchive(String),
}

impl StatsError {
    pub(crate) fn shape(what: impl Into<String>, expected: impl ToString, found: impl ToString) -> Self {
        StatsError::ShapeMismatch {
            what: what.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn alpha(alpha: f64, reason: impl Into<String>) -> Self {
        StatsError::InvalidAlpha {
            alpha,
            reason: reason.into(),
        }
    }
}
