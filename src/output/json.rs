//! JSON serialization for thresholds.

use crate::result::Threshold;

/// Serialize a Threshold to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for Threshold).
pub fn to_json(threshold: &Threshold) -> Result<String, serde_json::Error> {
    serde_json::to_string(threshold)
}

/// Serialize a Threshold to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for Threshold).
pub fn to_json_pretty(threshold: &Threshold) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(threshold)
}
