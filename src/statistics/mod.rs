//! Statistical core: null-distribution transforms and tail lookups.
//!
//! - Pooling and family-wise correction of permutation null arrays
//! - Critical values with discrete (achieved) alpha
//! - Corrected p-values by binary search on sorted null samples

mod distribution;
mod quantile;

pub use distribution::{fix_distribution, NullDistribution};
pub use quantile::{
    count_at_or_above, count_at_or_below, critical_value, rejection_count, tail_p_value,
    validate_alpha, CriticalValue,
};
