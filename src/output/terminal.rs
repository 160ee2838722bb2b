//! Terminal output formatting with colors and box drawing.

use colored::Colorize;

use crate::result::Threshold;
use crate::types::Tail;

/// Largest grid printed bin by bin; bigger grids are summarised.
const MAX_GRID_CELLS: usize = 64;

/// Format a Threshold for human-readable terminal output.
pub fn format_threshold(threshold: &Threshold) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str("tfstats threshold\n");
    output.push_str(&sep);
    output.push('\n');
    output.push('\n');

    output.push_str(&format!("  Tail:       {}\n", format_tail(threshold.tail)));
    output.push_str(&format!(
        "  Corrected:  {}\n  Pooled:     {}\n",
        threshold.adjustment.correct, threshold.adjustment.pool
    ));
    output.push_str(&format!(
        "  Null samples per bin: {}\n",
        threshold.sample_count
    ));
    output.push('\n');

    let achieved = threshold.achieved_alpha();
    output.push_str(&format!(
        "    Requested alpha: {:.4}\n    Achieved alpha:  {}\n",
        threshold.requested_alpha,
        format_achieved(achieved, threshold.requested_alpha)
    ));

    if let Some(value) = threshold.critical_value() {
        output.push_str(&format!("    Critical value:  {}\n", format!("{value:.4}").bold()));
    } else {
        let (time_bins, freq_bins) = threshold.critical_values.dim();
        output.push_str(&format!(
            "    Critical values: {time_bins} time \u{00d7} {freq_bins} frequency bins\n"
        ));
        if threshold.critical_values.len() <= MAX_GRID_CELLS {
            for row in threshold.critical_values.rows() {
                let cells: Vec<String> = row.iter().map(|v| format!("{v:>9.3}")).collect();
                output.push_str(&format!("      {}\n", cells.join(" ")));
            }
        } else {
            let (lo, hi) = threshold
                .critical_values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            output.push_str(&format!("      range {lo:.3} .. {hi:.3}\n"));
        }
    }

    output.push('\n');
    output.push_str(&sep);
    output.push('\n');
    output.push_str(
        "Note: achieved alpha is the fraction of null samples at or beyond the critical value.\n",
    );

    output
}

fn format_tail(tail: Tail) -> String {
    match tail {
        Tail::Positive => "positive (max over voxels)".cyan().to_string(),
        Tail::Negative => "negative (min over voxels)".magenta().to_string(),
    }
}

fn format_achieved(achieved: f64, requested: f64) -> String {
    let text = format!("{achieved:.4}");
    if (achieved - requested).abs() < 1e-12 {
        text.green().to_string()
    } else {
        text.yellow().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Adjustment, Axis};
    use ndarray::{array, Array2};

    #[test]
    fn test_format_scalar_threshold() {
        colored::control::set_override(false);
        let threshold = Threshold {
            tail: Tail::Positive,
            adjustment: Adjustment::full_correction(),
            requested_alpha: 0.05,
            sample_count: 2048,
            critical_values: array![[3.25]],
            achieved_alphas: array![[0.0498]],
        };
        let output = format_threshold(&threshold);
        assert!(output.contains("tfstats threshold"));
        assert!(output.contains("Critical value:  3.2500"));
        assert!(output.contains("Achieved alpha:  0.0498"));
        assert!(output.contains("(time, frequency)"));
    }

    #[test]
    fn test_format_large_grid_is_summarised() {
        colored::control::set_override(false);
        let threshold = Threshold {
            tail: Tail::Negative,
            adjustment: Adjustment::none().pool(Axis::Frequency),
            requested_alpha: 0.05,
            sample_count: 64,
            critical_values: Array2::from_shape_fn((100, 1), |(t, _)| 1.0 - t as f64),
            achieved_alphas: Array2::from_elem((100, 1), 0.046875),
        };
        let output = format_threshold(&threshold);
        assert!(output.contains("100 time"));
        assert!(output.contains("range -98.000 .. 1.000"));
    }
}
