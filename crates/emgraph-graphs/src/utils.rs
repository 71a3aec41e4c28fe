//! Graph utility functions and helpers.

use std::ops::Range;

/// Upper bound on x-axis labels drawn before they start to overlap.
pub const MAX_X_LABELS: usize = 60;

/// Utility functions for graph generation.
pub struct GraphUtils;

impl GraphUtils {
    /// Y range for bars starting at zero, with 10% headroom above the
    /// tallest bar. Falls back to `0..1` when every value is zero.
    pub fn value_range(values: &[f64]) -> Range<f64> {
        let max = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        let min = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::min);

        if max - min <= f64::EPSILON {
            return 0.0..1.0;
        }
        (min * 1.1)..(max * 1.1)
    }

    /// Number of x labels to request for `bars` bars.
    pub fn label_count(bars: usize) -> usize {
        bars.clamp(1, MAX_X_LABELS)
    }
}
