use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::utils::errors::{QuantError, Result};

/// Rank products within this many ULPs of an integer are snapped to it before flooring,
/// so that `1 - 0.8` behaves as `0.2`.
const RANK_TOLERANCE_ULPS: f64 = 4.0;

/// # ConfidenceInterval
/// Empirical bounds containing the central `confidence` fraction of a sample.
///
/// ## Example
/// ```
/// use quantatlas::prelude::*;
/// let interval = ConfidenceInterval::new(2.0, 10.0);
/// assert_eq!(interval.width(), 8.0);
/// assert!(interval.contains(5.0));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    lower: f64,
    upper: f64,
}

impl ConfidenceInterval {
    pub fn new(lower: f64, upper: f64) -> ConfidenceInterval {
        ConfidenceInterval { lower, upper }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

fn rank_index(fraction: f64, n: usize) -> usize {
    let position = fraction * n as f64;
    let nearest = position.round();
    if (position - nearest).abs() <= position.abs() * RANK_TOLERANCE_ULPS * f64::EPSILON {
        nearest as usize
    } else {
        position.floor() as usize
    }
}

/// # calculate_confidence_interval
/// Nearest-rank confidence interval of a sample.
///
/// The sample is copied and sorted ascending (NaN values sort last), then
/// `lower = sorted[floor(alpha/2 * n)]` and `upper = sorted[floor((1 - alpha/2) * n)]`
/// with `alpha = 1 - confidence`. No interpolation between order statistics is done.
///
/// ## Errors
/// - `InvalidArgument` if `data` is empty or `confidence` is NaN, `<= 0` or `> 1`.
/// - `IndexOutOfRange` if the upper rank lands on `n`, which always happens for
///   `confidence == 1.0`. The index is never clamped.
///
/// ## Example
/// ```
/// use quantatlas::prelude::*;
/// let data: Vec<f64> = (1..=10).map(f64::from).collect();
/// let interval = calculate_confidence_interval(&data, 0.8).unwrap();
/// assert_eq!(interval.lower(), 2.0);
/// assert_eq!(interval.upper(), 10.0);
/// ```
pub fn calculate_confidence_interval(data: &[f64], confidence: f64) -> Result<ConfidenceInterval> {
    if data.is_empty() {
        return Err(QuantError::InvalidArgument(
            "Confidence interval requires a non-empty sample".to_string(),
        ));
    }
    if !(confidence > 0.0 && confidence <= 1.0) {
        return Err(QuantError::InvalidArgument(format!(
            "Confidence must be in (0, 1], got {}",
            confidence
        )));
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let alpha = 1.0 - confidence;
    let lower_index = rank_index(alpha / 2.0, n);
    let upper_index = rank_index(1.0 - alpha / 2.0, n);
    debug!(n, confidence, lower_index, upper_index, "nearest-rank interval");

    let lower = *sorted.get(lower_index).ok_or(QuantError::IndexOutOfRange {
        index: lower_index,
        len: n,
    })?;
    let upper = *sorted.get(upper_index).ok_or(QuantError::IndexOutOfRange {
        index: upper_index,
        len: n,
    })?;

    Ok(ConfidenceInterval::new(lower, upper))
}
