use std::collections::VecDeque;

use crate::utils::errors::{QuantError, Result};

/// # calculate_rsi
/// Relative Strength Index over a sliding window of gains and losses.
///
/// The gain and loss windows start filled with `window` zeros. For every index `i` from
/// `window` onwards the change `data[i] - data[i - 1]` is pushed into the windows (dropping
/// the oldest entry) and `100 - 100 / (1 + avg_gain / avg_loss)` is emitted. A window with no
/// losses gives 100 and a window with no movement at all gives NaN.
///
/// ## Example
/// ```
/// use quantatlas::prelude::*;
/// let rsi = calculate_rsi(&[1.0, 2.0, 3.0, 2.0, 3.0], 2).unwrap();
/// assert_eq!(rsi.len(), 3);
/// assert_eq!(rsi[0], 100.0);
/// ```
pub fn calculate_rsi(data: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(QuantError::InvalidArgument(
            "RSI window must be positive, got 0".to_string(),
        ));
    }

    let mut gains: VecDeque<f64> = std::iter::repeat(0.0).take(window).collect();
    let mut losses: VecDeque<f64> = std::iter::repeat(0.0).take(window).collect();
    let mut rsi = Vec::with_capacity(data.len().saturating_sub(window));

    for i in window..data.len() {
        let change = data[i] - data[i - 1];
        gains.push_back(change.max(0.0));
        losses.push_back((-change).max(0.0));
        gains.pop_front();
        losses.pop_front();

        let avg_gain = gains.iter().sum::<f64>() / window as f64;
        let avg_loss = losses.iter().sum::<f64>() / window as f64;
        let rs = avg_gain / avg_loss;
        rsi.push(100.0 - 100.0 / (1.0 + rs));
    }

    Ok(rsi)
}
