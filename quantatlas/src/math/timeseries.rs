use crate::{
    math::statistics::calculate_average,
    utils::errors::{QuantError, Result},
};

fn ensure_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(QuantError::InvalidArgument(
            "Window size must be positive, got 0".to_string(),
        ));
    }
    Ok(())
}

/// # calculate_sma
/// Simple moving average. Emits one value per full window, so the output has
/// `data.len() - window + 1` values, or none when the series is shorter than the window.
///
/// ## Example
/// ```
/// use quantatlas::prelude::*;
/// let sma = calculate_sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
/// assert_eq!(sma, vec![2.0, 3.0, 4.0]);
/// ```
pub fn calculate_sma(data: &[f64], window: usize) -> Result<Vec<f64>> {
    ensure_window(window)?;
    data.windows(window).map(calculate_average).collect()
}

/// # calculate_ema
/// Exponential moving average with multiplier `2 / (window + 1)`, seeded with the
/// simple average of the first `window` values.
pub fn calculate_ema(data: &[f64], window: usize) -> Result<Vec<f64>> {
    ensure_window(window)?;
    if data.len() < window {
        return Err(QuantError::InvalidArgument(format!(
            "EMA seed needs {} values, got {}",
            window,
            data.len()
        )));
    }

    let multiplier = 2.0 / (window as f64 + 1.0);
    let mut prev_ema = calculate_average(&data[..window])?;
    let mut ema = Vec::with_capacity(data.len() - window + 1);
    ema.push(prev_ema);

    for value in &data[window..] {
        prev_ema = (value - prev_ema) * multiplier + prev_ema;
        ema.push(prev_ema);
    }

    Ok(ema)
}
