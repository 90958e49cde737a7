use crate::utils::errors::{QuantError, Result};

fn ensure_not_empty(data: &[f64], name: &str) -> Result<()> {
    if data.is_empty() {
        return Err(QuantError::InvalidArgument(format!(
            "{} requires at least one value",
            name
        )));
    }
    Ok(())
}

/// # calculate_average
/// Arithmetic mean of a series.
///
/// ## Example
/// ```
/// use quantatlas::prelude::*;
/// let avg = calculate_average(&[1.0, 2.0, 3.0, 4.0]).unwrap();
/// assert_eq!(avg, 2.5);
/// ```
pub fn calculate_average(data: &[f64]) -> Result<f64> {
    ensure_not_empty(data, "average")?;
    let sum: f64 = data.iter().sum();
    Ok(sum / data.len() as f64)
}

/// # calculate_median
/// Median of a series. For an even number of values the two middle values are averaged.
/// The input is left untouched, a sorted copy is used.
pub fn calculate_median(data: &[f64]) -> Result<f64> {
    ensure_not_empty(data, "median")?;
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[middle - 1] + sorted[middle]) / 2.0)
    } else {
        Ok(sorted[middle])
    }
}

/// Population variance (divides by `n`).
pub fn calculate_variance(data: &[f64]) -> Result<f64> {
    let mean = calculate_average(data)?;
    let squared_differences: Vec<f64> = data.iter().map(|v| (v - mean).powi(2)).collect();
    calculate_average(&squared_differences)
}

/// Population standard deviation.
///
/// ## Example
/// ```
/// use quantatlas::prelude::*;
/// let sd = calculate_standard_deviation(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// assert!((sd - 2.0).abs() < 1e-12);
/// ```
pub fn calculate_standard_deviation(data: &[f64]) -> Result<f64> {
    Ok(calculate_variance(data)?.sqrt())
}

/// # calculate_correlation_coefficient
/// Pearson correlation coefficient between two series of equal length.
///
/// A series with zero variance makes the coefficient undefined and the result is NaN.
pub fn calculate_correlation_coefficient(data_x: &[f64], data_y: &[f64]) -> Result<f64> {
    if data_x.len() != data_y.len() {
        return Err(QuantError::InvalidArgument(format!(
            "Data arrays must have the same length ({} vs {})",
            data_x.len(),
            data_y.len()
        )));
    }
    let mean_x = calculate_average(data_x)?;
    let mean_y = calculate_average(data_y)?;

    let numerator: f64 = data_x
        .iter()
        .zip(data_y)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let denom_x = data_x.iter().map(|x| (x - mean_x).powi(2)).sum::<f64>().sqrt();
    let denom_y = data_y.iter().map(|y| (y - mean_y).powi(2)).sum::<f64>().sqrt();

    Ok(numerator / (denom_x * denom_y))
}
