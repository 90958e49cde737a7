use crate::utils::errors::{QuantError, Result};

/// # calculate_apy
/// Annual percentage yield of a nominal rate compounded `compound_frequency` times a year:
/// `(1 + r / f)^f - 1`.
///
/// ## Example
/// ```
/// use quantatlas::prelude::*;
/// let apy = calculate_apy(0.12, 12).unwrap();
/// assert!((apy - 0.126825030131969).abs() < 1e-12);
/// ```
pub fn calculate_apy(interest_rate: f64, compound_frequency: u32) -> Result<f64> {
    if compound_frequency == 0 {
        return Err(QuantError::InvalidArgument(
            "Compound frequency must be positive, got 0".to_string(),
        ));
    }
    let f = compound_frequency as f64;
    Ok((1.0 + interest_rate / f).powf(f) - 1.0)
}

/// Simple interest on a loan. `interest_rate` is given in percent, `loan_term` in years.
pub fn calculate_loan_interest(principal: f64, interest_rate: f64, loan_term: f64) -> f64 {
    principal * interest_rate / 100.0 * loan_term
}

/// # calculate_liquidity_provider_earnings
/// Share of the collected fees owed to a liquidity provider holding `liquidity_tokens`
/// out of `total_liquidity`.
pub fn calculate_liquidity_provider_earnings(
    liquidity_tokens: f64,
    total_liquidity: f64,
    total_fees: f64,
) -> Result<f64> {
    if total_liquidity == 0.0 {
        return Err(QuantError::InvalidArgument(
            "Total liquidity must be non-zero".to_string(),
        ));
    }
    Ok(liquidity_tokens / total_liquidity * total_fees)
}
