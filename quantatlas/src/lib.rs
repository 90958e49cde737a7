//! Numeric utilities for financial and statistical analysis: descriptive statistics,
//! moving averages, RSI, simple yield formulas, and a Monte Carlo path simulator with
//! nearest-rank confidence intervals.
//!
//! ```
//! use quantatlas::prelude::*;
//! let mut generator = DistributionGenerator::geometric_brownian(0.05, 0.2, 1.0 / 12.0, Some(1)).unwrap();
//! let ensemble = run_monte_carlo_simulation(100.0, 200, 12, &mut generator).unwrap();
//! let interval = calculate_confidence_interval(&ensemble.terminal_values(), 0.9).unwrap();
//! assert!(interval.lower() <= interval.upper());
//! ```

pub mod math;
pub mod models;
pub mod prelude;
pub mod utils;
