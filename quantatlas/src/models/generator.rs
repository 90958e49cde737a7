use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Uniform};

use crate::utils::errors::{QuantError, Result};

/// Source of multiplicative factors for a simulated path. One call, one factor.
///
/// Any `FnMut() -> f64` is a generator, so plain closures can be passed to the simulator.
pub trait Generator {
    fn sample(&mut self) -> f64;
}

impl<F> Generator for F
where
    F: FnMut() -> f64,
{
    fn sample(&mut self) -> f64 {
        self()
    }
}

/// # DistributionGenerator
/// Seeded generator drawing factors from any `rand_distr` distribution.
///
/// ## Example
/// ```
/// use quantatlas::prelude::*;
/// let mut a = DistributionGenerator::lognormal(0.0, 0.1, Some(42)).unwrap();
/// let mut b = DistributionGenerator::lognormal(0.0, 0.1, Some(42)).unwrap();
/// assert_eq!(a.sample(), b.sample());
/// ```
#[derive(Clone, Debug)]
pub struct DistributionGenerator<D> {
    rng: StdRng,
    distribution: D,
}

pub type LogNormalGenerator = DistributionGenerator<LogNormal<f64>>;
pub type UniformGenerator = DistributionGenerator<Uniform<f64>>;

impl<D: Distribution<f64>> DistributionGenerator<D> {
    /// Without a seed the stream is seeded from system entropy.
    pub fn new(distribution: D, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, distribution }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn distribution(&self) -> &D {
        &self.distribution
    }
}

impl<D: Distribution<f64>> Generator for DistributionGenerator<D> {
    fn sample(&mut self) -> f64 {
        self.distribution.sample(&mut self.rng)
    }
}

impl LogNormalGenerator {
    pub fn lognormal(mu: f64, sigma: f64, seed: Option<u64>) -> Result<Self> {
        let distribution = LogNormal::new(mu, sigma).map_err(|e| {
            QuantError::InvalidArgument(format!(
                "Lognormal(mu = {}, sigma = {}): {}",
                mu, sigma, e
            ))
        })?;
        Ok(Self::new(distribution, seed))
    }

    /// One-step growth factor of a geometric Brownian motion,
    /// `exp((drift - vol^2 / 2) * dt + vol * sqrt(dt) * Z)`.
    pub fn geometric_brownian(
        drift: f64,
        volatility: f64,
        dt: f64,
        seed: Option<u64>,
    ) -> Result<Self> {
        Ok(Self::new(gbm_distribution(drift, volatility, dt)?, seed))
    }
}

impl UniformGenerator {
    /// Factors drawn uniformly from `[low, high)`.
    pub fn uniform(low: f64, high: f64, seed: Option<u64>) -> Result<Self> {
        if !(low.is_finite() && high.is_finite() && low < high && (high - low).is_finite()) {
            return Err(QuantError::InvalidArgument(format!(
                "Uniform range requires finite low < high, got [{}, {})",
                low, high
            )));
        }
        Ok(Self::new(Uniform::new(low, high), seed))
    }
}

/// Lognormal law of the GBM growth factor over a step of length `dt`.
pub fn gbm_distribution(drift: f64, volatility: f64, dt: f64) -> Result<LogNormal<f64>> {
    if !(dt.is_finite() && dt >= 0.0) {
        return Err(QuantError::InvalidArgument(format!(
            "Time step must be finite and non-negative, got {}",
            dt
        )));
    }
    if !(volatility.is_finite() && volatility >= 0.0) {
        return Err(QuantError::InvalidArgument(format!(
            "Volatility must be finite and non-negative, got {}",
            volatility
        )));
    }
    let mu = (drift - 0.5 * volatility * volatility) * dt;
    let sigma = volatility * dt.sqrt();
    LogNormal::new(mu, sigma).map_err(|e| {
        QuantError::InvalidArgument(format!("GBM(drift = {}, vol = {}): {}", drift, volatility, e))
    })
}
