use rayon::{
    iter::{IntoParallelIterator, ParallelIterator},
    ThreadPoolBuilder,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    models::{
        ensemble::{Ensemble, Path, SimulationSummary},
        generator::{gbm_distribution, DistributionGenerator, Generator},
    },
    utils::errors::{QuantError, Result},
};

fn check_dimensions(num_simulations: usize, num_periods: usize) -> Result<()> {
    num_simulations
        .checked_mul(num_periods)
        .and_then(|samples| samples.checked_add(num_simulations))
        .map(|_| ())
        .ok_or_else(|| {
            QuantError::InvalidArgument(format!(
                "Ensemble of {} simulations x {} periods is too large",
                num_simulations, num_periods
            ))
        })
}

fn simulate_path<G: Generator + ?Sized>(
    initial_value: f64,
    num_periods: usize,
    generator: &mut G,
) -> Path {
    let mut value = initial_value;
    let mut path = Vec::with_capacity(num_periods + 1);
    path.push(value);
    for _ in 0..num_periods {
        value *= generator.sample();
        path.push(value);
    }
    path
}

/// # run_monte_carlo_simulation
/// Builds `num_simulations` multiplicative random walks of `num_periods` steps, each starting
/// at `initial_value`.
///
/// The generator is called exactly `num_simulations * num_periods` times, one simulation after
/// the other, so a seeded generator gives a reproducible ensemble. Its output is used as is:
/// negative, zero, infinite or NaN factors end up in the paths.
///
/// ## Example
/// ```
/// use quantatlas::prelude::*;
/// let ensemble = run_monte_carlo_simulation(100.0, 2, 3, &mut || 1.0).unwrap();
/// assert_eq!(ensemble.paths(), &[vec![100.0; 4], vec![100.0; 4]]);
/// ```
pub fn run_monte_carlo_simulation<G: Generator + ?Sized>(
    initial_value: f64,
    num_simulations: usize,
    num_periods: usize,
    generator: &mut G,
) -> Result<Ensemble> {
    check_dimensions(num_simulations, num_periods)?;
    debug!(num_simulations, num_periods, "running monte carlo simulation");

    let paths = (0..num_simulations)
        .map(|_| simulate_path(initial_value, num_periods, &mut *generator))
        .collect();
    Ok(Ensemble::new(paths))
}

/// # run_monte_carlo_simulation_parallel
/// Same walk as [`run_monte_carlo_simulation`] with simulations spread over the current rayon
/// pool. `factory(i)` must return a fresh generator for simulation `i`; generators are never
/// shared between simulations. Paths come back in simulation order.
pub fn run_monte_carlo_simulation_parallel<G, F>(
    initial_value: f64,
    num_simulations: usize,
    num_periods: usize,
    factory: F,
) -> Result<Ensemble>
where
    G: Generator,
    F: Fn(usize) -> G + Sync + Send,
{
    check_dimensions(num_simulations, num_periods)?;
    debug!(
        num_simulations,
        num_periods,
        threads = rayon::current_num_threads(),
        "running parallel monte carlo simulation"
    );

    let paths = (0..num_simulations)
        .into_par_iter()
        .map(|i| {
            let mut generator = factory(i);
            simulate_path(initial_value, num_periods, &mut generator)
        })
        .collect();
    Ok(Ensemble::new(paths))
}

/// # SimulationConfig
/// Parameters of a [`MonteCarloEngine`]. Missing JSON fields take their default values.
///
/// ## Example
/// ```
/// use quantatlas::prelude::*;
/// let config = SimulationConfig::from_json(r#"{"num_simulations": 10, "seed": 1}"#).unwrap();
/// assert_eq!(config.num_simulations, 10);
/// assert_eq!(config.seed, Some(1));
/// assert_eq!(config.confidence, 0.95);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_value: f64,
    pub num_simulations: usize,
    pub num_periods: usize,
    pub confidence: f64,
    pub seed: Option<u64>,
    pub num_threads: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            initial_value: 100.0,
            num_simulations: 1000,
            num_periods: 252,
            confidence: 0.95,
            seed: None,
            num_threads: None,
        }
    }
}

impl SimulationConfig {
    pub fn new(initial_value: f64, num_simulations: usize, num_periods: usize) -> Self {
        SimulationConfig {
            initial_value,
            num_simulations,
            num_periods,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.initial_value.is_finite() {
            return Err(QuantError::InvalidArgument(format!(
                "Initial value must be finite, got {}",
                self.initial_value
            )));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(QuantError::InvalidArgument(format!(
                "Confidence must be in (0, 1), got {}",
                self.confidence
            )));
        }
        if self.num_threads == Some(0) {
            return Err(QuantError::InvalidArgument(
                "Number of threads must be positive".to_string(),
            ));
        }
        check_dimensions(self.num_simulations, self.num_periods)
    }
}

/// # MonteCarloEngine
/// Runs simulations described by a [`SimulationConfig`].
///
/// ## Example
/// ```
/// use quantatlas::prelude::*;
/// let config = SimulationConfig::new(100.0, 500, 12).with_seed(42).with_num_threads(2);
/// let engine = MonteCarloEngine::new(config).unwrap();
/// let ensemble = engine.run_geometric_brownian(0.05, 0.2, 1.0 / 12.0).unwrap();
/// let summary = engine.summarize(&ensemble).unwrap();
/// assert!(summary.interval.lower() <= summary.interval.upper());
/// ```
#[derive(Debug, Clone)]
pub struct MonteCarloEngine {
    config: SimulationConfig,
}

impl MonteCarloEngine {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run<G: Generator + ?Sized>(&self, generator: &mut G) -> Result<Ensemble> {
        run_monte_carlo_simulation(
            self.config.initial_value,
            self.config.num_simulations,
            self.config.num_periods,
            generator,
        )
    }

    /// Parallel run on a dedicated pool of `num_threads` workers (rayon's default when unset).
    pub fn run_parallel<G, F>(&self, factory: F) -> Result<Ensemble>
    where
        G: Generator,
        F: Fn(usize) -> G + Sync + Send,
    {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("montecarlo-thread-{}", i));
        if let Some(num_threads) = self.config.num_threads {
            builder = builder.num_threads(num_threads);
        }
        let pool = builder.build()?;

        pool.install(|| {
            run_monte_carlo_simulation_parallel(
                self.config.initial_value,
                self.config.num_simulations,
                self.config.num_periods,
                factory,
            )
        })
    }

    /// Geometric Brownian motion paths. Simulation `i` draws from its own stream seeded with
    /// `seed + i`, so a seeded run is identical whatever the number of threads.
    pub fn run_geometric_brownian(&self, drift: f64, volatility: f64, dt: f64) -> Result<Ensemble> {
        let distribution = gbm_distribution(drift, volatility, dt)?;
        let seed = self.config.seed;
        self.run_parallel(move |i| {
            DistributionGenerator::new(distribution, seed.map(|s| s.wrapping_add(i as u64)))
        })
    }

    pub fn summarize(&self, ensemble: &Ensemble) -> Result<SimulationSummary> {
        ensemble.summarize(self.config.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_generator() {
        let ensemble = run_monte_carlo_simulation(100.0, 2, 3, &mut || 1.0).unwrap();
        assert_eq!(ensemble.len(), 2);
        for path in ensemble.paths() {
            assert_eq!(path, &vec![100.0, 100.0, 100.0, 100.0]);
        }
    }

    #[test]
    fn test_path_shape() {
        let mut generator = DistributionGenerator::uniform(0.9, 1.1, Some(1)).unwrap();
        for (sims, periods) in [(1, 0), (3, 1), (5, 10), (7, 50)] {
            let ensemble = run_monte_carlo_simulation(42.0, sims, periods, &mut generator).unwrap();
            assert_eq!(ensemble.len(), sims);
            for path in ensemble.paths() {
                assert_eq!(path.len(), periods + 1);
                assert_eq!(path[0], 42.0);
            }
        }
    }

    #[test]
    fn test_generator_call_count_and_order() {
        let mut calls = 0;
        let factors = [1.1, 0.9];
        let mut generator = || {
            let factor = factors[calls % 2];
            calls += 1;
            factor
        };
        let ensemble = run_monte_carlo_simulation(100.0, 3, 4, &mut generator).unwrap();
        assert_eq!(calls, 12);

        // 4 steps alternate 1.1/0.9 starting from 1.1 in every path because 4 is even
        let first = &ensemble.paths()[0];
        assert!((first[1] - 110.0).abs() < 1e-9);
        assert!((first[2] - 99.0).abs() < 1e-9);
        assert_eq!(ensemble.paths()[0], ensemble.paths()[1]);
    }

    #[test]
    fn test_deterministic_generator_is_reproducible() {
        let run = || {
            let mut generator = DistributionGenerator::lognormal(0.0, 0.05, Some(99)).unwrap();
            run_monte_carlo_simulation(10.0, 4, 6, &mut generator).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_zero_boundaries() {
        let mut calls = 0;
        let mut generator = || {
            calls += 1;
            2.0
        };
        let ensemble = run_monte_carlo_simulation(5.0, 3, 0, &mut generator).unwrap();
        assert_eq!(ensemble.paths(), &[vec![5.0], vec![5.0], vec![5.0]]);

        let ensemble = run_monte_carlo_simulation(5.0, 0, 10, &mut generator).unwrap();
        assert!(ensemble.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_factors_propagate_unchecked() {
        let ensemble = run_monte_carlo_simulation(1.0, 1, 2, &mut || -2.0).unwrap();
        assert_eq!(ensemble.paths()[0], vec![1.0, -2.0, 4.0]);

        let ensemble = run_monte_carlo_simulation(1.0, 1, 2, &mut || f64::NAN).unwrap();
        assert_eq!(ensemble.paths()[0][0], 1.0);
        assert!(ensemble.paths()[0][1..].iter().all(|v| v.is_nan()));

        let ensemble = run_monte_carlo_simulation(1.0, 1, 1, &mut || f64::INFINITY).unwrap();
        assert_eq!(ensemble.paths()[0], vec![1.0, f64::INFINITY]);
    }

    #[test]
    fn test_oversized_ensemble_fails_before_sampling() {
        let mut calls = 0;
        let mut generator = || {
            calls += 1;
            1.0
        };
        let result = run_monte_carlo_simulation(1.0, usize::MAX, usize::MAX, &mut generator);
        assert!(matches!(result, Err(QuantError::InvalidArgument(_))));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_zero_simulations_with_huge_horizon() {
        let ensemble = run_monte_carlo_simulation(1.0, 0, usize::MAX, &mut || 1.0).unwrap();
        assert!(ensemble.is_empty());
        let ensemble = run_monte_carlo_simulation_parallel(1.0, 0, usize::MAX, |_| || 1.0).unwrap();
        assert!(ensemble.is_empty());
    }

    #[test]
    fn test_parallel_matches_per_simulation_generators() {
        let factory = |i: usize| DistributionGenerator::lognormal(0.0, 0.1, Some(i as u64)).unwrap();
        let parallel = run_monte_carlo_simulation_parallel(50.0, 16, 8, factory).unwrap();
        assert_eq!(parallel.len(), 16);
        for (i, path) in parallel.paths().iter().enumerate() {
            let mut generator = factory(i);
            let expected = run_monte_carlo_simulation(50.0, 1, 8, &mut generator).unwrap();
            assert_eq!(path, &expected.paths()[0]);
        }
    }

    #[test]
    fn test_config_defaults_and_json() {
        let config = SimulationConfig::default();
        assert_eq!(config.num_periods, 252);
        assert_eq!(config.seed, None);

        let config = SimulationConfig::from_json(
            r#"{"initial_value": 1.5, "num_simulations": 3, "num_periods": 4, "num_threads": 2}"#,
        )
        .unwrap();
        assert_eq!(config, SimulationConfig::new(1.5, 3, 4).with_num_threads(2));
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            SimulationConfig::from_json("{\"num_simulations\": -1}"),
            Err(QuantError::Config(_))
        ));
        let bad = [
            SimulationConfig::new(f64::NAN, 1, 1),
            SimulationConfig::new(1.0, 1, 1).with_confidence(1.0),
            SimulationConfig::new(1.0, 1, 1).with_confidence(0.0),
            SimulationConfig::new(1.0, 1, 1).with_num_threads(0),
            SimulationConfig::new(1.0, usize::MAX, 1),
        ];
        for config in bad {
            assert!(matches!(
                MonteCarloEngine::new(config),
                Err(QuantError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_engine_sequential_run() {
        let engine = MonteCarloEngine::new(SimulationConfig::new(100.0, 4, 2)).unwrap();
        let ensemble = engine.run(&mut || 1.1).unwrap();
        assert_eq!(ensemble.len(), 4);
        assert!((ensemble.terminal_values()[0] - 121.0).abs() < 1e-9);
    }

    #[test]
    fn test_engine_gbm_independent_of_thread_count() {
        let config = SimulationConfig::new(100.0, 64, 20).with_seed(2024);
        let single = MonteCarloEngine::new(config.clone().with_num_threads(1))
            .unwrap()
            .run_geometric_brownian(0.03, 0.25, 1.0 / 52.0)
            .unwrap();
        let many = MonteCarloEngine::new(config.with_num_threads(4))
            .unwrap()
            .run_geometric_brownian(0.03, 0.25, 1.0 / 52.0)
            .unwrap();
        assert_eq!(single, many);
    }

    #[test]
    fn test_engine_gbm_terminal_mean() {
        let config = SimulationConfig::new(100.0, 2000, 252).with_seed(7);
        let engine = MonteCarloEngine::new(config).unwrap();
        let ensemble = engine.run_geometric_brownian(0.05, 0.2, 1.0 / 252.0).unwrap();
        let summary = engine.summarize(&ensemble).unwrap();

        let expected_mean = 100.0 * 0.05_f64.exp();
        assert!((summary.mean - expected_mean).abs() < 2.5, "mean {}", summary.mean);
        assert!(summary.interval.lower() < expected_mean);
        assert!(summary.interval.upper() > expected_mean);
        assert!(summary.interval.contains(summary.median));
    }

    #[test]
    fn test_engine_gbm_rejects_bad_parameters() {
        let engine = MonteCarloEngine::new(SimulationConfig::new(100.0, 4, 2)).unwrap();
        assert!(engine.run_geometric_brownian(0.05, -0.2, 0.1).is_err());
        assert!(engine.run_geometric_brownian(0.05, 0.2, f64::INFINITY).is_err());
    }
}
