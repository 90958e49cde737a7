use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    math::{
        confidence::{calculate_confidence_interval, ConfidenceInterval},
        statistics::{calculate_average, calculate_median, calculate_standard_deviation},
    },
    utils::errors::{QuantError, Result},
};

/// Simulated trajectory. Index 0 holds the initial value.
pub type Path = Vec<f64>;

/// # Ensemble
/// All paths produced by one simulation run, in generation order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Ensemble {
    paths: Vec<Path>,
}

/// Distribution of the terminal values of an ensemble.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SimulationSummary {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub interval: ConfidenceInterval,
}

impl Ensemble {
    pub fn new(paths: Vec<Path>) -> Ensemble {
        Ensemble { paths }
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<Path> {
        self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of simulated periods, `None` for an empty ensemble.
    pub fn num_periods(&self) -> Option<usize> {
        self.paths.first().map(|path| path.len().saturating_sub(1))
    }

    /// Last value of every path.
    pub fn terminal_values(&self) -> Vec<f64> {
        self.paths
            .iter()
            .filter_map(|path| path.last().copied())
            .collect()
    }

    /// Cross-section of the ensemble at `period` (0 is the initial value).
    pub fn values_at(&self, period: usize) -> Result<Vec<f64>> {
        self.paths
            .iter()
            .map(|path| {
                path.get(period).copied().ok_or(QuantError::IndexOutOfRange {
                    index: period,
                    len: path.len(),
                })
            })
            .collect()
    }

    /// # summarize
    /// Mean, median, standard deviation and nearest-rank confidence interval of the
    /// terminal values.
    ///
    /// ## Example
    /// ```
    /// use quantatlas::prelude::*;
    /// let ensemble = Ensemble::new(vec![vec![100.0, 90.0], vec![100.0, 110.0]]);
    /// let summary = ensemble.summarize(0.5).unwrap();
    /// assert_eq!(summary.mean, 100.0);
    /// assert_eq!(summary.std_dev, 10.0);
    /// ```
    pub fn summarize(&self, confidence: f64) -> Result<SimulationSummary> {
        let terminal = self.terminal_values();
        let non_finite = terminal.iter().filter(|v| !v.is_finite()).count();
        if non_finite > 0 {
            warn!(non_finite, total = terminal.len(), "ensemble has non-finite terminal values");
        }
        Ok(SimulationSummary {
            mean: calculate_average(&terminal)?,
            median: calculate_median(&terminal)?,
            std_dev: calculate_standard_deviation(&terminal)?,
            interval: calculate_confidence_interval(&terminal, confidence)?,
        })
    }
}

impl From<Vec<Path>> for Ensemble {
    fn from(paths: Vec<Path>) -> Self {
        Ensemble::new(paths)
    }
}
