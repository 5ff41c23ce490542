use crate::error::{InvalidKSnafu, InvalidParametersSnafu, Result};
use crate::rng::DEFAULT_SEED;
use snafu::prelude::*;

pub const DEFAULT_MAX_ITERATIONS: usize = 200;
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// Iteration caps must stay strictly below this.
pub const MAX_ITERATIONS_LIMIT: usize = 1000;

/// Knobs of one [`fit`](crate::kmeans::fit) run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansConfig {
    /// Number of clusters.
    pub k: usize,
    pub max_iterations: usize,
    /// Stop once no centroid moves this far in a round.
    pub epsilon: f64,
    /// Seed of the k-means++ generator.
    pub seed: u64,
}

impl KMeansConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            epsilon: DEFAULT_EPSILON,
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks the configuration against a dataset of `n` points.
    pub fn validate(&self, n: usize) -> Result<()> {
        ensure!(
            (1..=n).contains(&self.k),
            InvalidKSnafu { k: self.k, n }
        );
        ensure!(
            (1..MAX_ITERATIONS_LIMIT).contains(&self.max_iterations),
            InvalidParametersSnafu {
                reason: "maximum iterations must be between 1 and 999",
            }
        );
        ensure!(
            self.epsilon.is_finite() && self.epsilon > 0.0,
            InvalidParametersSnafu {
                reason: "epsilon must be a positive number",
            }
        );
        Ok(())
    }
}
