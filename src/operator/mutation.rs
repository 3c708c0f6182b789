use rand_distr::{Distribution, Normal};

use super::Mutation;
use crate::error::{Result, ResultExt, SolverError};
use crate::rng::RandomNumberGenerator;

/// Adds an independent `N(0, sigma)` perturbation to every coordinate of a
/// real vector.
#[derive(Debug, Clone, Copy)]
pub struct GaussianMutation {
    normal: Normal<f64>,
}

impl GaussianMutation {
    /// # Errors
    ///
    /// Returns `SolverError::Configuration` when `sigma` is negative or not finite.
    pub fn new(sigma: f64) -> Result<Self> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(SolverError::Configuration(format!(
                "Sigma must be a finite non-negative number, got {}",
                sigma
            )));
        }
        let normal = Normal::new(0.0, sigma).context("Invalid Gaussian mutation")?;
        Ok(Self { normal })
    }

    pub fn get_sigma(&self) -> f64 {
        self.normal.std_dev()
    }
}

impl Mutation<Vec<f64>> for GaussianMutation {
    fn mutate(&self, parent: &Vec<f64>, rng: &mut RandomNumberGenerator) -> Vec<f64> {
        parent
            .iter()
            .map(|value| value + self.normal.sample(rng))
            .collect()
    }
}

/// Flips every bit of a bit string independently with probability `p`.
#[derive(Debug, Clone, Copy)]
pub struct BitFlipMutation {
    p: f64,
}

impl BitFlipMutation {
    /// # Errors
    ///
    /// Returns `SolverError::Configuration` when `p` is not in `[0, 1]`.
    pub fn new(p: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(SolverError::Configuration(format!(
                "Flip probability must be in [0, 1], got {}",
                p
            )));
        }
        Ok(Self { p })
    }
}

impl Mutation<Vec<bool>> for BitFlipMutation {
    fn mutate(&self, parent: &Vec<bool>, rng: &mut RandomNumberGenerator) -> Vec<bool> {
        parent
            .iter()
            .map(|bit| if rng.gen_bool(self.p) { !bit } else { *bit })
            .collect()
    }
}
