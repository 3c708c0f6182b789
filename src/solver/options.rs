//! # SolverOptions
//!
//! The `SolverOptions` struct holds the parameters shared by every
//! population-based solver.
//!
//! ## Example
//!
//! ```rust
//! use evosolve::solver::SolverOptions;
//!
//! // Create options with the default parameters
//! let default_options = SolverOptions::default();
//! assert_eq!(default_options.get_population_size(), 100);
//!
//! // Create options with custom parameters
//! let options = SolverOptions::builder()
//!     .population_size(50)
//!     .max_uniqueness_attempts(0)
//!     .remap(true)
//!     .build()
//!     .unwrap();
//! assert!(options.get_remap());
//! ```
//!
//! ## Fields
//!
//! - `population_size`: The number of individuals kept at the end of every iteration.
//! - `max_uniqueness_attempts`: How many times, over one iteration, a child
//!   identical to an existing genotype may be discarded and rebuilt. Zero
//!   disables the uniqueness check.
//! - `remap`: Whether surviving individuals are re-evaluated at every
//!   iteration, for noisy quality functions.

use crate::error::{Result, SolverError};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOptions {
    population_size: usize,
    max_uniqueness_attempts: usize,
    remap: bool,
}

impl SolverOptions {
    pub fn new(population_size: usize, max_uniqueness_attempts: usize, remap: bool) -> Self {
        Self {
            population_size,
            max_uniqueness_attempts,
            remap,
        }
    }

    /// Returns a builder starting from the default parameters.
    pub fn builder() -> SolverOptionsBuilder {
        SolverOptionsBuilder::default()
    }

    /// Checks that the parameters describe a runnable solver.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::Configuration` when the population size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(SolverError::Configuration(
                "Population size cannot be zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    pub fn get_max_uniqueness_attempts(&self) -> usize {
        self.max_uniqueness_attempts
    }

    pub fn get_remap(&self) -> bool {
        self.remap
    }

    /// Sets the population size.
    pub fn set_population_size(&mut self, population_size: usize) {
        self.population_size = population_size;
    }

    /// Sets the uniqueness attempt budget.
    pub fn set_max_uniqueness_attempts(&mut self, max_uniqueness_attempts: usize) {
        self.max_uniqueness_attempts = max_uniqueness_attempts;
    }

    /// Sets whether survivors are re-evaluated.
    pub fn set_remap(&mut self, remap: bool) {
        self.remap = remap;
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_uniqueness_attempts: 100,
            remap: false,
        }
    }
}

/// Fluent builder for [`SolverOptions`].
#[derive(Debug, Clone, Default)]
pub struct SolverOptionsBuilder {
    options: SolverOptions,
}

impl SolverOptionsBuilder {
    pub fn population_size(mut self, population_size: usize) -> Self {
        self.options.population_size = population_size;
        self
    }

    pub fn max_uniqueness_attempts(mut self, max_uniqueness_attempts: usize) -> Self {
        self.options.max_uniqueness_attempts = max_uniqueness_attempts;
        self
    }

    pub fn remap(mut self, remap: bool) -> Self {
        self.options.remap = remap;
        self
    }

    /// # Errors
    ///
    /// Returns `SolverError::Configuration` when the options are invalid.
    pub fn build(self) -> Result<SolverOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}
