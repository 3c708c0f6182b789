//! # Selection
//!
//! A [`Selector`] picks one element of a partially ordered population, usually
//! to become a parent. Selection pressure comes from the front decomposition:
//! an element of a lower front is better than any element of a higher one.
//!
//! ## Example
//!
//! ```rust
//! use evosolve::order::{Objective, PartiallyOrderedCollection};
//! use evosolve::rng::RandomNumberGenerator;
//! use evosolve::selection::{Selector, Tournament};
//!
//! let population = PartiallyOrderedCollection::new(vec![5.0, 1.0, 3.0], &Objective::Minimize);
//! let tournament = Tournament::new(3).unwrap();
//! let mut rng = RandomNumberGenerator::from_seed(42);
//!
//! let selected = tournament.select(&population, &mut rng).unwrap();
//! assert!(population.all().any(|value| value == selected));
//! ```

use crate::error::{Result, SolverError};
use crate::order::PartiallyOrderedCollection;
use crate::rng::RandomNumberGenerator;

/// Selects an element of a population.
pub trait Selector<T>: Send + Sync {
    /// Returns the selected element, or `None` when `population` is empty.
    fn select<'a>(
        &self,
        population: &'a PartiallyOrderedCollection<T>,
        rng: &mut RandomNumberGenerator,
    ) -> Option<&'a T>;
}

/// Tournament selection over front ranks.
///
/// Draws `size` elements uniformly with replacement and returns the one in the
/// lowest front; ties go to the element drawn first.
#[derive(Debug, Clone, Copy)]
pub struct Tournament {
    size: usize,
}

impl Tournament {
    /// # Errors
    ///
    /// Returns `SolverError::Configuration` when `size` is zero.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(SolverError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        Ok(Self { size })
    }

    pub fn get_size(&self) -> usize {
        self.size
    }
}

impl<T: Send + Sync> Selector<T> for Tournament {
    fn select<'a>(
        &self,
        population: &'a PartiallyOrderedCollection<T>,
        rng: &mut RandomNumberGenerator,
    ) -> Option<&'a T> {
        if population.is_empty() {
            return None;
        }
        let mut best: Option<(usize, &'a T)> = None;
        for _ in 0..self.size {
            let candidate = population.get(rng.gen_index(population.len()))?;
            match best {
                Some((rank, _)) if rank <= candidate.0 => {}
                _ => best = Some(candidate),
            }
        }
        best.map(|(_, item)| item)
    }
}

/// Uniform random selection, without any selection pressure.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl<T: Send + Sync> Selector<T> for RandomSelector {
    fn select<'a>(
        &self,
        population: &'a PartiallyOrderedCollection<T>,
        rng: &mut RandomNumberGenerator,
    ) -> Option<&'a T> {
        if population.is_empty() {
            return None;
        }
        population
            .get(rng.gen_index(population.len()))
            .map(|(_, item)| item)
    }
}
