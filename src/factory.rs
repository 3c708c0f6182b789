//! # Factories
//!
//! A [`Factory`] builds a batch of genotypes; an [`IndependentFactory`] builds them
//! one at a time, without any dependence between the members of a batch. Every
//! independent factory is also a factory, usually by forwarding to
//! [`build_independently`]. Any closure `Fn(&mut RandomNumberGenerator) -> G` is
//! both.
//!
//! ## Example
//!
//! ```rust
//! use evosolve::factory::{Factory, IndependentFactory, UniformDoubleFactory, FixedLengthListFactory};
//! use evosolve::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(1);
//! let factory = FixedLengthListFactory::new(3, UniformDoubleFactory::new(-1.0, 1.0));
//!
//! let genotypes = factory.build(10, &mut rng);
//! assert_eq!(genotypes.len(), 10);
//! assert!(genotypes.iter().all(|g| g.len() == 3));
//! ```

use tracing::{debug, trace};

use crate::rng::RandomNumberGenerator;

/// Builds batches of genotypes.
pub trait Factory<G>: Send + Sync {
    /// Builds `n` genotypes.
    fn build(&self, n: usize, rng: &mut RandomNumberGenerator) -> Vec<G>;
}

/// Builds genotypes one at a time.
pub trait IndependentFactory<G>: Factory<G> {
    /// Builds one genotype.
    fn build_one(&self, rng: &mut RandomNumberGenerator) -> G;
}

/// Builds `n` genotypes by calling `build_one` `n` times.
pub fn build_independently<G, F>(
    factory: &F,
    n: usize,
    rng: &mut RandomNumberGenerator,
) -> Vec<G>
where
    F: IndependentFactory<G> + ?Sized,
{
    (0..n).map(|_| factory.build_one(rng)).collect()
}

impl<G, F> Factory<G> for F
where
    F: Fn(&mut RandomNumberGenerator) -> G + Send + Sync,
{
    fn build(&self, n: usize, rng: &mut RandomNumberGenerator) -> Vec<G> {
        build_independently(self, n, rng)
    }
}

impl<G, F> IndependentFactory<G> for F
where
    F: Fn(&mut RandomNumberGenerator) -> G + Send + Sync,
{
    fn build_one(&self, rng: &mut RandomNumberGenerator) -> G {
        self(rng)
    }
}

/// A factory that tries to avoid duplicates within a batch.
///
/// Each genotype is resampled up to `max_attempts` times while it equals one
/// already in the batch; when the budget is exhausted the duplicate is
/// accepted, so building never loops unboundedly.
#[derive(Debug, Clone)]
pub struct UniqueFactory<F> {
    inner: F,
    max_attempts: usize,
}

impl<F> UniqueFactory<F> {
    pub fn new(inner: F, max_attempts: usize) -> Self {
        Self {
            inner,
            max_attempts,
        }
    }

    pub fn get_max_attempts(&self) -> usize {
        self.max_attempts
    }
}

impl<G, F> Factory<G> for UniqueFactory<F>
where
    G: PartialEq,
    F: IndependentFactory<G>,
{
    fn build(&self, n: usize, rng: &mut RandomNumberGenerator) -> Vec<G> {
        let mut genotypes: Vec<G> = Vec::with_capacity(n);
        let mut n_of_duplicates = 0;
        while genotypes.len() < n {
            let mut genotype = self.inner.build_one(rng);
            let mut attempts = 0;
            while attempts < self.max_attempts && genotypes.contains(&genotype) {
                genotype = self.inner.build_one(rng);
                attempts += 1;
            }
            if genotypes.contains(&genotype) {
                trace!(attempts, "Accepting a duplicate genotype");
                n_of_duplicates += 1;
            }
            genotypes.push(genotype);
        }
        if n_of_duplicates > 0 {
            debug!(n_of_duplicates, n, "Batch built with duplicate genotypes");
        }
        genotypes
    }
}

/// Builds random bit strings of a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct BitStringFactory {
    size: usize,
}

impl BitStringFactory {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl Factory<Vec<bool>> for BitStringFactory {
    fn build(&self, n: usize, rng: &mut RandomNumberGenerator) -> Vec<Vec<bool>> {
        build_independently(self, n, rng)
    }
}

impl IndependentFactory<Vec<bool>> for BitStringFactory {
    fn build_one(&self, rng: &mut RandomNumberGenerator) -> Vec<bool> {
        (0..self.size).map(|_| rng.gen_bool(0.5)).collect()
    }
}

/// Builds numbers uniformly distributed in `[min, max)`.
#[derive(Debug, Clone, Copy)]
pub struct UniformDoubleFactory {
    min: f64,
    max: f64,
}

impl UniformDoubleFactory {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Factory<f64> for UniformDoubleFactory {
    fn build(&self, n: usize, rng: &mut RandomNumberGenerator) -> Vec<f64> {
        build_independently(self, n, rng)
    }
}

impl IndependentFactory<f64> for UniformDoubleFactory {
    fn build_one(&self, rng: &mut RandomNumberGenerator) -> f64 {
        self.min + rng.gen_f64() * (self.max - self.min)
    }
}

/// Builds lists of a fixed length whose elements come from another factory.
#[derive(Debug, Clone)]
pub struct FixedLengthListFactory<F> {
    length: usize,
    element: F,
}

impl<F> FixedLengthListFactory<F> {
    pub fn new(length: usize, element: F) -> Self {
        Self { length, element }
    }
}

impl<T, F> Factory<Vec<T>> for FixedLengthListFactory<F>
where
    F: IndependentFactory<T>,
{
    fn build(&self, n: usize, rng: &mut RandomNumberGenerator) -> Vec<Vec<T>> {
        build_independently(self, n, rng)
    }
}

impl<T, F> IndependentFactory<Vec<T>> for FixedLengthListFactory<F>
where
    F: IndependentFactory<T>,
{
    fn build_one(&self, rng: &mut RandomNumberGenerator) -> Vec<T> {
        (0..self.length).map(|_| self.element.build_one(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_double_factory_range() {
        let mut rng = RandomNumberGenerator::from_seed(3);
        let factory = UniformDoubleFactory::new(2.0, 5.0);
        for value in factory.build(1000, &mut rng) {
            assert!((2.0..5.0).contains(&value), "value {} out of range", value);
        }
    }

    #[test]
    fn test_bit_string_factory() {
        let mut rng = RandomNumberGenerator::from_seed(3);
        let genotypes = BitStringFactory::new(16).build(5, &mut rng);
        assert_eq!(genotypes.len(), 5);
        assert!(genotypes.iter().all(|g| g.len() == 16));
    }

    #[test]
    fn test_closure_factory() {
        let mut rng = RandomNumberGenerator::from_seed(3);
        let factory = |rng: &mut RandomNumberGenerator| rng.gen_index(10);
        let values = factory.build(20, &mut rng);
        assert!(values.iter().all(|v| *v < 10));
    }

    #[test]
    fn test_unique_factory_avoids_duplicates() {
        let mut rng = RandomNumberGenerator::from_seed(11);
        let factory = UniqueFactory::new(|rng: &mut RandomNumberGenerator| rng.gen_index(10), 1000);
        let mut values = factory.build(10, &mut rng);
        values.sort_unstable();
        assert_eq!(values, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_unique_factory_accepts_duplicates_when_exhausted() {
        let mut rng = RandomNumberGenerator::from_seed(11);
        let factory = UniqueFactory::new(|_: &mut RandomNumberGenerator| 7u8, 5);
        assert_eq!(factory.build(3, &mut rng), vec![7, 7, 7]);
    }

    fn batch<G, F: Factory<G>>(factory: &F, n: usize, seed: u64) -> Vec<G> {
        factory.build(n, &mut RandomNumberGenerator::from_seed(seed))
    }

    #[test]
    fn test_unique_factory_over_stock_factories() {
        let bits = UniqueFactory::new(BitStringFactory::new(3), 1000);
        let mut genotypes = batch(&bits, 8, 2);
        genotypes.sort();
        genotypes.dedup();
        assert_eq!(genotypes.len(), 8);

        let digit = |rng: &mut RandomNumberGenerator| rng.gen_index(3);
        let lists = UniqueFactory::new(FixedLengthListFactory::new(2, digit), 1000);
        let mut genotypes = batch(&lists, 9, 2);
        genotypes.sort();
        genotypes.dedup();
        assert_eq!(genotypes.len(), 9);
        assert_eq!(bits.get_max_attempts(), 1000);
    }

    #[test]
    fn test_build_independently() {
        let factory = UniformDoubleFactory::new(0.0, 1.0);
        let mut rng = RandomNumberGenerator::from_seed(4);
        let direct = build_independently(&factory, 5, &mut rng);
        assert_eq!(direct, batch(&factory, 5, 4));
    }

    #[test]
    fn test_same_seed_same_batch() {
        let factory = FixedLengthListFactory::new(4, UniformDoubleFactory::new(0.0, 1.0));
        let a = factory.build(3, &mut RandomNumberGenerator::from_seed(5));
        let b = factory.build(3, &mut RandomNumberGenerator::from_seed(5));
        assert_eq!(a, b);
    }
}
