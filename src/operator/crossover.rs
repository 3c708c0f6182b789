use super::Crossover;
use crate::rng::RandomNumberGenerator;

/// Picks each element from either parent with equal probability.
///
/// When the parents differ in length, the child has the length of the first
/// parent and the trailing elements are copied from it.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformCrossover;

impl<T> Crossover<Vec<T>> for UniformCrossover
where
    T: Clone,
{
    fn recombine(
        &self,
        first: &Vec<T>,
        second: &Vec<T>,
        rng: &mut RandomNumberGenerator,
    ) -> Vec<T> {
        let mut child: Vec<T> = first
            .iter()
            .zip(second)
            .map(|(a, b)| if rng.gen_bool(0.5) { a.clone() } else { b.clone() })
            .collect();
        child.extend(first.iter().skip(second.len()).cloned());
        child
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_elements_come_from_parents() {
        let mut rng = RandomNumberGenerator::from_seed(4);
        let first = vec![0; 20];
        let second = vec![1; 20];
        let child = UniformCrossover.recombine(&first, &second, &mut rng);
        assert_eq!(child.len(), 20);
        assert!(child.contains(&0));
        assert!(child.contains(&1));
    }

    #[test]
    fn test_child_has_length_of_first_parent() {
        let mut rng = RandomNumberGenerator::from_seed(4);
        let child = UniformCrossover.recombine(&vec![0, 0, 7, 8], &vec![1, 1], &mut rng);
        assert_eq!(&child[2..], &[7, 8]);
        let child = UniformCrossover.recombine(&vec![0], &vec![1, 1, 1], &mut rng);
        assert_eq!(child.len(), 1);
    }
}
