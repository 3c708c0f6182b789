/// A genotype together with the solution and quality derived from it.
///
/// `solution` is the image of `genotype` through the solver's solution mapper
/// and `quality` the image of `solution` through the problem's quality
/// function. Individuals are never updated in place: re-evaluating one
/// produces a new `Individual`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Individual<G, S, Q> {
    pub genotype: G,
    pub solution: S,
    pub quality: Q,
    /// The iteration at which `quality` was computed.
    pub quality_mapping_iteration: u64,
    /// The iteration at which `genotype` was built.
    pub genotype_birth_iteration: u64,
}

impl<G, S, Q> Individual<G, S, Q> {
    /// Returns the number of iterations this individual has been alive for at `iteration`.
    pub fn age(&self, iteration: u64) -> u64 {
        iteration.saturating_sub(self.genotype_birth_iteration)
    }
}

/// An individual decorated with its front index and crowding distance.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RankedIndividual<G, S, Q> {
    pub individual: Individual<G, S, Q>,
    /// The index of the front the individual belongs to, 0 being the best.
    pub rank: usize,
    /// The sum over the objectives of the distance between the two neighbours
    /// of the individual within its front; infinite at the front boundaries.
    pub crowding_distance: f64,
}
