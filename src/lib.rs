//! # evosolve
//!
//! Population-based iterative solvers over pluggable optimization problems:
//! random search, a standard evolutionary algorithm, a simple evolutionary
//! strategy and NSGA-II, all sharing one genotype to solution to quality
//! pipeline and one partial-order ranking machinery.

pub mod caching;
pub mod error;
pub mod executor;
pub mod factory;
pub mod operator;
pub mod order;
pub mod problem;
pub mod rng;
pub mod selection;
pub mod solver;

// Re-export commonly used types for convenience
pub use error::{OptionExt, Result, ResultExt, SolverError};
pub use order::{Objective, PartialOrdering, PartiallyOrderedCollection};
pub use solver::{IterativeSolver, Listener};
