//! # Error Types
//!
//! This module defines the error type shared by every solver, operator and
//! problem in the crate. Construction problems are reported as
//! [`SolverError::Configuration`] as soon as a solver is built, while failures
//! raised while mapping genotypes to solutions and qualities surface as
//! [`SolverError::Evaluation`] from the `init`/`update` call that triggered them.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use evosolve::error::{Result, SolverError};
//!
//! fn check_population(size: usize) -> Result<()> {
//!     if size == 0 {
//!         return Err(SolverError::Configuration(
//!             "Population size cannot be zero".to_string(),
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_population(0).is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use evosolve::error::{OptionExt, SolverError};
//!
//! fn first_of(values: &[i32]) -> evosolve::error::Result<i32> {
//!     values
//!         .first()
//!         .copied()
//!         .ok_or_else_solver(|| SolverError::EmptyPopulation)
//! }
//!
//! assert!(first_of(&[]).is_err());
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while building or running a solver.
#[derive(Error, Debug)]
pub enum SolverError {
    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// Error that occurs when mapping a genotype to a solution or a solution
    /// to a quality fails.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Error that occurs when a genetic operator is misused or misbehaves.
    #[error("Operator error: {0}")]
    Operator(String),

    /// Error that occurs when NaN values are encountered in a quality.
    #[error("Invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use evosolve::error::ResultExt;
///
/// fn parse(value: &str) -> evosolve::error::Result<u32> {
///     value.parse::<u32>().context("Failed to parse the population size")
/// }
///
/// assert!(parse("ten").is_err());
/// ```
pub trait ResultExt<T, E> {
    /// Converts the error to a [`SolverError::Other`] prefixed by `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| SolverError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, SolverError>` using
    /// a closure to generate the error.
    fn ok_or_else_solver<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> SolverError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_solver<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> SolverError,
    {
        self.ok_or_else(err_fn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SolverError::Configuration("Population size cannot be zero".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: Population size cannot be zero"
        );

        let err = SolverError::Evaluation("boom".to_string());
        assert_eq!(err.to_string(), "Evaluation error: boom");
    }

    #[test]
    fn test_context() {
        let result: std::result::Result<u32, _> = "x".parse::<u32>();
        match result.context("parsing") {
            Err(SolverError::Other(msg)) => assert!(msg.starts_with("parsing: ")),
            _ => panic!("Expected Other error"),
        }
    }

    #[test]
    fn test_ok_or_else_solver() {
        let none: Option<u8> = None;
        assert!(matches!(
            none.ok_or_else_solver(|| SolverError::EmptyPopulation),
            Err(SolverError::EmptyPopulation)
        ));
        assert_eq!(Some(3).ok_or_else_solver(|| SolverError::EmptyPopulation).unwrap(), 3);
    }
}
