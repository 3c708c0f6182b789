//! # Executors
//!
//! An [`Executor`] runs a batch of independent evaluation tasks and waits for all
//! of them: it is the synchronization barrier at the end of every solver step.
//! Results come back in task order regardless of the order in which tasks
//! complete, and any failing task fails the whole batch.
//!
//! The crate never creates threads on its own: [`ParallelExecutor`] borrows a
//! `rayon::ThreadPool` owned by the caller.
//!
//! ## Example
//!
//! ```rust
//! use evosolve::executor::{Executor, ParallelExecutor, SequentialExecutor};
//!
//! let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
//! let parallel = ParallelExecutor::new(&pool);
//!
//! let squares = parallel.execute((0..100).collect(), |x: u64| Ok(x * x)).unwrap();
//! let expected = SequentialExecutor.execute((0..100).collect(), |x: u64| Ok(x * x)).unwrap();
//!
//! assert_eq!(squares, expected);
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::trace;

use crate::error::{Result, SolverError};

/// Runs batches of independent tasks.
pub trait Executor: Sync {
    /// Applies `f` to every task and returns the results in task order.
    ///
    /// # Errors
    ///
    /// Returns an error if any task fails. A task that panics fails with
    /// `SolverError::Evaluation`.
    fn execute<T, R, F>(&self, tasks: Vec<T>, f: F) -> Result<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R> + Send + Sync;
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn run_task<T, R, F>(f: &F, task: T) -> Result<R>
where
    F: Fn(T) -> Result<R>,
{
    panic::catch_unwind(AssertUnwindSafe(|| f(task))).unwrap_or_else(|payload| {
        Err(SolverError::Evaluation(format!(
            "Evaluation task panicked: {}",
            panic_message(payload)
        )))
    })
}

/// Runs every task on the calling thread, in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn execute<T, R, F>(&self, tasks: Vec<T>, f: F) -> Result<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R> + Send + Sync,
    {
        tasks.into_iter().map(|task| run_task(&f, task)).collect()
    }
}

/// Runs tasks on a caller-supplied rayon thread pool.
///
/// Batches smaller than the parallel threshold run inline on the calling
/// thread, where scheduling them would cost more than evaluating them.
#[derive(Debug, Clone, Copy)]
pub struct ParallelExecutor<'a> {
    pool: &'a ThreadPool,
    parallel_threshold: usize,
}

impl<'a> ParallelExecutor<'a> {
    /// Creates an executor that always dispatches to `pool`.
    pub fn new(pool: &'a ThreadPool) -> Self {
        Self::with_threshold(pool, 0)
    }

    /// Creates an executor that dispatches to `pool` only batches of at least
    /// `parallel_threshold` tasks.
    pub fn with_threshold(pool: &'a ThreadPool, parallel_threshold: usize) -> Self {
        Self {
            pool,
            parallel_threshold,
        }
    }

    pub fn get_parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    pub fn get_num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl Executor for ParallelExecutor<'_> {
    fn execute<T, R, F>(&self, tasks: Vec<T>, f: F) -> Result<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R> + Send + Sync,
    {
        if tasks.len() < self.parallel_threshold {
            return SequentialExecutor.execute(tasks, f);
        }
        trace!(
            n_of_tasks = tasks.len(),
            n_of_threads = self.pool.current_num_threads(),
            "Dispatching batch to the thread pool"
        );
        self.pool.install(|| {
            tasks
                .into_par_iter()
                .map(|task| run_task(&f, task))
                .collect::<Result<Vec<R>>>()
        })
    }
}
