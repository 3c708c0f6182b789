//! # Caching Module
//!
//! This module provides caching mechanisms for quality evaluations. Caching is
//! useful when the quality function is expensive and the same solutions show up
//! again and again during a run, e.g. when operators produce children identical
//! to their parents.
//!
//! Only deterministic quality functions should be cached: a cached problem
//! returns the first quality computed for a solution forever, which also means
//! that `remap` becomes a no-op for solutions already in the cache. Errors are
//! never cached.
//!
//! ## Example
//!
//! ```rust
//! use evosolve::caching::{CacheKey, CachingProblem};
//! use evosolve::problem::{QualityBasedProblem, SingleObjectiveProblem};
//!
//! #[derive(Debug, Clone)]
//! struct Point(i64);
//!
//! impl CacheKey for Point {
//!     type Key = i64;
//!
//!     fn cache_key(&self) -> Self::Key {
//!         self.0
//!     }
//! }
//!
//! let problem = SingleObjectiveProblem::minimizing(|p: &Point| (p.0 * p.0) as f64);
//! let cached = problem.with_global_cache();
//!
//! assert_eq!(cached.quality(&Point(3)).unwrap(), 9.0);
//! assert_eq!(cached.quality(&Point(3)).unwrap(), 9.0);
//! assert_eq!(cached.cache_size(), 1);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thread_local::ThreadLocal;

use crate::error::Result;
use crate::order::PartialOrdering;
use crate::problem::QualityBasedProblem;

/// A trait for solutions that can be used as cache keys.
///
/// Solutions that would have the same quality must have the same cache key.
pub trait CacheKey {
    /// The type of the cache key.
    type Key: Eq + Hash + Clone + Debug + Send + Sync;

    /// Generates a cache key for this solution.
    fn cache_key(&self) -> Self::Key;
}

/// The kind of cache to wrap a problem with.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheType {
    /// One mutex-protected cache shared by every thread.
    #[default]
    Global,
    /// One cache per thread, no contention but no sharing either.
    ThreadLocal,
}

/// A wrapper around a problem that caches quality evaluations in a map shared
/// by every thread.
pub struct CachedProblem<S, Q, P>
where
    S: CacheKey,
{
    /// The wrapped problem
    problem: P,
    /// The cache of quality evaluations
    cache: Arc<Mutex<HashMap<S::Key, Q>>>,
    _marker: PhantomData<fn(&S)>,
}

impl<S, Q, P> CachedProblem<S, Q, P>
where
    S: CacheKey,
    Q: Clone,
    P: QualityBasedProblem<S, Q>,
{
    /// Creates a new cached problem wrapping the given problem.
    pub fn new(problem: P) -> Self {
        Self::with_cache(problem, HashMap::new())
    }

    /// Creates a new cached problem with a pre-populated cache.
    pub fn with_cache(problem: P, cache: HashMap<S::Key, Q>) -> Self {
        Self {
            problem,
            cache: Arc::new(Mutex::new(cache)),
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the wrapped problem.
    pub fn inner(&self) -> &P {
        &self.problem
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<S::Key, Q>> {
        // a panicking evaluation never leaves a half-written entry behind
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the number of cached quality evaluations.
    pub fn cache_size(&self) -> usize {
        self.lock().len()
    }

    /// Clears the cache.
    pub fn clear_cache(&self) {
        self.lock().clear();
    }

    /// Returns a copy of the cache.
    pub fn get_cache(&self) -> HashMap<S::Key, Q> {
        self.lock().clone()
    }
}

impl<S, Q, P> Clone for CachedProblem<S, Q, P>
where
    S: CacheKey,
    P: Clone,
{
    fn clone(&self) -> Self {
        Self {
            problem: self.problem.clone(),
            cache: Arc::clone(&self.cache),
            _marker: PhantomData,
        }
    }
}

impl<S, Q, P> QualityBasedProblem<S, Q> for CachedProblem<S, Q, P>
where
    S: CacheKey,
    Q: Clone + Send,
    P: QualityBasedProblem<S, Q>,
{
    fn quality(&self, solution: &S) -> Result<Q> {
        let key = solution.cache_key();

        if let Some(quality) = self.lock().get(&key) {
            return Ok(quality.clone());
        }

        // The lock is not held while evaluating, so concurrent misses on the
        // same key may both evaluate; the first insert wins.
        let quality = self.problem.quality(solution)?;
        Ok(self.lock().entry(key).or_insert(quality).clone())
    }

    fn compare(&self, a: &Q, b: &Q) -> PartialOrdering {
        self.problem.compare(a, b)
    }
}

/// A cache of quality evaluations with one map per thread.
pub struct ThreadLocalCache<K, Q>
where
    K: Send,
    Q: Send,
{
    cache: ThreadLocal<RefCell<HashMap<K, Q>>>,
}

impl<K, Q> ThreadLocalCache<K, Q>
where
    K: Eq + Hash + Send,
    Q: Clone + Send,
{
    /// Creates a new empty thread-local cache.
    pub fn new() -> Self {
        Self {
            cache: ThreadLocal::new(),
        }
    }

    fn local(&self) -> &RefCell<HashMap<K, Q>> {
        self.cache.get_or(|| RefCell::new(HashMap::new()))
    }

    /// Gets a cached quality if available.
    pub fn get(&self, key: &K) -> Option<Q> {
        self.local()
            .try_borrow()
            .ok()
            .and_then(|cache| cache.get(key).cloned())
    }

    /// Inserts a quality into the cache of the current thread.
    pub fn insert(&self, key: K, value: Q) {
        if let Ok(mut cache) = self.local().try_borrow_mut() {
            cache.insert(key, value);
        }
    }

    /// Clears the cache for the current thread.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.local().try_borrow_mut() {
            cache.clear();
        }
    }

    /// Returns the number of cached qualities for the current thread.
    pub fn len(&self) -> usize {
        self.cache
            .get()
            .and_then(|cell| cell.try_borrow().ok())
            .map_or(0, |cache| cache.len())
    }

    /// Returns `true` if the cache for the current thread is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, Q> Default for ThreadLocalCache<K, Q>
where
    K: Eq + Hash + Send,
    Q: Clone + Send,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A wrapper around a problem that uses a thread-local cache for quality
/// evaluations.
///
/// Each worker thread of the executor fills its own cache, so a solution
/// evaluated on one thread is evaluated again the first time another thread
/// sees it.
pub struct ThreadLocalCachedProblem<S, Q, P>
where
    S: CacheKey,
    Q: Send,
{
    /// The wrapped problem
    problem: P,
    /// The thread-local cache of quality evaluations
    cache: Arc<ThreadLocalCache<S::Key, Q>>,
    _marker: PhantomData<fn(&S)>,
}

impl<S, Q, P> ThreadLocalCachedProblem<S, Q, P>
where
    S: CacheKey,
    Q: Clone + Send,
    P: QualityBasedProblem<S, Q>,
{
    /// Creates a new thread-local cached problem wrapping the given problem.
    pub fn new(problem: P) -> Self {
        Self {
            problem,
            cache: Arc::new(ThreadLocalCache::new()),
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the wrapped problem.
    pub fn inner(&self) -> &P {
        &self.problem
    }

    /// Clears the cache for the current thread.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Returns the number of cached quality evaluations for the current thread.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

impl<S, Q, P> Clone for ThreadLocalCachedProblem<S, Q, P>
where
    S: CacheKey,
    Q: Send,
    P: Clone,
{
    fn clone(&self) -> Self {
        Self {
            problem: self.problem.clone(),
            cache: Arc::clone(&self.cache),
            _marker: PhantomData,
        }
    }
}

impl<S, Q, P> QualityBasedProblem<S, Q> for ThreadLocalCachedProblem<S, Q, P>
where
    S: CacheKey,
    Q: Clone + Send,
    P: QualityBasedProblem<S, Q>,
{
    fn quality(&self, solution: &S) -> Result<Q> {
        let key = solution.cache_key();

        if let Some(quality) = self.cache.get(&key) {
            return Ok(quality);
        }

        let quality = self.problem.quality(solution)?;
        self.cache.insert(key, quality.clone());
        Ok(quality)
    }

    fn compare(&self, a: &Q, b: &Q) -> PartialOrdering {
        self.problem.compare(a, b)
    }
}

/// Extension trait for wrapping a problem with caching functionality.
pub trait CachingProblem<S, Q>: QualityBasedProblem<S, Q> + Sized + Clone
where
    S: CacheKey,
    Q: Clone + Send,
{
    /// Wraps a copy of this problem with a cache shared across all threads.
    fn with_global_cache(&self) -> CachedProblem<S, Q, Self> {
        CachedProblem::new(self.clone())
    }

    /// Wraps a copy of this problem with one cache per thread.
    fn with_thread_local_cache(&self) -> ThreadLocalCachedProblem<S, Q, Self> {
        ThreadLocalCachedProblem::new(self.clone())
    }

    /// Wraps a copy of this problem with a cache of the specified type.
    fn with_cache<'a>(&self, cache_type: CacheType) -> Box<dyn QualityBasedProblem<S, Q> + 'a>
    where
        S: 'a,
        Q: 'a,
        Self: 'a,
    {
        match cache_type {
            CacheType::Global => Box::new(self.with_global_cache()),
            CacheType::ThreadLocal => Box::new(self.with_thread_local_cache()),
        }
    }
}

impl<S, Q, P> CachingProblem<S, Q> for P
where
    S: CacheKey,
    Q: Clone + Send,
    P: QualityBasedProblem<S, Q> + Clone,
{
}
