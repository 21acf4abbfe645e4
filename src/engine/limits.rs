//! Stream truncation.
//!
//! Composed streams such as [`CyclicEngine`](crate::compose::CyclicEngine)
//! never end on their own. A *limit* is a stateful predicate over results:
//! the stream is truncated at the first result for which it returns
//! `false`, and that result is not delivered.
//!
//! Fitness-based limits use minimization semantics: a lower score is
//! better, consistent with [`crate::ga`].
//!
//! # Example
//!
//! ```
//! use u_evostream::engine::{self, EvolutionResult, EvolutionStreamExt, Limits};
//!
//! let endless = engine::boxed((1u64..).map(|g| Ok(EvolutionResult::new(vec![()], g))));
//! let taken: Vec<u64> = endless
//!     .limit_by(Limits::by_fixed_generation(4))
//!     .map(|r| r.unwrap().generation)
//!     .collect();
//! assert_eq!(taken, vec![1, 2, 3, 4]);
//! ```

use super::{
    EngineError, EngineHandle, EvolutionEngine, EvolutionInit, EvolutionResult, EvolutionStart,
    EvolutionStream,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Adapters available on every stream of evolution results.
pub trait EvolutionStreamExt<I>:
    Iterator<Item = Result<EvolutionResult<I>, EngineError>> + Sized
{
    /// Truncates the stream when `proceed` first returns `false`.
    ///
    /// `Err` items are passed through without consulting the predicate.
    fn limit_by<P>(self, proceed: P) -> LimitStream<Self, P>
    where
        P: FnMut(&EvolutionResult<I>) -> bool,
    {
        LimitStream {
            inner: self,
            proceed,
            done: false,
        }
    }
}

impl<I, S> EvolutionStreamExt<I> for S where
    S: Iterator<Item = Result<EvolutionResult<I>, EngineError>>
{
}

/// Stream returned by [`EvolutionStreamExt::limit_by`].
pub struct LimitStream<S, P> {
    inner: S,
    proceed: P,
    done: bool,
}

impl<I, S, P> Iterator for LimitStream<S, P>
where
    S: Iterator<Item = Result<EvolutionResult<I>, EngineError>>,
    P: FnMut(&EvolutionResult<I>) -> bool,
{
    type Item = Result<EvolutionResult<I>, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.inner.next()? {
            Ok(result) => {
                if (self.proceed)(&result) {
                    Some(Ok(result))
                } else {
                    self.done = true;
                    None
                }
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Factory functions for common limits.
pub struct Limits;

impl Limits {
    /// Delivers exactly `generations` results.
    pub fn by_fixed_generation<I: 'static>(
        generations: u64,
    ) -> impl FnMut(&EvolutionResult<I>) -> bool + Send + 'static {
        let mut delivered = 0u64;
        move |_| {
            delivered += 1;
            delivered <= generations
        }
    }

    /// Truncates once the best score has not improved for more than
    /// `generations` consecutive results.
    ///
    /// `score` extracts the best (lowest) score of a result. A `generations`
    /// of zero is treated as one.
    pub fn by_steady_fitness<I: 'static, F>(
        generations: usize,
        score: F,
    ) -> impl FnMut(&EvolutionResult<I>) -> bool + Send + 'static
    where
        F: Fn(&EvolutionResult<I>) -> f64 + Send + 'static,
    {
        let generations = generations.max(1);
        let mut best: Option<f64> = None;
        let mut stable = 0usize;
        move |result| {
            let current = score(result);
            match best {
                Some(b) if current < b => {
                    best = Some(current);
                    stable = 0;
                }
                Some(_) => stable += 1,
                None => best = Some(current),
            }
            stable <= generations
        }
    }

    /// Truncates at the first result whose best score is at or below
    /// `threshold`.
    pub fn by_fitness_threshold<I: 'static, F>(
        threshold: f64,
        score: F,
    ) -> impl FnMut(&EvolutionResult<I>) -> bool + Send + 'static
    where
        F: Fn(&EvolutionResult<I>) -> f64 + Send + 'static,
    {
        move |result| score(result) > threshold
    }

    /// Truncates once `duration` has elapsed since the first result.
    pub fn by_execution_time<I: 'static>(
        duration: Duration,
    ) -> impl FnMut(&EvolutionResult<I>) -> bool + Send + 'static {
        let mut started: Option<Instant> = None;
        move |_| started.get_or_insert_with(Instant::now).elapsed() <= duration
    }
}

type LimitFactory<I> =
    dyn Fn() -> Box<dyn FnMut(&EvolutionResult<I>) -> bool + Send> + Send + Sync;

/// Engine whose every stream is truncated by a fresh limit.
///
/// Limits are stateful, so a new predicate is created per stream. Limited
/// engines are the usual building block for segments of a
/// [`ConcatEngine`](crate::compose::ConcatEngine) or
/// [`AdaptiveEngine`](crate::compose::AdaptiveEngine).
pub struct Limited<I> {
    engine: EngineHandle<I>,
    factory: Arc<LimitFactory<I>>,
}

impl<I: 'static> Limited<I> {
    /// Limits every stream of `engine` to `generations` results.
    pub fn generations<E>(engine: E, generations: u64) -> Self
    where
        E: EvolutionEngine<I> + 'static,
    {
        Self::by(engine, move || Limits::by_fixed_generation::<I>(generations))
    }

    /// Limits every stream of `engine` with a predicate from `factory`.
    pub fn by<E, F, P>(engine: E, factory: F) -> Self
    where
        E: EvolutionEngine<I> + 'static,
        F: Fn() -> P + Send + Sync + 'static,
        P: FnMut(&EvolutionResult<I>) -> bool + Send + 'static,
    {
        Self {
            engine: Arc::new(engine),
            factory: Arc::new(move || {
                Box::new(factory()) as Box<dyn FnMut(&EvolutionResult<I>) -> bool + Send>
            }),
        }
    }
}

impl<I: Send + 'static> EvolutionEngine<I> for Limited<I> {
    fn stream(&self, start: EvolutionStart<I>) -> EvolutionStream<I> {
        Box::new(self.engine.stream(start).limit_by((self.factory)()))
    }

    fn stream_init(&self, init: EvolutionInit<I>) -> EvolutionStream<I> {
        Box::new(self.engine.stream_init(init).limit_by((self.factory)()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{generations, CountingEngine, FailingEngine, Tick};

    fn unbounded() -> EvolutionStream<Tick> {
        CountingEngine::unbounded("e").stream(EvolutionStart::empty())
    }

    #[test]
    fn test_fixed_generation() {
        let taken = generations(unbounded().limit_by(Limits::by_fixed_generation(5)));
        assert_eq!(taken, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_fixed_generation_zero() {
        let taken = generations(unbounded().limit_by(Limits::by_fixed_generation(0)));
        assert!(taken.is_empty());
    }

    #[test]
    fn test_steady_fitness_stops_without_improvement() {
        // Score improves until generation 3, then stays flat.
        let score = |r: &EvolutionResult<Tick>| (r.generation.min(3) as f64) * -1.0;
        let taken = generations(unbounded().limit_by(Limits::by_steady_fitness(2, score)));
        // gen 4 and 5 are steady (stable = 1, 2), gen 6 exceeds the limit.
        assert_eq!(taken, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_fitness_threshold() {
        let score = |r: &EvolutionResult<Tick>| 10.0 - r.generation as f64;
        let taken = generations(unbounded().limit_by(Limits::by_fitness_threshold(6.0, score)));
        assert_eq!(taken, vec![1, 2, 3]);
    }

    #[test]
    fn test_execution_time_within_budget() {
        let mut limit = Limits::by_execution_time::<Tick>(Duration::from_secs(3600));
        let result = EvolutionResult::new(vec![("e", 1)], 1);
        assert!(limit(&result));
        assert!(limit(&result));
    }

    #[test]
    fn test_errors_pass_through() {
        let stream = FailingEngine::after(2).stream(EvolutionStart::empty());
        let items: Vec<_> = stream.limit_by(Limits::by_fixed_generation(10)).collect();
        assert_eq!(items.len(), 5);
        assert!(items[2].is_err());
    }

    #[test]
    fn test_limited_engine_restarts_limit_per_stream() {
        let engine = Limited::generations(CountingEngine::unbounded("e"), 3);
        let first = generations(engine.stream(EvolutionStart::empty()));
        let second = generations(engine.stream(EvolutionStart::new(Vec::new(), 10)));
        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(second, vec![10, 11, 12]);
    }

    #[test]
    fn test_limited_engine_init() {
        let engine = Limited::generations(CountingEngine::unbounded("e"), 2);
        let init = EvolutionInit::new(Vec::new()).with_generation(4);
        let taken = generations(engine.stream_init(init));
        assert_eq!(taken, vec![4, 5]);
    }
}
