//! Evolution engine abstraction.
//!
//! An *evolution engine* is anything that, given a start state, produces a
//! lazy, generation-ordered sequence of [`EvolutionResult`]s. The crate never
//! looks inside an engine: selection, alteration and evaluation are the
//! engine's business. Everything in [`crate::compose`] is built on this one
//! trait, and every composed engine is itself an [`EvolutionEngine`], so
//! compositions nest freely.
//!
//! # Key Types
//!
//! - [`EvolutionEngine`]: the single-method engine capability
//! - [`EvolutionStream`]: boxed, lazy stream of generation results
//! - [`EngineHandle`]: shared handle to a type-erased engine
//! - [`EngineError`]: failure raised inside an engine
//!
//! # Submodules
//!
//! - [`limits`]: stream truncation predicates and limited engines

mod error;
pub mod limits;
#[cfg(test)]
pub(crate) mod testing;
mod types;

use std::sync::Arc;

pub use error::EngineError;
pub use limits::{EvolutionStreamExt, Limited, Limits};
pub use types::{EvolutionInit, EvolutionResult, EvolutionStart, FIRST_GENERATION};

/// Lazy, generation-ordered sequence of results.
///
/// A consumer cancels a stream simply by no longer pulling from it.
pub type EvolutionStream<I> =
    Box<dyn Iterator<Item = Result<EvolutionResult<I>, EngineError>> + Send>;

/// Shared handle to a type-erased engine.
pub type EngineHandle<I> = Arc<dyn EvolutionEngine<I>>;

/// The evolution engine capability.
///
/// Implementations must produce streams that own everything they need
/// (`'static`), so a stream can outlive the borrow of the engine that
/// created it. Composed engines rely on this when they switch between
/// underlying engines mid-stream.
pub trait EvolutionEngine<I>: Send + Sync {
    /// Creates a stream that resumes from the given start state.
    fn stream(&self, start: EvolutionStart<I>) -> EvolutionStream<I>;

    /// Creates a stream from an initial (not yet evaluated) population.
    ///
    /// The default treats the init as a start state.
    fn stream_init(&self, init: EvolutionInit<I>) -> EvolutionStream<I> {
        self.stream(init.into())
    }
}

impl<I, E> EvolutionEngine<I> for Arc<E>
where
    E: EvolutionEngine<I> + ?Sized,
{
    fn stream(&self, start: EvolutionStart<I>) -> EvolutionStream<I> {
        (**self).stream(start)
    }

    fn stream_init(&self, init: EvolutionInit<I>) -> EvolutionStream<I> {
        (**self).stream_init(init)
    }
}

impl<I, E> EvolutionEngine<I> for Box<E>
where
    E: EvolutionEngine<I> + ?Sized,
{
    fn stream(&self, start: EvolutionStart<I>) -> EvolutionStream<I> {
        (**self).stream(start)
    }

    fn stream_init(&self, init: EvolutionInit<I>) -> EvolutionStream<I> {
        (**self).stream_init(init)
    }
}

/// Engine backed by a closure.
///
/// Created with [`from_fn`].
pub struct FnEngine<F> {
    f: F,
}

/// Wraps a closure `start -> stream` into an [`EvolutionEngine`].
///
/// ```
/// use u_evostream::engine::{self, EvolutionEngine, EvolutionResult, EvolutionStart};
///
/// // Each stream yields three generations of an unchanged population.
/// let engine = engine::from_fn(|start: EvolutionStart<u32>| {
///     let population = start.population;
///     engine::boxed((start.generation..start.generation + 3)
///         .map(move |g| Ok(EvolutionResult::new(population.clone(), g))))
/// });
///
/// let generations: Vec<u64> = engine
///     .stream(EvolutionStart::new(vec![1], 1))
///     .map(|r| r.unwrap().generation)
///     .collect();
/// assert_eq!(generations, vec![1, 2, 3]);
/// ```
pub fn from_fn<I, F>(f: F) -> FnEngine<F>
where
    F: Fn(EvolutionStart<I>) -> EvolutionStream<I> + Send + Sync,
{
    FnEngine { f }
}

impl<I, F> EvolutionEngine<I> for FnEngine<F>
where
    F: Fn(EvolutionStart<I>) -> EvolutionStream<I> + Send + Sync,
{
    fn stream(&self, start: EvolutionStart<I>) -> EvolutionStream<I> {
        (self.f)(start)
    }
}

/// Boxes an iterator of results into an [`EvolutionStream`].
pub fn boxed<I, S>(stream: S) -> EvolutionStream<I>
where
    S: Iterator<Item = Result<EvolutionResult<I>, EngineError>> + Send + 'static,
{
    Box::new(stream)
}

/// Wraps any engine into a shared [`EngineHandle`].
pub fn handle<I, E>(engine: E) -> EngineHandle<I>
where
    E: EvolutionEngine<I> + 'static,
{
    Arc::new(engine)
}
