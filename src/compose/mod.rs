//! Engine composition.
//!
//! Combines several [`EvolutionEngine`]s into one logical engine. Every
//! composed engine implements [`EvolutionEngine`] itself, so compositions
//! nest: a [`CyclicEngine`] of [`ConcatEngine`]s behind an
//! [`UpdatableEngine`] is just another engine.
//!
//! # Key Types
//!
//! - [`ConcatEngine`]: runs engines one after another, each resuming from
//!   the last result of its predecessor
//! - [`CyclicEngine`]: like concat, but starts over with the first engine
//!   after the last one; never ends by itself
//! - [`AdaptiveEngine`]: asks a function for the engine of every segment,
//!   based on the most recent result
//! - [`VarianceAdaptive`]: adaptive engine switching between a
//!   "diversify" and a "narrow" alterer with hysteresis
//! - [`UpdatableEngine`]: engine handle that can be replaced while streams
//!   are being consumed
//!
//! # Ordering
//!
//! All composed streams are pull based and strictly sequential: the next
//! segment is opened only after the previous one is exhausted, and results
//! are delivered in generation order. Switching segments is invisible to the
//! consumer. An `Err` item ends the composed stream right after it is
//! delivered.

mod adaptive;
mod concat;
mod cyclic;
mod updatable;
mod variance;

pub use adaptive::AdaptiveEngine;
pub use concat::ConcatEngine;
pub use cyclic::CyclicEngine;
pub use updatable::{UpdatableEngine, UpdatableStream};
pub use variance::{
    population_variance, AdaptiveMode, EngineTemplate, VarianceAdaptive, VarianceSelector,
};

use crate::engine::{
    EvolutionEngine, EvolutionInit, EvolutionResult, EvolutionStart, EvolutionStream,
};

/// Resume point of a composed stream.
///
/// Starts as the caller's init or start state and is replaced by every
/// delivered result. The next segment always opens from here, so a segment
/// that yields nothing leaves the resume point untouched.
#[derive(Debug, Clone)]
pub(crate) enum Resume<I> {
    Init(EvolutionInit<I>),
    Start(EvolutionStart<I>),
    After(EvolutionResult<I>),
}

impl<I: Clone> Resume<I> {
    /// Opens a stream of `engine` at this resume point.
    pub(crate) fn open(&self, engine: &dyn EvolutionEngine<I>) -> EvolutionStream<I> {
        match self {
            Resume::Init(init) => engine.stream_init(init.clone()),
            Resume::Start(start) => engine.stream(start.clone()),
            Resume::After(result) => engine.stream(result.to_evolution_start()),
        }
    }

    /// Moves the resume point behind `result`.
    pub(crate) fn record(&mut self, result: &EvolutionResult<I>) {
        *self = Resume::After(result.clone());
    }
}

impl<I> Resume<I> {
    /// The most recently delivered result, if any.
    pub(crate) fn last(&self) -> Option<&EvolutionResult<I>> {
        match self {
            Resume::After(result) => Some(result),
            _ => None,
        }
    }

    /// Generation of the next result.
    pub(crate) fn generation(&self) -> u64 {
        match self {
            Resume::Init(init) => init.generation,
            Resume::Start(start) => start.generation,
            Resume::After(result) => result.generation + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{generations, CountingEngine};

    #[test]
    fn test_resume_moves_behind_result() {
        let mut resume = Resume::Start(EvolutionStart::new(Vec::new(), 1));
        assert_eq!(resume.generation(), 1);
        assert!(resume.last().is_none());

        resume.record(&EvolutionResult::new(vec![("x", 6)], 6));
        assert_eq!(resume.generation(), 7);
        assert_eq!(resume.last().map(|r| r.generation), Some(6));

        let engine = CountingEngine::new("e", 2);
        assert_eq!(generations(resume.open(&engine)), vec![7, 8]);
    }

    #[test]
    fn test_resume_from_init() {
        let resume = Resume::Init(EvolutionInit::new(Vec::new()).with_generation(3));
        let engine = CountingEngine::new("e", 1);
        assert_eq!(generations(resume.open(&engine)), vec![3]);
    }
}
