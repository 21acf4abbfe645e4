//! Sequential engine concatenation.

use super::Resume;
use crate::engine::{
    self, EngineError, EngineHandle, EvolutionEngine, EvolutionInit, EvolutionResult,
    EvolutionStart, EvolutionStream,
};
use log::debug;
use std::sync::Arc;

/// Runs a list of engines one after another.
///
/// The stream of engine *k + 1* starts from the last result of engine *k*.
/// The composed stream ends when the last engine's stream ends, so every
/// engine but the last one should be limited (see
/// [`Limited`](crate::engine::Limited)); an unbounded engine keeps its
/// successors from ever running.
///
/// If an engine yields no result at all, its successor starts from the
/// same point the empty engine was given, which is the caller's original
/// start when nothing has been produced yet. An empty engine list yields an
/// empty stream.
///
/// # Example
///
/// ```
/// use u_evostream::compose::ConcatEngine;
/// use u_evostream::engine::{self, EvolutionEngine, EvolutionResult, EvolutionStart, Limited};
///
/// let counting = || engine::from_fn(|start: EvolutionStart<u8>| {
///     engine::boxed((start.generation..).map(|g| Ok(EvolutionResult::new(vec![0], g))))
/// });
///
/// let concat: ConcatEngine<u8> = ConcatEngine::empty()
///     .with_engine(Limited::generations(counting(), 3))
///     .with_engine(Limited::generations(counting(), 2));
///
/// let generations: Vec<u64> = concat
///     .stream(EvolutionStart::empty())
///     .map(|r| r.unwrap().generation)
///     .collect();
/// assert_eq!(generations, vec![1, 2, 3, 4, 5]);
/// ```
pub struct ConcatEngine<I> {
    engines: Arc<Vec<EngineHandle<I>>>,
}

impl<I> ConcatEngine<I> {
    /// Creates a concatenation of the given engines.
    pub fn new(engines: Vec<EngineHandle<I>>) -> Self {
        Self {
            engines: Arc::new(engines),
        }
    }

    /// A concatenation without engines.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Appends an engine.
    pub fn with_engine<E>(mut self, engine: E) -> Self
    where
        E: EvolutionEngine<I> + 'static,
    {
        Arc::make_mut(&mut self.engines).push(engine::handle(engine));
        self
    }

    /// Number of concatenated engines.
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Whether there are no engines.
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    fn open(&self, resume: Resume<I>) -> ConcatStream<I> {
        ConcatStream {
            engines: Arc::clone(&self.engines),
            next: 0,
            current: None,
            resume,
            finished: false,
        }
    }
}

impl<I> Clone for ConcatEngine<I> {
    fn clone(&self) -> Self {
        Self {
            engines: Arc::clone(&self.engines),
        }
    }
}

impl<I: Clone + Send + 'static> EvolutionEngine<I> for ConcatEngine<I> {
    fn stream(&self, start: EvolutionStart<I>) -> EvolutionStream<I> {
        Box::new(self.open(Resume::Start(start)))
    }

    fn stream_init(&self, init: EvolutionInit<I>) -> EvolutionStream<I> {
        Box::new(self.open(Resume::Init(init)))
    }
}

struct ConcatStream<I> {
    engines: Arc<Vec<EngineHandle<I>>>,
    next: usize,
    current: Option<EvolutionStream<I>>,
    resume: Resume<I>,
    finished: bool,
}

impl<I: Clone> Iterator for ConcatStream<I> {
    type Item = Result<EvolutionResult<I>, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if let Some(current) = self.current.as_mut() {
                match current.next() {
                    Some(Ok(result)) => {
                        self.resume.record(&result);
                        return Some(Ok(result));
                    }
                    Some(Err(e)) => {
                        self.finished = true;
                        self.current = None;
                        return Some(Err(e));
                    }
                    None => self.current = None,
                }
            }

            let Some(engine) = self.engines.get(self.next) else {
                self.finished = true;
                return None;
            };
            debug!(
                "concat: opening engine {}/{} at generation {}",
                self.next + 1,
                self.engines.len(),
                self.resume.generation()
            );
            self.current = Some(self.resume.open(engine.as_ref()));
            self.next += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{generations, ticks, CountingEngine, FailingEngine, Tick};
    use crate::engine::Limited;

    #[test]
    fn test_concat_two_engines() {
        let concat: ConcatEngine<Tick> = ConcatEngine::empty()
            .with_engine(CountingEngine::new("e1", 3))
            .with_engine(CountingEngine::new("e2", 2));

        let produced = ticks(concat.stream(EvolutionStart::empty()));
        assert_eq!(
            produced,
            vec![("e1", 1), ("e1", 2), ("e1", 3), ("e2", 4), ("e2", 5)]
        );
    }

    #[test]
    fn test_concat_empty() {
        let concat: ConcatEngine<Tick> = ConcatEngine::empty();
        assert!(concat.is_empty());
        assert!(concat.stream(EvolutionStart::empty()).next().is_none());
    }

    #[test]
    fn test_concat_single() {
        let concat: ConcatEngine<Tick> =
            ConcatEngine::empty().with_engine(CountingEngine::new("e", 4));
        assert_eq!(generations(concat.stream(EvolutionStart::empty())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_engine_passes_original_start() {
        let concat: ConcatEngine<Tick> = ConcatEngine::empty()
            .with_engine(CountingEngine::new("silent", 0))
            .with_engine(CountingEngine::new("e2", 2));

        let produced = ticks(concat.stream(EvolutionStart::new(Vec::new(), 10)));
        assert_eq!(produced, vec![("e2", 10), ("e2", 11)]);
    }

    #[test]
    fn test_empty_engine_in_the_middle() {
        let concat: ConcatEngine<Tick> = ConcatEngine::empty()
            .with_engine(CountingEngine::new("e1", 2))
            .with_engine(CountingEngine::new("silent", 0))
            .with_engine(CountingEngine::new("e3", 2));

        let produced = ticks(concat.stream(EvolutionStart::empty()));
        assert_eq!(produced, vec![("e1", 1), ("e1", 2), ("e3", 3), ("e3", 4)]);
    }

    #[test]
    fn test_empty_engine_passes_original_init() {
        let concat: ConcatEngine<Tick> = ConcatEngine::empty()
            .with_engine(CountingEngine::new("silent", 0))
            .with_engine(CountingEngine::new("e2", 1));

        let init = EvolutionInit::new(Vec::new()).with_generation(20);
        assert_eq!(generations(concat.stream_init(init)), vec![20]);
    }

    #[test]
    fn test_unbounded_engine_starves_successors() {
        let concat: ConcatEngine<Tick> = ConcatEngine::empty()
            .with_engine(CountingEngine::unbounded("e1"))
            .with_engine(CountingEngine::new("e2", 2));

        let produced = ticks(concat.stream(EvolutionStart::empty()).take(50));
        assert!(produced.iter().all(|(name, _)| *name == "e1"));
    }

    #[test]
    fn test_limited_segments() {
        let concat: ConcatEngine<Tick> = ConcatEngine::empty()
            .with_engine(Limited::generations(CountingEngine::unbounded("a"), 2))
            .with_engine(Limited::generations(CountingEngine::unbounded("b"), 2));

        let produced = ticks(concat.stream(EvolutionStart::empty()));
        assert_eq!(produced, vec![("a", 1), ("a", 2), ("b", 3), ("b", 4)]);
    }

    #[test]
    fn test_error_aborts_composed_stream() {
        let concat: ConcatEngine<Tick> = ConcatEngine::empty()
            .with_engine(FailingEngine::after(2))
            .with_engine(CountingEngine::new("e2", 5));

        let items: Vec<_> = concat.stream(EvolutionStart::empty()).collect();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(items[1].is_ok());
        assert!(matches!(
            items[2],
            Err(EngineError::Evaluation { generation: 3, .. })
        ));
    }

    #[test]
    fn test_nested_concat() {
        let inner: ConcatEngine<Tick> = ConcatEngine::empty()
            .with_engine(CountingEngine::new("a", 1))
            .with_engine(CountingEngine::new("b", 1));
        let outer: ConcatEngine<Tick> = ConcatEngine::empty()
            .with_engine(inner)
            .with_engine(CountingEngine::new("c", 1));

        let produced = ticks(outer.stream(EvolutionStart::empty()));
        assert_eq!(produced, vec![("a", 1), ("b", 2), ("c", 3)]);
    }

    #[test]
    fn test_streams_are_independent() {
        let concat: ConcatEngine<Tick> = ConcatEngine::empty()
            .with_engine(CountingEngine::new("e1", 1))
            .with_engine(CountingEngine::new("e2", 1));

        let mut first = concat.stream(EvolutionStart::empty());
        let second = concat.stream(EvolutionStart::new(Vec::new(), 100));
        assert_eq!(first.next().map(|r| r.unwrap().generation), Some(1));
        assert_eq!(generations(second), vec![100, 101]);
        assert_eq!(first.next().map(|r| r.unwrap().generation), Some(2));
    }
}
