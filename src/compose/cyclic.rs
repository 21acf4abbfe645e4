//! Cyclic engine composition.

use super::Resume;
use crate::engine::{
    self, EngineError, EngineHandle, EvolutionEngine, EvolutionInit, EvolutionResult,
    EvolutionStart, EvolutionStream,
};
use log::debug;
use std::sync::Arc;

/// Runs a list of engines in a loop.
///
/// Hands results from one engine to the next exactly like
/// [`ConcatEngine`](super::ConcatEngine), but after the last engine's stream
/// ends the first engine is started again from the last result. The
/// composed stream therefore never ends by itself: callers must truncate it
/// (e.g. with [`Limits`](crate::engine::Limits) or `Iterator::take`), and
/// every engine in the cycle should be limited.
///
/// An empty engine list yields an empty stream. A full pass in which no
/// engine yields any result also ends the stream, since repeating it could
/// never produce anything.
///
/// # Example
///
/// ```
/// use u_evostream::compose::CyclicEngine;
/// use u_evostream::engine::{self, EvolutionEngine, EvolutionResult, EvolutionStart, Limited};
///
/// let counting = || engine::from_fn(|start: EvolutionStart<u8>| {
///     engine::boxed((start.generation..).map(|g| Ok(EvolutionResult::new(vec![0], g))))
/// });
///
/// let cyclic: CyclicEngine<u8> = CyclicEngine::empty()
///     .with_engine(Limited::generations(counting(), 2))
///     .with_engine(Limited::generations(counting(), 2));
///
/// let generations: Vec<u64> = cyclic
///     .stream(EvolutionStart::empty())
///     .take(7)
///     .map(|r| r.unwrap().generation)
///     .collect();
/// assert_eq!(generations, vec![1, 2, 3, 4, 5, 6, 7]);
/// ```
pub struct CyclicEngine<I> {
    engines: Arc<Vec<EngineHandle<I>>>,
}

impl<I> CyclicEngine<I> {
    /// Creates a cycle over the given engines.
    pub fn new(engines: Vec<EngineHandle<I>>) -> Self {
        Self {
            engines: Arc::new(engines),
        }
    }

    /// A cycle without engines.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Appends an engine to the cycle.
    pub fn with_engine<E>(mut self, engine: E) -> Self
    where
        E: EvolutionEngine<I> + 'static,
    {
        Arc::make_mut(&mut self.engines).push(engine::handle(engine));
        self
    }

    /// Number of engines in one pass.
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Whether the cycle has no engines.
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    fn open(&self, resume: Resume<I>) -> CyclicStream<I> {
        CyclicStream {
            engines: Arc::clone(&self.engines),
            next: 0,
            pass: 0,
            pass_produced: false,
            current: None,
            resume,
            finished: false,
        }
    }
}

impl<I> Clone for CyclicEngine<I> {
    fn clone(&self) -> Self {
        Self {
            engines: Arc::clone(&self.engines),
        }
    }
}

impl<I: Clone + Send + 'static> EvolutionEngine<I> for CyclicEngine<I> {
    fn stream(&self, start: EvolutionStart<I>) -> EvolutionStream<I> {
        Box::new(self.open(Resume::Start(start)))
    }

    fn stream_init(&self, init: EvolutionInit<I>) -> EvolutionStream<I> {
        Box::new(self.open(Resume::Init(init)))
    }
}

struct CyclicStream<I> {
    engines: Arc<Vec<EngineHandle<I>>>,
    next: usize,
    pass: u64,
    pass_produced: bool,
    current: Option<EvolutionStream<I>>,
    resume: Resume<I>,
    finished: bool,
}

impl<I: Clone> Iterator for CyclicStream<I> {
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
                        self.pass_produced = true;
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

            if self.next == self.engines.len() {
                if !self.pass_produced {
                    debug!("cyclic: pass {} produced no result, stopping", self.pass);
                    self.finished = true;
                    return None;
                }
                self.next = 0;
                self.pass += 1;
                self.pass_produced = false;
            }

            debug!(
                "cyclic: pass {}, opening engine {}/{} at generation {}",
                self.pass,
                self.next + 1,
                self.engines.len(),
                self.resume.generation()
            );
            self.current = Some(self.resume.open(self.engines[self.next].as_ref()));
            self.next += 1;
        }
    }
}
