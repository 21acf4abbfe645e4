//! Run-time reconfigurable engine.

use super::Resume;
use crate::engine::{
    EngineError, EngineHandle, EvolutionEngine, EvolutionInit, EvolutionResult, EvolutionStart,
    EvolutionStream,
};
use log::debug;
use std::sync::Arc;

type SegmentFn<I> = Box<dyn FnMut(Option<&EvolutionResult<I>>) -> EngineHandle<I> + Send>;
type SegmentFactory<I> = dyn Fn() -> SegmentFn<I> + Send + Sync;

/// Engine whose segments are chosen at run time.
///
/// Before every segment the engine function is called with the most recent
/// result (`None` for the first segment) and returns the engine to run
/// next. The returned engine should be limited, otherwise the first segment
/// never ends and no further adaptation happens.
///
/// The composed stream ends when a freshly opened segment yields no result.
///
/// Engine functions that keep state between segments are created per
/// stream with [`per_stream`](Self::per_stream), so concurrent streams of
/// the same engine never observe each other's results.
///
/// # Example
///
/// ```
/// use u_evostream::compose::AdaptiveEngine;
/// use u_evostream::engine::{self, EvolutionEngine, EvolutionResult, EvolutionStart, Limited};
///
/// // Emits its step size as the single individual of every generation.
/// let stepping = |step: u32| engine::handle(Limited::<u32>::generations(
///     engine::from_fn(move |start: EvolutionStart<u32>| {
///         engine::boxed(
///             (start.generation..).map(move |g| Ok(EvolutionResult::new(vec![step], g))),
///         )
///     }),
///     2,
/// ));
///
/// // Small steps first, large steps once generation 4 is reached.
/// let adaptive = AdaptiveEngine::new(move |last: Option<&EvolutionResult<u32>>| {
///     match last {
///         Some(r) if r.generation >= 4 => stepping(10),
///         _ => stepping(1),
///     }
/// });
///
/// let steps: Vec<u32> = adaptive
///     .stream(EvolutionStart::empty())
///     .take(6)
///     .map(|r| r.unwrap().population[0])
///     .collect();
/// assert_eq!(steps, vec![1, 1, 1, 1, 10, 10]);
/// ```
pub struct AdaptiveEngine<I> {
    factory: Arc<SegmentFactory<I>>,
}

impl<I: 'static> AdaptiveEngine<I> {
    /// Creates an adaptive engine from a stateless engine function shared by
    /// all streams.
    pub fn new<F>(engine: F) -> Self
    where
        F: Fn(Option<&EvolutionResult<I>>) -> EngineHandle<I> + Send + Sync + 'static,
    {
        let engine = Arc::new(engine);
        Self::per_stream(move || {
            let engine = Arc::clone(&engine);
            move |last: Option<&EvolutionResult<I>>| engine(last)
        })
    }

    /// Creates an adaptive engine that calls `factory` once per opened
    /// stream. The returned engine function is owned by that stream alone.
    pub fn per_stream<F, S>(factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: FnMut(Option<&EvolutionResult<I>>) -> EngineHandle<I> + Send + 'static,
    {
        Self {
            factory: Arc::new(move || Box::new(factory()) as SegmentFn<I>),
        }
    }

    fn open(&self, resume: Resume<I>) -> AdaptiveStream<I> {
        AdaptiveStream {
            engine: (self.factory)(),
            current: None,
            segment_produced: false,
            segments: 0,
            resume,
            finished: false,
        }
    }
}

impl<I> Clone for AdaptiveEngine<I> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<I: Clone + Send + 'static> EvolutionEngine<I> for AdaptiveEngine<I> {
    fn stream(&self, start: EvolutionStart<I>) -> EvolutionStream<I> {
        Box::new(self.open(Resume::Start(start)))
    }

    fn stream_init(&self, init: EvolutionInit<I>) -> EvolutionStream<I> {
        Box::new(self.open(Resume::Init(init)))
    }
}

struct AdaptiveStream<I> {
    engine: SegmentFn<I>,
    current: Option<EvolutionStream<I>>,
    segment_produced: bool,
    segments: u64,
    resume: Resume<I>,
    finished: bool,
}

impl<I: Clone> Iterator for AdaptiveStream<I> {
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
                        self.segment_produced = true;
                        return Some(Ok(result));
                    }
                    Some(Err(e)) => {
                        self.finished = true;
                        self.current = None;
                        return Some(Err(e));
                    }
                    None => {
                        self.current = None;
                        if !self.segment_produced {
                            debug!("adaptive: segment {} was empty, stopping", self.segments);
                            self.finished = true;
                            return None;
                        }
                    }
                }
            }

            let engine = (self.engine)(self.resume.last());
            self.segments += 1;
            debug!(
                "adaptive: opening segment {} at generation {}",
                self.segments,
                self.resume.generation()
            );
            self.current = Some(self.resume.open(engine.as_ref()));
            self.segment_produced = false;
        }
    }
}
