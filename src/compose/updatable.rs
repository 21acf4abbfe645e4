//! Hot-swappable engine.
//!
//! An [`UpdatableEngine`] holds its engine in a versioned slot behind a
//! reader-writer lock. Every pull on an [`UpdatableStream`] holds the read
//! lock for the duration of that single pull; [`UpdatableEngine::update`]
//! takes the write lock, so it waits for in-flight pulls and a swap can
//! never be observed half-way. A cursor notices the new version on its next
//! pull and re-opens its stream on the new engine, resuming right behind
//! the last result it delivered.
//!
//! The replaced engine is dropped as soon as the slot and every cursor that
//! still streams from it have moved on.

use super::Resume;
use crate::engine::{
    self, EngineError, EngineHandle, EvolutionEngine, EvolutionInit, EvolutionResult,
    EvolutionStart, EvolutionStream,
};
use log::debug;
use parking_lot::RwLock;
use std::sync::Arc;

struct Slot<I> {
    engine: EngineHandle<I>,
    version: u64,
}

/// Engine that can be replaced while its streams are consumed.
///
/// Clones share the same slot: updating one clone updates all of them.
///
/// # Example
///
/// ```
/// use u_evostream::compose::UpdatableEngine;
/// use u_evostream::engine::{self, EvolutionEngine, EvolutionResult, EvolutionStart};
///
/// let labelled = |label: char| engine::from_fn(move |start: EvolutionStart<char>| {
///     engine::boxed((start.generation..).map(move |g| Ok(EvolutionResult::new(vec![label], g))))
/// });
///
/// let updatable = UpdatableEngine::new(labelled('a'));
/// let mut stream = updatable.stream(EvolutionStart::empty());
/// assert_eq!(stream.next().unwrap().unwrap().population, vec!['a']);
///
/// updatable.update(labelled('b'));
/// let next = stream.next().unwrap().unwrap();
/// assert_eq!(next.population, vec!['b']);
/// assert_eq!(next.generation, 2);
/// ```
pub struct UpdatableEngine<I> {
    slot: Arc<RwLock<Slot<I>>>,
}

impl<I> UpdatableEngine<I> {
    /// Creates an updatable engine around `engine`.
    pub fn new<E>(engine: E) -> Self
    where
        E: EvolutionEngine<I> + 'static,
    {
        Self::from_handle(engine::handle(engine))
    }

    /// Creates an updatable engine around an existing handle.
    pub fn from_handle(engine: EngineHandle<I>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Slot { engine, version: 0 })),
        }
    }

    /// Replaces the engine.
    ///
    /// Blocks until every pull currently in progress has finished. Streams
    /// switch to the new engine on their next pull.
    pub fn update<E>(&self, engine: E)
    where
        E: EvolutionEngine<I> + 'static,
    {
        self.update_handle(engine::handle(engine));
    }

    /// Replaces the engine with an existing handle.
    pub fn update_handle(&self, engine: EngineHandle<I>) {
        let mut slot = self.slot.write();
        slot.engine = engine;
        slot.version += 1;
        debug!("updatable: engine replaced, now at version {}", slot.version);
    }

    /// Number of updates applied so far.
    pub fn version(&self) -> u64 {
        self.slot.read().version
    }

    /// Handle to the currently installed engine.
    pub fn current(&self) -> EngineHandle<I> {
        Arc::clone(&self.slot.read().engine)
    }

    fn open(&self, resume: Resume<I>) -> UpdatableStream<I> {
        UpdatableStream {
            slot: Arc::clone(&self.slot),
            current: None,
            version: 0,
            exhausted: false,
            resume,
            finished: false,
        }
    }
}

impl<I> Clone for UpdatableEngine<I> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<I: Clone + Send + 'static> UpdatableEngine<I> {
    /// Opens a cursor that resumes from `start`.
    pub fn cursor(&self, start: EvolutionStart<I>) -> UpdatableStream<I> {
        self.open(Resume::Start(start))
    }

    /// Opens a cursor that starts from an initial population.
    pub fn cursor_init(&self, init: EvolutionInit<I>) -> UpdatableStream<I> {
        self.open(Resume::Init(init))
    }
}

impl<I: Clone + Send + 'static> EvolutionEngine<I> for UpdatableEngine<I> {
    fn stream(&self, start: EvolutionStart<I>) -> EvolutionStream<I> {
        Box::new(self.cursor(start))
    }

    fn stream_init(&self, init: EvolutionInit<I>) -> EvolutionStream<I> {
        Box::new(self.cursor_init(init))
    }
}

/// Cursor over an [`UpdatableEngine`].
///
/// When the installed engine's stream ends, the cursor reports `None` until
/// the engine is updated; the next pull after an update resumes on the new
/// engine. An `Err` item ends the cursor for good.
pub struct UpdatableStream<I> {
    slot: Arc<RwLock<Slot<I>>>,
    current: Option<EvolutionStream<I>>,
    version: u64,
    exhausted: bool,
    resume: Resume<I>,
    finished: bool,
}

impl<I: Clone> UpdatableStream<I> {
    /// Creates a second cursor sharing this cursor's engine slot.
    ///
    /// The new cursor resumes right behind the last result delivered by
    /// `self` and pulls from its own stream of the installed engine, so both
    /// cursors can be driven from different threads. Returns `None` once
    /// `self` has failed.
    pub fn try_split(&self) -> Option<UpdatableStream<I>> {
        if self.finished {
            return None;
        }
        Some(UpdatableStream {
            slot: Arc::clone(&self.slot),
            current: None,
            version: 0,
            exhausted: false,
            resume: self.resume.clone(),
            finished: false,
        })
    }

    /// Generation of the next result this cursor will deliver.
    pub fn next_generation(&self) -> u64 {
        self.resume.generation()
    }
}

impl<I: Clone> Iterator for UpdatableStream<I> {
    type Item = Result<EvolutionResult<I>, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let slot = self.slot.read();
        if self.current.is_none() || self.version != slot.version {
            if self.current.is_some() {
                debug!(
                    "updatable: cursor moves to engine version {} at generation {}",
                    slot.version,
                    self.resume.generation()
                );
            }
            self.current = Some(self.resume.open(slot.engine.as_ref()));
            self.version = slot.version;
            self.exhausted = false;
        }
        if self.exhausted {
            return None;
        }

        let item = self.current.as_mut().and_then(|stream| stream.next());
        drop(slot);

        match item {
            Some(Ok(result)) => {
                self.resume.record(&result);
                Some(Ok(result))
            }
            Some(Err(e)) => {
                self.finished = true;
                self.current = None;
                Some(Err(e))
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{generations, ticks, CountingEngine, FailingEngine, Tick};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    #[test]
    fn test_swap_between_pulls() {
        let updatable: UpdatableEngine<Tick> =
            UpdatableEngine::new(CountingEngine::unbounded("old"));
        let mut stream = updatable.stream(EvolutionStart::empty());

        let first = ticks(stream.by_ref().take(3));
        updatable.update(CountingEngine::unbounded("new"));
        let second = ticks(stream.by_ref().take(3));

        assert_eq!(first, vec![("old", 1), ("old", 2), ("old", 3)]);
        assert_eq!(second, vec![("new", 4), ("new", 5), ("new", 6)]);
        assert_eq!(updatable.version(), 1);
    }

    #[test]
    fn test_update_before_first_pull() {
        let updatable: UpdatableEngine<Tick> =
            UpdatableEngine::new(CountingEngine::unbounded("old"));
        let mut stream = updatable.stream(EvolutionStart::empty());
        updatable.update(CountingEngine::unbounded("new"));

        assert_eq!(ticks(stream.by_ref().take(2)), vec![("new", 1), ("new", 2)]);
    }

    #[test]
    fn test_clones_share_the_slot() {
        let updatable: UpdatableEngine<Tick> =
            UpdatableEngine::new(CountingEngine::unbounded("old"));
        let other = updatable.clone();
        let mut stream = updatable.stream(EvolutionStart::empty());
        assert_eq!(ticks(stream.by_ref().take(1)), vec![("old", 1)]);

        other.update(CountingEngine::unbounded("new"));
        assert_eq!(ticks(stream.by_ref().take(1)), vec![("new", 2)]);
    }

    #[test]
    fn test_exhausted_until_updated() {
        let updatable: UpdatableEngine<Tick> =
            UpdatableEngine::new(CountingEngine::new("short", 2));
        let mut stream = updatable.cursor(EvolutionStart::empty());

        assert_eq!(generations(stream.by_ref().take(5)), vec![1, 2]);
        assert!(stream.next().is_none());

        updatable.update(CountingEngine::new("more", 2));
        assert_eq!(ticks(stream.by_ref()), vec![("more", 3), ("more", 4)]);
    }

    #[test]
    fn test_error_ends_cursor() {
        let updatable: UpdatableEngine<Tick> = UpdatableEngine::new(FailingEngine::after(1));
        let mut stream = updatable.cursor(EvolutionStart::empty());

        assert!(stream.next().unwrap().is_ok());
        assert!(stream.next().unwrap().is_err());
        updatable.update(CountingEngine::unbounded("new"));
        assert!(stream.next().is_none());
        assert!(stream.try_split().is_none());
    }

    #[test]
    fn test_split_resumes_behind_parent() {
        let updatable: UpdatableEngine<Tick> = UpdatableEngine::new(CountingEngine::unbounded("a"));
        let mut parent = updatable.cursor(EvolutionStart::empty());
        assert_eq!(generations(parent.by_ref().take(2)), vec![1, 2]);

        let mut child = parent.try_split().unwrap();
        assert_eq!(child.next_generation(), 3);

        updatable.update(CountingEngine::unbounded("b"));
        assert_eq!(ticks(child.by_ref().take(2)), vec![("b", 3), ("b", 4)]);
        assert_eq!(ticks(parent.by_ref().take(1)), vec![("b", 3)]);
    }

    #[test]
    fn test_concurrent_updates_keep_order() {
        let updatable: UpdatableEngine<Tick> =
            UpdatableEngine::new(CountingEngine::unbounded("e0"));
        let names = ["e1", "e2", "e3", "e4", "e5"];
        let done = AtomicBool::new(false);

        let pulled = thread::scope(|scope| {
            let reader = scope.spawn(|| {
                let stream = updatable.cursor(EvolutionStart::empty());
                let out = ticks(stream.take(2_000));
                done.store(true, Ordering::SeqCst);
                out
            });
            for name in names {
                if done.load(Ordering::SeqCst) {
                    break;
                }
                updatable.update(CountingEngine::unbounded(name));
                thread::yield_now();
            }
            reader.join().expect("reader thread panicked")
        });

        // No generation lost, duplicated or reordered.
        let expected: Vec<u64> = (1..=2_000).collect();
        assert_eq!(pulled.iter().map(|t| t.1).collect::<Vec<_>>(), expected);

        // Engine labels only ever move forward.
        let order = |name: &str| name[1..].parse::<usize>().unwrap();
        for pair in pulled.windows(2) {
            assert!(order(pair[0].0) <= order(pair[1].0), "{pair:?}");
        }
    }
}
