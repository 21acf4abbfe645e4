//! Deterministic engines shared by the unit tests.

use super::{EngineError, EvolutionEngine, EvolutionResult, EvolutionStart, EvolutionStream};

/// Individual used by the test engines: the producing engine's name and the
/// generation it was produced in.
pub(crate) type Tick = (&'static str, u64);

/// Emits one result per generation, continuing the start's counter.
pub(crate) struct CountingEngine {
    name: &'static str,
    per_stream: Option<u64>,
}

impl CountingEngine {
    /// Streams of exactly `n` generations.
    pub(crate) fn new(name: &'static str, n: u64) -> Self {
        Self {
            name,
            per_stream: Some(n),
        }
    }

    /// Streams that never end.
    pub(crate) fn unbounded(name: &'static str) -> Self {
        Self {
            name,
            per_stream: None,
        }
    }
}

impl EvolutionEngine<Tick> for CountingEngine {
    fn stream(&self, start: EvolutionStart<Tick>) -> EvolutionStream<Tick> {
        let name = self.name;
        let first = start.generation;
        let generations: Box<dyn Iterator<Item = u64> + Send> = match self.per_stream {
            Some(n) => Box::new(first..first + n),
            None => Box::new(first..),
        };
        Box::new(generations.map(move |g| Ok(EvolutionResult::new(vec![(name, g)], g))))
    }
}

/// Emits `ok` results, then one error, then keeps emitting results.
///
/// The results after the error must never reach a consumer of a composed
/// stream.
pub(crate) struct FailingEngine {
    ok: u64,
}

impl FailingEngine {
    pub(crate) fn after(ok: u64) -> Self {
        Self { ok }
    }
}

impl EvolutionEngine<Tick> for FailingEngine {
    fn stream(&self, start: EvolutionStart<Tick>) -> EvolutionStream<Tick> {
        let first = start.generation;
        let ok = self.ok;
        Box::new((first..first + ok + 3).map(move |g| {
            if g == first + ok {
                Err(EngineError::evaluation(g, "boom"))
            } else {
                Ok(EvolutionResult::new(vec![("failing", g)], g))
            }
        }))
    }
}

/// Generation numbers of all `Ok` items.
pub(crate) fn generations(
    stream: impl Iterator<Item = Result<EvolutionResult<Tick>, EngineError>>,
) -> Vec<u64> {
    stream.map(|r| r.expect("unexpected engine error").generation).collect()
}

/// Every tick of every result, in delivery order.
pub(crate) fn ticks(
    stream: impl Iterator<Item = Result<EvolutionResult<Tick>, EngineError>>,
) -> Vec<Tick> {
    stream
        .flat_map(|r| r.expect("unexpected engine error").population)
        .collect()
}
