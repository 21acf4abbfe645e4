//! Variance-driven alterer switching.
//!
//! [`VarianceAdaptive`] is a ready-made engine function for
//! [`AdaptiveEngine`]. It rebuilds an engine from a template with one of two
//! alterers, depending on how spread out the fitness of the last population
//! was:
//!
//! | current mode | observed variance  | next mode   |
//! |--------------|--------------------|-------------|
//! | `Narrow`     | `< lower`          | `Diversify` |
//! | `Diversify`  | `> upper`          | `Narrow`    |
//! | any          | otherwise          | unchanged   |
//!
//! Between the bounds nothing changes, so a population hovering around a
//! single threshold does not make the engine flip back and forth.

use super::AdaptiveEngine;
use crate::engine::{self, EngineHandle, EvolutionResult, Limited};
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;

/// Builds an engine for a given alterer.
///
/// A template is the part of an engine configuration that stays fixed while
/// [`VarianceAdaptive`] swaps alterers.
pub trait EngineTemplate: Clone + Send + Sync + 'static {
    /// Individual type of the built engines.
    type Individual: Clone + Send + 'static;
    /// Alteration configuration handed to [`build`](EngineTemplate::build).
    type Alterer: Clone + Send + Sync + 'static;

    /// Builds an engine that alters with `alterer`.
    fn build(&self, alterer: &Self::Alterer) -> EngineHandle<Self::Individual>;
}

/// Mode of a [`VarianceAdaptive`] engine function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdaptiveMode {
    /// Explore: the population has converged too far.
    Diversify,
    /// Exploit: the population is spread out enough.
    Narrow,
}

/// Sample variance of the fitness values of `population`.
///
/// Returns `0.0` for populations with fewer than two individuals.
///
/// ```
/// use u_evostream::compose::population_variance;
///
/// let v = population_variance(&[1.0, 2.0, 3.0, 4.0], |x: &f64| *x);
/// assert!((v - 5.0 / 3.0).abs() < 1e-12);
/// assert_eq!(population_variance(&[7.0], |x: &f64| *x), 0.0);
/// ```
pub fn population_variance<I, F>(population: &[I], fitness: F) -> f64
where
    F: Fn(&I) -> f64,
{
    let n = population.len();
    if n < 2 {
        return 0.0;
    }

    // Welford's online update.
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (k, individual) in population.iter().enumerate() {
        let x = fitness(individual);
        let delta = x - mean;
        mean += delta / (k + 1) as f64;
        m2 += delta * (x - mean);
    }
    m2 / (n - 1) as f64
}

type FitnessFn<I> = dyn Fn(&I) -> f64 + Send + Sync;

/// Engine function switching between a diversifying and a narrowing
/// alterer with hysteresis.
///
/// The template is cloned once when the function is created; later changes
/// to the caller's template do not affect running streams. Every built
/// engine is limited to [`segment_length`](Self::with_segment_length)
/// generations, after which the variance is checked again.
///
/// The mode and the cached engine belong to a [`VarianceSelector`]; every
/// stream of [`engine`](Self::engine) owns its own selector and starts out
/// diversifying.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use u_evostream::compose::{AdaptiveMode, EngineTemplate, VarianceAdaptive};
/// use u_evostream::engine::{self, EngineHandle, EvolutionEngine, EvolutionResult, EvolutionStart};
///
/// // Engines whose population is [0, spread], repeated every generation.
/// #[derive(Clone)]
/// struct Spread;
///
/// impl EngineTemplate for Spread {
///     type Individual = f64;
///     type Alterer = f64;
///
///     fn build(&self, spread: &f64) -> EngineHandle<f64> {
///         let spread = *spread;
///         engine::handle(engine::from_fn(move |start: EvolutionStart<f64>| {
///             engine::boxed((start.generation..)
///                 .map(move |g| Ok(EvolutionResult::new(vec![0.0, spread], g))))
///         }))
///     }
/// }
///
/// let adaptive = Arc::new(
///     VarianceAdaptive::new(&Spread, 10.0, 0.1, |x: &f64| *x)
///         .with_bounds(0.5, 2.0)
///         .with_segment_length(2),
/// );
/// let spreads: Vec<f64> = adaptive
///     .engine()
///     .stream(EvolutionStart::empty())
///     .take(6)
///     .map(|r| r.unwrap().population[1])
///     .collect();
///
/// assert_eq!(spreads, vec![10.0, 10.0, 0.1, 0.1, 10.0, 10.0]);
/// assert_eq!(adaptive.mode(), AdaptiveMode::Diversify);
/// ```
pub struct VarianceAdaptive<T: EngineTemplate> {
    template: T,
    diversify: T::Alterer,
    narrow: T::Alterer,
    fitness: Arc<FitnessFn<T::Individual>>,
    lower: f64,
    upper: f64,
    segment_length: u64,
    last_mode: Mutex<AdaptiveMode>,
}

impl<T: EngineTemplate> VarianceAdaptive<T> {
    /// Default lower variance bound.
    pub const DEFAULT_LOWER: f64 = 0.05;
    /// Default upper variance bound.
    pub const DEFAULT_UPPER: f64 = 0.5;
    /// Default number of generations per segment.
    pub const DEFAULT_SEGMENT_LENGTH: u64 = 10;

    /// Creates the engine function from a copy of `template`.
    pub fn new<F>(template: &T, diversify: T::Alterer, narrow: T::Alterer, fitness: F) -> Self
    where
        F: Fn(&T::Individual) -> f64 + Send + Sync + 'static,
    {
        Self {
            template: template.clone(),
            diversify,
            narrow,
            fitness: Arc::new(fitness),
            lower: Self::DEFAULT_LOWER,
            upper: Self::DEFAULT_UPPER,
            segment_length: Self::DEFAULT_SEGMENT_LENGTH,
            last_mode: Mutex::new(AdaptiveMode::Diversify),
        }
    }

    /// Sets the variance bounds. Inverted bounds are swapped.
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        let (lower, upper) = if lower <= upper {
            (lower, upper)
        } else {
            (upper, lower)
        };
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// Sets the number of generations per segment (at least 1).
    pub fn with_segment_length(mut self, generations: u64) -> Self {
        self.segment_length = generations.max(1);
        self
    }

    /// Mode chosen by the most recent selection of any stream.
    pub fn mode(&self) -> AdaptiveMode {
        *self.last_mode.lock()
    }

    /// Creates a selector with fresh hysteresis state.
    pub fn selector(self: &Arc<Self>) -> VarianceSelector<T> {
        VarianceSelector {
            adaptive: Arc::clone(self),
            mode: AdaptiveMode::Diversify,
            engine: None,
        }
    }

    fn next_mode(
        &self,
        current: AdaptiveMode,
        previous: Option<&EvolutionResult<T::Individual>>,
    ) -> AdaptiveMode {
        let Some(result) = previous else {
            return AdaptiveMode::Diversify;
        };
        let variance = population_variance(&result.population, |i| (self.fitness)(i));
        match current {
            AdaptiveMode::Narrow if variance < self.lower => {
                info!(
                    "variance {variance:.6} below {} at generation {}, diversifying",
                    self.lower, result.generation
                );
                AdaptiveMode::Diversify
            }
            AdaptiveMode::Diversify if variance > self.upper => {
                info!(
                    "variance {variance:.6} above {} at generation {}, narrowing",
                    self.upper, result.generation
                );
                AdaptiveMode::Narrow
            }
            mode => mode,
        }
    }

    fn build(&self, mode: AdaptiveMode) -> EngineHandle<T::Individual> {
        let alterer = match mode {
            AdaptiveMode::Diversify => &self.diversify,
            AdaptiveMode::Narrow => &self.narrow,
        };
        engine::handle(Limited::generations(
            self.template.build(alterer),
            self.segment_length,
        ))
    }

    /// Wraps this function into an [`AdaptiveEngine`] with one selector per
    /// stream.
    pub fn engine(self: &Arc<Self>) -> AdaptiveEngine<T::Individual> {
        let this = Arc::clone(self);
        AdaptiveEngine::per_stream(move || {
            let mut selector = this.selector();
            move |previous: Option<&EvolutionResult<T::Individual>>| selector.select(previous)
        })
    }
}

/// Hysteresis state of one stream of a [`VarianceAdaptive`] function.
pub struct VarianceSelector<T: EngineTemplate> {
    adaptive: Arc<VarianceAdaptive<T>>,
    mode: AdaptiveMode,
    engine: Option<EngineHandle<T::Individual>>,
}

impl<T: EngineTemplate> VarianceSelector<T> {
    /// The mode of this selector.
    pub fn mode(&self) -> AdaptiveMode {
        self.mode
    }

    /// Returns the engine for the segment following `previous`.
    ///
    /// `None` starts over in diversify mode. The cached engine is returned
    /// unchanged unless the mode switches.
    pub fn select(
        &mut self,
        previous: Option<&EvolutionResult<T::Individual>>,
    ) -> EngineHandle<T::Individual> {
        let mode = self.adaptive.next_mode(self.mode, previous);
        *self.adaptive.last_mode.lock() = mode;
        if mode != self.mode {
            self.mode = mode;
            self.engine = None;
        }
        if let Some(engine) = &self.engine {
            return Arc::clone(engine);
        }
        let built = self.adaptive.build(mode);
        self.engine = Some(Arc::clone(&built));
        built
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, EvolutionEngine, EvolutionStart};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Builds engines repeating the population `[0, spread]`, counting builds.
    #[derive(Clone)]
    struct Spread {
        builds: Arc<AtomicUsize>,
    }

    impl Spread {
        fn new() -> Self {
            Self {
                builds: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn builds(&self) -> usize {
            self.builds.load(Ordering::SeqCst)
        }
    }

    impl EngineTemplate for Spread {
        type Individual = f64;
        type Alterer = f64;

        fn build(&self, spread: &f64) -> EngineHandle<f64> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            let spread = *spread;
            engine::handle(engine::from_fn(move |start: EvolutionStart<f64>| {
                engine::boxed(
                    (start.generation..)
                        .map(move |g| Ok(EvolutionResult::new(vec![0.0, spread], g))),
                )
            }))
        }
    }

    fn result(population: Vec<f64>) -> EvolutionResult<f64> {
        EvolutionResult::new(population, 1)
    }

    fn adaptive(template: &Spread) -> VarianceAdaptive<Spread> {
        VarianceAdaptive::new(template, 10.0, 0.1, |x: &f64| *x).with_bounds(1.0, 4.0)
    }

    #[test]
    fn test_population_variance() {
        assert_eq!(population_variance::<f64, _>(&[], |x| *x), 0.0);
        assert_eq!(population_variance(&[3.0, 3.0, 3.0], |x: &f64| *x), 0.0);
        let v = population_variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], |x: &f64| *x);
        assert!((v - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_starts_diversifying() {
        let template = Spread::new();
        let adaptive = Arc::new(adaptive(&template));
        let mut selector = adaptive.selector();
        selector.select(None);
        assert_eq!(selector.mode(), AdaptiveMode::Diversify);
        assert_eq!(adaptive.mode(), AdaptiveMode::Diversify);
        assert_eq!(template.builds(), 1);
    }

    #[test]
    fn test_hysteresis() {
        let template = Spread::new();
        let adaptive = Arc::new(adaptive(&template));
        let mut selector = adaptive.selector();
        let first = selector.select(None);

        // Low variance while diversifying: no switch, same engine.
        let kept = selector.select(Some(&result(vec![0.0, 0.1])));
        assert!(Arc::ptr_eq(&first, &kept));
        assert_eq!(selector.mode(), AdaptiveMode::Diversify);

        // Between the bounds: no switch.
        selector.select(Some(&result(vec![0.0, 2.0])));
        assert_eq!(selector.mode(), AdaptiveMode::Diversify);

        // Above the upper bound: narrow.
        selector.select(Some(&result(vec![0.0, 4.0])));
        assert_eq!(selector.mode(), AdaptiveMode::Narrow);
        assert_eq!(adaptive.mode(), AdaptiveMode::Narrow);

        // High variance while narrowing: stays narrow.
        selector.select(Some(&result(vec![0.0, 10.0])));
        assert_eq!(selector.mode(), AdaptiveMode::Narrow);

        // Below the lower bound: diversify again.
        selector.select(Some(&result(vec![0.0, 1.0])));
        assert_eq!(selector.mode(), AdaptiveMode::Diversify);

        assert_eq!(template.builds(), 3);
    }

    #[test]
    fn test_selectors_are_independent() {
        let template = Spread::new();
        let adaptive = Arc::new(adaptive(&template));
        let mut narrowing = adaptive.selector();
        narrowing.select(None);
        narrowing.select(Some(&result(vec![0.0, 4.0])));
        assert_eq!(narrowing.mode(), AdaptiveMode::Narrow);

        let mut fresh = adaptive.selector();
        fresh.select(None);
        assert_eq!(fresh.mode(), AdaptiveMode::Diversify);
        assert_eq!(narrowing.mode(), AdaptiveMode::Narrow);
    }

    #[test]
    fn test_template_copied_once() {
        let template = Spread::new();
        let adaptive = Arc::new(adaptive(&template));
        drop(template);
        assert_eq!(adaptive.template.builds(), 0);
        adaptive.selector().select(None);
        assert_eq!(adaptive.template.builds(), 1);
    }

    #[test]
    fn test_inverted_bounds_are_swapped() {
        let adaptive = VarianceAdaptive::new(&Spread::new(), 1.0, 0.0, |x: &f64| *x)
            .with_bounds(3.0, 1.0)
            .with_segment_length(0);
        assert_eq!(adaptive.lower, 1.0);
        assert_eq!(adaptive.upper, 3.0);
        assert_eq!(adaptive.segment_length, 1);
    }

    #[test]
    fn test_adaptive_stream_switches_segments() {
        let template = Spread::new();
        let adaptive = Arc::new(adaptive(&template).with_segment_length(3));

        let produced: Vec<(u64, f64)> = adaptive
            .engine()
            .stream(EvolutionStart::empty())
            .take(9)
            .map(|r| {
                let r = r.unwrap();
                (r.generation, r.population[1])
            })
            .collect();

        // Spread 10 has variance 50, spread 0.1 has variance 0.005.
        let expected: Vec<(u64, f64)> = (1..=9)
            .map(|g| (g, if (4..=6).contains(&g) { 0.1 } else { 10.0 }))
            .collect();
        assert_eq!(produced, expected);
    }

    #[test]
    fn test_interleaved_streams_keep_their_mode() {
        // Diversify spreads 10 (variance 50), narrow spreads 1 (variance 0.5),
        // which lies between the bounds.
        let adaptive = Arc::new(
            VarianceAdaptive::new(&Spread::new(), 10.0, 1.0, |x: &f64| *x)
                .with_bounds(0.1, 2.0)
                .with_segment_length(2),
        );
        let engine = adaptive.engine();
        let spread = |r: Option<Result<EvolutionResult<f64>, EngineError>>| {
            r.unwrap().unwrap().population[1]
        };

        let mut a = engine.stream(EvolutionStart::empty());
        let mut spreads: Vec<f64> = (0..3).map(|_| spread(a.next())).collect();

        let mut b = engine.stream(EvolutionStart::empty());
        assert_eq!(spread(b.next()), 10.0);

        spreads.extend((0..3).map(|_| spread(a.next())));
        assert_eq!(spreads, vec![10.0, 10.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(adaptive.mode(), AdaptiveMode::Narrow);
    }
}
