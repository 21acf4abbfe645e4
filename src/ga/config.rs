//! GA configuration.
//!
//! [`GaConfig`] holds the parameters of one generation step. How many
//! generations run is not a configuration concern: truncate the stream with
//! a [limit](crate::engine::Limits) instead.

use super::selection::Selection;
use crate::engine::EngineError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Invalid GA parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GaConfigError {
    #[error("population_size must be at least 2, got {0}")]
    PopulationTooSmall(usize),

    #[error(
        "elite_ratio {ratio} leaves no room for offspring in a population of {population_size}"
    )]
    EliteFillsPopulation { ratio: f64, population_size: usize },

    #[error("{name} must lie in [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
}

impl From<GaConfigError> for EngineError {
    fn from(err: GaConfigError) -> Self {
        EngineError::Other(Box::new(err))
    }
}

/// Crossover and mutation probabilities.
///
/// This is the part of a GA that [`VarianceAdaptive`] swaps when it
/// switches between exploring and exploiting.
///
/// [`VarianceAdaptive`]: crate::compose::VarianceAdaptive
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Alterer {
    /// Probability of recombining a pair of parents.
    ///
    /// When crossover is skipped, a clone of the first parent is used.
    pub crossover_rate: f64,

    /// Probability of mutating an offspring.
    pub mutation_rate: f64,
}

impl Default for Alterer {
    fn default() -> Self {
        Self {
            crossover_rate: 0.9,
            mutation_rate: 0.1,
        }
    }
}

impl Alterer {
    /// Creates an alterer, clamping both rates into `[0, 1]`.
    ///
    /// NaN rates become `0.0`.
    pub fn new(crossover_rate: f64, mutation_rate: f64) -> Self {
        Self {
            crossover_rate: clamp_rate(crossover_rate),
            mutation_rate: clamp_rate(mutation_rate),
        }
    }

    /// High mutation, moderate crossover: spreads a converged population.
    pub fn diversify() -> Self {
        Self::new(0.6, 0.5)
    }

    /// Heavy crossover, rare mutation: refines around the current best.
    pub fn narrow() -> Self {
        Self::new(0.95, 0.02)
    }

    fn validate(&self) -> Result<(), GaConfigError> {
        for (name, value) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GaConfigError::RateOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

/// Configuration for a [`GaEngine`](super::GaEngine).
///
/// # Defaults
///
/// ```
/// use u_evostream::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.alterer.crossover_rate, 0.9);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evostream::ga::{Alterer, GaConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_selection(Selection::Tournament(5))
///     .with_elite_ratio(0.1)
///     .with_alterer(Alterer::narrow());
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaConfig {
    /// Number of individuals in every produced generation.
    ///
    /// Start populations smaller than this are topped up with fresh
    /// individuals.
    pub population_size: usize,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Fraction of the population copied unchanged into the next generation.
    pub elite_ratio: f64,

    /// Crossover and mutation rates.
    pub alterer: Alterer,

    /// Evaluate offspring with rayon.
    ///
    /// Only honored when the `parallel` feature is enabled.
    pub parallel: bool,

    /// Random seed for reproducible streams. `None` draws one per stream.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            selection: Selection::default(),
            elite_ratio: 0.1,
            alterer: Alterer::default(),
            parallel: true,
            seed: None,
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Equivalent to `.with_selection(Selection::Tournament(k))`.
    pub fn with_tournament_size(self, k: usize) -> Self {
        self.with_selection(Selection::Tournament(k))
    }

    /// Sets the elite ratio, clamped into `[0, 1]`.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = clamp_rate(ratio);
        self
    }

    pub fn with_alterer(mut self, alterer: Alterer) -> Self {
        self.alterer = alterer;
        self
    }

    /// Sets the crossover rate, clamped into `[0, 1]`.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.alterer.crossover_rate = clamp_rate(rate);
        self
    }

    /// Sets the mutation rate, clamped into `[0, 1]`.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.alterer.mutation_rate = clamp_rate(rate);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of elites carried over each generation.
    pub fn elite_count(&self) -> usize {
        (self.population_size as f64 * self.elite_ratio) as usize
    }

    /// Checks every parameter.
    pub fn validate(&self) -> Result<(), GaConfigError> {
        if self.population_size < 2 {
            return Err(GaConfigError::PopulationTooSmall(self.population_size));
        }
        if !(0.0..=1.0).contains(&self.elite_ratio) || self.elite_count() >= self.population_size
        {
            return Err(GaConfigError::EliteFillsPopulation {
                ratio: self.elite_ratio,
                population_size: self.population_size,
            });
        }
        self.alterer.validate()
    }
}
