//! Data carriers exchanged between evolution engines.
//!
//! An engine consumes an [`EvolutionStart`] (or an [`EvolutionInit`]) and
//! emits one [`EvolutionResult`] per generation. Any result can be turned
//! back into a start, which is what lets one engine resume where another
//! stopped.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Generation counter of a freshly initialized evolution.
pub const FIRST_GENERATION: u64 = 1;

/// Minimal state needed to resume an evolution.
///
/// The population is expected to be evaluated already; an engine may still
/// re-evaluate it when it cannot tell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvolutionStart<I> {
    /// Population the next generation is bred from.
    pub population: Vec<I>,

    /// Generation number of the *next* result produced from this start.
    pub generation: u64,
}

impl<I> EvolutionStart<I> {
    /// Creates a new start state.
    pub fn new(population: Vec<I>, generation: u64) -> Self {
        Self {
            population,
            generation,
        }
    }

    /// A start with no population at the first generation.
    ///
    /// Engines that can create individuals fill the population themselves.
    pub fn empty() -> Self {
        Self::new(Vec::new(), FIRST_GENERATION)
    }
}

impl<I> Default for EvolutionStart<I> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Initial population for a fresh evolution.
///
/// Unlike [`EvolutionStart`], the individuals of an init are not assumed to
/// be evaluated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvolutionInit<I> {
    /// Seed individuals. May be smaller than the engine's population size.
    pub population: Vec<I>,

    /// Generation number of the first result.
    pub generation: u64,
}

impl<I> EvolutionInit<I> {
    /// Creates an init starting at [`FIRST_GENERATION`].
    pub fn new(population: Vec<I>) -> Self {
        Self {
            population,
            generation: FIRST_GENERATION,
        }
    }

    /// Sets the generation of the first result.
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

impl<I> From<EvolutionInit<I>> for EvolutionStart<I> {
    fn from(init: EvolutionInit<I>) -> Self {
        EvolutionStart::new(init.population, init.generation)
    }
}

/// Output of one generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvolutionResult<I> {
    /// Population after this generation.
    pub population: Vec<I>,

    /// Generation number of this result.
    pub generation: u64,
}

impl<I> EvolutionResult<I> {
    /// Creates a new result.
    pub fn new(population: Vec<I>, generation: u64) -> Self {
        Self {
            population,
            generation,
        }
    }

    /// Number of individuals in the population.
    pub fn len(&self) -> usize {
        self.population.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }

    /// Converts this result into the start of the following generation.
    pub fn into_evolution_start(self) -> EvolutionStart<I> {
        EvolutionStart::new(self.population, self.generation + 1)
    }
}

impl<I: Clone> EvolutionResult<I> {
    /// Start state continuing right after this result.
    ///
    /// ```
    /// use u_evostream::engine::EvolutionResult;
    ///
    /// let result = EvolutionResult::new(vec![1, 2, 3], 7);
    /// let start = result.to_evolution_start();
    /// assert_eq!(start.generation, 8);
    /// assert_eq!(start.population, vec![1, 2, 3]);
    /// ```
    pub fn to_evolution_start(&self) -> EvolutionStart<I> {
        EvolutionStart::new(self.population.clone(), self.generation + 1)
    }
}
