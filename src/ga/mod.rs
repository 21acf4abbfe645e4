//! Single-objective genetic algorithm.
//!
//! A generic GA exposed as an [`EvolutionEngine`](crate::engine::EvolutionEngine):
//! every pulled item is one generation, so the GA composes with everything
//! in [`crate::compose`] and is truncated with [`crate::engine::Limits`].
//! Users define their problem by implementing [`GaProblem`].
//!
//! # Core Traits
//!
//! - [`Individual`]: a candidate solution carrying its fitness
//! - [`GaProblem`]: creation, evaluation and variation of individuals
//!
//! # Key Types
//!
//! - [`GaEngine`]: the generational engine
//! - [`GaConfig`]: population size, selection, elitism, [`Alterer`]
//! - [`GaTemplate`]: an [`EngineTemplate`](crate::compose::EngineTemplate)
//!   for variance-adaptive alterer switching
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod config;
mod engine;
mod selection;
mod types;

pub use config::{Alterer, GaConfig, GaConfigError};
pub use engine::{best, best_fitness, fitness_variance, GaEngine, GaTemplate};
pub use selection::Selection;
pub use types::{Fitness, GaProblem, Individual};
