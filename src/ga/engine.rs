//! Generational GA as an evolution engine.
//!
//! Each pulled item is one bred generation: elites are copied, the rest of
//! the population is filled with altered offspring of selected parents, and
//! the offspring are evaluated.

use super::config::{Alterer, GaConfig, GaConfigError};
use super::types::{Fitness, GaProblem, Individual};
use crate::compose::{population_variance, EngineTemplate};
use crate::engine::{
    self, EngineError, EngineHandle, EvolutionEngine, EvolutionInit, EvolutionResult,
    EvolutionStart, EvolutionStream,
};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Genetic algorithm engine.
///
/// Streams never end on their own; truncate them with a
/// [limit](crate::engine::Limits) or compose the engine with a
/// [`Limited`](crate::engine::Limited) wrapper.
///
/// # Example
///
/// ```
/// use rand::Rng;
/// use u_evostream::engine::{EvolutionEngine, EvolutionStart, EvolutionStreamExt, Limits};
/// use u_evostream::ga::{self, Fitness, GaConfig, GaEngine, GaProblem, Individual};
///
/// #[derive(Clone)]
/// struct Point { x: f64, fitness: f64 }
///
/// impl Individual for Point {
///     type Fitness = f64;
///     fn fitness(&self) -> f64 { self.fitness }
///     fn set_fitness(&mut self, f: f64) { self.fitness = f; }
/// }
///
/// // Minimize (x - 3)^2.
/// struct Parabola;
///
/// impl GaProblem for Parabola {
///     type Individual = Point;
///
///     fn create_individual<R: Rng>(&self, rng: &mut R) -> Point {
///         Point { x: rng.random_range(-10.0..10.0), fitness: f64::worst() }
///     }
///
///     fn evaluate(&self, p: &Point) -> f64 {
///         (p.x - 3.0).powi(2)
///     }
///
///     fn mutate<R: Rng>(&self, p: &mut Point, rng: &mut R) {
///         p.x += rng.random_range(-0.5..0.5);
///     }
/// }
///
/// let config = GaConfig::default()
///     .with_population_size(30)
///     .with_mutation_rate(0.5)
///     .with_seed(7)
///     .with_parallel(false);
/// let engine = GaEngine::new(Parabola, config).unwrap();
/// let last = engine
///     .stream(EvolutionStart::empty())
///     .limit_by(Limits::by_fixed_generation(100))
///     .last()
///     .unwrap()
///     .unwrap();
/// assert_eq!(last.generation, 100);
/// assert!(ga::best_fitness(&last) < 0.1);
/// ```
pub struct GaEngine<P: GaProblem> {
    problem: Arc<P>,
    config: GaConfig,
}

impl<P: GaProblem> GaEngine<P> {
    /// Creates an engine after validating `config`.
    pub fn new(problem: P, config: GaConfig) -> Result<Self, GaConfigError> {
        Self::shared(Arc::new(problem), config)
    }

    /// Like [`new`](Self::new), sharing an existing problem.
    pub fn shared(problem: Arc<P>, config: GaConfig) -> Result<Self, GaConfigError> {
        config.validate()?;
        Ok(Self { problem, config })
    }

    /// GA parameters of every stream.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Problem shared by all streams.
    pub fn problem(&self) -> &Arc<P> {
        &self.problem
    }

    fn open(
        &self,
        population: Vec<P::Individual>,
        generation: u64,
        evaluated: usize,
    ) -> EvolutionStream<P::Individual> {
        if let Err(err) = self.config.validate() {
            return engine::boxed(std::iter::once(Err(err.into())));
        }

        // Distinct but reproducible sequences for streams resumed at
        // different generations.
        let seed = match self.config.seed {
            Some(seed) => seed ^ generation.wrapping_mul(0x9E37_79B9_7F4A_7C15),
            None => rand::random(),
        };
        debug!(
            "ga stream opened at generation {generation} with {} of {} individuals",
            population.len(),
            self.config.population_size
        );

        engine::boxed(GaStream {
            problem: Arc::clone(&self.problem),
            config: self.config.clone(),
            rng: StdRng::seed_from_u64(seed),
            population,
            unevaluated: Some(evaluated),
            generation,
            done: false,
        })
    }
}

impl<P: GaProblem> EvolutionEngine<P::Individual> for GaEngine<P> {
    /// Resumes from an evaluated population.
    fn stream(&self, start: EvolutionStart<P::Individual>) -> EvolutionStream<P::Individual> {
        let evaluated = start.population.len();
        self.open(start.population, start.generation, evaluated)
    }

    /// Evaluates the seed individuals before breeding.
    fn stream_init(&self, init: EvolutionInit<P::Individual>) -> EvolutionStream<P::Individual> {
        self.open(init.population, init.generation, 0)
    }
}

struct GaStream<P: GaProblem> {
    problem: Arc<P>,
    config: GaConfig,
    rng: StdRng,
    population: Vec<P::Individual>,
    /// Index of the first individual still to be evaluated before the
    /// first generation is bred. `None` once prepared.
    unevaluated: Option<usize>,
    generation: u64,
    done: bool,
}

impl<P: GaProblem> GaStream<P> {
    fn prepare(&mut self) -> Result<(), EngineError> {
        let Some(from) = self.unevaluated.take() else {
            return Ok(());
        };
        while self.population.len() < self.config.population_size {
            let individual = self.problem.create_individual(&mut self.rng);
            self.population.push(individual);
        }
        evaluate(
            self.problem.as_ref(),
            &mut self.population[from..],
            self.config.parallel,
            self.generation,
        )
    }

    fn breed(&mut self) -> Result<(), EngineError> {
        let config = &self.config;
        let size = config.population_size;
        sort_by_fitness(&mut self.population);

        let elites = config.elite_count().min(self.population.len());
        let mut next: Vec<P::Individual> = Vec::with_capacity(size);
        next.extend_from_slice(&self.population[..elites]);

        while next.len() < size {
            let first = config.selection.select(&self.population, &mut self.rng);
            let second = config.selection.select(&self.population, &mut self.rng);

            let mut children = if self.rng.random_range(0.0..1.0) < config.alterer.crossover_rate {
                self.problem.crossover(
                    &self.population[first],
                    &self.population[second],
                    &mut self.rng,
                )
            } else {
                Vec::new()
            };
            if children.is_empty() {
                children.push(self.population[first].clone());
            }

            for mut child in children.into_iter().take(size - next.len()) {
                if self.rng.random_range(0.0..1.0) < config.alterer.mutation_rate {
                    self.problem.mutate(&mut child, &mut self.rng);
                }
                next.push(child);
            }
        }

        evaluate(
            self.problem.as_ref(),
            &mut next[elites..],
            config.parallel,
            self.generation,
        )?;
        sort_by_fitness(&mut next);
        self.population = next;
        Ok(())
    }
}

impl<P: GaProblem> Iterator for GaStream<P> {
    type Item = Result<EvolutionResult<P::Individual>, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Err(err) = self.prepare().and_then(|()| self.breed()) {
            self.done = true;
            return Some(Err(err));
        }
        let result = EvolutionResult::new(self.population.clone(), self.generation);
        self.generation += 1;
        Some(Ok(result))
    }
}

fn score<I: Individual>(individual: &I) -> f64 {
    individual.fitness().to_f64()
}

fn sort_by_fitness<I: Individual>(population: &mut [I]) {
    population.sort_by(|a, b| score(a).total_cmp(&score(b)));
}

fn evaluate<P: GaProblem>(
    problem: &P,
    individuals: &mut [P::Individual],
    parallel: bool,
    generation: u64,
) -> Result<(), EngineError> {
    let assign = |individual: &mut P::Individual| {
        let fitness = problem.evaluate(individual);
        individual.set_fitness(fitness);
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if parallel {
            individuals.par_iter_mut().for_each(assign);
        } else {
            individuals.iter_mut().for_each(assign);
        }
    }
    #[cfg(not(feature = "parallel"))]
    {
        let _ = parallel;
        individuals.iter_mut().for_each(assign);
    }

    match individuals.iter().position(|i| score(i).is_nan()) {
        Some(index) => Err(EngineError::evaluation(
            generation,
            format!("offspring {index} evaluated to NaN"),
        )),
        None => Ok(()),
    }
}

/// Fixed problem and GA parameters, rebuilt with varying alterers.
///
/// Plugs a GA into [`VarianceAdaptive`](crate::compose::VarianceAdaptive).
pub struct GaTemplate<P: GaProblem> {
    problem: Arc<P>,
    config: GaConfig,
}

impl<P: GaProblem> GaTemplate<P> {
    /// Validates `config`; its alterer is replaced on every build.
    pub fn new(problem: P, config: GaConfig) -> Result<Self, GaConfigError> {
        config.validate()?;
        Ok(Self {
            problem: Arc::new(problem),
            config,
        })
    }

    /// Parameters shared by every built engine.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }
}

impl<P: GaProblem> Clone for GaTemplate<P> {
    fn clone(&self) -> Self {
        Self {
            problem: Arc::clone(&self.problem),
            config: self.config.clone(),
        }
    }
}

impl<P: GaProblem> EngineTemplate for GaTemplate<P> {
    type Individual = P::Individual;
    type Alterer = Alterer;

    /// An alterer with rates outside `[0, 1]` yields engines whose streams
    /// fail with the validation error.
    fn build(&self, alterer: &Alterer) -> EngineHandle<P::Individual> {
        engine::handle(GaEngine {
            problem: Arc::clone(&self.problem),
            config: self.config.clone().with_alterer(*alterer),
        })
    }
}

/// Individual with the lowest fitness, if any.
pub fn best<I: Individual>(result: &EvolutionResult<I>) -> Option<&I> {
    result
        .population
        .iter()
        .min_by(|a, b| score(*a).total_cmp(&score(*b)))
}

/// Lowest fitness score of a result, the score of [`Fitness::worst`] for
/// an empty population.
///
/// Fits the score parameter of the fitness-based [limits](crate::engine::Limits).
pub fn best_fitness<I: Individual>(result: &EvolutionResult<I>) -> f64 {
    best(result).map_or_else(|| <I::Fitness as Fitness>::worst().to_f64(), score)
}

/// Sample variance of the fitness scores of a result.
pub fn fitness_variance<I: Individual>(result: &EvolutionResult<I>) -> f64 {
    population_variance(&result.population, score)
}
