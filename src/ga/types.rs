//! Problem-side traits of the GA engine.
//!
//! A [`GaProblem`] knows how to create, evaluate and vary its
//! [`Individual`]s; the engine only decides who breeds with whom.

use rand::Rng;

/// Fitness value of a single-objective problem.
///
/// Lower is better (minimization). For maximization, negate the score.
pub trait Fitness: PartialOrd + Copy + Send + Sync + std::fmt::Debug + 'static {
    /// Fitness of an individual that has not been evaluated yet.
    fn worst() -> Self;

    /// Score used by selection, limits and variance statistics.
    fn to_f64(self) -> f64;
}

impl Fitness for f64 {
    fn worst() -> Self {
        f64::INFINITY
    }

    fn to_f64(self) -> f64 {
        self
    }
}

impl Fitness for f32 {
    fn worst() -> Self {
        f32::INFINITY
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// A candidate solution that stores its own fitness.
///
/// Individuals are moved between engines as part of evolution results, so
/// they must be owned (`'static`) and thread-safe.
///
/// ```
/// use u_evostream::ga::Individual;
///
/// #[derive(Clone)]
/// struct Tour {
///     order: Vec<usize>,
///     length: f64,
/// }
///
/// impl Individual for Tour {
///     type Fitness = f64;
///     fn fitness(&self) -> f64 { self.length }
///     fn set_fitness(&mut self, f: f64) { self.length = f; }
/// }
/// ```
pub trait Individual: Clone + Send + Sync + 'static {
    type Fitness: Fitness;

    fn fitness(&self) -> Self::Fitness;

    /// Called by the engine after evaluation.
    fn set_fitness(&mut self, fitness: Self::Fitness);
}

/// Domain logic plugged into a [`GaEngine`](super::GaEngine).
///
/// The engine shares one problem between all streams it creates, and may
/// evaluate in parallel, hence `Send + Sync + 'static`.
pub trait GaProblem: Send + Sync + 'static {
    type Individual: Individual;

    /// Creates a random, valid individual.
    ///
    /// Used for the initial population and to top up start populations
    /// that are smaller than the configured size.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Computes the fitness of `individual`. Lower is better.
    fn evaluate(&self, individual: &Self::Individual) -> <Self::Individual as Individual>::Fitness;

    /// Recombines two parents into one or more children.
    ///
    /// Defaults to a clone of `parent1`.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        _parent2: &Self::Individual,
        _rng: &mut R,
    ) -> Vec<Self::Individual> {
        vec![parent1.clone()]
    }

    /// Perturbs `individual` in place. Defaults to a no-op.
    fn mutate<R: Rng>(&self, _individual: &mut Self::Individual, _rng: &mut R) {}
}
