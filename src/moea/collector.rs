//! Folding evolution streams into a bounded Pareto set.

use super::{pareto, Optimize, ParetoFront, SizeRange, Vector};
use crate::engine::{EngineError, EvolutionResult};
use std::cmp::Ordering;
use std::sync::Arc;

type Compare<V> = dyn Fn(&V, &V) -> Ordering + Send + Sync;
type CompareAt<V> = dyn Fn(&V, &V, usize) -> Ordering + Send + Sync;
type DistanceAt<V> = dyn Fn(&V, &V, usize) -> f64 + Send + Sync;
type Dimension<V> = dyn Fn(&V) -> usize + Send + Sync;

/// Objective measures on individuals, in maximization form.
struct Measures<I> {
    dominance: Box<Compare<I>>,
    comparator: Box<CompareAt<I>>,
    distance: Box<DistanceAt<I>>,
    dimension: Box<Dimension<I>>,
    equals: Box<dyn Fn(&I, &I) -> bool + Send + Sync>,
}

impl<I> Measures<I> {
    fn dominance(&self, optimize: Optimize, a: &I, b: &I) -> Ordering {
        match optimize {
            Optimize::Maximum => (self.dominance)(a, b),
            Optimize::Minimum => (self.dominance)(b, a),
        }
    }

    fn compare(&self, optimize: Optimize, a: &I, b: &I, index: usize) -> Ordering {
        match optimize {
            Optimize::Maximum => (self.comparator)(a, b, index),
            Optimize::Minimum => (self.comparator)(b, a, index),
        }
    }
}

/// Accumulates a bounded, diversity-pruned Pareto set over many generations.
///
/// For every [`EvolutionResult`] added, the front of its population is
/// merged into a running [`ParetoFront`]. Whenever the archive grows above
/// `size.max()` it is trimmed back to exactly `size.min()` members by
/// crowding distance, keeping the boundary points of the trade-off curve.
///
/// Partial sets built independently (e.g. on different threads) combine
/// with [`merge`](Self::merge), which unions both archives and trims again.
///
/// # Example
///
/// ```
/// use u_evostream::engine::EvolutionResult;
/// use u_evostream::moea::{ParetoSet, SizeRange};
///
/// let mut set = ParetoSet::new(SizeRange::new(2, 3).unwrap(), |v: &Vec<f64>| v);
///
/// set.add(&EvolutionResult::new(vec![vec![0.0, 4.0], vec![1.0, 1.0]], 1));
/// set.add(&EvolutionResult::new(vec![vec![2.0, 2.0], vec![4.0, 0.0]], 2));
/// // (1, 1) is dominated by (2, 2); three points remain.
/// assert_eq!(set.len(), 3);
///
/// set.add(&EvolutionResult::new(vec![vec![3.0, 1.0]], 3));
/// // Four points exceed the maximum: trimmed to two, the extremes.
/// assert_eq!(set.finish(), vec![vec![0.0, 4.0], vec![4.0, 0.0]]);
/// ```
pub struct ParetoSet<I> {
    size: SizeRange,
    optimize: Optimize,
    measures: Arc<Measures<I>>,
    front: ParetoFront<I>,
}

impl<I: PartialEq + 'static> ParetoSet<I> {
    /// Creates a set for individuals with [`Vector`] fitness.
    pub fn new<V, F>(size: SizeRange, fitness: F) -> Self
    where
        V: Vector + ?Sized + 'static,
        F: Fn(&I) -> &V + Send + Sync + 'static,
    {
        let fitness = Arc::new(fitness);
        let (f1, f2, f3, f4) = (
            Arc::clone(&fitness),
            Arc::clone(&fitness),
            Arc::clone(&fitness),
            fitness,
        );
        Self::from_measures(
            size,
            Measures {
                dominance: Box::new(move |a: &I, b: &I| f1(a).dominance(f1(b))),
                comparator: Box::new(move |a: &I, b: &I, i| f2(a).compare(f2(b), i)),
                distance: Box::new(move |a: &I, b: &I, i| f3(a).distance(f3(b), i)),
                dimension: Box::new(move |a: &I| f4(a).length()),
                equals: Box::new(|a: &I, b: &I| a == b),
            },
        )
    }

    /// Creates a set with custom objective measures.
    ///
    /// All measures are given in maximization form: `dominance(a, b)` is
    /// `Greater` when `a` dominates `b`, and `comparator(a, b, m)` is
    /// `Greater` when `a` is better in objective `m`.
    pub fn with_measures<D, C, Dist, M>(
        size: SizeRange,
        dominance: D,
        comparator: C,
        distance: Dist,
        dimension: M,
    ) -> Self
    where
        D: Fn(&I, &I) -> Ordering + Send + Sync + 'static,
        C: Fn(&I, &I, usize) -> Ordering + Send + Sync + 'static,
        Dist: Fn(&I, &I, usize) -> f64 + Send + Sync + 'static,
        M: Fn(&I) -> usize + Send + Sync + 'static,
    {
        Self::from_measures(
            size,
            Measures {
                dominance: Box::new(dominance),
                comparator: Box::new(comparator),
                distance: Box::new(distance),
                dimension: Box::new(dimension),
                equals: Box::new(|a: &I, b: &I| a == b),
            },
        )
    }
}

impl<I: 'static> ParetoSet<I> {
    fn from_measures(size: SizeRange, measures: Measures<I>) -> Self {
        let measures = Arc::new(measures);
        Self {
            size,
            optimize: Optimize::Maximum,
            front: Self::front_for(&measures, Optimize::Maximum),
            measures,
        }
    }

    fn front_for(measures: &Arc<Measures<I>>, optimize: Optimize) -> ParetoFront<I> {
        let (dominance, equals) = (Arc::clone(measures), Arc::clone(measures));
        ParetoFront::with_equals(
            move |a: &I, b: &I| dominance.dominance(optimize, a, b),
            move |a: &I, b: &I| (equals.equals)(a, b),
        )
    }

    /// Sets the optimization direction.
    pub fn with_optimize(mut self, optimize: Optimize) -> Self {
        if optimize != self.optimize {
            let members = std::mem::replace(
                &mut self.front,
                Self::front_for(&self.measures, optimize),
            );
            self.optimize = optimize;
            self.front.add_all(members);
            self.trim();
        }
        self
    }

    /// An empty set with the same configuration.
    pub fn empty_like(&self) -> Self {
        Self {
            size: self.size,
            optimize: self.optimize,
            measures: Arc::clone(&self.measures),
            front: self.front.empty_like(),
        }
    }

    /// Adds the front of `result`'s population.
    pub fn add(&mut self, result: &EvolutionResult<I>)
    where
        I: Clone,
    {
        self.add_population(result.population.iter().cloned());
    }

    /// Adds the front of a population.
    pub fn add_population<P>(&mut self, population: P)
    where
        P: IntoIterator<Item = I>,
    {
        let (measures, optimize) = (&self.measures, self.optimize);
        let front = pareto::front_by(population, |a: &I, b: &I| measures.dominance(optimize, a, b));
        self.front.add_all(front);
        self.trim();
    }

    /// Unions `other` into this set and trims.
    pub fn merge(mut self, other: ParetoSet<I>) -> Self {
        self.front.merge(other.front);
        self.trim();
        self
    }

    fn trim(&mut self) {
        if self.front.len() > self.size.max() {
            let (measures, optimize) = (&self.measures, self.optimize);
            self.front.trim(
                self.size.min(),
                |a: &I, b: &I, i| measures.compare(optimize, a, b, i),
                |a: &I, b: &I, i| (measures.distance)(a, b, i),
                |a: &I| (measures.dimension)(a),
            );
        }
    }

    /// Bounds the archive is trimmed to.
    pub fn size_range(&self) -> SizeRange {
        self.size
    }

    /// Optimization direction of every objective.
    pub fn optimize(&self) -> Optimize {
        self.optimize
    }

    /// Number of archived individuals.
    pub fn len(&self) -> usize {
        self.front.len()
    }

    /// Whether nothing has been archived.
    pub fn is_empty(&self) -> bool {
        self.front.is_empty()
    }

    /// Archived individuals, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, I> {
        self.front.iter()
    }

    /// The archived individuals.
    pub fn finish(self) -> Vec<I> {
        self.front.into_vec()
    }
}

/// Folds an evolution stream into `set` and returns the Pareto set.
///
/// Stops at the first `Err` item and returns it.
///
/// # Example
///
/// ```
/// use u_evostream::engine::{
///     self, EvolutionEngine, EvolutionResult, EvolutionStart, EvolutionStreamExt, Limits,
/// };
/// use u_evostream::moea::{to_pareto_set, ParetoSet, SizeRange};
///
/// // Every generation g contributes the points (g, 10 - g) and (0, 0).
/// let engine = engine::from_fn(|start: EvolutionStart<Vec<i32>>| {
///     engine::boxed((start.generation..).map(|g| {
///         let g = g as i32;
///         Ok(EvolutionResult::new(vec![vec![g, 10 - g], vec![0, 0]], g as u64))
///     }))
/// });
///
/// let stream = engine
///     .stream(EvolutionStart::empty())
///     .limit_by(Limits::by_fixed_generation(9));
/// let set = to_pareto_set(stream, ParetoSet::new(SizeRange::new(3, 5).unwrap(), |v: &Vec<i32>| v))
///     .unwrap();
/// assert!(set.len() <= 5);
/// assert!(set.contains(&vec![1, 9]) && set.contains(&vec![9, 1]));
/// ```
pub fn to_pareto_set<I, S>(stream: S, mut set: ParetoSet<I>) -> Result<Vec<I>, EngineError>
where
    I: Clone + 'static,
    S: IntoIterator<Item = Result<EvolutionResult<I>, EngineError>>,
{
    for result in stream {
        set.add(&result?);
    }
    Ok(set.finish())
}

#[cfg(feature = "parallel")]
mod parallel {
    use super::ParetoSet;
    use crate::engine::EvolutionResult;
    use rayon::prelude::*;

    impl<I: Clone + Send + Sync + 'static> ParetoSet<I> {
        /// Folds results in parallel and merges the partial sets.
        ///
        /// The current members of `self` are kept.
        pub fn par_collect<R>(self, results: R) -> Vec<I>
        where
            R: IntoParallelIterator<Item = EvolutionResult<I>>,
        {
            let collected = results
                .into_par_iter()
                .fold(
                    || self.empty_like(),
                    |mut set, result| {
                        set.add_population(result.population);
                        set
                    },
                )
                .reduce(|| self.empty_like(), ParetoSet::merge);
            self.merge(collected).finish()
        }
    }
}
