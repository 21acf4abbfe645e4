//! Mutable Pareto front with diversity-preserving trimming.

use super::pareto;
use log::trace;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

type Dominance<T> = dyn Fn(&T, &T) -> Ordering + Send + Sync;
type Equals<T> = dyn Fn(&T, &T) -> bool + Send + Sync;

/// A set of mutually non-dominated elements.
///
/// Every addition keeps the invariant: an element dominated by a member is
/// rejected, and members dominated by a new element are evicted. Elements
/// equal to an existing member are rejected too, so re-adding the same
/// solution generation after generation does not fill the front with
/// copies. Members keep insertion order.
///
/// A front is not synchronized; build partial fronts independently and
/// combine them with [`merge`](Self::merge).
///
/// # Example
///
/// ```
/// use u_evostream::moea::{ParetoFront, Vector};
///
/// let mut front = ParetoFront::new(|a: &Vec<f64>, b: &Vec<f64>| a.dominance(b));
/// front.add(vec![1.0, 1.0]);
/// front.add(vec![2.0, 0.5]);
/// assert_eq!(front.len(), 2);
///
/// // Dominates both members.
/// front.add(vec![3.0, 2.0]);
/// assert_eq!(front.as_slice(), &[vec![3.0, 2.0]]);
///
/// // Dominated, rejected.
/// assert!(!front.add(vec![0.0, 0.0]));
/// ```
pub struct ParetoFront<T> {
    population: Vec<T>,
    dominance: Arc<Dominance<T>>,
    equals: Arc<Equals<T>>,
}

impl<T> ParetoFront<T> {
    /// Creates an empty front using `==` to detect duplicates.
    pub fn new<D>(dominance: D) -> Self
    where
        T: PartialEq + 'static,
        D: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self::with_equals(dominance, |a: &T, b: &T| a == b)
    }

    /// Creates an empty front with a custom duplicate test.
    pub fn with_equals<D, E>(dominance: D, equals: E) -> Self
    where
        D: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
        E: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self {
            population: Vec::new(),
            dominance: Arc::new(dominance),
            equals: Arc::new(equals),
        }
    }

    /// Creates a front from `elements`.
    pub fn from_elements<I, D>(elements: I, dominance: D) -> Self
    where
        T: PartialEq + 'static,
        I: IntoIterator<Item = T>,
        D: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        let mut front = Self::new(dominance);
        front.add_all(elements);
        front
    }

    /// An empty front with the same dominance and duplicate test.
    pub fn empty_like(&self) -> Self {
        Self {
            population: Vec::new(),
            dominance: Arc::clone(&self.dominance),
            equals: Arc::clone(&self.equals),
        }
    }

    /// Adds `element` if no member dominates or equals it.
    ///
    /// Returns whether the front changed: either `element` was inserted or
    /// members were evicted before a dominating or equal member was found.
    pub fn add(&mut self, element: T) -> bool {
        let mut updated = false;
        let mut i = 0;
        while i < self.population.len() {
            let existing = &self.population[i];
            match (self.dominance)(&element, existing) {
                Ordering::Greater => {
                    self.population.remove(i);
                    updated = true;
                }
                Ordering::Less => return updated,
                Ordering::Equal if (self.equals)(&element, existing) => return updated,
                Ordering::Equal => i += 1,
            }
        }

        self.population.push(element);
        true
    }

    /// Adds every element; returns whether the front changed.
    pub fn add_all<I>(&mut self, elements: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        elements
            .into_iter()
            .fold(false, |changed, element| self.add(element) | changed)
    }

    /// Adds every member of `other`.
    pub fn merge(&mut self, other: ParetoFront<T>) -> &mut Self {
        self.add_all(other.population);
        self
    }

    /// Shrinks the front to at most `size` members by crowding distance.
    ///
    /// Members are removed one at a time, always the one with the smallest
    /// crowding distance (see [`pareto::crowding_distance_by`]), and the
    /// distances are recomputed after each removal. Boundary members have
    /// infinite distance and are removed only once nothing else is left.
    ///
    /// Ties are broken deterministically: among members with the same
    /// smallest distance, the one that is greatest under `comparator`
    /// (objective 0 first, then 1, ...) goes first; remaining ties remove
    /// the most recently added member.
    pub fn trim<C, D, M>(
        &mut self,
        size: usize,
        comparator: C,
        distance: D,
        dimension: M,
    ) -> &mut Self
    where
        C: Fn(&T, &T, usize) -> Ordering,
        D: Fn(&T, &T, usize) -> f64,
        M: Fn(&T) -> usize,
    {
        let before = self.population.len();
        while self.population.len() > size {
            let distances =
                pareto::crowding_distance_by(&self.population, &comparator, &distance, &dimension);
            let victim = self.most_crowded(&distances, &comparator, &dimension);
            self.population.remove(victim);
        }
        if before > self.population.len() {
            trace!("pareto front trimmed from {before} to {}", self.population.len());
        }
        self
    }

    fn most_crowded<C, M>(&self, distances: &[f64], comparator: &C, dimension: &M) -> usize
    where
        C: Fn(&T, &T, usize) -> Ordering,
        M: Fn(&T) -> usize,
    {
        let population = &self.population;
        let lexicographic = |a: usize, b: usize| {
            (0..dimension(&population[a]))
                .map(|m| comparator(&population[a], &population[b], m))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        };

        let mut victim = 0;
        for i in 1..distances.len() {
            let better_victim = match distances[i].total_cmp(&distances[victim]) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => lexicographic(i, victim).is_ge(),
            };
            if better_victim {
                victim = i;
            }
        }
        victim
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.population.len()
    }

    /// Whether the front has no members.
    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }

    /// Members in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.population.iter()
    }

    /// Members in insertion order.
    pub fn as_slice(&self) -> &[T] {
        &self.population
    }

    /// Consumes the front, returning its members.
    pub fn into_vec(self) -> Vec<T> {
        self.population
    }
}

impl<T: Clone> Clone for ParetoFront<T> {
    fn clone(&self) -> Self {
        Self {
            population: self.population.clone(),
            dominance: Arc::clone(&self.dominance),
            equals: Arc::clone(&self.equals),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ParetoFront<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParetoFront")
            .field("population", &self.population)
            .finish_non_exhaustive()
    }
}

impl<T> Extend<T> for ParetoFront<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<T> IntoIterator for ParetoFront<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.population.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ParetoFront<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.population.iter()
    }
}
