//! Pareto dominance, front extraction, ranking and crowding distance.
//!
//! Standalone functions over plain slices, independent of the streaming
//! machinery. Every function comes in two flavours: one for [`Vector`]
//! fitness values, and a `*_by` variant taking the dominance relation (and,
//! for crowding distance, the objective measures) as closures.
//!
//! Dominance is expressed as an [`Ordering`]: `Greater` means the left value
//! dominates the right one, `Less` the reverse, and `Equal` that neither
//! dominates the other (identical or mutually incomparable values).
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - IEEE Transactions on Evolutionary Computation, 6(2), 182-197

use super::{ParetoError, Vector};
use std::cmp::Ordering;

/// Pareto dominance over `dimensions` objectives compared with `compare`.
///
/// Stops at the first objective that makes the two values incomparable.
pub fn dominance_by<V, C>(u: &V, v: &V, dimensions: usize, compare: C) -> Ordering
where
    V: ?Sized,
    C: Fn(&V, &V, usize) -> Ordering,
{
    let mut u_better = false;
    let mut v_better = false;

    for i in 0..dimensions {
        match compare(u, v, i) {
            Ordering::Greater => {
                if v_better {
                    return Ordering::Equal;
                }
                u_better = true;
            }
            Ordering::Less => {
                if u_better {
                    return Ordering::Equal;
                }
                v_better = true;
            }
            Ordering::Equal => {}
        }
    }

    match (u_better, v_better) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Pareto dominance of `u` over `v` (larger is better).
///
/// # Panics
///
/// Panics if the vectors differ in length; use [`try_dominance`] to get an
/// error instead.
///
/// # Example
///
/// ```
/// use std::cmp::Ordering;
/// use u_evostream::moea::pareto::dominance;
///
/// assert_eq!(dominance(&[2.0, 3.0], &[1.0, 3.0]), Ordering::Greater);
/// assert_eq!(dominance(&[1.0, 3.0], &[2.0, 3.0]), Ordering::Less);
/// assert_eq!(dominance(&[1.0, 4.0], &[2.0, 3.0]), Ordering::Equal);
/// assert_eq!(dominance(&[1.0, 4.0], &[1.0, 4.0]), Ordering::Equal);
/// ```
pub fn dominance<V: Vector + ?Sized>(u: &V, v: &V) -> Ordering {
    match try_dominance(u, v) {
        Ok(ordering) => ordering,
        Err(e) => panic!("{e}"),
    }
}

/// Checked Pareto dominance of `u` over `v`.
///
/// # Errors
///
/// [`ParetoError::DimensionMismatch`] if the vectors differ in length.
pub fn try_dominance<V: Vector + ?Sized>(u: &V, v: &V) -> Result<Ordering, ParetoError> {
    let (left, right) = (u.length(), v.length());
    if left != right {
        return Err(ParetoError::DimensionMismatch { left, right });
    }
    Ok(dominance_by(u, v, left, |a, b, i| a.compare(b, i)))
}

/// Non-dominated subset of `elements` under `dominance`.
///
/// Builds the front incrementally: a new element is dropped if a member of
/// the working front dominates it, otherwise it evicts every member it
/// dominates and joins the front. Equal values do not dominate each other,
/// so duplicates are all retained. The result is the same set for every
/// ordering of the input; members keep their relative input order.
///
/// Runs in O(n²) dominance comparisons.
pub fn front_by<T, I, D>(elements: I, dominance: D) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    D: Fn(&T, &T) -> Ordering,
{
    let mut front: Vec<T> = Vec::new();

    'candidates: for candidate in elements {
        let mut i = 0;
        while i < front.len() {
            match dominance(&candidate, &front[i]) {
                Ordering::Less => continue 'candidates,
                Ordering::Greater => {
                    front.remove(i);
                }
                Ordering::Equal => i += 1,
            }
        }
        front.push(candidate);
    }

    front
}

/// Non-dominated subset of a set of fitness vectors.
///
/// # Example
///
/// ```
/// use u_evostream::moea::pareto::front;
///
/// let points = vec![
///     vec![1.0, 5.0],
///     vec![3.0, 3.0],
///     vec![2.0, 2.0], // dominated by (3, 3)
///     vec![5.0, 1.0],
/// ];
/// assert_eq!(
///     front(points),
///     vec![vec![1.0, 5.0], vec![3.0, 3.0], vec![5.0, 1.0]]
/// );
/// ```
pub fn front<V, I>(elements: I) -> Vec<V>
where
    V: Vector,
    I: IntoIterator<Item = V>,
{
    front_by(elements, |a: &V, b: &V| a.dominance(b))
}

/// Result of non-dominated sorting.
///
/// Each element of `ranks` corresponds to the Pareto rank of the element
/// at the same index. Rank 0 is the Pareto front (non-dominated elements).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NondominatedSortResult {
    /// Pareto rank for each element (0 = front).
    pub ranks: Vec<usize>,

    /// Indices grouped by front: `fronts[0]` contains rank-0 indices, etc.
    /// Indices within a front are in ascending order.
    pub fronts: Vec<Vec<usize>>,
}

/// Fast non-dominated sorting under a custom dominance relation.
///
/// # Algorithm (Deb et al., 2002)
///
/// 1. For each pair of elements, determine dominance
/// 2. Elements dominated by no other belong to front 0 (rank 0)
/// 3. Remove front 0, repeat to find subsequent fronts
///
/// Fronts are peeled off iteratively, without recursion.
///
/// # Complexity
///
/// O(n²) dominance comparisons.
pub fn non_dominated_sort_by<T, D>(elements: &[T], dominance: D) -> NondominatedSortResult
where
    D: Fn(&T, &T) -> Ordering,
{
    let n = elements.len();
    if n == 0 {
        return NondominatedSortResult::default();
    }

    let mut domination_count = vec![0usize; n];
    let mut dominates: Vec<Vec<usize>> = vec![Vec::new(); n];

    for i in 0..n {
        for j in (i + 1)..n {
            match dominance(&elements[i], &elements[j]) {
                Ordering::Greater => {
                    dominates[i].push(j);
                    domination_count[j] += 1;
                }
                Ordering::Less => {
                    dominates[j].push(i);
                    domination_count[i] += 1;
                }
                Ordering::Equal => {}
            }
        }
    }

    let mut ranks = vec![0usize; n];
    let mut fronts = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();

    while !current.is_empty() {
        let rank = fronts.len();
        let mut next = Vec::new();

        for &i in &current {
            ranks[i] = rank;
            for &j in &dominates[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next.push(j);
                }
            }
        }

        next.sort_unstable();
        fronts.push(current);
        current = next;
    }

    NondominatedSortResult { ranks, fronts }
}

/// Fast non-dominated sorting of fitness vectors.
///
/// # Panics
///
/// Panics if the vectors differ in length.
///
/// # Example
///
/// ```
/// use u_evostream::moea::pareto::non_dominated_sort;
///
/// let objectives = vec![
///     vec![5.0, 1.0],  // A
///     vec![3.0, 3.0],  // B
///     vec![1.0, 5.0],  // C
///     vec![2.0, 2.0],  // D, dominated by B
/// ];
///
/// let result = non_dominated_sort(&objectives);
/// assert_eq!(result.ranks, vec![0, 0, 0, 1]);
/// assert_eq!(result.fronts, vec![vec![0, 1, 2], vec![3]]);
/// ```
pub fn non_dominated_sort<V: Vector>(elements: &[V]) -> NondominatedSortResult {
    non_dominated_sort_by(elements, |a: &V, b: &V| a.dominance(b))
}

/// NSGA rank of every element under a custom dominance relation.
///
/// Rank 0 elements are exactly the [`front_by`] of the input.
pub fn ranks_by<T, D>(elements: &[T], dominance: D) -> Vec<usize>
where
    D: Fn(&T, &T) -> Ordering,
{
    non_dominated_sort_by(elements, dominance).ranks
}

/// NSGA rank of every fitness vector.
pub fn ranks<V: Vector>(elements: &[V]) -> Vec<usize> {
    non_dominated_sort(elements).ranks
}

/// Crowding distance of every element.
///
/// For each of the `dimension(elements[0])` objectives, the elements are
/// ordered with `comparator` (best first). The first and last element get
/// `f64::INFINITY`; every interior element accumulates the distance between
/// its two neighbours, normalized by the distance between the extremes.
/// Objectives whose extremes coincide contribute nothing. With fewer than
/// three elements every distance is infinite.
///
/// Higher distance means the element is more isolated (more diverse).
pub fn crowding_distance_by<T, C, D, M>(
    elements: &[T],
    comparator: C,
    distance: D,
    dimension: M,
) -> Vec<f64>
where
    C: Fn(&T, &T, usize) -> Ordering,
    D: Fn(&T, &T, usize) -> f64,
    M: Fn(&T) -> usize,
{
    let n = elements.len();
    if n < 3 {
        return vec![f64::INFINITY; n];
    }

    let mut distances = vec![0.0f64; n];

    for m in 0..dimension(&elements[0]) {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| comparator(&elements[b], &elements[a], m));

        distances[indices[0]] = f64::INFINITY;
        distances[indices[n - 1]] = f64::INFINITY;

        let range = distance(&elements[indices[0]], &elements[indices[n - 1]], m);
        if range > 0.0 {
            for i in 1..(n - 1) {
                let gap = distance(&elements[indices[i - 1]], &elements[indices[i + 1]], m);
                distances[indices[i]] += gap / range;
            }
        }
    }

    distances
}

/// Crowding distance of fitness vectors.
///
/// # Example
///
/// ```
/// use u_evostream::moea::pareto::crowding_distance;
///
/// let objectives = vec![
///     vec![1.0, 5.0],
///     vec![3.0, 3.0],
///     vec![5.0, 1.0],
/// ];
///
/// let distances = crowding_distance(&objectives);
///
/// // Boundary points get infinity
/// assert!(distances[0].is_infinite());
/// assert!(distances[2].is_infinite());
/// // The interior point spans both ranges
/// assert_eq!(distances[1], 2.0);
/// ```
pub fn crowding_distance<V: Vector>(elements: &[V]) -> Vec<f64> {
    crowding_distance_by(
        elements,
        |a: &V, b: &V, i| a.compare(b, i),
        |a: &V, b: &V, i| a.distance(b, i),
        |v: &V| v.length(),
    )
}
