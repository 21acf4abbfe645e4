//! Multi-objective fitness vectors.

use super::pareto;
use std::cmp::Ordering;

/// A fitness vector: one comparable value per objective.
///
/// Implemented for slices, `Vec`s and arrays of `f64`, `i32` and `i64`.
/// Larger values are better; use [`Optimize::Minimum`](super::Optimize)
/// on a [`ParetoSet`](super::ParetoSet) to minimize instead.
///
/// `f64` objectives are ordered with [`f64::total_cmp`], so NaN values are
/// ordered too (positive NaN above `+inf`) and never break the dominance
/// relation.
pub trait Vector {
    /// Number of objectives.
    fn length(&self) -> usize;

    /// Compares the objective at `index` of `self` and `other`.
    fn compare(&self, other: &Self, index: usize) -> Ordering;

    /// Absolute distance between the objectives at `index`.
    fn distance(&self, other: &Self, index: usize) -> f64;

    /// Pareto dominance of `self` over `other`.
    ///
    /// # Panics
    ///
    /// Panics if the vectors differ in length.
    fn dominance(&self, other: &Self) -> Ordering {
        pareto::dominance(self, other)
    }
}

macro_rules! vector_slice {
    ($t:ty, $cmp:expr) => {
        impl Vector for [$t] {
            fn length(&self) -> usize {
                self.len()
            }

            fn compare(&self, other: &Self, index: usize) -> Ordering {
                $cmp(&self[index], &other[index])
            }

            fn distance(&self, other: &Self, index: usize) -> f64 {
                (self[index] as f64 - other[index] as f64).abs()
            }
        }
    };
}

vector_slice!(f64, f64::total_cmp);
vector_slice!(i32, Ord::cmp);
vector_slice!(i64, Ord::cmp);

impl<T> Vector for Vec<T>
where
    [T]: Vector,
{
    fn length(&self) -> usize {
        self.as_slice().length()
    }

    fn compare(&self, other: &Self, index: usize) -> Ordering {
        self.as_slice().compare(other.as_slice(), index)
    }

    fn distance(&self, other: &Self, index: usize) -> f64 {
        self.as_slice().distance(other.as_slice(), index)
    }
}

impl<T, const N: usize> Vector for [T; N]
where
    [T]: Vector,
{
    fn length(&self) -> usize {
        N
    }

    fn compare(&self, other: &Self, index: usize) -> Ordering {
        self.as_slice().compare(other.as_slice(), index)
    }

    fn distance(&self, other: &Self, index: usize) -> f64 {
        self.as_slice().distance(other.as_slice(), index)
    }
}
