//! Fitness/payload pairs.

use super::Vector;
use std::cmp::Ordering;

/// An evolved solution together with its fitness vector.
///
/// The payload is carried through archiving unchanged.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate<T, V> {
    /// The evolved solution.
    pub payload: T,
    /// Its objective values.
    pub fitness: V,
}

impl<T, V> Candidate<T, V> {
    /// Pairs a solution with its objective values.
    pub fn new(payload: T, fitness: V) -> Self {
        Self { payload, fitness }
    }

    /// The evolved solution.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Its objective values.
    pub fn fitness(&self) -> &V {
        &self.fitness
    }

    /// Drops the fitness, keeping the solution.
    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T, V: Vector> Candidate<T, V> {
    /// Pareto dominance of this candidate's fitness over `other`'s.
    pub fn dominance(&self, other: &Self) -> Ordering {
        self.fitness.dominance(&other.fitness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moea::pareto;

    #[test]
    fn test_front_of_candidates() {
        let candidates = vec![
            Candidate::new("a", vec![1.0, 4.0]),
            Candidate::new("b", vec![0.5, 3.0]),
            Candidate::new("c", vec![4.0, 1.0]),
        ];
        let front = pareto::front_by(candidates, Candidate::dominance);
        let names: Vec<&str> = front.into_iter().map(Candidate::into_payload).collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
