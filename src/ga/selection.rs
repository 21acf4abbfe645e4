//! Parent selection.
//!
//! All strategies treat lower fitness as better and return an index into
//! the population slice.

use super::types::{Fitness, Individual};
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parent selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Selection {
    /// Best of `k` individuals drawn with replacement. `k = 0` acts as 1.
    Tournament(usize),

    /// Fitness-proportionate selection on inverted fitness.
    Roulette,

    /// Linear ranking: the best of `n` individuals has weight `n`, the worst
    /// has weight 1.
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(3)
    }
}

impl Selection {
    /// Picks one parent and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if `population` is empty.
    pub fn select<I: Individual, R: Rng>(&self, population: &[I], rng: &mut R) -> usize {
        assert!(!population.is_empty(), "cannot select from empty population");
        if population.len() == 1 {
            return 0;
        }
        match *self {
            Selection::Tournament(k) => tournament(population, k.max(1), rng),
            Selection::Roulette => roulette(population, rng),
            Selection::Rank => rank(population, rng),
        }
    }
}

fn score<I: Individual>(individual: &I) -> f64 {
    individual.fitness().to_f64()
}

fn tournament<I: Individual, R: Rng>(population: &[I], k: usize, rng: &mut R) -> usize {
    let mut winner = rng.random_range(0..population.len());
    for _ in 1..k {
        let challenger = rng.random_range(0..population.len());
        if score(&population[challenger]) < score(&population[winner]) {
            winner = challenger;
        }
    }
    winner
}

fn roulette<I: Individual, R: Rng>(population: &[I], rng: &mut R) -> usize {
    const EPSILON: f64 = 1e-10;

    let scores: Vec<f64> = population.iter().map(score).collect();
    let worst = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // Distance to the worst score, so lower fitness weighs more.
    let weights: Vec<f64> = scores
        .iter()
        .map(|&s| {
            let w = worst - s + EPSILON;
            if w.is_finite() && w > 0.0 {
                w
            } else {
                EPSILON
            }
        })
        .collect();
    pick_weighted(&weights, rng)
}

fn rank<I: Individual, R: Rng>(population: &[I], rng: &mut R) -> usize {
    let n = population.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| score(&population[a]).total_cmp(&score(&population[b])));

    let weights: Vec<f64> = (0..n).map(|position| (n - position) as f64).collect();
    order[pick_weighted(&weights, rng)]
}

fn pick_weighted<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return rng.random_range(0..weights.len());
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }
    weights.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Clone)]
    struct Scored(f64);

    impl Individual for Scored {
        type Fitness = f64;

        fn fitness(&self) -> f64 {
            self.0
        }

        fn set_fitness(&mut self, fitness: f64) {
            self.0 = fitness;
        }
    }

    fn population(scores: &[f64]) -> Vec<Scored> {
        scores.iter().copied().map(Scored).collect()
    }

    fn counts(selection: Selection, pop: &[Scored], draws: usize) -> Vec<usize> {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = vec![0; pop.len()];
        for _ in 0..draws {
            counts[selection.select(pop, &mut rng)] += 1;
        }
        counts
    }

    #[test]
    fn test_tournament_favors_best() {
        let pop = population(&[10.0, 5.0, 1.0, 8.0]);
        let counts = counts(Selection::Tournament(4), &pop, 10_000);
        assert!(counts[2] > 6000, "best selected {}/10000", counts[2]);
    }

    #[test]
    fn test_tournament_of_one_is_uniform() {
        let pop = population(&[10.0, 5.0, 1.0, 8.0]);
        for c in counts(Selection::Tournament(1), &pop, 10_000) {
            assert!(c > 1500);
        }
        // Zero behaves like one.
        for c in counts(Selection::Tournament(0), &pop, 10_000) {
            assert!(c > 1500);
        }
    }

    #[test]
    fn test_roulette_favors_best() {
        let pop = population(&[100.0, 50.0, 1.0, 80.0]);
        let counts = counts(Selection::Roulette, &pop, 10_000);
        assert!(counts[2] > counts[0]);
        assert!(counts[2] > counts[1]);
    }

    #[test]
    fn test_rank_favors_best() {
        let pop = population(&[100.0, 50.0, 1.0, 80.0]);
        let counts = counts(Selection::Rank, &pop, 10_000);
        // Weights 4:3:2:1 from best to worst.
        assert!(counts[2] > counts[1]);
        assert!(counts[1] > counts[3]);
        assert!(counts[3] > counts[0]);
    }

    #[test]
    fn test_infinite_fitness_does_not_break_roulette() {
        let pop = population(&[f64::INFINITY, 1.0, 2.0]);
        let counts = counts(Selection::Roulette, &pop, 1000);
        assert_eq!(counts.iter().sum::<usize>(), 1000);
    }

    #[test]
    fn test_single_individual() {
        let pop = population(&[5.0]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Selection::Tournament(3).select(&pop, &mut rng), 0);
        assert_eq!(Selection::Roulette.select(&pop, &mut rng), 0);
        assert_eq!(Selection::Rank.select(&pop, &mut rng), 0);
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_empty_population_panics() {
        let pop: Vec<Scored> = Vec::new();
        Selection::Rank.select(&pop, &mut StdRng::seed_from_u64(1));
    }
}
