//! Survival and parent selection.
//!
//! Survival selection ranks the combined population into Pareto fronts
//! and truncates it by crowding distance. Parent selection is a binary
//! tournament over the ranked survivors: lower front wins, then larger
//! crowding distance.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic
//!   Algorithm: NSGA-II"

use rand::Rng;

use super::multi_objective::{
    crowding_distance, non_dominated_sort, remove_indices, truncate, Front, KeyedObjectives,
};
use super::types::Individual;

/// Shrinks `population` to at most `target` members, in place.
///
/// Returns the fronts of the survivors. Keys in the returned fronts index
/// into the shrunk `population`.
pub fn survival_selection<I: Individual>(population: &mut Vec<I>, target: usize) -> Vec<Front> {
    let keyed: Vec<KeyedObjectives> = population
        .iter()
        .enumerate()
        .map(|(key, individual)| KeyedObjectives::new(key, individual.objectives()))
        .collect();
    let truncation = truncate(non_dominated_sort(&keyed), target);
    remove_indices(population, &truncation.removed);
    truncation.fronts
}

/// Binary tournament over a ranked population.
///
/// Front ranks and per-front crowding distances are computed once on
/// construction.
#[derive(Debug, Clone)]
pub struct ParentSelector {
    rank: Vec<usize>,
    crowding: Vec<f64>,
}

impl ParentSelector {
    /// Prepares a selector for fronts whose keys are `0..n`.
    pub fn new(fronts: &[Front]) -> Self {
        let n = fronts.iter().map(Vec::len).sum();
        let mut rank = vec![0; n];
        let mut crowding = vec![0.0; n];
        for (r, front) in fronts.iter().enumerate() {
            for (member, distance) in front.iter().zip(crowding_distance(front)) {
                rank[member.key] = r;
                crowding[member.key] = distance;
            }
        }
        Self { rank, crowding }
    }

    /// Number of ranked individuals.
    pub fn len(&self) -> usize {
        self.rank.len()
    }

    /// Whether no individual is ranked.
    pub fn is_empty(&self) -> bool {
        self.rank.is_empty()
    }

    /// Picks two distinct individuals at random and returns the better one.
    ///
    /// Returns `None` for an empty population; with one individual that one
    /// is returned.
    pub fn tournament<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        let n = self.len();
        match n {
            0 => return None,
            1 => return Some(0),
            _ => {}
        }
        let a = rng.random_range(0..n);
        let mut b = rng.random_range(0..n - 1);
        if b >= a {
            b += 1;
        }
        Some(self.better(a, b))
    }

    /// Lower rank wins; on equal rank the larger crowding distance wins,
    /// `a` on a tie.
    fn better(&self, a: usize, b: usize) -> usize {
        if self.rank[a] != self.rank[b] {
            if self.rank[a] < self.rank[b] {
                a
            } else {
                b
            }
        } else if self.crowding[a] >= self.crowding[b] {
            a
        } else {
            b
        }
    }

    /// Runs `count` tournaments and clones the winners.
    pub fn select<I: Clone, R: Rng>(&self, population: &[I], count: usize, rng: &mut R) -> Vec<I> {
        (0..count)
            .filter_map(|_| self.tournament(rng))
            .map(|i| population[i].clone())
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
