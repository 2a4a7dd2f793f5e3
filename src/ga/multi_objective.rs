//! NSGA-II survival-selection utilities.
//!
//! These functions work on [`KeyedObjectives`]: a population key paired with
//! the individual's two-objective point. Keys are positions in the
//! population; after [`truncate`] removes members, the surviving keys are
//! re-densified so they still index the population once the same positions
//! have been dropped with [`remove_indices`].
//!
//! # Algorithms
//!
//! - [`non_dominated_sort`]: Fast non-dominated sorting (Deb et al., 2002)
//! - [`crowding_distance`]: Crowding distance assignment for diversity preservation
//! - [`truncate`]: Front-wise truncation to a target size with dense re-keying
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - IEEE Transactions on Evolutionary Computation, 6(2), 182-197

use crate::model::{Dominance, ObjectivesPoint};

/// A population key paired with its objective point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyedObjectives {
    /// Position of the individual in the population.
    pub key: usize,
    /// The individual's objectives.
    pub point: ObjectivesPoint,
}

impl KeyedObjectives {
    /// Creates a keyed point.
    pub fn new(key: usize, point: ObjectivesPoint) -> Self {
        Self { key, point }
    }
}

/// One Pareto rank class.
pub type Front = Vec<KeyedObjectives>;

/// Fast non-dominated sorting.
///
/// Returns fronts in increasing rank order; `fronts[0]` holds every
/// individual dominated by no other. Within a front, members appear in the
/// order they were discovered (front 0 in input order). Both objectives are
/// **minimized**.
///
/// Returns an empty list for empty input.
///
/// # Complexity
///
/// O(n²) dominance comparisons.
///
/// # Example
///
/// ```
/// use u_mdpdp::ga::multi_objective::{non_dominated_sort, KeyedObjectives};
/// use u_mdpdp::model::ObjectivesPoint;
///
/// let items: Vec<KeyedObjectives> = [(1.0, 5.0), (3.0, 3.0), (5.0, 1.0), (4.0, 4.0)]
///     .iter()
///     .enumerate()
///     .map(|(k, &(a, b))| KeyedObjectives::new(k, ObjectivesPoint::new(a, b)))
///     .collect();
///
/// let fronts = non_dominated_sort(&items);
/// assert_eq!(fronts.len(), 2);
/// assert_eq!(fronts[0].len(), 3);
/// assert_eq!(fronts[1][0].key, 3); // dominated by (3, 3)
/// ```
pub fn non_dominated_sort(items: &[KeyedObjectives]) -> Vec<Front> {
    let n = items.len();
    if n == 0 {
        return Vec::new();
    }

    let mut domination_count = vec![0usize; n];
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];

    for i in 0..n {
        for j in (i + 1)..n {
            match items[i].point.dominance(&items[j].point) {
                Dominance::Left => {
                    dominated_by[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominated_by[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }
    }

    let mut current: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();
    let mut fronts = Vec::new();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        fronts.push(current.iter().map(|&i| items[i]).collect());
        current = next;
    }

    fronts
}

/// Crowding distance of each member of a front, aligned with `front`.
///
/// Boundary members in each objective receive `f64::INFINITY`. Interior
/// members accumulate `(next - prev) / (max - min)` per objective; an
/// objective with zero range contributes nothing. Fronts of one or two
/// members are all boundary.
pub fn crowding_distance(front: &[KeyedObjectives]) -> Vec<f64> {
    let n = front.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let mut distances = vec![0.0f64; n];
    for dim in 0..2 {
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            front[a]
                .point
                .coordinate(dim)
                .partial_cmp(&front[b].point.coordinate(dim))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        distances[order[0]] = f64::INFINITY;
        distances[order[n - 1]] = f64::INFINITY;

        let min = front[order[0]].point.coordinate(dim);
        let max = front[order[n - 1]].point.coordinate(dim);
        let range = max - min;
        if range <= 0.0 {
            continue;
        }
        for i in 1..(n - 1) {
            if distances[order[i]].is_infinite() {
                continue;
            }
            let prev = front[order[i - 1]].point.coordinate(dim);
            let next = front[order[i + 1]].point.coordinate(dim);
            distances[order[i]] += (next - prev) / range;
        }
    }

    distances
}

/// Outcome of [`truncate`].
#[derive(Debug, Clone)]
pub struct Truncation {
    /// Surviving fronts, keys already re-densified.
    pub fronts: Vec<Front>,
    /// Original keys of removed members, ascending.
    pub removed: Vec<usize>,
}

/// Truncates ranked fronts to `target` members.
///
/// Whole fronts are kept while they fit; the first front that overflows is
/// sorted by crowding distance (descending) and cut to the remaining quota;
/// all later fronts are dropped. Each surviving key is then lowered by the
/// number of removed keys smaller than it, so keys stay dense once the same
/// positions are removed from the population with [`remove_indices`].
pub fn truncate(fronts: Vec<Front>, target: usize) -> Truncation {
    let mut quota = target;
    let mut kept = Vec::with_capacity(fronts.len());
    let mut removed = Vec::new();

    for front in fronts {
        if quota >= front.len() {
            quota -= front.len();
            kept.push(front);
        } else if quota > 0 {
            let distances = crowding_distance(&front);
            let mut order: Vec<usize> = (0..front.len()).collect();
            order.sort_by(|&a, &b| {
                distances[b]
                    .partial_cmp(&distances[a])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let mut sorted: Front = order.into_iter().map(|i| front[i]).collect();
            removed.extend(sorted.split_off(quota).into_iter().map(|m| m.key));
            kept.push(sorted);
            quota = 0;
        } else {
            removed.extend(front.into_iter().map(|m| m.key));
        }
    }

    removed.sort_unstable();
    for member in kept.iter_mut().flatten() {
        member.key -= removed.partition_point(|&r| r < member.key);
    }

    Truncation {
        fronts: kept,
        removed,
    }
}

/// Removes the given positions from `items`; `removed` must be ascending.
pub fn remove_indices<T>(items: &mut Vec<T>, removed: &[usize]) {
    if removed.is_empty() {
        return;
    }
    let mut next = removed.iter().peekable();
    let mut index = 0;
    items.retain(|_| {
        let drop = next.peek().is_some_and(|&&r| r == index);
        if drop {
            next.next();
        }
        index += 1;
        !drop
    });
}

// ============================================================================
// Tests
// ============================================================================
