//! Gene-level recombination.

use std::collections::BTreeMap;

use rand::Rng;

use super::chromosome::{Chromosome, Gene};
use crate::error::{PdpError, PdpResult};
use crate::model::PdpProblem;
use crate::route::RouteStrategy;

/// Combines the genes of two parents into one child.
///
/// A target gene count is drawn between the parents' gene counts
/// (inclusive). Genes are taken alternately from `parent1` (even steps)
/// and `parent2` (odd steps), continuing with the other parent once one
/// runs out, and their assignments are merged into per-vehicle buckets.
/// Every vehicle starts with an empty bucket, so a transport left uncovered
/// goes to the lowest-id vehicle that can carry it, used or not.
/// A transport claimed by several buckets stays only in the first one.
/// Each non-empty bucket gets a fresh best-insertion route.
///
/// The child is not checked; callers run
/// [`check_valid`](super::check_valid).
///
/// # Errors
/// [`PdpError::Construction`] if a route cannot be built.
pub fn crossover<R: Rng>(
    problem: &PdpProblem,
    parent1: &Chromosome,
    parent2: &Chromosome,
    rng: &mut R,
) -> PdpResult<Chromosome> {
    let (first, second) = (parent1.genes(), parent2.genes());
    let lo = first.len().min(second.len());
    let hi = first.len().max(second.len());
    let target = rng.random_range(lo..=hi);

    let mut buckets: BTreeMap<usize, Vec<usize>> =
        (0..problem.num_vehicles()).map(|v| (v, Vec::new())).collect();
    let (mut i, mut j) = (0, 0);
    for step in 0..target {
        let gene = if (step % 2 == 0 && i < first.len()) || j >= second.len() {
            i += 1;
            &first[i - 1]
        } else {
            j += 1;
            &second[j - 1]
        };
        buckets
            .entry(gene.vehicle())
            .or_default()
            .extend_from_slice(gene.transports());
    }

    let mut covered = vec![false; problem.num_transports()];
    for &t in buckets.values().flatten() {
        covered[t] = true;
    }
    for (transport, _) in covered.iter().enumerate().filter(|&(_, &c)| !c) {
        let amount = problem.transport(transport).amount;
        let holder = buckets
            .keys()
            .copied()
            .find(|&v| problem.vehicle(v).can_carry(amount));
        let Some(vehicle) = holder else {
            return Err(PdpError::Construction(format!(
                "no vehicle can carry transport {transport}"
            )));
        };
        buckets.entry(vehicle).or_default().push(transport);
    }

    let mut claimed = vec![false; problem.num_transports()];
    for transports in buckets.values_mut() {
        transports.retain(|&t| !std::mem::replace(&mut claimed[t], true));
    }

    let genes = buckets
        .into_iter()
        .filter(|(_, transports)| !transports.is_empty())
        .map(|(vehicle, transports)| {
            Gene::build(problem, vehicle, transports, RouteStrategy::BestInsertion, rng)
        })
        .collect::<PdpResult<Vec<_>>>()?;
    Ok(Chromosome::new(genes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::check_valid;
    use crate::random::create_rng;

    fn problem() -> PdpProblem {
        let pos = [0.0, 10.0, 2.0, 4.0, 6.0, 8.0];
        let distance: Vec<Vec<f64>> = pos
            .iter()
            .map(|a| pos.iter().map(|b| f64::abs(a - b)).collect())
            .collect();
        PdpProblem::from_matrices(
            distance.clone(),
            distance,
            &[
                [0, 0, 10, 0, 1, 1],
                [1, 1, 10, 0, 1, 1],
                [2, 0, 5, 0, 1, 1],
                [3, 1, 5, 0, 1, 1],
            ],
            &[
                [2, 3, 0, 0, 4],
                [3, 4, 0, 0, 6],
                [4, 5, 0, 0, 3],
                [5, 2, 0, 0, 2],
            ],
        )
        .unwrap()
    }

    fn chromosome(p: &PdpProblem, parts: &[(usize, &[usize])], seed: u64) -> Chromosome {
        let mut rng = create_rng(seed);
        Chromosome::new(
            parts
                .iter()
                .map(|&(v, ts)| {
                    Gene::build(p, v, ts.to_vec(), RouteStrategy::BestInsertion, &mut rng).unwrap()
                })
                .collect(),
        )
    }

    #[test]
    fn test_disjoint_parents_give_valid_child() {
        let p = problem();
        let a = chromosome(&p, &[(0, &[0, 1]), (2, &[2, 3])], 1);
        let b = chromosome(&p, &[(1, &[1, 2]), (3, &[0, 3])], 2);
        check_valid(&p, &a).unwrap();
        check_valid(&p, &b).unwrap();
        for seed in 0..40 {
            let mut rng = create_rng(seed);
            let child = crossover(&p, &a, &b, &mut rng).unwrap();
            check_valid(&p, &child).unwrap();
            let reverse = crossover(&p, &b, &a, &mut rng).unwrap();
            check_valid(&p, &reverse).unwrap();
        }
    }

    #[test]
    fn test_uneven_gene_counts() {
        let p = problem();
        let a = chromosome(&p, &[(0, &[0, 1, 2, 3])], 3);
        let b = chromosome(&p, &[(1, &[1]), (2, &[2, 3]), (3, &[0])], 4);
        for seed in 0..40 {
            let mut rng = create_rng(seed);
            let child = crossover(&p, &a, &b, &mut rng).unwrap();
            check_valid(&p, &child).unwrap();
        }
    }

    #[test]
    fn test_identical_parents() {
        let p = problem();
        let a = chromosome(&p, &[(0, &[0, 2]), (1, &[1, 3])], 5);
        let mut rng = create_rng(6);
        let child = crossover(&p, &a, &a, &mut rng).unwrap();
        check_valid(&p, &child).unwrap();
        // both steps take vehicle 0's gene, the uncovered rest joins it too
        let vehicles: Vec<usize> = child.genes().iter().map(Gene::vehicle).collect();
        assert_eq!(vehicles, vec![0]);
    }

    #[test]
    fn test_uncovered_transport_opens_lowest_capable_vehicle() {
        let d = vec![
            vec![0.0, 2.0, 4.0, 6.0],
            vec![2.0, 0.0, 2.0, 4.0],
            vec![4.0, 2.0, 0.0, 2.0],
            vec![6.0, 4.0, 2.0, 0.0],
        ];
        let p = PdpProblem::from_matrices(
            d.clone(),
            d,
            &[[0, 0, 10, 0, 1, 1], [1, 0, 10, 0, 1, 1]],
            &[[1, 2, 0, 0, 4], [2, 3, 0, 0, 5]],
        )
        .unwrap();
        let parent = chromosome(&p, &[(1, &[0])], 7);
        for seed in 0..10 {
            let mut rng = create_rng(seed);
            let child = crossover(&p, &parent, &parent, &mut rng).unwrap();
            check_valid(&p, &child).unwrap();
            let parts: Vec<(usize, Vec<usize>)> = child
                .genes()
                .iter()
                .map(|g| (g.vehicle(), g.transports().to_vec()))
                .collect();
            assert_eq!(parts, vec![(0, vec![1]), (1, vec![0])]);
        }
    }
}
