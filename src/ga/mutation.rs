//! Mutation operators and the pool mutation driver.
//!
//! Three kinds, chosen uniformly per selected individual:
//!
//! - [`MutationKind::Route`]: perturb or rebuild every gene's route
//! - [`MutationKind::Transport`]: move transports between genes
//! - [`MutationKind::Depot`]: move genes, routes unchanged, onto other vehicles
//!
//! Every attempt runs on a clone that must pass [`check_valid`]; the
//! individual is only replaced by a clone that does.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::chromosome::Chromosome;
use super::validity::check_valid;
use crate::error::{PdpError, PdpResult};
use crate::model::{Dominance, ObjectivesPoint, PdpProblem};
use crate::random::{create_rng, spawn_seeds};
use crate::route::{best_insertion, evaluate, greedy_next, relocate_subroute, swap_optimize};

/// Mutation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MutationKind {
    /// See [`mutate_route`].
    Route,
    /// See [`reassign_transports`].
    Transport,
    /// See [`reassign_depots`].
    Depot,
}

impl MutationKind {
    /// All kinds.
    pub const ALL: [MutationKind; 3] = [
        MutationKind::Route,
        MutationKind::Transport,
        MutationKind::Depot,
    ];

    /// Draws a kind uniformly.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Applies this kind in place. The result is not checked.
    pub fn apply<R: Rng>(
        self,
        problem: &PdpProblem,
        chromosome: &mut Chromosome,
        rng: &mut R,
    ) -> PdpResult<()> {
        match self {
            MutationKind::Route => mutate_route(problem, chromosome, rng),
            MutationKind::Transport => reassign_transports(problem, chromosome, rng),
            MutationKind::Depot => {
                reassign_depots(problem, chromosome, rng);
                Ok(())
            }
        }
    }
}

/// Outcome counters of one [`mutate_pool`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MutationStats {
    /// Individuals picked for mutation.
    pub selected: usize,
    /// Individuals replaced by a valid mutant.
    pub succeeded: usize,
    /// Individuals left unchanged after exhausting the retry budget.
    pub abandoned: usize,
}

/// Mutates `floor(pool.len() × rate)` individuals of a shuffled pool.
///
/// Each selected individual draws a [`MutationKind`] and gets up to
/// `max_retries` attempts. An attempt mutates a clone; a construction error
/// or a failed [`check_valid`] discards the clone. Individuals whose
/// attempts all fail are left as they were.
///
/// Selected individuals are processed in parallel when `parallel` is set,
/// each with its own generator seeded from `rng`.
pub fn mutate_pool<R: Rng>(
    problem: &PdpProblem,
    pool: &mut [Chromosome],
    rate: f64,
    max_retries: usize,
    parallel: bool,
    rng: &mut R,
) -> MutationStats {
    pool.shuffle(rng);
    let selected = ((pool.len() as f64 * rate) as usize).min(pool.len());
    let seeds = spawn_seeds(rng, selected);

    let mutate_one = |chromosome: &mut Chromosome, seed: u64| -> bool {
        let mut rng = create_rng(seed);
        let kind = MutationKind::random(&mut rng);
        mutate_with_retry(problem, chromosome, kind, max_retries, &mut rng)
    };

    let succeeded = if parallel {
        pool[..selected]
            .par_iter_mut()
            .zip(seeds.into_par_iter())
            .map(|(chromosome, seed)| mutate_one(chromosome, seed))
            .filter(|&mutated| mutated)
            .count()
    } else {
        pool[..selected]
            .iter_mut()
            .zip(seeds)
            .map(|(chromosome, seed)| mutate_one(chromosome, seed))
            .filter(|&mutated| mutated)
            .count()
    };

    MutationStats {
        selected,
        succeeded,
        abandoned: selected - succeeded,
    }
}

/// Applies `kind` and checks the result.
///
/// # Errors
/// Whatever the operator or [`check_valid`] reports. `chromosome` may be
/// partially modified on error; mutate a clone when that matters.
pub fn mutate<R: Rng>(
    problem: &PdpProblem,
    chromosome: &mut Chromosome,
    kind: MutationKind,
    rng: &mut R,
) -> PdpResult<()> {
    kind.apply(problem, chromosome, rng)?;
    check_valid(problem, chromosome)
}

fn mutate_with_retry<R: Rng>(
    problem: &PdpProblem,
    chromosome: &mut Chromosome,
    kind: MutationKind,
    max_retries: usize,
    rng: &mut R,
) -> bool {
    for attempt in 1..=max_retries {
        let mut candidate = chromosome.clone();
        match mutate(problem, &mut candidate, kind, rng) {
            Ok(()) => {
                *chromosome = candidate;
                return true;
            }
            Err(e) => debug!(?kind, attempt, error = %e, "mutation attempt failed"),
        }
    }
    warn!(?kind, attempts = max_retries, "mutation abandoned");
    false
}

/// Perturbs every gene's route.
///
/// One `optimize` coin is drawn for the whole chromosome. Per gene a second
/// coin decides between [`swap_optimize`] followed by
/// [`relocate_subroute`], and a fresh [`greedy_next`] route.
///
/// # Errors
/// [`PdpError::Construction`] if a greedy rebuild fails.
pub fn mutate_route<R: Rng>(
    problem: &PdpProblem,
    chromosome: &mut Chromosome,
    rng: &mut R,
) -> PdpResult<()> {
    let optimize = rng.random_bool(0.5);
    for gene in chromosome.genes_mut() {
        if rng.random_bool(0.5) {
            let (vehicle, transports, route) = gene.parts_mut();
            swap_optimize(problem, vehicle, route, transports, optimize, rng);
            relocate_subroute(problem, vehicle, route, transports, optimize, rng);
            gene.refresh_totals(problem);
        } else {
            let route = greedy_next(problem, gene.vehicle(), gene.transports(), rng)?;
            let transports = gene.transports().to_vec();
            gene.replace(problem, transports, route);
        }
    }
    Ok(())
}

/// Moves between 1 and `genes − 1` transports to other genes.
///
/// Each move removes a random transport from a random gene and adds it to a
/// random gene whose vehicle can carry it (possibly the same one). Both
/// genes get fresh best-insertion routes. Genes left empty are dropped.
/// No-op on chromosomes with fewer than two genes.
///
/// # Errors
/// [`PdpError::Construction`] if a route cannot be rebuilt.
pub fn reassign_transports<R: Rng>(
    problem: &PdpProblem,
    chromosome: &mut Chromosome,
    rng: &mut R,
) -> PdpResult<()> {
    let genes = chromosome.genes_mut();
    if genes.len() < 2 {
        return Ok(());
    }

    let moves = rng.random_range(1..genes.len());
    for _ in 0..moves {
        let from = rng.random_range(0..genes.len());
        if genes[from].transports().is_empty() {
            continue;
        }
        let mut remaining = genes[from].transports().to_vec();
        let transport = remaining.remove(rng.random_range(0..remaining.len()));
        let route = best_insertion(problem, genes[from].vehicle(), &remaining, rng)?;
        genes[from].replace(problem, remaining, route);

        let amount = problem.transport(transport).amount;
        let capable: Vec<usize> = (0..genes.len())
            .filter(|&g| problem.vehicle(genes[g].vehicle()).can_carry(amount))
            .collect();
        let Some(&to) = capable.choose(rng) else {
            return Err(PdpError::Construction(format!(
                "no gene can take transport {transport}"
            )));
        };
        let mut assigned = genes[to].transports().to_vec();
        assigned.push(transport);
        let route = best_insertion(problem, genes[to].vehicle(), &assigned, rng)?;
        genes[to].replace(problem, assigned, route);
    }

    genes.retain(|gene| !gene.transports().is_empty());
    Ok(())
}

/// Moves genes onto vehicles under which their routes score better.
///
/// Genes are visited in order. Each gene's route, node order unchanged, is
/// evaluated under its own vehicle and every vehicle no other gene holds.
/// A candidate replaces the running best when it dominates it; between
/// incomparable candidates a coin decides.
pub fn reassign_depots<R: Rng>(problem: &PdpProblem, chromosome: &mut Chromosome, rng: &mut R) {
    let genes = chromosome.genes_mut();
    let mut held = vec![false; problem.num_vehicles()];
    for gene in genes.iter() {
        held[gene.vehicle()] = true;
    }

    for gene in genes.iter_mut() {
        let own = gene.vehicle();
        let mut best: Option<(usize, ObjectivesPoint)> = None;
        for vehicle in (0..problem.num_vehicles()).filter(|&v| v == own || !held[v]) {
            let value = evaluate(problem, vehicle, gene.route());
            if !value.is_valid() {
                continue;
            }
            let take = match best {
                None => true,
                Some((_, current)) => match value.dominance(&current) {
                    Dominance::Left => true,
                    Dominance::Right => false,
                    Dominance::Neither => rng.random_bool(0.5),
                },
            };
            if take {
                best = Some((vehicle, value));
            }
        }

        if let Some((vehicle, _)) = best {
            if vehicle != own {
                held[own] = false;
                held[vehicle] = true;
                gene.reassign_vehicle(problem, vehicle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{Gene, Individual};
    use crate::route::RouteStrategy;

    /// Depots at x=0 (vehicles 0, 1) and x=20 (vehicle 2).
    fn problem() -> PdpProblem {
        let pos = [0.0, 20.0, 2.0, 4.0, 16.0, 18.0];
        let distance: Vec<Vec<f64>> = pos
            .iter()
            .map(|a| pos.iter().map(|b| f64::abs(a - b)).collect())
            .collect();
        PdpProblem::from_matrices(
            distance.clone(),
            distance,
            &[
                [0, 0, 10, 0, 1, 1],
                [1, 0, 6, 0, 1, 1],
                [2, 1, 10, 0, 1, 1],
            ],
            &[
                [2, 3, 0, 0, 4],
                [4, 5, 0, 0, 6],
                [3, 2, 0, 0, 3],
                [5, 4, 0, 0, 2],
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

    // ---- operators ----

    #[test]
    fn test_mutate_route_keeps_validity() {
        let p = problem();
        let base = chromosome(&p, &[(0, &[0, 2]), (2, &[1, 3])], 1);
        for seed in 0..30 {
            let mut rng = create_rng(seed);
            let mut c = base.clone();
            mutate_route(&p, &mut c, &mut rng).unwrap();
            check_valid(&p, &c).unwrap();
            for gene in c.genes() {
                assert_eq!(
                    gene.objectives(),
                    evaluate(&p, gene.vehicle(), gene.route())
                );
            }
        }
    }

    #[test]
    fn test_reassign_transports_keeps_coverage() {
        let p = problem();
        let base = chromosome(&p, &[(0, &[0]), (1, &[2]), (2, &[1, 3])], 2);
        for seed in 0..30 {
            let mut rng = create_rng(seed);
            let mut c = base.clone();
            reassign_transports(&p, &mut c, &mut rng).unwrap();
            check_valid(&p, &c).unwrap();
            assert!(c.genes().iter().all(|g| !g.transports().is_empty()));
        }
    }

    #[test]
    fn test_reassign_transports_single_gene_noop() {
        let p = problem();
        let base = chromosome(&p, &[(0, &[0, 1, 2, 3])], 3);
        let mut c = base.clone();
        reassign_transports(&p, &mut c, &mut create_rng(0)).unwrap();
        assert_eq!(c, base);
    }

    #[test]
    fn test_reassign_depots_moves_to_nearer_depot() {
        let p = problem();
        // vehicle 0 serves the far transports from depot 0; vehicle 2 at
        // depot 1 is free and strictly better on both objectives
        let base = chromosome(&p, &[(0, &[1, 3])], 4);
        let mut rng = create_rng(5);
        let mut c = base.clone();
        reassign_depots(&p, &mut c, &mut rng);
        check_valid(&p, &c).unwrap();
        assert_eq!(c.genes()[0].vehicle(), 2);
        assert!(c.objectives().dominates(&base.objectives()));
    }

    #[test]
    fn test_reassign_depots_never_reuses_vehicle() {
        let p = problem();
        let base = chromosome(&p, &[(0, &[0, 2]), (2, &[1, 3])], 6);
        for seed in 0..30 {
            let mut rng = create_rng(seed);
            let mut c = base.clone();
            reassign_depots(&p, &mut c, &mut rng);
            check_valid(&p, &c).unwrap();
        }
    }

    #[test]
    fn test_mutation_kind_random_covers_all() {
        let mut rng = create_rng(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            seen.insert(MutationKind::random(&mut rng));
        }
        assert_eq!(seen.len(), 3);
    }

    // ---- driver ----

    #[test]
    fn test_mutate_pool_counts() {
        let p = problem();
        let base = chromosome(&p, &[(0, &[0, 2]), (2, &[1, 3])], 8);
        let mut pool = vec![base.clone(); 10];
        let mut rng = create_rng(9);
        let stats = mutate_pool(&p, &mut pool, 0.3, 50, false, &mut rng);
        assert_eq!(stats.selected, 3);
        assert_eq!(stats.succeeded + stats.abandoned, 3);
        assert_eq!(pool.len(), 10);
        for c in &pool {
            check_valid(&p, c).unwrap();
        }
    }

    #[test]
    fn test_mutate_pool_parallel_matches_sequential() {
        let p = problem();
        let base = chromosome(&p, &[(0, &[0, 2]), (1, &[3]), (2, &[1])], 10);
        let mut a = vec![base.clone(); 8];
        let mut b = vec![base; 8];
        let sa = mutate_pool(&p, &mut a, 0.5, 50, true, &mut create_rng(11));
        let sb = mutate_pool(&p, &mut b, 0.5, 50, false, &mut create_rng(11));
        assert_eq!(sa, sb);
        assert_eq!(a, b);
    }

    #[test]
    fn test_mutate_pool_abandons_after_retries() {
        let p = problem();
        // transports 1 and 3 are never assigned, so no attempt can pass
        let base = chromosome(&p, &[(0, &[0, 2])], 13);
        assert!(check_valid(&p, &base).is_err());
        let mut pool = vec![base.clone(); 4];
        let stats = mutate_pool(&p, &mut pool, 1.0, 3, false, &mut create_rng(14));
        assert_eq!(
            stats,
            MutationStats {
                selected: 4,
                succeeded: 0,
                abandoned: 4,
            }
        );
        for c in &pool {
            assert_eq!(c, &base);
        }
    }

    #[test]
    fn test_mutate_pool_zero_rate() {
        let p = problem();
        let base = chromosome(&p, &[(0, &[0, 1, 2, 3])], 12);
        let mut pool = vec![base; 4];
        let stats = mutate_pool(&p, &mut pool, 0.0, 50, true, &mut create_rng(0));
        assert_eq!(stats, MutationStats::default());
    }
}
