//! Initial population seeding.
//!
//! Individuals are seeded with a mix of three strategies, split by
//! [`GaConfig::insertion_share`] and [`GaConfig::greedy_share`] with
//! inclusive bounds:
//!
//! 1. [`random_depot`] with best-insertion routes
//! 2. [`random_depot`] with greedy-next routes
//! 3. [`nearest_depot`] with paired-then-shuffle routes
//!
//! Every seeded individual passes [`check_valid`] before it is accepted.

use std::collections::BTreeMap;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

use super::chromosome::{Chromosome, Gene};
use super::config::GaConfig;
use super::validity::check_valid;
use crate::error::{PdpError, PdpResult};
use crate::model::PdpProblem;
use crate::random::{create_rng, spawn_seeds};
use crate::route::RouteStrategy;

/// How one initial individual is seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seeding {
    /// [`random_depot`] with the given route constructor.
    RandomDepot(RouteStrategy),
    /// [`nearest_depot`].
    NearestDepot,
}

impl Seeding {
    /// Strategy for position `index`. Both bounds are inclusive, so the
    /// first group always gets index 0.
    fn for_index(index: usize, insertion: usize, greedy: usize) -> Self {
        if index <= insertion {
            Seeding::RandomDepot(RouteStrategy::BestInsertion)
        } else if index <= insertion + greedy {
            Seeding::RandomDepot(RouteStrategy::GreedyNext)
        } else {
            Seeding::NearestDepot
        }
    }

    /// Builds one unchecked chromosome.
    pub fn build<R: Rng>(self, problem: &PdpProblem, rng: &mut R) -> PdpResult<Chromosome> {
        match self {
            Seeding::RandomDepot(strategy) => random_depot(problem, strategy, rng),
            Seeding::NearestDepot => nearest_depot(problem, rng),
        }
    }
}

/// Seeds `config.population_size` valid individuals.
///
/// Each individual gets its own generator from a seed drawn up front, so
/// the result does not depend on `config.parallel`.
///
/// # Errors
/// [`PdpError::InitialPopulation`] when an individual still fails after
/// `config.max_retries` attempts; an invariant violation is returned as is.
pub fn initial_population<R: Rng>(
    problem: &PdpProblem,
    config: &GaConfig,
    rng: &mut R,
) -> PdpResult<Vec<Chromosome>> {
    let n = config.population_size;
    let insertion = (n as f64 * config.insertion_share) as usize;
    let greedy = (n as f64 * config.greedy_share) as usize;
    let seeds = spawn_seeds(rng, n);

    let seed_one = |index: usize, seed: u64| -> PdpResult<Chromosome> {
        let mut rng = create_rng(seed);
        let seeding = Seeding::for_index(index, insertion, greedy);
        seed_individual(problem, seeding, index, config.max_retries, &mut rng)
    };

    if config.parallel {
        seeds
            .into_par_iter()
            .enumerate()
            .map(|(index, seed)| seed_one(index, seed))
            .collect()
    } else {
        seeds
            .into_iter()
            .enumerate()
            .map(|(index, seed)| seed_one(index, seed))
            .collect()
    }
}

fn seed_individual<R: Rng>(
    problem: &PdpProblem,
    seeding: Seeding,
    individual: usize,
    max_retries: usize,
    rng: &mut R,
) -> PdpResult<Chromosome> {
    for attempt in 1..=max_retries {
        let built = seeding.build(problem, rng).and_then(|chromosome| {
            check_valid(problem, &chromosome)?;
            Ok(chromosome)
        });
        match built {
            Ok(chromosome) => return Ok(chromosome),
            Err(e) if e.is_retryable() => {
                debug!(individual, attempt, ?seeding, error = %e, "seeding attempt failed");
            }
            Err(e) => return Err(e),
        }
    }
    Err(PdpError::InitialPopulation {
        individual,
        attempts: max_retries,
    })
}

/// Assigns transports to a random subset of vehicles.
///
/// A random number of shuffled vehicles each take a random non-empty subset
/// of the unassigned transports they can carry. Leftovers go to one unused
/// vehicle able to carry the heaviest of them; failing that, each leftover
/// is inserted into a random used gene that can carry it, or opens the
/// first unused vehicle that can.
///
/// # Errors
/// [`PdpError::Construction`] if a route cannot be built.
pub fn random_depot<R: Rng>(
    problem: &PdpProblem,
    strategy: RouteStrategy,
    rng: &mut R,
) -> PdpResult<Chromosome> {
    let mut vehicles: Vec<usize> = (0..problem.num_vehicles()).collect();
    vehicles.shuffle(rng);
    let used = rng.random_range(1..=vehicles.len());
    let mut spare = vehicles.split_off(used);

    let mut pool: Vec<usize> = (0..problem.num_transports()).collect();
    let mut assignments = Vec::new();
    for &vehicle in &vehicles {
        let capacity = problem.vehicle(vehicle).capacity();
        let subset = take_random_subset(problem, &mut pool, capacity, rng);
        if subset.is_empty() {
            spare.push(vehicle);
        } else {
            assignments.push((vehicle, subset));
        }
    }

    let heaviest = pool.iter().map(|&t| problem.transport(t).amount).max();
    if let Some(heaviest) = heaviest {
        let bonus = spare
            .iter()
            .position(|&v| problem.vehicle(v).can_carry(heaviest));
        if let Some(slot) = bonus {
            assignments.push((spare.remove(slot), std::mem::take(&mut pool)));
        }
    }

    let mut genes = assignments
        .into_iter()
        .map(|(vehicle, transports)| Gene::build(problem, vehicle, transports, strategy, rng))
        .collect::<PdpResult<Vec<_>>>()?;

    for transport in pool {
        let amount = problem.transport(transport).amount;
        let capable: Vec<usize> = (0..genes.len())
            .filter(|&g| problem.vehicle(genes[g].vehicle()).can_carry(amount))
            .collect();
        if let Some(&g) = capable.choose(rng) {
            genes[g].add_transport(problem, transport, rng)?;
            continue;
        }
        let Some(slot) = spare
            .iter()
            .position(|&v| problem.vehicle(v).can_carry(amount))
        else {
            return Err(PdpError::Construction(format!(
                "no vehicle left for transport {transport}"
            )));
        };
        let vehicle = spare.remove(slot);
        genes.push(Gene::build(problem, vehicle, vec![transport], strategy, rng)?);
    }

    Ok(Chromosome::new(genes))
}

/// Assigns each transport to its nearest depot, then splits the depot's
/// transports among the depot's vehicles.
///
/// A transport goes to the depot minimizing
/// `distance[depot][pickup] + distance[delivery][depot]` among depots that
/// own a vehicle able to carry it, ties broken at random. Within a depot
/// the vehicles, in random order, take random subsets; leftovers are dealt
/// round-robin to vehicles that can carry them. Routes are built with
/// [`RouteStrategy::PairedShuffle`].
///
/// # Errors
/// [`PdpError::Construction`] if a route cannot be built.
pub fn nearest_depot<R: Rng>(problem: &PdpProblem, rng: &mut R) -> PdpResult<Chromosome> {
    let depots = problem.depots();
    let mut by_depot: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    for (id, transport) in problem.transports().iter().enumerate() {
        let mut best = f64::INFINITY;
        let mut nearest = Vec::new();
        for (&depot, vehicles) in &depots {
            if !vehicles
                .iter()
                .any(|&v| problem.vehicle(v).can_carry(transport.amount))
            {
                continue;
            }
            let detour = problem.distance(depot, transport.pickup)
                + problem.distance(transport.delivery, depot);
            if detour < best {
                best = detour;
                nearest.clear();
                nearest.push(depot);
            } else if detour == best {
                nearest.push(depot);
            }
        }
        let Some(&depot) = nearest.choose(rng) else {
            return Err(PdpError::Construction(format!(
                "no depot can serve transport {id}"
            )));
        };
        by_depot.entry(depot).or_default().push(id);
    }

    let mut genes = Vec::new();
    for (depot, vehicles) in depots {
        let Some(mut pool) = by_depot.remove(&depot) else {
            continue;
        };
        let mut vehicles = vehicles;
        vehicles.shuffle(rng);

        let mut assigned: Vec<Vec<usize>> = vehicles
            .iter()
            .map(|&v| take_random_subset(problem, &mut pool, problem.vehicle(v).capacity(), rng))
            .collect();

        let mut cursor = 0;
        for transport in pool {
            let amount = problem.transport(transport).amount;
            let slot = (0..vehicles.len())
                .map(|step| (cursor + step) % vehicles.len())
                .find(|&slot| problem.vehicle(vehicles[slot]).can_carry(amount));
            let Some(slot) = slot else {
                return Err(PdpError::Construction(format!(
                    "no vehicle at depot {depot} can carry transport {transport}"
                )));
            };
            assigned[slot].push(transport);
            cursor = slot + 1;
        }

        for (vehicle, transports) in vehicles.into_iter().zip(assigned) {
            if !transports.is_empty() {
                genes.push(Gene::build(
                    problem,
                    vehicle,
                    transports,
                    RouteStrategy::PairedShuffle,
                    rng,
                )?);
            }
        }
    }

    Ok(Chromosome::new(genes))
}

/// Removes and returns a random non-empty subset of the transports in
/// `pool` that fit `capacity`, or nothing if none fit.
fn take_random_subset<R: Rng>(
    problem: &PdpProblem,
    pool: &mut Vec<usize>,
    capacity: u32,
    rng: &mut R,
) -> Vec<usize> {
    let mut carriable: Vec<usize> = pool
        .iter()
        .copied()
        .filter(|&t| problem.transport(t).amount <= capacity)
        .collect();
    if carriable.is_empty() {
        return carriable;
    }
    carriable.shuffle(rng);
    let k = rng.random_range(1..=carriable.len());
    carriable.truncate(k);
    pool.retain(|t| !carriable.contains(t));
    carriable
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Depot 0 at x=0 with two vehicles, depot 1 at x=100 with one.
    fn problem() -> PdpProblem {
        let pos = [0.0, 100.0, 1.0, 2.0, 99.0, 98.0];
        let distance: Vec<Vec<f64>> = pos
            .iter()
            .map(|a| pos.iter().map(|b| f64::abs(a - b)).collect())
            .collect();
        PdpProblem::from_matrices(
            distance.clone(),
            distance,
            &[
                [0, 0, 10, 0, 1, 1],
                [1, 0, 5, 0, 1, 1],
                [2, 1, 10, 0, 1, 1],
            ],
            &[
                [2, 3, 0, 0, 4],
                [4, 5, 0, 0, 6],
                [3, 2, 0, 0, 3],
                [5, 4, 0, 0, 8],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_random_depot_valid() {
        let p = problem();
        for seed in 0..30 {
            let mut rng = create_rng(seed);
            for strategy in [RouteStrategy::BestInsertion, RouteStrategy::GreedyNext] {
                let c = random_depot(&p, strategy, &mut rng).unwrap();
                check_valid(&p, &c).unwrap();
            }
        }
    }

    #[test]
    fn test_nearest_depot_uses_nearest() {
        let p = problem();
        for seed in 0..30 {
            let mut rng = create_rng(seed);
            let c = nearest_depot(&p, &mut rng).unwrap();
            check_valid(&p, &c).unwrap();
            for gene in c.genes() {
                let expected = if gene.transports().iter().all(|&t| t == 0 || t == 2) {
                    0
                } else {
                    1
                };
                assert_eq!(gene.depot(), expected);
            }
        }
    }

    #[test]
    fn test_take_random_subset_respects_capacity() {
        let p = problem();
        let mut rng = create_rng(3);
        let mut pool = vec![0, 1, 2, 3];
        let taken = take_random_subset(&p, &mut pool, 5, &mut rng);
        assert!(!taken.is_empty());
        assert!(taken.iter().all(|&t| t == 0 || t == 2));
        assert_eq!(pool.len() + taken.len(), 4);

        let mut pool = vec![1, 3];
        assert!(take_random_subset(&p, &mut pool, 5, &mut rng).is_empty());
        assert_eq!(pool, vec![1, 3]);
    }

    #[test]
    fn test_seeding_split() {
        assert_eq!(
            Seeding::for_index(2, 2, 3),
            Seeding::RandomDepot(RouteStrategy::BestInsertion)
        );
        assert_eq!(
            Seeding::for_index(5, 2, 3),
            Seeding::RandomDepot(RouteStrategy::GreedyNext)
        );
        assert_eq!(Seeding::for_index(6, 2, 3), Seeding::NearestDepot);
    }

    #[test]
    fn test_default_split_of_thirty() {
        // 30 × 0.2 = 6 and 30 × 0.3 = 9
        let mut counts = [0usize; 3];
        for index in 0..30 {
            let group = match Seeding::for_index(index, 6, 9) {
                Seeding::RandomDepot(RouteStrategy::BestInsertion) => 0,
                Seeding::RandomDepot(_) => 1,
                Seeding::NearestDepot => 2,
            };
            counts[group] += 1;
        }
        assert_eq!(counts, [7, 9, 14]);
    }

    #[test]
    fn test_initial_population_size_and_validity() {
        let p = problem();
        let config = GaConfig::default().with_population_size(12);
        let mut rng = create_rng(11);
        let population = initial_population(&p, &config, &mut rng).unwrap();
        assert_eq!(population.len(), 12);
        for c in &population {
            check_valid(&p, c).unwrap();
        }
    }

    #[test]
    fn test_initial_population_parallel_matches_sequential() {
        let p = problem();
        let config = GaConfig::default().with_population_size(8);
        let parallel = initial_population(&p, &config, &mut create_rng(5)).unwrap();
        let sequential =
            initial_population(&p, &config.clone().with_parallel(false), &mut create_rng(5))
                .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_no_transports() {
        let d = vec![vec![0.0]];
        let p = PdpProblem::from_matrices(d.clone(), d, &[[0, 0, 1, 0, 1, 1]], &[]).unwrap();
        let mut rng = create_rng(0);
        let c = random_depot(&p, RouteStrategy::BestInsertion, &mut rng).unwrap();
        assert!(c.genes().is_empty());
        let c = nearest_depot(&p, &mut rng).unwrap();
        assert!(c.genes().is_empty());
    }
}
