//! NSGA-II generational loop.
//!
//! [`GaRunner`] orchestrates the complete process:
//! seeding → survival selection → tournament → crossover → mutation →
//! validation → repeat.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use tracing::{debug, info, warn};

use super::chromosome::Chromosome;
use super::config::GaConfig;
use super::crossover::crossover;
use super::init::initial_population;
use super::multi_objective::Front;
use super::mutation::{mutate_pool, MutationStats};
use super::selection::{survival_selection, ParentSelector};
use super::types::{GenerationObserver, GenerationReport, NoopObserver};
use super::validity::check_valid;
use crate::error::{PdpError, PdpResult};
use crate::model::PdpProblem;
use crate::random::create_rng;

/// Statistics of one generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// Generation number (0 = the seeded population).
    pub generation: usize,
    /// Population size after survival selection.
    pub population_size: usize,
    /// Size of front 0.
    pub front_size: usize,
    /// Smallest toll distance in front 0.
    pub best_toll_distance: f64,
    /// Smallest completion time in front 0.
    pub best_time: f64,
    /// Offspring produced by crossover.
    pub crossovers: usize,
    /// Crossover children replaced by a parent clone after the retry
    /// budget ran out.
    pub crossover_fallbacks: usize,
    /// Mutation counters of the offspring pool.
    pub mutation: MutationStats,
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// Front 0 of the final population.
    pub pareto_front: Vec<Chromosome>,

    /// Number of generations bred after seeding.
    pub generations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// One entry per survival selection, the seeded population first.
    pub history: Vec<GenerationStats>,
}

/// Executes the NSGA-II loop.
///
/// # Usage
///
/// ```
/// use u_mdpdp::ga::{GaConfig, GaRunner};
/// use u_mdpdp::model::PdpProblem;
///
/// let d = vec![
///     vec![0.0, 4.0, 6.0],
///     vec![4.0, 0.0, 3.0],
///     vec![6.0, 3.0, 0.0],
/// ];
/// let problem = PdpProblem::from_matrices(
///     d.clone(),
///     d,
///     &[[0, 0, 10, 0, 1, 1], [1, 0, 10, 0, 1, 1]],
///     &[[1, 2, 0, 0, 3], [2, 1, 0, 0, 4]],
/// )
/// .unwrap();
///
/// let config = GaConfig::default()
///     .with_population_size(10)
///     .with_max_generations(3)
///     .with_seed(42);
/// let result = GaRunner::run(&problem, &config).unwrap();
/// assert!(!result.pareto_front.is_empty());
/// assert_eq!(result.generations, 3);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the search to completion.
    ///
    /// # Errors
    /// See [`run_observed`](Self::run_observed).
    pub fn run(problem: &PdpProblem, config: &GaConfig) -> PdpResult<GaResult> {
        Self::run_observed(problem, config, &NoopObserver, None)
    }

    /// Runs the search with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the search
    /// stops at the next generation boundary and returns the current
    /// front 0.
    ///
    /// # Errors
    /// See [`run_observed`](Self::run_observed).
    pub fn run_with_cancel(
        problem: &PdpProblem,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> PdpResult<GaResult> {
        Self::run_observed(problem, config, &NoopObserver, cancel)
    }

    /// Runs the search, reporting every generation to `observer`.
    ///
    /// # Errors
    /// - [`PdpError::InvalidConfig`] if `config` does not validate
    /// - [`PdpError::InitialPopulation`] if seeding fails
    /// - [`PdpError::Invariant`] if an offspring breaks a solution invariant
    pub fn run_observed<O: GenerationObserver + ?Sized>(
        problem: &PdpProblem,
        config: &GaConfig,
        observer: &O,
        cancel: Option<Arc<AtomicBool>>,
    ) -> PdpResult<GaResult> {
        config.validate().map_err(PdpError::InvalidConfig)?;

        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        info!(
            vehicles = problem.num_vehicles(),
            transports = problem.num_transports(),
            population = config.population_size,
            generations = config.max_generations,
            "starting search"
        );

        let mut population = initial_population(problem, config, &mut rng)?;
        let mut history = Vec::with_capacity(config.max_generations + 1);
        let mut generation = 0;

        loop {
            let fronts = survival_selection(&mut population, config.population_size);
            observer.on_generation(&report(generation, &fronts, &population));

            let cancelled = cancel
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Relaxed));
            if cancelled || generation == config.max_generations {
                history.push(stats(generation, &fronts, &population, Breeding::default()));
                if cancelled {
                    info!(generation, "search cancelled");
                }
                let pareto_front = fronts
                    .first()
                    .map(|front| front.iter().map(|m| population[m.key].clone()).collect())
                    .unwrap_or_default();
                return Ok(GaResult {
                    pareto_front,
                    generations: generation,
                    cancelled,
                    history,
                });
            }

            let selector = ParentSelector::new(&fronts);
            let parents = selector.select(&population, config.population_size / 2, &mut rng);
            let (mut offspring, mut breeding) = breed(problem, parents, config, &mut rng)?;
            breeding.mutation = mutate_pool(
                problem,
                &mut offspring,
                config.mutation_rate,
                config.max_retries,
                config.parallel,
                &mut rng,
            );
            for child in &offspring {
                check_valid(problem, child)?;
            }

            let entry = stats(generation, &fronts, &population, breeding);
            info!(
                generation,
                front = entry.front_size,
                best_toll_distance = entry.best_toll_distance,
                best_time = entry.best_time,
                mutated = entry.mutation.succeeded,
                abandoned = entry.mutation.abandoned,
                "generation complete"
            );
            history.push(entry);

            population.extend(offspring);
            generation += 1;
        }
    }
}

/// Offspring counters of one generation.
#[derive(Debug, Default)]
struct Breeding {
    crossovers: usize,
    crossover_fallbacks: usize,
    mutation: MutationStats,
}

/// Produces `population_size` offspring from the selected parents.
///
/// `floor(population_size × crossover_rate)` children come from crossover,
/// two per reshuffled parent pair; the rest are clones of random parents.
fn breed<R: Rng>(
    problem: &PdpProblem,
    mut parents: Vec<Chromosome>,
    config: &GaConfig,
    rng: &mut R,
) -> PdpResult<(Vec<Chromosome>, Breeding)> {
    let mut breeding = Breeding::default();
    if parents.is_empty() {
        return Ok((Vec::new(), breeding));
    }

    let quota = (config.population_size as f64 * config.crossover_rate) as usize;
    let mut offspring = Vec::with_capacity(config.population_size);
    while offspring.len() < quota {
        parents.shuffle(rng);
        let first = &parents[0];
        let second = parents.get(1).unwrap_or(first);
        for (a, b) in [(first, second), (second, first)] {
            if offspring.len() == quota {
                break;
            }
            let (child, fallback) = crossover_child(problem, a, b, config.max_retries, rng)?;
            breeding.crossovers += 1;
            breeding.crossover_fallbacks += usize::from(fallback);
            offspring.push(child);
        }
    }

    while offspring.len() < config.population_size {
        if let Some(parent) = parents.choose(rng) {
            offspring.push(parent.clone());
        }
    }

    Ok((offspring, breeding))
}

/// One crossover child, or a clone of `parent1` once the retry budget is
/// spent. The flag reports the fallback.
fn crossover_child<R: Rng>(
    problem: &PdpProblem,
    parent1: &Chromosome,
    parent2: &Chromosome,
    max_retries: usize,
    rng: &mut R,
) -> PdpResult<(Chromosome, bool)> {
    for attempt in 1..=max_retries {
        match crossover(problem, parent1, parent2, rng) {
            Ok(child) => {
                check_valid(problem, &child)?;
                return Ok((child, false));
            }
            Err(e) if e.is_retryable() => {
                debug!(attempt, error = %e, "crossover attempt failed");
            }
            Err(e) => return Err(e),
        }
    }
    warn!(attempts = max_retries, "crossover abandoned, cloning first parent");
    Ok((parent1.clone(), true))
}

fn report(generation: usize, fronts: &[Front], population: &[Chromosome]) -> GenerationReport {
    let mut ranked = fronts.iter();
    let non_dominated = ranked
        .next()
        .map(|front| front.iter().map(|m| m.point).collect())
        .unwrap_or_default();
    let dominated = ranked.flatten().map(|m| m.point).collect();
    GenerationReport {
        generation,
        non_dominated,
        dominated,
        population_size: population.len(),
    }
}

fn stats(
    generation: usize,
    fronts: &[Front],
    population: &[Chromosome],
    breeding: Breeding,
) -> GenerationStats {
    let front: &[_] = fronts.first().map_or(&[], Vec::as_slice);
    let best = |pick: fn(&Chromosome) -> f64| {
        front
            .iter()
            .map(|m| pick(&population[m.key]))
            .fold(f64::INFINITY, f64::min)
    };
    GenerationStats {
        generation,
        population_size: population.len(),
        front_size: front.len(),
        best_toll_distance: best(Chromosome::total_toll_distance),
        best_time: best(Chromosome::max_time),
        crossovers: breeding.crossovers,
        crossover_fallbacks: breeding.crossover_fallbacks,
        mutation: breeding.mutation,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{Gene, Individual};
    use crate::model::TransportNode;
    use std::sync::Mutex;

    fn problem() -> PdpProblem {
        let pos = [0.0, 30.0, 2.0, 5.0, 9.0, 25.0, 27.0, 12.0];
        let distance: Vec<Vec<f64>> = pos
            .iter()
            .map(|a| pos.iter().map(|b| f64::abs(a - b)).collect())
            .collect();
        let toll: Vec<Vec<f64>> = distance
            .iter()
            .map(|row| row.iter().map(|d| d * 0.5).collect())
            .collect();
        PdpProblem::from_matrices(
            distance,
            toll,
            &[
                [0, 0, 10, 50, 1, 1],
                [1, 0, 6, 30, 1, 1],
                [2, 1, 10, 50, 1, 1],
                [3, 1, 6, 30, 2, 1],
            ],
            &[
                [2, 3, 0, 0, 4],
                [3, 4, 0, 10, 5],
                [5, 6, 0, 0, 6],
                [6, 7, 20, 0, 3],
                [4, 2, 0, 0, 2],
                [7, 5, 0, 0, 5],
            ],
        )
        .unwrap()
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<GenerationReport>>);

    impl GenerationObserver for Recorder {
        fn on_generation(&self, report: &GenerationReport) {
            self.0.lock().unwrap().push(report.clone());
        }
    }

    fn config() -> GaConfig {
        GaConfig::default()
            .with_population_size(12)
            .with_max_generations(4)
            .with_seed(42)
    }

    #[test]
    fn test_run_returns_valid_front() {
        let p = problem();
        let result = GaRunner::run(&p, &config()).unwrap();
        assert!(!result.pareto_front.is_empty());
        assert_eq!(result.generations, 4);
        assert!(!result.cancelled);
        for c in &result.pareto_front {
            check_valid(&p, c).unwrap();
        }
        for a in &result.pareto_front {
            for b in &result.pareto_front {
                assert!(!a.objectives().dominates(&b.objectives()));
            }
        }
    }

    #[test]
    fn test_crossover_child_falls_back_to_first_parent() {
        let d = vec![
            vec![0.0, 3.0, 5.0],
            vec![3.0, 0.0, 2.0],
            vec![5.0, 2.0, 0.0],
        ];
        let p = PdpProblem::from_matrices(
            d.clone(),
            d,
            &[[0, 0, 10, 0, 1, 1], [1, 0, 5, 0, 1, 1]],
            &[[1, 2, 0, 0, 8], [2, 1, 0, 0, 3]],
        )
        .unwrap();
        // vehicle 1 cannot carry transport 0, so every rebuild fails
        let route = vec![
            TransportNode::Depot,
            TransportNode::Pickup(0),
            TransportNode::Delivery(0),
            TransportNode::Depot,
        ];
        let a = Chromosome::new(vec![Gene::with_route(&p, 1, vec![0], route.clone())]);
        let b = Chromosome::new(vec![Gene::with_route(&p, 1, vec![0], route)]);

        let mut rng = create_rng(3);
        let (child, fallback) = crossover_child(&p, &a, &b, 4, &mut rng).unwrap();
        assert!(fallback);
        assert_eq!(child, a);
    }

    #[test]
    fn test_history_and_observer() {
        let p = problem();
        let recorder = Recorder::default();
        let result = GaRunner::run_observed(&p, &config(), &recorder, None).unwrap();
        let reports = recorder.0.lock().unwrap();
        assert_eq!(reports.len(), 5);
        assert_eq!(result.history.len(), 5);
        for (i, (report, entry)) in reports.iter().zip(&result.history).enumerate() {
            assert_eq!(report.generation, i);
            assert_eq!(entry.generation, i);
            assert_eq!(report.population_size, 12);
            assert_eq!(report.non_dominated.len(), entry.front_size);
            assert_eq!(
                report.non_dominated.len() + report.dominated.len(),
                report.population_size
            );
        }
        // 12 × 0.7 = 8 crossover children, 12 × 0.3 = 3 mutated
        let bred = &result.history[0];
        assert_eq!(bred.crossovers, 8);
        assert_eq!(bred.mutation.selected, 3);
        let last = result.history.last().unwrap();
        assert_eq!(last.crossovers, 0);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let p = problem();
        let a = GaRunner::run(&p, &config()).unwrap();
        let b = GaRunner::run(&p, &config().with_parallel(false)).unwrap();
        assert_eq!(a.pareto_front, b.pareto_front);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_cancel_before_start() {
        let p = problem();
        let flag = Arc::new(AtomicBool::new(true));
        let result = GaRunner::run_with_cancel(&p, &config(), Some(flag)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.generations, 0);
        assert_eq!(result.history.len(), 1);
        assert!(!result.pareto_front.is_empty());
    }

    #[test]
    fn test_invalid_config() {
        let p = problem();
        let err = GaRunner::run(&p, &config().with_population_size(1)).unwrap_err();
        assert!(matches!(err, PdpError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_generations() {
        let p = problem();
        let result = GaRunner::run(&p, &config().with_max_generations(0)).unwrap();
        assert_eq!(result.generations, 0);
        assert_eq!(result.history.len(), 1);
    }

    #[test]
    fn test_breed_sizes() {
        let p = problem();
        let cfg = config().with_crossover_rate(0.5);
        let mut rng = create_rng(3);
        let parents = initial_population(&p, &cfg.clone().with_population_size(6), &mut rng)
            .unwrap();
        let (offspring, breeding) = breed(&p, parents, &cfg, &mut rng).unwrap();
        assert_eq!(offspring.len(), 12);
        assert_eq!(breeding.crossovers, 6);
        for c in &offspring {
            check_valid(&p, c).unwrap();
        }
    }
}
