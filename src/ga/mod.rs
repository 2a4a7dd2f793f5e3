//! NSGA-II genetic algorithm over vehicle assignments and routes.
//!
//! A [`Chromosome`] is a complete solution: one [`Gene`] per used vehicle,
//! each carrying its transports and a feasible route. The search keeps a
//! population of valid chromosomes and ranks them by Pareto dominance on
//! `(toll distance, max completion time)`.
//!
//! # Core Traits
//!
//! - [`Individual`]: What selection needs from a population member
//! - [`GenerationObserver`]: Per-generation reporting seam
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, rates, retries)
//! - [`GaRunner`]: Executes the generational loop
//! - [`GaResult`]: Final Pareto front with per-generation statistics
//!
//! # Operators
//!
//! - [`initial_population`]: random-depot and nearest-depot seeding
//! - [`crossover`]: gene-level recombination with coverage repair
//! - [`mutate_pool`]: route, transport, and depot mutations with retries
//! - [`check_valid`]: the solution invariants every operator must keep
//!
//! # Submodules
//!
//! - [`multi_objective`]: Pareto non-dominated sorting, crowding distance,
//!   and truncation (NSGA-II utilities)
//!
//! # References
//!
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*

mod chromosome;
mod config;
mod crossover;
mod init;
pub mod multi_objective;
mod mutation;
mod runner;
mod selection;
mod types;
mod validity;

pub use chromosome::{Chromosome, Gene};
pub use config::GaConfig;
pub use crossover::crossover;
pub use init::{initial_population, nearest_depot, random_depot, Seeding};
pub use mutation::{
    mutate, mutate_pool, mutate_route, reassign_depots, reassign_transports, MutationKind,
    MutationStats,
};
pub use runner::{GaResult, GaRunner, GenerationStats};
pub use selection::{survival_selection, ParentSelector};
pub use types::{GenerationObserver, GenerationReport, Individual, NoopObserver};
pub use validity::check_valid;
