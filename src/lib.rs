//! Multi-objective, multi-depot pickup-and-delivery vehicle routing.
//!
//! Assigns transport requests (pick up a load at one location, deliver it
//! to another) to a heterogeneous fleet spread over several depots, and
//! orders each vehicle's stops. Solutions trade off two objectives, total
//! toll distance and the latest route completion time, and the search
//! returns an approximation of the Pareto front.
//!
//! - **Model** ([`model`]): vehicles, transports, route nodes, and the
//!   validated problem instance.
//! - **Routing** ([`route`]): the route evaluator, three route
//!   constructors, and two local search operators for a single vehicle.
//! - **Search** ([`ga`]): an NSGA-II genetic algorithm over vehicle
//!   assignments and routes.
//!
//! # Quick start
//!
//! ```
//! let d = vec![
//!     vec![0.0, 4.0, 6.0],
//!     vec![4.0, 0.0, 3.0],
//!     vec![6.0, 3.0, 0.0],
//! ];
//! let front = u_mdpdp::solve(
//!     d.clone(),
//!     d,
//!     &[[0, 0, 10, 0, 1, 1]],
//!     &[[1, 2, 0, 0, 5]],
//!     10,
//!     2,
//!     0.7,
//!     0.3,
//! )
//! .unwrap();
//! assert!(!front.is_empty());
//! ```

pub mod error;
pub mod ga;
pub mod model;
pub mod random;
pub mod route;

use error::PdpResult;
use ga::{Chromosome, GaConfig, GaRunner};
use model::{PdpProblem, TransportRow, VehicleRow};

/// Builds an instance from matrices and returns the final Pareto front.
///
/// Vehicle rows are `(code, depot, capacity, fixed cost, speed, load
/// factor)`; transport rows are `(pickup, delivery, earliest pickup,
/// earliest delivery, amount)`. Other parameters keep their
/// [`GaConfig`] defaults.
///
/// # Errors
/// [`PdpError::InvalidInput`](error::PdpError::InvalidInput) for malformed
/// data, [`PdpError::InvalidConfig`](error::PdpError::InvalidConfig) for
/// out-of-range parameters, and whatever [`GaRunner::run`] reports.
#[allow(clippy::too_many_arguments)]
pub fn solve(
    distance: Vec<Vec<f64>>,
    toll: Vec<Vec<f64>>,
    vehicles: &[VehicleRow],
    transports: &[TransportRow],
    population_size: usize,
    generations: usize,
    crossover_rate: f64,
    mutation_rate: f64,
) -> PdpResult<Vec<Chromosome>> {
    let problem = PdpProblem::from_matrices(distance, toll, vehicles, transports)?;
    let mut config = GaConfig::default()
        .with_population_size(population_size)
        .with_max_generations(generations);
    config.crossover_rate = crossover_rate;
    config.mutation_rate = mutation_rate;
    GaRunner::run(&problem, &config).map(|result| result.pareto_front)
}
