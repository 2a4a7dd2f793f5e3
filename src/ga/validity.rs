//! Chromosome invariant check.

use super::chromosome::Chromosome;
use crate::error::{PdpResult, Violation};
use crate::model::PdpProblem;
use crate::route::is_feasible;

/// Verifies every solution invariant of `chromosome`.
///
/// Checked per gene: the vehicle is not used by an earlier gene, every
/// assigned transport fits the vehicle, and the route is feasible and
/// serves exactly the assigned transports. Checked overall: every
/// transport is assigned exactly once.
///
/// # Errors
/// [`PdpError::Invariant`](crate::error::PdpError::Invariant) with the first
/// violation found.
pub fn check_valid(problem: &PdpProblem, chromosome: &Chromosome) -> PdpResult<()> {
    let mut vehicle_used = vec![false; problem.num_vehicles()];
    let mut assigned = vec![0usize; problem.num_transports()];

    for gene in chromosome.genes() {
        let vehicle = gene.vehicle();
        match vehicle_used.get_mut(vehicle) {
            None => return Err(Violation::InfeasibleRoute { vehicle }.into()),
            Some(true) => return Err(Violation::VehicleReused { vehicle }.into()),
            Some(used) => *used = true,
        }

        let capacity = problem.vehicle(vehicle).capacity();
        for &transport in gene.transports() {
            let Some(count) = assigned.get_mut(transport) else {
                return Err(Violation::InfeasibleRoute { vehicle }.into());
            };
            if problem.transport(transport).amount > capacity {
                return Err(Violation::OverCapacity { vehicle, transport }.into());
            }
            *count += 1;
        }

        if !is_feasible(problem, vehicle, gene.transports(), gene.route()) {
            return Err(Violation::InfeasibleRoute { vehicle }.into());
        }
    }

    for (transport, &count) in assigned.iter().enumerate() {
        match count {
            0 => return Err(Violation::Unassigned { transport }.into()),
            1 => {}
            _ => return Err(Violation::AssignedTwice { transport }.into()),
        }
    }

    Ok(())
}
