//! Route evaluation: feasibility, completion time, and toll distance.
//!
//! A route is simulated event by event starting at the vehicle's depot at
//! time 0:
//!
//! ```text
//! travel  = distance[prev][cur] / speed
//! arrival = max(time + travel, ready(cur))
//! time    = arrival + amount(cur) / load_factor     (no service at the final depot)
//! toll   += toll[prev][cur]
//! ```
//!
//! [`evaluate`] is the oracle every other component consults. It is a pure
//! function of its inputs.

use crate::model::{picked_transports, ObjectivesPoint, PdpProblem, TransportNode};

/// Evaluates a route for the given vehicle.
///
/// Returns [`ObjectivesPoint::INVALID`] when the route does not start and
/// end at the depot, contains the depot elsewhere, references an unknown
/// transport, picks a transport up twice, delivers something not on board,
/// leaves something undelivered, or exceeds the vehicle's capacity at any
/// prefix. Otherwise returns `(toll distance, completion time)`.
///
/// # Examples
///
/// ```
/// use u_mdpdp::model::{PdpProblem, TransportNode::*};
/// use u_mdpdp::route::evaluate;
///
/// let d = vec![vec![0.0, 2.0, 4.0], vec![2.0, 0.0, 2.0], vec![4.0, 2.0, 0.0]];
/// let p = PdpProblem::from_matrices(d.clone(), d, &[[0, 0, 10, 0, 1, 1]], &[[1, 2, 0, 0, 3]])
///     .unwrap();
///
/// let value = evaluate(&p, 0, &[Depot, Pickup(0), Delivery(0), Depot]);
/// assert_eq!(value.toll_distance, 8.0);
/// assert_eq!(value.time, 14.0); // 2 + 3 (load) + 2 + 3 (unload) + 4
///
/// assert!(!evaluate(&p, 0, &[Depot, Delivery(0), Pickup(0), Depot]).is_valid());
/// ```
pub fn evaluate(problem: &PdpProblem, vehicle: usize, route: &[TransportNode]) -> ObjectivesPoint {
    let len = route.len();
    if len < 2 || !route[0].is_depot() || !route[len - 1].is_depot() {
        return ObjectivesPoint::INVALID;
    }

    let v = problem.vehicle(vehicle);
    let n = problem.num_transports();
    // 0 = not yet picked up, 1 = on board, 2 = delivered
    let mut state = vec![0u8; n];
    let mut load: u64 = 0;
    let mut time = 0.0;
    let mut toll = 0.0;
    let mut prev = v.depot();

    for (i, node) in route.iter().enumerate().skip(1) {
        match *node {
            TransportNode::Depot if i != len - 1 => return ObjectivesPoint::INVALID,
            TransportNode::Depot => {}
            TransportNode::Pickup(t) => {
                if t >= n || state[t] != 0 {
                    return ObjectivesPoint::INVALID;
                }
                state[t] = 1;
                load += problem.transport(t).amount as u64;
                if load > v.capacity() as u64 {
                    return ObjectivesPoint::INVALID;
                }
            }
            TransportNode::Delivery(t) => {
                if t >= n || state[t] != 1 {
                    return ObjectivesPoint::INVALID;
                }
                state[t] = 2;
                load -= problem.transport(t).amount as u64;
            }
        }

        let (location, ready, service) = stop(problem, vehicle, node);
        time = (time + v.travel_time(problem.distance(prev, location))).max(ready) + service;
        toll += problem.toll(prev, location);
        prev = location;
    }

    if state.contains(&1) {
        return ObjectivesPoint::INVALID;
    }

    ObjectivesPoint::new(toll, time)
}

/// Completion time of a route already known to be feasible.
pub fn total_time(problem: &PdpProblem, vehicle: usize, route: &[TransportNode]) -> f64 {
    let v = problem.vehicle(vehicle);
    let mut time = 0.0;
    let mut prev = v.depot();
    for node in route.iter().skip(1) {
        let (location, ready, service) = stop(problem, vehicle, node);
        time = (time + v.travel_time(problem.distance(prev, location))).max(ready) + service;
        prev = location;
    }
    time
}

/// Toll distance of a route already known to be feasible.
pub fn total_toll_distance(problem: &PdpProblem, vehicle: usize, route: &[TransportNode]) -> f64 {
    let mut toll = 0.0;
    let mut prev = problem.vehicle(vehicle).depot();
    for node in route.iter().skip(1) {
        let (location, _, _) = stop(problem, vehicle, node);
        toll += problem.toll(prev, location);
        prev = location;
    }
    toll
}

/// Returns `true` if the route's pickups are exactly `transports`
/// (no omissions, no extras, no duplicates).
pub fn covers_exactly(route: &[TransportNode], transports: &[usize]) -> bool {
    let mut picked = picked_transports(route);
    if picked.len() != transports.len() {
        return false;
    }
    let mut expected = transports.to_vec();
    picked.sort_unstable();
    expected.sort_unstable();
    picked == expected
}

/// Evaluator-feasible and serving exactly the assigned transports.
pub fn is_feasible(
    problem: &PdpProblem,
    vehicle: usize,
    transports: &[usize],
    route: &[TransportNode],
) -> bool {
    covers_exactly(route, transports) && evaluate(problem, vehicle, route).is_valid()
}

/// Location, ready time and service time of one route event.
fn stop(problem: &PdpProblem, vehicle: usize, node: &TransportNode) -> (usize, f64, f64) {
    let v = problem.vehicle(vehicle);
    match *node {
        TransportNode::Depot => (v.depot(), 0.0, 0.0),
        TransportNode::Pickup(t) => {
            let tr = problem.transport(t);
            (tr.pickup, tr.pickup_ready, v.service_time(tr.amount))
        }
        TransportNode::Delivery(t) => {
            let tr = problem.transport(t);
            (tr.delivery, tr.delivery_ready, v.service_time(tr.amount))
        }
    }
}
