//! Route constructors.
//!
//! Three strategies build a feasible route for one vehicle from its
//! assigned transports:
//!
//! - [`best_insertion`]: inserts transports one by one at a random
//!   Pareto-optimal position pair.
//! - [`greedy_next`]: grows the route event by event, picking the best next
//!   pickup or delivery.
//! - [`paired_then_shuffle`]: places every delivery right after its pickup,
//!   then diversifies with [`swap_optimize`].
//!
//! All three return [`PdpError::Construction`] instead of an infeasible
//! route. The caller is expected to retry with another assignment.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use super::evaluator::{evaluate, is_feasible};
use super::local_search::swap_optimize;
use crate::error::{PdpError, PdpResult};
use crate::ga::multi_objective::{non_dominated_sort, KeyedObjectives};
use crate::model::{empty_route, ObjectivesPoint, PdpProblem, Route, TransportNode};

/// Route construction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RouteStrategy {
    /// See [`best_insertion`].
    BestInsertion,
    /// See [`greedy_next`].
    GreedyNext,
    /// See [`paired_then_shuffle`].
    PairedShuffle,
}

impl RouteStrategy {
    /// Builds a route for `vehicle` serving exactly `transports`.
    pub fn build<R: Rng>(
        self,
        problem: &PdpProblem,
        vehicle: usize,
        transports: &[usize],
        rng: &mut R,
    ) -> PdpResult<Route> {
        match self {
            RouteStrategy::BestInsertion => best_insertion(problem, vehicle, transports, rng),
            RouteStrategy::GreedyNext => greedy_next(problem, vehicle, transports, rng),
            RouteStrategy::PairedShuffle => paired_then_shuffle(problem, vehicle, transports, rng),
        }
    }
}

/// Builds a route by inserting each transport at a random front-0 position.
///
/// # Errors
/// [`PdpError::Construction`] if some transport has no feasible position.
pub fn best_insertion<R: Rng>(
    problem: &PdpProblem,
    vehicle: usize,
    transports: &[usize],
    rng: &mut R,
) -> PdpResult<Route> {
    let mut route = empty_route();
    for &transport in transports {
        insert_best(problem, vehicle, &mut route, transport, rng)?;
    }
    Ok(route)
}

/// Inserts one transport into an existing route.
///
/// Every `(pickup, delivery)` position pair that keeps the load within
/// capacity is evaluated; one of the non-dominated feasible candidates is
/// chosen uniformly at random.
///
/// # Errors
/// [`PdpError::Construction`] if no feasible position pair exists. The
/// route is left untouched in that case.
pub fn insert_best<R: Rng>(
    problem: &PdpProblem,
    vehicle: usize,
    route: &mut Route,
    transport: usize,
    rng: &mut R,
) -> PdpResult<()> {
    let amount = problem.transport(transport).amount as u64;
    let capacity = problem.vehicle(vehicle).capacity() as u64;
    let loads = prefix_loads(problem, route);
    let len = route.len();

    // (pickup index, delivery index) in the route after both insertions
    let mut positions = Vec::new();
    let mut candidates = Vec::new();
    for p in 1..len {
        if loads[p - 1] + amount > capacity {
            continue;
        }
        for d in (p + 1)..=len {
            // original node d-2 now sits between the new pickup and delivery
            if d > p + 1 && loads[d - 2] + amount > capacity {
                break;
            }
            let mut candidate = route.clone();
            candidate.insert(p, TransportNode::Pickup(transport));
            candidate.insert(d, TransportNode::Delivery(transport));
            let value = evaluate(problem, vehicle, &candidate);
            if value.is_valid() {
                candidates.push(KeyedObjectives::new(positions.len(), value));
                positions.push((p, d));
            }
        }
    }

    let fronts = non_dominated_sort(&candidates);
    let Some(chosen) = fronts.first().and_then(|front| front.choose(rng)) else {
        return Err(PdpError::Construction(format!(
            "no feasible position for transport {transport} on vehicle {vehicle}"
        )));
    };
    let (p, d) = positions[chosen.key];
    route.insert(p, TransportNode::Pickup(transport));
    route.insert(d, TransportNode::Delivery(transport));
    Ok(())
}

/// Builds a route one event at a time.
///
/// Each step computes the cheapest next pickup (among transports not yet
/// loaded that fit the remaining capacity) and the cheapest next delivery
/// (among transports on board), each costed as `(toll of the leg, time
/// after serving it)`. Candidates are kept by running Pareto best in
/// shuffled order. The pickup is taken only if it dominates the delivery;
/// otherwise the delivery wins.
///
/// # Errors
/// [`PdpError::Construction`] if at some step nothing can be loaded and
/// nothing is on board.
pub fn greedy_next<R: Rng>(
    problem: &PdpProblem,
    vehicle: usize,
    transports: &[usize],
    rng: &mut R,
) -> PdpResult<Route> {
    let v = problem.vehicle(vehicle);
    let mut waiting = transports.to_vec();
    waiting.shuffle(rng);
    let mut on_board: Vec<usize> = Vec::new();

    let mut route = vec![TransportNode::Depot];
    let mut location = v.depot();
    let mut time = 0.0;
    let mut load: u64 = 0;

    let step = |location: usize, time: f64, to: usize, ready: f64, amount: u32| {
        let finish = (time + v.travel_time(problem.distance(location, to))).max(ready)
            + v.service_time(amount);
        ObjectivesPoint::new(problem.toll(location, to), finish)
    };

    while !waiting.is_empty() || !on_board.is_empty() {
        let mut pickup: Option<(usize, ObjectivesPoint)> = None;
        for (i, &t) in waiting.iter().enumerate() {
            let tr = problem.transport(t);
            if load + tr.amount as u64 > v.capacity() as u64 {
                continue;
            }
            let point = step(location, time, tr.pickup, tr.pickup_ready, tr.amount);
            if pickup.map_or(true, |(_, best)| point.dominates(&best)) {
                pickup = Some((i, point));
            }
        }

        let mut delivery: Option<(usize, ObjectivesPoint)> = None;
        for (i, &t) in on_board.iter().enumerate() {
            let tr = problem.transport(t);
            let point = step(location, time, tr.delivery, tr.delivery_ready, tr.amount);
            if delivery.map_or(true, |(_, best)| point.dominates(&best)) {
                delivery = Some((i, point));
            }
        }

        let take_pickup = match (pickup, delivery) {
            (Some(_), None) => true,
            (Some((_, p)), Some((_, d))) => p.dominates(&d),
            (None, Some(_)) => false,
            (None, None) => {
                return Err(PdpError::Construction(format!(
                    "vehicle {vehicle} cannot load any remaining transport"
                )))
            }
        };

        if let (true, Some((i, point))) = (take_pickup, pickup) {
            let t = waiting.remove(i);
            let tr = problem.transport(t);
            route.push(TransportNode::Pickup(t));
            on_board.push(t);
            load += tr.amount as u64;
            location = tr.pickup;
            time = point.time;
        } else if let Some((i, point)) = delivery {
            let t = on_board.remove(i);
            let tr = problem.transport(t);
            route.push(TransportNode::Delivery(t));
            load -= tr.amount as u64;
            location = tr.delivery;
            time = point.time;
        }
    }

    route.push(TransportNode::Depot);
    if !is_feasible(problem, vehicle, transports, &route) {
        return Err(PdpError::Construction(format!(
            "greedy route for vehicle {vehicle} is infeasible"
        )));
    }
    Ok(route)
}

/// Builds a route with every delivery right after its pickup, in random
/// pair order, then perturbs it with [`swap_optimize`] in diversify mode.
///
/// # Errors
/// [`PdpError::Construction`] if a single transport already exceeds the
/// vehicle's capacity.
pub fn paired_then_shuffle<R: Rng>(
    problem: &PdpProblem,
    vehicle: usize,
    transports: &[usize],
    rng: &mut R,
) -> PdpResult<Route> {
    let mut order = transports.to_vec();
    order.shuffle(rng);

    let mut route = Vec::with_capacity(2 * order.len() + 2);
    route.push(TransportNode::Depot);
    for &t in &order {
        route.push(TransportNode::Pickup(t));
        route.push(TransportNode::Delivery(t));
    }
    route.push(TransportNode::Depot);

    if !is_feasible(problem, vehicle, transports, &route) {
        return Err(PdpError::Construction(format!(
            "paired route for vehicle {vehicle} is infeasible"
        )));
    }
    swap_optimize(problem, vehicle, &mut route, transports, false, rng);
    Ok(route)
}

/// Load on board after each route position.
fn prefix_loads(problem: &PdpProblem, route: &[TransportNode]) -> Vec<u64> {
    let mut load: u64 = 0;
    route
        .iter()
        .map(|node| {
            match *node {
                TransportNode::Pickup(t) => load += problem.transport(t).amount as u64,
                TransportNode::Delivery(t) => {
                    load = load.saturating_sub(problem.transport(t).amount as u64)
                }
                TransportNode::Depot => {}
            }
            load
        })
        .collect()
}
