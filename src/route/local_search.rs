//! In-place route perturbation.
//!
//! Both operators leave the route feasible when it was feasible on entry:
//! a proposal is only ever adopted after [`is_feasible`] accepts it.
//!
//! - [`swap_optimize`]: moves one pickup/delivery pair per step, once per
//!   route position.
//! - [`relocate_subroute`]: cuts the stretch from a pickup through its
//!   delivery and reinserts it elsewhere.
//!
//! With `optimize == true` both operators hill-climb under Pareto
//! dominance; with `optimize == false` they diversify and accept any move
//! that is not strictly worse (swap) or any feasible move at all
//! (relocate).

use rand::seq::IndexedRandom;
use rand::Rng;

use super::evaluator::{evaluate, is_feasible, total_time, total_toll_distance};
use crate::model::{
    delivery_position, pickup_positions, ObjectivesPoint, PdpProblem, Route, TransportNode,
};

/// Randomly swaps pickup/delivery pairs to new positions, once per route
/// position.
///
/// Each step picks a random pickup, swaps it with a random later position,
/// then swaps its delivery with a random position after the
/// pickup's new slot. When the pickup lands on the last interior slot the
/// delivery is moved to just before the trailing depot instead.
///
/// No-op on routes without transports.
pub fn swap_optimize<R: Rng>(
    problem: &PdpProblem,
    vehicle: usize,
    route: &mut Route,
    transports: &[usize],
    optimize: bool,
    rng: &mut R,
) {
    for _ in 0..route.len() {
        let Some(&from) = pickup_positions(route).choose(rng) else {
            return;
        };
        let Some(transport) = route[from].transport() else {
            return;
        };
        let current = current_point(problem, vehicle, route);
        let last = route.len() - 2;
        if from >= last {
            return;
        }

        let mut proposal = route.clone();
        let to = later_position(from, last, rng);
        proposal.swap(from, to);
        let Some(delivery) = delivery_position(&proposal, transport) else {
            continue;
        };
        if to == last {
            let node = proposal.remove(delivery);
            let end = proposal.len() - 1;
            proposal.insert(end, node);
        } else {
            let target = rng.random_range(to + 1..=last);
            proposal.swap(delivery, target);
        }

        if !is_feasible(problem, vehicle, transports, &proposal) {
            continue;
        }
        let value = evaluate(problem, vehicle, &proposal);
        let accept = if optimize {
            value.dominates(&current)
        } else {
            !current.dominates(&value)
        };
        if accept {
            *route = proposal;
        }
    }
}

fn later_position<R: Rng>(from: usize, last: usize, rng: &mut R) -> usize {
    rng.random_range(from + 1..=last)
}

/// Moves the stretch from a random pickup through its delivery to another
/// position.
///
/// In optimize mode the reinsertion point is the running Pareto best over
/// all feasible positions (coin flip between incomparable candidates), and
/// the move is kept only if it dominates the route's original value. In
/// diversify mode any feasible position is chosen uniformly. If no move is
/// kept the stretch goes back where it was.
///
/// No-op on routes without transports.
pub fn relocate_subroute<R: Rng>(
    problem: &PdpProblem,
    vehicle: usize,
    route: &mut Route,
    transports: &[usize],
    optimize: bool,
    rng: &mut R,
) {
    let Some(&start) = pickup_positions(route).choose(rng) else {
        return;
    };
    let Some(end) = route[start]
        .transport()
        .and_then(|t| delivery_position(route, t))
    else {
        return;
    };
    if end < start {
        return;
    }

    let original = current_point(problem, vehicle, route);
    let stretch: Vec<_> = route.drain(start..=end).collect();

    let mut best: Option<(usize, ObjectivesPoint)> = None;
    let mut feasible = Vec::new();
    for at in 1..route.len() {
        let mut candidate = route.clone();
        candidate.splice(at..at, stretch.iter().copied());
        if !is_feasible(problem, vehicle, transports, &candidate) {
            continue;
        }
        if !optimize {
            feasible.push(at);
            continue;
        }
        let value = evaluate(problem, vehicle, &candidate);
        let take = match best {
            None => true,
            Some((_, b)) if value.dominates(&b) => true,
            Some((_, b)) => !b.dominates(&value) && rng.random_bool(0.5),
        };
        if take {
            best = Some((at, value));
        }
    }

    let at = if optimize {
        best.filter(|(_, value)| value.dominates(&original))
            .map(|(at, _)| at)
    } else {
        feasible.choose(rng).copied()
    }
    .unwrap_or(start);

    route.splice(at..at, stretch);
}

/// Objective point of a route without feasibility checks.
fn current_point(problem: &PdpProblem, vehicle: usize, route: &[TransportNode]) -> ObjectivesPoint {
    ObjectivesPoint::new(
        total_toll_distance(problem, vehicle, route),
        total_time(problem, vehicle, route),
    )
}
