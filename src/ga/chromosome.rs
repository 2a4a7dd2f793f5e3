//! Gene and chromosome types.

use rand::Rng;

use super::types::Individual;
use crate::error::PdpResult;
use crate::model::{ObjectivesPoint, PdpProblem, Route};
use crate::route::{insert_best, total_time, total_toll_distance, RouteStrategy};

/// One vehicle's share of a solution: the transports it carries and the
/// route serving them.
///
/// `total_time` and `total_toll_distance` are cached from the route and
/// must be refreshed with [`refresh_totals`](Self::refresh_totals) after
/// any change to the route or the vehicle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gene {
    vehicle: usize,
    depot: usize,
    deploy_cost: f64,
    transports: Vec<usize>,
    route: Route,
    total_time: f64,
    total_toll_distance: f64,
}

impl Gene {
    /// Builds a gene by constructing a route with `strategy`.
    ///
    /// # Errors
    /// Propagates [`PdpError::Construction`](crate::error::PdpError::Construction)
    /// from the route constructor.
    pub fn build<R: Rng>(
        problem: &PdpProblem,
        vehicle: usize,
        transports: Vec<usize>,
        strategy: RouteStrategy,
        rng: &mut R,
    ) -> PdpResult<Self> {
        let route = strategy.build(problem, vehicle, &transports, rng)?;
        Ok(Self::with_route(problem, vehicle, transports, route))
    }

    /// Wraps an existing route. The route is not checked.
    pub fn with_route(
        problem: &PdpProblem,
        vehicle: usize,
        transports: Vec<usize>,
        route: Route,
    ) -> Self {
        let v = problem.vehicle(vehicle);
        let mut gene = Self {
            vehicle,
            depot: v.depot(),
            deploy_cost: v.fixed_cost(),
            transports,
            route,
            total_time: 0.0,
            total_toll_distance: 0.0,
        };
        gene.refresh_totals(problem);
        gene
    }

    /// Recomputes the cached time and toll distance from the route.
    pub fn refresh_totals(&mut self, problem: &PdpProblem) {
        self.total_time = total_time(problem, self.vehicle, &self.route);
        self.total_toll_distance = total_toll_distance(problem, self.vehicle, &self.route);
    }

    /// Vehicle id.
    pub fn vehicle(&self) -> usize {
        self.vehicle
    }

    /// Depot of the vehicle.
    pub fn depot(&self) -> usize {
        self.depot
    }

    /// Fixed deployment cost of the vehicle.
    pub fn deploy_cost(&self) -> f64 {
        self.deploy_cost
    }

    /// Assigned transport ids.
    pub fn transports(&self) -> &[usize] {
        &self.transports
    }

    /// The route, depot first and last.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Cached completion time.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Cached toll distance.
    pub fn total_toll_distance(&self) -> f64 {
        self.total_toll_distance
    }

    /// Cached `(toll distance, time)`.
    pub fn objectives(&self) -> ObjectivesPoint {
        ObjectivesPoint::new(self.total_toll_distance, self.total_time)
    }

    /// Moves this gene, route unchanged, onto another vehicle.
    pub(crate) fn reassign_vehicle(&mut self, problem: &PdpProblem, vehicle: usize) {
        let v = problem.vehicle(vehicle);
        self.vehicle = vehicle;
        self.depot = v.depot();
        self.deploy_cost = v.fixed_cost();
        self.refresh_totals(problem);
    }

    /// Replaces assignment and route together.
    pub(crate) fn replace(&mut self, problem: &PdpProblem, transports: Vec<usize>, route: Route) {
        self.transports = transports;
        self.route = route;
        self.refresh_totals(problem);
    }

    /// Adds one transport at a front-0 insertion position.
    ///
    /// # Errors
    /// [`PdpError::Construction`](crate::error::PdpError::Construction) if no
    /// feasible position exists; the gene is unchanged then.
    pub(crate) fn add_transport<R: Rng>(
        &mut self,
        problem: &PdpProblem,
        transport: usize,
        rng: &mut R,
    ) -> PdpResult<()> {
        insert_best(problem, self.vehicle, &mut self.route, transport, rng)?;
        self.transports.push(transport);
        self.refresh_totals(problem);
        Ok(())
    }

    /// Mutable route and assignment for in-place local search. Totals must
    /// be refreshed afterwards.
    pub(crate) fn parts_mut(&mut self) -> (usize, &[usize], &mut Route) {
        (self.vehicle, &self.transports, &mut self.route)
    }
}

/// A complete solution: one gene per used vehicle.
///
/// Vehicles are distinct across genes and the genes' transport sets
/// partition the problem's transports; [`check_valid`](super::check_valid)
/// verifies both.
///
/// # Examples
///
/// ```
/// use u_mdpdp::ga::{Chromosome, Gene};
/// use u_mdpdp::model::{PdpProblem, TransportNode::*};
///
/// let d = vec![vec![0.0, 3.0, 5.0], vec![3.0, 0.0, 2.0], vec![5.0, 2.0, 0.0]];
/// let p = PdpProblem::from_matrices(d.clone(), d, &[[0, 0, 10, 0, 1, 1]], &[[1, 2, 0, 0, 1]])
///     .unwrap();
///
/// let gene = Gene::with_route(&p, 0, vec![0], vec![Depot, Pickup(0), Delivery(0), Depot]);
/// let c = Chromosome::new(vec![gene]);
/// assert_eq!(c.total_toll_distance(), 10.0);
/// assert_eq!(c.max_time(), 12.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chromosome {
    genes: Vec<Gene>,
}

impl Chromosome {
    /// Creates a chromosome from genes.
    pub fn new(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    /// The genes.
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub(crate) fn genes_mut(&mut self) -> &mut Vec<Gene> {
        &mut self.genes
    }

    /// Sum of the genes' toll distances.
    pub fn total_toll_distance(&self) -> f64 {
        self.genes.iter().map(Gene::total_toll_distance).sum()
    }

    /// Largest completion time over all genes; 0 for an empty chromosome.
    pub fn max_time(&self) -> f64 {
        self.genes
            .iter()
            .map(Gene::total_time)
            .fold(0.0, f64::max)
    }

    /// Sum of the used vehicles' fixed costs. Reported only.
    pub fn total_deploy_cost(&self) -> f64 {
        self.genes.iter().map(Gene::deploy_cost).sum()
    }
}

impl Individual for Chromosome {
    fn objectives(&self) -> ObjectivesPoint {
        ObjectivesPoint::new(self.total_toll_distance(), self.max_time())
    }
}
