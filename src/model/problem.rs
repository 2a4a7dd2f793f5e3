//! Problem instance: cost matrices, fleet, and transport jobs.

use std::collections::BTreeMap;

use super::{Transport, Vehicle};
use crate::error::{PdpError, PdpResult};

/// Input row for a vehicle: `(code, depot, capacity, fixed_cost, speed, load_factor)`.
pub type VehicleRow = [u32; 6];

/// Input row for a transport:
/// `(pickup, delivery, earliest_pickup, earliest_delivery, amount)`.
pub type TransportRow = [u32; 5];

/// A multi-depot pickup-and-delivery instance.
///
/// Depots, pickup points and delivery points share one location index
/// space; `distance` drives travel time, `toll` is the separately
/// accumulated toll-distance objective. All tables are read-only once
/// built; everything else in the crate refers into them by index.
///
/// # Examples
///
/// ```
/// use u_mdpdp::model::PdpProblem;
///
/// let distance = vec![vec![0.0, 4.0], vec![4.0, 0.0]];
/// let toll = distance.clone();
/// let problem = PdpProblem::from_matrices(
///     distance,
///     toll,
///     &[[0, 0, 10, 0, 1, 1]],
///     &[[0, 1, 0, 0, 5]],
/// )
/// .unwrap();
/// assert_eq!(problem.num_vehicles(), 1);
/// assert_eq!(problem.num_transports(), 1);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PdpProblem {
    distance: Vec<Vec<f64>>,
    toll: Vec<Vec<f64>>,
    vehicles: Vec<Vehicle>,
    transports: Vec<Transport>,
}

impl PdpProblem {
    /// Builds and validates an instance.
    ///
    /// Vehicle and transport ids must equal their positions.
    ///
    /// # Errors
    /// [`PdpError::InvalidInput`] if the matrices are not square and of equal
    /// size, a location is out of range, a cost is negative, a vehicle has
    /// non-positive speed or load factor, ids do not match positions, or a
    /// transport is heavier than every vehicle's capacity.
    pub fn new(
        distance: Vec<Vec<f64>>,
        toll: Vec<Vec<f64>>,
        vehicles: Vec<Vehicle>,
        transports: Vec<Transport>,
    ) -> PdpResult<Self> {
        let problem = Self {
            distance,
            toll,
            vehicles,
            transports,
        };
        problem.validate()?;
        Ok(problem)
    }

    /// Builds an instance from integer row matrices.
    ///
    /// Vehicle ids and transport ids are assigned from row order.
    pub fn from_matrices(
        distance: Vec<Vec<f64>>,
        toll: Vec<Vec<f64>>,
        vehicle_rows: &[VehicleRow],
        transport_rows: &[TransportRow],
    ) -> PdpResult<Self> {
        let vehicles = vehicle_rows
            .iter()
            .enumerate()
            .map(|(id, row)| {
                Vehicle::new(id, row[1] as usize, row[2])
                    .with_code(row[0])
                    .with_fixed_cost(row[3] as f64)
                    .with_speed(row[4] as f64)
                    .with_load_factor(row[5] as f64)
            })
            .collect();
        let transports = transport_rows
            .iter()
            .enumerate()
            .map(|(id, row)| {
                Transport::new(id, row[0] as usize, row[1] as usize, row[4])
                    .with_ready_times(row[2] as f64, row[3] as f64)
            })
            .collect();
        Self::new(distance, toll, vehicles, transports)
    }

    fn validate(&self) -> PdpResult<()> {
        let n = self.distance.len();
        if n == 0 {
            return Err(invalid("distance matrix is empty"));
        }
        if self.toll.len() != n {
            return Err(invalid(format!(
                "toll matrix has {} rows, distance matrix has {n}",
                self.toll.len()
            )));
        }
        for (name, matrix) in [("distance", &self.distance), ("toll", &self.toll)] {
            for (i, row) in matrix.iter().enumerate() {
                if row.len() != n {
                    return Err(invalid(format!(
                        "{name} matrix row {i} has {} columns, expected {n}",
                        row.len()
                    )));
                }
                if row.iter().any(|&c| !(c >= 0.0)) {
                    return Err(invalid(format!("{name} matrix row {i} has a negative cost")));
                }
            }
        }

        if self.vehicles.is_empty() {
            return Err(invalid("no vehicles"));
        }
        for (i, v) in self.vehicles.iter().enumerate() {
            if v.id() != i {
                return Err(invalid(format!("vehicle at position {i} has id {}", v.id())));
            }
            if v.depot() >= n {
                return Err(invalid(format!("vehicle {i} depot {} out of range", v.depot())));
            }
            if !(v.speed() > 0.0) || !(v.load_factor() > 0.0) {
                return Err(invalid(format!(
                    "vehicle {i} needs positive speed and load factor"
                )));
            }
        }

        let max_capacity = self.max_capacity();
        for (i, t) in self.transports.iter().enumerate() {
            if t.id != i {
                return Err(invalid(format!("transport at position {i} has id {}", t.id)));
            }
            if t.pickup >= n || t.delivery >= n {
                return Err(invalid(format!("transport {i} location out of range")));
            }
            if t.amount > max_capacity {
                return Err(invalid(format!(
                    "transport {i} amount {} exceeds every vehicle capacity (max {max_capacity})",
                    t.amount
                )));
            }
        }
        Ok(())
    }

    /// All vehicles, indexed by id.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// All transports, indexed by id.
    pub fn transports(&self) -> &[Transport] {
        &self.transports
    }

    /// Vehicle by id.
    pub fn vehicle(&self, id: usize) -> &Vehicle {
        &self.vehicles[id]
    }

    /// Transport by id.
    pub fn transport(&self, id: usize) -> &Transport {
        &self.transports[id]
    }

    /// Number of vehicles.
    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    /// Number of transports.
    pub fn num_transports(&self) -> usize {
        self.transports.len()
    }

    /// Number of locations.
    pub fn num_locations(&self) -> usize {
        self.distance.len()
    }

    /// Travel distance between two locations.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distance[from][to]
    }

    /// Toll distance between two locations.
    pub fn toll(&self, from: usize, to: usize) -> f64 {
        self.toll[from][to]
    }

    /// Largest capacity in the fleet.
    pub fn max_capacity(&self) -> u32 {
        self.vehicles.iter().map(|v| v.capacity()).max().unwrap_or(0)
    }

    /// Distinct depots, each with the ids of the vehicles based there.
    pub fn depots(&self) -> BTreeMap<usize, Vec<usize>> {
        let mut depots: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for v in &self.vehicles {
            depots.entry(v.depot()).or_default().push(v.id());
        }
        depots
    }
}

fn invalid(msg: impl Into<String>) -> PdpError {
    PdpError::InvalidInput(msg.into())
}
