//! Vehicle type.

/// A vehicle based at a depot.
///
/// Vehicles are referenced everywhere by `id`, which is their index in
/// [`PdpProblem::vehicles`](super::PdpProblem::vehicles). `code` is the
/// caller's own identifier and is only carried along for reporting.
///
/// # Examples
///
/// ```
/// use u_mdpdp::model::Vehicle;
///
/// let v = Vehicle::new(0, 3, 20).with_speed(2.0).with_load_factor(5.0);
/// assert_eq!(v.depot(), 3);
/// assert_eq!(v.capacity(), 20);
/// assert_eq!(v.speed(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    id: usize,
    code: u32,
    depot: usize,
    capacity: u32,
    fixed_cost: f64,
    speed: f64,
    load_factor: f64,
}

impl Vehicle {
    /// Creates a vehicle with unit speed, unit load factor and no fixed cost.
    pub fn new(id: usize, depot: usize, capacity: u32) -> Self {
        Self {
            id,
            code: id as u32,
            depot,
            capacity,
            fixed_cost: 0.0,
            speed: 1.0,
            load_factor: 1.0,
        }
    }

    /// Sets the external vehicle code.
    pub fn with_code(mut self, code: u32) -> Self {
        self.code = code;
        self
    }

    /// Sets the fixed deployment cost.
    pub fn with_fixed_cost(mut self, cost: f64) -> Self {
        self.fixed_cost = cost;
        self
    }

    /// Sets travel speed (distance units per time unit).
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Sets the load/unload rate (amount units per time unit).
    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Index of this vehicle in the problem's vehicle table.
    pub fn id(&self) -> usize {
        self.id
    }

    /// External code from the input data.
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Home depot location (start and end of every route).
    pub fn depot(&self) -> usize {
        self.depot
    }

    /// Maximum load on board at any time.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Fixed cost for deploying this vehicle.
    pub fn fixed_cost(&self) -> f64 {
        self.fixed_cost
    }

    /// Travel speed.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Load/unload rate.
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Time to travel `distance` at this vehicle's speed.
    pub fn travel_time(&self, distance: f64) -> f64 {
        distance / self.speed
    }

    /// Time to load or unload `amount`.
    pub fn service_time(&self, amount: u32) -> f64 {
        amount as f64 / self.load_factor
    }

    /// Returns `true` if `amount` fits on an empty vehicle.
    pub fn can_carry(&self, amount: u32) -> bool {
        amount <= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_defaults() {
        let v = Vehicle::new(4, 1, 10);
        assert_eq!(v.id(), 4);
        assert_eq!(v.code(), 4);
        assert_eq!(v.fixed_cost(), 0.0);
        assert_eq!(v.speed(), 1.0);
        assert_eq!(v.load_factor(), 1.0);
    }

    #[test]
    fn test_vehicle_timing() {
        let v = Vehicle::new(0, 0, 10).with_speed(4.0).with_load_factor(2.0);
        assert_eq!(v.travel_time(20.0), 5.0);
        assert_eq!(v.service_time(6), 3.0);
        assert!(v.can_carry(10));
        assert!(!v.can_carry(11));
    }
}
