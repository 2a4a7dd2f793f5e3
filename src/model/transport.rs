//! Transport job type.

/// A pickup-and-delivery job.
///
/// The load `amount` is picked up at `pickup` no earlier than
/// `pickup_ready` and dropped at `delivery` no earlier than
/// `delivery_ready`. Arriving early means waiting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transport {
    /// Index in the problem's transport table.
    pub id: usize,
    /// Pickup location.
    pub pickup: usize,
    /// Delivery location.
    pub delivery: usize,
    /// Earliest time the load is ready at the pickup location.
    pub pickup_ready: f64,
    /// Earliest time the delivery location accepts the load.
    pub delivery_ready: f64,
    /// Load amount.
    pub amount: u32,
}

impl Transport {
    /// Creates a transport with no ready-time restrictions.
    pub fn new(id: usize, pickup: usize, delivery: usize, amount: u32) -> Self {
        Self {
            id,
            pickup,
            delivery,
            pickup_ready: 0.0,
            delivery_ready: 0.0,
            amount,
        }
    }

    /// Sets the earliest ready times at both ends.
    pub fn with_ready_times(mut self, pickup_ready: f64, delivery_ready: f64) -> Self {
        self.pickup_ready = pickup_ready;
        self.delivery_ready = delivery_ready;
        self
    }
}
