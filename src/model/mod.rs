//! Domain model for the multi-depot pickup-and-delivery problem.
//!
//! - [`Vehicle`], [`Transport`]: immutable input records, referenced by index
//! - [`TransportNode`], [`Route`]: route events with depot sentinels
//! - [`ObjectivesPoint`]: (toll distance, time) with Pareto dominance
//! - [`PdpProblem`]: the validated instance tying them together

mod node;
mod objectives;
mod problem;
mod transport;
mod vehicle;

pub use node::{
    delivery_position, empty_route, picked_transports, pickup_positions, Route, TransportNode,
};
pub use objectives::{Dominance, ObjectivesPoint};
pub use problem::{PdpProblem, TransportRow, VehicleRow};
pub use transport::Transport;
pub use vehicle::Vehicle;
