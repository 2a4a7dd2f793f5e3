//! Single-vehicle routing: evaluation, construction, and local search.
//!
//! Everything here works on one vehicle's [`Route`](crate::model::Route)
//! at a time. The evaluator is the feasibility oracle; constructors and
//! local search only decide which route to hand it.
//!
//! # Key Types
//!
//! - [`RouteStrategy`]: Selects one of the three route constructors
//!
//! # Operations
//!
//! - [`evaluate`]: `(toll distance, completion time)` or the infeasible sentinel
//! - [`best_insertion`], [`greedy_next`], [`paired_then_shuffle`]: constructors
//! - [`insert_best`]: add one transport to an existing route
//! - [`swap_optimize`], [`relocate_subroute`]: in-place perturbation

mod construct;
mod evaluator;
mod local_search;

pub use construct::{best_insertion, greedy_next, insert_best, paired_then_shuffle, RouteStrategy};
pub use evaluator::{covers_exactly, evaluate, is_feasible, total_time, total_toll_distance};
pub use local_search::{relocate_subroute, swap_optimize};
