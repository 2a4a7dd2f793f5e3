//! Error types.
//!
//! Route infeasibility is not an error: the evaluator reports it through
//! [`ObjectivesPoint::INVALID`](crate::model::ObjectivesPoint::INVALID).
//! [`PdpError`] covers the conditions callers must branch on:
//!
//! - [`PdpError::Construction`]: no feasible insertion exists. Local and
//!   retryable with a fresh random choice.
//! - [`PdpError::Invariant`]: a chromosome broke one of the solution
//!   invariants. Fatal for whatever produced it.
//! - [`PdpError::InvalidInput`] / [`PdpError::InvalidConfig`]: rejected
//!   before the search starts.

use std::fmt;

/// Result alias used throughout the crate.
pub type PdpResult<T> = Result<T, PdpError>;

/// Errors raised by construction, validation, and the search driver.
#[derive(Debug, Clone, PartialEq)]
pub enum PdpError {
    /// Problem data is malformed or unsatisfiable (e.g. a transport no
    /// vehicle can carry).
    InvalidInput(String),

    /// Algorithm parameters are out of range.
    InvalidConfig(String),

    /// A route or assignment could not be built. Retryable.
    Construction(String),

    /// A chromosome violates a solution invariant.
    Invariant(Violation),

    /// The initial population could not be seeded within the retry budget.
    InitialPopulation {
        /// Position of the individual that could not be built.
        individual: usize,
        /// Number of attempts made.
        attempts: usize,
    },
}

/// A broken solution invariant, as reported by
/// [`check_valid`](crate::ga::check_valid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The gene's route is evaluator-infeasible or does not cover exactly
    /// the gene's assigned transports.
    InfeasibleRoute { vehicle: usize },
    /// Two genes use the same vehicle.
    VehicleReused { vehicle: usize },
    /// A transport's load exceeds the capacity of the vehicle carrying it.
    OverCapacity { vehicle: usize, transport: usize },
    /// No gene carries this transport.
    Unassigned { transport: usize },
    /// More than one gene (or one gene twice) carries this transport.
    AssignedTwice { transport: usize },
}

impl PdpError {
    /// Returns `true` for failures a caller may retry with a fresh random
    /// choice.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PdpError::Construction(_))
    }
}

impl fmt::Display for PdpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdpError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            PdpError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            PdpError::Construction(msg) => write!(f, "construction failed: {msg}"),
            PdpError::Invariant(v) => write!(f, "invariant violated: {v}"),
            PdpError::InitialPopulation {
                individual,
                attempts,
            } => write!(
                f,
                "could not build initial individual {individual} after {attempts} attempts"
            ),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::InfeasibleRoute { vehicle } => {
                write!(f, "route of vehicle {vehicle} is infeasible")
            }
            Violation::VehicleReused { vehicle } => {
                write!(f, "vehicle {vehicle} is used by more than one gene")
            }
            Violation::OverCapacity { vehicle, transport } => write!(
                f,
                "transport {transport} exceeds the capacity of vehicle {vehicle}"
            ),
            Violation::Unassigned { transport } => {
                write!(f, "transport {transport} is not assigned")
            }
            Violation::AssignedTwice { transport } => {
                write!(f, "transport {transport} is assigned more than once")
            }
        }
    }
}

impl std::error::Error for PdpError {}

impl From<Violation> for PdpError {
    fn from(v: Violation) -> Self {
        PdpError::Invariant(v)
    }
}
