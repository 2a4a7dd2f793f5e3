//! Two-objective points and Pareto dominance.

/// A point in objective space: total toll distance and completion time.
///
/// Both objectives are **minimized**. The sentinel [`INVALID`](Self::INVALID)
/// marks an infeasible evaluation and must never take part in dominance
/// comparisons that decide anything; callers discard it.
///
/// # Examples
///
/// ```
/// use u_mdpdp::model::ObjectivesPoint;
///
/// let a = ObjectivesPoint::new(10.0, 20.0);
/// let b = ObjectivesPoint::new(12.0, 20.0);
/// assert!(a.dominates(&b));
/// assert!(!b.dominates(&a));
/// assert!(!a.dominates(&a));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectivesPoint {
    /// Accumulated toll distance.
    pub toll_distance: f64,
    /// Completion time.
    pub time: f64,
}

/// Pareto relation between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other (incomparable or equal).
    Neither,
}

impl ObjectivesPoint {
    /// Result of evaluating an infeasible route.
    pub const INVALID: ObjectivesPoint = ObjectivesPoint {
        toll_distance: -1.0,
        time: -1.0,
    };

    /// Starting value for running-best searches; every finite feasible
    /// point dominates it.
    pub const WORST: ObjectivesPoint = ObjectivesPoint {
        toll_distance: f64::MAX,
        time: f64::MAX,
    };

    /// Creates a point.
    pub fn new(toll_distance: f64, time: f64) -> Self {
        Self {
            toll_distance,
            time,
        }
    }

    /// Returns `false` for the infeasible sentinel.
    pub fn is_valid(&self) -> bool {
        self.toll_distance >= 0.0 && self.time >= 0.0
    }

    /// Strict Pareto dominance: `self` is no worse in both objectives and
    /// strictly better in at least one.
    pub fn dominates(&self, other: &ObjectivesPoint) -> bool {
        self.toll_distance <= other.toll_distance
            && self.time <= other.time
            && (self.toll_distance < other.toll_distance || self.time < other.time)
    }

    /// Compares two points for dominance.
    pub fn dominance(&self, other: &ObjectivesPoint) -> Dominance {
        if self.dominates(other) {
            Dominance::Left
        } else if other.dominates(self) {
            Dominance::Right
        } else {
            Dominance::Neither
        }
    }

    /// Objective value by dimension index: 0 = toll distance, 1 = time.
    pub(crate) fn coordinate(&self, dim: usize) -> f64 {
        if dim == 0 {
            self.toll_distance
        } else {
            self.time
        }
    }
}
