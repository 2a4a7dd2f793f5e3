//! Core trait definitions for the NSGA-II loop.
//!
//! [`Individual`] is what selection needs from a population member: its
//! two-objective point. [`GenerationObserver`] is the reporting seam the
//! runner calls once per generation; a plotting sink or progress display
//! implements it, and nothing it does feeds back into the search.

use crate::model::ObjectivesPoint;

/// A candidate solution ranked by NSGA-II.
///
/// Objectives are derived from the individual on every call; they are not
/// cached by the selection machinery.
pub trait Individual: Clone + Send + Sync {
    /// Returns the `(toll distance, time)` point of this individual.
    fn objectives(&self) -> ObjectivesPoint;
}

/// Per-generation snapshot handed to a [`GenerationObserver`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationReport {
    /// Generation number (0 = the initial population after selection).
    pub generation: usize,
    /// Objective points of front 0.
    pub non_dominated: Vec<ObjectivesPoint>,
    /// Objective points of every other surviving individual.
    pub dominated: Vec<ObjectivesPoint>,
    /// Population size after survival selection.
    pub population_size: usize,
}

/// Receives a [`GenerationReport`] after each survival selection.
///
/// # Implementing
///
/// ```
/// use std::sync::Mutex;
/// use u_mdpdp::ga::{GenerationObserver, GenerationReport};
///
/// #[derive(Default)]
/// struct FrontSizes(Mutex<Vec<usize>>);
///
/// impl GenerationObserver for FrontSizes {
///     fn on_generation(&self, report: &GenerationReport) {
///         self.0.lock().unwrap().push(report.non_dominated.len());
///     }
/// }
/// ```
pub trait GenerationObserver {
    /// Called once per generation, after survival selection.
    ///
    /// The default implementation does nothing.
    fn on_generation(&self, _report: &GenerationReport) {}
}

/// Observer that ignores every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Recorder(RefCell<Vec<usize>>);

    impl GenerationObserver for Recorder {
        fn on_generation(&self, report: &GenerationReport) {
            self.0.borrow_mut().push(report.generation);
        }
    }

    fn report(generation: usize) -> GenerationReport {
        GenerationReport {
            generation,
            non_dominated: vec![ObjectivesPoint::new(1.0, 2.0)],
            dominated: Vec::new(),
            population_size: 1,
        }
    }

    #[test]
    fn test_observer_receives_reports() {
        let r = Recorder(RefCell::new(Vec::new()));
        r.on_generation(&report(0));
        r.on_generation(&report(1));
        assert_eq!(*r.0.borrow(), vec![0, 1]);
    }

    #[test]
    fn test_noop_observer() {
        NoopObserver.on_generation(&report(3));
    }
}
