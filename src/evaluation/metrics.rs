//! Measurements of a sampled rollout.

/// Types of constraint violations.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationType {
    /// Total demand served on a trip exceeds the vehicle capacity.
    CapacityExceeded {
        /// Trip index within the rollout.
        trip_index: usize,
        /// Load accumulated on the trip.
        load: f64,
        /// Vehicle capacity.
        capacity: f64,
    },
    /// Arrival after the node's window closes.
    TimeWindowViolated {
        /// Trip index within the rollout.
        trip_index: usize,
        /// Node where the violation occurred.
        node: usize,
        /// Actual arrival time.
        arrival: f64,
        /// Window end.
        due: f64,
    },
}

/// A constraint violation found in a rollout.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// One depot-to-depot trip of a rollout.
#[derive(Debug, Clone, PartialEq)]
pub struct TripMetrics {
    /// Service nodes in visiting order.
    pub nodes: Vec<usize>,
    /// Total demand served.
    pub load: f64,
    /// Travelled distance, including the return leg if the trip was closed.
    pub distance: f64,
    /// Elapsed time at the last service node (waiting included).
    pub duration: f64,
    /// Whether the vehicle returned to the depot before the step budget ran
    /// out.
    pub completed: bool,
}

impl TripMetrics {
    pub(crate) fn open() -> Self {
        Self {
            nodes: Vec::new(),
            load: 0.0,
            distance: 0.0,
            duration: 0.0,
            completed: false,
        }
    }
}

/// Aggregate measurements of one instance's rollout.
///
/// Violations are reported, never enforced: a rollout with violations is
/// still a valid sample.
#[derive(Debug, Clone, PartialEq)]
pub struct RolloutMetrics {
    trips: Vec<TripMetrics>,
    served: usize,
    revisits: usize,
    service_nodes: usize,
    violations: Vec<Violation>,
}

impl RolloutMetrics {
    pub(crate) fn new(
        trips: Vec<TripMetrics>,
        served: usize,
        revisits: usize,
        service_nodes: usize,
        violations: Vec<Violation>,
    ) -> Self {
        Self {
            trips,
            served,
            revisits,
            service_nodes,
            violations,
        }
    }

    /// Trips in order.
    pub fn trips(&self) -> &[TripMetrics] {
        &self.trips
    }

    /// Distance travelled over all trips.
    pub fn total_distance(&self) -> f64 {
        self.trips.iter().map(|t| t.distance).sum()
    }

    /// Number of distinct service nodes visited.
    pub fn served(&self) -> usize {
        self.served
    }

    /// Service nodes never visited.
    pub fn unserved(&self) -> usize {
        self.service_nodes - self.served
    }

    /// Visits to a service node that had already been served.
    pub fn revisits(&self) -> usize {
        self.revisits
    }

    /// Returns `true` if every service node was visited.
    pub fn is_complete(&self) -> bool {
        self.served == self.service_nodes
    }

    /// Violations found, in visiting order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns `true` if no violation was found.
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(distance: f64) -> TripMetrics {
        TripMetrics {
            nodes: vec![1],
            load: 1.0,
            distance,
            duration: distance,
            completed: true,
        }
    }

    #[test]
    fn test_violation_creation() {
        let v = Violation::new(ViolationType::CapacityExceeded {
            trip_index: 0,
            load: 32.0,
            capacity: 30.0,
        });
        assert!(matches!(
            v.kind,
            ViolationType::CapacityExceeded { trip_index: 0, .. }
        ));
    }

    #[test]
    fn test_totals() {
        let m = RolloutMetrics::new(vec![trip(1.5), trip(2.0)], 3, 1, 4, Vec::new());
        assert!((m.total_distance() - 3.5).abs() < 1e-10);
        assert_eq!(m.unserved(), 1);
        assert!(!m.is_complete());
        assert!(m.is_feasible());
    }
}
