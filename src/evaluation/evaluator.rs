//! Rollout evaluator that replays a trajectory and measures timing, load,
//! distance and feasibility.

use ndarray::ArrayView2;

use super::metrics::{RolloutMetrics, TripMetrics, Violation, ViolationType};
use crate::distance::DistanceMatrix;
use crate::models::{Batch, Trajectory, DEMAND, TW_END, TW_START};

/// Replays trajectories against the caller's batch.
///
/// Timing follows the decoder's vehicle update: arrival is elapsed time
/// plus travel, service starts at `max(arrival, tw_start)`, and the vehicle
/// restarts at time 0 with empty load after each depot visit. There is no
/// service duration.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use u_neural_routing::config::ModelConfig;
/// use u_neural_routing::dataset::InstanceGenerator;
/// use u_neural_routing::evaluation::TrajectoryEvaluator;
/// use u_neural_routing::policy::PolicyNetwork;
///
/// let config = ModelConfig::default()
///     .with_node_count(5)
///     .with_embedding_dim(8)
///     .with_hidden_dim(8);
/// let policy = PolicyNetwork::new(config).unwrap();
/// let batch = InstanceGenerator::new(5, 0).batch(2).unwrap();
/// let trajectory = policy.forward(&batch, &mut StdRng::seed_from_u64(1)).unwrap();
///
/// let evaluator = TrajectoryEvaluator::new(30.0);
/// let metrics = evaluator.evaluate(&batch, &trajectory, 0);
/// assert!(metrics.total_distance() >= 0.0);
/// assert!(metrics.served() <= 4);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryEvaluator {
    capacity: f64,
}

impl TrajectoryEvaluator {
    /// Creates an evaluator for vehicles of `capacity`.
    pub fn new(capacity: f64) -> Self {
        Self { capacity }
    }

    /// Vehicle capacity.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Measures the rollout of instance `b`.
    ///
    /// # Panics
    ///
    /// Panics if `b` is out of range for `batch` or `trajectory`.
    pub fn evaluate(&self, batch: &Batch, trajectory: &Trajectory, b: usize) -> RolloutMetrics {
        self.evaluate_actions(batch.instance(b), &trajectory.actions(b))
    }

    /// Measures every instance of the batch.
    pub fn evaluate_batch(&self, batch: &Batch, trajectory: &Trajectory) -> Vec<RolloutMetrics> {
        (0..batch.len())
            .map(|b| self.evaluate(batch, trajectory, b))
            .collect()
    }

    /// Measures an action sequence over one instance's `[N, 6]` features.
    /// The first action is the forced depot start and is skipped.
    pub fn evaluate_actions(
        &self,
        features: ArrayView2<'_, f64>,
        actions: &[usize],
    ) -> RolloutMetrics {
        let distances = DistanceMatrix::from_features(features);
        let service_nodes = distances.size().saturating_sub(1);
        let mut seen = vec![false; distances.size()];
        let mut served = 0;
        let mut revisits = 0;
        let mut trips = Vec::new();
        let mut violations = Vec::new();

        let mut current = TripMetrics::open();
        let mut prev = 0;

        for &node in actions.iter().skip(1) {
            let travel = distances.get(prev, node);
            prev = node;

            if node == 0 {
                if current.nodes.is_empty() {
                    continue;
                }
                current.distance += travel;
                current.completed = true;
                self.check_load(&current, trips.len(), &mut violations);
                trips.push(std::mem::replace(&mut current, TripMetrics::open()));
                continue;
            }

            let (demand, start, due) = (
                features[[node, DEMAND]],
                features[[node, TW_START]],
                features[[node, TW_END]],
            );
            let arrival = current.duration + travel;
            if arrival > due {
                violations.push(Violation::new(ViolationType::TimeWindowViolated {
                    trip_index: trips.len(),
                    node,
                    arrival,
                    due,
                }));
            }
            current.distance += travel;
            current.duration = arrival.max(start);
            current.load += demand;
            current.nodes.push(node);

            if seen[node] {
                revisits += 1;
            } else {
                seen[node] = true;
                served += 1;
            }
        }

        if !current.nodes.is_empty() {
            self.check_load(&current, trips.len(), &mut violations);
            trips.push(current);
        }

        RolloutMetrics::new(trips, served, revisits, service_nodes, violations)
    }

    fn check_load(&self, trip: &TripMetrics, trip_index: usize, violations: &mut Vec<Violation>) {
        if trip.load > self.capacity {
            violations.push(Violation::new(ViolationType::CapacityExceeded {
                trip_index,
                load: trip.load,
                capacity: self.capacity,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Instance, Node, TimeWindow, VehicleState};
    use ndarray::Array2;

    /// Depot at the origin and three nodes on a 3-4-5 grid.
    fn setup() -> Batch {
        let wide = TimeWindow::new(0.0, 100.0).expect("valid");
        let inst = Instance::new(
            Node::depot(0.0, 0.0),
            vec![
                Node::new(3.0, 4.0, 10.0, wide),
                Node::new(6.0, 8.0, 20.0, wide),
                Node::new(0.0, 10.0, 15.0, TimeWindow::new(20.0, 30.0).expect("valid")),
            ],
        );
        Batch::from_instances(&[inst]).expect("valid batch")
    }

    fn trajectory(actions: &[usize], batch: &Batch, capacity: f64) -> Trajectory {
        let n = batch.node_count();
        let mut t = Trajectory::start(1, n, capacity);
        for &a in &actions[1..] {
            let mut probs = Array2::zeros((1, n));
            probs[[0, a]] = 1.0;
            t.push(probs, vec![a], vec![VehicleState::at_depot(capacity)]);
        }
        t
    }

    #[test]
    fn test_single_trip() {
        let batch = setup();
        let t = trajectory(&[0, 1, 0], &batch, 50.0);
        let m = TrajectoryEvaluator::new(50.0).evaluate(&batch, &t, 0);
        assert_eq!(m.trips().len(), 1);
        let trip = &m.trips()[0];
        assert_eq!(trip.nodes, vec![1]);
        assert!(trip.completed);
        // depot->1 = 5.0, 1->depot = 5.0
        assert!((m.total_distance() - 10.0).abs() < 1e-10);
        assert!((trip.load - 10.0).abs() < 1e-10);
        assert!(m.is_feasible());
    }

    #[test]
    fn test_capacity_exceeded() {
        let batch = setup();
        let t = trajectory(&[0, 1, 2, 0], &batch, 25.0);
        let m = TrajectoryEvaluator::new(25.0).evaluate(&batch, &t, 0);
        assert_eq!(m.violations().len(), 1);
        assert!(matches!(
            m.violations()[0].kind,
            ViolationType::CapacityExceeded { trip_index: 0, .. }
        ));
    }

    #[test]
    fn test_waiting_for_window() {
        let batch = setup();
        // arrival at node 3 is 10.0, service starts at 20.0
        let t = trajectory(&[0, 3], &batch, 50.0);
        let m = TrajectoryEvaluator::new(50.0).evaluate(&batch, &t, 0);
        let trip = &m.trips()[0];
        assert!((trip.duration - 20.0).abs() < 1e-10);
        assert!(!trip.completed);
        assert!(m.is_feasible());
    }

    #[test]
    fn test_time_window_violated() {
        let batch = setup();
        // node 1 is reached at 25.0, node 3 is 6.7 further and closes at 30.0
        let t = trajectory(&[0, 1, 2, 1, 2, 1, 3], &batch, 100.0);
        let m = TrajectoryEvaluator::new(100.0).evaluate(&batch, &t, 0);
        assert!(m
            .violations()
            .iter()
            .any(|v| matches!(v.kind, ViolationType::TimeWindowViolated { node: 3, .. })));
    }

    #[test]
    fn test_trips_and_revisits() {
        let batch = setup();
        let t = trajectory(&[0, 1, 0, 0, 1, 2, 0], &batch, 50.0);
        let m = TrajectoryEvaluator::new(50.0).evaluate(&batch, &t, 0);
        assert_eq!(m.trips().len(), 2);
        assert_eq!(m.served(), 2);
        assert_eq!(m.revisits(), 1);
        assert_eq!(m.unserved(), 1);
        assert!(!m.is_complete());
    }

    #[test]
    fn test_timing_chain() {
        let batch = setup();
        let t = trajectory(&[0, 1, 2], &batch, 50.0);
        let m = TrajectoryEvaluator::new(50.0).evaluate(&batch, &t, 0);
        // 5.0 to node 1, 5.0 more to node 2
        assert!((m.trips()[0].duration - 10.0).abs() < 1e-10);
        assert!((m.total_distance() - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_durations_match_decoder_clock() {
        use crate::config::ModelConfig;
        use crate::dataset::InstanceGenerator;
        use crate::policy::PolicyNetwork;
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let config = ModelConfig::default()
            .with_node_count(6)
            .with_embedding_dim(8)
            .with_hidden_dim(8);
        let policy = PolicyNetwork::new(config).expect("valid config");
        let batch = InstanceGenerator::new(6, 21).batch(3).expect("non-empty");
        let t = policy
            .forward(&batch, &mut StdRng::seed_from_u64(22))
            .expect("decodes");

        let evaluator = TrajectoryEvaluator::new(30.0);
        for (b, m) in evaluator.evaluate_batch(&batch, &t).iter().enumerate() {
            let actions = t.actions(b);
            let trip_ends: Vec<f64> = (1..actions.len())
                .filter(|&s| actions[s] != 0 && actions.get(s + 1).map_or(true, |&n| n == 0))
                .map(|s| t.vehicle_states()[s][b].elapsed_time())
                .collect();
            let durations: Vec<f64> = m.trips().iter().map(|trip| trip.duration).collect();
            assert_eq!(trip_ends.len(), durations.len());
            for (a, d) in trip_ends.iter().zip(&durations) {
                assert!((a - d).abs() < 1e-10);
            }
        }
    }
}
