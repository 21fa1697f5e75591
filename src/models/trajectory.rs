//! Decoding output: per-step distributions, selections and vehicle states.

use ndarray::{Array1, Array2};

use super::vehicle::VehicleState;

/// The outcome of one forward pass over a batch.
///
/// Step 0 is the forced start at the depot: its probability row is one-hot
/// on index 0 and every vehicle is at full capacity. Each later step holds
/// the pointer distribution the selection was sampled from, the selected
/// node, and the vehicle state after serving it.
///
/// # Examples
///
/// ```
/// use u_neural_routing::models::Trajectory;
///
/// let t = Trajectory::start(2, 4, 10.0);
/// assert_eq!(t.len(), 1);
/// assert_eq!(t.actions(1), vec![0]);
/// assert_eq!(t.probabilities()[0][[0, 0]], 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Trajectory {
    probabilities: Vec<Array2<f64>>,
    selections: Vec<Vec<usize>>,
    vehicle_states: Vec<Vec<VehicleState>>,
}

impl Trajectory {
    /// Creates a trajectory holding only the forced depot start.
    pub fn start(batch_size: usize, node_count: usize, initial_capacity: f64) -> Self {
        let mut first = Array2::zeros((batch_size, node_count));
        first.column_mut(0).fill(1.0);
        Self {
            probabilities: vec![first],
            selections: vec![vec![0; batch_size]],
            vehicle_states: vec![vec![VehicleState::at_depot(initial_capacity); batch_size]],
        }
    }

    /// Appends one decoding step.
    pub fn push(
        &mut self,
        probabilities: Array2<f64>,
        selections: Vec<usize>,
        vehicle_states: Vec<VehicleState>,
    ) {
        self.probabilities.push(probabilities);
        self.selections.push(selections);
        self.vehicle_states.push(vehicle_states);
    }

    /// Number of recorded steps, the forced start included.
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    /// Always `false`: the forced start is always present.
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Number of instances.
    pub fn batch_size(&self) -> usize {
        self.selections[0].len()
    }

    /// `[batch, N]` probability rows, one matrix per step.
    pub fn probabilities(&self) -> &[Array2<f64>] {
        &self.probabilities
    }

    /// Selected node per instance, one vector per step.
    pub fn selections(&self) -> &[Vec<usize>] {
        &self.selections
    }

    /// Vehicle state per instance after each step.
    pub fn vehicle_states(&self) -> &[Vec<VehicleState>] {
        &self.vehicle_states
    }

    /// Selected node sequence of instance `b`.
    pub fn actions(&self, b: usize) -> Vec<usize> {
        self.selections.iter().map(|step| step[b]).collect()
    }

    /// Selected node sequences of all instances, `[batch][steps]`.
    pub fn action_indices(&self) -> Vec<Vec<usize>> {
        (0..self.batch_size()).map(|b| self.actions(b)).collect()
    }

    /// Probability of the selected node, one `[batch]` vector per step.
    pub fn selected_probabilities(&self) -> Vec<Array1<f64>> {
        self.probabilities
            .iter()
            .zip(&self.selections)
            .map(|(probs, sel)| {
                Array1::from_iter(sel.iter().enumerate().map(|(b, &idx)| probs[[b, idx]]))
            })
            .collect()
    }

    /// Sum of log-probabilities of the sampled selections per instance,
    /// the forced start excluded.
    pub fn log_likelihood(&self) -> Array1<f64> {
        let mut total = Array1::zeros(self.batch_size());
        for probs in self.selected_probabilities().iter().skip(1) {
            total += &probs.mapv(f64::ln);
        }
        total
    }

    /// Service nodes of instance `b` grouped into trips, split at depot
    /// visits. Empty trips (consecutive depot visits) are skipped.
    pub fn trips(&self, b: usize) -> Vec<Vec<usize>> {
        let mut trips = Vec::new();
        let mut current = Vec::new();
        for idx in self.actions(b) {
            if idx == 0 {
                if !current.is_empty() {
                    trips.push(std::mem::take(&mut current));
                }
            } else {
                current.push(idx);
            }
        }
        if !current.is_empty() {
            trips.push(current);
        }
        trips
    }
}
