//! Per-pass decoding state, stored as batch-indexed arrays.

use ndarray::{Array2, Array3, Axis};
use tracing::debug;

use crate::embedding::GraphEmbedder;
use crate::encoder::SequenceEncoder;
use crate::models::{Batch, VehicleState, DEMAND, TW_START, VISITED, X, Y};

/// Everything a forward pass mutates, one row per instance.
///
/// Holds a working copy of the raw features (visited flags are flipped
/// here, never in the caller's [`Batch`]), the current node embeddings,
/// encoder context, decoder hidden/cell state, vehicle states and the
/// previously selected node. Updates to a subset of instances write only
/// their rows.
#[derive(Debug, Clone)]
pub struct DecodeState {
    features: Array3<f64>,
    embeddings: Array3<f64>,
    context: Array3<f64>,
    hidden: Array2<f64>,
    cell: Array2<f64>,
    vehicles: Vec<VehicleState>,
    previous: Vec<usize>,
    initial_capacity: f64,
}

impl DecodeState {
    /// Embeds and encodes the batch; every vehicle starts at the depot.
    pub fn new(
        batch: &Batch,
        embedder: &GraphEmbedder,
        encoder: &SequenceEncoder,
        initial_capacity: f64,
    ) -> Self {
        let features = batch.features().clone();
        let embeddings = embedder.embed(features.view());
        let (context, (hidden, cell)) = encoder.encode(embeddings.view());
        let n = batch.len();
        Self {
            features,
            embeddings,
            context,
            hidden,
            cell,
            vehicles: vec![VehicleState::at_depot(initial_capacity); n],
            previous: vec![0; n],
            initial_capacity,
        }
    }

    /// Number of instances.
    pub fn batch_size(&self) -> usize {
        self.vehicles.len()
    }

    /// Nodes per instance.
    pub fn node_count(&self) -> usize {
        self.features.len_of(Axis(1))
    }

    /// Working copy of the `[batch, N, 6]` features.
    pub fn features(&self) -> &Array3<f64> {
        &self.features
    }

    /// Current `[batch, N, embedding_dim]` embeddings.
    pub fn embeddings(&self) -> &Array3<f64> {
        &self.embeddings
    }

    /// Current `[batch, N, hidden_dim]` encoder context.
    pub fn context(&self) -> &Array3<f64> {
        &self.context
    }

    /// Decoder hidden state `[batch, hidden_dim]`.
    pub fn hidden(&self) -> &Array2<f64> {
        &self.hidden
    }

    /// Decoder cell state `[batch, hidden_dim]`.
    pub fn cell(&self) -> &Array2<f64> {
        &self.cell
    }

    /// Vehicle state per instance.
    pub fn vehicles(&self) -> &[VehicleState] {
        &self.vehicles
    }

    /// Capacity every vehicle starts with and is reset to at the depot.
    pub fn initial_capacity(&self) -> f64 {
        self.initial_capacity
    }

    /// Previously selected node per instance.
    pub fn previous(&self) -> &[usize] {
        &self.previous
    }

    /// The node instance `b` may not select this step: its previous
    /// selection, unless that was the depot.
    pub fn illegal_node(&self, b: usize) -> Option<usize> {
        match self.previous[b] {
            0 => None,
            idx => Some(idx),
        }
    }

    /// Sets the logits of illegal nodes to `-∞`.
    pub fn apply_mask(&self, logits: &mut Array2<f64>) {
        for (b, mut row) in logits.outer_iter_mut().enumerate() {
            if let Some(idx) = self.illegal_node(b) {
                row[idx] = f64::NEG_INFINITY;
            }
        }
    }

    /// Replaces the decoder recurrent state after an LSTM step.
    pub fn set_recurrent(&mut self, hidden: Array2<f64>, cell: Array2<f64>) {
        self.hidden = hidden;
        self.cell = cell;
    }

    /// Moves every vehicle to its selected node.
    ///
    /// A service node is marked visited and the vehicle travels there,
    /// waiting for the window to open and spending the node's demand. A
    /// depot selection resets the vehicle. Returns the instances that
    /// returned to the depot.
    pub fn advance(&mut self, selections: &[usize]) -> Vec<usize> {
        let mut returned = Vec::new();
        for (b, &next) in selections.iter().enumerate() {
            if next == 0 {
                self.vehicles[b].reset(self.initial_capacity);
                returned.push(b);
            } else {
                let prev = self.previous[b];
                let f = self.features.index_axis(Axis(0), b);
                let distance = (f[[prev, X]] - f[[next, X]]).hypot(f[[prev, Y]] - f[[next, Y]]);
                let (demand, window_start) = (f[[next, DEMAND]], f[[next, TW_START]]);
                self.vehicles[b].serve(distance, demand, window_start);
                self.features[[b, next, VISITED]] = 1.0;
            }
            self.previous[b] = next;
        }
        returned
    }

    /// Re-embeds and re-encodes the given instances from their current
    /// features, replacing their embeddings, context and recurrent state.
    /// Other instances are untouched. An empty index list is a no-op.
    pub fn refresh(
        &mut self,
        instances: &[usize],
        embedder: &GraphEmbedder,
        encoder: &SequenceEncoder,
    ) {
        if instances.is_empty() {
            return;
        }
        debug!(?instances, "re-embedding after depot return");

        let sub = self.features.select(Axis(0), instances);
        let embedded = embedder.embed(sub.view());
        let (context, (hidden, cell)) = encoder.encode(embedded.view());
        for (k, &b) in instances.iter().enumerate() {
            self.embeddings
                .index_axis_mut(Axis(0), b)
                .assign(&embedded.index_axis(Axis(0), k));
            self.context
                .index_axis_mut(Axis(0), b)
                .assign(&context.index_axis(Axis(0), k));
            self.hidden.row_mut(b).assign(&hidden.row(k));
            self.cell.row_mut(b).assign(&cell.row(k));
        }
    }

    /// Decoder input per instance: the embedding of its selected node
    /// followed by `[remaining_capacity, elapsed_time]`.
    pub fn decoder_input(&self, selections: &[usize]) -> Array2<f64> {
        let dim = self.embeddings.len_of(Axis(2));
        let mut input = Array2::zeros((self.batch_size(), dim + 2));
        for (b, &idx) in selections.iter().enumerate() {
            let mut row = input.row_mut(b);
            for k in 0..dim {
                row[k] = self.embeddings[[b, idx, k]];
            }
            let [capacity, time] = self.vehicles[b].as_pair();
            row[dim] = capacity;
            row[dim + 1] = time;
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Instance, Node, TimeWindow};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const CAPACITY: f64 = 10.0;

    fn sample_batch() -> Batch {
        let tw = TimeWindow::new(2.0, 7.0).expect("valid");
        let make = |dx: f64| {
            Instance::new(
                Node::depot(0.0, 0.0),
                vec![
                    Node::new(3.0 + dx, 4.0, 3.0, tw),
                    Node::new(0.0, 1.0 + dx, 2.0, tw),
                    Node::new(1.0, 1.0, 4.0, tw),
                ],
            )
        };
        Batch::from_instances(&[make(0.0), make(0.5), make(1.0)]).expect("valid")
    }

    fn setup() -> (DecodeState, GraphEmbedder, SequenceEncoder) {
        let mut rng = StdRng::seed_from_u64(21);
        let embedder = GraphEmbedder::new(16, 2, &mut rng);
        let encoder = SequenceEncoder::new(16, 5, &mut rng);
        let state = DecodeState::new(&sample_batch(), &embedder, &encoder, CAPACITY);
        (state, embedder, encoder)
    }

    #[test]
    fn test_initial_state() {
        let (state, _, _) = setup();
        assert_eq!(state.batch_size(), 3);
        assert_eq!(state.node_count(), 4);
        assert_eq!(state.embeddings().dim(), (3, 4, 16));
        assert_eq!(state.context().dim(), (3, 4, 5));
        assert_eq!(state.hidden().dim(), (3, 5));
        assert!(state.previous().iter().all(|&p| p == 0));
        assert!(state
            .vehicles()
            .iter()
            .all(|v| *v == VehicleState::at_depot(CAPACITY)));
    }

    #[test]
    fn test_mask_only_previous_service_node() {
        let (mut state, _, _) = setup();
        state.advance(&[1, 0, 3]);
        assert_eq!(state.illegal_node(0), Some(1));
        assert_eq!(state.illegal_node(1), None);
        assert_eq!(state.illegal_node(2), Some(3));

        let mut logits = Array2::zeros((3, 4));
        state.apply_mask(&mut logits);
        assert_eq!(logits[[0, 1]], f64::NEG_INFINITY);
        assert!(logits.row(1).iter().all(|v| v.is_finite()));
        assert_eq!(logits[[2, 3]], f64::NEG_INFINITY);
        assert_eq!(logits.iter().filter(|v| v.is_infinite()).count(), 2);
    }

    #[test]
    fn test_advance_updates_vehicle() {
        let (mut state, _, _) = setup();
        let returned = state.advance(&[1, 1, 2]);
        assert!(returned.is_empty());

        // depot (0,0) -> (3,4): distance 5, window opens at 2
        let v = state.vehicles()[0];
        assert!((v.elapsed_time() - 5.0).abs() < 1e-12);
        assert_eq!(v.remaining_capacity(), CAPACITY - 3.0);

        // depot (0,0) -> (0,2): distance 2, equal to window start
        let v = state.vehicles()[2];
        assert!((v.elapsed_time() - 2.0).abs() < 1e-12);
        assert_eq!(v.remaining_capacity(), CAPACITY - 2.0);

        assert_eq!(state.features()[[0, 1, VISITED]], 1.0);
        assert_eq!(state.features()[[0, 2, VISITED]], 0.0);
    }

    #[test]
    fn test_waits_for_window() {
        let (mut state, _, _) = setup();
        // depot (0,0) -> (1,1): distance √2 < window start 2
        state.advance(&[3, 0, 0]);
        assert_eq!(state.vehicles()[0].elapsed_time(), 2.0);
    }

    #[test]
    fn test_capacity_decrements_per_instance() {
        let (mut state, _, _) = setup();
        state.advance(&[1, 2, 3]);
        let caps: Vec<f64> = state.vehicles().iter().map(|v| v.remaining_capacity()).collect();
        assert_eq!(caps, vec![CAPACITY - 3.0, CAPACITY - 2.0, CAPACITY - 4.0]);
    }

    #[test]
    fn test_depot_return_resets_vehicle() {
        let (mut state, _, _) = setup();
        state.advance(&[1, 2, 3]);
        state.advance(&[2, 1, 1]);
        let returned = state.advance(&[0, 3, 0]);
        assert_eq!(returned, vec![0, 2]);
        assert_eq!(state.vehicles()[0], VehicleState::at_depot(CAPACITY));
        assert_eq!(state.vehicles()[2], VehicleState::at_depot(CAPACITY));
        assert_ne!(state.vehicles()[1], VehicleState::at_depot(CAPACITY));
        // visited flags persist across trips
        assert_eq!(state.features()[[0, 1, VISITED]], 1.0);
    }

    #[test]
    fn test_refresh_leaves_others_untouched() {
        let (mut state, embedder, encoder) = setup();
        state.advance(&[1, 2, 3]);
        let before = state.clone();

        state.refresh(&[1], &embedder, &encoder);

        for b in [0, 2] {
            assert_eq!(
                state.embeddings().index_axis(Axis(0), b),
                before.embeddings().index_axis(Axis(0), b)
            );
            assert_eq!(
                state.context().index_axis(Axis(0), b),
                before.context().index_axis(Axis(0), b)
            );
            assert_eq!(state.hidden().row(b), before.hidden().row(b));
            assert_eq!(state.cell().row(b), before.cell().row(b));
        }
        // instance 1 now reflects its visited flag
        assert_ne!(
            state.embeddings().index_axis(Axis(0), 1),
            before.embeddings().index_axis(Axis(0), 1)
        );
        let expected = embedder.embed_instance(state.features().index_axis(Axis(0), 1));
        assert_eq!(state.embeddings().index_axis(Axis(0), 1), expected);
    }

    #[test]
    fn test_refresh_empty_is_noop() {
        let (mut state, embedder, encoder) = setup();
        state.advance(&[1, 2, 3]);
        let before = state.clone();
        state.refresh(&[], &embedder, &encoder);
        assert_eq!(state.embeddings(), before.embeddings());
        assert_eq!(state.context(), before.context());
        assert_eq!(state.hidden(), before.hidden());
    }

    #[test]
    fn test_decoder_input_layout() {
        let (mut state, _, _) = setup();
        state.advance(&[1, 0, 2]);
        let input = state.decoder_input(&[1, 0, 2]);
        assert_eq!(input.dim(), (3, 18));
        for k in 0..16 {
            assert_eq!(input[[0, k]], state.embeddings()[[0, 1, k]]);
            assert_eq!(input[[1, k]], state.embeddings()[[1, 0, k]]);
        }
        assert_eq!(input[[0, 16]], CAPACITY - 3.0);
        assert_eq!(input[[0, 17]], 5.0);
        assert_eq!(input[[1, 16]], CAPACITY);
        assert_eq!(input[[1, 17]], 0.0);
    }
}
