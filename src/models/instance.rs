//! Instances and batches of instances.

use ndarray::{Array2, Array3, ArrayView2, Axis};

use super::node::{Node, DEMAND, FEATURE_DIM, VISITED};
use crate::error::ModelError;

/// One routing instance: the depot at index 0 followed by service nodes.
///
/// # Examples
///
/// ```
/// use u_neural_routing::models::{Instance, Node, TimeWindow};
///
/// let tw = TimeWindow::new(0.0, 5.0).unwrap();
/// let inst = Instance::new(
///     Node::depot(0.5, 0.5),
///     vec![Node::new(0.1, 0.9, 3.0, tw), Node::new(0.8, 0.2, 2.0, tw)],
/// );
/// assert_eq!(inst.len(), 3);
/// assert_eq!(inst.to_features().dim(), (3, 6));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    nodes: Vec<Node>,
}

impl Instance {
    /// Creates an instance with `depot` at index 0.
    pub fn new(depot: Node, services: Vec<Node>) -> Self {
        let mut nodes = Vec::with_capacity(services.len() + 1);
        nodes.push(depot);
        nodes.extend(services);
        Self { nodes }
    }

    /// All nodes, depot first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The depot node.
    pub fn depot(&self) -> &Node {
        &self.nodes[0]
    }

    /// Number of nodes including the depot.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: an instance has at least its depot.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Raw `[N, 6]` feature matrix.
    pub fn to_features(&self) -> Array2<f64> {
        let mut out = Array2::zeros((self.nodes.len(), FEATURE_DIM));
        for (mut row, node) in out.rows_mut().into_iter().zip(&self.nodes) {
            for (dst, src) in row.iter_mut().zip(node.features()) {
                *dst = src;
            }
        }
        out
    }
}

/// A batch of instances processed in lock-step, stored as a
/// `[batch, N, 6]` feature tensor.
///
/// Construction validates the layout: every value finite and row 0 of each
/// instance a depot row `[x, y, 0, 0, 0, 0]`.
///
/// # Examples
///
/// ```
/// use u_neural_routing::models::{Batch, Instance, Node, TimeWindow};
///
/// let tw = TimeWindow::new(0.0, 5.0).unwrap();
/// let inst = Instance::new(Node::depot(0.0, 0.0), vec![Node::new(1.0, 0.0, 1.0, tw)]);
/// let batch = Batch::from_instances(&[inst.clone(), inst]).unwrap();
/// assert_eq!(batch.len(), 2);
/// assert_eq!(batch.node_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    features: Array3<f64>,
}

impl Batch {
    /// Stacks instances of equal size into a batch.
    pub fn from_instances(instances: &[Instance]) -> Result<Self, ModelError> {
        let first = instances.first().ok_or(ModelError::EmptyBatch)?;
        let n = first.len();
        let mut features = Array3::zeros((instances.len(), n, FEATURE_DIM));
        for (b, inst) in instances.iter().enumerate() {
            if inst.len() != n {
                return Err(ModelError::ShapeMismatch {
                    what: "instance",
                    expected: vec![n, FEATURE_DIM],
                    actual: vec![inst.len(), FEATURE_DIM],
                });
            }
            features
                .index_axis_mut(Axis(0), b)
                .assign(&inst.to_features());
        }
        Self::from_array(features)
    }

    /// Wraps a raw `[batch, N, 6]` tensor after validating it.
    pub fn from_array(features: Array3<f64>) -> Result<Self, ModelError> {
        let (batch, n, width) = features.dim();
        if batch == 0 {
            return Err(ModelError::EmptyBatch);
        }
        if width != FEATURE_DIM || n < 2 {
            return Err(ModelError::ShapeMismatch {
                what: "batch",
                expected: vec![batch, n.max(2), FEATURE_DIM],
                actual: vec![batch, n, width],
            });
        }
        for ((b, node, _), &value) in features.indexed_iter() {
            if !value.is_finite() {
                return Err(ModelError::InvalidFeature {
                    instance: b,
                    node,
                    value,
                });
            }
        }
        for (b, inst) in features.outer_iter().enumerate() {
            if inst.row(0).iter().skip(DEMAND).any(|&v| v != 0.0) {
                return Err(ModelError::MissingDepot { instance: b });
            }
        }
        Ok(Self { features })
    }

    /// Checks that every instance has `node_count` nodes.
    pub fn ensure_node_count(&self, node_count: usize) -> Result<(), ModelError> {
        let (batch, n, width) = self.features.dim();
        if n != node_count {
            return Err(ModelError::ShapeMismatch {
                what: "batch",
                expected: vec![batch, node_count, FEATURE_DIM],
                actual: vec![batch, n, width],
            });
        }
        Ok(())
    }

    /// The `[batch, N, 6]` feature tensor.
    pub fn features(&self) -> &Array3<f64> {
        &self.features
    }

    /// Features of instance `b` as an `[N, 6]` view.
    pub fn instance(&self, b: usize) -> ArrayView2<'_, f64> {
        self.features.index_axis(Axis(0), b)
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.features.len_of(Axis(0))
    }

    /// Always `false` for a constructed batch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nodes per instance, depot included.
    pub fn node_count(&self) -> usize {
        self.features.len_of(Axis(1))
    }

    /// Number of visited service nodes in instance `b`.
    pub fn visited_count(&self, b: usize) -> usize {
        self.instance(b)
            .column(VISITED)
            .iter()
            .filter(|&&v| v != 0.0)
            .count()
    }

    /// Consumes the batch, returning the feature tensor.
    pub fn into_inner(self) -> Array3<f64> {
        self.features
    }
}
