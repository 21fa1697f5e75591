//! Dense distance matrix.

use ndarray::ArrayView2;

use crate::models::{X, Y};

/// A dense n×n Euclidean distance matrix stored in row-major order.
///
/// # Examples
///
/// ```
/// use u_neural_routing::models::{Instance, Node, TimeWindow};
/// use u_neural_routing::distance::DistanceMatrix;
///
/// let tw = TimeWindow::new(0.0, 1.0).unwrap();
/// let inst = Instance::new(
///     Node::depot(0.0, 0.0),
///     vec![Node::new(3.0, 4.0, 1.0, tw), Node::new(6.0, 8.0, 1.0, tw)],
/// );
/// let dm = DistanceMatrix::from_features(inst.to_features().view());
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a distance matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes distances between the `(x, y)` columns of an `[N, 6]`
    /// feature matrix.
    pub fn from_features(features: ArrayView2<'_, f64>) -> Self {
        let n = features.nrows();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = (features[[i, X]] - features[[j, X]])
                    .hypot(features[[i, Y]] - features[[j, Y]]);
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Returns the distance from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from location `from` to location `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }
}
