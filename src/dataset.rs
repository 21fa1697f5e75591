//! Synthetic instance generation.
//!
//! Depots sit at a uniform position in the unit square with every other
//! field zero. Service nodes get a uniform position, an integer demand in
//! `1..=10`, a window start uniform in `[0, 5)` and a window two time units
//! long.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::ModelError;
use crate::models::{Batch, Instance, Node, TimeWindow};

/// Largest service demand.
pub const MAX_DEMAND: u32 = 10;
/// Upper bound (exclusive) of a window start.
pub const MAX_WINDOW_START: f64 = 5.0;
/// Length of every service window.
pub const WINDOW_LENGTH: f64 = 2.0;

/// Seeded stream of random instances.
///
/// # Examples
///
/// ```
/// use u_neural_routing::dataset::InstanceGenerator;
///
/// let mut gen = InstanceGenerator::new(11, 42);
/// let inst = gen.generate();
/// assert_eq!(inst.len(), 11);
/// assert_eq!(inst.depot().demand(), 0.0);
///
/// let batch = gen.batch(8).unwrap();
/// assert_eq!(batch.features().dim(), (8, 11, 6));
/// ```
#[derive(Debug, Clone)]
pub struct InstanceGenerator {
    node_count: usize,
    rng: StdRng,
}

impl InstanceGenerator {
    /// Creates a generator for instances of `node_count` nodes, depot
    /// included.
    pub fn new(node_count: usize, seed: u64) -> Self {
        Self {
            node_count,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Nodes per generated instance.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Draws the next instance.
    pub fn generate(&mut self) -> Instance {
        let depot = Node::depot(self.rng.random(), self.rng.random());
        let services = (1..self.node_count)
            .map(|_| {
                let x = self.rng.random();
                let y = self.rng.random();
                let demand = self.rng.random_range(1..=MAX_DEMAND) as f64;
                let start = self.rng.random_range(0.0..MAX_WINDOW_START);
                let window = TimeWindow::new(start, start + WINDOW_LENGTH)
                    .unwrap_or_else(TimeWindow::closed);
                Node::new(x, y, demand, window)
            })
            .collect();
        Instance::new(depot, services)
    }

    /// Draws `size` instances as one batch.
    pub fn batch(&mut self, size: usize) -> Result<Batch, ModelError> {
        let instances: Vec<Instance> = (0..size).map(|_| self.generate()).collect();
        Batch::from_instances(&instances)
    }
}

/// A fixed set of pre-generated instances.
///
/// # Examples
///
/// ```
/// use u_neural_routing::dataset::VrpDataset;
///
/// let data = VrpDataset::generate(6, 10, 111);
/// assert_eq!(data.len(), 10);
///
/// let batch = data.batch(&[0, 3, 9]).unwrap();
/// assert_eq!(batch.len(), 3);
/// assert!(data.batch(&[10]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct VrpDataset {
    node_count: usize,
    instances: Vec<Instance>,
}

impl VrpDataset {
    /// Generates `num_samples` instances of `node_count` nodes from `seed`.
    pub fn generate(node_count: usize, num_samples: usize, seed: u64) -> Self {
        let mut gen = InstanceGenerator::new(node_count, seed);
        let instances = (0..num_samples).map(|_| gen.generate()).collect();
        debug!(node_count, num_samples, seed, "generated dataset");
        Self {
            node_count,
            instances,
        }
    }

    /// Nodes per instance.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` if the dataset holds no instances.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The instance at `index`.
    pub fn get(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }

    /// All instances in generation order.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Stacks the instances at `indices` into a batch.
    pub fn batch(&self, indices: &[usize]) -> Result<Batch, ModelError> {
        let picked = indices
            .iter()
            .map(|&index| {
                self.get(index).cloned().ok_or(ModelError::IndexOutOfRange {
                    index,
                    len: self.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Batch::from_instances(&picked)
    }

    /// Consecutive batches of at most `batch_size` instances; the last one
    /// may be shorter.
    pub fn batches(
        &self,
        batch_size: usize,
    ) -> impl Iterator<Item = Result<Batch, ModelError>> + '_ {
        self.instances
            .chunks(batch_size.max(1))
            .map(Batch::from_instances)
    }
}
