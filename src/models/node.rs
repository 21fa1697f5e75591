//! Node and time window types, and the raw feature row layout.

/// Width of a raw node feature row.
pub const FEATURE_DIM: usize = 6;
/// Column of the x-coordinate.
pub const X: usize = 0;
/// Column of the y-coordinate.
pub const Y: usize = 1;
/// Column of the demand.
pub const DEMAND: usize = 2;
/// Column of the time window start.
pub const TW_START: usize = 3;
/// Column of the time window end.
pub const TW_END: usize = 4;
/// Column of the visited flag (0 or 1).
pub const VISITED: usize = 5;

/// A service time window.
///
/// A vehicle arriving before `start` waits until `start`; arriving after
/// `end` is late.
///
/// # Examples
///
/// ```
/// use u_neural_routing::models::TimeWindow;
///
/// let tw = TimeWindow::new(2.0, 4.0).unwrap();
/// assert_eq!(tw.service_start(1.0), 2.0);
/// assert_eq!(tw.service_start(3.0), 3.0);
/// assert!(tw.is_violated(4.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    start: f64,
    end: f64,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Returns `None` if `start > end` or either value is non-finite.
    pub fn new(start: f64, end: f64) -> Option<Self> {
        if !start.is_finite() || !end.is_finite() || start > end {
            return None;
        }
        Some(Self { start, end })
    }

    /// The all-zero window carried by the depot row.
    pub fn closed() -> Self {
        Self {
            start: 0.0,
            end: 0.0,
        }
    }

    /// Earliest service time.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Latest service time.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Time at which service begins when arriving at `arrival`.
    pub fn service_start(&self, arrival: f64) -> f64 {
        arrival.max(self.start)
    }

    /// Returns `true` if arriving at `arrival` is late.
    pub fn is_violated(&self, arrival: f64) -> bool {
        arrival > self.end
    }
}

/// A depot or service node of a routing instance.
///
/// # Examples
///
/// ```
/// use u_neural_routing::models::{Node, TimeWindow, FEATURE_DIM};
///
/// let depot = Node::depot(0.5, 0.5);
/// assert_eq!(depot.features(), [0.5, 0.5, 0.0, 0.0, 0.0, 0.0]);
///
/// let tw = TimeWindow::new(1.0, 3.0).unwrap();
/// let node = Node::new(0.1, 0.2, 4.0, tw);
/// assert_eq!(node.features().len(), FEATURE_DIM);
/// assert_eq!(node.demand(), 4.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    x: f64,
    y: f64,
    demand: f64,
    time_window: TimeWindow,
    visited: bool,
}

impl Node {
    /// Creates an unvisited service node.
    pub fn new(x: f64, y: f64, demand: f64, time_window: TimeWindow) -> Self {
        Self {
            x,
            y,
            demand,
            time_window,
            visited: false,
        }
    }

    /// Creates a depot: only the coordinates are set.
    pub fn depot(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, TimeWindow::closed())
    }

    /// Marks the node as already visited.
    pub fn with_visited(mut self, visited: bool) -> Self {
        self.visited = visited;
        self
    }

    /// X-coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Demand served at this node.
    pub fn demand(&self) -> f64 {
        self.demand
    }

    /// Service time window.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    /// Whether the node has been visited.
    pub fn visited(&self) -> bool {
        self.visited
    }

    /// Raw feature row `[x, y, demand, tw_start, tw_end, visited]`.
    pub fn features(&self) -> [f64; FEATURE_DIM] {
        [
            self.x,
            self.y,
            self.demand,
            self.time_window.start,
            self.time_window.end,
            if self.visited { 1.0 } else { 0.0 },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window_valid() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert_eq!(tw.start(), 10.0);
        assert_eq!(tw.end(), 20.0);
    }

    #[test]
    fn test_time_window_invalid() {
        assert!(TimeWindow::new(20.0, 10.0).is_none());
        assert!(TimeWindow::new(f64::NAN, 10.0).is_none());
        assert!(TimeWindow::new(10.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_time_window_service_start() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert_eq!(tw.service_start(5.0), 10.0);
        assert_eq!(tw.service_start(10.0), 10.0);
        assert_eq!(tw.service_start(15.0), 15.0);
    }

    #[test]
    fn test_time_window_violated() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert!(!tw.is_violated(10.0));
        assert!(!tw.is_violated(20.0));
        assert!(tw.is_violated(20.1));
    }

    #[test]
    fn test_depot_features() {
        let d = Node::depot(0.3, 0.4);
        assert_eq!(d.features(), [0.3, 0.4, 0.0, 0.0, 0.0, 0.0]);
        assert!(!d.visited());
    }

    #[test]
    fn test_node_features_layout() {
        let tw = TimeWindow::new(2.0, 4.0).expect("valid");
        let n = Node::new(0.1, 0.2, 7.0, tw).with_visited(true);
        let f = n.features();
        assert_eq!(f[X], 0.1);
        assert_eq!(f[Y], 0.2);
        assert_eq!(f[DEMAND], 7.0);
        assert_eq!(f[TW_START], 2.0);
        assert_eq!(f[TW_END], 4.0);
        assert_eq!(f[VISITED], 1.0);
    }
}
