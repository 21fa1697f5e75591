//! Per-instance vehicle state carried through decoding.

/// Remaining capacity and elapsed time of the single vehicle of an instance.
///
/// # Examples
///
/// ```
/// use u_neural_routing::models::VehicleState;
///
/// let mut v = VehicleState::at_depot(10.0);
/// v.serve(1.0, 4.0, 3.0);
/// assert_eq!(v.elapsed_time(), 3.0); // waited for the window to open
/// assert_eq!(v.remaining_capacity(), 6.0);
///
/// v.reset(10.0);
/// assert_eq!(v, VehicleState::at_depot(10.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    remaining_capacity: f64,
    elapsed_time: f64,
}

impl VehicleState {
    /// A vehicle standing at the depot with full capacity at time 0.
    pub fn at_depot(initial_capacity: f64) -> Self {
        Self {
            remaining_capacity: initial_capacity,
            elapsed_time: 0.0,
        }
    }

    /// Capacity left on the current trip. Negative once overloaded.
    pub fn remaining_capacity(&self) -> f64 {
        self.remaining_capacity
    }

    /// Time elapsed on the current trip.
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    /// Returns to the depot: full capacity, time 0.
    pub fn reset(&mut self, initial_capacity: f64) {
        *self = Self::at_depot(initial_capacity);
    }

    /// Travels `distance` to a node and serves `demand` there, waiting until
    /// `window_start` if arriving early.
    ///
    /// Capacity is not checked; overloading only shows up as a negative
    /// remaining capacity.
    pub fn serve(&mut self, distance: f64, demand: f64, window_start: f64) {
        self.elapsed_time = (self.elapsed_time + distance).max(window_start);
        self.remaining_capacity -= demand;
    }

    /// `[remaining_capacity, elapsed_time]`, the trailing decoder inputs.
    pub fn as_pair(&self) -> [f64; 2] {
        [self.remaining_capacity, self.elapsed_time]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_at_depot() {
        let v = VehicleState::at_depot(12.0);
        assert_eq!(v.remaining_capacity(), 12.0);
        assert_eq!(v.elapsed_time(), 0.0);
        assert_eq!(v.as_pair(), [12.0, 0.0]);
    }

    #[test]
    fn test_serve_late_arrival() {
        let mut v = VehicleState::at_depot(5.0);
        v.serve(1.5, 2.0, 0.5);
        assert_eq!(v.elapsed_time(), 1.5);
        assert_eq!(v.remaining_capacity(), 3.0);
    }

    #[test]
    fn test_serve_allows_overload() {
        let mut v = VehicleState::at_depot(1.0);
        v.serve(0.0, 3.0, 0.0);
        assert_eq!(v.remaining_capacity(), -2.0);
    }

    #[test]
    fn test_reset() {
        let mut v = VehicleState::at_depot(4.0);
        v.serve(2.0, 3.0, 7.0);
        assert_eq!(v.elapsed_time(), 7.0);
        v.reset(4.0);
        assert_eq!(v, VehicleState::at_depot(4.0));
    }

    proptest! {
        #[test]
        fn prop_elapsed_time_non_decreasing(
            legs in prop::collection::vec((0.0f64..2.0, 0.0f64..10.0, 0.0f64..8.0), 1..20),
        ) {
            let mut v = VehicleState::at_depot(10.0);
            let mut last = v.elapsed_time();
            for (distance, demand, window_start) in legs {
                let capacity_before = v.remaining_capacity();
                v.serve(distance, demand, window_start);
                prop_assert!(v.elapsed_time() >= last);
                prop_assert!(v.elapsed_time() >= window_start);
                prop_assert_eq!(v.remaining_capacity(), capacity_before - demand);
                last = v.elapsed_time();
            }
        }
    }
}
