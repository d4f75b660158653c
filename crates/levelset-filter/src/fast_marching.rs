//! Fast marching
//!
//! Solves the eikonal equation `|∇T| F = 1` outward from a set of seeds,
//! giving the arrival time `T` of a front moving with speed `F`. With unit
//! speed `T` is the distance to the seeds along the grid.
//!
//! Nodes are finalized in order of increasing `T` using a binary heap.
//! Each node is updated from its already-finalized axis neighbors with the
//! first-order upwind discretization.

use crate::{FilterError, FilterResult};
use levelset_core::{Field, Grid};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Value given to nodes the front never reaches
pub const UNREACHED: f32 = f32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Far,
    Trial,
    Alive,
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    value: f64,
    offset: usize,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap; offset breaks ties so the order is total
        other
            .value
            .total_cmp(&self.value)
            .then_with(|| other.offset.cmp(&self.offset))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

/// Fast marching solver configuration
///
/// # Examples
///
/// ```
/// use levelset_core::Grid;
/// use levelset_filter::FastMarching;
///
/// let grid = Grid::new(&[16, 16]).unwrap();
/// let arrival = FastMarching::new(grid)
///     .with_trial_points(&[(vec![8, 8], 0.0)])
///     .unwrap()
///     .run()
///     .unwrap();
/// assert_eq!(arrival.get(&[8, 12]).unwrap(), 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct FastMarching {
    grid: Grid,
    trial: Vec<(usize, f64)>,
    alive: Vec<(usize, f64)>,
    speed: Option<Field>,
    stopping_value: f64,
}

impl FastMarching {
    /// Create a solver over `grid` with no seeds and unit speed
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            trial: Vec::new(),
            alive: Vec::new(),
            speed: None,
            stopping_value: f64::INFINITY,
        }
    }

    /// Add seeds given by coordinate and initial arrival time
    ///
    /// Trial seeds may still be lowered by a faster path from another seed.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidParameters` for a coordinate outside
    /// the grid or a non-finite value.
    pub fn with_trial_points(mut self, points: &[(Vec<usize>, f64)]) -> FilterResult<Self> {
        for (coord, value) in points {
            let offset = self.grid.offset(coord).ok_or_else(|| {
                FilterError::InvalidParameters(format!(
                    "seed {:?} outside grid {:?}",
                    coord,
                    self.grid.dims()
                ))
            })?;
            check_value(*value)?;
            self.trial.push((offset, *value));
        }
        Ok(self)
    }

    /// Add nodes with fixed arrival times, given by linear offset
    ///
    /// Alive nodes are never updated; marching starts from their
    /// neighbors.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidParameters` for an offset outside the
    /// grid or a non-finite value.
    pub fn with_alive_points<I>(mut self, points: I) -> FilterResult<Self>
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        for (offset, value) in points {
            if offset >= self.grid.len() {
                return Err(FilterError::InvalidParameters(format!(
                    "alive offset {} outside grid of {} nodes",
                    offset,
                    self.grid.len()
                )));
            }
            check_value(value)?;
            self.alive.push((offset, value));
        }
        Ok(self)
    }

    /// Use a speed image instead of unit speed
    ///
    /// Nodes with non-positive speed are never reached.
    ///
    /// # Errors
    ///
    /// Returns a `DimensionMismatch` error if the speed image has a
    /// different shape than the grid.
    pub fn with_speed(mut self, speed: Field) -> FilterResult<Self> {
        self.grid.check_same_shape(speed.grid())?;
        self.speed = Some(speed);
        Ok(self)
    }

    /// Stop once the front passes `value`
    ///
    /// Nodes beyond the stopping value are left at [`UNREACHED`].
    pub fn with_stopping_value(mut self, value: f64) -> Self {
        self.stopping_value = value;
        self
    }

    /// March the front and return the arrival time at every node
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidParameters` if no seeds were given.
    pub fn run(&self) -> FilterResult<Field> {
        if self.trial.is_empty() && self.alive.is_empty() {
            return Err(FilterError::InvalidParameters(
                "fast marching needs at least one seed".to_string(),
            ));
        }

        let len = self.grid.len();
        let mut value = vec![f64::INFINITY; len];
        let mut state = vec![NodeState::Far; len];
        let mut heap = BinaryHeap::new();

        for &(offset, v) in &self.alive {
            value[offset] = v;
            state[offset] = NodeState::Alive;
        }
        for &(offset, v) in &self.trial {
            if state[offset] == NodeState::Alive || v >= value[offset] {
                continue;
            }
            value[offset] = v;
            state[offset] = NodeState::Trial;
            heap.push(HeapEntry { value: v, offset });
        }
        for &(offset, _) in &self.alive {
            self.update_neighbors(offset, &mut value, &mut state, &mut heap);
        }

        while let Some(HeapEntry { value: v, offset }) = heap.pop() {
            if state[offset] == NodeState::Alive || v != value[offset] {
                continue;
            }
            if v > self.stopping_value {
                break;
            }
            state[offset] = NodeState::Alive;
            self.update_neighbors(offset, &mut value, &mut state, &mut heap);
        }

        let data = value
            .iter()
            .zip(&state)
            .map(|(&v, &s)| if s == NodeState::Alive { v as f32 } else { UNREACHED })
            .collect();
        Ok(Field::from_data(self.grid.clone(), data)?)
    }

    fn update_neighbors(
        &self,
        offset: usize,
        value: &mut [f64],
        state: &mut [NodeState],
        heap: &mut BinaryHeap<HeapEntry>,
    ) {
        for axis in 0..self.grid.ndim() {
            for step in [-1isize, 1] {
                let Some(n) = self.grid.neighbor_checked(offset, axis, step) else {
                    continue;
                };
                if state[n] == NodeState::Alive {
                    continue;
                }
                let Some(t) = self.solve(n, value, state) else {
                    continue;
                };
                if t < value[n] {
                    value[n] = t;
                    state[n] = NodeState::Trial;
                    heap.push(HeapEntry { value: t, offset: n });
                }
            }
        }
    }

    /// Upwind solution of `Σ ((T - a_i) / h_i)² = 1 / F²` at one node
    fn solve(&self, offset: usize, value: &[f64], state: &[NodeState]) -> Option<f64> {
        let speed = match &self.speed {
            Some(s) => s.get_at(offset) as f64,
            None => 1.0,
        };
        if !(speed > 0.0) {
            return None;
        }

        // Smallest alive neighbor value along each axis
        let mut terms: Vec<(f64, f64)> = Vec::with_capacity(self.grid.ndim());
        for axis in 0..self.grid.ndim() {
            let best = [-1isize, 1]
                .iter()
                .filter_map(|&step| self.grid.neighbor_checked(offset, axis, step))
                .filter(|&n| state[n] == NodeState::Alive)
                .map(|n| value[n])
                .fold(f64::INFINITY, f64::min);
            if best.is_finite() {
                let h = self.grid.spacing()[axis];
                terms.push((best, 1.0 / (h * h)));
            }
        }
        if terms.is_empty() {
            return None;
        }
        terms.sort_by(|a, b| a.0.total_cmp(&b.0));

        let rhs = 1.0 / (speed * speed);
        let (mut a, mut b, mut c) = (0.0, 0.0, -rhs);
        let mut solution = f64::INFINITY;
        for (k, &(t, w)) in terms.iter().enumerate() {
            if k > 0 && solution <= t {
                break;
            }
            a += w;
            b -= 2.0 * w * t;
            c += w * t * t;
            let disc = b * b - 4.0 * a * c;
            if disc < 0.0 {
                break;
            }
            solution = (-b + disc.sqrt()) / (2.0 * a);
        }
        Some(solution)
    }
}

fn check_value(value: f64) -> FilterResult<()> {
    if !value.is_finite() {
        return Err(FilterError::InvalidParameters(format!(
            "seed value must be finite, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_distances_exact() {
        let grid = Grid::new(&[11, 11]).unwrap();
        let t = FastMarching::new(grid)
            .with_trial_points(&[(vec![5, 5], 0.0)])
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(t.get(&[5, 5]).unwrap(), 0.0);
        assert_eq!(t.get(&[9, 5]).unwrap(), 4.0);
        assert_eq!(t.get(&[5, 0]).unwrap(), 5.0);
        // First-order scheme overestimates diagonals a little
        let diag = t.get(&[8, 8]).unwrap();
        assert!(diag > 4.24 && diag < 5.0, "diag = {diag}");
    }

    #[test]
    fn test_speed_scales_arrival() {
        let grid = Grid::new(&[9, 3]).unwrap();
        let speed = Field::new_with_value(&[9, 3], 2.0).unwrap();
        let t = FastMarching::new(grid)
            .with_trial_points(&[(vec![0, 1], 0.0)])
            .unwrap()
            .with_speed(speed)
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(t.get(&[8, 1]).unwrap(), 4.0);
    }

    #[test]
    fn test_stopping_value() {
        let grid = Grid::new(&[20]).unwrap();
        let t = FastMarching::new(grid)
            .with_trial_points(&[(vec![0], 0.0)])
            .unwrap()
            .with_stopping_value(5.0)
            .run()
            .unwrap();
        assert_eq!(t.get(&[5]).unwrap(), 5.0);
        assert_eq!(t.get(&[10]).unwrap(), UNREACHED);
    }

    #[test]
    fn test_alive_points_are_frozen() {
        let grid = Grid::new(&[6]).unwrap();
        let t = FastMarching::new(grid)
            .with_alive_points([(2usize, 0.25), (3usize, 10.0)])
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(t.get(&[3]).unwrap(), 10.0);
        assert_eq!(t.get(&[1]).unwrap(), 1.25);
        assert_eq!(t.get(&[5]).unwrap(), 12.0);
    }

    #[test]
    fn test_invalid_seeds() {
        let grid = Grid::new(&[4, 4]).unwrap();
        assert!(FastMarching::new(grid.clone())
            .with_trial_points(&[(vec![4, 0], 0.0)])
            .is_err());
        assert!(FastMarching::new(grid.clone())
            .with_trial_points(&[(vec![1], 0.0)])
            .is_err());
        assert!(FastMarching::new(grid).run().is_err());
    }
}
