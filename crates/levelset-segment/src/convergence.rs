//! Convergence monitor
//!
//! Tracks the RMS change of the level set across iterations and decides
//! when a run ends.

use std::fmt;

/// State of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Still iterating
    Running,
    /// RMS change fell below the maximum RMS error
    Converged,
    /// Iteration budget used up
    MaxIterationsReached,
    /// RMS change became non-finite
    Diverged,
    /// Stopped by a cancellation request at an iteration boundary
    Cancelled,
}

impl RunStatus {
    /// Whether the run has ended
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStatus::Running => "running",
            RunStatus::Converged => "converged",
            RunStatus::MaxIterationsReached => "maximum iterations reached",
            RunStatus::Diverged => "diverged",
            RunStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Summary of one iteration, delivered to progress observers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationRecord {
    /// 1-based iteration number
    pub iteration: u32,
    /// RMS change of the level set over the front
    pub rms_change: f64,
    /// Volume enclosed by the front, in physical units
    pub metric_value: f64,
    /// Time step used
    pub time_step: f64,
    /// Number of nodes updated
    pub band_size: usize,
}

/// Accumulates squared changes over the front
#[derive(Debug, Default, Clone, Copy)]
pub struct RmsAccumulator {
    sum_sq: f64,
    count: usize,
}

impl RmsAccumulator {
    /// Add the change at one node
    pub fn add(&mut self, old: f32, new: f32) {
        let d = new as f64 - old as f64;
        self.sum_sq += d * d;
        self.count += 1;
    }

    /// Root mean square of the changes; zero when nothing was added
    pub fn rms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.sum_sq / self.count as f64).sqrt()
        }
    }
}

/// Run state machine
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    maximum_rms_error: f64,
    number_of_iterations: u32,
    status: RunStatus,
    iterations: u32,
    rms_change: f64,
}

impl ConvergenceMonitor {
    /// Monitor for a run with the given limits
    ///
    /// A zero iteration budget ends the run immediately.
    pub fn new(maximum_rms_error: f64, number_of_iterations: u32) -> Self {
        let status = if number_of_iterations == 0 {
            RunStatus::MaxIterationsReached
        } else {
            RunStatus::Running
        };
        Self {
            maximum_rms_error,
            number_of_iterations,
            status,
            iterations: 0,
            rms_change: 0.0,
        }
    }

    /// Current state
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Iterations completed
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// RMS change of the last completed iteration
    pub fn rms_change(&self) -> f64 {
        self.rms_change
    }

    /// Record a completed iteration and return the new state
    ///
    /// Divergence takes precedence over convergence, which takes
    /// precedence over the iteration budget.
    pub fn record(&mut self, rms_change: f64) -> RunStatus {
        if self.status.is_terminal() {
            return self.status;
        }
        self.iterations += 1;
        self.rms_change = rms_change;
        self.status = if !rms_change.is_finite() {
            RunStatus::Diverged
        } else if rms_change < self.maximum_rms_error {
            RunStatus::Converged
        } else if self.iterations >= self.number_of_iterations {
            RunStatus::MaxIterationsReached
        } else {
            RunStatus::Running
        };
        self.status
    }

    /// Stop the run at the current iteration boundary
    pub fn cancel(&mut self) {
        if !self.status.is_terminal() {
            self.status = RunStatus::Cancelled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget() {
        let m = ConvergenceMonitor::new(0.02, 0);
        assert_eq!(m.status(), RunStatus::MaxIterationsReached);
        assert_eq!(m.iterations(), 0);
    }

    #[test]
    fn test_transitions() {
        let mut m = ConvergenceMonitor::new(0.1, 3);
        assert_eq!(m.record(0.5), RunStatus::Running);
        assert_eq!(m.record(0.05), RunStatus::Converged);
        // Terminal states are sticky
        assert_eq!(m.record(0.5), RunStatus::Converged);
        assert_eq!(m.iterations(), 2);

        let mut m = ConvergenceMonitor::new(0.1, 2);
        m.record(1.0);
        assert_eq!(m.record(1.0), RunStatus::MaxIterationsReached);

        let mut m = ConvergenceMonitor::new(0.1, 10);
        assert_eq!(m.record(f64::NAN), RunStatus::Diverged);
        assert!(m.rms_change().is_nan());
    }

    #[test]
    fn test_cancel() {
        let mut m = ConvergenceMonitor::new(0.1, 10);
        m.record(1.0);
        m.cancel();
        assert_eq!(m.status(), RunStatus::Cancelled);
        assert_eq!(m.iterations(), 1);
    }

    #[test]
    fn test_rms_accumulator() {
        let mut acc = RmsAccumulator::default();
        assert_eq!(acc.rms(), 0.0);
        acc.add(0.0, 3.0);
        acc.add(1.0, -3.0);
        assert!((acc.rms() - 12.5f64.sqrt()).abs() < 1e-12);
    }
}
