//! Stopping criteria and solve statistics shared by all iterative methods.

/// Convergence controls: relative residual tolerance and iteration cap.
/// The residual test is ‖r‖₂ / ‖b‖₂ ≤ tol, with a zero right-hand side
/// falling back to the absolute norm.
#[derive(Debug, Clone, Copy)]
pub struct Convergence<T> {
    pub tol: T,
    pub max_iters: usize,
}

impl Default for Convergence<f64> {
    fn default() -> Self {
        Self { tol: 1e-8, max_iters: 1000 }
    }
}

/// Why an iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The residual test was met.
    Converged,
    /// The iteration cap was reached first.
    IterationLimit,
    /// A scalar the recurrence divides by vanished. The last iterate is
    /// still returned; callers typically restart or switch methods.
    Breakdown,
}

/// Outcome of one solver run. Produced on every return path, so a caller
/// can always inspect how far the iteration got.
#[derive(Debug, Clone, Copy)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub stop: StopReason,
}

impl<T> SolveStats<T> {
    pub fn converged(&self) -> bool {
        self.stop == StopReason::Converged
    }
}
