//! Core linear-algebra traits for mckrylov.

/// Matrix–vector product over dense slices: y ← A x.
///
/// The Krylov solvers only see the coefficient matrix through this trait,
/// so any operator with a known shape can drive them.
pub trait MatVec<T> {
    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;
    /// Compute y = A · x.  `x.len() == ncols()`, `y.len() == nrows()`.
    fn matvec(&self, x: &[T], y: &mut [T]);
}
