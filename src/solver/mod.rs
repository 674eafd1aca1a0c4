//! Krylov subspace solvers.
//!
//! All three methods share the same contract: they iterate on `x` in place,
//! test the true relative residual ‖b − A x‖₂ / ‖b‖₂, and always hand back
//! a `SolveStats` describing how the run ended. Numerical failure modes
//! (breakdown, hitting the iteration cap) are outcomes, not errors; the
//! best iterate so far stays in `x`. `Err` is reserved for structurally
//! invalid input.

pub mod bicgstab;
pub mod gcr;
pub mod gmres;

pub use bicgstab::BiCgStab;
pub use gcr::Gcr;
pub use gmres::Gmres;

use crate::core::traits::MatVec;
use crate::error::Error;
use crate::kernels::blas1;
use crate::preconditioner::Preconditioner;
use crate::utils::SolveStats;
use num_traits::Float;

/// One iterative method, configured once and reusable across systems.
pub trait IterativeSolver<T> {
    /// Solve A x = b starting from the current contents of `x`.
    fn solve(
        &self,
        a: &dyn MatVec<T>,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, Error>;
}

pub(crate) fn check_system<T>(a: &dyn MatVec<T>, b: &[T], x: &[T]) -> Result<(), Error> {
    if a.nrows() != a.ncols() {
        return Err(Error::InvalidInput(format!(
            "iterative solve requires a square operator, got {}x{}",
            a.nrows(),
            a.ncols()
        )));
    }
    if b.len() != a.nrows() || x.len() != a.nrows() {
        return Err(Error::InvalidInput(format!(
            "operator dimension {} does not match b ({}) or x ({})",
            a.nrows(),
            b.len(),
            x.len()
        )));
    }
    Ok(())
}

/// Denominator of the relative residual test; a zero right-hand side makes
/// the test absolute.
pub(crate) fn residual_scale<T: Float + Send + Sync>(b: &[T]) -> T {
    let bnorm = blas1::nrm2(b);
    if bnorm.is_zero() { T::one() } else { bnorm }
}

/// z ← M⁻¹ r, with the identity standing in when no preconditioner is set.
pub(crate) fn apply_pc<T: Float>(
    pc: Option<&dyn Preconditioner<T>>,
    r: &[T],
    z: &mut [T],
) -> Result<(), Error> {
    match pc {
        Some(m) => m.apply(r, z),
        None => {
            blas1::copy(r, z);
            Ok(())
        }
    }
}

/// r ← b − A x
pub(crate) fn residual<T: Float>(a: &dyn MatVec<T>, b: &[T], x: &[T], r: &mut [T]) {
    a.matvec(x, r);
    for (ri, &bi) in r.iter_mut().zip(b) {
        *ri = bi - *ri;
    }
}
