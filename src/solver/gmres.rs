//! Restarted GMRES with right preconditioning.
//!
//! The Arnoldi process builds an orthonormal basis of the Krylov space of
//! A M⁻¹ by modified Gram-Schmidt; the Hessenberg least-squares problem is
//! reduced incrementally with Givens rotations, so the residual norm is
//! available at every inner step without forming the iterate. Right
//! preconditioning keeps the monitored quantity equal to the true residual
//! norm. At a restart (or early exit) the correction is assembled from the
//! basis, pulled back through M⁻¹ and added onto x, and the true residual
//! is recomputed before the next cycle.

use crate::core::traits::MatVec;
use crate::error::Error;
use crate::kernels::blas1::{axpy, dot, ggen, grot, nrm2};
use crate::preconditioner::Preconditioner;
use crate::solver::{apply_pc, check_system, residual, residual_scale, IterativeSolver};
use crate::utils::{Convergence, SolveStats, StopReason};
use num_traits::Float;

#[derive(Debug, Clone, Copy)]
pub struct Gmres<T> {
    /// Inner dimension m of GMRES(m): the basis is rebuilt from the current
    /// residual every m steps.
    pub restart: usize,
    pub conv: Convergence<T>,
}

impl<T> Gmres<T> {
    pub fn new(restart: usize, conv: Convergence<T>) -> Self {
        Self { restart, conv }
    }
}

impl<T: Float + Send + Sync> IterativeSolver<T> for Gmres<T> {
    fn solve(
        &self,
        a: &dyn MatVec<T>,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, Error> {
        check_system(a, b, x)?;
        if self.restart == 0 {
            return Err(Error::InvalidInput("GMRES restart length must be positive".into()));
        }
        let n = b.len();
        let m = self.restart;
        let stride = m + 1;
        let scale = residual_scale(b);

        let mut r = vec![T::zero(); n];
        let mut w = vec![T::zero(); n];
        let mut z = vec![T::zero(); n];
        // column-major Hessenberg, column j at h[j * stride ..]
        let mut h = vec![T::zero(); stride * m];
        let mut g = vec![T::zero(); stride];
        let mut cs = vec![T::zero(); m];
        let mut sn = vec![T::zero(); m];
        let mut basis: Vec<Vec<T>> = (0..stride).map(|_| vec![T::zero(); n]).collect();

        let mut iters = 0usize;
        loop {
            residual(a, b, x, &mut r);
            let beta = nrm2(&r);
            if beta / scale <= self.conv.tol {
                return Ok(SolveStats {
                    iterations: iters,
                    final_residual: beta / scale,
                    stop: StopReason::Converged,
                });
            }
            if iters >= self.conv.max_iters {
                return Ok(SolveStats {
                    iterations: iters,
                    final_residual: beta / scale,
                    stop: StopReason::IterationLimit,
                });
            }

            for (v0, &ri) in basis[0].iter_mut().zip(&r) {
                *v0 = ri / beta;
            }
            for gi in g.iter_mut() {
                *gi = T::zero();
            }
            g[0] = beta;

            let mut k = 0;
            let mut invariant = false;
            for j in 0..m {
                apply_pc(pc, &basis[j], &mut z)?;
                a.matvec(&z, &mut w);

                // modified Gram-Schmidt against v_0..v_j
                let col = &mut h[j * stride..(j + 1) * stride];
                for i in 0..=j {
                    col[i] = dot(&w, &basis[i]);
                    axpy(-col[i], &basis[i], &mut w);
                }
                let hj1 = nrm2(&w);
                col[j + 1] = hj1;
                // lucky breakdown: the new basis vector is negligible
                // relative to the column, so the Krylov space is invariant
                let lucky = hj1 <= T::epsilon() * nrm2(&col[..=j]);

                for i in 0..j {
                    let (mut t0, mut t1) = (col[i], col[i + 1]);
                    grot(cs[i], sn[i], &mut t0, &mut t1);
                    col[i] = t0;
                    col[i + 1] = t1;
                }
                let (rj, c, s) = ggen(col[j], col[j + 1]);
                cs[j] = c;
                sn[j] = s;
                col[j] = rj;
                col[j + 1] = T::zero();
                let (mut t0, mut t1) = (g[j], g[j + 1]);
                grot(c, s, &mut t0, &mut t1);
                g[j] = t0;
                g[j + 1] = t1;

                iters += 1;
                k = j + 1;
                let rel = g[j + 1].abs() / scale;
                if rel <= self.conv.tol || iters >= self.conv.max_iters {
                    break;
                }
                if lucky {
                    // the least-squares solution over the invariant space is
                    // exact, so stop expanding instead of dividing by hj1
                    invariant = true;
                    break;
                }
                for (vi, &wi) in basis[j + 1].iter_mut().zip(&w) {
                    *vi = wi / hj1;
                }
            }

            // back substitution on the k×k triangle
            let mut y = vec![T::zero(); k];
            for i in (0..k).rev() {
                let mut t = g[i];
                for j in i + 1..k {
                    t = t - h[j * stride + i] * y[j];
                }
                let d = h[i * stride + i];
                // a vanished pivot only occurs alongside a lucky breakdown;
                // skip the component instead of dividing by zero
                y[i] = if d.is_zero() { T::zero() } else { t / d };
            }
            // correction in the preconditioned variable, pulled back to x
            let mut u = vec![T::zero(); n];
            for (j, &yj) in y.iter().enumerate() {
                axpy(yj, &basis[j], &mut u);
            }
            apply_pc(pc, &u, &mut z)?;
            axpy(T::one(), &z, x);

            if invariant {
                residual(a, b, x, &mut r);
                let rel = nrm2(&r) / scale;
                let stop = if rel <= self.conv.tol {
                    StopReason::Converged
                } else {
                    StopReason::Breakdown
                };
                return Ok(SolveStats { iterations: iters, final_residual: rel, stop });
            }
        }
    }
}
