//! BiCGSTAB: stabilized bi-conjugate gradients for unsymmetric systems.
//!
//! Short recurrence, two matvecs and two preconditioner applications per
//! iteration. The method divides by three inner products (ρ, the ⟨r₀, Ap̂⟩
//! denominator of α, and ⟨t, t⟩ for ω); when any of them vanishes the
//! recurrence is undefined and the run stops with `Breakdown`, leaving the
//! last iterate in place.

use crate::core::traits::MatVec;
use crate::error::Error;
use crate::kernels::blas1::{axpy, dot, nrm2};
use crate::preconditioner::Preconditioner;
use crate::solver::{apply_pc, check_system, residual, residual_scale, IterativeSolver};
use crate::utils::{Convergence, SolveStats, StopReason};
use num_traits::Float;

#[derive(Debug, Clone, Copy)]
pub struct BiCgStab<T> {
    pub conv: Convergence<T>,
}

impl<T> BiCgStab<T> {
    pub fn new(conv: Convergence<T>) -> Self {
        Self { conv }
    }
}

impl<T: Float + Send + Sync> IterativeSolver<T> for BiCgStab<T> {
    fn solve(
        &self,
        a: &dyn MatVec<T>,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, Error> {
        check_system(a, b, x)?;
        let n = b.len();
        let scale = residual_scale(b);
        let eps = T::epsilon();

        let mut r = vec![T::zero(); n];
        residual(a, b, x, &mut r);
        let mut rel = nrm2(&r) / scale;
        if rel <= self.conv.tol {
            return Ok(SolveStats {
                iterations: 0,
                final_residual: rel,
                stop: StopReason::Converged,
            });
        }
        // fixed shadow residual r₀ = r(0)
        let r0 = r.clone();

        let mut p = vec![T::zero(); n];
        let mut v = vec![T::zero(); n];
        let mut s = vec![T::zero(); n];
        let mut t = vec![T::zero(); n];
        let mut phat = vec![T::zero(); n];
        let mut shat = vec![T::zero(); n];

        let mut rho_old = T::one();
        let mut alpha = T::one();
        let mut omega = T::one();
        let mut iters = 0usize;

        loop {
            let rho = dot(&r0, &r);
            if rho.abs() < eps {
                return Ok(SolveStats {
                    iterations: iters,
                    final_residual: rel,
                    stop: StopReason::Breakdown,
                });
            }
            if iters == 0 {
                p.copy_from_slice(&r);
            } else {
                let beta = (rho / rho_old) * (alpha / omega);
                // p ← r + β (p − ω v)
                for ((pi, &ri), &vi) in p.iter_mut().zip(&r).zip(&v) {
                    *pi = ri + beta * (*pi - omega * vi);
                }
            }

            apply_pc(pc, &p, &mut phat)?;
            a.matvec(&phat, &mut v);
            let den = dot(&r0, &v);
            if den.abs() < eps {
                return Ok(SolveStats {
                    iterations: iters,
                    final_residual: rel,
                    stop: StopReason::Breakdown,
                });
            }
            alpha = rho / den;

            // s = r − α v
            for ((si, &ri), &vi) in s.iter_mut().zip(&r).zip(&v) {
                *si = ri - alpha * vi;
            }

            apply_pc(pc, &s, &mut shat)?;
            a.matvec(&shat, &mut t);
            let tt = dot(&t, &t);
            if tt.abs() < eps {
                // α p̂ alone may already have fixed the iterate
                axpy(alpha, &phat, x);
                residual(a, b, x, &mut r);
                rel = nrm2(&r) / scale;
                let stop = if rel <= self.conv.tol {
                    StopReason::Converged
                } else {
                    StopReason::Breakdown
                };
                return Ok(SolveStats { iterations: iters + 1, final_residual: rel, stop });
            }
            omega = dot(&t, &s) / tt;

            axpy(alpha, &phat, x);
            axpy(omega, &shat, x);
            // r = s − ω t
            for ((ri, &si), &ti) in r.iter_mut().zip(&s).zip(&t) {
                *ri = si - omega * ti;
            }

            iters += 1;
            rel = nrm2(&r) / scale;
            if rel <= self.conv.tol {
                return Ok(SolveStats {
                    iterations: iters,
                    final_residual: rel,
                    stop: StopReason::Converged,
                });
            }
            if iters >= self.conv.max_iters {
                return Ok(SolveStats {
                    iterations: iters,
                    final_residual: rel,
                    stop: StopReason::IterationLimit,
                });
            }
            rho_old = rho;
        }
    }
}
