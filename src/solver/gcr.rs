//! GCR(m): generalized conjugate residuals with a truncated direction set.
//!
//! Each step preconditions the residual, maps it through A, and
//! orthogonalizes the image against the retained A-images so the stored
//! directions keep ⟨A pᵢ, A pⱼ⟩ = δᵢⱼ. The window holds at most `restart`
//! pairs; once full, the oldest pair is evicted, which makes the cost per
//! step flat instead of growing like full GCR. A vanishing ‖A p‖ means the
//! preconditioned residual brought no new direction, reported as
//! `Breakdown`.

use crate::core::traits::MatVec;
use crate::error::Error;
use crate::kernels::blas1::{axpy, dot, nrm2};
use crate::preconditioner::Preconditioner;
use crate::solver::{apply_pc, check_system, residual, residual_scale, IterativeSolver};
use crate::utils::{Convergence, SolveStats, StopReason};
use num_traits::Float;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
pub struct Gcr<T> {
    /// Maximum number of retained (p, A p) pairs.
    pub restart: usize,
    pub conv: Convergence<T>,
}

impl<T> Gcr<T> {
    pub fn new(restart: usize, conv: Convergence<T>) -> Self {
        Self { restart, conv }
    }
}

impl<T: Float + Send + Sync> IterativeSolver<T> for Gcr<T> {
    fn solve(
        &self,
        a: &dyn MatVec<T>,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, Error> {
        check_system(a, b, x)?;
        if self.restart == 0 {
            return Err(Error::InvalidInput("GCR window size must be positive".into()));
        }
        let n = b.len();
        let scale = residual_scale(b);

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

        let mut z = vec![T::zero(); n];
        // window of (direction, A·direction) pairs, A-images orthonormal
        let mut dirs: VecDeque<(Vec<T>, Vec<T>)> = VecDeque::with_capacity(self.restart);
        let mut iters = 0usize;

        loop {
            apply_pc(pc, &r, &mut z)?;
            let mut p = z.clone();
            let mut ap = vec![T::zero(); n];
            a.matvec(&p, &mut ap);

            for (pi, api) in dirs.iter() {
                let beta = dot(&ap, api);
                axpy(-beta, api, &mut ap);
                axpy(-beta, pi, &mut p);
            }

            let apn = nrm2(&ap);
            if apn < T::epsilon() {
                return Ok(SolveStats {
                    iterations: iters,
                    final_residual: rel,
                    stop: StopReason::Breakdown,
                });
            }
            let inv = apn.recip();
            for (pi, api) in p.iter_mut().zip(ap.iter_mut()) {
                *pi = *pi * inv;
                *api = *api * inv;
            }

            let alpha = dot(&r, &ap);
            axpy(alpha, &p, x);
            axpy(-alpha, &ap, &mut r);

            if dirs.len() == self.restart {
                dirs.pop_front();
            }
            dirs.push_back((p, ap));

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
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CsrMatrix;
    use crate::preconditioner::Ilu;

    fn laplace1d(n: usize) -> CsrMatrix<f64> {
        let mut t = Vec::new();
        for i in 0..n {
            t.push((i, i, 2.0));
            if i > 0 {
                t.push((i, i - 1, -1.0));
            }
            if i + 1 < n {
                t.push((i, i + 1, -1.0));
            }
        }
        CsrMatrix::from_triplets(n, n, &t).unwrap()
    }

    #[test]
    fn full_window_converges_like_a_direct_method() {
        let n = 10;
        let a = laplace1d(n);
        let b = vec![1.0; n];
        let mut x = vec![0.0; n];
        let solver = Gcr::new(n, Convergence { tol: 1e-10, max_iters: 2 * n });
        let stats = solver.solve(&a, None, &b, &mut x).unwrap();
        assert!(stats.converged());
        assert!(stats.iterations <= n);
    }

    #[test]
    fn truncated_window_still_converges() {
        let a = laplace1d(20);
        let b: Vec<f64> = (0..20).map(|i| ((i + 1) as f64).recip()).collect();
        let mut x = vec![0.0; 20];
        let solver = Gcr::new(4, Convergence { tol: 1e-8, max_iters: 500 });
        let stats = solver.solve(&a, None, &b, &mut x).unwrap();
        assert!(stats.converged());
        let mut r = vec![0.0; 20];
        residual(&a, &b, &x, &mut r);
        assert!(nrm2(&r) / nrm2(&b) <= 1e-8);
    }

    #[test]
    fn preconditioning_reduces_iterations() {
        let a = laplace1d(30);
        let b = vec![1.0; 30];
        let conv = Convergence { tol: 1e-8, max_iters: 400 };
        let solver = Gcr::new(5, conv);

        let mut x0 = vec![0.0; 30];
        let plain = solver.solve(&a, None, &b, &mut x0).unwrap();
        let pc = Ilu::new(&a).unwrap();
        let mut x1 = vec![0.0; 30];
        let prec = solver.solve(&a, Some(&pc), &b, &mut x1).unwrap();

        assert!(prec.converged());
        assert!(prec.iterations <= plain.iterations);
    }

    #[test]
    fn zero_window_is_rejected() {
        let a = laplace1d(4);
        let b = vec![1.0; 4];
        let mut x = vec![0.0; 4];
        let solver = Gcr::new(0, Convergence::default());
        assert!(matches!(solver.solve(&a, None, &b, &mut x), Err(Error::InvalidInput(_))));
    }
}
