//! Parameterized solve pipeline.
//!
//! One entry point covers the reordering × preconditioner × method grid
//! instead of a named function per combination. The pipeline pads the
//! system to a block multiple when a blocked strategy asks for it, permutes
//! matrix, right-hand side and guess, builds the factors on the permuted
//! matrix with the matching class schedule, runs the chosen method, then
//! maps the solution back to the original numbering and strips the padding.
//! Padded unknowns sit on unit-diagonal rows with zero right-hand side, so
//! they never feed back into the original ones.

use crate::error::Error;
use crate::graph::{abmc, amc, Reordering};
use crate::matrix::CsrMatrix;
use crate::preconditioner::{Ilu, Ilub, Preconditioner};
use crate::solver::{BiCgStab, Gcr, Gmres, IterativeSolver};
use crate::utils::{Convergence, SolveStats};
use num_traits::Float;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderStrategy {
    None,
    Amc,
    Abmc { block_size: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcStrategy {
    None,
    Ilu0,
    Ilub { block_size: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Gmres { restart: usize },
    Bicgstab,
    Gcr { restart: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct SolverDriver<T> {
    pub reorder: ReorderStrategy,
    pub pc: PcStrategy,
    pub method: Method,
    pub conv: Convergence<T>,
}

impl<T: Float + Send + Sync> SolverDriver<T> {
    pub fn new(
        reorder: ReorderStrategy,
        pc: PcStrategy,
        method: Method,
        conv: Convergence<T>,
    ) -> Self {
        Self { reorder, pc, method, conv }
    }

    /// Block size the pipeline must pad to, if any.
    fn block_size(&self) -> Result<Option<usize>, Error> {
        let reorder_bs = match self.reorder {
            ReorderStrategy::Abmc { block_size } => Some(block_size),
            _ => None,
        };
        let pc_bs = match self.pc {
            PcStrategy::Ilub { block_size } => Some(block_size),
            _ => None,
        };
        if let (Some(r), Some(p)) = (reorder_bs, pc_bs) {
            if r != p {
                return Err(Error::InvalidInput(format!(
                    "reordering block size {r} conflicts with factorization block size {p}"
                )));
            }
        }
        if pc_bs.is_some() && self.reorder == ReorderStrategy::Amc {
            return Err(Error::InvalidInput(
                "blocked factorization needs a block-aligned schedule; use Abmc or no \
                 reordering"
                    .into(),
            ));
        }
        Ok(reorder_bs.or(pc_bs))
    }

    /// Solve A x = b from a zero initial guess.
    pub fn solve(&self, a: &CsrMatrix<T>, b: &[T]) -> Result<(Vec<T>, SolveStats<T>), Error> {
        self.solve_from(a, b, vec![T::zero(); b.len()])
    }

    /// Solve A x = b starting from `x0`.
    pub fn solve_from(
        &self,
        a: &CsrMatrix<T>,
        b: &[T],
        x0: Vec<T>,
    ) -> Result<(Vec<T>, SolveStats<T>), Error> {
        if a.nrows() != a.ncols() {
            return Err(Error::InvalidInput(format!(
                "solve requires a square matrix, got {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }
        if b.len() != a.nrows() || x0.len() != a.nrows() {
            return Err(Error::InvalidInput(format!(
                "matrix dimension {} does not match b ({}) or x0 ({})",
                a.nrows(),
                b.len(),
                x0.len()
            )));
        }
        let n = a.nrows();

        // pad to a block multiple when a blocked strategy demands it
        let (work, rhs, guess) = match self.block_size()? {
            Some(bs) if n % bs != 0 => {
                let padded = a.pad_to_multiple(bs)?;
                let pn = padded.nrows();
                let mut rb = b.to_vec();
                rb.resize(pn, T::zero());
                let mut gx = x0;
                gx.resize(pn, T::zero());
                (padded, rb, gx)
            }
            _ => (a.clone(), b.to_vec(), x0),
        };

        let reordering: Option<Reordering> = match self.reorder {
            ReorderStrategy::None => None,
            ReorderStrategy::Amc => Some(amc(&work)?),
            ReorderStrategy::Abmc { block_size } => Some(abmc(&work, block_size)?),
        };

        let (work, rhs, guess) = match &reordering {
            Some(r) => (work.permute(&r.perm)?, r.perm.apply(&rhs), r.perm.apply(&guess)),
            None => (work, rhs, guess),
        };

        let pc: Option<Box<dyn Preconditioner<T>>> = match self.pc {
            PcStrategy::None => None,
            PcStrategy::Ilu0 => Some(match &reordering {
                Some(r) => Box::new(Ilu::colored(&work, r)?),
                None => Box::new(Ilu::new(&work)?),
            }),
            PcStrategy::Ilub { block_size } => Some(match &reordering {
                Some(r) => Box::new(Ilub::colored(&work, r)?),
                None => Box::new(Ilub::new(&work, block_size)?),
            }),
        };

        let mut x = guess;
        let stats = {
            let pc_ref = pc.as_deref();
            match self.method {
                Method::Gmres { restart } => {
                    Gmres::new(restart, self.conv).solve(&work, pc_ref, &rhs, &mut x)?
                }
                Method::Bicgstab => BiCgStab::new(self.conv).solve(&work, pc_ref, &rhs, &mut x)?,
                Method::Gcr { restart } => {
                    Gcr::new(restart, self.conv).solve(&work, pc_ref, &rhs, &mut x)?
                }
            }
        };

        let mut x = match &reordering {
            Some(r) => r.perm.apply_inverse(&x),
            None => x,
        };
        x.truncate(n);
        Ok((x, stats))
    }
}
