//! ILUB: blocked incomplete factorization.
//!
//! The sparsity pattern is first expanded so that every touched
//! `block_size × block_size` block is dense (diagonal blocks always are),
//! then ILU(0) runs on the widened pattern. The extra positions admit the
//! fill a plain ILU(0) would discard inside a block, which usually buys a
//! stronger preconditioner at a modest storage cost. Dimensions must be a
//! multiple of the block size; pad beforehand if they are not.

use crate::error::Error;
use crate::graph::Reordering;
use crate::matrix::CsrMatrix;
use crate::preconditioner::ilu::{ilu0, Ilu, IluFactors};
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Factor A ≈ L U on the block-filled pattern of A.
pub fn ilub<T: Float>(a: &CsrMatrix<T>, block_size: usize) -> Result<IluFactors<T>, Error> {
    let filled = a.block_fill(block_size)?;
    ilu0(&filled)
}

/// Blocked ILU preconditioner. The colored variant expects a block
/// reordering whose block size matches; block-aligned classes keep every
/// scheduling unit's rows consecutive, so the block fill never couples two
/// units of one class.
#[derive(Debug, Clone)]
pub struct Ilub<T> {
    inner: Ilu<T>,
    block_size: usize,
}

impl<T: Float> Ilub<T> {
    pub fn new(a: &CsrMatrix<T>, block_size: usize) -> Result<Self, Error> {
        Ok(Self { inner: Ilu::from_parts(ilub(a, block_size)?, None), block_size })
    }

    /// Factor a matrix already permuted by a block reordering and attach
    /// its class schedule.
    pub fn colored(a: &CsrMatrix<T>, reordering: &Reordering) -> Result<Self, Error> {
        let block = reordering.block.ok_or_else(|| {
            Error::InvalidInput("blocked factorization needs a block reordering".into())
        })?;
        if reordering.perm.len() != a.nrows() {
            return Err(Error::InvalidInput(format!(
                "reordering covers {} rows, matrix has {}",
                reordering.perm.len(),
                a.nrows()
            )));
        }
        let factors = ilub(a, block.block_size)?;
        Ok(Self {
            inner: Ilu::from_parts(
                factors,
                Some((reordering.classes.clone(), reordering.granularity())),
            ),
            block_size: block.block_size,
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn factors(&self) -> &IluFactors<T> {
        self.inner.factors()
    }
}

impl<T: Float + Send + Sync> Preconditioner<T> for Ilub<T> {
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), Error> {
        self.inner.apply(r, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

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
    fn factors_live_on_the_filled_pattern() {
        let a = laplace1d(6);
        let f = ilub(&a, 2).unwrap();
        // position (1, 0) lies inside a dense diagonal block even though the
        // strict factor of the unfilled matrix would also hold it; check a
        // genuine fill position instead: (0, 1) block couples rows 0..2 and
        // 2..4, so (1, 3) must be stored.
        assert!(f.upper.get(1, 3).is_some());
    }

    #[test]
    fn apply_inverts_the_filled_factorization() {
        // with blocks of 2 the tridiagonal pattern fills to block tridiagonal
        // and the factorization is exact on that pattern
        let a = laplace1d(8);
        let pc = Ilub::new(&a, 2).unwrap();
        let b: Vec<f64> = (0..8).map(|i| (i as f64) - 3.0).collect();
        let mut z = vec![0.0; 8];
        pc.apply(&b, &mut z).unwrap();
        let mut az = vec![0.0; 8];
        a.spmv(&z, &mut az);
        for (v, w) in az.iter().zip(&b) {
            assert_abs_diff_eq!(v, w, epsilon = 1e-10);
        }
    }

    #[test]
    fn dimension_must_be_block_aligned() {
        let a = laplace1d(7);
        assert!(Ilub::new(&a, 2).is_err());
    }

    #[test]
    fn colored_apply_matches_sequential_apply() {
        use crate::graph::abmc;
        let a = laplace1d(12);
        let r = abmc(&a, 3).unwrap();
        let p = a.permute(&r.perm).unwrap();

        let seq = Ilub::new(&p, 3).unwrap();
        let col = Ilub::colored(&p, &r).unwrap();
        let rhs: Vec<f64> = (0..12).map(|i| (i as f64 * 0.3).cos()).collect();
        let mut z0 = vec![0.0; 12];
        let mut z1 = vec![0.0; 12];
        seq.apply(&rhs, &mut z0).unwrap();
        col.apply(&rhs, &mut z1).unwrap();
        for (s, c) in z0.iter().zip(&z1) {
            assert_abs_diff_eq!(s, c, epsilon = 1e-12);
        }
    }
}
