//! ILU(0): incomplete LU factorization with zero fill-in.
//!
//! The factorization runs in place on a copy of the value array, touching
//! only positions already stored in A, then splits the result into the
//! strict-lower / inverted-diagonal-upper pair. Every row must carry a
//! nonzero diagonal entry; a missing or vanishing pivot aborts with
//! `ZeroPivot`.

use crate::error::Error;
use crate::graph::{ColorClasses, Reordering};
use crate::kernels::sptrsv::{
    sptrsv_lower, sptrsv_lower_colored, sptrsv_upper, sptrsv_upper_colored,
};
use crate::matrix::CsrMatrix;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Triangular factors of an incomplete factorization, in the layout the
/// substitution kernels expect: `lower` is the strict part of a unit lower
/// factor, `upper` stores each row's inverted diagonal first.
#[derive(Debug, Clone)]
pub struct IluFactors<T> {
    pub lower: CsrMatrix<T>,
    pub upper: CsrMatrix<T>,
}

/// Factor A ≈ L U on the sparsity pattern of A (IKJ ordering).
pub fn ilu0<T: Float>(a: &CsrMatrix<T>) -> Result<IluFactors<T>, Error> {
    if a.nrows() != a.ncols() {
        return Err(Error::InvalidInput("ILU(0) requires a square matrix".into()));
    }
    let n = a.nrows();
    let mut m = a.clone();
    let row_ptr = m.row_ptr().to_vec();
    let col_idx = m.col_idx().to_vec();

    let mut diag = vec![usize::MAX; n];
    for i in 0..n {
        for p in row_ptr[i]..row_ptr[i + 1] {
            if col_idx[p] == i {
                diag[i] = p;
            }
        }
        if diag[i] == usize::MAX {
            return Err(Error::ZeroPivot(i));
        }
    }

    let vals = m.values_mut();
    // scratch map from column index to the entry position in the active row
    let mut pos = vec![usize::MAX; n];
    for i in 0..n {
        for p in row_ptr[i]..row_ptr[i + 1] {
            pos[col_idx[p]] = p;
        }
        for p in row_ptr[i]..diag[i] {
            let k = col_idx[p];
            let dk = vals[diag[k]];
            if dk.is_zero() {
                return Err(Error::ZeroPivot(k));
            }
            let factor = vals[p] / dk;
            vals[p] = factor;
            // eliminate against the upper part of row k, pattern-restricted
            for q in diag[k] + 1..row_ptr[k + 1] {
                let t = pos[col_idx[q]];
                if t != usize::MAX {
                    vals[t] = vals[t] - factor * vals[q];
                }
            }
        }
        if vals[diag[i]].is_zero() {
            return Err(Error::ZeroPivot(i));
        }
        for p in row_ptr[i]..row_ptr[i + 1] {
            pos[col_idx[p]] = usize::MAX;
        }
    }

    let (lower, upper) = m.split_lu()?;
    Ok(IluFactors { lower, upper })
}

/// ILU(0) preconditioner. With a multicolor schedule attached (the matrix
/// must already be permuted accordingly) both substitutions run
/// class-parallel; without one they run sequentially.
#[derive(Debug, Clone)]
pub struct Ilu<T> {
    factors: IluFactors<T>,
    schedule: Option<(ColorClasses, usize)>,
}

impl<T: Float> Ilu<T> {
    pub fn new(a: &CsrMatrix<T>) -> Result<Self, Error> {
        Ok(Self { factors: ilu0(a)?, schedule: None })
    }

    /// Factor a matrix already permuted by `reordering` and attach its
    /// class schedule to the substitutions.
    pub fn colored(a: &CsrMatrix<T>, reordering: &Reordering) -> Result<Self, Error> {
        if reordering.perm.len() != a.nrows() {
            return Err(Error::InvalidInput(format!(
                "reordering covers {} rows, matrix has {}",
                reordering.perm.len(),
                a.nrows()
            )));
        }
        Ok(Self {
            factors: ilu0(a)?,
            schedule: Some((reordering.classes.clone(), reordering.granularity())),
        })
    }

    pub(crate) fn from_parts(
        factors: IluFactors<T>,
        schedule: Option<(ColorClasses, usize)>,
    ) -> Self {
        Self { factors, schedule }
    }

    pub fn factors(&self) -> &IluFactors<T> {
        &self.factors
    }
}

impl<T: Float + Send + Sync> Preconditioner<T> for Ilu<T> {
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), Error> {
        if r.len() != self.factors.lower.nrows() || z.len() != r.len() {
            return Err(Error::InvalidInput(format!(
                "preconditioner dimension {} does not match vector length {}",
                self.factors.lower.nrows(),
                r.len()
            )));
        }
        let mut y = vec![T::zero(); r.len()];
        match &self.schedule {
            Some((classes, granularity)) => {
                sptrsv_lower_colored(&self.factors.lower, classes, *granularity, r, &mut y);
                sptrsv_upper_colored(&self.factors.upper, classes, *granularity, &y, z);
            }
            None => {
                sptrsv_lower(&self.factors.lower, r, &mut y);
                sptrsv_upper(&self.factors.upper, &y, z);
            }
        }
        Ok(())
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
    fn tridiagonal_factorization_is_exact() {
        // no fill positions exist, so ILU(0) equals full LU
        let a = laplace1d(6);
        let pc = Ilu::new(&a).unwrap();
        let b = vec![1.0; 6];
        let mut z = vec![0.0; 6];
        pc.apply(&b, &mut z).unwrap();
        let mut az = vec![0.0; 6];
        a.spmv(&z, &mut az);
        for (v, w) in az.iter().zip(&b) {
            assert_abs_diff_eq!(v, w, epsilon = 1e-12);
        }
    }

    #[test]
    fn known_2x2_factors() {
        // A = [[4, 2], [2, 3]] -> L21 = 0.5, U = [[4, 2], [0, 2]]
        let a = CsrMatrix::from_triplets(2, 2, &[(0, 0, 4.0), (0, 1, 2.0), (1, 0, 2.0), (1, 1, 3.0)])
            .unwrap();
        let f = ilu0(&a).unwrap();
        assert_abs_diff_eq!(f.lower.get(1, 0).unwrap(), 0.5);
        // inverted diagonal stored first
        assert_abs_diff_eq!(f.upper.get(0, 0).unwrap(), 0.25);
        assert_abs_diff_eq!(f.upper.get(1, 1).unwrap(), 0.5);
        assert_abs_diff_eq!(f.upper.get(0, 1).unwrap(), 2.0);
    }

    #[test]
    fn missing_diagonal_is_a_zero_pivot() {
        let a = CsrMatrix::from_triplets(2, 2, &[(0, 0, 1.0), (1, 0, 1.0)]).unwrap();
        assert!(matches!(ilu0(&a), Err(Error::ZeroPivot(1))));
    }

    #[test]
    fn zero_pivot_is_reported() {
        let a = CsrMatrix::from_triplets(2, 2, &[(0, 0, 0.0), (0, 1, 1.0), (1, 1, 1.0)]).unwrap();
        assert!(matches!(ilu0(&a), Err(Error::ZeroPivot(0))));
    }

    #[test]
    fn colored_apply_matches_sequential_apply() {
        use crate::graph::amc;
        let a = laplace1d(12);
        let r = amc(&a).unwrap();
        let p = a.permute(&r.perm).unwrap();

        let seq = Ilu::new(&p).unwrap();
        let col = Ilu::colored(&p, &r).unwrap();
        let rhs: Vec<f64> = (0..12).map(|i| 1.0 + i as f64).collect();
        let mut z0 = vec![0.0; 12];
        let mut z1 = vec![0.0; 12];
        seq.apply(&rhs, &mut z0).unwrap();
        col.apply(&rhs, &mut z1).unwrap();
        for (s, c) in z0.iter().zip(&z1) {
            assert_abs_diff_eq!(s, c, epsilon = 1e-12);
        }
    }
}
