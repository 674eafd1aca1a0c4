//! Owned compressed-sparse-row matrix store.
//!
//! Within every row the column indices are unique and strictly increasing;
//! dimensions are fixed at construction. All structural transforms
//! (`remove_zeros`, `transpose`, `permute`, `block_fill`, ...) allocate and
//! return a new owned matrix instead of mutating index order in place, so a
//! pipeline stage always holds its matrix exclusively.

use crate::core::traits::MatVec;
use crate::error::Error;
use num_traits::Float;

#[derive(Debug, Clone)]
pub struct CsrMatrix<T> {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Float> CsrMatrix<T> {
    /// Build a CSR matrix from raw row-ptr, col-idx and value arrays,
    /// validating the structural invariants.
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, Error> {
        if row_ptr.len() != nrows + 1 {
            return Err(Error::InvalidInput(format!(
                "row_ptr has length {}, expected {}",
                row_ptr.len(),
                nrows + 1
            )));
        }
        if row_ptr[0] != 0 || row_ptr[nrows] != col_idx.len() || col_idx.len() != values.len() {
            return Err(Error::InvalidInput(
                "row_ptr endpoints do not match the entry arrays".into(),
            ));
        }
        for i in 0..nrows {
            if row_ptr[i] > row_ptr[i + 1] {
                return Err(Error::InvalidInput(format!("row_ptr decreases at row {i}")));
            }
            let cols = &col_idx[row_ptr[i]..row_ptr[i + 1]];
            for w in cols.windows(2) {
                if w[0] >= w[1] {
                    return Err(Error::InvalidInput(format!(
                        "column indices in row {i} are not strictly increasing"
                    )));
                }
            }
            if let Some(&last) = cols.last() {
                if last >= ncols {
                    return Err(Error::InvalidInput(format!(
                        "column index {last} out of range in row {i}"
                    )));
                }
            }
        }
        Ok(Self { nrows, ncols, row_ptr, col_idx, values })
    }

    /// Build from unordered (row, col, value) triplets. Duplicate positions
    /// are rejected.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        entries: &[(usize, usize, T)],
    ) -> Result<Self, Error> {
        let mut rows: Vec<Vec<(usize, T)>> = vec![Vec::new(); nrows];
        for &(r, c, v) in entries {
            if r >= nrows || c >= ncols {
                return Err(Error::InvalidInput(format!("entry ({r}, {c}) out of range")));
            }
            rows[r].push((c, v));
        }
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_idx = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len());
        row_ptr.push(0);
        for (i, row) in rows.iter_mut().enumerate() {
            row.sort_unstable_by_key(|&(c, _)| c);
            for w in row.windows(2) {
                if w[0].0 == w[1].0 {
                    return Err(Error::InvalidInput(format!(
                        "duplicate entry at ({i}, {})",
                        w[0].0
                    )));
                }
            }
            for &(c, v) in row.iter() {
                col_idx.push(c);
                values.push(v);
            }
            row_ptr.push(col_idx.len());
        }
        Ok(Self { nrows, ncols, row_ptr, col_idx, values })
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nnz(&self) -> usize {
        self.col_idx.len()
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn col_idx(&self) -> &[usize] {
        &self.col_idx
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Mutable value access. The sparsity pattern stays fixed; only the
    /// numeric entries may change.
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Column indices and values of row `i`.
    pub fn row(&self, i: usize) -> (&[usize], &[T]) {
        let span = self.row_ptr[i]..self.row_ptr[i + 1];
        (&self.col_idx[span.clone()], &self.values[span])
    }

    /// Stored value at (i, j), if present.
    pub fn get(&self, i: usize, j: usize) -> Option<T> {
        let (cols, vals) = self.row(i);
        cols.binary_search(&j).ok().map(|k| vals[k])
    }

    /// True when every row has a stored diagonal entry.
    pub fn has_full_diagonal(&self) -> bool {
        if self.nrows != self.ncols {
            return false;
        }
        (0..self.nrows).all(|i| self.get(i, i).is_some())
    }

    /// Drop explicitly stored zeros. The operator action is unchanged.
    pub fn remove_zeros(&self) -> Self {
        let mut row_ptr = Vec::with_capacity(self.nrows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for i in 0..self.nrows {
            let (cols, vals) = self.row(i);
            for (&c, &v) in cols.iter().zip(vals) {
                if !v.is_zero() {
                    col_idx.push(c);
                    values.push(v);
                }
            }
            row_ptr.push(col_idx.len());
        }
        Self { nrows: self.nrows, ncols: self.ncols, row_ptr, col_idx, values }
    }

    /// Transpose via a counting sort over columns.
    pub fn transpose(&self) -> Self {
        let mut count = vec![0usize; self.ncols];
        for &c in &self.col_idx {
            count[c] += 1;
        }
        let mut row_ptr = vec![0usize; self.ncols + 1];
        for j in 0..self.ncols {
            row_ptr[j + 1] = row_ptr[j] + count[j];
            count[j] = 0;
        }
        let mut col_idx = vec![0usize; self.nnz()];
        let mut values = vec![T::zero(); self.nnz()];
        for i in 0..self.nrows {
            let (cols, vals) = self.row(i);
            for (&c, &v) in cols.iter().zip(vals) {
                let pos = row_ptr[c] + count[c];
                col_idx[pos] = i;
                values[pos] = v;
                count[c] += 1;
            }
        }
        Self { nrows: self.ncols, ncols: self.nrows, row_ptr, col_idx, values }
    }

    /// Expand a symmetric matrix stored as one triangle to full storage by
    /// merging each row with the matching transpose row. Entries present in
    /// both keep the directly stored value. Required before building the
    /// (undirected) dependency graph.
    pub fn expand_symmetric(&self) -> Result<Self, Error> {
        if self.nrows != self.ncols {
            return Err(Error::InvalidInput(
                "symmetric expansion requires a square matrix".into(),
            ));
        }
        let t = self.transpose();
        let mut row_ptr = Vec::with_capacity(self.nrows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for i in 0..self.nrows {
            let (ac, av) = self.row(i);
            let (tc, tv) = t.row(i);
            let (mut p, mut q) = (0, 0);
            while p < ac.len() || q < tc.len() {
                let ca = if p < ac.len() { ac[p] } else { usize::MAX };
                let ct = if q < tc.len() { tc[q] } else { usize::MAX };
                if ca < ct {
                    col_idx.push(ca);
                    values.push(av[p]);
                    p += 1;
                } else if ca == ct {
                    col_idx.push(ca);
                    values.push(av[p]);
                    p += 1;
                    q += 1;
                } else {
                    col_idx.push(ct);
                    values.push(tv[q]);
                    q += 1;
                }
            }
            row_ptr.push(col_idx.len());
        }
        Ok(Self { nrows: self.nrows, ncols: self.ncols, row_ptr, col_idx, values })
    }

    /// Symmetric reordering: B[i, j] = A[perm[i], perm[j]] where `perm`
    /// maps new indices to old ones.
    pub fn permute(&self, perm: &crate::graph::Permutation) -> Result<Self, Error> {
        if self.nrows != self.ncols {
            return Err(Error::InvalidInput("permutation requires a square matrix".into()));
        }
        if perm.len() != self.nrows {
            return Err(Error::InvalidInput(format!(
                "permutation length {} does not match matrix dimension {}",
                perm.len(),
                self.nrows
            )));
        }
        let mut row_ptr = Vec::with_capacity(self.nrows + 1);
        let mut col_idx = Vec::with_capacity(self.nnz());
        let mut values = Vec::with_capacity(self.nnz());
        let mut scratch: Vec<(usize, T)> = Vec::new();
        row_ptr.push(0);
        for i in 0..self.nrows {
            let (cols, vals) = self.row(perm.new_to_old(i));
            scratch.clear();
            scratch.extend(cols.iter().zip(vals).map(|(&c, &v)| (perm.old_to_new(c), v)));
            scratch.sort_unstable_by_key(|&(c, _)| c);
            for &(c, v) in scratch.iter() {
                col_idx.push(c);
                values.push(v);
            }
            row_ptr.push(col_idx.len());
        }
        Ok(Self { nrows: self.nrows, ncols: self.ncols, row_ptr, col_idx, values })
    }

    /// Split into triangular factors after an in-place incomplete
    /// factorization: a strictly lower part L (unit diagonal implied) and an
    /// upper part U whose diagonal is stored inverted as the first entry of
    /// each row, the layout the substitution kernels expect.
    pub fn split_lu(&self) -> Result<(Self, Self), Error> {
        if self.nrows != self.ncols {
            return Err(Error::InvalidInput("LU split requires a square matrix".into()));
        }
        let n = self.nrows;
        let mut l_ptr = Vec::with_capacity(n + 1);
        let mut l_idx = Vec::new();
        let mut l_val = Vec::new();
        let mut u_ptr = Vec::with_capacity(n + 1);
        let mut u_idx = Vec::new();
        let mut u_val = Vec::new();
        l_ptr.push(0);
        u_ptr.push(0);
        for i in 0..n {
            let (cols, vals) = self.row(i);
            let mut diag = None;
            for (&c, &v) in cols.iter().zip(vals) {
                if c < i {
                    l_idx.push(c);
                    l_val.push(v);
                } else if c == i {
                    diag = Some(v);
                }
            }
            let d = diag.ok_or(Error::ZeroPivot(i))?;
            if d.is_zero() {
                return Err(Error::ZeroPivot(i));
            }
            u_idx.push(i);
            u_val.push(d.recip());
            for (&c, &v) in cols.iter().zip(vals) {
                if c > i {
                    u_idx.push(c);
                    u_val.push(v);
                }
            }
            l_ptr.push(l_idx.len());
            u_ptr.push(u_idx.len());
        }
        let lower = Self { nrows: n, ncols: n, row_ptr: l_ptr, col_idx: l_idx, values: l_val };
        let upper = Self { nrows: n, ncols: n, row_ptr: u_ptr, col_idx: u_idx, values: u_val };
        Ok((lower, upper))
    }

    /// Expand the sparsity pattern to full `bsize × bsize` blocks wherever
    /// any entry of a block is present, filling the new positions with
    /// zeros. Diagonal blocks of the result are dense, which is what the
    /// blocked incomplete factorization relies on.
    pub fn block_fill(&self, bsize: usize) -> Result<Self, Error> {
        if self.nrows != self.ncols {
            return Err(Error::InvalidInput("block fill requires a square matrix".into()));
        }
        if bsize == 0 || self.nrows % bsize != 0 {
            return Err(Error::InvalidInput(format!(
                "dimension {} is not a multiple of block size {bsize}",
                self.nrows
            )));
        }
        let nb = self.nrows / bsize;
        let mut row_ptr = Vec::with_capacity(self.nrows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        let mut seen = vec![false; nb];
        let mut bcols: Vec<usize> = Vec::new();
        for br in 0..nb {
            // Union of block columns touched by this block row.
            bcols.clear();
            for i in br * bsize..(br + 1) * bsize {
                let (cols, _) = self.row(i);
                for &c in cols {
                    let bc = c / bsize;
                    if !seen[bc] {
                        seen[bc] = true;
                        bcols.push(bc);
                    }
                }
            }
            // Every diagonal block is kept even if the input row block is empty.
            if !seen[br] {
                seen[br] = true;
                bcols.push(br);
            }
            bcols.sort_unstable();
            for i in br * bsize..(br + 1) * bsize {
                let (cols, vals) = self.row(i);
                let mut p = 0;
                for &bc in bcols.iter() {
                    for j in bc * bsize..(bc + 1) * bsize {
                        let v = if p < cols.len() && cols[p] == j {
                            p += 1;
                            vals[p - 1]
                        } else {
                            T::zero()
                        };
                        col_idx.push(j);
                        values.push(v);
                    }
                }
                row_ptr.push(col_idx.len());
            }
            for &bc in bcols.iter() {
                seen[bc] = false;
            }
        }
        Ok(Self { nrows: self.nrows, ncols: self.ncols, row_ptr, col_idx, values })
    }

    /// Pad with unit-diagonal rows until the dimension is a multiple of
    /// `size`. Padded unknowns decouple from the rest of the system.
    pub fn pad_to_multiple(&self, size: usize) -> Result<Self, Error> {
        if self.nrows != self.ncols {
            return Err(Error::InvalidInput("padding requires a square matrix".into()));
        }
        if size == 0 {
            return Err(Error::InvalidInput("block size must be positive".into()));
        }
        let remain = (size - self.nrows % size) % size;
        if remain == 0 {
            return Ok(self.clone());
        }
        let n = self.nrows + remain;
        let mut row_ptr = self.row_ptr.clone();
        let mut col_idx = self.col_idx.clone();
        let mut values = self.values.clone();
        for k in 0..remain {
            col_idx.push(self.nrows + k);
            values.push(T::one());
            row_ptr.push(col_idx.len());
        }
        Ok(Self { nrows: n, ncols: n, row_ptr, col_idx, values })
    }

    /// Equilibrate by dividing each row and its right-hand side entry by
    /// the row's largest absolute value. Returns the scaled system; the
    /// solution vector is unchanged. A row with no nonzero entry cannot be
    /// scaled.
    pub fn scale_rows(&self, b: &[T]) -> Result<(Self, Vec<T>), Error> {
        if b.len() != self.nrows {
            return Err(Error::InvalidInput(format!(
                "rhs length {} does not match row count {}",
                b.len(),
                self.nrows
            )));
        }
        let mut scaled = self.clone();
        let mut rhs = b.to_vec();
        for i in 0..self.nrows {
            let (_, vals) = self.row(i);
            let max = vals.iter().fold(T::zero(), |m, &v| m.max(v.abs()));
            if max.is_zero() {
                return Err(Error::InvalidInput(format!("row {i} has no nonzero entry")));
            }
            let span = self.row_ptr[i]..self.row_ptr[i + 1];
            for v in &mut scaled.values[span] {
                *v = *v / max;
            }
            rhs[i] = rhs[i] / max;
        }
        Ok((scaled, rhs))
    }

    /// y = A x, parallel over rows under Rayon.
    pub fn spmv(&self, x: &[T], y: &mut [T])
    where
        T: Send + Sync,
    {
        assert_eq!(x.len(), self.ncols, "input vector x has incorrect length");
        assert_eq!(y.len(), self.nrows, "output vector y has incorrect length");
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            y.par_iter_mut().enumerate().for_each(|(i, yi)| {
                let (cols, vals) = self.row(i);
                let mut sum = T::zero();
                for (&c, &v) in cols.iter().zip(vals) {
                    sum = sum + v * x[c];
                }
                *yi = sum;
            });
        }
        #[cfg(not(feature = "rayon"))]
        {
            for (i, yi) in y.iter_mut().enumerate() {
                let (cols, vals) = self.row(i);
                let mut sum = T::zero();
                for (&c, &v) in cols.iter().zip(vals) {
                    sum = sum + v * x[c];
                }
                *yi = sum;
            }
        }
    }
}

impl<T: Float + Send + Sync> MatVec<T> for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
    fn matvec(&self, x: &[T], y: &mut [T]) {
        self.spmv(x, y)
    }
}
