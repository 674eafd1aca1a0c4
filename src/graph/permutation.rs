//! Row/column permutations and the color-class structure they induce.
//!
//! `amc` and `abmc` build the two reorderings the solvers use: rows grouped
//! by color (AMC), or fixed-size row blocks grouped by block color (ABMC).
//! Either way the permuted matrix has contiguous per-color row ranges in
//! which rows (AMC) or blocks (ABMC) are mutually independent, which is what
//! lets the triangular solve engine sweep one class at a time in parallel.

use crate::error::Error;
use crate::graph::coloring::{adjacency, block_graph, greedy_coloring};
use crate::matrix::CsrMatrix;
use num_traits::Float;

/// A bijection between original and reordered indices.
#[derive(Debug, Clone)]
pub struct Permutation {
    forward: Vec<usize>, // new index -> old index
    inverse: Vec<usize>, // old index -> new index
}

impl Permutation {
    /// Build from a `new -> old` map, validating bijectivity.
    pub fn from_forward(forward: Vec<usize>) -> Result<Self, Error> {
        let n = forward.len();
        let mut inverse = vec![usize::MAX; n];
        for (new, &old) in forward.iter().enumerate() {
            if old >= n {
                return Err(Error::InvalidInput(format!("permutation image {old} out of range")));
            }
            if inverse[old] != usize::MAX {
                return Err(Error::InvalidInput(format!("permutation maps {old} twice")));
            }
            inverse[old] = new;
        }
        Ok(Self { forward, inverse })
    }

    pub fn identity(n: usize) -> Self {
        let forward: Vec<usize> = (0..n).collect();
        Self { inverse: forward.clone(), forward }
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn new_to_old(&self, new: usize) -> usize {
        self.forward[new]
    }

    pub fn old_to_new(&self, old: usize) -> usize {
        self.inverse[old]
    }

    /// Gather `x` into the reordered numbering: out[new] = x[old].
    pub fn apply<T: Copy>(&self, x: &[T]) -> Vec<T> {
        debug_assert_eq!(x.len(), self.len());
        self.forward.iter().map(|&old| x[old]).collect()
    }

    /// Scatter back to the original numbering: out[old] = x[new].
    pub fn apply_inverse<T: Copy>(&self, x: &[T]) -> Vec<T> {
        debug_assert_eq!(x.len(), self.len());
        self.inverse.iter().map(|&new| x[new]).collect()
    }
}

/// Ordered partition of the permuted row range into contiguous color
/// classes. Class `c` covers rows `offsets[c]..offsets[c+1]`.
#[derive(Debug, Clone)]
pub struct ColorClasses {
    offsets: Vec<usize>,
}

impl ColorClasses {
    pub fn from_offsets(offsets: Vec<usize>) -> Result<Self, Error> {
        if offsets.is_empty() || offsets[0] != 0 {
            return Err(Error::InvalidInput("class offsets must start at 0".into()));
        }
        if offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::InvalidInput("class offsets must be non-decreasing".into()));
        }
        Ok(Self { offsets })
    }

    pub fn num_colors(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Permuted row range of class `c`.
    pub fn rows(&self, c: usize) -> std::ops::Range<usize> {
        self.offsets[c]..self.offsets[c + 1]
    }

    /// Total number of rows covered.
    pub fn len(&self) -> usize {
        *self.offsets.last().unwrap_or(&0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Uniform blocking aligned with color boundaries.
#[derive(Debug, Clone, Copy)]
pub struct BlockStructure {
    pub block_size: usize,
}

/// A reordering produced by AMC or ABMC: the permutation, the color classes
/// of the permuted matrix, and the block structure (if any). The scheduling
/// granularity is the independent unit inside a class: single rows for AMC,
/// whole blocks for ABMC.
#[derive(Debug, Clone)]
pub struct Reordering {
    pub perm: Permutation,
    pub classes: ColorClasses,
    pub block: Option<BlockStructure>,
}

impl Reordering {
    pub fn granularity(&self) -> usize {
        self.block.map(|b| b.block_size).unwrap_or(1)
    }
}

/// Adjacency multi-coloring: color the dependency graph, then lay rows out
/// grouped by color, original index ascending within a color.
pub fn amc<T: Float>(a: &CsrMatrix<T>) -> Result<Reordering, Error> {
    let adj = adjacency(a)?;
    let (colors, num_colors) = greedy_coloring(&adj);
    let n = a.nrows();
    let mut forward = Vec::with_capacity(n);
    let mut offsets = Vec::with_capacity(num_colors + 1);
    offsets.push(0);
    for c in 0..num_colors {
        for (v, &cv) in colors.iter().enumerate() {
            if cv == c {
                forward.push(v);
            }
        }
        offsets.push(forward.len());
    }
    Ok(Reordering {
        perm: Permutation::from_forward(forward)?,
        classes: ColorClasses::from_offsets(offsets)?,
        block: None,
    })
}

/// Adjacency-based multi-color blocking: group consecutive rows into blocks
/// of `block_size`, color the block graph, and lay whole blocks out grouped
/// by color. Class offsets stay block-aligned, so blocks inside one class
/// never depend on each other. The dimension must be a multiple of
/// `block_size` (pad first if necessary).
pub fn abmc<T: Float>(a: &CsrMatrix<T>, block_size: usize) -> Result<Reordering, Error> {
    let badj = block_graph(a, block_size)?;
    let (colors, num_colors) = greedy_coloring(&badj);
    let nb = badj.len();
    let mut forward = Vec::with_capacity(nb * block_size);
    let mut offsets = Vec::with_capacity(num_colors + 1);
    offsets.push(0);
    for c in 0..num_colors {
        for (b, &cb) in colors.iter().enumerate() {
            if cb == c {
                for k in 0..block_size {
                    forward.push(b * block_size + k);
                }
            }
        }
        offsets.push(forward.len());
    }
    Ok(Reordering {
        perm: Permutation::from_forward(forward)?,
        classes: ColorClasses::from_offsets(offsets)?,
        block: Some(BlockStructure { block_size }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tridiag(n: usize) -> CsrMatrix<f64> {
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
    fn permutation_round_trip() {
        let p = Permutation::from_forward(vec![2, 0, 3, 1]).unwrap();
        let x = vec![10.0, 11.0, 12.0, 13.0];
        let y = p.apply(&x);
        assert_eq!(y, vec![12.0, 10.0, 13.0, 11.0]);
        assert_eq!(p.apply_inverse(&y), x);
    }

    #[test]
    fn rejects_non_bijections() {
        assert!(Permutation::from_forward(vec![0, 0]).is_err());
        assert!(Permutation::from_forward(vec![0, 2]).is_err());
    }

    #[test]
    fn amc_classes_are_independent() {
        let a = tridiag(9);
        let r = amc(&a).unwrap();
        assert_eq!(r.classes.len(), 9);
        let p = a.permute(&r.perm).unwrap();
        // no two rows of one class may be coupled in the permuted matrix
        for c in 0..r.classes.num_colors() {
            let range = r.classes.rows(c);
            for i in range.clone() {
                let (cols, _) = p.row(i);
                for &j in cols {
                    assert!(
                        j == i || !range.contains(&j),
                        "rows {i} and {j} share class {c} but are adjacent"
                    );
                }
            }
        }
    }

    #[test]
    fn abmc_classes_are_block_aligned() {
        let a = tridiag(12);
        let r = abmc(&a, 3).unwrap();
        assert_eq!(r.granularity(), 3);
        for c in 0..r.classes.num_colors() {
            let range = r.classes.rows(c);
            assert_eq!(range.start % 3, 0);
            assert_eq!(range.end % 3, 0);
        }
        // blocks of one class must not couple outside themselves within the class
        let p = a.permute(&r.perm).unwrap();
        for c in 0..r.classes.num_colors() {
            let range = r.classes.rows(c);
            for i in range.clone() {
                let block = (i - range.start) / 3;
                let (cols, _) = p.row(i);
                for &j in cols {
                    if range.contains(&j) {
                        assert_eq!(
                            (j - range.start) / 3,
                            block,
                            "row {i} couples to row {j} in a sibling block of class {c}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn amc_of_diagonal_matrix_is_single_class() {
        let a = CsrMatrix::from_triplets(4, 4, &[(0, 0, 1.0), (1, 1, 2.0), (2, 2, 3.0), (3, 3, 4.0)])
            .unwrap();
        let r = amc(&a).unwrap();
        assert_eq!(r.classes.num_colors(), 1);
        assert_eq!(r.classes.rows(0), 0..4);
    }
}
