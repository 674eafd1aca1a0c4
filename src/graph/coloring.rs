//! Adjacency extraction and greedy graph coloring (Saad §12.4).

use crate::error::Error;
use crate::matrix::CsrMatrix;
use num_traits::Float;

/// Symmetrized adjacency of the nonzero pattern, excluding the diagonal:
/// adj[i] = { j ≠ i | A[i,j] ≠ 0 or A[j,i] ≠ 0 }, each list sorted.
/// Fails with `InvalidInput` when the matrix is not square.
pub fn adjacency<T: Float>(a: &CsrMatrix<T>) -> Result<Vec<Vec<usize>>, Error> {
    if a.nrows() != a.ncols() {
        return Err(Error::InvalidInput(format!(
            "adjacency graph requires a square matrix, got {}x{}",
            a.nrows(),
            a.ncols()
        )));
    }
    let n = a.nrows();
    let mut adj = vec![Vec::new(); n];
    for i in 0..n {
        let (cols, _) = a.row(i);
        for &j in cols {
            if j != i {
                adj[i].push(j);
                adj[j].push(i);
            }
        }
    }
    for list in adj.iter_mut() {
        list.sort_unstable();
        list.dedup();
    }
    Ok(adj)
}

/// Adjacency of the block-level pattern: consecutive groups of `bsize` rows
/// form the vertices, and two blocks are adjacent when any entry couples
/// them. The dimension must be a multiple of `bsize`.
pub fn block_graph<T: Float>(a: &CsrMatrix<T>, bsize: usize) -> Result<Vec<Vec<usize>>, Error> {
    if a.nrows() != a.ncols() {
        return Err(Error::InvalidInput("block graph requires a square matrix".into()));
    }
    if bsize == 0 || a.nrows() % bsize != 0 {
        return Err(Error::InvalidInput(format!(
            "dimension {} is not a multiple of block size {bsize}",
            a.nrows()
        )));
    }
    let nb = a.nrows() / bsize;
    let mut adj = vec![Vec::new(); nb];
    for br in 0..nb {
        for i in br * bsize..(br + 1) * bsize {
            let (cols, _) = a.row(i);
            for &c in cols {
                let bc = c / bsize;
                if bc != br {
                    adj[br].push(bc);
                    adj[bc].push(br);
                }
            }
        }
    }
    for list in adj.iter_mut() {
        list.sort_unstable();
        list.dedup();
    }
    Ok(adj)
}

/// Greedy sequential coloring in ascending vertex order: each vertex takes
/// the smallest color not used by an already-colored neighbor. The fixed
/// visiting order makes the result deterministic; the color count is a
/// heuristic upper bound, not a minimum. Returns `(colors, num_colors)`.
/// An edgeless graph degenerates to a single color.
pub fn greedy_coloring(adj: &[Vec<usize>]) -> (Vec<usize>, usize) {
    let n = adj.len();
    let mut colors = vec![usize::MAX; n];
    // banned.len() is the number of colors handed out so far
    let mut banned: Vec<bool> = Vec::new();
    for i in 0..n {
        for b in banned.iter_mut() {
            *b = false;
        }
        for &j in &adj[i] {
            if colors[j] != usize::MAX {
                banned[colors[j]] = true;
            }
        }
        let c = (0..banned.len()).find(|&c| !banned[c]).unwrap_or(banned.len());
        colors[i] = c;
        if c == banned.len() {
            banned.push(false);
        }
    }
    let num_colors = banned.len();
    (colors, num_colors)
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
    fn tridiagonal_needs_two_colors() {
        let a = tridiag(7);
        let adj = adjacency(&a).unwrap();
        let (colors, nc) = greedy_coloring(&adj);
        assert_eq!(nc, 2);
        for (i, list) in adj.iter().enumerate() {
            for &j in list {
                assert_ne!(colors[i], colors[j], "rows {i} and {j} are adjacent");
            }
        }
    }

    #[test]
    fn diagonal_matrix_gets_one_color() {
        let a = CsrMatrix::from_triplets(4, 4, &[(0, 0, 1.0), (1, 1, 1.0), (2, 2, 1.0), (3, 3, 1.0)])
            .unwrap();
        let adj = adjacency(&a).unwrap();
        let (colors, nc) = greedy_coloring(&adj);
        assert_eq!(nc, 1);
        assert!(colors.iter().all(|&c| c == 0));
    }

    #[test]
    fn unsymmetric_pattern_is_symmetrized() {
        // entry (0, 2) only; the graph still links 2 back to 0
        let a = CsrMatrix::from_triplets(
            3,
            3,
            &[(0, 0, 1.0), (1, 1, 1.0), (2, 2, 1.0), (0, 2, 5.0)],
        )
        .unwrap();
        let adj = adjacency(&a).unwrap();
        assert_eq!(adj[0], vec![2]);
        assert_eq!(adj[2], vec![0]);
    }

    #[test]
    fn non_square_is_rejected() {
        let a = CsrMatrix::from_csr(1, 2, vec![0, 1], vec![1], vec![1.0]).unwrap();
        assert!(adjacency(&a).is_err());
    }

    #[test]
    fn block_graph_of_tridiagonal() {
        let a = tridiag(8);
        let adj = block_graph(&a, 2).unwrap();
        // chain of 4 blocks
        assert_eq!(adj[0], vec![1]);
        assert_eq!(adj[1], vec![0, 2]);
        assert_eq!(adj[3], vec![2]);
    }
}
