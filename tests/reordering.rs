//! Structure-level tests for coloring, permutation and the scheduled
//! triangular solves on randomly generated sparse matrices.

use approx::assert_abs_diff_eq;
use mckrylov::graph::{abmc, adjacency, amc, greedy_coloring};
use mckrylov::kernels::sptrsv::{
    sptrsv_lower, sptrsv_lower_colored, sptrsv_upper, sptrsv_upper_colored,
};
use mckrylov::preconditioner::ilu0;
use mckrylov::CsrMatrix;
use rand::Rng;

/// Random sparse strictly diagonally dominant matrix with a symmetric
/// pattern (values need not be symmetric).
fn random_sparse(n: usize, density: f64, rng: &mut impl Rng) -> CsrMatrix<f64> {
    let mut entries = Vec::new();
    let mut row_sums = vec![0.0f64; n];
    for i in 0..n {
        for j in 0..i {
            if rng.r#gen::<f64>() < density {
                let v: f64 = rng.r#gen::<f64>() - 0.5;
                let w: f64 = rng.r#gen::<f64>() - 0.5;
                entries.push((i, j, v));
                entries.push((j, i, w));
                row_sums[i] += v.abs();
                row_sums[j] += w.abs();
            }
        }
    }
    for i in 0..n {
        entries.push((i, i, row_sums[i] + 1.0));
    }
    CsrMatrix::from_triplets(n, n, &entries).unwrap()
}

/// A valid coloring gives adjacent vertices distinct colors, and every
/// vertex a color below the reported count.
#[test]
fn greedy_coloring_is_valid_on_random_graphs() {
    let mut rng = rand::thread_rng();
    for &n in &[10, 40, 80] {
        let a = random_sparse(n, 0.1, &mut rng);
        let adj = adjacency(&a).unwrap();
        let (colors, num_colors) = greedy_coloring(&adj);
        assert!(colors.iter().all(|&c| c < num_colors));
        for (i, list) in adj.iter().enumerate() {
            for &j in list {
                assert_ne!(colors[i], colors[j], "adjacent rows {i}, {j} share a color");
            }
        }
    }
}

/// AMC permutation round-trips vectors and covers every row exactly once.
#[test]
fn amc_permutation_round_trips() {
    let mut rng = rand::thread_rng();
    let n = 50;
    let a = random_sparse(n, 0.08, &mut rng);
    let r = amc(&a).unwrap();
    assert_eq!(r.perm.len(), n);
    assert_eq!(r.classes.len(), n);

    let x: Vec<f64> = (0..n).map(|_| rng.r#gen()).collect();
    let y = r.perm.apply(&x);
    let back = r.perm.apply_inverse(&y);
    for (xi, bi) in x.iter().zip(&back) {
        assert_abs_diff_eq!(xi, bi);
    }
}

/// The class-scheduled triangular solves must agree with the sequential
/// sweeps on the same factors to 1e-10.
#[test]
fn colored_triangular_solves_match_sequential() {
    let mut rng = rand::thread_rng();
    let n = 60;
    let a = random_sparse(n, 0.08, &mut rng);
    let r = amc(&a).unwrap();
    let p = a.permute(&r.perm).unwrap();
    let f = ilu0(&p).unwrap();
    let b: Vec<f64> = (0..n).map(|_| rng.r#gen::<f64>() - 0.5).collect();

    let mut y_seq = vec![0.0; n];
    let mut z_seq = vec![0.0; n];
    sptrsv_lower(&f.lower, &b, &mut y_seq);
    sptrsv_upper(&f.upper, &y_seq, &mut z_seq);

    let mut y_col = vec![0.0; n];
    let mut z_col = vec![0.0; n];
    sptrsv_lower_colored(&f.lower, &r.classes, r.granularity(), &b, &mut y_col);
    sptrsv_upper_colored(&f.upper, &r.classes, r.granularity(), &y_col, &mut z_col);

    for (s, c) in z_seq.iter().zip(&z_col) {
        assert_abs_diff_eq!(s, c, epsilon = 1e-10);
    }
}

/// Same equivalence for the block schedule with block-granularity chunks.
#[test]
fn block_colored_triangular_solves_match_sequential() {
    let mut rng = rand::thread_rng();
    let n = 64;
    let bs = 4;
    let a = random_sparse(n, 0.05, &mut rng);
    let r = abmc(&a, bs).unwrap();
    let p = a.permute(&r.perm).unwrap();
    let filled = p.block_fill(bs).unwrap();
    let f = ilu0(&filled).unwrap();
    let b: Vec<f64> = (0..n).map(|_| rng.r#gen::<f64>() - 0.5).collect();

    let mut y_seq = vec![0.0; n];
    let mut z_seq = vec![0.0; n];
    sptrsv_lower(&f.lower, &b, &mut y_seq);
    sptrsv_upper(&f.upper, &y_seq, &mut z_seq);

    let mut y_col = vec![0.0; n];
    let mut z_col = vec![0.0; n];
    sptrsv_lower_colored(&f.lower, &r.classes, bs, &b, &mut y_col);
    sptrsv_upper_colored(&f.upper, &r.classes, bs, &y_col, &mut z_col);

    for (s, c) in z_seq.iter().zip(&z_col) {
        assert_abs_diff_eq!(s, c, epsilon = 1e-10);
    }
}
