//! Sparse triangular substitution, sequential and multicolor-scheduled.
//!
//! Factor layout: L is strictly lower triangular with an implied unit
//! diagonal; U stores its (already inverted) diagonal as the first entry of
//! each row, followed by the strictly upper part. The colored variants sweep
//! the classes of a `ColorClasses` schedule, increasing for the forward
//! solve and decreasing for the backward solve, and inside one class process
//! independent chunks of `granularity` rows concurrently. Completing a class
//! before starting the next is the only synchronization; rows of one chunk
//! are solved in order so intra-block dependencies are respected. The result
//! matches plain sequential substitution up to floating-point summation
//! order.

use crate::graph::ColorClasses;
use crate::matrix::CsrMatrix;
use num_traits::Float;

/// Solve L y = x with unit lower triangular L (strict part stored).
pub fn sptrsv_lower<T: Float>(l: &CsrMatrix<T>, x: &[T], y: &mut [T]) {
    debug_assert_eq!(x.len(), l.nrows());
    debug_assert_eq!(y.len(), l.nrows());
    for i in 0..l.nrows() {
        let (cols, vals) = l.row(i);
        let mut t = x[i];
        for (&j, &v) in cols.iter().zip(vals) {
            t = t - v * y[j];
        }
        y[i] = t;
    }
}

/// Solve U z = x where each row of U starts with its inverted diagonal.
pub fn sptrsv_upper<T: Float>(u: &CsrMatrix<T>, x: &[T], z: &mut [T]) {
    debug_assert_eq!(x.len(), u.nrows());
    debug_assert_eq!(z.len(), u.nrows());
    for i in (0..u.nrows()).rev() {
        let (cols, vals) = u.row(i);
        let mut t = x[i];
        for (&j, &v) in cols.iter().zip(vals).skip(1) {
            t = t - v * z[j];
        }
        z[i] = t * vals[0];
    }
}

/// Forward substitution over a multicolor schedule. Chunks of `granularity`
/// rows inside one class are independent and run in parallel; their L
/// entries may only reference rows of earlier classes or earlier rows of
/// the same chunk.
pub fn sptrsv_lower_colored<T: Float + Send + Sync>(
    l: &CsrMatrix<T>,
    classes: &ColorClasses,
    granularity: usize,
    x: &[T],
    y: &mut [T],
) {
    debug_assert_eq!(classes.len(), l.nrows());
    for c in 0..classes.num_colors() {
        let range = classes.rows(c);
        let start = range.start;
        let (done, rest) = y.split_at_mut(start);
        let current = &mut rest[..range.end - start];
        let done = &*done;
        let solve_chunk = |(ci, chunk): (usize, &mut [T])| {
            let base = start + ci * granularity;
            for k in 0..chunk.len() {
                let (cols, vals) = l.row(base + k);
                let mut t = x[base + k];
                for (&j, &v) in cols.iter().zip(vals) {
                    let yj = if j < start { done[j] } else { chunk[j - base] };
                    t = t - v * yj;
                }
                chunk[k] = t;
            }
        };
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            current.par_chunks_mut(granularity).enumerate().for_each(solve_chunk);
        }
        #[cfg(not(feature = "rayon"))]
        {
            current.chunks_mut(granularity).enumerate().for_each(solve_chunk);
        }
    }
}

/// Backward substitution over a multicolor schedule, classes in decreasing
/// order, rows inside a chunk in reverse.
pub fn sptrsv_upper_colored<T: Float + Send + Sync>(
    u: &CsrMatrix<T>,
    classes: &ColorClasses,
    granularity: usize,
    x: &[T],
    z: &mut [T],
) {
    debug_assert_eq!(classes.len(), u.nrows());
    for c in (0..classes.num_colors()).rev() {
        let range = classes.rows(c);
        let end = range.end;
        let (head, done) = z.split_at_mut(end);
        let current = &mut head[range.start..];
        let start = range.start;
        let done = &*done;
        let solve_chunk = |(ci, chunk): (usize, &mut [T])| {
            let base = start + ci * granularity;
            for k in (0..chunk.len()).rev() {
                let (cols, vals) = u.row(base + k);
                let mut t = x[base + k];
                for (&j, &v) in cols.iter().zip(vals).skip(1) {
                    let zj = if j >= end { done[j - end] } else { chunk[j - base] };
                    t = t - v * zj;
                }
                chunk[k] = t * vals[0];
            }
        };
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            current.par_chunks_mut(granularity).enumerate().for_each(solve_chunk);
        }
        #[cfg(not(feature = "rayon"))]
        {
            current.chunks_mut(granularity).enumerate().for_each(solve_chunk);
        }
    }
}
