//! Level-1 vector kernels consumed by every solver and preconditioner.
//!
//! Reductions (`dot`, `nrm2`) use Rayon when the `rayon` feature is enabled,
//! matching the data-parallel model of the rest of the crate; the streaming
//! updates stay serial since they are memory-bound. Length mismatches are
//! programming errors and are checked with debug assertions only.

use num_traits::Float;

/// y ← x
pub fn copy<T: Float>(x: &[T], y: &mut [T]) {
    debug_assert_eq!(x.len(), y.len());
    y.copy_from_slice(x);
}

/// x ← a·x
pub fn scal<T: Float>(a: T, x: &mut [T]) {
    for xi in x.iter_mut() {
        *xi = *xi * a;
    }
}

/// y ← a·x + y
pub fn axpy<T: Float>(a: T, x: &[T], y: &mut [T]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi = *yi + a * xi;
    }
}

/// y ← a·x + b·y
pub fn axpby<T: Float>(a: T, x: &[T], b: T, y: &mut [T]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi = a * xi + b * *yi;
    }
}

/// z ← a·x + y
pub fn axpyz<T: Float>(a: T, x: &[T], y: &[T], z: &mut [T]) {
    debug_assert_eq!(x.len(), y.len());
    debug_assert_eq!(x.len(), z.len());
    for ((zi, &xi), &yi) in z.iter_mut().zip(x).zip(y) {
        *zi = a * xi + yi;
    }
}

/// Componentwise product, y ← x ∘ y
pub fn had_prod<T: Float>(x: &[T], y: &mut [T]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi = *yi * xi;
    }
}

/// Componentwise division, y ← y ⊘ x
pub fn had_div<T: Float>(x: &[T], y: &mut [T]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi = *yi / xi;
    }
}

/// dot(x, y) = xᵀ y
pub fn dot<T: Float + Send + Sync>(x: &[T], y: &[T]) -> T {
    debug_assert_eq!(x.len(), y.len());
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        x.par_iter()
            .zip(y.par_iter())
            .map(|(&xi, &yi)| xi * yi)
            .reduce(T::zero, |acc, v| acc + v)
    }
    #[cfg(not(feature = "rayon"))]
    {
        x.iter()
            .zip(y.iter())
            .map(|(&xi, &yi)| xi * yi)
            .fold(T::zero(), |acc, v| acc + v)
    }
}

/// ‖x‖₂
pub fn nrm2<T: Float + Send + Sync>(x: &[T]) -> T {
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        x.par_iter()
            .map(|&xi| xi * xi)
            .reduce(T::zero, |acc, v| acc + v)
            .sqrt()
    }
    #[cfg(not(feature = "rayon"))]
    {
        x.iter()
            .map(|&xi| xi * xi)
            .fold(T::zero(), |acc, v| acc + v)
            .sqrt()
    }
}

/// Generate a plane rotation annihilating `b`: returns `(r, c, s)` with
/// `c·a - s·b = r` and `s·a + c·b = 0`.  A zero input pair yields the
/// identity rotation.
pub fn ggen<T: Float>(a: T, b: T) -> (T, T, T) {
    let r = (a * a + b * b).sqrt();
    if r.is_zero() {
        return (r, T::one(), T::zero());
    }
    (r, a / r, -b / r)
}

/// Apply a plane rotation to the pair `(a, b)`.
pub fn grot<T: Float>(c: T, s: T, a: &mut T, b: &mut T) {
    let t = *a;
    *a = c * t - s * *b;
    *b = s * t + c * *b;
}
