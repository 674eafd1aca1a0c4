//! Preconditioners.
//!
//! A preconditioner approximates A⁻¹ well enough to cut the Krylov
//! iteration count. The incomplete factorizations here keep the factors in
//! the split layout the substitution kernels consume, and can carry a
//! multicolor schedule so both triangular solves run class-parallel.

pub mod ilu;
pub mod ilub;

pub use ilu::{ilu0, Ilu, IluFactors};
pub use ilub::{ilub, Ilub};

use crate::error::Error;

/// Application of an approximate inverse: z ≈ A⁻¹ r.
pub trait Preconditioner<T> {
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), Error>;
}
