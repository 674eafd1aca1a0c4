//! Sparse matrix storage.

pub mod csr;
pub use csr::CsrMatrix;
