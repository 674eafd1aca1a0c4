//! Dense vector kernels and the triangular solve engine.

pub mod blas1;
pub mod sptrsv;
