//! Multicolor-reordered, ILU-preconditioned Krylov solvers for sparse
//! linear systems.
//!
//! The crate solves `A x = b` for large sparse `A` with restarted GMRES,
//! BiCGSTAB or truncated GCR, optionally preconditioned by ILU(0) or a
//! blocked ILU on a widened pattern. What sets it apart from a plain Krylov
//! toolkit is the reordering layer: greedy multi-coloring of the adjacency
//! graph (AMC) or of a block graph (ABMC) permutes the matrix so that the
//! otherwise sequential triangular solves inside the preconditioner run
//! class-parallel under Rayon.
//!
//! The pieces compose freely through [`driver::SolverDriver`]:
//!
//! ```
//! use mckrylov::driver::{Method, PcStrategy, ReorderStrategy, SolverDriver};
//! use mckrylov::matrix::CsrMatrix;
//! use mckrylov::utils::Convergence;
//!
//! let a = CsrMatrix::from_triplets(
//!     3,
//!     3,
//!     &[(0, 0, 4.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 4.0), (1, 2, -1.0), (2, 1, -1.0), (2, 2, 4.0)],
//! )
//! .unwrap();
//! let b = vec![1.0, 2.0, 3.0];
//!
//! let driver = SolverDriver::new(
//!     ReorderStrategy::Amc,
//!     PcStrategy::Ilu0,
//!     Method::Gmres { restart: 3 },
//!     Convergence { tol: 1e-10, max_iters: 100 },
//! );
//! let (x, stats) = driver.solve(&a, &b).unwrap();
//! assert!(stats.converged());
//! assert_eq!(x.len(), 3);
//! ```
//!
//! The individual layers are public for callers that want finer control:
//! [`solver`] for the methods behind [`solver::IterativeSolver`],
//! [`preconditioner`] for the factorizations, [`graph`] for coloring and
//! permutations, and [`io`] for Matrix Market input.

pub mod core;
pub mod driver;
pub mod error;
pub mod graph;
pub mod io;
pub mod kernels;
pub mod matrix;
pub mod preconditioner;
pub mod solver;
pub mod utils;

pub use crate::core::MatVec;
pub use crate::driver::{Method, PcStrategy, ReorderStrategy, SolverDriver};
pub use crate::error::Error;
pub use crate::matrix::CsrMatrix;
pub use crate::solver::{BiCgStab, Gcr, Gmres, IterativeSolver};
pub use crate::utils::{Convergence, SolveStats, StopReason};
