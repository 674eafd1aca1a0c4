//! Dependency-graph analysis of a sparse matrix: adjacency extraction,
//! greedy multi-coloring, blocking, and the AMC / ABMC reorderings that make
//! the preconditioner's triangular solves parallel-friendly.

pub mod coloring;
pub mod permutation;

pub use coloring::{adjacency, block_graph, greedy_coloring};
pub use permutation::{abmc, amc, BlockStructure, ColorClasses, Permutation, Reordering};
