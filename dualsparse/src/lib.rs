//! Dualsparse - Dual-Access Sparse Matrix Containers
//!
//! This library provides sparse matrices that can be indexed by row, by
//! column, or both at once, plus a probability specialization with
//! normalization and iterative proportional fitting.
//!
//! ## Architecture
//!
//! Dualsparse follows a clean definition/implementation separation:
//!
//! - **dualsparse-core**: Errors, element traits, access modes, and pure validation (no I/O)
//! - **dualsparse**: Containers, records, triplet frames, and shared handles
//!
//! ## Quick Start
//!
//! ```rust
//! use dualsparse::{AccessMode, DoubleAccessSparseMatrix, ProbSparseMatrix};
//!
//! fn example() -> dualsparse::Result<()> {
//!     // Counts indexed both ways
//!     let mut counts = DoubleAccessSparseMatrix::new(3, 3, AccessMode::RowWise, true, 0u32);
//!     counts.incr(0, 2, 1)?;
//!     counts.incr(0, 2, 1)?;
//!     assert_eq!(counts.col(2)?.get(&0), Some(&2));
//!
//!     // Conditional probabilities P(col | row)
//!     let mut p = ProbSparseMatrix::new(2, 2, AccessMode::RowWise, false);
//!     p.set(0, 0, 3.0, true)?;
//!     p.set(0, 1, 1.0, true)?;
//!     p.normalize_cond()?;
//!     assert!(p.check_cond_prob_integrity());
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! ## Features
//!
//! - **Dual indexing**: Rows and columns kept consistent on every write
//! - **Null sentinel**: Writing the null element removes the entry
//! - **Triplet streams**: Flat `(row, col, value)` export in uniform blocks
//! - **Records**: Textual round-trip, and JSON with the `serde` feature
//! - **Probabilities**: Conditional/joint normalization and IPF steps

pub use dualsparse_core::{
    // Core traits
    MatrixElement, MatrixOperations, SparseMatrix,
    // Access and format definitions
    AccessMode, DataType, FrameHeader,
    // Error handling
    ErrorCategory, Result, SparseError,
    // Validation policy
    BoundsCheck,
};

pub mod config;
pub mod matrix;
pub mod prob;
pub mod shared;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::MatrixConfig;
pub use matrix::{DoubleAccessSparseMatrix, LineMut, RecordFormat, SparseLine};
pub use prob::ProbSparseMatrix;
pub use shared::{SharedMatrix, SharedProbMatrix, SyncMatrix, SyncProbMatrix};
pub use transport::{read_chunked, read_frame, write_chunked, write_frame};
