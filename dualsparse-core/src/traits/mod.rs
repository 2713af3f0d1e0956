//! Abstract interfaces for dual-access sparse matrices

pub mod element;
pub mod matrix;

pub use element::MatrixElement;
#[cfg(feature = "alloc")]
pub use matrix::MatrixOperations;
pub use matrix::SparseMatrix;
