//! Format-agnostic matrix access traits
//!
//! These traits let callers read a sparse matrix without knowing which
//! orientation it currently maintains.

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use super::element::MatrixElement;

/// Core sparse matrix trait for format-agnostic access
pub trait SparseMatrix {
    /// The element type stored in this matrix
    type Element: MatrixElement;

    /// Get an element at the specified position
    ///
    /// Returns `None` if the element is null (not stored) or if the
    /// position is out of bounds.
    fn get_element(&self, row: usize, col: usize) -> Option<Self::Element>;

    /// Get matrix dimensions as (rows, cols)
    fn dimensions(&self) -> (usize, usize);

    /// Get number of non-null elements stored
    fn nnz(&self) -> usize;
}

/// Extension trait for row/column operations (requires alloc feature)
#[cfg(feature = "alloc")]
pub trait MatrixOperations: SparseMatrix {
    /// Get all `(col, value)` pairs stored in a row, in column order
    fn get_row(&self, row_index: usize) -> Vec<(usize, Self::Element)>;

    /// Get all `(row, value)` pairs stored in a column, in row order
    fn get_col(&self, col_index: usize) -> Vec<(usize, Self::Element)>;
}
