//! Index bounds validation
//!
//! Bounds checking is a per-matrix runtime policy rather than a global
//! compile switch, so checked and unchecked matrices can coexist. The policy
//! covers reads and clears; containers validate writes unconditionally.

use crate::SparseError;

/// When `(row, col)` accesses are validated against the logical dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundsCheck {
    /// Validate every access
    Always,
    /// Never validate
    Never,
    /// Validate only in builds with debug assertions
    #[default]
    DebugOnly,
}

impl BoundsCheck {
    /// Whether checks run in the current build
    pub const fn is_enabled(&self) -> bool {
        match self {
            BoundsCheck::Always => true,
            BoundsCheck::Never => false,
            BoundsCheck::DebugOnly => cfg!(debug_assertions),
        }
    }

    /// Validate `(row, col)` against `height x width` if this policy is enabled
    pub const fn check(
        &self,
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    ) -> Result<(), SparseError> {
        if self.is_enabled() {
            check_index(row, col, height, width)
        } else {
            Ok(())
        }
    }
}

/// Validate `(row, col)` against `height x width` unconditionally
pub const fn check_index(
    row: usize,
    col: usize,
    height: usize,
    width: usize,
) -> Result<(), SparseError> {
    if row >= height || col >= width {
        return Err(SparseError::IndexOutOfBounds {
            row,
            col,
            height,
            width,
        });
    }
    Ok(())
}

/// Validate that two shapes are identical
pub const fn check_same_shape(
    expected: (usize, usize),
    found: (usize, usize),
) -> Result<(), SparseError> {
    if expected.0 != found.0 || expected.1 != found.1 {
        return Err(SparseError::DimensionMismatch { expected, found });
    }
    Ok(())
}
