//! Construction settings for dual-access sparse matrices

use dualsparse_core::{AccessMode, BoundsCheck, MatrixElement};

/// Configuration used to build a `DoubleAccessSparseMatrix`
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixConfig<T> {
    /// Primary access orientation
    pub mode: AccessMode,
    /// Maintain both row and column indices
    pub double_access: bool,
    /// Sentinel value meaning "absent"
    pub null_elem: T,
    /// Index validation policy
    pub bounds_check: BoundsCheck,
    /// Diagnostic label
    pub name: String,
}

impl<T: MatrixElement> MatrixConfig<T> {
    /// Config for the given orientation, everything else default
    pub fn with_mode(mode: AccessMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Set whether both orientations are maintained
    pub fn with_double_access(mut self, double_access: bool) -> Self {
        self.double_access = double_access;
        self
    }

    /// Set the null element
    pub fn with_null_elem(mut self, null_elem: T) -> Self {
        self.null_elem = null_elem;
        self
    }

    /// Set the bounds validation policy
    pub fn with_bounds_check(mut self, bounds_check: BoundsCheck) -> Self {
        self.bounds_check = bounds_check;
        self
    }

    /// Set the diagnostic name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<T: MatrixElement> Default for MatrixConfig<T> {
    fn default() -> Self {
        Self {
            mode: AccessMode::RowWise,
            double_access: false,
            null_elem: T::zero(),
            bounds_check: BoundsCheck::DebugOnly,
            name: String::new(),
        }
    }
}
