//! Primary access orientation of a dual-access sparse matrix

use core::str::FromStr;

use crate::SparseError;

/// Which side of the matrix is authoritative when double access is off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessMode {
    /// Entries are indexed per row: `rows[i][j]`
    #[default]
    RowWise,
    /// Entries are indexed per column: `cols[j][i]`
    ColumnWise,
}

impl AccessMode {
    /// Token used in textual records
    pub const fn token(&self) -> &'static str {
        match self {
            AccessMode::RowWise => "ROW_WISE",
            AccessMode::ColumnWise => "COLUMN_WISE",
        }
    }

    /// The other orientation
    pub const fn flipped(&self) -> Self {
        match self {
            AccessMode::RowWise => AccessMode::ColumnWise,
            AccessMode::ColumnWise => AccessMode::RowWise,
        }
    }
}

impl core::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for AccessMode {
    type Err = SparseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROW_WISE" => Ok(AccessMode::RowWise),
            "COLUMN_WISE" => Ok(AccessMode::ColumnWise),
            _ => Err(SparseError::InvalidMode),
        }
    }
}
