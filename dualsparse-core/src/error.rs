//! Error types for dual-access sparse matrix operations

use crate::format::AccessMode;

/// Errors that can occur during sparse matrix operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SparseError {
    /// Access mode token is neither `ROW_WISE` nor `COLUMN_WISE`
    InvalidMode,
    /// The requested orientation is not maintained by the current configuration
    OrientationUnavailable {
        operation: &'static str,
        required: AccessMode,
        mode: AccessMode,
        double_access: bool,
    },
    /// Operands do not have the same shape
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// Index outside `[0, height) x [0, width)`
    IndexOutOfBounds {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },
    /// Triplet stream length is not a multiple of 3
    TripletLength(usize),
    /// A triplet index slot does not hold a non-negative integral value
    InvalidIndexValue { position: usize },
    /// An index cannot be represented exactly by the element type
    UnrepresentableIndex(usize),
    /// Chunk size of zero requested for max-sized compressed vectors
    InvalidChunkSize,
    /// Serialization mode not supported by this container
    UnsupportedFormat(&'static str),
    /// Record text could not be parsed
    MalformedRecord(&'static str),
    /// Leading class name of a record is not the expected one
    ClassNameMismatch { expected: &'static str },
    /// Record is not terminated by `)`
    MissingClosingParen,
    /// A row with zero mass was found where it must be rescaled
    ZeroMassRow(usize),
    /// The matrix has zero total mass
    ZeroMass,
    /// Binary triplet frame is corrupted or incompatible
    InvalidFrame(&'static str),
    /// Underlying reader or writer failed
    Io(&'static str),
}

/// Broad classes of errors, used by callers to decide how to react
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid configuration or misuse of the container
    Configuration,
    /// Index outside the logical dimensions
    Bounds,
    /// Malformed or unsupported serialized data
    Format,
    /// Numerical guard condition such as division by zero mass
    Numerical,
    /// Reader or writer failure
    Io,
}

impl SparseError {
    /// Get the category of this error
    pub const fn category(&self) -> ErrorCategory {
        match self {
            SparseError::InvalidMode
            | SparseError::OrientationUnavailable { .. }
            | SparseError::DimensionMismatch { .. }
            | SparseError::TripletLength(_)
            | SparseError::InvalidChunkSize
            | SparseError::UnsupportedFormat(_) => ErrorCategory::Configuration,
            SparseError::IndexOutOfBounds { .. } => ErrorCategory::Bounds,
            SparseError::InvalidIndexValue { .. }
            | SparseError::UnrepresentableIndex(_)
            | SparseError::MalformedRecord(_)
            | SparseError::ClassNameMismatch { .. }
            | SparseError::MissingClosingParen
            | SparseError::InvalidFrame(_) => ErrorCategory::Format,
            SparseError::ZeroMassRow(_) | SparseError::ZeroMass => ErrorCategory::Numerical,
            SparseError::Io(_) => ErrorCategory::Io,
        }
    }
}

impl core::fmt::Display for SparseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SparseError::InvalidMode => {
                write!(f, "Access mode must be either ROW_WISE or COLUMN_WISE")
            }
            SparseError::OrientationUnavailable {
                operation,
                required,
                mode,
                double_access,
            } => write!(
                f,
                "{operation} requires {required} access, but the matrix is {mode} (double_access={double_access})"
            ),
            SparseError::DimensionMismatch { expected, found } => write!(
                f,
                "Dimension mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            SparseError::IndexOutOfBounds {
                row,
                col,
                height,
                width,
            } => write!(
                f,
                "Index ({row}, {col}) out of bounds for {height}x{width} matrix"
            ),
            SparseError::TripletLength(len) => {
                write!(f, "Compressed vector length {len} is not a multiple of 3")
            }
            SparseError::InvalidIndexValue { position } => write!(
                f,
                "Compressed vector slot {position} does not hold a valid index"
            ),
            SparseError::UnrepresentableIndex(index) => write!(
                f,
                "Index {index} cannot be represented exactly by the element type"
            ),
            SparseError::InvalidChunkSize => write!(f, "Chunk size must be positive"),
            SparseError::UnsupportedFormat(format) => {
                write!(f, "Serialization format {format} is not supported")
            }
            SparseError::MalformedRecord(reason) => write!(f, "Malformed record: {reason}"),
            SparseError::ClassNameMismatch { expected } => {
                write!(f, "Record does not start with class name {expected}")
            }
            SparseError::MissingClosingParen => write!(f, "Record is missing closing ')'"),
            SparseError::ZeroMassRow(row) => {
                write!(f, "Row {row} has zero mass and cannot be rescaled")
            }
            SparseError::ZeroMass => write!(f, "Matrix has zero total mass"),
            SparseError::InvalidFrame(reason) => write!(f, "Invalid triplet frame: {reason}"),
            SparseError::Io(reason) => write!(f, "I/O error: {reason}"),
        }
    }
}

/// Result type for sparse matrix operations
pub type Result<T> = core::result::Result<T, SparseError>;
