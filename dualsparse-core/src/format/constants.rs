//! Format constants shared by records and triplet streams

/// Number of slots per compressed entry: row, column, value
pub const TRIPLET_WIDTH: usize = 3;

/// Tolerance used when checking that probabilities sum to one
pub const PROB_TOLERANCE: f64 = 1e-4;

/// Record envelope names
pub mod class_name {
    /// Envelope name of a plain dual-access matrix record
    pub const DOUBLE_ACCESS_SPARSE_MATRIX: &str = "DoubleAccessSparseMatrix";

    /// Envelope name of a probability matrix record
    pub const PROB_SPARSE_MATRIX: &str = "ProbSparseMatrix";
}

/// Binary triplet frame constants
pub mod frame {
    /// Magic bytes of a triplet frame
    pub const MAGIC: [u8; 4] = *b"DASM";

    /// Current frame format version
    pub const VERSION: u8 = 1;

    /// Fixed size of the frame header
    pub const HEADER_SIZE: usize = 16;

    /// Byte order tag for little-endian payloads
    pub const LITTLE_ENDIAN: u8 = 0;

    /// Byte order tag for big-endian payloads
    pub const BIG_ENDIAN: u8 = 1;
}
