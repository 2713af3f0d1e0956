//! Validation for compressed `(row, col, value)` triplet streams

use crate::format::constants::TRIPLET_WIDTH;
use crate::{MatrixElement, SparseError};

/// Validate that a stream length is a whole number of triplets
///
/// Returns the number of triplets.
pub const fn validate_triplet_len(len: usize) -> Result<usize, SparseError> {
    if len % TRIPLET_WIDTH != 0 {
        return Err(SparseError::TripletLength(len));
    }
    Ok(len / TRIPLET_WIDTH)
}

/// Round a requested chunk size up to a whole number of triplets
pub const fn chunk_len(max_size: usize) -> Result<usize, SparseError> {
    if max_size == 0 {
        return Err(SparseError::InvalidChunkSize);
    }
    Ok(max_size.div_ceil(TRIPLET_WIDTH) * TRIPLET_WIDTH)
}

/// Encode an index into an element slot
pub fn encode_index<T: MatrixElement>(index: usize) -> Result<T, SparseError> {
    T::from_index(index).ok_or(SparseError::UnrepresentableIndex(index))
}

/// Decode the index stored at `position` of a triplet stream
pub fn decode_index<T: MatrixElement>(value: T, position: usize) -> Result<usize, SparseError> {
    value
        .to_index()
        .ok_or(SparseError::InvalidIndexValue { position })
}
