//! Binary triplet frames for fixed-capacity transports
//!
//! A frame is a 16-byte [`FrameHeader`] followed by `3 * triplet_count`
//! elements in host byte order. Frames are produced from
//! [`max_sized_compressed_vecs`](crate::DoubleAccessSparseMatrix::max_sized_compressed_vecs)
//! blocks, so every frame of one stream has the same length.

use std::io::{ErrorKind, Read, Write};

use dualsparse_core::format::constants::TRIPLET_WIDTH;
use dualsparse_core::{
    native_byte_order, validate_triplet_len, FrameHeader, MatrixElement, Result, SparseError,
};
use tracing::debug;

use crate::matrix::DoubleAccessSparseMatrix;

/// Write one block of triplets as a frame
pub fn write_frame<T: MatrixElement, W: Write>(out: &mut W, block: &[T]) -> Result<()> {
    validate_triplet_len(block.len())?;
    let header = FrameHeader::new(T::data_type(), (block.len() / TRIPLET_WIDTH) as u64);
    out.write_all(&header.to_bytes_array())
        .map_err(|_| SparseError::Io("failed to write frame header"))?;
    out.write_all(bytemuck::cast_slice(block))
        .map_err(|_| SparseError::Io("failed to write frame payload"))?;
    Ok(())
}

/// Read one frame, checking that it was written for `T` on a host of the same byte order
pub fn read_frame<T: MatrixElement, R: Read>(input: &mut R) -> Result<Vec<T>> {
    match read_header(input)? {
        Some(header) => read_payload(input, &header),
        None => Err(SparseError::InvalidFrame("header truncated")),
    }
}

/// Header of the next frame, or `None` on a clean end of stream
fn read_header<R: Read>(input: &mut R) -> Result<Option<FrameHeader>> {
    let mut bytes = [0u8; FrameHeader::SIZE];
    let mut filled = 0;
    while filled < bytes.len() {
        match input.read(&mut bytes[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => return Err(SparseError::Io("failed to read frame header")),
        }
    }
    if filled == 0 {
        return Ok(None);
    }
    FrameHeader::from_bytes(&bytes[..filled]).map(Some)
}

fn read_payload<T: MatrixElement, R: Read>(input: &mut R, header: &FrameHeader) -> Result<Vec<T>> {
    if header.byte_order != native_byte_order() {
        return Err(SparseError::InvalidFrame("byte order does not match host"));
    }
    if header.element_type() != Some(T::data_type()) {
        return Err(SparseError::InvalidFrame("element type does not match"));
    }
    let len = usize::try_from(header.triplet_count)
        .ok()
        .and_then(|count| count.checked_mul(TRIPLET_WIDTH))
        .ok_or(SparseError::InvalidFrame("triplet count too large"))?;
    let byte_len = len
        .checked_mul(T::size_bytes())
        .ok_or(SparseError::InvalidFrame("triplet count too large"))?;

    // header counts are untrusted; allocate only for bytes actually received
    let mut bytes = Vec::new();
    input
        .by_ref()
        .take(byte_len as u64)
        .read_to_end(&mut bytes)
        .map_err(|_| SparseError::Io("failed to read frame payload"))?;
    if bytes.len() != byte_len {
        return Err(SparseError::Io("frame payload truncated"));
    }

    let mut data = vec![T::zero(); len];
    bytemuck::cast_slice_mut::<T, u8>(&mut data).copy_from_slice(&bytes);
    Ok(data)
}

/// Write the whole matrix as frames of at most `max_size` elements
///
/// Returns the number of frames written.
pub fn write_chunked<T: MatrixElement, W: Write>(
    matrix: &DoubleAccessSparseMatrix<T>,
    out: &mut W,
    max_size: usize,
) -> Result<usize> {
    let blocks = matrix.max_sized_compressed_vecs(max_size)?;
    for block in &blocks {
        write_frame(out, block)?;
    }
    debug!(name = %matrix.name(), frames = blocks.len(), "wrote triplet frames");
    Ok(blocks.len())
}

/// Accumulate every frame until end of stream into `matrix`
///
/// Each frame is applied with
/// [`add_compressed_vec`](DoubleAccessSparseMatrix::add_compressed_vec), so
/// padding triplets are skipped. Returns the number of frames read.
pub fn read_chunked<T: MatrixElement, R: Read>(
    matrix: &mut DoubleAccessSparseMatrix<T>,
    input: &mut R,
) -> Result<usize> {
    let mut frames = 0;
    while let Some(header) = read_header(input)? {
        let block = read_payload::<T, R>(input, &header)?;
        matrix.add_compressed_vec(&block)?;
        frames += 1;
    }
    debug!(name = %matrix.name(), frames, entries = matrix.size(), "read triplet frames");
    Ok(frames)
}
