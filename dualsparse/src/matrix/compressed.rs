//! Compressed triplet export and import
//!
//! Every stored entry becomes three element slots: row index, column index,
//! value. Indices are stored in the element type itself, so it must be able
//! to represent them exactly.
//!
//! Padding is recognized by the receiver's null element, so exporter and
//! importer must share the same null element. Padding from a sender with a
//! different null is decoded as indices and usually fails with
//! `InvalidIndexValue`.

use dualsparse_core::{
    chunk_len, decode_index, encode_index, validate_triplet_len, MatrixElement, Result,
};
use tracing::debug;

use super::DoubleAccessSparseMatrix;

impl<T: MatrixElement> DoubleAccessSparseMatrix<T> {
    /// All stored entries as a flat `(row, col, value)` stream
    ///
    /// Entries follow [`entries`](Self::entries) order.
    pub fn compressed_vec(&self) -> Result<Vec<T>> {
        let mut data = Vec::with_capacity(self.size() * 3);
        for (i, j, value) in self.entries() {
            data.push(encode_index(i)?);
            data.push(encode_index(j)?);
            data.push(value);
        }
        Ok(data)
    }

    /// The compressed stream cut into blocks of uniform length
    ///
    /// The block length is `max_size` rounded up to a multiple of 3. The last
    /// block is padded with `(null, null, null)` triplets so every block has
    /// the same length. An empty matrix yields no blocks.
    pub fn max_sized_compressed_vecs(&self, max_size: usize) -> Result<Vec<Vec<T>>> {
        let block_len = chunk_len(max_size)?;
        let data = self.compressed_vec()?;
        let blocks: Vec<Vec<T>> = data
            .chunks(block_len)
            .map(|block| {
                let mut block = block.to_vec();
                block.resize(block_len, self.null_elem);
                block
            })
            .collect();
        debug!(
            name = %self.name,
            entries = data.len() / 3,
            blocks = blocks.len(),
            block_len,
            "split compressed vector"
        );
        Ok(blocks)
    }

    /// Accumulate a triplet stream into this matrix with `incr`
    ///
    /// Triplets whose value is the null element are padding and are skipped.
    pub fn add_compressed_vec(&mut self, data: &[T]) -> Result<()> {
        validate_triplet_len(data.len())?;
        self.replay(data, Self::incr)
    }

    /// Replace the content of this matrix with a triplet stream
    ///
    /// The matrix is cleared first, then each triplet is written with `set`.
    /// Null-valued triplets are padding and are skipped. Not atomic: if a
    /// triplet fails to decode, the entries before it stay written.
    pub fn set_compressed_vec(&mut self, data: &[T]) -> Result<()> {
        validate_triplet_len(data.len())?;
        self.clear();
        self.replay(data, Self::set)
    }

    fn replay<F>(&mut self, data: &[T], mut write: F) -> Result<()>
    where
        F: FnMut(&mut Self, usize, usize, T) -> Result<()>,
    {
        for (k, triplet) in data.chunks_exact(3).enumerate() {
            let value = triplet[2];
            if value == self.null_elem {
                continue;
            }
            let i = decode_index(triplet[0], 3 * k)?;
            let j = decode_index(triplet[1], 3 * k + 1)?;
            write(self, i, j, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::MatrixConfig;
    use dualsparse_core::{AccessMode, BoundsCheck, SparseError};

    use super::*;

    fn sample(mode: AccessMode) -> DoubleAccessSparseMatrix<f64> {
        let config = MatrixConfig::with_mode(mode).with_bounds_check(BoundsCheck::Always);
        let mut m = DoubleAccessSparseMatrix::with_config(3, 4, &config);
        m.set(0, 2, 1.5).unwrap();
        m.set(1, 0, -2.0).unwrap();
        m.set(2, 1, 0.25).unwrap();
        m.set(2, 3, 8.0).unwrap();
        m
    }

    #[test]
    fn test_order_follows_mode() {
        let rows = sample(AccessMode::RowWise);
        assert_eq!(
            rows.compressed_vec(),
            Ok(vec![0.0, 2.0, 1.5, 1.0, 0.0, -2.0, 2.0, 1.0, 0.25, 2.0, 3.0, 8.0])
        );

        let cols = sample(AccessMode::ColumnWise);
        assert_eq!(
            cols.compressed_vec(),
            Ok(vec![1.0, 0.0, -2.0, 2.0, 1.0, 0.25, 0.0, 2.0, 1.5, 2.0, 3.0, 8.0])
        );
    }

    #[test]
    fn test_round_trip_reproduces_entries() {
        for mode in [AccessMode::RowWise, AccessMode::ColumnWise] {
            let source = sample(mode);
            let mut copy = DoubleAccessSparseMatrix::new(3, 4, AccessMode::RowWise, true, 0.0);
            copy.set(0, 0, 99.0).unwrap();
            copy.set_compressed_vec(&source.compressed_vec().unwrap())
                .unwrap();
            for i in 0..3 {
                for j in 0..4 {
                    assert_eq!(copy.get(i, j), source.get(i, j));
                }
            }
        }
    }

    #[test]
    fn test_add_compressed_vec_accumulates() {
        let source = sample(AccessMode::RowWise);
        let data = source.compressed_vec().unwrap();
        let mut acc = DoubleAccessSparseMatrix::new(3, 4, AccessMode::ColumnWise, false, 0.0);
        acc.add_compressed_vec(&data).unwrap();
        acc.add_compressed_vec(&data).unwrap();
        assert_eq!(acc.get(2, 3), Ok(16.0));
        assert_eq!(acc.get(1, 0), Ok(-4.0));
        assert_eq!(acc.size(), 4);
    }

    #[test]
    fn test_max_sized_blocks_are_padded() {
        let m = sample(AccessMode::RowWise);
        let blocks = m.max_sized_compressed_vecs(7).unwrap();
        // 4 entries = 12 slots, block length rounds 7 up to 9
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.len() == 9));
        assert_eq!(&blocks[1][3..], &[0.0; 6]);

        let mut rebuilt = DoubleAccessSparseMatrix::new(3, 4, AccessMode::RowWise, false, 0.0);
        for block in &blocks {
            rebuilt.add_compressed_vec(block).unwrap();
        }
        assert_eq!(rebuilt.compressed_vec(), m.compressed_vec());

        assert_eq!(
            m.max_sized_compressed_vecs(0),
            Err(SparseError::InvalidChunkSize)
        );
        let empty = DoubleAccessSparseMatrix::new(2, 2, AccessMode::RowWise, false, 0.0f64);
        assert_eq!(empty.max_sized_compressed_vecs(3), Ok(vec![]));
    }

    #[test]
    fn test_padding_does_not_clobber_origin() {
        let mut m = DoubleAccessSparseMatrix::new(2, 2, AccessMode::RowWise, false, 0i32);
        m.set(0, 0, 3).unwrap();
        let block = &m.max_sized_compressed_vecs(6).unwrap()[0];
        assert_eq!(block, &vec![0, 0, 3, 0, 0, 0]);

        let mut copy = DoubleAccessSparseMatrix::new(2, 2, AccessMode::RowWise, false, 0i32);
        copy.set_compressed_vec(block).unwrap();
        assert_eq!(copy.get(0, 0), Ok(3));
    }

    #[test]
    fn test_padding_needs_shared_null() {
        let mut sender = DoubleAccessSparseMatrix::new(2, 2, AccessMode::RowWise, false, -1i32);
        sender.set(1, 1, 7).unwrap();
        let block = &sender.max_sized_compressed_vecs(6).unwrap()[0];
        assert_eq!(block, &vec![1, 1, 7, -1, -1, -1]);

        let mut same = DoubleAccessSparseMatrix::new(2, 2, AccessMode::RowWise, false, -1i32);
        same.set_compressed_vec(block).unwrap();
        assert_eq!(same.size(), 1);

        let mut other = DoubleAccessSparseMatrix::new(2, 2, AccessMode::RowWise, false, 0i32);
        assert_eq!(
            other.set_compressed_vec(block),
            Err(SparseError::InvalidIndexValue { position: 3 })
        );
        assert_eq!(other.get(1, 1), Ok(7));
    }

    #[test]
    fn test_malformed_streams() {
        let mut m = DoubleAccessSparseMatrix::new(2, 2, AccessMode::RowWise, false, 0.0f64);
        assert_eq!(
            m.add_compressed_vec(&[0.0, 1.0]),
            Err(SparseError::TripletLength(2))
        );
        assert_eq!(
            m.set_compressed_vec(&[0.0, 1.0, 2.0, 0.5, 0.0, 1.0]),
            Err(SparseError::InvalidIndexValue { position: 3 })
        );
        // triplets before the bad one were already written
        assert_eq!(m.get(0, 1), Ok(2.0));
    }

    #[test]
    fn test_unrepresentable_index() {
        let mut m = DoubleAccessSparseMatrix::new(1, 1 << 25, AccessMode::RowWise, false, 0.0f32);
        m.set(0, (1 << 25) - 1, 1.0).unwrap();
        assert_eq!(
            m.compressed_vec(),
            Err(SparseError::UnrepresentableIndex((1 << 25) - 1))
        );
    }
}
