//! Sparse matrix with row access, column access, or both at once
//!
//! `DoubleAccessSparseMatrix` stores only non-null entries, in one ordered map
//! per row and/or one per column. With double access enabled both sides are
//! kept mutually consistent on every write that goes through `set`.
//!
//! The container is single-threaded: callers that share an instance across
//! threads must hold a lock across any multi-step sequence (see
//! [`crate::shared`]).

use std::collections::BTreeMap;

use dualsparse_core::{
    check_index, AccessMode, BoundsCheck, MatrixElement, MatrixOperations, Result, SparseError,
    SparseMatrix,
};
use tracing::{debug, warn};

use crate::config::MatrixConfig;

pub mod compressed;
pub mod record;

pub use record::RecordFormat;

/// One row (column index -> value) or one column (row index -> value)
pub type SparseLine<T> = BTreeMap<usize, T>;

/// Sparse matrix indexed by row, by column, or by both
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoubleAccessSparseMatrix<T> {
    pub(crate) rows: Vec<SparseLine<T>>,
    pub(crate) cols: Vec<SparseLine<T>>,
    pub(crate) name: String,
    pub(crate) mode: AccessMode,
    pub(crate) double_access: bool,
    pub(crate) height: usize,
    pub(crate) width: usize,
    pub(crate) null_elem: T,
    pub(crate) bounds_check: BoundsCheck,
}

impl<T: MatrixElement> DoubleAccessSparseMatrix<T> {
    /// Create an empty `height x width` matrix
    pub fn new(
        height: usize,
        width: usize,
        mode: AccessMode,
        double_access: bool,
        null_elem: T,
    ) -> Self {
        let config = MatrixConfig::with_mode(mode)
            .with_double_access(double_access)
            .with_null_elem(null_elem);
        Self::with_config(height, width, &config)
    }

    /// Create an empty `height x width` matrix from a configuration
    pub fn with_config(height: usize, width: usize, config: &MatrixConfig<T>) -> Self {
        let mut matrix = Self {
            rows: Vec::new(),
            cols: Vec::new(),
            name: config.name.clone(),
            mode: config.mode,
            double_access: config.double_access,
            height,
            width,
            null_elem: config.null_elem,
            bounds_check: config.bounds_check,
        };
        matrix.allocate();
        matrix
    }

    fn allocate(&mut self) {
        self.rows = if self.has_rows() {
            vec![SparseLine::new(); self.height]
        } else {
            Vec::new()
        };
        self.cols = if self.has_cols() {
            vec![SparseLine::new(); self.width]
        } else {
            Vec::new()
        };
    }

    /// Whether per-row maps are maintained
    pub fn has_rows(&self) -> bool {
        self.mode == AccessMode::RowWise || self.double_access
    }

    /// Whether per-column maps are maintained
    pub fn has_cols(&self) -> bool {
        self.mode == AccessMode::ColumnWise || self.double_access
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn is_double_accessible(&self) -> bool {
        self.double_access
    }

    pub fn null_elem(&self) -> T {
        self.null_elem
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn bounds_check(&self) -> BoundsCheck {
        self.bounds_check
    }

    pub fn set_bounds_check(&mut self, bounds_check: BoundsCheck) {
        self.bounds_check = bounds_check;
    }

    fn check(&self, i: usize, j: usize) -> Result<()> {
        self.bounds_check.check(i, j, self.height, self.width)
    }

    fn unavailable(&self, operation: &'static str, required: AccessMode) -> SparseError {
        SparseError::OrientationUnavailable {
            operation,
            required,
            mode: self.mode,
            double_access: self.double_access,
        }
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> SparseError {
        SparseError::IndexOutOfBounds {
            row,
            col,
            height: self.height,
            width: self.width,
        }
    }

    /// Change the dimensions; all entries are dropped
    pub fn resize(&mut self, height: usize, width: usize) {
        self.height = height;
        self.width = width;
        self.allocate();
    }

    /// Remove every entry, keeping the dimensions
    pub fn clear(&mut self) {
        self.rows.iter_mut().for_each(SparseLine::clear);
        self.cols.iter_mut().for_each(SparseLine::clear);
    }

    fn lookup(&self, i: usize, j: usize) -> Option<T> {
        match self.mode {
            AccessMode::RowWise => self.rows.get(i).and_then(|row| row.get(&j)).copied(),
            AccessMode::ColumnWise => self.cols.get(j).and_then(|col| col.get(&i)).copied(),
        }
    }

    /// Value at `(i, j)`, or the null element if nothing is stored
    pub fn get(&self, i: usize, j: usize) -> Result<T> {
        self.check(i, j)?;
        Ok(self.lookup(i, j).unwrap_or(self.null_elem))
    }

    /// Whether a non-null value is stored at `(i, j)`
    pub fn exists(&self, i: usize, j: usize) -> Result<bool> {
        self.check(i, j)?;
        Ok(self.lookup(i, j).is_some())
    }

    /// Store `value` at `(i, j)` in every maintained structure
    ///
    /// Writing the null element removes the entry instead.
    ///
    /// Writes are validated whatever the bounds policy: an entry outside the
    /// matrix could not be re-indexed by `set_mode` or `set_double_accessible`.
    pub fn set(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        check_index(i, j, self.height, self.width)?;
        if value == self.null_elem {
            return self.clear_elem(i, j);
        }
        if self.has_rows() {
            self.rows[i].insert(j, value);
        }
        if self.has_cols() {
            self.cols[j].insert(i, value);
        }
        Ok(())
    }

    /// Add `delta` to the value at `(i, j)`
    ///
    /// Adding the null element is a no-op. If the sum equals the null
    /// element the entry is removed, as with `set`.
    pub fn incr(&mut self, i: usize, j: usize, delta: T) -> Result<()> {
        if delta == self.null_elem {
            return Ok(());
        }
        let current = self.get(i, j)?;
        self.set(i, j, current + delta)
    }

    /// Remove the entry at `(i, j)` from every maintained structure
    ///
    /// Unchecked positions outside the matrix hold nothing, so clearing
    /// them is a no-op.
    pub fn clear_elem(&mut self, i: usize, j: usize) -> Result<()> {
        self.check(i, j)?;
        if let Some(row) = self.rows.get_mut(i) {
            row.remove(&j);
        }
        if let Some(col) = self.cols.get_mut(j) {
            col.remove(&i);
        }
        Ok(())
    }

    /// Remove every entry of row `i`
    ///
    /// Only the authoritative side is cleared unless `force_synchro` is set.
    /// Under double access the cheap path leaves the column maps out of sync
    /// and logs a warning; the forced path walks every column, costing
    /// O(width).
    pub fn clear_row(&mut self, i: usize, force_synchro: bool) -> Result<()> {
        if i >= self.height {
            if self.bounds_check.is_enabled() {
                return Err(self.out_of_bounds(i, 0));
            }
            return Ok(());
        }
        match self.mode {
            AccessMode::RowWise => {
                if self.double_access {
                    if force_synchro {
                        for col in &mut self.cols {
                            col.remove(&i);
                        }
                    } else {
                        warn!(
                            name = %self.name,
                            row = i,
                            "cleared row without synchronizing columns; matrix is no longer consistent"
                        );
                    }
                }
                self.rows[i].clear();
            }
            AccessMode::ColumnWise => {
                for col in &mut self.cols {
                    col.remove(&i);
                }
                if self.double_access {
                    if force_synchro {
                        self.rows[i].clear();
                    } else {
                        warn!(
                            name = %self.name,
                            row = i,
                            "cleared row without synchronizing rows; matrix is no longer consistent"
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Remove every entry of column `j`
    ///
    /// Mirror of [`clear_row`](Self::clear_row).
    pub fn clear_col(&mut self, j: usize, force_synchro: bool) -> Result<()> {
        if j >= self.width {
            if self.bounds_check.is_enabled() {
                return Err(self.out_of_bounds(0, j));
            }
            return Ok(());
        }
        match self.mode {
            AccessMode::ColumnWise => {
                if self.double_access {
                    if force_synchro {
                        for row in &mut self.rows {
                            row.remove(&j);
                        }
                    } else {
                        warn!(
                            name = %self.name,
                            col = j,
                            "cleared column without synchronizing rows; matrix is no longer consistent"
                        );
                    }
                }
                self.cols[j].clear();
            }
            AccessMode::RowWise => {
                for row in &mut self.rows {
                    row.remove(&j);
                }
                if self.double_access {
                    if force_synchro {
                        self.cols[j].clear();
                    } else {
                        warn!(
                            name = %self.name,
                            col = j,
                            "cleared column without synchronizing columns; matrix is no longer consistent"
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Read-only view of row `i`
    pub fn row(&self, i: usize) -> Result<&SparseLine<T>> {
        if !self.has_rows() {
            return Err(self.unavailable("row", AccessMode::RowWise));
        }
        self.rows.get(i).ok_or(self.out_of_bounds(i, 0))
    }

    /// Read-only view of column `j`
    pub fn col(&self, j: usize) -> Result<&SparseLine<T>> {
        if !self.has_cols() {
            return Err(self.unavailable("col", AccessMode::ColumnWise));
        }
        self.cols.get(j).ok_or(self.out_of_bounds(0, j))
    }

    /// Mutable view of row `i` whose writes go through [`set`](Self::set)
    pub fn row_mut(&mut self, i: usize) -> Result<LineMut<'_, T>> {
        self.row(i)?;
        Ok(LineMut {
            matrix: self,
            orientation: AccessMode::RowWise,
            index: i,
        })
    }

    /// Mutable view of column `j` whose writes go through [`set`](Self::set)
    pub fn col_mut(&mut self, j: usize) -> Result<LineMut<'_, T>> {
        self.col(j)?;
        Ok(LineMut {
            matrix: self,
            orientation: AccessMode::ColumnWise,
            index: j,
        })
    }

    /// Drop null values; returns the line and its largest position
    fn strip_line(&self, mut line: SparseLine<T>) -> (SparseLine<T>, Option<usize>) {
        let null_elem = self.null_elem;
        line.retain(|_, value| *value != null_elem);
        let last = line.last_key_value().map(|(&k, _)| k);
        (line, last)
    }

    /// Append a new row, growing the height by one
    ///
    /// Only allowed on a row-wise matrix without double access; the column
    /// side is never touched. Null values in `line` are dropped.
    pub fn add_row(&mut self, line: SparseLine<T>) -> Result<()> {
        if self.mode != AccessMode::RowWise || self.double_access {
            return Err(self.unavailable("add_row", AccessMode::RowWise));
        }
        let (line, last) = self.strip_line(line);
        if let Some(j) = last {
            check_index(self.height, j, self.height + 1, self.width)?;
        }
        self.rows.push(line);
        self.height += 1;
        Ok(())
    }

    /// Append a new column, growing the width by one
    ///
    /// Only allowed on a column-wise matrix without double access.
    pub fn add_col(&mut self, line: SparseLine<T>) -> Result<()> {
        if self.mode != AccessMode::ColumnWise || self.double_access {
            return Err(self.unavailable("add_col", AccessMode::ColumnWise));
        }
        let (line, last) = self.strip_line(line);
        if let Some(i) = last {
            check_index(i, self.width, self.height, self.width + 1)?;
        }
        self.cols.push(line);
        self.width += 1;
        Ok(())
    }

    fn authoritative(&self) -> &[SparseLine<T>] {
        match self.mode {
            AccessMode::RowWise => &self.rows,
            AccessMode::ColumnWise => &self.cols,
        }
    }

    /// Number of stored entries, counted on the authoritative side only
    pub fn size(&self) -> usize {
        self.authoritative().iter().map(SparseLine::len).sum()
    }

    /// Sum of the entries of row `i`
    pub fn sum_row(&self, i: usize) -> Result<T> {
        Ok(sum_line(self.row(i)?))
    }

    /// Sum of the entries of column `j`
    pub fn sum_col(&self, j: usize) -> Result<T> {
        Ok(sum_line(self.col(j)?))
    }

    /// Sum of every stored entry
    pub fn sum_of_elements(&self) -> T {
        self.authoritative()
            .iter()
            .fold(T::zero(), |acc, line| acc + sum_line(line))
    }

    /// All stored `(row, col, value)` entries in authoritative order
    ///
    /// Row-major for a row-wise matrix, column-major for a column-wise one.
    pub fn entries(&self) -> Box<dyn Iterator<Item = (usize, usize, T)> + '_> {
        match self.mode {
            AccessMode::RowWise => Box::new(self.rows.iter().enumerate().flat_map(|(i, row)| {
                row.iter().map(move |(&j, &value)| (i, j, value))
            })),
            AccessMode::ColumnWise => {
                Box::new(self.cols.iter().enumerate().flat_map(|(j, col)| {
                    col.iter().map(move |(&i, &value)| (i, j, value))
                }))
            }
        }
    }

    /// Turn maintenance of the second orientation on or off
    ///
    /// Turning it on rebuilds the missing side from the authoritative one;
    /// turning it off drops the side that does not match the mode.
    pub fn set_double_accessible(&mut self, double_access: bool) {
        if double_access == self.double_access {
            return;
        }
        if double_access {
            match self.mode {
                AccessMode::RowWise => self.cols = transpose_lines(&self.rows, self.width),
                AccessMode::ColumnWise => self.rows = transpose_lines(&self.cols, self.height),
            }
        } else {
            match self.mode {
                AccessMode::RowWise => self.cols = Vec::new(),
                AccessMode::ColumnWise => self.rows = Vec::new(),
            }
        }
        self.double_access = double_access;
        debug!(
            name = %self.name,
            double_access,
            entries = self.size(),
            "changed double access"
        );
    }

    /// Switch the authoritative orientation
    ///
    /// Without double access the data is moved to the new side. With double
    /// access both sides already exist, so only the authoritative side
    /// changes.
    pub fn set_mode(&mut self, mode: AccessMode) {
        if mode == self.mode {
            return;
        }
        if !self.double_access {
            match mode {
                AccessMode::ColumnWise => {
                    self.cols = transpose_lines(&self.rows, self.width);
                    self.rows = Vec::new();
                }
                AccessMode::RowWise => {
                    self.rows = transpose_lines(&self.cols, self.height);
                    self.cols = Vec::new();
                }
            }
        }
        self.mode = mode;
        debug!(name = %self.name, mode = %mode, entries = self.size(), "changed access mode");
    }

    /// Check the structural invariants, used after deserializing
    pub(crate) fn validate_structure(&self) -> Result<()> {
        let expected_rows = if self.has_rows() { self.height } else { 0 };
        let expected_cols = if self.has_cols() { self.width } else { 0 };
        if self.rows.len() != expected_rows || self.cols.len() != expected_cols {
            return Err(SparseError::MalformedRecord(
                "row/column structures do not match dimensions and mode",
            ));
        }
        for (i, row) in self.rows.iter().enumerate() {
            for (&j, value) in row {
                check_index(i, j, self.height, self.width)?;
                if *value == self.null_elem {
                    return Err(SparseError::MalformedRecord("null element stored"));
                }
            }
        }
        for (j, col) in self.cols.iter().enumerate() {
            for (&i, value) in col {
                check_index(i, j, self.height, self.width)?;
                if *value == self.null_elem {
                    return Err(SparseError::MalformedRecord("null element stored"));
                }
            }
        }
        if self.double_access && transpose_lines(&self.rows, self.width) != self.cols {
            return Err(SparseError::MalformedRecord(
                "row and column structures are not consistent",
            ));
        }
        Ok(())
    }
}

fn sum_line<T: MatrixElement>(line: &SparseLine<T>) -> T {
    line.values().fold(T::zero(), |acc, &value| acc + value)
}

/// Re-index `lines` by their inner key
fn transpose_lines<T: MatrixElement>(lines: &[SparseLine<T>], len: usize) -> Vec<SparseLine<T>> {
    let mut transposed = vec![SparseLine::new(); len];
    for (outer, line) in lines.iter().enumerate() {
        for (&inner, &value) in line {
            transposed[inner].insert(outer, value);
        }
    }
    transposed
}

/// Mutable handle on one row or column
///
/// Reads come straight from the line's map; writes are routed through the
/// owning matrix so both orientations stay consistent under double access.
pub struct LineMut<'a, T> {
    matrix: &'a mut DoubleAccessSparseMatrix<T>,
    orientation: AccessMode,
    index: usize,
}

impl<T: MatrixElement> LineMut<'_, T> {
    /// Row or column index of this line
    pub fn index(&self) -> usize {
        self.index
    }

    fn line(&self) -> &SparseLine<T> {
        match self.orientation {
            AccessMode::RowWise => &self.matrix.rows[self.index],
            AccessMode::ColumnWise => &self.matrix.cols[self.index],
        }
    }

    fn coords(&self, k: usize) -> (usize, usize) {
        match self.orientation {
            AccessMode::RowWise => (self.index, k),
            AccessMode::ColumnWise => (k, self.index),
        }
    }

    /// Stored `(position, value)` pairs in position order
    pub fn iter(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.line().iter().map(|(&k, &value)| (k, value))
    }

    /// Value at position `k`, or the null element
    pub fn get(&self, k: usize) -> T {
        self.line().get(&k).copied().unwrap_or(self.matrix.null_elem)
    }

    pub fn len(&self) -> usize {
        self.line().len()
    }

    pub fn is_empty(&self) -> bool {
        self.line().is_empty()
    }

    pub fn sum(&self) -> T {
        sum_line(self.line())
    }

    pub fn set(&mut self, k: usize, value: T) -> Result<()> {
        let (i, j) = self.coords(k);
        self.matrix.set(i, j, value)
    }

    pub fn incr(&mut self, k: usize, delta: T) -> Result<()> {
        let (i, j) = self.coords(k);
        self.matrix.incr(i, j, delta)
    }

    pub fn clear_elem(&mut self, k: usize) -> Result<()> {
        let (i, j) = self.coords(k);
        self.matrix.clear_elem(i, j)
    }

    /// Replace every stored value with `f(position, value)`
    pub fn update_values<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(usize, T) -> T,
    {
        let snapshot: Vec<(usize, T)> = self.iter().collect();
        for (k, value) in snapshot {
            self.set(k, f(k, value))?;
        }
        Ok(())
    }
}

impl<T: MatrixElement> SparseMatrix for DoubleAccessSparseMatrix<T> {
    type Element = T;

    fn get_element(&self, row: usize, col: usize) -> Option<T> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.lookup(row, col)
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    fn nnz(&self) -> usize {
        self.size()
    }
}

impl<T: MatrixElement> MatrixOperations for DoubleAccessSparseMatrix<T> {
    fn get_row(&self, row_index: usize) -> Vec<(usize, T)> {
        if self.has_rows() {
            return self
                .rows
                .get(row_index)
                .map(|row| row.iter().map(|(&j, &value)| (j, value)).collect())
                .unwrap_or_default();
        }
        self.cols
            .iter()
            .enumerate()
            .filter_map(|(j, col)| col.get(&row_index).map(|&value| (j, value)))
            .collect()
    }

    fn get_col(&self, col_index: usize) -> Vec<(usize, T)> {
        if self.has_cols() {
            return self
                .cols
                .get(col_index)
                .map(|col| col.iter().map(|(&i, &value)| (i, value)).collect())
                .unwrap_or_default();
        }
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.get(&col_index).map(|&value| (i, value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::count_warnings;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn checked<T: MatrixElement>(
        height: usize,
        width: usize,
        mode: AccessMode,
        double_access: bool,
    ) -> DoubleAccessSparseMatrix<T> {
        let config = MatrixConfig::with_mode(mode)
            .with_double_access(double_access)
            .with_bounds_check(BoundsCheck::Always);
        DoubleAccessSparseMatrix::with_config(height, width, &config)
    }

    fn assert_consistent<T: MatrixElement>(m: &DoubleAccessSparseMatrix<T>) {
        for i in 0..m.height() {
            for j in 0..m.width() {
                assert_eq!(
                    m.rows[i].get(&j),
                    m.cols[j].get(&i),
                    "rows/cols disagree at ({i}, {j})"
                );
            }
        }
    }

    #[test]
    fn test_int_scenario() {
        let mut m = DoubleAccessSparseMatrix::new(3, 3, AccessMode::RowWise, true, 0i32);
        m.set(0, 0, 5).unwrap();
        m.set(0, 1, 0).unwrap();
        m.set(1, 1, 3).unwrap();

        assert_eq!(m.exists(0, 0), Ok(true));
        assert_eq!(m.exists(0, 1), Ok(false));
        assert_eq!(m.get(1, 1), Ok(3));
        assert_eq!(m.size(), 2);
        assert_eq!(m.compressed_vec(), Ok(vec![0, 0, 5, 1, 1, 3]));
        assert_consistent(&m);
    }

    #[test]
    fn test_allocation_follows_configuration() {
        let row_only = DoubleAccessSparseMatrix::new(2, 4, AccessMode::RowWise, false, 0.0f64);
        assert_eq!((row_only.rows.len(), row_only.cols.len()), (2, 0));

        let col_only = DoubleAccessSparseMatrix::new(2, 4, AccessMode::ColumnWise, false, 0.0f64);
        assert_eq!((col_only.rows.len(), col_only.cols.len()), (0, 4));

        let both = DoubleAccessSparseMatrix::new(2, 4, AccessMode::ColumnWise, true, 0.0f64);
        assert_eq!((both.rows.len(), both.cols.len()), (2, 4));
    }

    #[test]
    fn test_null_write_removes() {
        for mode in [AccessMode::RowWise, AccessMode::ColumnWise] {
            for double_access in [false, true] {
                let mut m = checked::<i64>(2, 2, mode, double_access);
                m.set(1, 0, 7).unwrap();
                assert_eq!(m.exists(1, 0), Ok(true));
                m.set(1, 0, 0).unwrap();
                assert_eq!(m.exists(1, 0), Ok(false));
                m.set(0, 1, 0).unwrap();
                assert_eq!(m.exists(0, 1), Ok(false));
                assert_eq!(m.size(), 0);
            }
        }
    }

    #[test]
    fn test_custom_null_elem() {
        let mut m = DoubleAccessSparseMatrix::new(2, 2, AccessMode::RowWise, false, -1i32);
        assert_eq!(m.get(0, 0), Ok(-1));
        m.set(0, 0, 0).unwrap();
        assert_eq!(m.exists(0, 0), Ok(true));
        m.set(0, 0, -1).unwrap();
        assert_eq!(m.exists(0, 0), Ok(false));
    }

    #[test]
    fn test_incr() {
        let mut m = checked::<i32>(2, 2, AccessMode::RowWise, true);
        m.incr(0, 1, 4).unwrap();
        m.incr(0, 1, 2).unwrap();
        assert_eq!(m.get(0, 1), Ok(6));

        // adding the null element is skipped
        m.incr(1, 1, 0).unwrap();
        assert_eq!(m.exists(1, 1), Ok(false));

        // landing exactly on the null element removes the entry
        m.incr(0, 1, -6).unwrap();
        assert_eq!(m.exists(0, 1), Ok(false));
        assert_consistent(&m);
    }

    #[test]
    fn test_bounds_policy() {
        let mut m = checked::<f64>(2, 3, AccessMode::RowWise, false);
        assert_eq!(
            m.set(2, 0, 1.0),
            Err(SparseError::IndexOutOfBounds {
                row: 2,
                col: 0,
                height: 2,
                width: 3
            })
        );
        assert!(m.get(0, 3).is_err());
        assert!(m.exists(5, 5).is_err());
        assert!(m.clear_row(2, false).is_err());
        assert!(m.clear_col(3, false).is_err());

        m.set_bounds_check(BoundsCheck::Never);
        // unchecked reads and clears outside the matrix see nothing
        assert_eq!(m.get(9, 9), Ok(0.0));
        assert_eq!(m.exists(0, 7), Ok(false));
        assert_eq!(m.clear_elem(9, 9), Ok(()));
        assert_eq!(m.clear_row(4, true), Ok(()));
        assert_eq!(m.clear_col(4, true), Ok(()));
    }

    #[test]
    fn test_unchecked_writes_stay_convertible() {
        let mut m = DoubleAccessSparseMatrix::new(2, 2, AccessMode::RowWise, false, 0.0);
        m.set_bounds_check(BoundsCheck::Never);
        assert_eq!(
            m.set(0, 5, 1.0),
            Err(SparseError::IndexOutOfBounds {
                row: 0,
                col: 5,
                height: 2,
                width: 2
            })
        );
        assert!(m.incr(0, 5, 1.0).is_err());
        assert!(m.add_row(SparseLine::from([(3, 1.0)])).is_err());
        m.set(1, 1, 2.0).unwrap();

        m.set_mode(AccessMode::ColumnWise);
        m.set_double_accessible(true);
        assert_eq!(m.size(), 1);
        assert_eq!(m.col(1).unwrap().get(&1), Some(&2.0));
        assert_consistent(&m);
    }

    #[test]
    fn test_clear_row_cheap_and_forced() {
        let mut m = checked::<i32>(3, 3, AccessMode::RowWise, true);
        m.set(1, 0, 1).unwrap();
        m.set(1, 2, 2).unwrap();
        m.set(2, 2, 3).unwrap();

        m.clear_row(1, false).unwrap();
        assert!(m.rows[1].is_empty());
        // column side deliberately left stale
        assert_eq!(m.cols[0].get(&1), Some(&1));

        m.set(1, 0, 1).unwrap();
        m.clear_row(1, true).unwrap();
        assert!(m.rows[1].is_empty());
        assert!(m.cols[0].get(&1).is_none());
        assert!(m.cols[2].get(&1).is_none());
        assert_eq!(m.get(2, 2), Ok(3));
        assert_consistent(&m);
    }

    #[test]
    fn test_clear_col_column_wise() {
        let mut m = checked::<i32>(3, 3, AccessMode::ColumnWise, true);
        m.set(0, 1, 1).unwrap();
        m.set(2, 1, 2).unwrap();
        m.set(2, 0, 3).unwrap();

        m.clear_col(1, true).unwrap();
        assert_eq!(m.size(), 1);
        assert_eq!(m.get(2, 0), Ok(3));
        assert_consistent(&m);

        let mut single = checked::<i32>(3, 3, AccessMode::RowWise, false);
        single.set(0, 1, 1).unwrap();
        single.set(1, 1, 1).unwrap();
        single.set(1, 2, 1).unwrap();
        single.clear_col(1, false).unwrap();
        assert_eq!(single.size(), 1);
    }

    #[test]
    fn test_cheap_clear_warns_only_under_double_access() {
        let mut double = checked::<i32>(2, 2, AccessMode::RowWise, true);
        double.set(0, 1, 1).unwrap();
        let warnings = count_warnings(|| {
            double.clear_row(0, false).unwrap();
            double.clear_col(1, false).unwrap();
        });
        assert_eq!(warnings, 2);
        assert_eq!(count_warnings(|| double.clear_row(1, true).unwrap()), 0);

        let mut single = checked::<i32>(2, 2, AccessMode::ColumnWise, false);
        single.set(1, 1, 4).unwrap();
        let warnings = count_warnings(|| {
            single.clear_row(1, false).unwrap();
            single.clear_col(0, false).unwrap();
        });
        assert_eq!(warnings, 0);
    }

    #[test]
    fn test_clear_and_resize() {
        let mut m = checked::<i32>(2, 2, AccessMode::RowWise, true);
        m.set(0, 0, 1).unwrap();
        m.set(1, 1, 1).unwrap();
        m.clear();
        assert_eq!(m.size(), 0);
        assert_eq!(m.dimensions(), (2, 2));

        m.set(1, 1, 4).unwrap();
        m.resize(4, 5);
        assert_eq!(m.size(), 0);
        assert_eq!((m.rows.len(), m.cols.len()), (4, 5));
        m.set(3, 4, 2).unwrap();
        assert_eq!(m.get(3, 4), Ok(2));
    }

    #[test]
    fn test_orientation_errors() {
        let m = checked::<f64>(2, 2, AccessMode::ColumnWise, false);
        assert_eq!(
            m.row(0).unwrap_err(),
            SparseError::OrientationUnavailable {
                operation: "row",
                required: AccessMode::RowWise,
                mode: AccessMode::ColumnWise,
                double_access: false
            }
        );
        assert!(m.sum_row(0).is_err());
        assert!(m.col(1).is_ok());
        assert!(m.col(2).is_err());
    }

    #[test]
    fn test_line_mut_keeps_sync() {
        let mut m = checked::<i32>(2, 3, AccessMode::RowWise, true);
        m.set(0, 0, 1).unwrap();
        m.set(0, 2, 3).unwrap();
        {
            let mut row = m.row_mut(0).unwrap();
            assert_eq!(row.len(), 2);
            assert_eq!(row.sum(), 4);
            row.update_values(|_, v| v * 10).unwrap();
            row.set(1, 5).unwrap();
            row.clear_elem(0).unwrap();
        }
        assert_eq!(m.get(0, 2), Ok(30));
        assert_eq!(m.get(0, 1), Ok(5));
        assert_eq!(m.exists(0, 0), Ok(false));
        assert_consistent(&m);

        let mut col = m.col_mut(2).unwrap();
        col.incr(1, 7).unwrap();
        assert_eq!(col.get(1), 7);
        assert_eq!(col.iter().collect::<Vec<_>>(), vec![(0, 30), (1, 7)]);
        assert_consistent(&m);
    }

    #[test]
    fn test_add_row_and_col() {
        let mut m = checked::<f64>(0, 3, AccessMode::RowWise, false);
        m.add_row(SparseLine::from([(0, 1.0), (2, 0.0)])).unwrap();
        m.add_row(SparseLine::from([(1, 2.0)])).unwrap();
        assert_eq!(m.height(), 2);
        assert_eq!(m.size(), 2);
        assert_eq!(m.exists(0, 2), Ok(false));
        assert!(m.add_row(SparseLine::from([(3, 1.0)])).is_err());
        assert!(m.add_col(SparseLine::new()).is_err());

        let mut c = checked::<f64>(2, 0, AccessMode::ColumnWise, false);
        c.add_col(SparseLine::from([(1, 4.0)])).unwrap();
        assert_eq!(c.width(), 1);
        assert_eq!(c.get(1, 0), Ok(4.0));

        let mut d = checked::<f64>(2, 2, AccessMode::RowWise, true);
        assert!(d.add_row(SparseLine::new()).is_err());
    }

    #[test]
    fn test_sums() {
        let mut m = checked::<i32>(2, 3, AccessMode::RowWise, true);
        m.set(0, 0, 1).unwrap();
        m.set(0, 2, 2).unwrap();
        m.set(1, 2, 4).unwrap();
        assert_eq!(m.sum_row(0), Ok(3));
        assert_eq!(m.sum_col(2), Ok(6));
        assert_eq!(m.sum_col(1), Ok(0));
        assert_eq!(m.sum_of_elements(), 7);
    }

    #[test]
    fn test_set_mode_preserves_entries() {
        let mut m = checked::<f64>(3, 4, AccessMode::RowWise, false);
        m.set(0, 3, 1.5).unwrap();
        m.set(2, 0, -2.0).unwrap();
        m.set(2, 3, 4.0).unwrap();
        let before: Vec<_> = {
            let mut e: Vec<_> = m.entries().collect();
            e.sort_by_key(|&(i, j, _)| (i, j));
            e
        };

        m.set_mode(AccessMode::ColumnWise);
        assert_eq!(m.mode(), AccessMode::ColumnWise);
        assert!(m.rows.is_empty());
        assert!(m.row(0).is_err());
        assert_eq!(m.col(3).unwrap().len(), 2);

        let mut after: Vec<_> = m.entries().collect();
        after.sort_by_key(|&(i, j, _)| (i, j));
        assert_eq!(before, after);
        for &(i, j, v) in &before {
            assert_eq!(m.get(i, j), Ok(v));
        }

        m.set_mode(AccessMode::RowWise);
        let mut back: Vec<_> = m.entries().collect();
        back.sort_by_key(|&(i, j, _)| (i, j));
        assert_eq!(before, back);
    }

    #[test]
    fn test_set_mode_with_double_access_moves_nothing() {
        let mut m = checked::<i32>(2, 2, AccessMode::RowWise, true);
        m.set(0, 1, 3).unwrap();
        let rows = m.rows.clone();
        let cols = m.cols.clone();
        m.set_mode(AccessMode::ColumnWise);
        assert_eq!(m.mode(), AccessMode::ColumnWise);
        assert_eq!(m.rows, rows);
        assert_eq!(m.cols, cols);
    }

    #[test]
    fn test_set_double_accessible() {
        let mut m = checked::<i32>(3, 2, AccessMode::ColumnWise, false);
        m.set(0, 1, 1).unwrap();
        m.set(2, 0, 2).unwrap();

        m.set_double_accessible(true);
        assert!(m.is_double_accessible());
        assert_eq!(m.row(2).unwrap().get(&0), Some(&2));
        assert_consistent(&m);

        m.set(1, 1, 9).unwrap();
        assert_consistent(&m);

        m.set_double_accessible(false);
        assert!(m.rows.is_empty());
        assert_eq!(m.size(), 3);
        assert_eq!(m.get(1, 1), Ok(9));
    }

    #[test]
    fn test_trait_access() {
        let mut m = checked::<i32>(2, 3, AccessMode::ColumnWise, false);
        m.set(1, 2, 8).unwrap();
        m.set(1, 0, 4).unwrap();
        assert_eq!(m.get_element(1, 2), Some(8));
        assert_eq!(m.get_element(0, 2), None);
        assert_eq!(m.get_element(5, 5), None);
        assert_eq!(m.nnz(), 2);
        assert_eq!(m.get_row(1), vec![(0, 4), (2, 8)]);
        assert_eq!(m.get_col(2), vec![(1, 8)]);
    }

    #[test]
    fn test_random_ops_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        for mode in [AccessMode::RowWise, AccessMode::ColumnWise] {
            let mut m = checked::<i32>(6, 5, mode, true);
            for _ in 0..2000 {
                let i = rng.gen_range(0..6);
                let j = rng.gen_range(0..5);
                let v = rng.gen_range(-3..=3);
                match rng.gen_range(0..3) {
                    0 => m.set(i, j, v).unwrap(),
                    1 => m.incr(i, j, v).unwrap(),
                    _ => m.clear_elem(i, j).unwrap(),
                }
                assert_consistent(&m);
            }

            let mut stored = 0;
            for i in 0..6 {
                for j in 0..5 {
                    if m.get(i, j).unwrap() != 0 {
                        stored += 1;
                    }
                }
            }
            assert_eq!(m.size(), stored);
        }
    }
}
