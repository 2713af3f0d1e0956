//! Probability tables on top of `DoubleAccessSparseMatrix<f64>`
//!
//! Entries are probabilities or counts. Conditional normalization works on
//! the authoritative orientation: rows for a row-wise matrix (P(col | row)),
//! columns for a column-wise one (P(row | col)).

use std::io::{Read, Write};
use std::ops::{Deref, DerefMut};

use dualsparse_core::format::constants::{class_name, PROB_TOLERANCE};
use dualsparse_core::{check_same_shape, AccessMode, Result, SparseError, SparseMatrix};
use tracing::{debug, warn};

use crate::config::MatrixConfig;
use crate::matrix::{DoubleAccessSparseMatrix, RecordFormat, SparseLine};

/// Sparse matrix of probabilities
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ProbSparseMatrix {
    inner: DoubleAccessSparseMatrix<f64>,
}

impl Deref for ProbSparseMatrix {
    type Target = DoubleAccessSparseMatrix<f64>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ProbSparseMatrix {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl From<DoubleAccessSparseMatrix<f64>> for ProbSparseMatrix {
    fn from(inner: DoubleAccessSparseMatrix<f64>) -> Self {
        Self { inner }
    }
}

/// Map (outer, inner) line coordinates back to (row, col)
fn coords(orientation: AccessMode, outer: usize, inner: usize) -> (usize, usize) {
    match orientation {
        AccessMode::RowWise => (outer, inner),
        AccessMode::ColumnWise => (inner, outer),
    }
}

fn line_sum(line: &SparseLine<f64>) -> f64 {
    line.values().sum()
}

impl ProbSparseMatrix {
    /// Create an empty `height x width` probability matrix with null element 0
    pub fn new(height: usize, width: usize, mode: AccessMode, double_access: bool) -> Self {
        Self {
            inner: DoubleAccessSparseMatrix::new(height, width, mode, double_access, 0.0),
        }
    }

    pub fn with_config(height: usize, width: usize, config: &MatrixConfig<f64>) -> Self {
        Self {
            inner: DoubleAccessSparseMatrix::with_config(height, width, config),
        }
    }

    pub fn into_inner(self) -> DoubleAccessSparseMatrix<f64> {
        self.inner
    }

    /// Store a probability, optionally warning when it is not positive
    ///
    /// The warning is advisory; the value is written either way.
    pub fn set(&mut self, i: usize, j: usize, value: f64, warn: bool) -> Result<()> {
        if warn && value <= 0.0 {
            warn!(name = %self.inner.name, row = i, col = j, value, "non-positive probability written");
        }
        self.inner.set(i, j, value)
    }

    /// Add to a probability, optionally warning when the increment is not positive
    pub fn incr(&mut self, i: usize, j: usize, delta: f64, warn: bool) -> Result<()> {
        if warn && delta <= 0.0 {
            warn!(name = %self.inner.name, row = i, col = j, delta, "non-positive probability increment");
        }
        self.inner.incr(i, j, delta)
    }

    fn authoritative_lines(&self) -> &[SparseLine<f64>] {
        match self.inner.mode {
            AccessMode::RowWise => &self.inner.rows,
            AccessMode::ColumnWise => &self.inner.cols,
        }
    }

    /// Whether every non-empty authoritative line sums to one
    ///
    /// Lines summing to exactly zero are accepted: they stand for a
    /// conditional distribution that has not been estimated yet.
    pub fn check_cond_prob_integrity(&self) -> bool {
        for (k, line) in self.authoritative_lines().iter().enumerate() {
            let sum = line_sum(line);
            if sum != 0.0 && (sum - 1.0).abs() > PROB_TOLERANCE {
                debug!(name = %self.inner.name, line = k, sum, "conditional distribution does not sum to one");
                return false;
            }
        }
        true
    }

    /// Joint integrity check with the legacy polarity
    ///
    /// Returns `true` when the grand total deviates from one by more than
    /// the tolerance, i.e. when integrity is *violated*. This is the
    /// opposite of [`check_cond_prob_integrity`](Self::check_cond_prob_integrity);
    /// prefer [`is_joint_prob_integrity_ok`](Self::is_joint_prob_integrity_ok).
    pub fn check_joint_prob_integrity(&self) -> bool {
        (self.inner.sum_of_elements() - 1.0).abs() > PROB_TOLERANCE
    }

    /// Whether the grand total is within tolerance of one
    pub fn is_joint_prob_integrity_ok(&self) -> bool {
        !self.check_joint_prob_integrity()
    }

    fn require_orientation(
        source: &ProbSparseMatrix,
        orientation: AccessMode,
        operation: &'static str,
    ) -> Result<()> {
        let available = match orientation {
            AccessMode::RowWise => source.inner.has_rows(),
            AccessMode::ColumnWise => source.inner.has_cols(),
        };
        if !available {
            return Err(SparseError::OrientationUnavailable {
                operation,
                required: orientation,
                mode: source.inner.mode,
                double_access: source.inner.double_access,
            });
        }
        Ok(())
    }

    /// Overwrite `self` with the conditional normalization of `source`
    ///
    /// Each line of `source` in `self`'s orientation is divided by its sum.
    /// Results that are not strictly positive are omitted, as are lines
    /// summing to zero. `source` must maintain that orientation.
    pub fn normalize_cond_from(
        &mut self,
        source: &mut ProbSparseMatrix,
        clear_source: bool,
    ) -> Result<()> {
        check_same_shape(self.inner.dimensions(), source.inner.dimensions())?;
        let orientation = self.inner.mode;
        Self::require_orientation(source, orientation, "normalize_cond")?;

        self.inner.clear();
        let lines = match orientation {
            AccessMode::RowWise => &source.inner.rows,
            AccessMode::ColumnWise => &source.inner.cols,
        };
        for (outer, line) in lines.iter().enumerate() {
            let sum = line_sum(line);
            if sum == 0.0 {
                continue;
            }
            for (&inner, &n) in line {
                let p = n / sum;
                if p > 0.0 {
                    let (i, j) = coords(orientation, outer, inner);
                    self.inner.set(i, j, p)?;
                }
            }
        }
        if clear_source {
            source.inner.clear();
        }
        Ok(())
    }

    /// Conditionally normalize in place along the authoritative orientation
    ///
    /// Non-positive results are removed; zero-sum lines are left untouched.
    pub fn normalize_cond(&mut self) -> Result<()> {
        let orientation = self.inner.mode;
        let mut updates = Vec::with_capacity(self.inner.size());
        for (outer, line) in self.authoritative_lines().iter().enumerate() {
            let sum = line_sum(line);
            if sum == 0.0 {
                continue;
            }
            for (&inner, &n) in line {
                let (i, j) = coords(orientation, outer, inner);
                updates.push((i, j, n / sum));
            }
        }
        self.apply_positive(updates)
    }

    fn apply_positive(&mut self, updates: Vec<(usize, usize, f64)>) -> Result<()> {
        for (i, j, p) in updates {
            if p > 0.0 {
                self.inner.set(i, j, p)?;
            } else {
                self.inner.clear_elem(i, j)?;
            }
        }
        Ok(())
    }

    /// Overwrite `self` with `source` divided by its grand total
    ///
    /// Non-positive results are omitted. A non-empty source with zero total
    /// mass is an error.
    pub fn normalize_joint_from(
        &mut self,
        source: &mut ProbSparseMatrix,
        clear_source: bool,
    ) -> Result<()> {
        check_same_shape(self.inner.dimensions(), source.inner.dimensions())?;
        let total = source.inner.sum_of_elements();
        if total == 0.0 && source.inner.size() > 0 {
            return Err(SparseError::ZeroMass);
        }

        self.inner.clear();
        for (i, j, n) in source.inner.entries() {
            let p = n / total;
            if p > 0.0 {
                self.inner.set(i, j, p)?;
            }
        }
        if clear_source {
            source.inner.clear();
        }
        Ok(())
    }

    /// Divide every entry by the grand total, in place
    pub fn normalize_joint(&mut self) -> Result<()> {
        let total = self.inner.sum_of_elements();
        if self.inner.size() == 0 {
            return Ok(());
        }
        if total == 0.0 {
            return Err(SparseError::ZeroMass);
        }
        let updates: Vec<_> = self
            .inner
            .entries()
            .map(|(i, j, n)| (i, j, n / total))
            .collect();
        self.apply_positive(updates)
    }

    /// Sum of `sqrt((a - b)^2)` over the union of stored positions
    pub fn euclidian_distance(&self, other: &ProbSparseMatrix) -> Result<f64> {
        check_same_shape(self.inner.dimensions(), other.inner.dimensions())?;
        let mut distance = 0.0;
        for (i, j, a) in self.inner.entries() {
            let b = other.inner.get_element(i, j).unwrap_or(other.inner.null_elem);
            distance += ((a - b) * (a - b)).sqrt();
        }
        for (i, j, b) in other.inner.entries() {
            if self.inner.get_element(i, j).is_none() {
                let a = self.inner.null_elem;
                distance += ((a - b) * (a - b)).sqrt();
            }
        }
        Ok(distance)
    }

    /// Set `self` to the elementwise union-sum of `p` and `q`
    pub fn add(&mut self, p: &ProbSparseMatrix, q: &ProbSparseMatrix) -> Result<()> {
        check_same_shape(p.inner.dimensions(), q.inner.dimensions())?;
        check_same_shape(p.inner.dimensions(), self.inner.dimensions())?;
        self.inner.clear();
        for (i, j, value) in p.inner.entries() {
            self.inner.set(i, j, value)?;
        }
        for (i, j, value) in q.inner.entries() {
            self.inner.incr(i, j, value)?;
        }
        Ok(())
    }

    /// Row half-step of iterative proportional fitting
    ///
    /// Overwrites `self` with `p`'s rows rescaled so row `i` sums to
    /// `row_marginal[i]`, and returns the resulting per-column sums. Any
    /// row of `p` with zero mass is fatal; it is detected before `self` is
    /// modified.
    pub fn scale_rows_to_marginal(
        &mut self,
        p: &ProbSparseMatrix,
        row_marginal: &[f64],
    ) -> Result<Vec<f64>> {
        check_same_shape(self.inner.dimensions(), p.inner.dimensions())?;
        let (height, width) = p.inner.dimensions();
        check_same_shape((height, 1), (row_marginal.len(), 1))?;
        Self::require_orientation(p, AccessMode::RowWise, "scale_rows_to_marginal")?;

        let row_sums: Vec<f64> = p.inner.rows.iter().map(line_sum).collect();
        if let Some(i) = row_sums.iter().position(|&sum| sum == 0.0) {
            return Err(SparseError::ZeroMassRow(i));
        }

        self.inner.clear();
        let mut col_sums = vec![0.0; width];
        for (i, row) in p.inner.rows.iter().enumerate() {
            let scale = row_marginal[i] / row_sums[i];
            for (&j, &pij) in row {
                let value = pij * scale;
                self.inner.set(i, j, value)?;
                col_sums[j] += value;
            }
        }
        Ok(col_sums)
    }

    /// Column half-step of iterative proportional fitting
    ///
    /// Rescales the columns of `self` so column `j` sums to
    /// `col_marginal[j]`. A zero-mass column is skipped with a warning.
    pub fn scale_cols_to_marginal(&mut self, col_marginal: &[f64]) -> Result<()> {
        let mut col_sums = vec![0.0; self.inner.width];
        for (_, j, value) in self.inner.entries() {
            col_sums[j] += value;
        }
        self.rescale_cols(&col_sums, col_marginal)
    }

    fn rescale_cols(&mut self, col_sums: &[f64], col_marginal: &[f64]) -> Result<()> {
        let width = self.inner.width;
        check_same_shape((1, width), (1, col_marginal.len()))?;

        for (j, &sum) in col_sums.iter().enumerate() {
            if sum == 0.0 {
                warn!(name = %self.inner.name, col = j, "column has zero mass; skipping rescale");
            }
        }
        let updates: Vec<_> = self
            .inner
            .entries()
            .filter(|&(_, j, _)| col_sums[j] != 0.0)
            .map(|(i, j, value)| (i, j, value * col_marginal[j] / col_sums[j]))
            .collect();
        for (i, j, value) in updates {
            self.inner.set(i, j, value)?;
        }
        Ok(())
    }

    /// One iteration of iterative proportional fitting, written into `self`
    ///
    /// Rows of `p` are rescaled to `row_marginal`, then columns of the
    /// result to `col_marginal`. The two halves react differently to empty
    /// lines: a zero-mass row is an error, a zero-mass column only warns.
    pub fn iterative_proportional_fitting_step(
        &mut self,
        p: &ProbSparseMatrix,
        row_marginal: &[f64],
        col_marginal: &[f64],
    ) -> Result<()> {
        check_same_shape((1, p.inner.width), (1, col_marginal.len()))?;
        let col_sums = self.scale_rows_to_marginal(p, row_marginal)?;
        self.rescale_cols(&col_sums, col_marginal)
    }

    /// Write this matrix as a `ProbSparseMatrix(...)` record
    pub fn write_record<W: Write>(&self, out: &mut W, format: RecordFormat) -> Result<()> {
        self.inner
            .write_record_as(out, format, class_name::PROB_SPARSE_MATRIX)
    }

    /// Read a `ProbSparseMatrix(...)` record
    pub fn read_record<R: Read>(input: &mut R, format: RecordFormat) -> Result<Self> {
        DoubleAccessSparseMatrix::read_record_as(input, format, class_name::PROB_SPARSE_MATRIX)
            .map(Self::from)
    }

    pub fn to_record_string(&self) -> String {
        self.inner.render_record(class_name::PROB_SPARSE_MATRIX)
    }

    pub fn from_record_str(text: &str) -> Result<Self> {
        DoubleAccessSparseMatrix::parse_record(text, class_name::PROB_SPARSE_MATRIX)
            .map(Self::from)
    }
}
