//! Sparse matrices keyed by 1-based `(row, col)`.
//!
//! Absent keys are zero. Writing a zero removes the key, so the map only
//! ever holds nonzero entries. Writes beyond the declared dimensions grow
//! them; reads beyond them return `None`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dense::DenseMatrix;
use crate::error::{RankspecError, RankspecResult};
use crate::matrix::MatrixView;
use crate::scalar::Scalar;
use crate::vector::Vector;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "SparseRepr", from = "SparseRepr")]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    entries: BTreeMap<(usize, usize), Scalar>,
}

#[derive(Serialize, Deserialize)]
struct SparseRepr {
    rows: usize,
    cols: usize,
    entries: Vec<(usize, usize, Scalar)>,
}

impl SparseMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: BTreeMap::new(),
        }
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Scalar> {
        if row == 0 || col == 0 || row > self.rows || col > self.cols {
            return None;
        }
        Some(
            self.entries
                .get(&(row, col))
                .copied()
                .unwrap_or_else(Scalar::zero),
        )
    }

    pub fn set(&mut self, row: usize, col: usize, value: Scalar) -> RankspecResult<()> {
        if row == 0 || col == 0 {
            return Err(RankspecError::IndexOutOfRange(format!(
                "sparse element ({row}, {col})"
            )));
        }
        self.rows = self.rows.max(row);
        self.cols = self.cols.max(col);
        if value.is_zero() {
            self.entries.remove(&(row, col));
        } else {
            self.entries.insert((row, col), value);
        }
        Ok(())
    }

    /// Add `value` to the entry at `(row, col)`.
    pub fn accumulate(&mut self, row: usize, col: usize, value: Scalar) -> RankspecResult<()> {
        let current = self
            .entries
            .get(&(row, col))
            .copied()
            .unwrap_or_else(Scalar::zero);
        self.set(row, col, current + value)
    }

    /// Nonzero entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Scalar)> + '_ {
        self.entries.iter().map(|(&(r, c), &v)| (r, c, v))
    }

    /// Nonzero entries of one row, ordered by column.
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, Scalar)> + '_ {
        self.entries
            .range((row, 1)..=(row, usize::MAX))
            .map(|(&(_, c), &v)| (c, v))
    }

    pub fn to_dense(&self) -> DenseMatrix {
        let mut dense = DenseMatrix::zeros(self.rows, self.cols);
        for (r, c, v) in self.iter() {
            // Keys are always inside the declared bounds.
            let _ = dense.set(r, c, v);
        }
        dense
    }

    pub fn transpose(&self) -> SparseMatrix {
        SparseMatrix {
            rows: self.cols,
            cols: self.rows,
            entries: self.iter().map(|(r, c, v)| ((c, r), v)).collect(),
        }
    }

    pub fn scale(&self, factor: Scalar) -> SparseMatrix {
        let mut out = SparseMatrix::new(self.rows, self.cols);
        for (r, c, v) in self.iter() {
            let scaled = v * factor;
            if !scaled.is_zero() {
                out.entries.insert((r, c), scaled);
            }
        }
        out
    }

    pub fn mul_vector(&self, v: &Vector) -> RankspecResult<Vector> {
        if v.len() != self.cols {
            return Err(RankspecError::DimensionMismatch(format!(
                "{}x{} sparse matrix times vector of length {}",
                self.rows,
                self.cols,
                v.len()
            )));
        }
        let x = v.as_slice();
        let mut out = vec![Scalar::zero(); self.rows];
        for (r, c, a) in self.iter() {
            out[r - 1] += a * x[c - 1];
        }
        Ok(Vector::new(out))
    }

    pub fn mul(&self, other: &SparseMatrix) -> RankspecResult<SparseMatrix> {
        if self.cols != other.rows {
            return Err(RankspecError::DimensionMismatch(format!(
                "{}x{} times {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut out = SparseMatrix::new(self.rows, other.cols);
        for (r, k, a) in self.iter() {
            for (c, b) in other.row_entries(k) {
                out.accumulate(r, c, a * b)?;
            }
        }
        Ok(out)
    }

    pub fn add(&self, other: &SparseMatrix) -> RankspecResult<SparseMatrix> {
        if self.dims() != other.dims() {
            return Err(RankspecError::DimensionMismatch(format!(
                "{}x{} plus {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut out = self.clone();
        for (r, c, v) in other.iter() {
            out.accumulate(r, c, v)?;
        }
        Ok(out)
    }

    pub fn is_symmetric(&self) -> bool {
        self.rows == self.cols
            && self
                .iter()
                .all(|(r, c, v)| self.get(c, r).is_some_and(|t| t == v))
    }
}

impl MatrixView for SparseMatrix {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn entry(&self, row: usize, col: usize) -> Option<Scalar> {
        self.get(row, col)
    }
}

impl From<&DenseMatrix> for SparseMatrix {
    fn from(dense: &DenseMatrix) -> Self {
        let mut sparse = SparseMatrix::new(dense.rows(), dense.cols());
        for r in 1..=dense.rows() {
            for c in 1..=dense.cols() {
                if let Some(v) = dense.get(r, c).filter(|v| !v.is_zero()) {
                    sparse.entries.insert((r, c), v);
                }
            }
        }
        sparse
    }
}

impl PartialEq for SparseMatrix {
    fn eq(&self, other: &Self) -> bool {
        if self.dims() != other.dims() {
            return false;
        }
        // Only keys present on either side can differ.
        self.entries
            .keys()
            .chain(other.entries.keys())
            .all(|&(r, c)| self.get(r, c) == other.get(r, c))
    }
}

impl PartialEq<DenseMatrix> for SparseMatrix {
    fn eq(&self, other: &DenseMatrix) -> bool {
        self.approx_eq(other)
    }
}

impl PartialEq<SparseMatrix> for DenseMatrix {
    fn eq(&self, other: &SparseMatrix) -> bool {
        self.approx_eq(other)
    }
}

impl From<SparseMatrix> for SparseRepr {
    fn from(m: SparseMatrix) -> Self {
        SparseRepr {
            rows: m.rows,
            cols: m.cols,
            entries: m.iter().collect(),
        }
    }
}

impl From<SparseRepr> for SparseMatrix {
    fn from(repr: SparseRepr) -> Self {
        let mut m = SparseMatrix::new(repr.rows, repr.cols);
        for (r, c, v) in repr.entries {
            if r > 0 && c > 0 {
                let _ = m.set(r, c, v);
            }
        }
        m
    }
}

impl fmt::Display for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "{} x {} all-0 sparse matrix", self.rows, self.cols);
        }
        writeln!(
            f,
            "{} x {} sparse matrix, {} nonzero",
            self.rows,
            self.cols,
            self.entries.len()
        )?;
        for (r, c, v) in self.iter() {
            writeln!(f, "  ({r}, {c}) = {v}")?;
        }
        Ok(())
    }
}
