//! Dense row-major matrices with 1-based indexing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RankspecError, RankspecResult};
use crate::matrix::MatrixView;
use crate::scalar::Scalar;
use crate::vector::Vector;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<Scalar>>", try_from = "Vec<Vec<Scalar>>")]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Scalar>,
}

impl DenseMatrix {
    /// Build from rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<Scalar>>) -> RankspecResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(RankspecError::DimensionMismatch(format!(
                    "row {} has {} columns, expected {cols}",
                    i + 1,
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(Self {
            rows: n_rows,
            cols,
            data,
        })
    }

    pub fn from_real_rows(rows: &[Vec<f64>]) -> RankspecResult<Self> {
        Self::from_rows(
            rows.iter()
                .map(|r| r.iter().copied().map(Scalar::Real).collect())
                .collect(),
        )
    }

    pub fn filled(rows: usize, cols: usize, value: Scalar) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, Scalar::zero())
    }

    pub fn ones(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, Scalar::one())
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = Scalar::one();
        }
        m
    }

    /// Build a matrix whose columns are the given vectors.
    pub fn from_columns(columns: &[Vector]) -> RankspecResult<Self> {
        let rows = columns.first().map_or(0, Vector::len);
        let mut m = Self::zeros(rows, columns.len());
        for (j, col) in columns.iter().enumerate() {
            m.set_col(j + 1, col)?;
        }
        Ok(m)
    }

    fn offset(&self, row: usize, col: usize) -> Option<usize> {
        if row == 0 || col == 0 || row > self.rows || col > self.cols {
            return None;
        }
        Some((row - 1) * self.cols + (col - 1))
    }

    fn out_of_range(&self, what: &str, row: usize, col: usize) -> RankspecError {
        RankspecError::IndexOutOfRange(format!(
            "{what} ({row}, {col}) of {}x{} matrix",
            self.rows, self.cols
        ))
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Scalar> {
        self.offset(row, col).map(|o| self.data[o])
    }

    pub fn set(&mut self, row: usize, col: usize, value: Scalar) -> RankspecResult<()> {
        let o = self
            .offset(row, col)
            .ok_or_else(|| self.out_of_range("element", row, col))?;
        self.data[o] = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> Option<Vector> {
        if row == 0 || row > self.rows {
            return None;
        }
        let start = (row - 1) * self.cols;
        Some(Vector::new(self.data[start..start + self.cols].to_vec()))
    }

    pub fn col(&self, col: usize) -> Option<Vector> {
        if col == 0 || col > self.cols {
            return None;
        }
        Some(
            (0..self.rows)
                .map(|r| self.data[r * self.cols + col - 1])
                .collect(),
        )
    }

    pub fn set_row(&mut self, row: usize, values: &Vector) -> RankspecResult<()> {
        if row == 0 || row > self.rows {
            return Err(self.out_of_range("row", row, 0));
        }
        if values.len() != self.cols {
            return Err(RankspecError::DimensionMismatch(format!(
                "row of length {} into {} columns",
                values.len(),
                self.cols
            )));
        }
        let start = (row - 1) * self.cols;
        self.data[start..start + self.cols].copy_from_slice(values.as_slice());
        Ok(())
    }

    pub fn set_col(&mut self, col: usize, values: &Vector) -> RankspecResult<()> {
        if col == 0 || col > self.cols {
            return Err(self.out_of_range("column", 0, col));
        }
        if values.len() != self.rows {
            return Err(RankspecError::DimensionMismatch(format!(
                "column of length {} into {} rows",
                values.len(),
                self.rows
            )));
        }
        for (r, v) in values.iter().enumerate() {
            self.data[r * self.cols + col - 1] = *v;
        }
        Ok(())
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) -> RankspecResult<()> {
        if a == 0 || b == 0 || a > self.rows || b > self.rows {
            return Err(self.out_of_range("row swap", a, b));
        }
        if a != b {
            for c in 0..self.cols {
                self.data.swap((a - 1) * self.cols + c, (b - 1) * self.cols + c);
            }
        }
        Ok(())
    }

    /// Sum of every entry raised to `power`.
    pub fn sum_pow(&self, power: u32) -> Scalar {
        self.data
            .iter()
            .fold(Scalar::zero(), |acc, x| acc + x.pow(power))
    }

    /// Square root of the sum of squared entries.
    pub fn norm(&self) -> Scalar {
        self.sum_pow(2).sqrt()
    }

    /// Sort every column ascending on its own.
    ///
    /// Rows do not keep their correspondence afterwards.
    pub fn sort_columns(&mut self) {
        for c in 1..=self.cols {
            if let Some(mut column) = self.col(c) {
                column.sort();
                for (r, v) in column.iter().enumerate() {
                    self.data[r * self.cols + c - 1] = *v;
                }
            }
        }
    }

    /// First entry that is not (tolerance) zero, scanning row-major.
    pub fn first_nonzero(&self) -> Option<(usize, usize)> {
        self.data
            .iter()
            .position(|x| *x != Scalar::zero())
            .map(|o| (o / self.cols + 1, o % self.cols + 1))
    }

    /// Reverse the column order.
    pub fn flip_horizontal(&self) -> DenseMatrix {
        let mut out = self.clone();
        for r in 0..self.rows {
            out.data[r * self.cols..(r + 1) * self.cols].reverse();
        }
        out
    }

    pub fn transpose(&self) -> DenseMatrix {
        let mut out = DenseMatrix::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.data[c * self.rows + r] = self.data[r * self.cols + c];
            }
        }
        out
    }

    pub fn scale(&self, factor: Scalar) -> DenseMatrix {
        DenseMatrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|x| *x * factor).collect(),
        }
    }

    pub fn mul_vector(&self, v: &Vector) -> RankspecResult<Vector> {
        if v.len() != self.cols {
            return Err(RankspecError::DimensionMismatch(format!(
                "{}x{} matrix times vector of length {}",
                self.rows,
                self.cols,
                v.len()
            )));
        }
        Ok((0..self.rows)
            .map(|r| {
                self.data[r * self.cols..(r + 1) * self.cols]
                    .iter()
                    .zip(v.iter())
                    .fold(Scalar::zero(), |acc, (a, b)| acc + *a * *b)
            })
            .collect())
    }

    pub fn mul(&self, other: &DenseMatrix) -> RankspecResult<DenseMatrix> {
        if self.cols != other.rows {
            return Err(RankspecError::DimensionMismatch(format!(
                "{}x{} times {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut out = DenseMatrix::zeros(self.rows, other.cols);
        for r in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[r * self.cols + k];
                if a.is_zero() {
                    continue;
                }
                for c in 0..other.cols {
                    out.data[r * other.cols + c] += a * other.data[k * other.cols + c];
                }
            }
        }
        Ok(out)
    }

    pub fn to_rows(&self) -> Vec<Vec<Scalar>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.data.chunks(self.cols).map(<[Scalar]>::to_vec).collect()
    }
}

impl MatrixView for DenseMatrix {
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

impl PartialEq for DenseMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl From<DenseMatrix> for Vec<Vec<Scalar>> {
    fn from(m: DenseMatrix) -> Self {
        m.to_rows()
    }
}

impl TryFrom<Vec<Vec<Scalar>>> for DenseMatrix {
    type Error = RankspecError;

    fn try_from(rows: Vec<Vec<Scalar>>) -> Result<Self, Self::Error> {
        DenseMatrix::from_rows(rows)
    }
}

impl fmt::Display for DenseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_rows() {
            let cells: Vec<String> = row
                .iter()
                .map(|x| format!("{:>10}", format!("{x:.4}")))
                .collect();
            writeln!(f, "[{}]", cells.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: &[Vec<f64>]) -> DenseMatrix {
        DenseMatrix::from_real_rows(rows).unwrap()
    }

    #[test]
    fn test_ones() {
        assert_eq!(DenseMatrix::ones(2, 2), m(&[vec![1.0, 1.0], vec![1.0, 1.0]]));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = DenseMatrix::from_real_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(result, Err(RankspecError::DimensionMismatch(_))));
    }

    #[test]
    fn test_get_set_bounds() {
        let mut a = DenseMatrix::zeros(2, 3);
        a.set(2, 3, Scalar::Real(7.0)).unwrap();
        assert_eq!(a.get(2, 3), Some(Scalar::Real(7.0)));
        assert!(a.get(0, 1).is_none());
        assert!(a.get(3, 1).is_none());
        assert!(a.set(1, 4, Scalar::one()).is_err());
    }

    #[test]
    fn test_rows_and_columns() {
        let mut a = m(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(a.row(2).unwrap(), Vector::from_reals(&[3.0, 4.0]));
        assert_eq!(a.col(1).unwrap(), Vector::from_reals(&[1.0, 3.0]));
        assert!(a.col(3).is_none());

        a.set_row(1, &Vector::from_reals(&[5.0, 6.0])).unwrap();
        a.set_col(2, &Vector::from_reals(&[0.0, 0.0])).unwrap();
        assert_eq!(a, m(&[vec![5.0, 0.0], vec![3.0, 0.0]]));
        assert!(a.set_row(1, &Vector::from_reals(&[1.0])).is_err());

        a.swap_rows(1, 2).unwrap();
        assert_eq!(a, m(&[vec![3.0, 0.0], vec![5.0, 0.0]]));
    }

    #[test]
    fn test_sum_pow_and_norm() {
        let a = m(&[vec![1.0, 2.0], vec![2.0, 4.0]]);
        assert_eq!(a.sum_pow(1), 9.0);
        assert_eq!(a.sum_pow(2), 25.0);
        assert_eq!(a.norm(), 5.0);
    }

    #[test]
    fn test_sort_columns_independently() {
        let mut a = m(&[vec![3.0, 1.0], vec![1.0, 2.0], vec![2.0, 0.0]]);
        a.sort_columns();
        assert_eq!(a, m(&[vec![1.0, 0.0], vec![2.0, 1.0], vec![3.0, 2.0]]));
    }

    #[test]
    fn test_first_nonzero() {
        let a = m(&[vec![0.0, 0.0], vec![0.0, 5.0]]);
        assert_eq!(a.first_nonzero(), Some((2, 2)));
        assert_eq!(DenseMatrix::zeros(3, 3).first_nonzero(), None);
    }

    #[test]
    fn test_flip_and_transpose() {
        let a = m(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(
            a.flip_horizontal(),
            m(&[vec![3.0, 2.0, 1.0], vec![6.0, 5.0, 4.0]])
        );
        assert_eq!(
            a.transpose(),
            m(&[vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]])
        );
    }

    #[test]
    fn test_products() {
        let a = m(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
        let v = Vector::from_reals(&[1.0, 1.0]);
        assert_eq!(a.mul_vector(&v).unwrap(), Vector::from_reals(&[3.0, 7.0]));
        assert_eq!(a.mul(&DenseMatrix::identity(2)).unwrap(), a);
        assert!(a.mul(&DenseMatrix::zeros(3, 1)).is_err());
    }

    #[test]
    fn test_equality_requires_dims() {
        assert_ne!(DenseMatrix::zeros(2, 3), DenseMatrix::zeros(3, 2));
    }

    #[test]
    fn test_serde_rows() {
        let a = m(&[vec![1.0, 2.0]]);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "[[1.0,2.0]]");
        let back: DenseMatrix = serde_json::from_str("[[1, 2], [3, 4]]").unwrap();
        assert_eq!(back.dims(), (2, 2));
        assert!(serde_json::from_str::<DenseMatrix>("[[1, 2], [3]]").is_err());
    }
}
