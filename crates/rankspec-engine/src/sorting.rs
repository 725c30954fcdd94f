//! Bucketing of purified 0/1 rows into cells by winner count.

use serde::Serialize;
use tracing::{debug, info};

use rankspec_core::{
    DenseMatrix, MatrixView, RankspecError, RankspecResult, Scalar, Shape, Tabloid, Vector,
};

/// Rows with exactly `n − k` winners.
///
/// The tracked subset is the smaller of the two blocks: the k losers when
/// k ≤ n/2, the n−k winners otherwise (`complemented`). Tabloids use label 2
/// for the tracked subset and label 1 for everything else, under the shape
/// `(n − s, s)` with s the subset size.
#[derive(Debug, Clone, Serialize)]
pub struct Cell {
    pub k: usize,
    pub shape: Shape,
    pub complemented: bool,
    pub rows: usize,
    pub frequencies: Vector,
}

impl Cell {
    fn new(n: usize, k: usize) -> RankspecResult<Self> {
        let complemented = 2 * k > n;
        let s = if complemented { n - k } else { k };
        let shape = Shape::two_row(n, s)?;
        let frequencies = Vector::zeros(shape.size());
        Ok(Self {
            k,
            shape,
            complemented,
            rows: 0,
            frequencies,
        })
    }

    /// Size of the tracked subset.
    pub fn subset_size(&self) -> usize {
        self.shape.parts().get(1).copied().unwrap_or(0)
    }

    fn tabloid_of(&self, winners: &[bool]) -> Tabloid {
        let labels = winners
            .iter()
            .map(|&w| if w == self.complemented { 2 } else { 1 })
            .collect();
        Tabloid::new(labels)
    }
}

/// All cells k = 0..=n for one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct SortedData {
    pub n: usize,
    pub cells: Vec<Cell>,
}

impl SortedData {
    pub fn cell(&self, k: usize) -> Option<&Cell> {
        self.cells.get(k)
    }

    pub fn total_rows(&self) -> usize {
        self.cells.iter().map(|c| c.rows).sum()
    }
}

/// Bucket every row of `data` (n columns of 0/1) into cell `n − sum(row)`
/// and count how often each subset occurs.
pub fn raw_data_sorting(data: &DenseMatrix, n: usize) -> RankspecResult<SortedData> {
    if n == 0 {
        return Err(RankspecError::InvalidData("no items".into()));
    }
    if data.cols() != n {
        return Err(RankspecError::InvalidData(format!(
            "rows have {} values, expected {n}",
            data.cols()
        )));
    }
    let mut cells = (0..=n)
        .map(|k| Cell::new(n, k))
        .collect::<RankspecResult<Vec<_>>>()?;

    for r in 1..=data.rows() {
        let row = data
            .row(r)
            .ok_or_else(|| RankspecError::IndexOutOfRange(format!("row {r}")))?;
        let winners = row
            .iter()
            .enumerate()
            .map(|(c, x)| {
                if Scalar::equal(*x, Scalar::one(), true) {
                    Ok(true)
                } else if Scalar::equal(*x, Scalar::zero(), true) {
                    Ok(false)
                } else {
                    Err(RankspecError::InvalidData(format!(
                        "row {r}, column {}: {x} is neither 0 nor 1",
                        c + 1
                    )))
                }
            })
            .collect::<RankspecResult<Vec<bool>>>()?;

        let k = n - winners.iter().filter(|&&w| w).count();
        let cell = &mut cells[k];
        let idx = cell.tabloid_of(&winners).rank()?;
        let current = cell.frequencies.get(idx).unwrap_or_default();
        cell.frequencies.set(idx, current + Scalar::one())?;
        cell.rows += 1;
    }

    for cell in &cells {
        if cell.rows > 0 {
            debug!(k = cell.k, shape = %cell.shape, rows = cell.rows, "cell populated");
        }
    }
    info!(n, rows = data.rows(), "sorted raw data into cells");
    Ok(SortedData { n, cells })
}
