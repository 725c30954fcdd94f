//! Jucys–Murphy elements acting on a tabloid module.
//!
//! X_i = (1 i) + (2 i) + … + (i−1 i). A transposition acts on a tabloid by
//! exchanging the labels at its two positions; the operator records, for
//! every tabloid T in the table and every j < i, a unit step from
//! `rank(T)` to `rank((j i)·T)`.

use rankspec_core::{
    DenseMatrix, MatrixView, RankspecError, RankspecResult, Scalar, Shape, SparseMatrix,
    Tabloid,
};

fn read_table(table: &DenseMatrix) -> RankspecResult<(Shape, Vec<Tabloid>)> {
    let mut tabloids = Vec::with_capacity(table.rows());
    for r in 1..=table.rows() {
        let row = table
            .row(r)
            .ok_or_else(|| RankspecError::IndexOutOfRange(format!("tabloid row {r}")))?;
        tabloids.push(Tabloid::from_vector(&row)?);
    }
    let shape = tabloids
        .first()
        .ok_or_else(|| RankspecError::InvalidShape("empty tabloid table".into()))?
        .shape()?;
    for t in &tabloids {
        if t.shape()? != shape {
            return Err(RankspecError::InvalidShape(format!(
                "tabloid {t} does not have shape {shape}"
            )));
        }
    }
    Ok((shape, tabloids))
}

fn accumulate_element(
    op: &mut SparseMatrix,
    tabloids: &[Tabloid],
    position: usize,
) -> RankspecResult<()> {
    for t in tabloids {
        let from = t.rank()?;
        for j in 1..position {
            let to = t.swap(j, position)?.rank()?;
            op.accumulate(to, from, Scalar::one())?;
        }
    }
    Ok(())
}

/// Operator of X_position over the tabloids listed in `table` (one per row).
pub fn jucys_murphy(table: &DenseMatrix, position: usize) -> RankspecResult<SparseMatrix> {
    let (shape, tabloids) = read_table(table)?;
    let n = shape.n();
    if position == 0 || position > n {
        return Err(RankspecError::IndexOutOfRange(format!(
            "position {position} of {n}"
        )));
    }
    let size = shape.size();
    let mut op = SparseMatrix::new(size, size);
    accumulate_element(&mut op, &tabloids, position)?;
    Ok(op)
}

/// X_1 + X_2 + … + X_n, i.e. the sum of all transpositions.
pub fn jucys_murphy_sum(table: &DenseMatrix) -> RankspecResult<SparseMatrix> {
    let (shape, tabloids) = read_table(table)?;
    let size = shape.size();
    let mut op = SparseMatrix::new(size, size);
    for position in 1..=shape.n() {
        accumulate_element(&mut op, &tabloids, position)?;
    }
    Ok(op)
}
