//! Radon operators between tabloid spaces of adjacent shapes.

use rankspec_core::{
    all_tabloids, RankspecError, RankspecResult, Scalar, Shape, SparseMatrix, Vector,
};

/// The 0/1 incidence operator from shape λ to λ⁺.
///
/// Column `rank(T)` has a one at `rank(T')` for every T' obtained from T by
/// moving a single position out of the last block and into the first.
/// The result is `size(λ⁺) × size(λ)`.
pub fn radon(shape: &Shape) -> RankspecResult<SparseMatrix> {
    let target = shape.refine()?;
    let last = shape.len();
    let mut op = SparseMatrix::new(target.size(), shape.size());
    for (idx, tabloid) in all_tabloids(shape)?.iter().enumerate() {
        for pos in tabloid.block(last) {
            let promoted = tabloid.relabel(pos, 1)?;
            op.accumulate(promoted.rank()?, idx + 1, Scalar::one())?;
        }
    }
    Ok(op)
}

/// The `steps`-fold composition of Radon operators starting at `shape`,
/// together with the shape it lands on.
pub fn radon_chain(shape: &Shape, steps: usize) -> RankspecResult<(SparseMatrix, Shape)> {
    let size = shape.size();
    let mut op = SparseMatrix::new(size, size);
    for i in 1..=size {
        op.set(i, i, Scalar::one())?;
    }
    let mut current = shape.clone();
    for _ in 0..steps {
        op = radon(&current)?.mul(&op)?;
        current = current.refine()?;
    }
    Ok((op, current))
}

/// Push a vector indexed by tabloids of `shape` through `steps` Radon
/// operators, one at a time.
pub fn apply_radon(shape: &Shape, data: &Vector, steps: usize) -> RankspecResult<(Vector, Shape)> {
    if data.len() != shape.size() {
        return Err(RankspecError::DimensionMismatch(format!(
            "vector of length {} for shape {shape} with {} tabloids",
            data.len(),
            shape.size()
        )));
    }
    let mut current = shape.clone();
    let mut v = data.clone();
    for _ in 0..steps {
        v = radon(&current)?.mul_vector(&v)?;
        current = current.refine()?;
    }
    Ok((v, current))
}
