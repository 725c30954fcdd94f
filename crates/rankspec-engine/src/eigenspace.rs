//! Projection of a data vector onto the eigenspaces of a Johnson graph.
//!
//! J(n, k) has exactly k+1 distinct eigenvalues θ0 > θ1 > … > θk, so the
//! orthogonal projector onto the θm-eigenspace is the Lagrange polynomial
//! Pm = ∏_{i≠m} (A − θi) / (θm − θi). Applying it needs only k products
//! with the sparse adjacency matrix per eigenspace.

use serde::Serialize;
use tracing::debug;

use rankspec_core::{DenseMatrix, RankspecError, RankspecResult, Scalar, Vector};

use crate::johnson::JohnsonGraph;

/// Eigenspace components of one data vector.
///
/// Column m+1 of `projections` is the component in the eigenspace of the
/// m-th largest eigenvalue, so column 1 is the constant (trivial) part and
/// column k+1 the bottom eigenspace. `lengths[m]` is that eigenspace's
/// dimension.
#[derive(Debug, Clone, Serialize)]
pub struct EigenProjection {
    pub lengths: Vec<usize>,
    pub projections: DenseMatrix,
}

pub fn eigenspace_projections(
    graph: &JohnsonGraph,
    data: &Vector,
) -> RankspecResult<EigenProjection> {
    if data.len() != graph.order() {
        return Err(RankspecError::DimensionMismatch(format!(
            "data of length {} for J({}, {}) with {} vertices",
            data.len(),
            graph.n(),
            graph.size(),
            graph.order()
        )));
    }
    let a = graph.adjacency();
    let thetas = graph.eigenvalues();

    let mut columns = Vec::with_capacity(thetas.len());
    for (m, &theta_m) in thetas.iter().enumerate() {
        let mut x = data.clone();
        for (i, &theta_i) in thetas.iter().enumerate() {
            if i == m {
                continue;
            }
            let shifted = a.mul_vector(&x)?.sub(&x.scale(Scalar::Real(theta_i)))?;
            x = shifted.scale(Scalar::Real(1.0 / (theta_m - theta_i)));
        }
        columns.push(x);
    }
    debug!(
        n = graph.n(),
        size = graph.size(),
        eigenspaces = columns.len(),
        "projected data onto Johnson eigenspaces"
    );

    Ok(EigenProjection {
        lengths: graph.eigenspace_dims(),
        projections: DenseMatrix::from_columns(&columns)?,
    })
}
