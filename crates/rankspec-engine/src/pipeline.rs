//! The full decomposition: every cell, every isotypic sub-level.
//!
//! For a cell whose tracked subsets have size s, the eigenspace projection
//! is flipped so that column j holds the component of sub-level j, the
//! piece living in the isotypic component of shape (n−m, m) with
//! m = s − j + 1. That component is pushed through j−1 Radon operators onto
//! m-subsets and rescaled by 1/j!, then sorted so the largest coordinates
//! (and the subsets they belong to) come first.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use rankspec_core::{
    factorial, unrank, DenseMatrix, RankspecError, RankspecResult, Scalar, Shape, Vector,
};

use crate::eigenspace::eigenspace_projections;
use crate::johnson::JohnsonCache;
use crate::radon::apply_radon;
use crate::sorting::SortedData;

/// One (cell, sub-level) entry of a decomposition.
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    /// Cell index: rows with n − k winners.
    pub k: usize,
    /// Sub-level j, 1 ≤ j ≤ subset size of the cell.
    pub level: usize,
    /// Shape of the tabloids that index `corrected` and `ranked`.
    pub shape: Shape,
    /// Raw eigenspace coordinates (indexed like the cell's frequencies).
    pub raw: Vector,
    /// Coordinates after the Radon correction.
    pub corrected: Vector,
    /// One row per tabloid: `[coordinate, label_1, …, label_n]`, sorted by
    /// coordinate descending, ties by ascending rank.
    pub ranked: DenseMatrix,
}

#[derive(Debug, Clone, Serialize)]
pub struct Decomposition {
    pub n: usize,
    pub components: Vec<Component>,
}

impl Decomposition {
    pub fn get(&self, k: usize, level: usize) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| c.k == k && c.level == level)
    }

    /// Components of one cell, by ascending level.
    pub fn cell(&self, k: usize) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(move |c| c.k == k)
    }
}

/// Rows of `[value, labels…]` for every tabloid of `shape`, largest value
/// first. Values within ε of each other keep ascending rank order.
pub fn ranked_table(values: &Vector, shape: &Shape) -> RankspecResult<DenseMatrix> {
    if values.len() != shape.size() {
        return Err(RankspecError::DimensionMismatch(format!(
            "{} coordinates for shape {shape} with {} tabloids",
            values.len(),
            shape.size()
        )));
    }
    let mut order: Vec<(usize, Scalar)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (i + 1, *v))
        .collect();
    order.sort_by(|a, b| {
        b.1.re()
            .total_cmp(&a.1.re())
            .then_with(|| b.1.im().total_cmp(&a.1.im()))
    });
    // Values within ε of a run's leading value tie, and ties go by rank.
    let mut start = 0;
    while start < order.len() {
        let lead = order[start].1;
        let end = order[start..]
            .iter()
            .position(|(_, v)| !Scalar::equal(lead, *v, false))
            .map_or(order.len(), |p| start + p);
        order[start..end].sort_by_key(|(rank, _)| *rank);
        start = end;
    }

    let rows = order
        .into_iter()
        .map(|(rank, value)| {
            let tabloid = unrank(rank, shape)?;
            let mut row = Vec::with_capacity(tabloid.n() + 1);
            row.push(value);
            row.extend(tabloid.to_vector().into_inner());
            Ok(row)
        })
        .collect::<RankspecResult<Vec<_>>>()?;
    DenseMatrix::from_rows(rows)
}

pub fn final_decomposition(
    sorted: &SortedData,
    cache: &JohnsonCache,
) -> RankspecResult<Decomposition> {
    let started = Instant::now();
    let n = sorted.n;
    let mut components = Vec::new();

    for cell in &sorted.cells {
        let s = cell.subset_size();
        if s == 0 {
            continue;
        }
        let graph = cache.require(n, s)?;
        let projection = eigenspace_projections(graph, &cell.frequencies)?;
        let flipped = projection.projections.flip_horizontal();

        for level in 1..=s {
            let raw = flipped.col(level).ok_or_else(|| {
                RankspecError::IndexOutOfRange(format!(
                    "projection column {level} for cell {}",
                    cell.k
                ))
            })?;
            let (pushed, shape) = apply_radon(&cell.shape, &raw, level - 1)?;
            let corrected = pushed.scale(Scalar::Real(1.0 / factorial(level) as f64));
            let ranked = ranked_table(&corrected, &shape)?;
            debug!(k = cell.k, level, shape = %shape, "component ready");
            components.push(Component {
                k: cell.k,
                level,
                shape,
                raw,
                corrected,
                ranked,
            });
        }
    }

    info!(
        n,
        components = components.len(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "decomposition complete"
    );
    Ok(Decomposition { n, components })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorting::raw_data_sorting;
    use rankspec_core::MatrixView;

    fn rows(data: &[&[f64]]) -> DenseMatrix {
        DenseMatrix::from_real_rows(&data.iter().map(|r| r.to_vec()).collect::<Vec<_>>())
            .unwrap()
    }

    #[test]
    fn test_ranked_table_orders_and_breaks_ties_by_rank() {
        let shape = Shape::two_row(3, 1).unwrap();
        let values = Vector::from_reals(&[1.0, 5.0, 1.0]);
        let table = ranked_table(&values, &shape).unwrap();
        assert_eq!(table.dims(), (3, 4));
        assert_eq!(table.col(1).unwrap(), Vector::from_reals(&[5.0, 1.0, 1.0]));
        // rank 2 first, then ranks 1 and 3 in order
        for (r, rank) in [(1, 2), (2, 1), (3, 3)] {
            let row = table.row(r).unwrap();
            let labels = unrank(rank, &shape).unwrap().to_vector();
            assert_eq!(&row.as_slice()[1..], labels.as_slice());
        }
        assert!(ranked_table(&Vector::zeros(2), &shape).is_err());
    }

    #[test]
    fn test_ranked_table_ties_across_bucket_edges() {
        let shape = Shape::two_row(3, 1).unwrap();
        // 1.00004 and 1.00006 are within ε but round to different ε-cells
        let values = Vector::from_reals(&[1.00004, 1.00006, 0.5]);
        let table = ranked_table(&values, &shape).unwrap();
        let first = table.row(1).unwrap();
        let labels = unrank(1, &shape).unwrap().to_vector();
        assert_eq!(&first.as_slice()[1..], labels.as_slice());
        assert_eq!(first.get(1).unwrap().re(), 1.00004);
        assert_eq!(table.row(3).unwrap().get(1).unwrap().re(), 0.5);
    }

    #[test]
    fn test_components_cover_each_cell() {
        let data = rows(&[
            &[1.0, 1.0, 0.0, 0.0, 1.0],
            &[1.0, 0.0, 0.0, 1.0, 1.0],
            &[0.0, 1.0, 1.0, 1.0, 1.0],
            &[1.0, 1.0, 1.0, 0.0, 1.0],
            &[0.0, 0.0, 0.0, 1.0, 0.0],
        ]);
        let sorted = raw_data_sorting(&data, 5).unwrap();
        let cache = JohnsonCache::build(5..=5).unwrap();
        let d = final_decomposition(&sorted, &cache).unwrap();

        // cells 1..=4 have subset sizes 1, 2, 2, 1
        assert_eq!(d.components.len(), 1 + 2 + 2 + 1);
        assert!(d.get(0, 1).is_none());
        assert!(d.get(5, 1).is_none());
        let c = d.get(2, 2).unwrap();
        assert_eq!(c.shape, Shape::two_row(5, 1).unwrap());
        assert_eq!(c.raw.len(), 10);
        assert_eq!(c.corrected.len(), 5);
        assert_eq!(d.get(2, 1).unwrap().shape, Shape::two_row(5, 2).unwrap());
        assert_eq!(d.cell(2).count(), 2);
    }

    #[test]
    fn test_level_one_is_bottom_eigenspace() {
        let data = rows(&[&[1.0, 1.0, 0.0, 0.0], &[1.0, 0.0, 1.0, 0.0]]);
        let sorted = raw_data_sorting(&data, 4).unwrap();
        let cache = JohnsonCache::build(4..=4).unwrap();
        let d = final_decomposition(&sorted, &cache).unwrap();

        let graph = cache.get(4, 2).unwrap();
        let p = eigenspace_projections(graph, &sorted.cell(2).unwrap().frequencies).unwrap();
        assert_eq!(d.get(2, 1).unwrap().raw, p.projections.col(3).unwrap());
        assert_eq!(d.get(2, 2).unwrap().raw, p.projections.col(2).unwrap());
        // level one is only rescaled by 1/1!
        assert_eq!(d.get(2, 1).unwrap().corrected, d.get(2, 1).unwrap().raw);
    }

    #[test]
    fn test_single_subset_cell_attribution() {
        // Everyone drops item 3 except one row that drops item 1.
        let data = rows(&[
            &[1.0, 1.0, 0.0, 1.0],
            &[1.0, 1.0, 0.0, 1.0],
            &[1.0, 1.0, 0.0, 1.0],
            &[0.0, 1.0, 1.0, 1.0],
        ]);
        let sorted = raw_data_sorting(&data, 4).unwrap();
        let cache = JohnsonCache::build(2..=4).unwrap();
        let d = final_decomposition(&sorted, &cache).unwrap();
        let top = d.get(1, 1).unwrap().ranked.row(1).unwrap();
        // the loser block (label 2) of the top row is item 3
        assert_eq!(top.get(4), Some(Scalar::Real(2.0)));
        assert!(top.get(1).unwrap().re() > 0.0);
    }

    #[test]
    fn test_missing_operator_fails_whole_run() {
        let data = rows(&[&[1.0, 0.0, 0.0, 1.0, 1.0, 0.0]]);
        let sorted = raw_data_sorting(&data, 6).unwrap();
        let cache = JohnsonCache::build(2..=5).unwrap();
        assert!(matches!(
            final_decomposition(&sorted, &cache),
            Err(RankspecError::MissingOperator { n: 6, .. })
        ));
    }
}
