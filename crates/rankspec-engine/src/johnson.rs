use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::time::Instant;

use tracing::{debug, info};

use rankspec_core::{
    all_tabloids, choose, RankspecError, RankspecResult, Scalar, Shape, SparseMatrix,
};

/// Adjacency operator of the Johnson graph J(n, size).
///
/// Vertices are the `size`-subsets of an n-set, indexed by the rank of the
/// tabloid of shape (n−size, size) whose second block is the subset.
#[derive(Debug, Clone)]
pub struct JohnsonGraph {
    n: usize,
    size: usize,
    shape: Shape,
    adjacency: SparseMatrix,
}

impl JohnsonGraph {
    pub fn build(n: usize, size: usize) -> RankspecResult<Self> {
        if size == 0 {
            return Err(RankspecError::InvalidShape(format!(
                "Johnson graph J({n}, 0) has no edges"
            )));
        }
        let shape = Shape::two_row(n, size)?;
        let tabloids = all_tabloids(&shape)?;
        let m = tabloids.len();

        let mut adjacency = SparseMatrix::new(m, m);
        for i in 0..m {
            let a = tabloids[i].labels();
            for j in (i + 1)..m {
                let b = tabloids[j].labels();
                let weight: usize = a.iter().zip(b).map(|(x, y)| x.abs_diff(*y)).sum();
                if weight == 2 {
                    adjacency.set(i + 1, j + 1, Scalar::one())?;
                    adjacency.set(j + 1, i + 1, Scalar::one())?;
                }
            }
        }

        Ok(Self {
            n,
            size,
            shape,
            adjacency,
        })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn adjacency(&self) -> &SparseMatrix {
        &self.adjacency
    }

    /// Number of vertices, C(n, size).
    pub fn order(&self) -> usize {
        choose(self.n, self.size) as usize
    }

    /// Common vertex degree, size·(n−size).
    pub fn degree(&self) -> usize {
        self.size * (self.n - self.size)
    }

    /// The size+1 distinct eigenvalues (size−m)(n−size−m) − m, largest first.
    pub fn eigenvalues(&self) -> Vec<f64> {
        let (n, k) = (self.n as f64, self.size as f64);
        (0..=self.size)
            .map(|m| {
                let m = m as f64;
                (k - m) * (n - k - m) - m
            })
            .collect()
    }

    /// Eigenspace dimensions C(n, m) − C(n, m−1), in eigenvalue order.
    pub fn eigenspace_dims(&self) -> Vec<usize> {
        (0..=self.size)
            .map(|m| {
                let below = if m == 0 { 0 } else { choose(self.n, m - 1) };
                (choose(self.n, m) - below) as usize
            })
            .collect()
    }
}

/// Johnson graphs for a fixed range of n, built once and then only read.
#[derive(Debug, Clone, Default)]
pub struct JohnsonCache {
    graphs: BTreeMap<(usize, usize), JohnsonGraph>,
}

impl JohnsonCache {
    /// Build J(n, size) for every n in `ns` and every size in 1..=n/2.
    pub fn build(ns: RangeInclusive<usize>) -> RankspecResult<Self> {
        let started = Instant::now();
        let mut graphs = BTreeMap::new();
        for n in ns.clone() {
            for size in 1..=n / 2 {
                let t0 = Instant::now();
                let graph = JohnsonGraph::build(n, size)?;
                debug!(
                    n,
                    size,
                    vertices = graph.order(),
                    edges = graph.adjacency().nnz() / 2,
                    elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
                    "built Johnson graph"
                );
                graphs.insert((n, size), graph);
            }
        }
        info!(
            n_min = *ns.start(),
            n_max = *ns.end(),
            graphs = graphs.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Johnson cache ready"
        );
        Ok(Self { graphs })
    }

    pub fn get(&self, n: usize, size: usize) -> Option<&JohnsonGraph> {
        self.graphs.get(&(n, size))
    }

    pub fn require(&self, n: usize, size: usize) -> RankspecResult<&JohnsonGraph> {
        self.get(n, size)
            .ok_or(RankspecError::MissingOperator { n, size })
    }

    /// Whether every graph needed for n-item data is present.
    pub fn covers(&self, n: usize) -> bool {
        (1..=n / 2).all(|size| self.graphs.contains_key(&(n, size)))
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JohnsonGraph> {
        self.graphs.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankspec_core::{unrank, MatrixView};

    #[test]
    fn test_regular_symmetric_zero_diagonal() {
        for n in 2..=7 {
            for k in 1..=n / 2 {
                let g = JohnsonGraph::build(n, k).unwrap();
                let a = g.adjacency();
                assert_eq!(a.dims(), (g.order(), g.order()));
                assert!(a.is_symmetric(), "J({n},{k}) not symmetric");
                for r in 1..=g.order() {
                    assert_eq!(a.get(r, r), Some(Scalar::zero()));
                    assert_eq!(a.row_entries(r).count(), k * (n - k));
                }
            }
        }
    }

    #[test]
    fn test_neighbours_differ_by_one_swap() {
        let g = JohnsonGraph::build(5, 2).unwrap();
        for (r, c, _) in g.adjacency().iter() {
            let a = unrank(r, g.shape()).unwrap();
            let b = unrank(c, g.shape()).unwrap();
            let shared = a
                .block(2)
                .iter()
                .filter(|p| b.block(2).contains(p))
                .count();
            assert_eq!(shared, 1);
        }
    }

    #[test]
    fn test_petersen_complement_spectrum() {
        // J(5,2) is the complement of the Petersen graph.
        let g = JohnsonGraph::build(5, 2).unwrap();
        assert_eq!(g.order(), 10);
        assert_eq!(g.degree(), 6);
        assert_eq!(g.eigenvalues(), vec![6.0, 1.0, -2.0]);
        assert_eq!(g.eigenspace_dims(), vec![1, 4, 5]);
    }

    #[test]
    fn test_size_zero_rejected() {
        assert!(JohnsonGraph::build(4, 0).is_err());
        assert!(JohnsonGraph::build(4, 3).is_err());
    }

    #[test]
    fn test_cache_lookup() {
        let cache = JohnsonCache::build(2..=5).unwrap();
        assert_eq!(cache.len(), 1 + 1 + 2 + 2);
        assert!(cache.covers(5));
        assert!(!cache.covers(6));
        assert!(cache.get(4, 2).is_some());
        assert!(matches!(
            cache.require(6, 1),
            Err(RankspecError::MissingOperator { n: 6, size: 1 })
        ));
    }

    #[test]
    fn test_cache_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<JohnsonCache>();
    }
}
