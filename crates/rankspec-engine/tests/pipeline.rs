use rankspec_core::{DenseMatrix, MatrixView, Scalar, Shape};
use rankspec_engine::{final_decomposition, raw_data_sorting, JohnsonCache};

fn ballots() -> DenseMatrix {
    // 6 items; most ballots approve everything except items 2 and 5.
    let mut rows = vec![vec![1.0, 0.0, 1.0, 1.0, 0.0, 1.0]; 8];
    rows.push(vec![0.0, 1.0, 1.0, 1.0, 0.0, 1.0]);
    rows.push(vec![1.0, 1.0, 0.0, 1.0, 1.0, 0.0]);
    rows.push(vec![1.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
    rows.push(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    DenseMatrix::from_real_rows(&rows).unwrap()
}

#[test]
fn test_end_to_end_finds_the_dominant_pair() {
    let sorted = raw_data_sorting(&ballots(), 6).unwrap();
    assert_eq!(sorted.total_rows(), 12);
    assert_eq!(sorted.cell(2).unwrap().rows, 10);

    let cache = JohnsonCache::build(2..=6).unwrap();
    let d = final_decomposition(&sorted, &cache).unwrap();

    // Cells 1..=5 have subset sizes 1, 2, 3, 2, 1.
    assert_eq!(d.components.len(), 1 + 2 + 3 + 2 + 1);

    let pair = d.get(2, 1).unwrap();
    assert_eq!(pair.shape, Shape::two_row(6, 2).unwrap());
    let top = pair.ranked.row(1).unwrap();
    // the losers of the top row are items 2 and 5
    let losers: Vec<usize> = (2..=7)
        .filter(|&c| top.get(c) == Some(Scalar::Real(2.0)))
        .map(|c| c - 1)
        .collect();
    assert_eq!(losers, vec![2, 5]);

    // ranked rows are in non-increasing order
    let values = pair.ranked.col(1).unwrap();
    for w in values.as_slice().windows(2) {
        assert!(w[0].re() + 1e-3 >= w[1].re());
    }
}

#[test]
fn test_decomposition_serializes() {
    let sorted = raw_data_sorting(&ballots(), 6).unwrap();
    let cache = JohnsonCache::build(6..=6).unwrap();
    let d = final_decomposition(&sorted, &cache).unwrap();
    let json = serde_json::to_value(&d).unwrap();
    assert_eq!(json["n"], 6);
    let first = &json["components"][0];
    assert_eq!(first["k"], 1);
    assert_eq!(first["level"], 1);
    assert_eq!(first["shape"], serde_json::json!([5, 1]));
}

#[test]
fn test_levels_of_a_complemented_cell() {
    let sorted = raw_data_sorting(&ballots(), 6).unwrap();
    let cache = JohnsonCache::build(6..=6).unwrap();
    let d = final_decomposition(&sorted, &cache).unwrap();
    let shapes: Vec<Shape> = d.cell(4).map(|c| c.shape.clone()).collect();
    assert!(sorted.cell(4).unwrap().complemented);
    assert_eq!(
        shapes,
        vec![Shape::two_row(6, 2).unwrap(), Shape::two_row(6, 1).unwrap()]
    );
}
