pub mod dense;
pub mod error;
pub mod matrix;
pub mod scalar;
pub mod sparse;
pub mod tabloid;
pub mod vector;

pub use dense::DenseMatrix;
pub use error::{RankspecError, RankspecResult};
pub use matrix::MatrixView;
pub use scalar::{Argument, Scalar, EPSILON};
pub use sparse::SparseMatrix;
pub use tabloid::{
    all_tabloids, checked_choose, checked_multinomial, choose, factorial, multinomial, rank,
    tabloid_matrix, tabloids, unrank, Shape, Tabloid,
};
pub use vector::{Nested, Vector};
