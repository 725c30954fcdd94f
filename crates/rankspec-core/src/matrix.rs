use crate::scalar::Scalar;

/// Read access shared by dense and sparse matrices.
///
/// Rows and columns are 1-based. `entry` returns `None` outside the
/// declared bounds, which is distinct from a stored (or implicit) zero.
pub trait MatrixView {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    fn entry(&self, row: usize, col: usize) -> Option<Scalar>;

    fn dims(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Dimensions first, then elementwise tolerance equality.
    fn approx_eq<M: MatrixView + ?Sized>(&self, other: &M) -> bool {
        if self.dims() != other.dims() {
            return false;
        }
        (1..=self.rows()).all(|r| {
            (1..=self.cols()).all(|c| match (self.entry(r, c), other.entry(r, c)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            })
        })
    }
}
