//! 1-indexed scalar vectors.

use serde::{Deserialize, Serialize};

use crate::error::{RankspecError, RankspecResult};
use crate::scalar::Scalar;

/// Ordered sequence of scalars. Positions are 1-based at the API boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<Scalar>,
}

impl Vector {
    pub fn new(data: Vec<Scalar>) -> Self {
        Self { data }
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![Scalar::zero(); len],
        }
    }

    pub fn from_reals(values: &[f64]) -> Self {
        Self {
            data: values.iter().copied().map(Scalar::Real).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[Scalar] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<Scalar> {
        self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scalar> {
        self.data.iter()
    }

    /// Element at 1-based position `i`, `None` when out of range.
    pub fn get(&self, i: usize) -> Option<Scalar> {
        if i == 0 {
            return None;
        }
        self.data.get(i - 1).copied()
    }

    pub fn set(&mut self, i: usize, value: Scalar) -> RankspecResult<()> {
        let len = self.data.len();
        match i.checked_sub(1).and_then(|idx| self.data.get_mut(idx)) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RankspecError::IndexOutOfRange(format!(
                "vector position {i} (len {len})"
            ))),
        }
    }

    pub fn push(&mut self, value: Scalar) {
        self.data.push(value);
    }

    /// Remove positions `from..=to` (1-based, inclusive) and return them.
    pub fn remove_range(&mut self, from: usize, to: usize) -> RankspecResult<Vec<Scalar>> {
        if from == 0 || from > to || to > self.data.len() {
            return Err(RankspecError::IndexOutOfRange(format!(
                "range {from}..={to} of vector with len {}",
                self.data.len()
            )));
        }
        Ok(self.data.drain(from - 1..to).collect())
    }

    pub fn sum(&self) -> Scalar {
        self.data.iter().fold(Scalar::zero(), |acc, x| acc + *x)
    }

    /// Stable ascending sort; values within tolerance keep their order.
    pub fn sort(&mut self) {
        self.data.sort_by(|a, b| a.tolerant_cmp(b));
    }

    /// Number of entries equal (within tolerance) to `target`.
    pub fn histc(&self, target: Scalar) -> usize {
        self.data.iter().filter(|x| **x == target).count()
    }

    pub fn scale(&self, factor: Scalar) -> Vector {
        Vector::new(self.data.iter().map(|x| *x * factor).collect())
    }

    pub fn add(&self, other: &Vector) -> RankspecResult<Vector> {
        self.check_len(other)?;
        Ok(Vector::new(
            self.data.iter().zip(&other.data).map(|(a, b)| *a + *b).collect(),
        ))
    }

    pub fn sub(&self, other: &Vector) -> RankspecResult<Vector> {
        self.check_len(other)?;
        Ok(Vector::new(
            self.data.iter().zip(&other.data).map(|(a, b)| *a - *b).collect(),
        ))
    }

    /// Bilinear dot product (no conjugation).
    pub fn dot(&self, other: &Vector) -> RankspecResult<Scalar> {
        self.check_len(other)?;
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .fold(Scalar::zero(), |acc, (a, b)| acc + *a * *b))
    }

    /// Euclidean norm over the moduli of the entries.
    pub fn norm(&self) -> f64 {
        self.data
            .iter()
            .map(|x| x.modulus() * x.modulus())
            .sum::<f64>()
            .sqrt()
    }

    fn check_len(&self, other: &Vector) -> RankspecResult<()> {
        if self.data.len() != other.data.len() {
            return Err(RankspecError::DimensionMismatch(format!(
                "vector lengths {} and {}",
                self.data.len(),
                other.data.len()
            )));
        }
        Ok(())
    }
}

impl From<Vec<Scalar>> for Vector {
    fn from(data: Vec<Scalar>) -> Self {
        Self { data }
    }
}

impl FromIterator<Scalar> for Vector {
    fn from_iter<I: IntoIterator<Item = Scalar>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

/// Arbitrarily nested lists of scalars.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nested {
    Value(Scalar),
    List(Vec<Nested>),
}

impl Nested {
    /// Count occurrences of `target` at any depth.
    pub fn histc(&self, target: Scalar) -> usize {
        match self {
            Self::Value(x) => usize::from(*x == target),
            Self::List(items) => items.iter().map(|item| item.histc(target)).sum(),
        }
    }
}

impl From<&Vector> for Nested {
    fn from(v: &Vector) -> Self {
        Self::List(v.iter().copied().map(Nested::Value).collect())
    }
}
