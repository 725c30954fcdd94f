//! Partitions, tabloids and the rank/unrank bijection between them.
//!
//! A tabloid of shape λ = (λ1, …, λr) assigns each of n positions a block
//! label in `1..=r`, with exactly λi positions carrying label i. Tabloids of
//! a fixed shape are ranked `1..=M`, M = n! / (λ1! ⋯ λr!).
//!
//! The order is built label by label. For label v, the positions carrying v
//! are picked from the positions not taken by smaller labels, and that
//! choice is ranked in the combinatorial number system: scanning the free
//! positions left to right, a position carrying v contributes
//! `choose(after, need)`, where `after` counts the free positions to its
//! right and `need` the copies of v still to place (this one included).
//! Each label's choice is a digit whose place value is the number of
//! arrangements of all larger labels in what is left. Choosing a label
//! early yields a large digit, so `[1, 2, 3]` is the last tabloid of
//! shape (1, 1, 1) and `[3, 2, 1]` the first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dense::DenseMatrix;
use crate::error::{RankspecError, RankspecResult};
use crate::scalar::Scalar;
use crate::vector::Vector;

/// Binomial coefficient, zero when `k > n` and `None` when it does not fit
/// in a `u64`.
pub fn checked_choose(n: usize, k: usize) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    // acc is C(n, i) after step i, so it stays below the final value.
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc.checked_mul((n - i) as u128)? / (i + 1) as u128;
        if acc > u64::MAX as u128 {
            return None;
        }
    }
    Some(acc as u64)
}

/// Binomial coefficient, zero when `k > n`. Saturates at `u64::MAX`; use
/// [`checked_choose`] where the arguments are not already bounded by a
/// validated [`Shape`].
pub fn choose(n: usize, k: usize) -> u64 {
    checked_choose(n, k).unwrap_or(u64::MAX)
}

pub fn factorial(n: usize) -> u64 {
    (1..=n as u64).fold(1u64, |acc, x| acc.saturating_mul(x))
}

/// Number of distinct arrangements of a multiset with the given block
/// sizes, `None` on overflow.
pub fn checked_multinomial(parts: &[usize]) -> Option<u64> {
    let mut total: usize = 0;
    let mut acc: u64 = 1;
    for &p in parts {
        total = total.checked_add(p)?;
        acc = acc.checked_mul(checked_choose(total, p)?)?;
    }
    Some(acc)
}

/// Saturating form of [`checked_multinomial`].
pub fn multinomial(parts: &[usize]) -> u64 {
    checked_multinomial(parts).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// A partition: non-empty, positive, non-increasing parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Shape {
    parts: Vec<usize>,
}

impl Shape {
    pub fn new(parts: Vec<usize>) -> RankspecResult<Self> {
        if parts.is_empty() {
            return Err(RankspecError::InvalidShape("empty partition".into()));
        }
        if parts.contains(&0) {
            return Err(RankspecError::InvalidShape(format!(
                "non-positive part in {parts:?}"
            )));
        }
        if parts.windows(2).any(|w| w[0] < w[1]) {
            return Err(RankspecError::InvalidShape(format!(
                "parts of {parts:?} are not non-increasing"
            )));
        }
        // Ranks are usize, so every tabloid count must be one.
        match checked_multinomial(&parts) {
            Some(size) if usize::try_from(size).is_ok() => Ok(Self { parts }),
            _ => Err(RankspecError::InvalidShape(format!(
                "{parts:?} has too many tabloids to rank"
            ))),
        }
    }

    /// Like [`Shape::new`], additionally requiring the parts to sum to `n`.
    pub fn with_total(parts: Vec<usize>, n: usize) -> RankspecResult<Self> {
        let shape = Self::new(parts)?;
        if shape.n() != n {
            return Err(RankspecError::InvalidShape(format!(
                "{shape} does not sum to {n}"
            )));
        }
        Ok(shape)
    }

    /// The shape (n−k, k) of k-subsets of an n-set; (n) when k = 0.
    pub fn two_row(n: usize, k: usize) -> RankspecResult<Self> {
        if 2 * k > n {
            return Err(RankspecError::InvalidShape(format!(
                "({}, {k}) is not a partition",
                n.saturating_sub(k)
            )));
        }
        if k == 0 {
            Self::new(vec![n])
        } else {
            Self::new(vec![n - k, k])
        }
    }

    pub fn parts(&self) -> &[usize] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn n(&self) -> usize {
        self.parts.iter().sum()
    }

    /// Number of tabloids of this shape. Always representable, as
    /// [`Shape::new`] rejects shapes whose count overflows.
    pub fn size(&self) -> usize {
        multinomial(&self.parts) as usize
    }

    /// λ⁺: first part grown by one, last part shrunk by one (and dropped
    /// when it reaches zero).
    pub fn refine(&self) -> RankspecResult<Shape> {
        if self.parts.len() < 2 {
            return Err(RankspecError::InvalidShape(format!(
                "{self} has no block to shrink"
            )));
        }
        let mut parts = self.parts.clone();
        parts[0] += 1;
        let last = parts.len() - 1;
        parts[last] -= 1;
        if parts[last] == 0 {
            parts.pop();
        }
        Shape::new(parts)
    }
}

impl TryFrom<Vec<usize>> for Shape {
    type Error = RankspecError;

    fn try_from(parts: Vec<usize>) -> Result<Self, Self::Error> {
        Shape::new(parts)
    }
}

impl From<Shape> for Vec<usize> {
    fn from(shape: Shape) -> Self {
        shape.parts
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.parts.iter().map(usize::to_string).collect();
        write!(f, "({})", parts.join(","))
    }
}

impl std::str::FromStr for Shape {
    type Err = RankspecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = parse_list(s)?;
        Shape::new(parts)
    }
}

fn parse_list(s: &str) -> RankspecResult<Vec<usize>> {
    s.trim_matches(|c| c == '(' || c == ')' || c == '[' || c == ']')
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<usize>()
                .map_err(|e| RankspecError::InvalidShape(format!("bad entry {p:?}: {e}")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tabloid
// ---------------------------------------------------------------------------

/// Block labels for positions `1..=n`, stored 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tabloid {
    labels: Vec<usize>,
}

impl Tabloid {
    pub fn new(labels: Vec<usize>) -> Self {
        Self { labels }
    }

    /// Read labels from a vector of (integral, positive) scalars.
    pub fn from_vector(v: &Vector) -> RankspecResult<Self> {
        let labels = v
            .iter()
            .map(|x| {
                let rounded = x.round();
                if !Scalar::equal(*x, rounded, true) || !x.is_real() || x.re() < 1.0 {
                    return Err(RankspecError::InvalidShape(format!(
                        "{x} is not a block label"
                    )));
                }
                Ok(rounded.re() as usize)
            })
            .collect::<RankspecResult<Vec<_>>>()?;
        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn n(&self) -> usize {
        self.labels.len()
    }

    /// Label at 1-based position `i`.
    pub fn label(&self, i: usize) -> Option<usize> {
        i.checked_sub(1).and_then(|idx| self.labels.get(idx)).copied()
    }

    /// Shape implied by the label counts.
    pub fn shape(&self) -> RankspecResult<Shape> {
        if self.labels.contains(&0) {
            return Err(RankspecError::InvalidShape(format!(
                "label 0 in tabloid {self}"
            )));
        }
        let max = self.labels.iter().copied().max().unwrap_or(0);
        // n positions hold at most n distinct labels without a gap.
        if max > self.labels.len() {
            return Err(RankspecError::InvalidShape(format!(
                "label {max} in tabloid of {} positions",
                self.labels.len()
            )));
        }
        let mut counts = vec![0usize; max];
        for &l in &self.labels {
            counts[l - 1] += 1;
        }
        Shape::new(counts)
    }

    /// 1-based positions carrying `label`.
    pub fn block(&self, label: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == label)
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// Exchange the labels at 1-based positions `i` and `j`.
    pub fn swap(&self, i: usize, j: usize) -> RankspecResult<Tabloid> {
        let n = self.labels.len();
        if i == 0 || j == 0 || i > n || j > n {
            return Err(RankspecError::IndexOutOfRange(format!(
                "transposition ({i} {j}) on {n} positions"
            )));
        }
        let mut labels = self.labels.clone();
        labels.swap(i - 1, j - 1);
        Ok(Tabloid { labels })
    }

    /// Move position `i` (1-based) into block `label`.
    pub fn relabel(&self, i: usize, label: usize) -> RankspecResult<Tabloid> {
        let n = self.labels.len();
        if i == 0 || i > n {
            return Err(RankspecError::IndexOutOfRange(format!(
                "position {i} of {n}"
            )));
        }
        let mut labels = self.labels.clone();
        labels[i - 1] = label;
        Ok(Tabloid { labels })
    }

    pub fn to_vector(&self) -> Vector {
        self.labels.iter().map(|&l| Scalar::Real(l as f64)).collect()
    }

    pub fn rank(&self) -> RankspecResult<usize> {
        rank(self)
    }
}

impl fmt::Display for Tabloid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.labels.iter().map(usize::to_string).collect();
        write!(f, "[{}]", labels.join(","))
    }
}

impl std::str::FromStr for Tabloid {
    type Err = RankspecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Tabloid::new(parse_list(s)?))
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// 1-based rank of a tabloid among all tabloids of its shape.
pub fn rank(tabloid: &Tabloid) -> RankspecResult<usize> {
    let shape = tabloid.shape()?;
    let parts = shape.parts();
    let labels = tabloid.labels();

    let mut free: Vec<usize> = (0..labels.len()).collect();
    let mut acc: u64 = 0;
    for (level, &count) in parts.iter().enumerate() {
        let label = level + 1;
        let place = multinomial(&parts[level + 1..]);
        let len = free.len();
        let mut need = count;
        let mut digit: u64 = 0;
        for (idx, &pos) in free.iter().enumerate() {
            if need == 0 {
                break;
            }
            if labels[pos] == label {
                digit += choose(len - idx - 1, need);
                need -= 1;
            }
        }
        acc = digit
            .checked_mul(place)
            .and_then(|d| acc.checked_add(d))
            .ok_or_else(|| {
                RankspecError::IndexOutOfRange(format!("rank of {tabloid} overflows"))
            })?;
        free.retain(|&p| labels[p] != label);
    }
    usize::try_from(acc)
        .ok()
        .and_then(|r| r.checked_add(1))
        .ok_or_else(|| RankspecError::IndexOutOfRange(format!("rank of {tabloid} overflows")))
}

/// Tabloid of the given shape with 1-based rank `rank`.
pub fn unrank(rank: usize, shape: &Shape) -> RankspecResult<Tabloid> {
    let size = shape.size();
    if rank == 0 || rank > size {
        return Err(RankspecError::IndexOutOfRange(format!(
            "rank {rank} outside 1..={size} for shape {shape}"
        )));
    }
    let parts = shape.parts();
    let n = shape.n();

    let mut labels = vec![0usize; n];
    let mut free: Vec<usize> = (0..n).collect();
    let mut rem = (rank - 1) as u64;
    for (level, &count) in parts.iter().enumerate() {
        let label = level + 1;
        let place = multinomial(&parts[level + 1..]);
        let mut digit = rem / place;
        rem %= place;
        let len = free.len();
        let mut need = count;
        for (idx, &pos) in free.iter().enumerate() {
            if need == 0 {
                break;
            }
            let c = choose(len - idx - 1, need);
            if c <= digit {
                labels[pos] = label;
                digit -= c;
                need -= 1;
            }
        }
        free.retain(|&p| labels[p] == 0);
    }
    Ok(Tabloid { labels })
}

/// Lazily walk the tabloids of `shape` in rank order.
pub fn tabloids(shape: &Shape) -> impl Iterator<Item = RankspecResult<Tabloid>> + '_ {
    (1..=shape.size()).map(move |r| unrank(r, shape))
}

/// Every tabloid of `shape`, in rank order.
pub fn all_tabloids(shape: &Shape) -> RankspecResult<Vec<Tabloid>> {
    tabloids(shape).collect()
}

/// Tabloids of `shape` as matrix rows: row r holds the labels of `unrank(r)`.
pub fn tabloid_matrix(shape: &Shape) -> RankspecResult<DenseMatrix> {
    let rows = all_tabloids(shape)?
        .iter()
        .map(|t| t.to_vector().into_inner())
        .collect();
    DenseMatrix::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::MatrixView;
    use proptest::prelude::*;

    fn shape(parts: &[usize]) -> Shape {
        Shape::new(parts.to_vec()).unwrap()
    }

    #[test]
    fn test_choose_and_friends() {
        assert_eq!(choose(4, 2), 6);
        assert_eq!(choose(5, 0), 1);
        assert_eq!(choose(3, 4), 0);
        assert_eq!(choose(16, 8), 12870);
        assert_eq!(factorial(0), 1);
        assert_eq!(factorial(5), 120);
        assert_eq!(multinomial(&[2, 1, 1]), 12);
        assert_eq!(multinomial(&[]), 1);
    }

    #[test]
    fn test_large_counts_do_not_overflow() {
        assert_eq!(checked_choose(66, 33), Some(7_219_428_434_016_265_740));
        assert_eq!(checked_choose(68, 34), None);
        assert_eq!(checked_choose(140, 70), None);
        assert_eq!(choose(140, 70), u64::MAX);
        assert_eq!(checked_multinomial(&[34, 34]), None);

        assert_eq!(shape(&[33, 33]).size(), 7_219_428_434_016_265_740);
        assert!(matches!(
            Shape::new(vec![70, 70]),
            Err(RankspecError::InvalidShape(_))
        ));
        assert!("70,70".parse::<Shape>().is_err());

        let s = shape(&[33, 33]);
        let last = unrank(s.size(), &s).unwrap();
        assert_eq!(rank(&last).unwrap(), s.size());
    }

    #[test]
    fn test_oversized_label_rejected_before_counting() {
        let t: Tabloid = "1,4000000000".parse().unwrap();
        assert!(matches!(t.shape(), Err(RankspecError::InvalidShape(_))));
        assert!(rank(&t).is_err());
        assert!(Tabloid::new(vec![1, 3, 1]).shape().is_err());
        assert_eq!(Tabloid::new(vec![2, 1]).shape().unwrap(), shape(&[1, 1]));
    }

    #[test]
    fn test_shape_validation() {
        assert!(matches!(Shape::new(vec![]), Err(RankspecError::InvalidShape(_))));
        assert!(matches!(Shape::new(vec![2, 0]), Err(RankspecError::InvalidShape(_))));
        assert!(matches!(Shape::new(vec![1, 2]), Err(RankspecError::InvalidShape(_))));
        assert!(Shape::with_total(vec![2, 1], 4).is_err());
        assert_eq!(Shape::with_total(vec![2, 1], 3).unwrap().size(), 3);
        assert_eq!(Shape::two_row(5, 2).unwrap(), shape(&[3, 2]));
        assert_eq!(Shape::two_row(5, 0).unwrap(), shape(&[5]));
        assert!(Shape::two_row(5, 3).is_err());
    }

    #[test]
    fn test_refine() {
        assert_eq!(shape(&[3, 2]).refine().unwrap(), shape(&[4, 1]));
        assert_eq!(shape(&[4, 1]).refine().unwrap(), shape(&[5]));
        assert_eq!(shape(&[2, 2, 2]).refine().unwrap(), shape(&[3, 2, 1]));
        assert!(shape(&[5]).refine().is_err());
    }

    #[test]
    fn test_rank_of_identity_word_is_last() {
        let t = Tabloid::new(vec![1, 2, 3]);
        assert_eq!(rank(&t).unwrap(), 6);
        assert_eq!(rank(&Tabloid::new(vec![3, 2, 1])).unwrap(), 1);
    }

    #[test]
    fn test_two_row_order() {
        let s = shape(&[2, 1]);
        let all = all_tabloids(&s).unwrap();
        assert_eq!(
            all,
            vec![
                Tabloid::new(vec![2, 1, 1]),
                Tabloid::new(vec![1, 2, 1]),
                Tabloid::new(vec![1, 1, 2]),
            ]
        );
    }

    #[test]
    fn test_unrank_out_of_range() {
        let s = shape(&[2, 2]);
        assert!(matches!(unrank(0, &s), Err(RankspecError::IndexOutOfRange(_))));
        assert!(matches!(unrank(7, &s), Err(RankspecError::IndexOutOfRange(_))));
        assert!(unrank(6, &s).is_ok());
    }

    #[test]
    fn test_bad_tabloids() {
        assert!(matches!(
            rank(&Tabloid::new(vec![1, 0, 2])),
            Err(RankspecError::InvalidShape(_))
        ));
        // label 2 missing
        assert!(rank(&Tabloid::new(vec![1, 3, 1])).is_err());
        // counts (1, 2) are not a partition
        assert!(rank(&Tabloid::new(vec![1, 2, 2])).is_err());
    }

    #[test]
    fn test_bijection_exhaustive_small_n() {
        let shapes: &[&[usize]] = &[
            &[1],
            &[1, 1],
            &[2, 1],
            &[1, 1, 1],
            &[2, 2],
            &[3, 1],
            &[2, 1, 1],
            &[3, 2],
            &[2, 2, 1],
            &[3, 1, 1],
            &[2, 1, 1, 1],
        ];
        for parts in shapes {
            let s = shape(parts);
            let mut seen = std::collections::HashSet::new();
            for r in 1..=s.size() {
                let t = unrank(r, &s).unwrap();
                assert_eq!(t.shape().unwrap(), s);
                assert_eq!(rank(&t).unwrap(), r, "shape {s} rank {r}");
                assert!(seen.insert(t));
            }
        }
    }

    #[test]
    fn test_lazy_walk_matches_collected() {
        let s = shape(&[3, 2]);
        let mut walk = tabloids(&s);
        assert_eq!(walk.next().unwrap().unwrap().rank().unwrap(), 1);
        assert_eq!(walk.count(), s.size() - 1);
    }

    #[test]
    fn test_tabloid_matrix() {
        let s = shape(&[1, 1, 1]);
        let m = tabloid_matrix(&s).unwrap();
        assert_eq!(m.dims(), (6, 3));
        let last = Tabloid::from_vector(&m.row(6).unwrap()).unwrap();
        assert_eq!(last, Tabloid::new(vec![1, 2, 3]));
    }

    #[test]
    fn test_from_vector_rejects_non_labels() {
        assert!(Tabloid::from_vector(&Vector::from_reals(&[1.0, 1.5])).is_err());
        assert!(Tabloid::from_vector(&Vector::from_reals(&[0.0, 1.0])).is_err());
    }

    #[test]
    fn test_parse() {
        let s: Shape = "3,2".parse().unwrap();
        assert_eq!(s, shape(&[3, 2]));
        let t: Tabloid = "[1,2,1]".parse().unwrap();
        assert_eq!(t.labels(), &[1, 2, 1]);
        assert_eq!(t.block(1), vec![1, 3]);
        assert_eq!(t.swap(1, 2).unwrap().labels(), &[2, 1, 1]);
        assert!("3,x".parse::<Shape>().is_err());
    }

    fn arb_tabloid() -> impl Strategy<Value = Tabloid> {
        (1usize..5, 1usize..4, 0usize..3, 0usize..2).prop_flat_map(|(a, b, c, d)| {
            let mut parts = vec![a + b + c + d, b + c + d];
            if c > 0 {
                parts.push(c + d);
            }
            let labels: Vec<usize> = parts
                .iter()
                .enumerate()
                .flat_map(|(i, &p)| std::iter::repeat(i + 1).take(p))
                .collect();
            Just(labels).prop_shuffle().prop_map(Tabloid::new)
        })
    }

    proptest! {
        #[test]
        fn prop_unrank_inverts_rank(t in arb_tabloid()) {
            let s = t.shape().unwrap();
            let r = rank(&t).unwrap();
            prop_assert!(r >= 1 && r <= s.size());
            prop_assert_eq!(unrank(r, &s).unwrap(), t);
        }
    }
}
