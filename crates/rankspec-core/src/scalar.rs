//! Real and complex scalars with tolerance-based equality.
//!
//! A [`Scalar`] is either a real `f64` or a [`Complex64`]. Every binary
//! operation promotes: two reals give a real, anything involving a complex
//! operand gives a complex. Equality is approximate by default, with each
//! component allowed to differ by at most [`EPSILON`].

use std::cmp::Ordering;
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{RankspecError, RankspecResult};

/// Process-wide tolerance used by non-strict comparisons.
pub const EPSILON: f64 = 1e-4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Real(f64),
    Complex(Complex64),
}

/// Principal argument of a scalar. The origin has no angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Argument {
    Radians(f64),
    Undefined,
}

impl Argument {
    pub fn radians(&self) -> Option<f64> {
        match self {
            Self::Radians(r) => Some(*r),
            Self::Undefined => None,
        }
    }

    pub fn degrees(&self) -> Option<f64> {
        self.radians().map(f64::to_degrees)
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Radians(_))
    }
}

impl Scalar {
    /// Build a scalar from a real part and an optional imaginary part.
    pub fn new(re: f64, im: Option<f64>) -> Self {
        match im {
            Some(im) => Self::Complex(Complex64::new(re, im)),
            None => Self::Real(re),
        }
    }

    pub fn complex(re: f64, im: f64) -> Self {
        Self::Complex(Complex64::new(re, im))
    }

    pub fn zero() -> Self {
        Self::Real(0.0)
    }

    pub fn one() -> Self {
        Self::Real(1.0)
    }

    pub fn re(&self) -> f64 {
        match self {
            Self::Real(x) => *x,
            Self::Complex(z) => z.re,
        }
    }

    pub fn im(&self) -> f64 {
        match self {
            Self::Real(_) => 0.0,
            Self::Complex(z) => z.im,
        }
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Self::Real(_))
    }

    pub fn to_complex(&self) -> Complex64 {
        match self {
            Self::Real(x) => Complex64::new(*x, 0.0),
            Self::Complex(z) => *z,
        }
    }

    /// Exact zero test (both components), used where sparsity is enforced.
    pub fn is_zero(&self) -> bool {
        self.re() == 0.0 && self.im() == 0.0
    }

    /// Zero of the same kind as `self`.
    fn zero_like(&self) -> Self {
        match self {
            Self::Real(_) => Self::Real(0.0),
            Self::Complex(_) => Self::complex(0.0, 0.0),
        }
    }

    fn one_like(&self) -> Self {
        match self {
            Self::Real(_) => Self::Real(1.0),
            Self::Complex(_) => Self::complex(1.0, 0.0),
        }
    }

    pub fn divide(self, rhs: Scalar) -> RankspecResult<Scalar> {
        if rhs.modulus() == 0.0 {
            return Err(RankspecError::DivisionByZero);
        }
        Ok(match (self, rhs) {
            (Self::Real(a), Self::Real(b)) => Self::Real(a / b),
            (a, b) => Self::Complex(a.to_complex() / b.to_complex()),
        })
    }

    /// Integer power by repeated multiplication. `x^0` is one for every `x`.
    pub fn pow(self, exp: u32) -> Scalar {
        let mut acc = self.one_like();
        for _ in 0..exp {
            acc = acc * self;
        }
        acc
    }

    pub fn exp(self) -> Scalar {
        match self {
            Self::Real(x) => Self::Real(x.exp()),
            Self::Complex(z) => Self::Complex(z.exp()),
        }
    }

    /// Logarithm in an arbitrary real base.
    ///
    /// Base 1 is undefined; base 0 yields zero. Logarithms of negative reals
    /// land on the principal branch and come back complex.
    pub fn log(self, base: f64) -> RankspecResult<Scalar> {
        if base == 1.0 {
            return Err(RankspecError::UndefinedOperation(
                "logarithm base 1".into(),
            ));
        }
        if base == 0.0 {
            return Ok(self.zero_like());
        }
        if base < 0.0 {
            return Err(RankspecError::UndefinedOperation(format!(
                "logarithm base {base}"
            )));
        }
        if self.is_zero() {
            return Err(RankspecError::UndefinedOperation("logarithm of zero".into()));
        }
        let ln_base = base.ln();
        Ok(match self {
            Self::Real(x) if x > 0.0 => Self::Real(x.ln() / ln_base),
            other => {
                let z = other.to_complex();
                let ln = Complex64::new(z.norm().ln(), z.arg());
                Self::Complex(ln / ln_base)
            }
        })
    }

    pub fn ln(self) -> RankspecResult<Scalar> {
        self.log(std::f64::consts::E)
    }

    /// Square root; negative reals give a purely imaginary result.
    pub fn sqrt(self) -> Scalar {
        match self {
            Self::Real(x) if x >= 0.0 => Self::Real(x.sqrt()),
            Self::Real(x) => Self::complex(0.0, (-x).sqrt()),
            Self::Complex(z) => Self::Complex(z.sqrt()),
        }
    }

    pub fn round(self) -> Scalar {
        match self {
            Self::Real(x) => Self::Real(x.round()),
            Self::Complex(z) => Self::complex(z.re.round(), z.im.round()),
        }
    }

    pub fn conj(self) -> Scalar {
        match self {
            Self::Real(x) => Self::Real(x),
            Self::Complex(z) => Self::Complex(z.conj()),
        }
    }

    /// Euclidean distance from the origin.
    pub fn modulus(&self) -> f64 {
        match self {
            Self::Real(x) => x.abs(),
            Self::Complex(z) => z.norm(),
        }
    }

    pub fn arg(&self) -> Argument {
        let (re, im) = (self.re(), self.im());
        if re == 0.0 && im == 0.0 {
            return Argument::Undefined;
        }
        if im == 0.0 {
            return Argument::Radians(if re > 0.0 { 0.0 } else { PI });
        }
        if re == 0.0 {
            return Argument::Radians(if im > 0.0 { PI / 2.0 } else { -PI / 2.0 });
        }
        let base = (im / re).atan();
        Argument::Radians(if re > 0.0 {
            base
        } else if im > 0.0 {
            base + PI
        } else {
            base - PI
        })
    }

    /// Compare two scalars. Non-strict comparison accepts a componentwise
    /// difference of at most [`EPSILON`].
    pub fn equal(a: Scalar, b: Scalar, strict: bool) -> bool {
        let (dr, di) = ((a.re() - b.re()).abs(), (a.im() - b.im()).abs());
        if strict {
            dr == 0.0 && di == 0.0
        } else {
            dr <= EPSILON && di <= EPSILON
        }
    }

    /// Total order that treats values inside the same ε-cell as equal.
    ///
    /// Real parts are compared first, imaginary parts break ties.
    pub fn tolerant_cmp(&self, other: &Scalar) -> Ordering {
        let bucket = |x: f64| (x / EPSILON).round();
        bucket(self.re())
            .total_cmp(&bucket(other.re()))
            .then_with(|| bucket(self.im()).total_cmp(&bucket(other.im())))
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Self::Real(x)
    }
}

impl From<Complex64> for Scalar {
    fn from(z: Complex64) -> Self {
        Self::Complex(z)
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        Scalar::equal(*self, *other, false)
    }
}

impl PartialEq<f64> for Scalar {
    fn eq(&self, other: &f64) -> bool {
        Scalar::equal(*self, Scalar::Real(*other), false)
    }
}

impl Add for Scalar {
    type Output = Scalar;

    fn add(self, rhs: Scalar) -> Scalar {
        match (self, rhs) {
            (Self::Real(a), Self::Real(b)) => Self::Real(a + b),
            (a, b) => Self::Complex(a.to_complex() + b.to_complex()),
        }
    }
}

impl AddAssign for Scalar {
    fn add_assign(&mut self, rhs: Scalar) {
        *self = *self + rhs;
    }
}

impl Sub for Scalar {
    type Output = Scalar;

    fn sub(self, rhs: Scalar) -> Scalar {
        match (self, rhs) {
            (Self::Real(a), Self::Real(b)) => Self::Real(a - b),
            (a, b) => Self::Complex(a.to_complex() - b.to_complex()),
        }
    }
}

impl Mul for Scalar {
    type Output = Scalar;

    fn mul(self, rhs: Scalar) -> Scalar {
        match (self, rhs) {
            (Self::Real(a), Self::Real(b)) => Self::Real(a * b),
            (a, b) => Self::Complex(a.to_complex() * b.to_complex()),
        }
    }
}

impl Neg for Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        match self {
            Self::Real(x) => Self::Real(-x),
            Self::Complex(z) => Self::Complex(-z),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num = |x: f64| match f.precision() {
            Some(p) => format!("{x:.p$}"),
            None => format!("{x}"),
        };
        let text = match self {
            Self::Real(x) => num(*x),
            Self::Complex(z) if z.im < 0.0 => format!("{}-{}i", num(z.re), num(-z.im)),
            Self::Complex(z) => format!("{}+{}i", num(z.re), num(z.im)),
        };
        f.write_str(&text)
    }
}
