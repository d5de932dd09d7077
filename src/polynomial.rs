//! Univariate polynomials with rational coefficients.

use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};

use crate::expr::{Expr, Rational};
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Highest degree `Poly::from_expr` will build. Larger powers stay symbolic.
pub const MAX_DEGREE: usize = 256;

/// Sparse polynomial in a single variable, keyed by degree. Zero
/// coefficients are never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    terms: BTreeMap<usize, Rational>,
}

impl Poly {
    pub fn zero() -> Self {
        Poly {
            terms: BTreeMap::new(),
        }
    }

    pub fn one() -> Self {
        Poly::from_constant(Rational::one())
    }

    pub fn from_constant(c: Rational) -> Self {
        Poly::term(0, c)
    }

    fn term(degree: usize, c: Rational) -> Self {
        let mut p = Poly::zero();
        p.add_term(degree, c);
        p
    }

    fn add_term(&mut self, degree: usize, c: Rational) {
        if c.is_zero() {
            return;
        }
        let sum = match self.terms.remove(&degree) {
            Some(existing) => existing + c,
            None => c,
        };
        if !sum.is_zero() {
            self.terms.insert(degree, sum);
        }
    }

    pub fn degree(&self) -> Option<usize> {
        self.terms.keys().next_back().copied()
    }

    pub fn leading_coeff(&self) -> Rational {
        self.terms
            .values()
            .next_back()
            .cloned()
            .unwrap_or_else(Rational::zero)
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_one(&self) -> bool {
        *self == Poly::one()
    }

    pub fn coeff(&self, degree: usize) -> Rational {
        self.terms.get(&degree).cloned().unwrap_or_else(Rational::zero)
    }

    /// `self^exp` by repeated squaring.
    pub fn pow(&self, exp: usize) -> Self {
        let mut acc = Poly::one();
        let mut square = self.clone();
        let mut rest = exp;
        while rest > 0 {
            if rest & 1 == 1 {
                acc = acc * square.clone();
            }
            rest >>= 1;
            if rest > 0 {
                square = square.clone() * square;
            }
        }
        acc
    }

    pub fn scale(&self, k: &Rational) -> Self {
        let mut out = Poly::zero();
        for (d, c) in &self.terms {
            out.add_term(*d, c * k);
        }
        out
    }

    pub fn monic(&self) -> Self {
        let lc = self.leading_coeff();
        if lc.is_zero() {
            self.clone()
        } else {
            self.scale(&lc.recip())
        }
    }

    /// Long division: `self == q * divisor + r` with `deg r < deg divisor`.
    /// Dividing by zero yields a zero quotient and `self` as the remainder.
    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        let Some(dd) = divisor.degree() else {
            return (Poly::zero(), self.clone());
        };
        let lc = divisor.leading_coeff();
        let mut quotient = Poly::zero();
        let mut rem = self.clone();
        while let Some(rd) = rem.degree().filter(|rd| *rd >= dd) {
            let step = Poly::term(rd - dd, rem.leading_coeff() / &lc);
            rem = rem - step.clone() * divisor.clone();
            quotient = quotient + step;
        }
        (quotient, rem)
    }

    pub fn div_exact(&self, divisor: &Self) -> Option<Self> {
        let (q, r) = self.div_rem(divisor);
        if r.is_zero() {
            Some(q)
        } else {
            None
        }
    }

    /// Monic greatest common divisor.
    pub fn gcd(a: &Poly, b: &Poly) -> Poly {
        let (mut x, mut y) = (a.clone(), b.clone());
        while !y.is_zero() {
            let r = x.div_rem(&y).1;
            x = std::mem::replace(&mut y, r);
        }
        x.monic()
    }

    /// Read `expr` as a polynomial in `var`. Fails on anything that is not a
    /// finite combination of sums, products, rational scalings and
    /// non-negative integer powers, or whose degree exceeds [`MAX_DEGREE`].
    pub fn from_expr(expr: &Expr, var: &str) -> Option<Self> {
        if !expr.contains_var(var) {
            return rational_value(expr).map(Poly::from_constant);
        }
        let p = match expr {
            Expr::Variable(_) => Poly::term(1, Rational::one()),
            Expr::Neg(a) => -Self::from_expr(a, var)?,
            Expr::Add(a, b) => Self::from_expr(a, var)? + Self::from_expr(b, var)?,
            Expr::Sub(a, b) => Self::from_expr(a, var)? - Self::from_expr(b, var)?,
            Expr::Mul(a, b) => Self::from_expr(a, var)? * Self::from_expr(b, var)?,
            Expr::Div(a, b) => {
                let d = rational_value(b)?;
                if d.is_zero() {
                    return None;
                }
                Self::from_expr(a, var)?.scale(&d.recip())
            }
            Expr::Pow(base, exp) => {
                let k = rational_value(exp)?;
                if !k.is_integer() || k.is_negative() {
                    return None;
                }
                let k = k.to_integer().to_usize()?;
                let base = Self::from_expr(base, var)?;
                if base.degree().unwrap_or(0).checked_mul(k)? > MAX_DEGREE {
                    return None;
                }
                base.pow(k)
            }
            _ => return None,
        };
        if p.degree().unwrap_or(0) > MAX_DEGREE {
            return None;
        }
        Some(p)
    }

    /// The polynomial as an expression in `var`, lowest degree first.
    pub fn to_expr(&self, var: &str) -> Expr {
        self.terms
            .iter()
            .map(|(d, c)| monomial_expr(*d, c, var))
            .reduce(|acc, t| Expr::Add(acc.boxed(), t.boxed()))
            .unwrap_or_else(|| Expr::integer(0))
    }
}

fn monomial_expr(degree: usize, c: &Rational, var: &str) -> Expr {
    let x = Expr::var(var);
    let power = match degree {
        0 => return Expr::Constant(c.clone()),
        1 => x,
        d => Expr::Pow(x.boxed(), Expr::integer(d).boxed()),
    };
    if c.is_one() {
        power
    } else {
        Expr::Mul(Expr::Constant(c.clone()).boxed(), power.boxed())
    }
}

fn rational_value(expr: &Expr) -> Option<Rational> {
    match expr {
        Expr::Constant(c) => Some(c.clone()),
        Expr::Neg(inner) => rational_value(inner).map(|c| -c),
        _ => None,
    }
}

impl Add for Poly {
    type Output = Poly;

    fn add(mut self, rhs: Poly) -> Poly {
        for (d, c) in rhs.terms {
            self.add_term(d, c);
        }
        self
    }
}

impl Sub for Poly {
    type Output = Poly;

    fn sub(self, rhs: Poly) -> Poly {
        self + -rhs
    }
}

impl Mul for Poly {
    type Output = Poly;

    fn mul(self, rhs: Poly) -> Poly {
        let mut out = Poly::zero();
        for (da, ca) in &self.terms {
            for (db, cb) in &rhs.terms {
                out.add_term(da + db, ca * cb);
            }
        }
        out
    }
}

impl Neg for Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        Poly {
            terms: self.terms.into_iter().map(|(d, c)| (d, -c)).collect(),
        }
    }
}
