use std::collections::HashMap;

use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::expr::{Expr, Rational};
use crate::polynomial::Poly;
use crate::simplify::{
    simplify_add, simplify_fully, simplify_mul, simplify_neg, simplify_pow, simplify_sub,
    MAX_FOLDED_EXPONENT,
};

/// Expressions above this node count are only simplified, not normalized.
const NORMALIZE_SIZE_LIMIT: usize = 160;

/// Structural canonicalization on top of [`simplify_fully`]: merges powers,
/// cancels common polynomial factors of rational functions and pulls the
/// leading coefficient out of powers of linear forms.
pub fn normalize(expr: Expr) -> Expr {
    normalize_with_limit(expr, NORMALIZE_SIZE_LIMIT)
}

pub fn normalize_with_limit(expr: Expr, size_limit: usize) -> Expr {
    Normalizer { size_limit }.run(simplify_fully(expr))
}

struct Normalizer {
    size_limit: usize,
}

impl Normalizer {
    fn run(&self, expr: Expr) -> Expr {
        if expr.size() > self.size_limit {
            return simplify_fully(expr);
        }
        match expr {
            Expr::Add(a, b) => simplify_add(self.run(*a), self.run(*b)),
            Expr::Sub(a, b) => simplify_sub(self.run(*a), self.run(*b)),
            Expr::Neg(inner) => simplify_neg(self.run(*inner)),
            Expr::Mul(_, _) | Expr::Div(_, _) => self.product(&expr),
            Expr::Pow(base, exp) => self.power(*base, *exp),
            other => match other.function_arg() {
                Some(arg) => {
                    let arg = self.run(arg.clone());
                    let arg = Linear::of(&arg).map_or(arg, Linear::into_expr);
                    other.with_function_arg(arg)
                }
                None => other,
            },
        }
    }

    fn product(&self, expr: &Expr) -> Expr {
        let (coeff, raw_factors) = split_product(expr);
        let mut parts = ProductParts::new(coeff);
        for factor in raw_factors {
            if parts.coeff.is_zero() {
                break;
            }
            let (inner_coeff, inner) = split_product(&self.run(factor));
            parts.coeff *= inner_coeff;
            inner.into_iter().for_each(|f| parts.absorb(f));
        }
        if parts.coeff.is_zero() {
            return Expr::Constant(Rational::zero());
        }

        if parts.opaque.is_empty() {
            if let Some(reduced) = parts.cancel_common_factor() {
                return reduced;
            }
        }
        parts.into_expr()
    }

    fn power(&self, base: Expr, exp: Expr) -> Expr {
        let base = self.run(base);
        let exp = self.run(exp);
        let factored = match (&exp, Linear::of(&base)) {
            (Expr::Constant(k), Some(linear)) if k.is_integer() => linear.factor_power(k),
            _ => None,
        };
        match factored {
            Some(expr) => simplify_fully(expr),
            None => simplify_pow(base, exp),
        }
    }
}

/// A product split into a rational coefficient, bases with rational
/// exponents, and factors whose exponent is not a number.
struct ProductParts {
    coeff: Rational,
    exponents: HashMap<Expr, Rational>,
    opaque: Vec<Expr>,
}

impl ProductParts {
    fn new(coeff: Rational) -> Self {
        ProductParts {
            coeff,
            exponents: HashMap::new(),
            opaque: Vec::new(),
        }
    }

    fn absorb(&mut self, factor: Expr) {
        match factor {
            Expr::Constant(c) => self.coeff *= c,
            Expr::Pow(base, exp) => match *exp {
                Expr::Constant(e) => add_exponent(&mut self.exponents, *base, e),
                exp => self.opaque.push(Expr::Pow(base, exp.boxed())),
            },
            other => add_exponent(&mut self.exponents, other, Rational::one()),
        }
    }

    /// Divide numerator and denominator by their polynomial gcd when the
    /// product is a univariate rational function.
    fn cancel_common_factor(&self) -> Option<Expr> {
        let mut numer = HashMap::new();
        let mut denom = HashMap::new();
        for (base, exp) in &self.exponents {
            if exp.is_negative() {
                denom.insert(base.clone(), -exp);
            } else if !exp.is_zero() {
                numer.insert(base.clone(), exp.clone());
            }
        }
        if denom.is_empty() {
            return None;
        }
        let numer = product_of(self.coeff.clone(), numer);
        let denom = product_of(Rational::one(), denom);
        if has_composite_power(&numer) || has_composite_power(&denom) {
            return None;
        }
        let (numer, denom) = cancel_polynomial_gcd(&numer, &denom)?;
        Some(rebuild_quotient(numer, denom))
    }

    fn into_expr(self) -> Expr {
        let product = product_of(self.coeff, self.exponents);
        self.opaque.into_iter().fold(product, simplify_mul)
    }
}

/// `slope * var + offset`; `var` is `None` for a plain constant.
#[derive(Clone, Debug)]
struct Linear {
    slope: Rational,
    offset: Rational,
    var: Option<String>,
}

impl Linear {
    fn constant(offset: Rational) -> Self {
        Linear {
            slope: Rational::zero(),
            offset,
            var: None,
        }
    }

    fn of(expr: &Expr) -> Option<Self> {
        match expr {
            Expr::Variable(v) => Some(Linear {
                slope: Rational::one(),
                offset: Rational::zero(),
                var: Some(v.clone()),
            }),
            Expr::Constant(c) => Some(Linear::constant(c.clone())),
            Expr::Neg(inner) => Linear::of(inner).map(Linear::negated),
            Expr::Mul(a, b) => match (&**a, &**b) {
                (Expr::Constant(c), Expr::Variable(v)) | (Expr::Variable(v), Expr::Constant(c)) => {
                    Some(Linear {
                        slope: c.clone(),
                        offset: Rational::zero(),
                        var: Some(v.clone()),
                    })
                }
                _ => None,
            },
            Expr::Add(a, b) => Linear::of(a)?.plus(Linear::of(b)?),
            Expr::Sub(a, b) => Linear::of(a)?.plus(Linear::of(b)?.negated()),
            _ => None,
        }
    }

    fn negated(self) -> Self {
        Linear {
            slope: -self.slope,
            offset: -self.offset,
            var: self.var,
        }
    }

    /// `None` when the two sides use different variables.
    fn plus(self, other: Linear) -> Option<Self> {
        let var = match (self.var, other.var) {
            (Some(a), Some(b)) if a != b => return None,
            (a, b) => a.or(b),
        };
        Some(Linear {
            slope: self.slope + other.slope,
            offset: self.offset + other.offset,
            var,
        })
    }

    /// Rebuild as `slope*var + offset` with the variable term first.
    fn into_expr(self) -> Expr {
        let var = match self.var {
            Some(v) if !self.slope.is_zero() => Expr::Variable(v),
            _ => return Expr::Constant(self.offset),
        };
        let term = simplify_mul(Expr::Constant(self.slope), var);
        if self.offset.is_zero() {
            term
        } else {
            simplify_add(term, Expr::Constant(self.offset))
        }
    }

    // (a*x + b)^n => a^n * (x + b/a)^n, unless a^n is too large to fold
    fn factor_power(self, exp: &Rational) -> Option<Expr> {
        let var = Expr::Variable(self.var?);
        if self.slope.is_zero() || self.slope.is_one() {
            return None;
        }
        let shift = self.offset / &self.slope;
        let monic = if shift.is_zero() {
            var
        } else {
            simplify_add(var, Expr::Constant(shift))
        };
        let scale = rational_power(&self.slope, exp)?;
        Some(simplify_mul(
            Expr::Constant(scale),
            simplify_pow(monic, Expr::Constant(exp.clone())),
        ))
    }
}

fn add_exponent(map: &mut HashMap<Expr, Rational>, base: Expr, exp: Rational) {
    *map.entry(base).or_insert_with(Rational::zero) += exp;
}

/// `coeff * prod(base^exp)` with bases in canonical order.
fn product_of(coeff: Rational, exponents: HashMap<Expr, Rational>) -> Expr {
    if coeff.is_zero() {
        return Expr::Constant(Rational::zero());
    }
    let mut powers: Vec<(Expr, Rational)> = exponents
        .into_iter()
        .filter(|(_, e)| !e.is_zero())
        .collect();
    powers.sort_by(|(a, _), (b, _)| a.cmp(b));
    powers
        .into_iter()
        .fold(Expr::Constant(coeff), |acc, (base, exp)| {
            simplify_mul(acc, simplify_pow(base, Expr::Constant(exp)))
        })
}

/// Split a product into its rational coefficient and remaining factors,
/// turning divisors into `-1` powers. A division by a literal zero is kept
/// whole.
fn split_product(expr: &Expr) -> (Rational, Vec<Expr>) {
    match expr {
        Expr::Constant(c) => (c.clone(), Vec::new()),
        Expr::Neg(inner) => {
            let (c, factors) = split_product(inner);
            (-c, factors)
        }
        Expr::Mul(a, b) => {
            let (ca, mut factors) = split_product(a);
            let (cb, rest) = split_product(b);
            factors.extend(rest);
            (ca * cb, factors)
        }
        Expr::Div(a, b) => {
            let (cb, divisors) = split_product(b);
            if cb.is_zero() {
                return (Rational::one(), vec![expr.clone()]);
            }
            let (ca, mut factors) = split_product(a);
            factors.extend(
                divisors
                    .into_iter()
                    .map(|d| Expr::Pow(d.boxed(), Expr::integer(-1).boxed())),
            );
            (ca / cb, factors)
        }
        other => (Rational::one(), vec![other.clone()]),
    }
}

fn rational_power(base: &Rational, exp: &Rational) -> Option<Rational> {
    if !exp.is_integer() {
        return None;
    }
    let n = exp.to_integer();
    let magnitude = n.abs().to_u32().filter(|m| *m <= MAX_FOLDED_EXPONENT)?;
    let raised = Rational::new(base.numer().pow(magnitude), base.denom().pow(magnitude));
    Some(if n.is_negative() { raised.recip() } else { raised })
}

/// Powers whose base is not a plain symbol or number block polynomial
/// conversion.
fn has_composite_power(expr: &Expr) -> bool {
    match expr {
        Expr::Pow(base, exp) => {
            !matches!(**base, Expr::Variable(_) | Expr::Constant(_))
                || has_composite_power(base)
                || has_composite_power(exp)
        }
        Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) => {
            has_composite_power(a) || has_composite_power(b)
        }
        Expr::Neg(inner) => has_composite_power(inner),
        other => other.function_arg().is_some_and(has_composite_power),
    }
}

fn cancel_polynomial_gcd(numer: &Expr, denom: &Expr) -> Option<(Expr, Expr)> {
    let mut vars = numer.free_symbols();
    vars.extend(denom.free_symbols());
    let var = match vars.len() {
        1 => vars.into_iter().next()?,
        _ => return None,
    };

    let p = Poly::from_expr(numer, &var)?;
    let q = Poly::from_expr(denom, &var)?;
    if q.is_zero() {
        return None;
    }
    if p.is_zero() {
        return Some((Expr::Constant(Rational::zero()), Expr::Constant(Rational::one())));
    }
    let gcd = Poly::gcd(&p, &q);
    if gcd.degree().unwrap_or(0) == 0 {
        return None;
    }

    let p = p.div_exact(&gcd)?;
    let q = q.div_exact(&gcd)?;
    let scale = p.leading_coeff() / q.leading_coeff();
    let numer = simplify_fully(p.monic().to_expr(&var));
    let denom = simplify_fully(q.monic().to_expr(&var));
    let numer = if scale.is_one() {
        numer
    } else {
        simplify_mul(Expr::Constant(scale), numer)
    };
    Some((numer, denom))
}

fn rebuild_quotient(numer: Expr, denom: Expr) -> Expr {
    if denom.is_one() {
        return numer;
    }
    let (c, factors) = split_product(&denom);
    if c.is_zero() {
        return Expr::Div(numer.boxed(), denom.boxed());
    }
    let mut exponents = HashMap::new();
    for factor in factors {
        match factor {
            Expr::Pow(base, exp) => match *exp {
                Expr::Constant(e) => add_exponent(&mut exponents, *base, e),
                exp => add_exponent(&mut exponents, Expr::Pow(base, exp.boxed()), Rational::one()),
            },
            other => add_exponent(&mut exponents, other, Rational::one()),
        }
    }
    let inverse = simplify_pow(product_of(Rational::one(), exponents), Expr::integer(-1));
    simplify_mul(simplify_mul(Expr::Constant(c.recip()), numer), inverse)
}
