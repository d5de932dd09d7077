//! Expression tree definitions and helpers.

use std::collections::BTreeSet;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

pub type Rational = BigRational;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Expr {
    Variable(String),
    Constant(Rational),
    Pi,
    Infinity,
    /// Result of an indeterminate form such as `oo - oo` or `0*oo`.
    Undefined,
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Tan(Box<Expr>),
    Sec(Box<Expr>),
    Csc(Box<Expr>),
    Cot(Box<Expr>),
    Atan(Box<Expr>),
    Asin(Box<Expr>),
    Acos(Box<Expr>),
    Asec(Box<Expr>),
    Acsc(Box<Expr>),
    Acot(Box<Expr>),
    Sinh(Box<Expr>),
    Cosh(Box<Expr>),
    Tanh(Box<Expr>),
    Asinh(Box<Expr>),
    Acosh(Box<Expr>),
    Atanh(Box<Expr>),
    Exp(Box<Expr>),
    Log(Box<Expr>),
    Abs(Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn constant(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Self {
        Expr::Constant(Rational::new(num.into(), den.into()))
    }

    pub fn integer(value: impl Into<BigInt>) -> Self {
        Expr::Constant(Rational::from_integer(value.into()))
    }

    pub fn rational(value: Rational) -> Self {
        Expr::Constant(value)
    }

    /// Euler's number, stored as `exp(1)` so that `E^x` and `exp(x)` coincide.
    pub fn euler() -> Self {
        Expr::Exp(one().boxed())
    }

    pub fn negate(self) -> Self {
        match self {
            Expr::Constant(r) => Expr::Constant(-r),
            Expr::Neg(inner) => *inner,
            other => Expr::Neg(Box::new(other)),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Constant(r) if r.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Constant(r) if r.is_one())
    }

    pub fn is_euler(&self) -> bool {
        matches!(self, Expr::Exp(arg) if arg.is_one())
    }

    pub fn as_variable(&self) -> Option<&str> {
        if let Expr::Variable(name) = self {
            Some(name)
        } else {
            None
        }
    }

    pub fn as_constant(&self) -> Option<&Rational> {
        if let Expr::Constant(c) = self {
            Some(c)
        } else {
            None
        }
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Argument of a single-argument function node, `None` for everything else.
    pub fn function_arg(&self) -> Option<&Expr> {
        match self {
            Expr::Sin(a)
            | Expr::Cos(a)
            | Expr::Tan(a)
            | Expr::Sec(a)
            | Expr::Csc(a)
            | Expr::Cot(a)
            | Expr::Atan(a)
            | Expr::Asin(a)
            | Expr::Acos(a)
            | Expr::Asec(a)
            | Expr::Acsc(a)
            | Expr::Acot(a)
            | Expr::Sinh(a)
            | Expr::Cosh(a)
            | Expr::Tanh(a)
            | Expr::Asinh(a)
            | Expr::Acosh(a)
            | Expr::Atanh(a)
            | Expr::Exp(a)
            | Expr::Log(a)
            | Expr::Abs(a) => Some(a),
            _ => None,
        }
    }

    /// Rebuild a function node of the same kind around a new argument.
    /// Non-function nodes are returned unchanged.
    pub fn with_function_arg(&self, arg: Expr) -> Expr {
        let arg = arg.boxed();
        match self {
            Expr::Sin(_) => Expr::Sin(arg),
            Expr::Cos(_) => Expr::Cos(arg),
            Expr::Tan(_) => Expr::Tan(arg),
            Expr::Sec(_) => Expr::Sec(arg),
            Expr::Csc(_) => Expr::Csc(arg),
            Expr::Cot(_) => Expr::Cot(arg),
            Expr::Atan(_) => Expr::Atan(arg),
            Expr::Asin(_) => Expr::Asin(arg),
            Expr::Acos(_) => Expr::Acos(arg),
            Expr::Asec(_) => Expr::Asec(arg),
            Expr::Acsc(_) => Expr::Acsc(arg),
            Expr::Acot(_) => Expr::Acot(arg),
            Expr::Sinh(_) => Expr::Sinh(arg),
            Expr::Cosh(_) => Expr::Cosh(arg),
            Expr::Tanh(_) => Expr::Tanh(arg),
            Expr::Asinh(_) => Expr::Asinh(arg),
            Expr::Acosh(_) => Expr::Acosh(arg),
            Expr::Atanh(_) => Expr::Atanh(arg),
            Expr::Exp(_) => Expr::Exp(arg),
            Expr::Log(_) => Expr::Log(arg),
            Expr::Abs(_) => Expr::Abs(arg),
            other => other.clone(),
        }
    }

    /// Names of every variable appearing in the expression.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        collect_symbols(self, &mut out);
        out
    }

    pub fn contains_var(&self, var: &str) -> bool {
        match self {
            Expr::Variable(v) => v == var,
            Expr::Constant(_) | Expr::Pi | Expr::Infinity | Expr::Undefined => false,
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => a.contains_var(var) || b.contains_var(var),
            Expr::Neg(inner) => inner.contains_var(var),
            other => other.function_arg().is_some_and(|a| a.contains_var(var)),
        }
    }

    /// Node count, used to bound the work done by the normalizer.
    pub fn size(&self) -> usize {
        match self {
            Expr::Variable(_)
            | Expr::Constant(_)
            | Expr::Pi
            | Expr::Infinity
            | Expr::Undefined => 1,
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => 1 + a.size() + b.size(),
            Expr::Neg(inner) => 1 + inner.size(),
            other => 1 + other.function_arg().map_or(0, Expr::size),
        }
    }
}

fn collect_symbols(expr: &Expr, out: &mut BTreeSet<String>) {
    match expr {
        Expr::Variable(name) => {
            out.insert(name.clone());
        }
        Expr::Constant(_) | Expr::Pi | Expr::Infinity | Expr::Undefined => {}
        Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) | Expr::Pow(a, b) => {
            collect_symbols(a, out);
            collect_symbols(b, out);
        }
        Expr::Neg(inner) => collect_symbols(inner, out),
        other => {
            if let Some(arg) = other.function_arg() {
                collect_symbols(arg, out);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::pretty(self))
    }
}

pub fn zero() -> Expr {
    Expr::Constant(Rational::zero())
}

pub fn one() -> Expr {
    Expr::Constant(Rational::one())
}

pub fn rational(num: i64, den: i64) -> Rational {
    Rational::new(num.into(), den.into())
}

pub fn pow(base: Expr, exp: Expr) -> Expr {
    Expr::Pow(base.boxed(), exp.boxed())
}

pub fn add(a: Expr, b: Expr) -> Expr {
    Expr::Add(a.boxed(), b.boxed())
}

pub fn sub(a: Expr, b: Expr) -> Expr {
    Expr::Sub(a.boxed(), b.boxed())
}

pub fn mul(a: Expr, b: Expr) -> Expr {
    Expr::Mul(a.boxed(), b.boxed())
}

pub fn div(a: Expr, b: Expr) -> Expr {
    Expr::Div(a.boxed(), b.boxed())
}

pub fn neg(a: Expr) -> Expr {
    Expr::Neg(a.boxed())
}
