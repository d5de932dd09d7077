//! LaTeX rendering of expressions.
//!
//! The output follows the conventions of common CAS printers: products are
//! juxtaposed, rational coefficients and negative powers form `\frac`, sums
//! list higher degree terms first and function arguments are wrapped in
//! `\left( \right)`.

use std::cmp::Ordering;

use num_traits::{One, Signed, Zero};

use crate::expr::{Expr, Rational};
use crate::simplify::{factors, flatten_sum, split_coeff};

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_ATOM: u8 = 4;

const GREEK: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "rho", "sigma", "tau", "upsilon", "phi", "chi", "psi", "omega",
    "Gamma", "Delta", "Theta", "Lambda", "Xi", "Pi", "Sigma", "Upsilon", "Phi", "Psi", "Omega",
];

pub fn latex(expr: &Expr) -> String {
    render(expr, 0)
}

fn render(expr: &Expr, ctx: u8) -> String {
    match expr {
        Expr::Variable(name) => symbol(name),
        Expr::Constant(r) => rational(r, ctx),
        Expr::Pi => r"\pi".to_string(),
        Expr::Infinity => r"\infty".to_string(),
        Expr::Undefined => r"\text{NaN}".to_string(),
        Expr::Add(_, _) | Expr::Sub(_, _) => paren_if(ctx > PREC_ADD, render_sum(expr)),
        Expr::Mul(_, _) | Expr::Div(_, _) | Expr::Neg(_) => render_product(expr, ctx),
        Expr::Pow(base, exp) => render_pow(expr, base, exp, ctx),
        Expr::Exp(arg) if arg.is_one() => "e".to_string(),
        Expr::Exp(arg) => paren_if(ctx > PREC_POW, format!("e^{{{}}}", render(arg, 0))),
        Expr::Abs(arg) => format!(r"\left|{{{}}}\right|", render(arg, 0)),
        other => {
            let arg = other.function_arg().map(|a| render(a, 0)).unwrap_or_default();
            format!(r"{}{{\left({arg} \right)}}", function_command(other))
        }
    }
}

fn paren_if(cond: bool, body: String) -> String {
    if cond {
        format!(r"\left({body}\right)")
    } else {
        body
    }
}

fn rational(r: &Rational, ctx: u8) -> String {
    if r.is_integer() {
        return paren_if(r.is_negative() && ctx > PREC_ADD, r.numer().to_string());
    }
    let body = format!(r"\frac{{{}}}{{{}}}", r.numer().abs(), r.denom());
    if r.is_negative() {
        paren_if(ctx > PREC_ADD, format!("- {body}"))
    } else {
        paren_if(ctx > PREC_POW, body)
    }
}

/// `alpha` → `\alpha`, `x_1` and `x1` → `x_{1}`.
fn symbol(name: &str) -> String {
    let (head, sub) = match name.split_once('_') {
        Some((head, sub)) if !head.is_empty() && !sub.is_empty() => (head, Some(sub)),
        _ => {
            let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
            if stem.is_empty() || stem.len() == name.len() {
                (name, None)
            } else {
                (stem, Some(&name[stem.len()..]))
            }
        }
    };
    let head = if GREEK.contains(&head) {
        format!(r"\{head}")
    } else {
        head.to_string()
    };
    match sub {
        Some(sub) => format!("{head}_{{{}}}", symbol(sub)),
        None => head,
    }
}

fn function_command(expr: &Expr) -> &'static str {
    match expr {
        Expr::Sin(_) => r"\sin",
        Expr::Cos(_) => r"\cos",
        Expr::Tan(_) => r"\tan",
        Expr::Sec(_) => r"\sec",
        Expr::Csc(_) => r"\csc",
        Expr::Cot(_) => r"\cot",
        Expr::Asin(_) => r"\operatorname{asin}",
        Expr::Acos(_) => r"\operatorname{acos}",
        Expr::Atan(_) => r"\operatorname{atan}",
        Expr::Asec(_) => r"\operatorname{asec}",
        Expr::Acsc(_) => r"\operatorname{acsc}",
        Expr::Acot(_) => r"\operatorname{acot}",
        Expr::Sinh(_) => r"\sinh",
        Expr::Cosh(_) => r"\cosh",
        Expr::Tanh(_) => r"\tanh",
        Expr::Asinh(_) => r"\operatorname{asinh}",
        Expr::Acosh(_) => r"\operatorname{acosh}",
        Expr::Atanh(_) => r"\operatorname{atanh}",
        Expr::Log(_) => r"\log",
        Expr::Exp(_) => r"\exp",
        _ => r"\operatorname{abs}",
    }
}

/// Functions written as `\sin^{2}{\left(x \right)}` when raised to a positive integer.
fn supports_power_prefix(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Sin(_)
            | Expr::Cos(_)
            | Expr::Tan(_)
            | Expr::Sec(_)
            | Expr::Csc(_)
            | Expr::Cot(_)
            | Expr::Sinh(_)
            | Expr::Cosh(_)
            | Expr::Tanh(_)
    )
}

fn render_pow(expr: &Expr, base: &Expr, exp: &Expr, ctx: u8) -> String {
    if let Expr::Constant(k) = exp {
        if k.is_negative() {
            return render_product(expr, ctx);
        }
        if k.numer().is_one() && !k.is_integer() {
            let body = render(base, 0);
            return if *k.denom() == 2.into() {
                format!(r"\sqrt{{{body}}}")
            } else {
                format!(r"\sqrt[{}]{{{body}}}", k.denom())
            };
        }
        if k.is_integer() && supports_power_prefix(base) {
            let arg = base.function_arg().map(|a| render(a, 0)).unwrap_or_default();
            let body = format!(
                r"{}^{{{}}}{{\left({arg} \right)}}",
                function_command(base),
                k.numer()
            );
            return paren_if(ctx > PREC_POW, body);
        }
    }

    if base.is_euler() {
        return paren_if(ctx > PREC_POW, format!("e^{{{}}}", render(exp, 0)));
    }

    let base_str = match base {
        Expr::Abs(_) => render(base, PREC_ATOM),
        Expr::Exp(_) => format!(r"\left({}\right)", render(base, 0)),
        f if f.function_arg().is_some() => format!(r"\left({}\right)", render(f, 0)),
        b => render(b, PREC_ATOM),
    };
    paren_if(ctx > PREC_POW, format!("{base_str}^{{{}}}", render(exp, 0)))
}

struct Fraction {
    coeff: Rational,
    numer: Vec<Expr>,
    denom: Vec<Expr>,
}

impl Fraction {
    fn collect(&mut self, expr: &Expr, inverted: bool) {
        match expr {
            Expr::Constant(r) if inverted && r.is_zero() => self.denom.push(expr.clone()),
            Expr::Constant(r) if inverted => self.coeff /= r,
            Expr::Constant(r) => self.coeff *= r,
            Expr::Neg(inner) => {
                self.coeff = -self.coeff.clone();
                self.collect(inner, inverted);
            }
            Expr::Mul(a, b) => {
                self.collect(a, inverted);
                self.collect(b, inverted);
            }
            Expr::Div(a, b) => {
                self.collect(a, inverted);
                self.collect(b, !inverted);
            }
            Expr::Pow(base, exp) => match &**exp {
                Expr::Constant(k) if k.is_negative() => {
                    let flipped = if (-k).is_one() {
                        (**base).clone()
                    } else {
                        Expr::Pow(base.clone(), Expr::Constant(-k).boxed())
                    };
                    self.collect(&flipped, !inverted);
                }
                _ => self.push(expr, inverted),
            },
            other => self.push(other, inverted),
        }
    }

    fn push(&mut self, expr: &Expr, inverted: bool) {
        if inverted {
            self.denom.push(expr.clone());
        } else {
            self.numer.push(expr.clone());
        }
    }
}

fn render_product(expr: &Expr, ctx: u8) -> String {
    let mut frac = Fraction {
        coeff: Rational::one(),
        numer: Vec::new(),
        denom: Vec::new(),
    };
    frac.collect(expr, false);

    let negative = frac.coeff.is_negative();
    let coeff = frac.coeff.abs();
    let mut numer = frac.numer;
    let mut denom = frac.denom;
    numer.sort_by(factor_order);
    denom.sort_by(factor_order);

    let p = Rational::from_integer(coeff.numer().clone());
    let q = Rational::from_integer(coeff.denom().clone());
    if !p.is_one() || numer.is_empty() {
        numer.insert(0, Expr::Constant(p));
    }
    if !q.is_one() {
        denom.insert(0, Expr::Constant(q));
    }

    let body = if denom.is_empty() {
        if numer.len() == 1 && !negative {
            return render(&numer[0], ctx);
        }
        join_factors(&numer, false)
    } else {
        format!(
            r"\frac{{{}}}{{{}}}",
            join_factors(&numer, true),
            join_factors(&denom, true)
        )
    };

    if negative {
        paren_if(ctx > PREC_ADD, format!("- {body}"))
    } else {
        paren_if(ctx > PREC_MUL, body)
    }
}

fn join_factors(items: &[Expr], in_frac: bool) -> String {
    if in_frac && items.len() == 1 {
        return render(&items[0], 0);
    }
    let mut out = String::new();
    for item in items {
        let s = render(item, PREC_MUL);
        if !out.is_empty() {
            if s.starts_with(|c: char| c.is_ascii_digit()) {
                out.push_str(r" \cdot ");
            } else {
                out.push(' ');
            }
        }
        out.push_str(&s);
    }
    out
}

fn factor_rank(expr: &Expr) -> (u8, String) {
    match expr {
        Expr::Constant(_) => (0, String::new()),
        Expr::Pi | Expr::Infinity | Expr::Undefined => (1, String::new()),
        Expr::Variable(name) => (2, name.clone()),
        Expr::Pow(base, _) => match &**base {
            Expr::Variable(name) => (2, name.clone()),
            _ => (3, String::new()),
        },
        _ => (3, String::new()),
    }
}

fn factor_order(a: &Expr, b: &Expr) -> Ordering {
    factor_rank(a).cmp(&factor_rank(b))
}

fn render_sum(expr: &Expr) -> String {
    let mut terms = flatten_sum(expr);
    terms.sort_by(term_order);

    let mut out = String::new();
    for term in &terms {
        let (negative, magnitude) = split_sign(term);
        let s = render(&magnitude, PREC_ADD);
        match (out.is_empty(), negative) {
            (true, false) => out.push_str(&s),
            (true, true) => out.push_str(&format!("- {s}")),
            (false, false) => out.push_str(&format!(" + {s}")),
            (false, true) => out.push_str(&format!(" - {s}")),
        }
    }
    out
}

fn split_sign(term: &Expr) -> (bool, Expr) {
    match term {
        Expr::Neg(inner) => {
            let (neg, magnitude) = split_sign(inner);
            (!neg, magnitude)
        }
        Expr::Constant(c) if c.is_negative() => (true, Expr::Constant(-c)),
        Expr::Mul(_, _) => {
            let (c, base) = split_coeff(term);
            if !c.is_negative() {
                return (false, term.clone());
            }
            let c = -c;
            let magnitude = if base.is_one() {
                Expr::Constant(c)
            } else if c.is_one() {
                base
            } else {
                Expr::Mul(Expr::Constant(c).boxed(), base.boxed())
            };
            (true, magnitude)
        }
        Expr::Div(a, b) => {
            let (neg, magnitude) = split_sign(a);
            (neg, Expr::Div(magnitude.boxed(), b.clone()))
        }
        other => (false, other.clone()),
    }
}

/// Terms that are monomials in the free symbols come first by descending
/// degree, then other symbolic terms, then pure constants.
fn term_rank(term: &Expr) -> (u8, Rational) {
    if term.free_symbols().is_empty() {
        return (2, Rational::zero());
    }
    let (_, base) = split_coeff(term);
    let mut degree = Rational::zero();
    for factor in factors(&base) {
        match factor {
            Expr::Variable(_) => degree += Rational::one(),
            Expr::Pow(b, e) if matches!(*b, Expr::Variable(_)) => match *e {
                Expr::Constant(k) => degree += k,
                _ => return (1, Rational::zero()),
            },
            Expr::Constant(_) | Expr::Pi => {}
            _ => return (1, Rational::zero()),
        }
    }
    (0, degree)
}

fn term_order(a: &Expr, b: &Expr) -> Ordering {
    let (class_a, deg_a) = term_rank(a);
    let (class_b, deg_b) = term_rank(b);
    class_a.cmp(&class_b).then_with(|| deg_b.cmp(&deg_a))
}
