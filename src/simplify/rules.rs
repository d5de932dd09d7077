use std::collections::{BTreeMap, HashMap};

use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::expr::{one, zero, Expr, Rational};

const DISTRIBUTE_TERM_LIMIT: usize = 64;

/// Integer powers of rationals are folded only up to this exponent; larger ones stay symbolic.
pub(crate) const MAX_FOLDED_EXPONENT: u32 = 4096;

pub const DEFAULT_ITERATIONS: usize = 64;

/// The sorted non-numeric factors of a term; like terms share a key.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
struct CanonKey(Vec<Expr>);

type Cache = HashMap<Expr, Expr>;

/// One bottom-up evaluation pass: constant folding, like-term collection and
/// the identities every parsed expression gets.
pub fn simplify(expr: Expr) -> Expr {
    simplify_cached(expr, &mut Cache::new())
}

fn simplify_cached(expr: Expr, cache: &mut Cache) -> Expr {
    if let Some(hit) = cache.get(&expr) {
        return hit.clone();
    }

    let key = expr.clone();
    let result = match expr {
        Expr::Add(a, b) => simplify_add(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Sub(a, b) => simplify_sub(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Mul(a, b) => simplify_mul(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Div(a, b) => simplify_div(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Pow(a, b) => simplify_pow(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Neg(a) => simplify_neg(simplify_cached(*a, cache)),
        Expr::Abs(a) => simplify_abs(simplify_cached(*a, cache)),
        other => match other.function_arg() {
            Some(arg) => {
                let arg = simplify_cached(arg.clone(), cache);
                simplify_function(other.with_function_arg(arg))
            }
            None => other,
        },
    };

    cache.insert(key, result.clone());
    result
}

enum Parity {
    Odd,
    Even,
    Neither,
}

fn parity(f: &Expr) -> Parity {
    match f {
        Expr::Sin(_)
        | Expr::Tan(_)
        | Expr::Cot(_)
        | Expr::Csc(_)
        | Expr::Asin(_)
        | Expr::Atan(_)
        | Expr::Sinh(_)
        | Expr::Tanh(_)
        | Expr::Asinh(_)
        | Expr::Atanh(_) => Parity::Odd,
        Expr::Cos(_) | Expr::Sec(_) | Expr::Cosh(_) => Parity::Even,
        _ => Parity::Neither,
    }
}

/// Identities for a function whose argument is already simplified.
fn simplify_function(f: Expr) -> Expr {
    let Some(arg) = f.function_arg() else {
        return f;
    };
    if *arg == Expr::Undefined {
        return Expr::Undefined;
    }
    if let Some(value) = special_value(&f, arg) {
        return value;
    }
    if let Some(inner) = inverse_pair(&f, arg) {
        return inner;
    }
    if let Expr::Neg(inner) = arg {
        let inner = (**inner).clone();
        match parity(&f) {
            Parity::Odd => return simplify_neg(f.with_function_arg(inner)),
            Parity::Even => return f.with_function_arg(inner),
            Parity::Neither => {}
        }
    }
    f
}

fn special_value(f: &Expr, arg: &Expr) -> Option<Expr> {
    let at_zero = is_zero(arg);
    let at_pi = *arg == Expr::Pi;
    let value = match f {
        Expr::Sin(_) | Expr::Tan(_) if at_zero || at_pi => 0,
        Expr::Cos(_) if at_pi => -1,
        Expr::Cos(_) | Expr::Sec(_) | Expr::Cosh(_) | Expr::Exp(_) if at_zero => 1,
        Expr::Asin(_)
        | Expr::Atan(_)
        | Expr::Sinh(_)
        | Expr::Tanh(_)
        | Expr::Asinh(_)
        | Expr::Atanh(_)
            if at_zero =>
        {
            0
        }
        Expr::Acos(_) | Expr::Log(_) if is_one(arg) => 0,
        _ => return None,
    };
    Some(Expr::integer(value))
}

// sin(asin(u)) == u and friends
fn inverse_pair(f: &Expr, arg: &Expr) -> Option<Expr> {
    match (f, arg) {
        (Expr::Sin(_), Expr::Asin(u))
        | (Expr::Cos(_), Expr::Acos(u))
        | (Expr::Tan(_), Expr::Atan(u))
        | (Expr::Exp(_), Expr::Log(u))
        | (Expr::Log(_), Expr::Exp(u)) => Some((**u).clone()),
        _ => None,
    }
}

fn simplify_abs(arg: Expr) -> Expr {
    match arg {
        Expr::Constant(c) => Expr::Constant(c.abs()),
        Expr::Neg(inner) => simplify_abs(*inner),
        x @ (Expr::Pi | Expr::Infinity | Expr::Undefined | Expr::Exp(_) | Expr::Abs(_)) => x,
        x => Expr::Abs(x.boxed()),
    }
}

/// Apply simplification passes until the expression stops changing or we hit the iteration cap.
pub fn simplify_fully(expr: Expr) -> Expr {
    simplify_with_limit(expr, DEFAULT_ITERATIONS)
}

/// Apply simplification passes up to `max_iters`, returning the last value if convergence is not reached.
pub fn simplify_with_limit(expr: Expr, max_iters: usize) -> Expr {
    let mut cache = Cache::new();
    let mut current = expr;
    for _ in 0..max_iters {
        let evaluated = simplify_cached(current.clone(), &mut cache);
        let next = simplify_trig_once(&evaluated, &mut cache);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

pub fn simplify_add(x: Expr, y: Expr) -> Expr {
    let mut terms = flatten_sum(&x);
    terms.extend(flatten_sum(&y));
    rebuild_sum(collect_terms(terms))
}

pub fn simplify_sub(x: Expr, y: Expr) -> Expr {
    simplify_add(x, simplify_neg(y))
}

/// The signed terms of a nested sum.
pub(crate) fn flatten_sum(expr: &Expr) -> Vec<Expr> {
    let mut terms = Vec::new();
    push_terms(expr, false, &mut terms);
    terms
}

fn push_terms(expr: &Expr, negate: bool, out: &mut Vec<Expr>) {
    match expr {
        Expr::Add(a, b) => {
            push_terms(a, negate, out);
            push_terms(b, negate, out);
        }
        Expr::Sub(a, b) => {
            push_terms(a, negate, out);
            push_terms(b, !negate, out);
        }
        Expr::Neg(inner) => push_terms(inner, !negate, out),
        term if negate => out.push(simplify_neg(term.clone())),
        term => out.push(term.clone()),
    }
}

fn sum_len(expr: &Expr) -> usize {
    match expr {
        Expr::Add(a, b) | Expr::Sub(a, b) => sum_len(a) + sum_len(b),
        Expr::Neg(inner) => sum_len(inner),
        _ => 1,
    }
}

/// Split a term into its rational coefficient and the remaining product.
pub(crate) fn split_coeff(expr: &Expr) -> (Rational, Expr) {
    match expr {
        Expr::Constant(c) => (c.clone(), one()),
        Expr::Neg(inner) => {
            let (c, rest) = split_coeff(inner);
            (-c, rest)
        }
        Expr::Mul(a, b) => {
            let (ca, ra) = split_coeff(a);
            let (cb, rb) = split_coeff(b);
            let mut all = factors(&ra);
            all.extend(factors(&rb));
            (ca * cb, mk_mul_list(all))
        }
        other => (Rational::one(), other.clone()),
    }
}

/// The multiplicative factors of `expr`, dropping literal ones.
pub(crate) fn factors(expr: &Expr) -> Vec<Expr> {
    match expr {
        Expr::Mul(a, b) => {
            let mut out = factors(a);
            out.extend(factors(b));
            out
        }
        t if is_one(t) => Vec::new(),
        t => vec![t.clone()],
    }
}

fn mul_from_sorted_factors(factors: &[Expr]) -> Expr {
    factors
        .iter()
        .cloned()
        .reduce(|acc, item| Expr::Mul(acc.boxed(), item.boxed()))
        .unwrap_or_else(one)
}

fn collect_terms(terms: Vec<Expr>) -> BTreeMap<CanonKey, Rational> {
    let mut like_terms: BTreeMap<CanonKey, Rational> = BTreeMap::new();
    for term in terms {
        let (c, rest) = split_coeff(&term);
        if c.is_zero() {
            continue;
        }
        let mut key = factors(&rest);
        key.sort();
        *like_terms
            .entry(CanonKey(key))
            .or_insert_with(Rational::zero) += c;
    }
    like_terms
}

fn rebuild_sum(mut like_terms: BTreeMap<CanonKey, Rational>) -> Expr {
    if like_terms.contains_key(&CanonKey(vec![Expr::Undefined])) {
        return Expr::Undefined;
    }
    // An infinite term absorbs every finite one.
    if let Some(c) = like_terms.get(&CanonKey(vec![Expr::Infinity])) {
        // oo - oo
        if c.is_zero() {
            return Expr::Undefined;
        }
        return if c.is_positive() {
            Expr::Infinity
        } else {
            Expr::Neg(Expr::Infinity.boxed())
        };
    }

    let constant = like_terms
        .remove(&CanonKey(Vec::new()))
        .unwrap_or_else(Rational::zero);
    let mut terms: Vec<Expr> = like_terms
        .into_iter()
        .filter(|(_, c)| !c.is_zero())
        .map(|(CanonKey(key), c)| term_from(&c, mul_from_sorted_factors(&key)))
        .collect();
    if !constant.is_zero() {
        terms.push(Expr::Constant(constant));
    }

    match terms.len() {
        0 => zero(),
        1 => terms.remove(0),
        _ => mk_add_list(terms),
    }
}

/// `coef * base` in the simplest shape.
fn term_from(coef: &Rational, base: Expr) -> Expr {
    if coef.is_zero() {
        zero()
    } else if is_one(&base) {
        Expr::Constant(coef.clone())
    } else if coef.is_one() {
        base
    } else if *coef == -Rational::one() {
        simplify_neg(base)
    } else {
        Expr::Mul(Expr::Constant(coef.clone()).boxed(), base.boxed())
    }
}

fn is_sum(expr: &Expr) -> bool {
    matches!(expr, Expr::Add(_, _) | Expr::Sub(_, _))
}

/// True for `oo`, `-oo` and products with an infinite factor.
fn is_unbounded(expr: &Expr) -> bool {
    factors(expr).iter().any(|f| match f {
        Expr::Infinity => true,
        Expr::Neg(inner) => **inner == Expr::Infinity,
        _ => false,
    })
}

/// Products with no value: anything involving `nan`, and zero times infinity.
fn is_undefined_product(x: &Expr, y: &Expr) -> bool {
    *x == Expr::Undefined
        || *y == Expr::Undefined
        || (is_zero(x) && is_unbounded(y))
        || (is_zero(y) && is_unbounded(x))
}

/// Products are kept factored; only a numeric coefficient is distributed over
/// a sum. [`expand`] multiplies out the rest.
pub fn simplify_mul(x: Expr, y: Expr) -> Expr {
    if is_undefined_product(&x, &y) {
        return Expr::Undefined;
    }
    match (x, y) {
        (Expr::Constant(a), Expr::Constant(b)) => Expr::Constant(a * b),
        (x, y) if is_zero(&x) || is_zero(&y) => zero(),
        (x, y) if is_one(&x) => y,
        (x, y) if is_one(&y) => x,
        (c @ Expr::Constant(_), sum) | (sum, c @ Expr::Constant(_)) if is_sum(&sum) => {
            distribute(sum, c, simplify_mul)
        }
        (x, y) => {
            let (c, rest) = split_coeff(&Expr::Mul(x.boxed(), y.boxed()));
            let (folded, rest) = merge_powers(factors(&rest));
            let c = c * folded;
            if rest == Expr::Infinity && !c.is_zero() {
                return if c.is_positive() {
                    Expr::Infinity
                } else {
                    Expr::Neg(Expr::Infinity.boxed())
                };
            }
            term_from(&c, rest)
        }
    }
}

/// Multiply each term of `sum` by `t` with `mul`.
fn distribute(sum: Expr, t: Expr, mul: fn(Expr, Expr) -> Expr) -> Expr {
    match sum {
        Expr::Add(a, b) => simplify_add(mul(*a, t.clone()), mul(*b, t)),
        Expr::Sub(a, b) => simplify_sub(mul(*a, t.clone()), mul(*b, t)),
        other => mul(other, t),
    }
}

/// Multiply out products of sums and collect the result. Powers of sums are
/// left alone, as are sums over a denominator and expansions beyond
/// [`DISTRIBUTE_TERM_LIMIT`] terms.
pub fn expand(expr: Expr) -> Expr {
    match expr {
        Expr::Add(a, b) => simplify_add(expand(*a), expand(*b)),
        Expr::Sub(a, b) => simplify_sub(expand(*a), expand(*b)),
        Expr::Neg(a) => simplify_neg(expand(*a)),
        Expr::Mul(a, b) => expand_mul(expand(*a), expand(*b)),
        Expr::Div(a, b) => simplify_div(expand(*a), expand(*b)),
        other => other,
    }
}

fn expand_mul(x: Expr, y: Expr) -> Expr {
    let fits = sum_len(&x) * sum_len(&y) <= DISTRIBUTE_TERM_LIMIT;
    if fits && is_sum(&x) && !has_reciprocal(&y) {
        distribute(x, y, expand_mul)
    } else if fits && is_sum(&y) && !has_reciprocal(&x) {
        distribute(y, x, expand_mul)
    } else {
        simplify_mul(x, y)
    }
}

/// Combine factors sharing a base by adding their exponents. `exp(a)` is treated
/// as a power of `e`. Factors that fold to rationals are returned as the first
/// component.
fn merge_powers(items: Vec<Expr>) -> (Rational, Expr) {
    let mut powers: Vec<(Expr, Expr)> = Vec::new();
    for item in items {
        let (base, exp) = match item {
            Expr::Pow(base, exp) => (*base, *exp),
            Expr::Exp(arg) if !arg.is_one() => (Expr::euler(), *arg),
            other => (other, one()),
        };
        match powers.iter_mut().find(|(b, _)| *b == base) {
            Some((_, acc)) => *acc = simplify_add(acc.clone(), exp),
            None => powers.push((base, exp)),
        }
    }

    let mut coeff = Rational::one();
    let mut rest = Vec::new();
    for (base, exp) in powers {
        match simplify_pow(base, exp) {
            Expr::Constant(c) => coeff *= c,
            other => rest.extend(factors(&other)),
        }
    }
    (coeff, mk_mul_list(rest))
}

pub fn simplify_div(x: Expr, y: Expr) -> Expr {
    if is_zero(&y) {
        return Expr::Div(x.boxed(), y.boxed());
    }
    match (x, y) {
        (Expr::Constant(n), Expr::Constant(d)) => Expr::Constant(n / d),
        (x, _) if is_zero(&x) => zero(),
        (x, y) if is_one(&y) => x,
        (x, y) => simplify_mul(x, simplify_pow(y, Expr::integer(-1))),
    }
}

/// `base^exp` for an integer `exp` within the folding limit. Zero to a
/// negative power has no value and is not folded.
fn fold_power(base: &Rational, exp: &Rational) -> Option<Rational> {
    if !exp.is_integer() {
        return None;
    }
    let k = exp.to_integer();
    let n = k.abs().to_u32().filter(|n| *n <= MAX_FOLDED_EXPONENT)?;
    if k.is_negative() && base.is_zero() {
        return None;
    }
    let raised = Rational::new(base.numer().pow(n), base.denom().pow(n));
    Some(if k.is_negative() { raised.recip() } else { raised })
}

pub fn simplify_pow(x: Expr, y: Expr) -> Expr {
    match (x, y) {
        (Expr::Undefined, _) | (_, Expr::Undefined) => Expr::Undefined,
        (_, Expr::Constant(e)) if e.is_zero() => one(),
        (base, Expr::Constant(e)) if e.is_one() => base,
        (b, _) if is_one(&b) => one(),
        (Expr::Constant(b), Expr::Constant(e)) => match fold_power(&b, &e) {
            Some(value) => Expr::Constant(value),
            None => Expr::Pow(Expr::Constant(b).boxed(), Expr::Constant(e).boxed()),
        },
        (Expr::Infinity, Expr::Constant(k)) => {
            if k.is_negative() {
                zero()
            } else {
                Expr::Infinity
            }
        }
        // e^a == exp(a)
        (Expr::Exp(a), e) => match simplify_mul(*a, e) {
            x if is_zero(&x) => one(),
            Expr::Log(inner) => *inner,
            x => Expr::Exp(x.boxed()),
        },
        // (b^p)^q == b^(p*q) for integer q
        (Expr::Pow(b, p), Expr::Constant(q)) if q.is_integer() => {
            simplify_pow(*b, simplify_mul(*p, Expr::Constant(q)))
        }
        (Expr::Mul(a, b), Expr::Constant(k)) if k.is_integer() => {
            let k = Expr::Constant(k);
            simplify_mul(simplify_pow(*a, k.clone()), simplify_pow(*b, k))
        }
        (Expr::Neg(inner), Expr::Constant(k)) if k.is_integer() => {
            let odd = k.to_integer().is_odd();
            let p = simplify_pow(*inner, Expr::Constant(k));
            if odd {
                simplify_neg(p)
            } else {
                p
            }
        }
        (x, y) => Expr::Pow(x.boxed(), y.boxed()),
    }
}

pub fn simplify_neg(expr: Expr) -> Expr {
    match expr {
        Expr::Constant(x) => Expr::Constant(-x),
        Expr::Neg(x) => *x,
        Expr::Undefined => Expr::Undefined,
        Expr::Mul(a, b) => match *a {
            Expr::Constant(c) => term_from(&-c, *b),
            a => Expr::Neg(Expr::Mul(a.boxed(), b).boxed()),
        },
        other => Expr::Neg(other.boxed()),
    }
}

/// True when a factor of `expr` is a power with a negative exponent; sums are
/// kept intact over such denominators.
fn has_reciprocal(expr: &Expr) -> bool {
    factors(expr).iter().any(|f| match f {
        Expr::Pow(_, exp) => matches!(&**exp, Expr::Constant(k) if k.is_negative()),
        _ => false,
    })
}

fn is_zero(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(r) if r.is_zero())
}

fn is_one(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(r) if r.is_one())
}

/// A product term read as `coeff * sin(..) * cos(..) * others`, each list sorted.
struct TrigTerm {
    coeff: Rational,
    sines: Vec<Expr>,
    coses: Vec<Expr>,
    others: Vec<Expr>,
}

impl TrigTerm {
    fn of(term: &Expr) -> Self {
        let (coeff, core) = split_coeff(term);
        let mut view = TrigTerm {
            coeff,
            sines: Vec::new(),
            coses: Vec::new(),
            others: Vec::new(),
        };
        for factor in factors(&core) {
            match factor {
                Expr::Sin(arg) => view.sines.push(*arg),
                Expr::Cos(arg) => view.coses.push(*arg),
                other => view.others.push(other),
            }
        }
        view.sines.sort();
        view.coses.sort();
        view.others.sort();
        view
    }
}

// sin(u)sin(v) + cos(u)cos(v) => cos(u - v)
fn combine_angle_difference(terms: &[Expr]) -> Option<(Expr, (usize, usize))> {
    let views: Vec<TrigTerm> = terms.iter().map(TrigTerm::of).collect();
    for i in 0..views.len() {
        for j in (i + 1)..views.len() {
            for (s, c) in [(&views[i], &views[j]), (&views[j], &views[i])] {
                let matches = s.sines.len() == 2
                    && s.coses.is_empty()
                    && c.sines.is_empty()
                    && s.sines == c.coses
                    && s.coeff == c.coeff
                    && s.others == c.others;
                if matches {
                    let diff = Expr::Sub(s.sines[0].clone().boxed(), s.sines[1].clone().boxed());
                    let core = mul_from_sorted_factors(&s.others);
                    let term = attach_core(core, Expr::Cos(diff.boxed()));
                    return Some((term_from(&s.coeff, term), (i, j)));
                }
            }
        }
    }
    None
}

/// A term `coeff * f(arg)^2 * rest` with `f` sine or cosine.
struct SquaredTrig {
    coeff: Rational,
    arg: Expr,
    is_sine: bool,
    rest: Vec<Expr>,
}

impl SquaredTrig {
    fn of(term: &Expr) -> Option<Self> {
        let two = Rational::from_integer(2.into());
        let (coeff, core) = split_coeff(term);
        let mut rest = factors(&core);
        let pos = rest.iter().position(|f| match f {
            Expr::Pow(base, exp) => {
                matches!(**base, Expr::Sin(_) | Expr::Cos(_))
                    && matches!(&**exp, Expr::Constant(k) if *k == two)
            }
            _ => false,
        })?;
        let Expr::Pow(base, _) = rest.remove(pos) else {
            return None;
        };
        rest.sort();
        let (arg, is_sine) = match *base {
            Expr::Sin(arg) => (*arg, true),
            Expr::Cos(arg) => (*arg, false),
            _ => return None,
        };
        Some(SquaredTrig {
            coeff,
            arg,
            is_sine,
            rest,
        })
    }

    fn complements(&self, other: &SquaredTrig) -> bool {
        self.is_sine != other.is_sine
            && self.coeff == other.coeff
            && self.arg == other.arg
            && self.rest == other.rest
    }
}

// a*sin(u)^2 + a*cos(u)^2 => a
fn combine_pythagorean(terms: &[Expr]) -> Option<(Expr, (usize, usize))> {
    let squares: Vec<Option<SquaredTrig>> = terms.iter().map(SquaredTrig::of).collect();
    for (i, a) in squares.iter().enumerate() {
        let Some(a) = a else { continue };
        for (j, b) in squares.iter().enumerate().skip(i + 1) {
            if b.as_ref().is_some_and(|b| a.complements(b)) {
                let core = mul_from_sorted_factors(&a.rest);
                return Some((term_from(&a.coeff, core), (i, j)));
            }
        }
    }
    None
}

fn attach_core(core: Expr, trig_term: Expr) -> Expr {
    if is_one(&core) {
        trig_term
    } else {
        Expr::Mul(core.boxed(), trig_term.boxed())
    }
}

fn simplify_trig_once(expr: &Expr, cache: &mut Cache) -> Expr {
    let terms = flatten_sum(expr);
    let Some((combined, (i, j))) =
        combine_pythagorean(&terms).or_else(|| combine_angle_difference(&terms))
    else {
        return expr.clone();
    };
    let rest = terms
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| *idx != i && *idx != j)
        .map(|(_, t)| t);
    let rebuilt = mk_add_list(std::iter::once(combined).chain(rest).collect());
    simplify_cached(rebuilt, cache)
}

fn mk_add_list(items: Vec<Expr>) -> Expr {
    items
        .into_iter()
        .reduce(|acc, item| Expr::Add(acc.boxed(), item.boxed()))
        .unwrap_or_else(zero)
}

fn mk_mul_list(mut items: Vec<Expr>) -> Expr {
    items.retain(|e| !is_one(e));
    items.sort();
    mul_from_sorted_factors(&items)
}
