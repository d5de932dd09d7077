use crate::expr::{Expr, Rational};
use num_traits::Signed;

// Binding strength of the surrounding context.
const SUM: u8 = 1;
const PRODUCT: u8 = 2;
const UNARY: u8 = 3;
const POWER: u8 = 4;

/// Plain-text rendering in the input syntax, used for messages and logs.
pub fn pretty(expr: &Expr) -> String {
    write(expr, 0)
}

fn write(expr: &Expr, ctx: u8) -> String {
    match expr {
        Expr::Variable(v) => v.clone(),
        Expr::Constant(r) => {
            let text = rational_text(r);
            wrap(ctx >= UNARY && (r.is_negative() || !r.is_integer()), text)
        }
        Expr::Pi => "pi".into(),
        Expr::Infinity => "oo".into(),
        Expr::Undefined => "nan".into(),
        Expr::Exp(arg) if arg.is_one() => "E".into(),
        Expr::Add(_, _) | Expr::Sub(_, _) => wrap(ctx > SUM, sum_text(expr)),
        Expr::Mul(_, _) | Expr::Div(_, _) => {
            let (negative, body) = product_text(expr);
            if negative {
                wrap(ctx > PRODUCT, format!("-{body}"))
            } else {
                wrap(ctx > PRODUCT, body)
            }
        }
        Expr::Neg(inner) => wrap(ctx > PRODUCT, format!("-{}", write(inner, UNARY))),
        Expr::Pow(base, exp) => wrap(
            ctx > UNARY,
            format!("{}**{}", write(base, POWER), write(exp, POWER)),
        ),
        call => {
            let arg = call.function_arg().map(|a| write(a, 0)).unwrap_or_default();
            format!("{}({arg})", function_name(call))
        }
    }
}

fn sum_text(expr: &Expr) -> String {
    let mut terms = Vec::new();
    signed_terms(expr, false, &mut terms);
    let mut out = String::new();
    for (i, (negative, term)) in terms.into_iter().enumerate() {
        let body = write(term, PRODUCT);
        match (i, negative) {
            (0, false) => out.push_str(&body),
            (0, true) => out.push_str(&format!("-{body}")),
            (_, false) => out.push_str(&format!(" + {body}")),
            (_, true) => out.push_str(&format!(" - {body}")),
        }
    }
    out
}

fn signed_terms<'a>(expr: &'a Expr, negative: bool, out: &mut Vec<(bool, &'a Expr)>) {
    match expr {
        Expr::Add(a, b) => {
            signed_terms(a, negative, out);
            signed_terms(b, negative, out);
        }
        Expr::Sub(a, b) => {
            signed_terms(a, negative, out);
            signed_terms(b, !negative, out);
        }
        Expr::Neg(inner) => signed_terms(inner, !negative, out),
        term => out.push((negative, term)),
    }
}

/// Factors joined by `*`, with divisors after `/`. Signs of the factors are
/// pulled out and reported separately.
fn product_text(expr: &Expr) -> (bool, String) {
    let mut negative = false;
    let mut numer = Vec::new();
    let mut denom = Vec::new();
    collect_product(expr, false, &mut numer, &mut denom);

    let mut render = |factors: Vec<&Expr>, ctx: u8| -> Vec<String> {
        factors
            .into_iter()
            .map(|f| match f {
                Expr::Neg(inner) => {
                    negative = !negative;
                    write(inner, ctx)
                }
                Expr::Constant(r) if r.is_negative() => {
                    negative = !negative;
                    rational_text(&-r)
                }
                other => write(other, ctx),
            })
            .collect()
    };
    let top = render(numer, UNARY);
    let bottom = render(denom, POWER);

    let mut body = if top.is_empty() { "1".to_string() } else { top.join("*") };
    for d in bottom {
        body.push('/');
        body.push_str(&d);
    }
    (negative, body)
}

fn collect_product<'a>(expr: &'a Expr, inverted: bool, numer: &mut Vec<&'a Expr>, denom: &mut Vec<&'a Expr>) {
    match expr {
        Expr::Mul(a, b) => {
            collect_product(a, inverted, numer, denom);
            collect_product(b, inverted, numer, denom);
        }
        Expr::Div(a, b) => {
            collect_product(a, inverted, numer, denom);
            collect_product(b, !inverted, numer, denom);
        }
        f if inverted => denom.push(f),
        f => numer.push(f),
    }
}

fn wrap(needed: bool, body: String) -> String {
    if needed {
        format!("({body})")
    } else {
        body
    }
}

fn rational_text(r: &Rational) -> String {
    if r.is_integer() {
        r.numer().to_string()
    } else {
        format!("{}/{}", r.numer(), r.denom())
    }
}

fn function_name(expr: &Expr) -> &'static str {
    match expr {
        Expr::Sin(_) => "sin",
        Expr::Cos(_) => "cos",
        Expr::Tan(_) => "tan",
        Expr::Sec(_) => "sec",
        Expr::Csc(_) => "csc",
        Expr::Cot(_) => "cot",
        Expr::Asin(_) => "asin",
        Expr::Acos(_) => "acos",
        Expr::Atan(_) => "atan",
        Expr::Asec(_) => "asec",
        Expr::Acsc(_) => "acsc",
        Expr::Acot(_) => "acot",
        Expr::Sinh(_) => "sinh",
        Expr::Cosh(_) => "cosh",
        Expr::Tanh(_) => "tanh",
        Expr::Asinh(_) => "asinh",
        Expr::Acosh(_) => "acosh",
        Expr::Atanh(_) => "atanh",
        Expr::Exp(_) => "exp",
        Expr::Log(_) => "log",
        Expr::Abs(_) => "Abs",
        _ => "?",
    }
}
