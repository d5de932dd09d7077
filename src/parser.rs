use std::fmt;

use crate::error::{CasError, Result};
use crate::expr::{Expr, Rational};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, char, digit0, digit1, multispace0, one_of, satisfy};
use nom::combinator::{all_consuming, cut, map, not, opt, recognize, value};
use nom::error::{context, VerboseError, VerboseErrorKind};
use nom::multi::{fold_many0, many0, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::IResult;
use num_bigint::BigInt;
use num_traits::{Num, One};

type PResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Largest decimal exponent accepted in scientific notation literals.
const MAX_LITERAL_EXPONENT: u64 = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelOp::Eq => "==",
            RelOp::Ne => "!=",
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
        };
        f.write_str(s)
    }
}

/// Everything the top-level grammar accepts. Only plain expressions can be
/// simplified and rendered; the other shapes exist so they can be reported
/// precisely instead of as syntax errors.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Expr(Expr),
    Tuple(Vec<Statement>),
    Relation { lhs: Expr, op: RelOp, rhs: Expr },
}

impl Statement {
    pub fn into_expr(self) -> Result<Expr> {
        match self {
            Statement::Expr(expr) => Ok(expr),
            Statement::Tuple(items) => Err(CasError::Unsupported(format!(
                "a tuple of {} elements is not a scalar expression",
                items.len()
            ))),
            Statement::Relation { lhs, op, rhs } => Err(CasError::Unsupported(format!(
                "the relation '{lhs} {op} {rhs}' is not a scalar expression"
            ))),
        }
    }
}

/// Parse a single scalar expression.
pub fn parse_expr(input: &str) -> Result<Expr> {
    match all_consuming(ws(parse_add_sub))(input) {
        Ok((_, expr)) => Ok(expr),
        Err(e) => Err(describe_error(input, e)),
    }
}

/// Parse a full input line: an expression, a comma separated tuple or a relation.
pub fn parse_statement(input: &str) -> Result<Statement> {
    match all_consuming(ws(parse_tuple))(input) {
        Ok((_, stmt)) => Ok(stmt),
        Err(e) => Err(describe_error(input, e)),
    }
}

fn describe_error(input: &str, err: nom::Err<VerboseError<&str>>) -> CasError {
    let detail = match err {
        nom::Err::Incomplete(_) => "unexpected end of input".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let label = e.errors.iter().find_map(|(_, kind)| match kind {
                VerboseErrorKind::Context(ctx) => Some(*ctx),
                _ => None,
            });
            let rest = e.errors.first().map(|(rest, _)| *rest).unwrap_or(input);
            let position = input.len() - rest.len();
            match (label, rest.trim_start().chars().next()) {
                (Some(label), _) => format!("{label} at position {position}"),
                (None, None) => "unexpected end of input".to_string(),
                (None, Some(c)) => format!("unexpected '{c}' at position {position}"),
            }
        }
    };
    CasError::Parse {
        input: input.to_string(),
        detail,
    }
}

fn parse_tuple(input: &str) -> PResult<'_, Statement> {
    map(
        terminated(
            separated_list1(ws(char(',')), parse_relation),
            opt(ws(char(','))),
        ),
        |mut items| {
            if items.len() == 1 {
                items.remove(0)
            } else {
                Statement::Tuple(items)
            }
        },
    )(input)
}

fn parse_relation(input: &str) -> PResult<'_, Statement> {
    let (rest, lhs) = parse_add_sub(input)?;
    match opt(pair(ws(parse_rel_op), cut(parse_add_sub)))(rest)? {
        (next, Some((op, rhs))) => Ok((next, Statement::Relation { lhs, op, rhs })),
        (next, None) => Ok((next, Statement::Expr(lhs))),
    }
}

fn parse_rel_op(input: &str) -> PResult<'_, RelOp> {
    alt((
        value(RelOp::Eq, tag("==")),
        value(RelOp::Ne, tag("!=")),
        value(RelOp::Le, tag("<=")),
        value(RelOp::Ge, tag(">=")),
        value(RelOp::Lt, tag("<")),
        value(RelOp::Gt, tag(">")),
        value(RelOp::Eq, tag("=")),
    ))(input)
}

fn parse_add_sub(input: &str) -> PResult<'_, Expr> {
    let (rest, init) = parse_mul_div(input)?;
    fold_many0(
        pair(
            ws(alt((char('+'), char('-')))),
            context("expected an operand", cut(parse_mul_div)),
        ),
        move || init.clone(),
        |acc, (op, rhs)| match op {
            '+' => Expr::Add(acc.boxed(), rhs.boxed()),
            _ => Expr::Sub(acc.boxed(), rhs.boxed()),
        },
    )(rest)
}

fn parse_mul_div(input: &str) -> PResult<'_, Expr> {
    let (rest, init) = parse_unary(input)?;
    fold_many0(
        pair(
            ws(alt((terminated(char('*'), not(char('*'))), char('/')))),
            context("expected an operand", cut(parse_unary)),
        ),
        move || init.clone(),
        |acc, (op, rhs)| match op {
            '*' => Expr::Mul(acc.boxed(), rhs.boxed()),
            _ => Expr::Div(acc.boxed(), rhs.boxed()),
        },
    )(rest)
}

fn parse_unary(input: &str) -> PResult<'_, Expr> {
    alt((
        map(preceded(ws(char('-')), cut(parse_unary)), |e| {
            Expr::Neg(e.boxed())
        }),
        preceded(ws(char('+')), cut(parse_unary)),
        parse_pow,
    ))(input)
}

// Exponentiation binds tighter than unary minus and is right associative;
// the exponent itself may carry a sign (`x**-1`).
fn parse_pow(input: &str) -> PResult<'_, Expr> {
    let (rest, base) = parse_primary(input)?;
    match opt(preceded(
        ws(alt((tag("**"), tag("^")))),
        context("expected an exponent", cut(parse_unary)),
    ))(rest)?
    {
        (next, Some(exp)) => Ok((next, Expr::Pow(base.boxed(), exp.boxed()))),
        (next, None) => Ok((next, base)),
    }
}

fn parse_primary(input: &str) -> PResult<'_, Expr> {
    alt((parse_parens, parse_number, parse_call, parse_identifier))(input)
}

fn parse_parens(input: &str) -> PResult<'_, Expr> {
    delimited(
        ws(char('(')),
        cut(parse_add_sub),
        context("expected ')'", cut(ws(char(')')))),
    )(input)
}

fn parse_number(input: &str) -> PResult<'_, Expr> {
    let (rest, text) = ws(recognize(tuple((
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    ))))(input)?;
    match decimal_literal(text) {
        Some(value) => Ok((rest, value)),
        None => Err(nom::Err::Failure(VerboseError {
            errors: vec![(
                input.trim_start(),
                VerboseErrorKind::Context("exponent out of range"),
            )],
        })),
    }
}

/// Decimal literals are read exactly: `0.25` becomes `1/4`. `None` when the
/// scaled exponent does not fit in [`MAX_LITERAL_EXPONENT`].
fn decimal_literal(text: &str) -> Option<Expr> {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(idx) => (&text[..idx], &text[idx + 1..]),
        None => (text, ""),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{int_part}{frac_part}");
    let digits = if digits.is_empty() { "0" } else { digits.as_str() };
    let numer = BigInt::from_str_radix(digits, 10).ok()?;

    let exp: i64 = if exponent.is_empty() {
        0
    } else {
        exponent.parse().ok()?
    };
    let shift = exp.checked_sub(i64::try_from(frac_part.len()).ok()?)?;
    if shift.unsigned_abs() > MAX_LITERAL_EXPONENT {
        return None;
    }

    let scale = num_traits::pow(BigInt::from(10), shift.unsigned_abs() as usize);
    let value = if shift >= 0 {
        Rational::from_integer(numer * scale)
    } else {
        Rational::new(numer, scale)
    };
    Some(Expr::Constant(value))
}

fn identifier(input: &str) -> PResult<'_, &str> {
    ws(recognize(pair(
        alpha1,
        many0(satisfy(|c| c.is_ascii_alphanumeric() || c == '_')),
    )))(input)
}

fn parse_identifier(input: &str) -> PResult<'_, Expr> {
    let (rest, name) = identifier(input)?;
    let expr = match name {
        "pi" => Expr::Pi,
        "E" | "e" => Expr::euler(),
        "oo" => Expr::Infinity,
        _ if is_function_name(name) => {
            return Err(nom::Err::Failure(VerboseError {
                errors: vec![(input, VerboseErrorKind::Context("function requires an argument"))],
            }));
        }
        _ => Expr::Variable(name.to_string()),
    };
    Ok((rest, expr))
}

fn parse_call(input: &str) -> PResult<'_, Expr> {
    let (after_name, name) = identifier(input)?;
    let (rest, arg) = delimited(
        ws(char('(')),
        cut(parse_add_sub),
        context("expected ')'", cut(ws(char(')')))),
    )(after_name)?;

    let arg = arg.boxed();
    let expr = match name {
        "sin" => Expr::Sin(arg),
        "cos" => Expr::Cos(arg),
        "tan" => Expr::Tan(arg),
        "sec" => Expr::Sec(arg),
        "csc" => Expr::Csc(arg),
        "cot" => Expr::Cot(arg),
        "arctan" | "atan" => Expr::Atan(arg),
        "arcsin" | "asin" => Expr::Asin(arg),
        "arccos" | "acos" => Expr::Acos(arg),
        "arcsec" | "asec" => Expr::Asec(arg),
        "arccsc" | "acsc" => Expr::Acsc(arg),
        "arccot" | "acot" => Expr::Acot(arg),
        "sinh" => Expr::Sinh(arg),
        "cosh" => Expr::Cosh(arg),
        "tanh" => Expr::Tanh(arg),
        "arcsinh" | "asinh" => Expr::Asinh(arg),
        "arccosh" | "acosh" => Expr::Acosh(arg),
        "arctanh" | "atanh" => Expr::Atanh(arg),
        "exp" => Expr::Exp(arg),
        "log" | "ln" => Expr::Log(arg),
        "abs" | "Abs" => Expr::Abs(arg),
        "sqrt" => Expr::Pow(arg, Expr::Constant(Rational::new(One::one(), 2.into())).boxed()),
        _ => {
            return Err(nom::Err::Failure(VerboseError {
                errors: vec![(input, VerboseErrorKind::Context("unknown function"))],
            }));
        }
    };

    Ok((rest, expr))
}

fn is_function_name(name: &str) -> bool {
    matches!(
        name,
        "sin" | "cos" | "tan" | "sec" | "csc" | "cot"
            | "arctan" | "atan" | "arcsin" | "asin" | "arccos" | "acos"
            | "arcsec" | "asec" | "arccsc" | "acsc" | "arccot" | "acot"
            | "sinh" | "cosh" | "tanh"
            | "arcsinh" | "asinh" | "arccosh" | "acosh" | "arctanh" | "atanh"
            | "exp" | "log" | "ln" | "abs" | "Abs" | "sqrt"
    )
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}
