//! Symbolic simplification and normalization.

mod normalize;
mod rules;

pub use normalize::{normalize, normalize_with_limit};
pub use rules::{
    expand, simplify, simplify_add, simplify_div, simplify_fully, simplify_mul, simplify_neg,
    simplify_pow, simplify_sub, simplify_with_limit, DEFAULT_ITERATIONS,
};
pub(crate) use rules::{factors, flatten_sum, split_coeff, MAX_FOLDED_EXPONENT};

use crate::expr::Expr;

/// The full canonicalization applied to an integrand: the normalized form,
/// or its expansion when that is smaller.
pub fn canonicalize(expr: Expr, max_iters: usize) -> Expr {
    let factored = simplify_with_limit(normalize(expr), max_iters);
    let expanded = simplify_with_limit(expand(factored.clone()), max_iters);
    if expanded.size() < factored.size() {
        expanded
    } else {
        factored
    }
}
