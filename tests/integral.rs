use integral_tex::expr::Expr;
use integral_tex::{
    integral_latex, latex, parse_bound, parse_integrand, CasError, Config, DefiniteIntegral,
};

fn render(lower: &str, upper: &str, function: &str) -> String {
    DefiniteIntegral::parse(lower, upper, function, &Config::default())
        .expect("valid integral")
        .to_latex()
}

#[test]
fn template_is_filled_verbatim() {
    assert_eq!(
        integral_latex("a", "b", "f", "t"),
        r"\int_{a}^{b} f \mathrm{d}t"
    );
}

#[test]
fn renders_polynomial_integrand() {
    assert_eq!(render("0", "1", "x**2"), r"\int_{0}^{1} x^{2} \mathrm{d}x");
    assert_eq!(
        render("-1", "1", "x^2 + 2*x + 1"),
        r"\int_{-1}^{1} x^{2} + 2 x + 1 \mathrm{d}x"
    );
}

#[test]
fn renders_symbolic_bounds() {
    assert_eq!(
        render("0", "pi", "sin(x)"),
        r"\int_{0}^{\pi} \sin{\left(x \right)} \mathrm{d}x"
    );
    assert_eq!(
        render("-pi/2", "pi/2", "cos(x)"),
        r"\int_{- \frac{\pi}{2}}^{\frac{\pi}{2}} \cos{\left(x \right)} \mathrm{d}x"
    );
    assert_eq!(
        render("1", "oo", "1/x**2"),
        r"\int_{1}^{\infty} \frac{1}{x^{2}} \mathrm{d}x"
    );
    assert_eq!(render("0", "E", "1/x"), r"\int_{0}^{e} \frac{1}{x} \mathrm{d}x");
}

#[test]
fn bounds_are_evaluated_but_not_canonicalized() {
    assert_eq!(parse_bound("1 + 1"), Ok(Expr::integer(2)));
    assert_eq!(parse_bound("2*pi"), parse_bound("pi*2"));
    assert_eq!(parse_bound("x"), Ok(Expr::var("x")));
}

#[test]
fn integrand_is_simplified() {
    assert_eq!(render("0", "1", "sin(x)**2 + cos(x)**2"), r"\int_{0}^{1} 1 \mathrm{d}x");
    assert_eq!(render("0", "1", "x - x"), r"\int_{0}^{1} 0 \mathrm{d}x");
    assert_eq!(render("2", "3", "(x**2 - 1)/(x - 1)"), r"\int_{2}^{3} x + 1 \mathrm{d}x");
}

#[test]
fn division_by_zero_is_a_value_error() {
    assert!(matches!(parse_bound("1/0"), Err(CasError::Value(_))));
    assert!(matches!(parse_bound("1/(2 - 2)"), Err(CasError::Value(_))));
    let config = Config::default();
    assert!(matches!(parse_integrand("x/0", &config), Err(CasError::Value(_))));
    assert!(matches!(parse_integrand("0**-2", &config), Err(CasError::Value(_))));
}

#[test]
fn integrand_may_only_use_the_integration_variable() {
    let err = parse_integrand("x*y + z", &Config::default()).unwrap_err();
    assert_eq!(
        err,
        CasError::Value("the function may only depend on x, found y, z".into())
    );
    assert_eq!(parse_integrand("y - y + x", &Config::default()), Ok(Expr::var("x")));
}

#[test]
fn integration_variable_is_configurable() {
    let config = Config {
        variable: "t".into(),
        ..Config::default()
    };
    let integral = DefiniteIntegral::parse("0", "1", "t**2", &config).expect("valid integral");
    assert_eq!(integral.to_latex(), r"\int_{0}^{1} t^{2} \mathrm{d}t");
    assert!(parse_integrand("x", &config).is_err());
}

#[test]
fn non_scalar_input_is_unsupported() {
    assert!(matches!(parse_bound("1, 2"), Err(CasError::Unsupported(_))));
    assert!(matches!(
        parse_integrand("x > 1", &Config::default()),
        Err(CasError::Unsupported(_))
    ));
}

#[test]
fn syntax_errors_are_parse_errors() {
    assert!(matches!(parse_bound("2 +"), Err(CasError::Parse { .. })));
    assert!(matches!(
        parse_integrand("sin(x", &Config::default()),
        Err(CasError::Parse { .. })
    ));
}

#[test]
fn indeterminate_forms_are_value_errors() {
    assert_eq!(
        parse_bound("oo - oo"),
        Err(CasError::Value("indeterminate form in 'oo - oo'".into()))
    );
    let config = Config::default();
    assert_eq!(
        parse_integrand("x + 0*oo", &config),
        Err(CasError::Value("indeterminate form in 'x + 0*oo'".into()))
    );
    assert!(matches!(parse_integrand("oo/oo", &config), Err(CasError::Value(_))));
    assert_eq!(parse_bound("oo + 1"), Ok(Expr::Infinity));
}

#[test]
fn logarithm_at_zero_is_a_value_error() {
    let config = Config::default();
    assert!(matches!(parse_integrand("log(0)", &config), Err(CasError::Value(_))));
    assert!(matches!(parse_integrand("x*ln(x - x)", &config), Err(CasError::Value(_))));
    assert!(matches!(parse_bound("cot(0)"), Err(CasError::Value(_))));
    assert!(parse_integrand("log(x)", &config).is_ok());
}

#[test]
fn large_powers_are_not_expanded() {
    let config = Config::default();
    let power = parse_integrand("(2*x + 1)**5000", &config).expect("valid integrand");
    assert!(matches!(power, Expr::Pow(_, _)), "{power:?}");
    assert!(latex(&power).len() < 64);

    let quotient = parse_integrand("x**4000000000/(x**2 + 1)", &config).expect("valid integrand");
    let text = latex(&quotient);
    assert!(text.contains("x^{4000000000}") && text.contains("x^{2} + 1"), "{text}");
}

// Integrands of the shapes produced by the rational approximation generator.
const GENERATED_INTEGRANDS: &[&str] = &[
    "x**2 * (1-x)**2 * (1 + 2*x) * exp(x)",
    "x**3 * (1-x)**3 * (-3/2 + 5*x) * exp(1/2 * x)",
    "x**10 * (1-x)**10 * (7 - 4*x) * exp(x)",
    "sin(x)**2 * (1-sin(x))**2 * (1 + 2*sin(x)) * exp(x)",
    "sin(x)**3 * (1-sin(x))**3 * (2/3 - sin(x)) * exp(2 * x)",
    "x**2 * (1 + 3*x**2) * ln(1/x)**2 / (1 + x**2)",
    "x**3 * (2 + -1*x**2) * ln(1/x)**0 / (1 + x**2)",
    "x**2 * (1-x)**2 * (1/2 + -3/4*x) * exp(-1/2 * x)",
    "x**4 * (1-x)**4 * (1 + -2*x + 3*x**2) / (1 + x**2)",
    "(x+1)**64*(x+2)",
];

#[test]
fn generated_integrands_stay_factored() {
    let config = Config::default();
    for input in GENERATED_INTEGRANDS {
        let integrand = parse_integrand(input, &config).expect("valid integrand");
        assert!(
            !matches!(integrand, Expr::Add(_, _) | Expr::Sub(_, _)),
            "{input} was multiplied out: {}",
            latex(&integrand)
        );
        assert!(latex(&integrand).len() < 240, "{input}");
    }
}

#[test]
fn generated_integrand_renders_as_a_product() {
    let text = render("0", "1", "x**2 * (1-x)**2 * (1 + 2*x) * exp(x)");
    for factor in [r"x^{2}", r"\left(x - 1\right)^{2}", "2 x + 1", "e^{x}"] {
        assert!(text.contains(factor), "{factor} missing from {text}");
    }
}
