/// Fill the definite integral template from already rendered pieces.
pub fn integral_latex(lower: &str, upper: &str, integrand: &str, var: &str) -> String {
    format!(r"\int_{{{lower}}}^{{{upper}}} {integrand} \mathrm{{d}}{var}")
}
