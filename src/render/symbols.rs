//! Static lookup tables for the zero-argument constructs

/// Greek letter names and their symbols. `pi` is handled on its own.
#[rustfmt::skip]
pub const GREEK_LETTERS: &[(&str, &str)] = &[
    ("alpha", "α"), ("beta", "β"), ("gamma", "γ"), ("delta", "δ"),
    ("epsilon", "ε"), ("varepsilon", "ϵ"), ("zeta", "ζ"), ("eta", "η"),
    ("theta", "θ"), ("vartheta", "ϑ"), ("iota", "ι"), ("kappa", "κ"),
    ("varkappa", "ϰ"), ("lambda", "λ"), ("mu", "μ"), ("nu", "ν"),
    ("xi", "ξ"), ("varpi", "ϖ"), ("rho", "ρ"), ("varrho", "ϱ"),
    ("sigma", "σ"), ("varsigma", "ς"), ("tau", "τ"), ("upsilon", "υ"),
    ("phi", "φ"), ("varphi", "ϕ"), ("chi", "χ"), ("psi", "ψ"),
    ("omega", "ω"),
    ("Gamma", "Γ"), ("Delta", "Δ"), ("Theta", "Θ"), ("Lambda", "Λ"),
    ("Xi", "Ξ"), ("Pi", "Π"), ("Sigma", "Σ"), ("Upsilon", "Υ"),
    ("Phi", "Φ"), ("Psi", "Ψ"), ("Omega", "Ω"),
];

/// Spelled-out and symbol forms of `\infty`, in weight order
pub const INFINITY_FORMS: [&str; 3] = ["infinity", "inf", "∞"];

/// Spelled-out and symbol forms of `\pi`, in weight order
pub const PI_FORMS: [&str; 2] = ["pi", "π"];

/// Deterministic 1:1 substitutions
#[rustfmt::skip]
pub const SYMBOLS: &[(&str, &str)] = &[
    // operators
    ("times", "*"), ("cdot", "*"), ("div", "÷"),
    ("pm", "+/-"), ("mp", "-/+"),
    // relations
    ("approx", "~"), ("sim", "~="), ("equiv", "==="),
    ("leq", "<="), ("le", "<="), ("geq", ">="), ("ge", ">="),
    ("neq", "!="), ("ne", "!="),
    // sets
    ("subseteq", "subset="), ("subset", "⊂"), ("in", "∈"),
    ("cup", "∪"), ("cap", "∩"), ("emptyset", "∅"),
    // arrows and logic
    ("iff", "<=>"), ("mapsto", "|->"), ("to", "→"),
    ("ldots", "..."), ("cdots", "..."), ("dots", "..."),
    // spacing
    ("quad", "    "), ("qquad", "        "),
    (",", " "), (";", " "), (":", " "), (" ", " "), ("!", ""),
    // line breaks and literal braces
    ("\\", "\n"), ("n", "\n"),
    ("{", "{"), ("}", "}"),
];

/// Big operators, rendered with their backslash kept
pub const OPERATOR_NAMES: &[&str] = &[
    "sum", "int", "lim", "prod", "nabla", "iint", "iiint", "oint",
];

/// Function names, rendered verbatim
pub const FUNCTION_NAMES: &[&str] = &[
    "sin", "cos", "tan", "sec", "csc", "cot", "arcsin", "arccos", "arctan", "sinh", "cosh",
    "tanh", "log", "ln", "exp", "max", "min", "det", "gcd",
];

/// Formatting wrappers whose content passes through untouched
pub const PASS_THROUGH: &[&str] = &[
    "text",
    "textbf",
    "textit",
    "mathbb",
    "mathbf",
    "mathit",
    "mathcal",
    "emph",
    "operatorname",
];

/// Delimiter sizing markers, rendered as nothing
pub const SUPPRESSED: &[&str] = &["left", "right"];

/// Substitution for a `Special` node, if it has one
pub fn special(symbol: &str) -> Option<&'static str> {
    match symbol {
        "\\langle" => Some("<"),
        "\\rangle" => Some(">"),
        "~" => Some(" "),
        "&" => Some(" "),
        "--" => Some("–"),
        "---" => Some("—"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tables_have_no_duplicate_names() {
        let mut seen = HashSet::new();
        let names = GREEK_LETTERS
            .iter()
            .map(|(n, _)| *n)
            .chain(SYMBOLS.iter().map(|(n, _)| *n))
            .chain(OPERATOR_NAMES.iter().copied())
            .chain(FUNCTION_NAMES.iter().copied())
            .chain(PASS_THROUGH.iter().copied())
            .chain(SUPPRESSED.iter().copied());
        for name in names {
            assert!(seen.insert(name), "duplicate construct name: {name}");
        }
        assert!(!seen.contains("pi"));
        assert!(!seen.contains("infty"));
    }

    #[test]
    fn unmapped_special_is_none() {
        assert_eq!(special("\\langle"), Some("<"));
        assert_eq!(special("@"), None);
    }
}
