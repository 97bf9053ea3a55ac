//! Default weights and limits

/// Spelled-out name vs. symbol
pub const GREEK_WEIGHTS: [f64; 2] = [0.8, 0.2];
/// `infinity` vs. `inf` vs. `∞`
pub const INFINITY_WEIGHTS: [f64; 3] = [0.4, 0.4, 0.2];
/// `pi` vs. `π`
pub const PI_WEIGHTS: [f64; 2] = [0.8, 0.2];
/// `sqrt(x)` vs. a power form
pub const ROOT_FORM_WEIGHTS: [f64; 2] = [0.5, 0.5];
/// `^` vs. `**`
pub const ROOT_OPERATOR_WEIGHTS: [f64; 2] = [0.5, 0.5];
/// Decimal exponent vs. `(1/n)`
pub const ROOT_EXPONENT_WEIGHTS: [f64; 2] = [0.5, 0.5];

/// Deepest node nesting a single render will walk
pub const MAX_DEPTH: usize = 512;
/// Rendered in place of a `%` comment
pub const COMMENT_SEPARATOR: &str = "";
