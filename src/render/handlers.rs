//! Construct handlers
//!
//! Each handler turns one construct invocation into text. Arguments arrive
//! already rendered (unless the handler opts out via
//! [`MacroHandler::renders_arguments`]), and the [`RenderContext`] gives access
//! to the random source and to the tree walker for anything else.

use std::fmt;
use std::sync::Arc;

use enum_dispatch::enum_dispatch;

use crate::ast::{ArgKind, Node};
use crate::errors::RenderError;
use crate::log;

use super::context::RenderContext;
use super::symbols::{INFINITY_FORMS, PI_FORMS};

/// One argument as seen by a handler
#[derive(Debug, Clone)]
pub struct Arg<'a> {
    pub kind: ArgKind,
    /// Unrendered content; `None` when the slot was not supplied
    pub nodes: Option<&'a [Node]>,
    /// Rendered content; `None` when absent or when the handler renders lazily
    pub text: Option<String>,
}

/// A construct invocation handed to a handler
#[derive(Debug, Clone)]
pub struct Call<'a> {
    pub name: &'a str,
    pub args: Vec<Arg<'a>>,
}

impl<'a> Call<'a> {
    /// Rendered text of argument `i`, `None` if it was not supplied
    pub fn text(&self, i: usize) -> Option<&str> {
        self.args.get(i).and_then(|a| a.text.as_deref())
    }

    /// Unrendered content of argument `i`
    pub fn nodes(&self, i: usize) -> Option<&'a [Node]> {
        self.args.get(i).and_then(|a| a.nodes)
    }

    /// Rendered text of a mandatory argument. The parser guarantees presence;
    /// a hand-built tree that omits it renders as empty.
    fn required(&self, i: usize) -> &str {
        self.text(i).unwrap_or_default()
    }
}

/// Common behavior for all construct handlers
#[enum_dispatch]
pub trait MacroHandler {
    /// Produce the text for one invocation
    fn render(&self, call: &Call<'_>, cx: &mut RenderContext<'_>) -> Result<String, RenderError>;

    /// Whether the tree walker should render present arguments before calling
    /// [`MacroHandler::render`]. Handlers that inspect structure, or ignore
    /// their arguments, return false and call back into the context themselves.
    fn renders_arguments(&self) -> bool {
        true
    }
}

/// Every handler the registry can hold
#[enum_dispatch(MacroHandler)]
#[derive(Debug, Clone)]
pub enum Handler {
    Root(RootHandler),
    Fraction(FractionHandler),
    Binomial(BinomialHandler),
    Upright(UprightHandler),
    Boxed(BoxedHandler),
    Subscript(SubscriptHandler),
    Superscript(SuperscriptHandler),
    PassThrough(PassThroughHandler),
    Greek(GreekHandler),
    Infinity(InfinityHandler),
    Pi(PiHandler),
    Literal(LiteralHandler),
    OperatorName(OperatorNameHandler),
    FunctionName(FunctionNameHandler),
    Fallback(FallbackHandler),
    Custom(CustomHandler),
}

/// True iff `text` holds an operator or a space and so needs parentheses
/// before being used as an operand.
pub fn needs_parentheses(text: &str) -> bool {
    text.contains(['+', '-', '*', '/', '^', ' '])
}

fn parenthesize(text: &str) -> String {
    if needs_parentheses(text) {
        format!("({text})")
    } else {
        text.to_string()
    }
}

// ============================================================================
// Roots
// ============================================================================

/// `\sqrt[n]{x}`: `sqrt(x)`, `x^0.5`, `x**(1/3)`, ...
#[derive(Debug, Clone, Copy, Default)]
pub struct RootHandler;

const RADICAL: usize = 0;
const OPERATORS: [&str; 2] = ["^", "**"];
const DECIMAL: usize = 0;

impl RootHandler {
    /// Parse a root index. Zero and non-finite values count as unparseable.
    fn parse_index(index: &str) -> Option<f64> {
        index
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n != 0.0)
    }

    /// Shortest decimal form of `value` if it has at most five fractional digits
    fn short_decimal(value: f64) -> Option<String> {
        let repr = value.to_string();
        let fraction_digits = repr.split_once('.').map_or(0, |(_, frac)| frac.len());
        (fraction_digits <= 5).then_some(repr)
    }
}

impl MacroHandler for RootHandler {
    fn render(&self, call: &Call<'_>, cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        let radicand = call.required(1);
        let weights = cx.weights();
        let radical = cx.choose_index(&weights.root_form) == RADICAL;

        let Some(index_text) = call.text(0) else {
            if radical {
                return Ok(format!("sqrt({radicand})"));
            }
            let operator = OPERATORS[cx.choose_index(&weights.root_operator)];
            let exponent = if cx.choose_index(&weights.root_exponent) == DECIMAL {
                "0.5"
            } else {
                "(1/2)"
            };
            return Ok(format!("{}{operator}{exponent}", parenthesize(radicand)));
        };

        let index = Self::parse_index(index_text);
        // An explicit index of 2 only takes the radical form when the draw
        // above chose it; otherwise it goes through the exponent path.
        if index == Some(2.0) && radical {
            return Ok(format!("sqrt({radicand})"));
        }

        let operator = OPERATORS[cx.choose_index(&weights.root_operator)];
        let fraction = format!("(1/{index_text})");
        let exponent = match index {
            Some(n) => match Self::short_decimal(1.0 / n) {
                Some(decimal) if cx.choose_index(&weights.root_exponent) == DECIMAL => decimal,
                _ => fraction,
            },
            None => {
                log::debug!("root index {:?} is not a number, using {}", index_text, fraction);
                fraction
            }
        };
        Ok(format!("{}{operator}{exponent}", parenthesize(radicand)))
    }
}

// ============================================================================
// Fractions and binomials
// ============================================================================

/// `\frac{a}{b}` → `a/b`, with each complex side parenthesized
#[derive(Debug, Clone, Copy, Default)]
pub struct FractionHandler;

impl MacroHandler for FractionHandler {
    fn render(&self, call: &Call<'_>, _cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        let numerator = parenthesize(call.required(0).trim());
        let denominator = parenthesize(call.required(1).trim());
        Ok(format!("{numerator}/{denominator}"))
    }
}

/// `\binom{n}{k}` → `C(n,k)`
#[derive(Debug, Clone, Copy, Default)]
pub struct BinomialHandler;

impl MacroHandler for BinomialHandler {
    fn render(&self, call: &Call<'_>, _cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        Ok(format!("C({},{})", call.required(0), call.required(1)))
    }
}

// ============================================================================
// Wrappers
// ============================================================================

/// `\mathrm{...}`: formatting stripped, with `\mathrm{e}` pinned to `e`
#[derive(Debug, Clone, Copy, Default)]
pub struct UprightHandler;

impl MacroHandler for UprightHandler {
    fn render(&self, call: &Call<'_>, _cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        let content = call.required(0);
        if content.trim() == "e" {
            return Ok("e".to_string());
        }
        Ok(content.to_string())
    }
}

/// `\boxed{x}` → `[x]`
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxedHandler;

impl MacroHandler for BoxedHandler {
    fn render(&self, call: &Call<'_>, _cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        Ok(format!("[{}]", call.required(0)))
    }
}

/// `x_{i+1}` → `x_(i+1)`
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriptHandler;

impl MacroHandler for SubscriptHandler {
    fn render(&self, call: &Call<'_>, _cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        Ok(format!("_({})", call.required(0)))
    }
}

/// `x^{2}` → `x^2`
#[derive(Debug, Clone, Copy, Default)]
pub struct SuperscriptHandler;

impl MacroHandler for SuperscriptHandler {
    fn render(&self, call: &Call<'_>, _cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        Ok(format!("^{}", call.required(0)))
    }
}

/// `\text{...}`, `\textbf{...}`: content unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughHandler;

impl MacroHandler for PassThroughHandler {
    fn render(&self, call: &Call<'_>, _cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        Ok(call.required(0).to_string())
    }
}

// ============================================================================
// Stochastic symbols
// ============================================================================

/// A Greek letter: its name or its symbol
#[derive(Debug, Clone, Copy)]
pub struct GreekHandler {
    pub symbol: &'static str,
}

impl MacroHandler for GreekHandler {
    fn render(&self, call: &Call<'_>, cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        let [name, symbol] = cx.weights().greek;
        Ok(cx
            .choose(&[(call.name, name), (self.symbol, symbol)])
            .to_string())
    }
}

/// `\infty`
#[derive(Debug, Clone, Copy, Default)]
pub struct InfinityHandler;

impl MacroHandler for InfinityHandler {
    fn render(&self, _call: &Call<'_>, cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        let weights = cx.weights().infinity;
        let i = cx.choose_index(&weights);
        Ok(INFINITY_FORMS[i].to_string())
    }
}

/// `\pi`
#[derive(Debug, Clone, Copy, Default)]
pub struct PiHandler;

impl MacroHandler for PiHandler {
    fn render(&self, _call: &Call<'_>, cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        let weights = cx.weights().pi;
        let i = cx.choose_index(&weights);
        Ok(PI_FORMS[i].to_string())
    }
}

// ============================================================================
// Deterministic names
// ============================================================================

/// Fixed substitution text: `\times` → `*`, `\left` → ``
#[derive(Debug, Clone, Copy)]
pub struct LiteralHandler {
    pub text: &'static str,
}

impl MacroHandler for LiteralHandler {
    fn render(&self, _call: &Call<'_>, _cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        Ok(self.text.to_string())
    }

    fn renders_arguments(&self) -> bool {
        false
    }
}

/// Big operators keep their marker: `\sum` → `\sum`
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatorNameHandler;

impl MacroHandler for OperatorNameHandler {
    fn render(&self, call: &Call<'_>, _cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        Ok(format!("\\{}", call.name))
    }

    fn renders_arguments(&self) -> bool {
        false
    }
}

/// Function names: `\sin` → `sin`
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionNameHandler;

impl MacroHandler for FunctionNameHandler {
    fn render(&self, call: &Call<'_>, _cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        Ok(call.name.to_string())
    }

    fn renders_arguments(&self) -> bool {
        false
    }
}

/// Unregistered constructs: the bare name, arguments dropped
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackHandler;

impl MacroHandler for FallbackHandler {
    fn render(&self, call: &Call<'_>, _cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        log::debug!("no handler for \\{}, rendering its name", call.name);
        Ok(call.name.to_string())
    }

    fn renders_arguments(&self) -> bool {
        false
    }
}

// ============================================================================
// User handlers
// ============================================================================

type HandlerFn =
    dyn Fn(&Call<'_>, &mut RenderContext<'_>) -> Result<String, RenderError> + Send + Sync;

/// A handler backed by a closure
#[derive(Clone)]
pub struct CustomHandler {
    func: Arc<HandlerFn>,
    eager: bool,
}

impl CustomHandler {
    /// Closure receiving rendered arguments
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Call<'_>, &mut RenderContext<'_>) -> Result<String, RenderError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            func: Arc::new(func),
            eager: true,
        }
    }

    /// Closure receiving only unrendered argument trees
    pub fn lazy<F>(func: F) -> Self
    where
        F: Fn(&Call<'_>, &mut RenderContext<'_>) -> Result<String, RenderError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            eager: false,
            ..Self::new(func)
        }
    }
}

impl fmt::Debug for CustomHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomHandler")
            .field("eager", &self.eager)
            .finish_non_exhaustive()
    }
}

impl MacroHandler for CustomHandler {
    fn render(&self, call: &Call<'_>, cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        (self.func)(call, cx)
    }

    fn renders_arguments(&self) -> bool {
        self.eager
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parentheses_predicate() {
        for text in ["a+1", "a-b", "2*x", "1/2", "x^2", "a b"] {
            assert!(needs_parentheses(text), "{text}");
        }
        for text in ["x", "42", "sqrt(x)", "α", ""] {
            assert!(!needs_parentheses(text), "{text}");
        }
    }

    #[test]
    fn root_index_parsing() {
        assert_eq!(RootHandler::parse_index(" 3 "), Some(3.0));
        assert_eq!(RootHandler::parse_index("2.0"), Some(2.0));
        assert_eq!(RootHandler::parse_index("n"), None);
        assert_eq!(RootHandler::parse_index("0"), None);
        assert_eq!(RootHandler::parse_index("inf"), None);
    }

    #[test]
    fn short_decimal_limits_fraction_digits() {
        assert_eq!(RootHandler::short_decimal(0.5).as_deref(), Some("0.5"));
        assert_eq!(RootHandler::short_decimal(1.0 / 32.0).as_deref(), Some("0.03125"));
        assert_eq!(RootHandler::short_decimal(1.0 / 64.0), None);
        assert_eq!(RootHandler::short_decimal(1.0 / 3.0), None);
        assert_eq!(RootHandler::short_decimal(1.0).as_deref(), Some("1"));
    }
}
