//! Macro registry: construct name → argument signature + handler
//!
//! The registry is the single source of truth for both the parser (which
//! needs signatures to collect arguments) and the renderer (which needs
//! handlers). It is built once and only read afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ast::ArgKind;
use crate::errors::SignatureError;
use crate::render::handlers::*;
use crate::render::symbols;

/// Ordered argument kinds a construct accepts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgSignature {
    kinds: Vec<ArgKind>,
}

impl ArgSignature {
    /// No arguments
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(kinds: Vec<ArgKind>) -> Self {
        Self { kinds }
    }

    /// `count` mandatory arguments
    pub fn mandatory(count: usize) -> Self {
        Self::new(vec![ArgKind::Mandatory; count])
    }

    pub fn kinds(&self) -> &[ArgKind] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Parse a compact spec string.
    ///
    /// `{` or `m` mandatory, `[` or `o` optional, `*` or `s` star,
    /// `e{_^}` one embellishment slot per trigger char, `r()` a delimited
    /// pair. `"[{"` is an optional argument followed by a mandatory one.
    pub fn parse(spec: &str) -> Result<Self, SignatureError> {
        let invalid = |reason| SignatureError::Invalid {
            spec: spec.to_string(),
            reason,
        };

        let mut kinds = Vec::new();
        let mut chars = spec.chars();
        while let Some(c) = chars.next() {
            match c {
                '{' | 'm' => kinds.push(ArgKind::Mandatory),
                '[' | 'o' => kinds.push(ArgKind::Optional),
                '*' | 's' => kinds.push(ArgKind::Star),
                'e' => {
                    if chars.next() != Some('{') {
                        return Err(invalid("`e` must be followed by `{triggers}`"));
                    }
                    let mut triggers = 0;
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(t) => {
                                kinds.push(ArgKind::Embellishment(t));
                                triggers += 1;
                            }
                            None => return Err(invalid("unterminated embellishment list")),
                        }
                    }
                    if triggers == 0 {
                        return Err(invalid("empty embellishment list"));
                    }
                }
                'r' => match (chars.next(), chars.next()) {
                    (Some(open), Some(close)) => kinds.push(ArgKind::AnyDelimited(open, close)),
                    _ => return Err(invalid("`r` needs an open and a close delimiter")),
                },
                c if c.is_whitespace() => {}
                _ => return Err(invalid("unknown argument kind")),
            }
        }
        Ok(Self { kinds })
    }
}

/// A registered construct
#[derive(Debug, Clone)]
pub struct MacroEntry {
    pub signature: ArgSignature,
    pub handler: Handler,
}

/// Name → entry table with last-registration-wins semantics
#[derive(Debug, Clone)]
pub struct MacroRegistry {
    entries: HashMap<String, MacroEntry>,
    fallback: MacroEntry,
}

impl Default for MacroRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroRegistry {
    /// An empty registry: every construct renders as its bare name
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            fallback: MacroEntry {
                signature: ArgSignature::none(),
                handler: FallbackHandler.into(),
            },
        }
    }

    /// The full construct set
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.register(
            "sqrt",
            ArgSignature::new(vec![ArgKind::Optional, ArgKind::Mandatory]),
            RootHandler,
        );
        for name in ["frac", "dfrac", "tfrac"] {
            registry.register(name, ArgSignature::mandatory(2), FractionHandler);
        }
        registry.register("binom", ArgSignature::mandatory(2), BinomialHandler);
        registry.register("mathrm", ArgSignature::mandatory(1), UprightHandler);
        registry.register("boxed", ArgSignature::mandatory(1), BoxedHandler);
        registry.register("_", ArgSignature::mandatory(1), SubscriptHandler);
        registry.register("^", ArgSignature::mandatory(1), SuperscriptHandler);
        for name in symbols::PASS_THROUGH {
            registry.register(*name, ArgSignature::mandatory(1), PassThroughHandler);
        }

        for (name, symbol) in symbols::GREEK_LETTERS {
            registry.register(*name, ArgSignature::none(), GreekHandler { symbol: *symbol });
        }
        registry.register("infty", ArgSignature::none(), InfinityHandler);
        registry.register("pi", ArgSignature::none(), PiHandler);

        for (name, text) in symbols::SYMBOLS {
            registry.register(*name, ArgSignature::none(), LiteralHandler { text: *text });
        }
        for name in symbols::SUPPRESSED {
            registry.register(*name, ArgSignature::none(), LiteralHandler { text: "" });
        }
        for name in symbols::OPERATOR_NAMES {
            registry.register(*name, ArgSignature::none(), OperatorNameHandler);
        }
        for name in symbols::FUNCTION_NAMES {
            registry.register(*name, ArgSignature::none(), FunctionNameHandler);
        }

        registry
    }

    /// Shared instance of [`MacroRegistry::standard`]
    pub fn shared() -> &'static MacroRegistry {
        static STANDARD: LazyLock<MacroRegistry> = LazyLock::new(MacroRegistry::standard);
        &STANDARD
    }

    /// Insert or replace an entry. Returns the entry it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        signature: ArgSignature,
        handler: impl Into<Handler>,
    ) -> Option<MacroEntry> {
        self.entries.insert(
            name.into(),
            MacroEntry {
                signature,
                handler: handler.into(),
            },
        )
    }

    /// The registered entry, if any
    pub fn get(&self, name: &str) -> Option<&MacroEntry> {
        self.entries.get(name)
    }

    /// The registered entry, or the pass-through fallback. Never fails.
    pub fn resolve(&self, name: &str) -> &MacroEntry {
        self.entries.get(name).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
