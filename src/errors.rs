//! Error types with rich diagnostics using miette
//!
//! Parse errors carry source spans for readable error messages. Render errors
//! have no span: by the time the renderer runs, the source may be long gone
//! (callers can hand in a tree they built themselves).

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (filename or "<input>")
    pub name: String,
    /// The full source text
    pub source: String,
}

impl SourceContext {
    /// Create a new source context
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Source context for anonymous input
    pub fn anonymous(source: impl Into<String>) -> Self {
        Self::new("<input>", source)
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Structural errors raised while turning markup into a node tree
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("syntax error: {message}")]
    #[diagnostic(
        code(varitex::parse::syntax),
        help("check that every `{{`, `$` and `\\(` has a matching close")
    )]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("missing argument for \\{name}")]
    #[diagnostic(code(varitex::parse::missing_argument))]
    MissingArgument {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("expects a mandatory argument")]
        span: SourceSpan,
    },
}

// ============================================================================
// Render Errors
// ============================================================================

/// Errors that fail a render call. The depth guard also fires while parsing
/// source that nests past the limit.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("nesting depth exceeded (max {limit})")]
    #[diagnostic(
        code(varitex::render::depth_exceeded),
        help("raise `RenderOptions::max_depth` if the input is legitimately this deep")
    )]
    DepthExceeded { limit: usize },
}

// ============================================================================
// Registry Errors
// ============================================================================

/// Malformed argument signature spec strings
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid argument signature {spec:?}: {reason}")]
    #[diagnostic(code(varitex::registry::invalid_signature))]
    Invalid { spec: String, reason: &'static str },
}

// ============================================================================
// User-Facing Errors
// ============================================================================

/// Anything `render_to_text` can fail with
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),
}
