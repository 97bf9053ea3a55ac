use pest_derive::Parser;

pub mod ast;
pub mod errors;
pub mod log;
pub mod macros;
pub mod parse;
pub mod render;

pub use ast::{ArgKind, ArgumentSlot, Node, NodeList};
pub use errors::{Error, ParseError, RenderError, SignatureError, SourceContext};
pub use macros::{ArgSignature, MacroEntry, MacroRegistry};
pub use render::{RenderOptions, Renderer, StyleWeights};

#[derive(Parser)]
#[grammar = "latex.pest"]
pub struct LatexParser;

/// Input to [`render_to_text`]: raw markup or an already-built tree
#[derive(Debug, Clone, Copy)]
pub enum Document<'a> {
    Source(&'a str),
    Tree(&'a [Node]),
}

impl<'a> From<&'a str> for Document<'a> {
    fn from(source: &'a str) -> Self {
        Document::Source(source)
    }
}

impl<'a> From<&'a [Node]> for Document<'a> {
    fn from(nodes: &'a [Node]) -> Self {
        Document::Tree(nodes)
    }
}

impl<'a> From<&'a NodeList> for Document<'a> {
    fn from(nodes: &'a NodeList) -> Self {
        Document::Tree(nodes)
    }
}

/// Render markup or a tree to plain text with the standard construct set.
///
/// Every stochastic choice is drawn from a source seeded by `options.seed`,
/// or from entropy when no seed is set.
pub fn render_to_text<'a>(document: impl Into<Document<'a>>, options: &RenderOptions) -> Result<String, Error> {
    render_with_registry(document, MacroRegistry::shared(), options)
}

/// Like [`render_to_text`], against a caller-built registry
pub fn render_with_registry<'a>(
    document: impl Into<Document<'a>>,
    registry: &MacroRegistry,
    options: &RenderOptions,
) -> Result<String, Error> {
    let mut rng = options.rng();
    let renderer = Renderer::new(registry, options);
    let text = match document.into() {
        Document::Source(source) => {
            let source = SourceContext::anonymous(source);
            let nodes = parse::parse_bounded(&source, registry, options.max_depth)?;
            renderer.render(&nodes, &mut rng)?
        }
        Document::Tree(nodes) => renderer.render(nodes, &mut rng)?,
    };
    Ok(text)
}

/// Convert LaTeX math markup to plain text, one random variation per call.
///
/// Returns the text on success, or an error with diagnostics.
pub fn latex_to_text(source: &str) -> Result<String, miette::Report> {
    Ok(render_to_text(source, &RenderOptions::default())?)
}
