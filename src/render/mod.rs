//! Plain-text rendering of a parsed node tree
//!
//! This module is organized into submodules:
//! - `defaults`: default weights and limits
//! - `options`: `RenderOptions` and `StyleWeights`
//! - `context`: `RenderContext`, per-call state and the render callback
//! - `select`: weighted choice among renderings
//! - `handlers`: one handler per construct family
//! - `symbols`: static substitution tables

pub mod context;
pub mod defaults;
pub mod handlers;
pub mod options;
pub mod select;
pub mod symbols;

// Re-export commonly used items
pub use context::RenderContext;
pub use handlers::{Arg, Call, CustomHandler, Handler, MacroHandler, needs_parentheses};
pub use options::{RenderOptions, StyleWeights};

use rand::RngCore;

use crate::ast::{ArgKind, Construct, Group, Node};
use crate::errors::RenderError;
use crate::macros::MacroRegistry;

/// Delimiters whose group renders as just its content
const PASS_THROUGH_DELIMITERS: &[&str] = &["{", "$", "$$", "\\(", "\\["];

/// Script triggers; a group opened by one of these is an embellishment
const SCRIPT_TRIGGERS: &[&str] = &["_", "^"];

/// Renders node trees against one registry and one set of options.
///
/// Cheap to construct; holds only references. The random source is passed per
/// call so that concurrent renders never share one.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'r> {
    registry: &'r MacroRegistry,
    options: &'r RenderOptions,
}

impl<'r> Renderer<'r> {
    pub fn new(registry: &'r MacroRegistry, options: &'r RenderOptions) -> Self {
        Self { registry, options }
    }

    /// Render `nodes` to text, drawing every stochastic choice from `rng`.
    ///
    /// Either the whole tree renders or an error is returned; there is no
    /// partial output.
    pub fn render<R: RngCore>(&self, nodes: &[Node], rng: &mut R) -> Result<String, RenderError> {
        let mut cx = RenderContext::new(self.registry, self.options, rng);
        cx.render(nodes)
    }
}

/// Walk a node list in document order, concatenating each node's text.
/// Called through [`RenderContext::render`], which owns the depth guard.
pub(crate) fn render_nodes(cx: &mut RenderContext<'_>, nodes: &[Node]) -> Result<String, RenderError> {
    let mut out = String::new();
    for node in nodes {
        render_node(cx, node, &mut out)?;
    }
    Ok(out)
}

fn render_node(cx: &mut RenderContext<'_>, node: &Node, out: &mut String) -> Result<(), RenderError> {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Comment(_) => out.push_str(&cx.options().comment_separator),
        Node::Special(symbol) => out.push_str(symbols::special(symbol).unwrap_or(symbol.as_str())),
        Node::Group(group) => render_group(cx, group, out)?,
        Node::Construct(construct) => {
            let text = render_construct(cx, construct)?;
            out.push_str(&text);
        }
    }
    Ok(())
}

fn render_group(cx: &mut RenderContext<'_>, group: &Group, out: &mut String) -> Result<(), RenderError> {
    let open = group.open.as_str();
    if PASS_THROUGH_DELIMITERS.contains(&open) {
        out.push_str(&cx.render(&group.children)?);
    } else if SCRIPT_TRIGGERS.contains(&open) && group.close.is_empty() {
        // An embellishment renders the way its trigger construct would
        let slots = [(ArgKind::Mandatory, Some(group.children.as_slice()))];
        out.push_str(&dispatch(cx, open, &slots)?);
    } else {
        out.push_str(&group.open);
        out.push_str(&cx.render(&group.children)?);
        out.push_str(&group.close);
    }
    Ok(())
}

fn render_construct(cx: &mut RenderContext<'_>, construct: &Construct) -> Result<String, RenderError> {
    let slots: Vec<_> = construct
        .arguments
        .iter()
        .map(|slot| (slot.kind, slot.content.as_deref()))
        .collect();
    dispatch(cx, &construct.name, &slots)
}

/// Resolve `name`, render its arguments if the handler wants them rendered,
/// and invoke the handler.
fn dispatch<'n>(
    cx: &mut RenderContext<'_>,
    name: &'n str,
    slots: &[(ArgKind, Option<&'n [Node]>)],
) -> Result<String, RenderError> {
    let entry = cx.registry().resolve(name);
    let eager = entry.handler.renders_arguments();

    let mut args = Vec::with_capacity(slots.len());
    for &(kind, nodes) in slots {
        let text = match nodes {
            Some(nodes) if eager => Some(cx.render(nodes)?),
            _ => None,
        };
        args.push(Arg { kind, nodes, text });
    }

    entry.handler.render(&Call { name, args }, cx)
}
