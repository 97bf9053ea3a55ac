//! Rendering context - tracks state during one render call

use rand::RngCore;

use crate::ast::Node;
use crate::errors::RenderError;
use crate::macros::MacroRegistry;

use super::options::{RenderOptions, StyleWeights};
use super::select;

/// Per-call state threaded through the tree walk and every handler.
///
/// The registry and options are shared, read-only; the random source and the
/// depth counter belong to this call alone.
pub struct RenderContext<'a> {
    registry: &'a MacroRegistry,
    options: &'a RenderOptions,
    rng: &'a mut dyn RngCore,
    depth: usize,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        registry: &'a MacroRegistry,
        options: &'a RenderOptions,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        Self {
            registry,
            options,
            rng,
            depth: 0,
        }
    }

    pub fn registry(&self) -> &'a MacroRegistry {
        self.registry
    }

    pub fn options(&self) -> &'a RenderOptions {
        self.options
    }

    pub fn weights(&self) -> &'a StyleWeights {
        &self.options.weights
    }

    /// Render a node list to text. This is the callback handlers use for
    /// their own sub-trees.
    pub fn render(&mut self, nodes: &[Node]) -> Result<String, RenderError> {
        if self.depth >= self.options.max_depth {
            return Err(RenderError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let out = super::render_nodes(self, nodes);
        self.depth -= 1;
        out
    }

    /// Weighted index draw from this call's random source
    pub fn choose_index(&mut self, weights: &[f64]) -> usize {
        select::choose_index(&mut *self.rng, weights)
    }

    /// Weighted text draw from this call's random source
    pub fn choose<'s>(&mut self, options: &[(&'s str, f64)]) -> &'s str {
        select::choose(&mut *self.rng, options)
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }
}
