//! Render configuration

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::defaults;

/// Weights for every stochastic construct. Each array is in the order the
/// handler lists its renderings; weights need not sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleWeights {
    /// `[name, symbol]`
    pub greek: [f64; 2],
    /// `["infinity", "inf", "∞"]`
    pub infinity: [f64; 3],
    /// `["pi", "π"]`
    pub pi: [f64; 2],
    /// `[sqrt(x), power form]`
    pub root_form: [f64; 2],
    /// `["^", "**"]`
    pub root_operator: [f64; 2],
    /// `[decimal, (1/n)]`
    pub root_exponent: [f64; 2],
}

impl Default for StyleWeights {
    fn default() -> Self {
        Self {
            greek: defaults::GREEK_WEIGHTS,
            infinity: defaults::INFINITY_WEIGHTS,
            pi: defaults::PI_WEIGHTS,
            root_form: defaults::ROOT_FORM_WEIGHTS,
            root_operator: defaults::ROOT_OPERATOR_WEIGHTS,
            root_exponent: defaults::ROOT_EXPONENT_WEIGHTS,
        }
    }
}

impl StyleWeights {
    /// Always pick the first rendering. Output no longer depends on the
    /// random source.
    pub fn canonical() -> Self {
        Self {
            greek: [1.0, 0.0],
            infinity: [1.0, 0.0, 0.0],
            pi: [1.0, 0.0],
            root_form: [1.0, 0.0],
            root_operator: [1.0, 0.0],
            root_exponent: [1.0, 0.0],
        }
    }
}

/// Options for a render call
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Seed for the random source; `None` seeds from OS entropy
    pub seed: Option<u64>,
    pub weights: StyleWeights,
    /// Maximum node nesting before the render fails
    pub max_depth: usize,
    /// Emitted wherever the source had a `%` comment
    pub comment_separator: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            seed: None,
            weights: StyleWeights::default(),
            max_depth: defaults::MAX_DEPTH,
            comment_separator: defaults::COMMENT_SEPARATOR.to_string(),
        }
    }
}

impl RenderOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Seeded options with canonical weights, for reproducible plain output
    pub fn canonical() -> Self {
        Self::seeded(0).with_weights(StyleWeights::canonical())
    }

    pub fn with_weights(mut self, weights: StyleWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_comment_separator(mut self, separator: impl Into<String>) -> Self {
        self.comment_separator = separator.into();
        self
    }

    /// A fresh random source for one render call
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn same_seed_same_stream() {
        let options = RenderOptions::seeded(7);
        let (mut a, mut b) = (options.rng(), options.rng());
        for _ in 0..8 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn canonical_weights_pick_first() {
        let w = StyleWeights::canonical();
        assert_eq!(w.infinity, [1.0, 0.0, 0.0]);
        assert_eq!(RenderOptions::canonical().weights, w);
    }
}
