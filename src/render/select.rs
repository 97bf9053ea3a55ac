//! Weighted choice among equally valid renderings
//!
//! Every call is an independent draw from the caller's random source, so two
//! occurrences of the same construct may come out differently.

use rand::Rng;
use rand::distributions::{Distribution, WeightedError, WeightedIndex};

use crate::log;

/// Index of the chosen weight. Weights are normalized internally.
///
/// A table that cannot be sampled (empty, negative, infinite or NaN entries,
/// all zeros) selects index 0 without touching the random source.
pub fn choose_index<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> usize {
    match distribution(weights) {
        Ok(dist) => {
            let index = dist.sample(rng);
            log::trace!("chose {} of {:?}", index, weights);
            index
        }
        Err(err) => {
            log::warn!("unusable weight table {:?}: {}", weights, err);
            0
        }
    }
}

/// Finite weights whose total overflows are scaled down by the largest one
fn distribution(weights: &[f64]) -> Result<WeightedIndex<f64>, WeightedError> {
    if weights.iter().any(|w| !w.is_finite()) {
        return Err(WeightedError::InvalidWeight);
    }
    if weights.iter().sum::<f64>().is_finite() {
        return WeightedIndex::new(weights);
    }
    let max = weights.iter().copied().fold(0.0, f64::max);
    WeightedIndex::new(weights.iter().map(|w| w / max))
}

/// Pick one text out of `(text, weight)` pairs. Empty input yields `""`.
pub fn choose<'a, R: Rng + ?Sized>(rng: &mut R, options: &[(&'a str, f64)]) -> &'a str {
    let weights: Vec<f64> = options.iter().map(|(_, w)| *w).collect();
    options
        .get(choose_index(rng, &weights))
        .map_or("", |(text, _)| *text)
}
