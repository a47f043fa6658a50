//! Preference core - an entity's heritable trait vector
//!
//! Four aesthetic weights decide how much an entity enjoys a structure.
//! The fifth weight, attachment, never scores structures; it governs how
//! tightly the entity holds on to its children.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::environment::{AestheticTrait, Structure};

/// The five heritable weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitWeights {
    pub symmetry: f64,
    pub compression: f64,
    pub rhythm: f64,
    pub novelty: f64,
    /// 0.0 (cold) to 1.0 (martyr)
    pub attachment: f64,
}

impl TraitWeights {
    pub fn aesthetic(&self, dimension: AestheticTrait) -> f64 {
        match dimension {
            AestheticTrait::Symmetry => self.symmetry,
            AestheticTrait::Compression => self.compression,
            AestheticTrait::Rhythm => self.rhythm,
            AestheticTrait::Novelty => self.novelty,
        }
    }

    /// Apply `f` to every weight in declaration order
    fn map(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self {
            symmetry: f(self.symmetry),
            compression: f(self.compression),
            rhythm: f(self.rhythm),
            novelty: f(self.novelty),
            attachment: f(self.attachment),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceCore {
    weights: TraitWeights,
}

impl PreferenceCore {
    /// Random genesis: every weight uniform in the configured genesis range
    pub fn genesis<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Self {
        let range = config.genesis_min..=config.genesis_max;
        let weights = TraitWeights {
            symmetry: rng.gen_range(range.clone()),
            compression: rng.gen_range(range.clone()),
            rhythm: rng.gen_range(range.clone()),
            novelty: rng.gen_range(range.clone()),
            attachment: rng.gen_range(range),
        };
        Self { weights }
    }

    /// Single-parent inheritance with uniform noise of half-width `mutation_rate`
    ///
    /// Results are clamped to `[trait_min, trait_max]` whatever the parent
    /// value or rate.
    pub fn inherit<R: Rng + ?Sized>(
        parent: &PreferenceCore,
        mutation_rate: f64,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Self {
        let rate = mutation_rate.abs();
        let weights = parent.weights.map(|base| {
            let noise = rng.gen_range(-rate..=rate);
            (base + noise).clamp(config.trait_min, config.trait_max)
        });
        Self { weights }
    }

    pub fn from_weights(weights: TraitWeights) -> Self {
        Self { weights }
    }

    /// Force the attachment weight; used to set up founders
    pub fn override_attachment(&mut self, attachment: f64) {
        self.weights.attachment = attachment;
    }

    pub fn weights(&self) -> &TraitWeights {
        &self.weights
    }

    pub fn attachment(&self) -> f64 {
        self.weights.attachment
    }

    /// Aesthetic pleasure from a structure. Attachment does not contribute.
    pub fn affinity(&self, structure: &Structure) -> f64 {
        AestheticTrait::ALL
            .iter()
            .map(|d| self.weights.aesthetic(*d) * structure.value(*d))
            .sum()
    }
}
