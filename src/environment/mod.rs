//! Environment - the source of candidate structures entities react to
//!
//! Each step an entity asks the environment for a batch of structures and
//! keeps the best score it can achieve against them.

pub mod structure;

pub use structure::{AestheticTrait, Structure};

use rand::Rng;
use serde::Deserialize;
use std::path::Path;

use crate::core::error::{GenesisError, Result};

/// Producer of candidate structures
///
/// Implementations must always return a non-empty batch.
pub trait Environment {
    fn generate_structures<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Structure>;
}

/// Stateless generator drawing every attribute uniformly from [0, 1)
#[derive(Debug, Clone)]
pub struct RandomEnvironment {
    structures_per_tick: usize,
}

impl RandomEnvironment {
    pub fn new(structures_per_tick: usize) -> Self {
        Self {
            structures_per_tick: structures_per_tick.max(1),
        }
    }

    pub fn structures_per_tick(&self) -> usize {
        self.structures_per_tick
    }
}

impl Default for RandomEnvironment {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Environment for RandomEnvironment {
    fn generate_structures<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Structure> {
        (0..self.structures_per_tick)
            .map(|_| Structure {
                symmetry: rng.gen(),
                compression: rng.gen(),
                rhythm: rng.gen(),
                novelty: rng.gen(),
            })
            .collect()
    }
}

/// Deterministic environment replaying fixed batches in order, then wrapping
///
/// Consumes no randomness, so runs against it only depend on the entity
/// stream of the seeded RNG.
#[derive(Debug, Clone)]
pub struct FixedEnvironment {
    batches: Vec<Vec<Structure>>,
    cursor: usize,
}

#[derive(Debug, Deserialize)]
struct FixedEnvironmentFile {
    batches: Vec<Vec<Structure>>,
}

impl FixedEnvironment {
    /// Every batch must contain at least one structure
    pub fn new(batches: Vec<Vec<Structure>>) -> Result<Self> {
        if batches.is_empty() || batches.iter().any(|b| b.is_empty()) {
            return Err(GenesisError::InvalidConfig(
                "fixed environment needs non-empty batches".into(),
            ));
        }
        Ok(Self { batches, cursor: 0 })
    }

    /// Same batch on every call
    pub fn constant(batch: Vec<Structure>) -> Result<Self> {
        Self::new(vec![batch])
    }

    /// Parse `batches = [[{ symmetry = 0.5, ... }, ...], ...]`
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: FixedEnvironmentFile = toml::from_str(content)?;
        Self::new(file.batches)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl Environment for FixedEnvironment {
    fn generate_structures<R: Rng + ?Sized>(&mut self, _rng: &mut R) -> Vec<Structure> {
        let batch = self.batches[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.batches.len();
        batch
    }
}
