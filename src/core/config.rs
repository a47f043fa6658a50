//! Simulation configuration with documented constants
//!
//! Every tunable of the lifecycle engine lives here and is threaded through
//! entity construction and `step` by reference. Nothing reads a global.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{GenesisError, Result};

/// A founder entity placed in the population at tick 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FounderSpec {
    /// Display label that replaces the generated `G0_nnnn` label
    pub name: String,
    /// Forced attachment weight, bypassing random genesis for this trait
    pub attachment: f64,
}

impl FounderSpec {
    pub fn new(name: impl Into<String>, attachment: f64) -> Self {
        Self {
            name: name.into(),
            attachment,
        }
    }
}

/// Configuration for the lifecycle engine
///
/// The defaults reproduce the canonical attachment-spectrum experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === RNG ===
    /// Seed for the single shared random stream
    pub seed: u64,

    // === LIFE KERNEL ===
    /// Resource every entity is born with (1.0)
    ///
    /// Children start fresh regardless of how much the parent has left.
    pub start_resource: f64,

    /// Resource at or below which an entity dies (0.0001)
    pub death_epsilon: f64,

    // === SEVERANCE ===
    /// Base pain of cutting a child loose (0.05)
    ///
    /// Actual pain is `severance_base_pain * (1 + attachment)`, so a
    /// martyr-level parent pays nearly double what an egoist pays.
    pub severance_base_pain: f64,

    /// Attachment above which a parent never severs (0.95)
    pub martyr_attachment: f64,

    /// Panic threshold scale: `panic_scale * (1 - attachment)` (0.5)
    ///
    /// Low attachment means a high threshold, so the parent panics and cuts
    /// ties at the first sign of discomfort.
    pub panic_scale: f64,

    /// Child resource above which release is considered (0.8)
    pub release_base: f64,

    /// Extra child strength demanded per unit of parent attachment (0.15)
    pub release_attachment_scale: f64,

    // === REPRODUCTION ===
    /// Resource the parent must exceed before reproduction is rolled (0.6)
    pub reproduction_threshold: f64,

    /// Chance to reproduce once the threshold is met (0.2)
    pub reproduction_probability: f64,

    /// Fraction of current resource paid by the parent per child (0.4)
    pub reproduction_cost_fraction: f64,

    // === INHERITANCE ===
    /// Half-width of the uniform noise added to each inherited weight (0.1)
    pub mutation_rate: f64,

    /// Range for freshly generated founder weights ([0.1, 0.9])
    pub genesis_min: f64,
    pub genesis_max: f64,

    /// Clamp applied to inherited weights ([0.01, 0.99])
    pub trait_min: f64,
    pub trait_max: f64,

    // === STEP COSTS ===
    /// Floor cost every living entity pays each tick (0.01)
    pub base_metabolism: f64,

    /// Penalty per unit of missing affinity: `(1 - best) * mismatch_scale` (0.02)
    pub mismatch_scale: f64,

    /// Cost per child still held at the end of the step (0.005)
    pub entanglement_tax: f64,

    // === ENVIRONMENT & LOOP ===
    /// Candidate structures produced per environment call (5)
    pub structures_per_tick: usize,

    /// Tick budget for a run (800)
    pub max_ticks: u64,

    /// Population at which a run stops early (5000)
    pub max_population: usize,

    /// Founders seeded into the population, in stepping order
    pub founders: Vec<FounderSpec>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,

            start_resource: 1.0,
            death_epsilon: 0.0001,

            severance_base_pain: 0.05,
            martyr_attachment: 0.95,
            panic_scale: 0.5,
            release_base: 0.8,
            release_attachment_scale: 0.15,

            reproduction_threshold: 0.6,
            reproduction_probability: 0.2,
            reproduction_cost_fraction: 0.4,

            mutation_rate: 0.1,
            genesis_min: 0.1,
            genesis_max: 0.9,
            trait_min: 0.01,
            trait_max: 0.99,

            base_metabolism: 0.01,
            mismatch_scale: 0.02,
            entanglement_tax: 0.005,

            structures_per_tick: 5,
            max_ticks: 800,
            max_population: 5000,

            founders: vec![
                FounderSpec::new("Adam_Egoist", 0.05),
                FounderSpec::new("Eve_Martyr", 0.98),
            ],
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if let Some((name, value)) = self.float_fields().find(|(_, v)| !v.is_finite()) {
            return Err(GenesisError::InvalidConfig(format!(
                "{} ({}) must be finite",
                name, value
            )));
        }

        if let Some(founder) = self.founders.iter().find(|f| !f.attachment.is_finite()) {
            return Err(GenesisError::InvalidConfig(format!(
                "founder {} attachment ({}) must be finite",
                founder.name, founder.attachment
            )));
        }

        if self.start_resource <= 0.0 {
            return Err(GenesisError::InvalidConfig(format!(
                "start_resource ({}) must be positive",
                self.start_resource
            )));
        }

        if self.death_epsilon < 0.0 || self.death_epsilon >= self.start_resource {
            return Err(GenesisError::InvalidConfig(format!(
                "death_epsilon ({}) must lie in [0, start_resource ({}))",
                self.death_epsilon, self.start_resource
            )));
        }

        let probabilities = [
            ("reproduction_probability", self.reproduction_probability),
            ("reproduction_cost_fraction", self.reproduction_cost_fraction),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(GenesisError::InvalidConfig(format!(
                    "{} ({}) must lie in [0, 1]",
                    name, value
                )));
            }
        }

        if self.genesis_min > self.genesis_max || self.trait_min > self.trait_max {
            return Err(GenesisError::InvalidConfig(
                "trait ranges must have min <= max".into(),
            ));
        }

        if self.mutation_rate < 0.0 {
            return Err(GenesisError::InvalidConfig(format!(
                "mutation_rate ({}) must not be negative",
                self.mutation_rate
            )));
        }

        let costs = [
            self.severance_base_pain,
            self.base_metabolism,
            self.mismatch_scale,
            self.entanglement_tax,
        ];
        if costs.iter().any(|c| *c < 0.0) {
            return Err(GenesisError::InvalidConfig("costs must not be negative".into()));
        }

        if self.structures_per_tick == 0 {
            return Err(GenesisError::InvalidConfig(
                "structures_per_tick must be at least 1".into(),
            ));
        }

        if self.max_population == 0 {
            return Err(GenesisError::InvalidConfig(
                "max_population must be at least 1".into(),
            ));
        }

        Ok(())
    }

    fn float_fields(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("start_resource", self.start_resource),
            ("death_epsilon", self.death_epsilon),
            ("severance_base_pain", self.severance_base_pain),
            ("martyr_attachment", self.martyr_attachment),
            ("panic_scale", self.panic_scale),
            ("release_base", self.release_base),
            ("release_attachment_scale", self.release_attachment_scale),
            ("reproduction_threshold", self.reproduction_threshold),
            ("reproduction_probability", self.reproduction_probability),
            ("reproduction_cost_fraction", self.reproduction_cost_fraction),
            ("mutation_rate", self.mutation_rate),
            ("genesis_min", self.genesis_min),
            ("genesis_max", self.genesis_max),
            ("trait_min", self.trait_min),
            ("trait_max", self.trait_max),
            ("base_metabolism", self.base_metabolism),
            ("mismatch_scale", self.mismatch_scale),
            ("entanglement_tax", self.entanglement_tax),
        ]
        .into_iter()
    }

    /// Pain paid to sever one child at the given attachment
    pub fn severance_pain(&self, attachment: f64) -> f64 {
        self.severance_base_pain * (1.0 + attachment)
    }

    /// Resource below which a parent with this attachment panics
    pub fn panic_threshold(&self, attachment: f64) -> f64 {
        self.panic_scale * (1.0 - attachment)
    }

    /// Child resource a parent with this attachment requires before release
    pub fn release_threshold(&self, attachment: f64) -> f64 {
        self.release_base + attachment * self.release_attachment_scale
    }
}
