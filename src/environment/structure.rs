//! Candidate structures and the aesthetic dimensions they are scored on

use serde::{Deserialize, Serialize};

/// The four aesthetic dimensions shared by structures and preference weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AestheticTrait {
    Symmetry,
    Compression,
    Rhythm,
    Novelty,
}

impl AestheticTrait {
    pub const ALL: [AestheticTrait; 4] = [
        AestheticTrait::Symmetry,
        AestheticTrait::Compression,
        AestheticTrait::Rhythm,
        AestheticTrait::Novelty,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AestheticTrait::Symmetry => "symmetry",
            AestheticTrait::Compression => "compression",
            AestheticTrait::Rhythm => "rhythm",
            AestheticTrait::Novelty => "novelty",
        }
    }
}

/// A scoreable bundle of aesthetic attributes
///
/// Keys absent from a loaded structure deserialize to 0.0, so they
/// contribute nothing to affinity instead of failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Structure {
    pub symmetry: f64,
    pub compression: f64,
    pub rhythm: f64,
    pub novelty: f64,
}

impl Structure {
    pub fn new(symmetry: f64, compression: f64, rhythm: f64, novelty: f64) -> Self {
        Self {
            symmetry,
            compression,
            rhythm,
            novelty,
        }
    }

    /// Same value on every dimension
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn value(&self, dimension: AestheticTrait) -> f64 {
        match dimension {
            AestheticTrait::Symmetry => self.symmetry,
            AestheticTrait::Compression => self.compression,
            AestheticTrait::Rhythm => self.rhythm,
            AestheticTrait::Novelty => self.novelty,
        }
    }
}
