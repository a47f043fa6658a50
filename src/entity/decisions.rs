//! Decision log - the record of an entity's reproductions and severances

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::{EntityId, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeveranceReason {
    /// Parent resource fell under its panic threshold
    Panic,
    /// Child grew strong enough to let go
    Release,
}

impl fmt::Display for SeveranceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeveranceReason::Panic => write!(f, "Panic"),
            SeveranceReason::Release => write!(f, "Release"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decision {
    Reproduced {
        tick: Tick,
        child: EntityId,
        child_label: String,
        /// Parent resource after paying the reproduction cost
        resource_after: f64,
    },
    Severed {
        tick: Tick,
        reason: SeveranceReason,
        child: EntityId,
        child_label: String,
        pain: f64,
    },
}

impl Decision {
    pub fn tag(&self) -> &'static str {
        match self {
            Decision::Reproduced { .. } => "[REPRO]",
            Decision::Severed { .. } => "[SEVER]",
        }
    }

    pub fn tick(&self) -> Tick {
        match self {
            Decision::Reproduced { tick, .. } | Decision::Severed { tick, .. } => *tick,
        }
    }

    pub fn child(&self) -> EntityId {
        match self {
            Decision::Reproduced { child, .. } | Decision::Severed { child, .. } => *child,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Reproduced {
                child_label,
                resource_after,
                ..
            } => write!(
                f,
                "{} Created {}, HP dropped to {:.3}",
                self.tag(),
                child_label,
                resource_after
            ),
            Decision::Severed {
                reason,
                child_label,
                pain,
                ..
            } => write!(
                f,
                "{} {} ({}). Pain: -{:.3}",
                self.tag(),
                reason,
                child_label,
                pain
            ),
        }
    }
}

/// Append-only sequence of decisions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionLog {
    entries: Vec<Decision>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, decision: Decision) {
        self.entries.push(decision);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decision> {
        self.entries.iter()
    }

    pub fn reproductions(&self) -> impl Iterator<Item = &Decision> {
        self.entries
            .iter()
            .filter(|d| matches!(d, Decision::Reproduced { .. }))
    }

    pub fn severances(&self) -> impl Iterator<Item = &Decision> {
        self.entries
            .iter()
            .filter(|d| matches!(d, Decision::Severed { .. }))
    }

    /// Human-readable lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|d| d.to_string()).collect()
    }
}
