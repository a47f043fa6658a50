//! Life kernel - the depletable resource every entity survives on

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;

/// Depletable life force with an aliveness flag
///
/// `alive == (resource > death_epsilon)`; once dead the resource is pinned
/// to 0.0 and every further `consume` is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeKernel {
    resource: f64,
    alive: bool,
    death_epsilon: f64,
}

impl LifeKernel {
    pub fn new(start_resource: f64, death_epsilon: f64) -> Self {
        let mut kernel = Self {
            resource: start_resource,
            alive: true,
            death_epsilon,
        };
        kernel.consume(0.0);
        kernel
    }

    /// Fresh kernel at the configured starting resource
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.start_resource, config.death_epsilon)
    }

    /// Spend `amount` of resource. A negative amount is a refund and is not
    /// capped at the starting resource.
    pub fn consume(&mut self, amount: f64) {
        if !self.alive {
            return;
        }
        self.resource -= amount;
        if self.resource <= self.death_epsilon {
            self.alive = false;
            self.resource = 0.0;
        }
    }

    pub fn resource(&self) -> f64 {
        self.resource
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}
