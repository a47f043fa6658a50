//! Population state - the active set, the history registry and founder
//! bookkeeping for one run

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, IdAllocator, Tick};
use crate::entity::Entity;
use crate::environment::{Environment, RandomEnvironment};
use crate::simulation::registry::Registry;

/// First death of a founder, as observed at the end of a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FounderDeath {
    pub tick: Tick,
    /// Children still held when the founder died
    pub children_entangled: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FounderRecord {
    pub id: EntityId,
    pub name: String,
    pub death: Option<FounderDeath>,
}

/// One simulation run
///
/// The RNG is owned here and shared by every entity in stepping order, so a
/// seed fully determines the run.
#[derive(Debug, Clone)]
pub struct Simulation<E: Environment = RandomEnvironment> {
    pub current_tick: Tick,
    pub(super) config: SimulationConfig,
    pub(super) rng: ChaCha8Rng,
    pub(super) environment: E,
    pub(super) registry: Registry,
    pub(super) population: Vec<EntityId>,
    pub(super) ids: IdAllocator,
    pub(super) founders: Vec<FounderRecord>,
    pub(super) total_births: usize,
    pub(super) peak_population: usize,
}

impl Simulation<RandomEnvironment> {
    /// Run with the uniform random environment sized from the config
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let environment = RandomEnvironment::new(config.structures_per_tick);
        Self::with_environment(config, environment)
    }
}

impl<E: Environment> Simulation<E> {
    pub fn with_environment(config: SimulationConfig, environment: E) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut ids = IdAllocator::new();
        let mut registry = Registry::new();
        let mut population = Vec::with_capacity(config.founders.len());
        let mut founders = Vec::with_capacity(config.founders.len());

        for spec in &config.founders {
            let founder = Entity::founder(ids.allocate(), spec, &config, &mut rng);
            tracing::info!(
                name = %founder.label(),
                attachment = founder.attachment(),
                panic_threshold = founder.panic_threshold(),
                "founder created"
            );
            founders.push(FounderRecord {
                id: founder.id(),
                name: spec.name.clone(),
                death: None,
            });
            population.push(founder.id());
            registry.insert(founder);
        }

        Ok(Self {
            current_tick: 0,
            peak_population: population.len(),
            config,
            rng,
            environment,
            registry,
            population,
            ids,
            founders,
            total_births: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Ids of the active population in stepping order
    pub fn population(&self) -> &[EntityId] {
        &self.population
    }

    /// Entities of the active population in stepping order
    pub fn living(&self) -> impl Iterator<Item = &Entity> {
        self.population.iter().filter_map(|id| self.registry.get(*id))
    }

    /// Every entity ever born, including the dead
    pub fn history(&self) -> &Registry {
        &self.registry
    }

    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.registry.entity(id)
    }

    pub fn founders(&self) -> &[FounderRecord] {
        &self.founders
    }

    pub fn founder(&self, name: &str) -> Option<&FounderRecord> {
        self.founders.iter().find(|f| f.name == name)
    }

    pub fn is_extinct(&self) -> bool {
        self.population.is_empty()
    }

    pub fn total_births(&self) -> usize {
        self.total_births
    }

    pub fn peak_population(&self) -> usize {
        self.peak_population
    }

    /// Whether the living population has reached `max_population`
    pub fn is_capped(&self) -> bool {
        self.population.len() >= self.config.max_population
    }

    /// Whether the run has ended, by budget, extinction or the population cap
    pub fn is_finished(&self) -> bool {
        self.current_tick >= self.config.max_ticks || self.is_extinct() || self.is_capped()
    }

    /// Record the first death of any founder not yet marked dead
    pub(super) fn observe_founder_deaths(&mut self) {
        for record in self.founders.iter_mut().filter(|r| r.death.is_none()) {
            let Some(founder) = self.registry.get(record.id) else {
                continue;
            };
            if founder.is_alive() {
                continue;
            }
            let death = FounderDeath {
                tick: founder.died_at().unwrap_or(self.current_tick),
                children_entangled: founder.children().len(),
            };
            tracing::info!(
                name = %record.name,
                tick = death.tick,
                children = death.children_entangled,
                "founder died"
            );
            record.death = Some(death);
        }
    }
}
