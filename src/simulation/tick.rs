//! Tick system - advances every active entity by one step
//!
//! The entities stepped in a tick are the population as it stood when the
//! tick began. Newborns join afterwards and first act on the next tick.

use crate::core::types::{EntityId, Tick};
use crate::entity::StepContext;
use crate::environment::Environment;
use crate::simulation::population::Simulation;
use crate::simulation::report::RunReport;

/// What happened during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    pub tick: Tick,
    /// Entities stepped (the tick-start population)
    pub stepped: usize,
    /// Ids born this tick, in birth order
    pub newborns: Vec<EntityId>,
    /// Entities that died during this tick
    pub deaths: usize,
    /// Active population after the tick
    pub population: usize,
}

/// Run one tick
///
/// Next population = alive survivors of the tick-start population, in their
/// previous order, followed by this tick's newborns.
pub fn run_simulation_tick<E: Environment>(sim: &mut Simulation<E>) -> TickSummary {
    let tick = sim.current_tick;
    let snapshot = std::mem::take(&mut sim.population);
    let stepped = snapshot.len();
    let mut newborns = Vec::new();
    let mut deaths = 0;

    for &id in &snapshot {
        let Some(mut entity) = sim.registry.take(id) else {
            continue;
        };
        let was_alive = entity.is_alive();

        let mut ctx = StepContext {
            config: &sim.config,
            ids: &mut sim.ids,
            tick,
        };
        let child = entity.step(&sim.registry, &mut sim.environment, &mut ctx, &mut sim.rng);

        if was_alive && !entity.is_alive() {
            deaths += 1;
        }
        sim.registry.insert(entity);

        if let Some(child) = child {
            newborns.push(child.id());
            sim.registry.insert(child);
        }
    }

    sim.population = snapshot
        .into_iter()
        .filter(|id| sim.registry.get(*id).is_some_and(|e| e.is_alive()))
        .chain(newborns.iter().copied())
        .collect();

    sim.total_births += newborns.len();
    sim.peak_population = sim.peak_population.max(sim.population.len());
    sim.observe_founder_deaths();
    sim.current_tick += 1;

    tracing::trace!(
        tick,
        births = newborns.len(),
        deaths,
        population = sim.population.len(),
        "tick complete"
    );

    TickSummary {
        tick,
        stepped,
        newborns,
        deaths,
        population: sim.population.len(),
    }
}

impl<E: Environment> Simulation<E> {
    pub fn tick(&mut self) -> TickSummary {
        run_simulation_tick(self)
    }

    /// Run until the tick budget is spent, the population is extinct or it
    /// reaches `max_population`
    pub fn run(&mut self) -> RunReport {
        tracing::info!(
            seed = self.config.seed,
            max_ticks = self.config.max_ticks,
            founders = self.founders.len(),
            "simulation starting"
        );

        while !self.is_finished() {
            self.tick();
        }

        if self.is_capped() {
            tracing::warn!(
                tick = self.current_tick,
                population = self.population.len(),
                max_population = self.config.max_population,
                "population cap reached, stopping early"
            );
        }

        tracing::info!(
            ticks = self.current_tick,
            population = self.population.len(),
            births = self.total_births,
            extinct = self.is_extinct(),
            "simulation ended"
        );

        RunReport::from_simulation(self)
    }
}
