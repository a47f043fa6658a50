//! Run report - end-of-run summary and serialization

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Tick};
use crate::environment::Environment;
use crate::simulation::population::Simulation;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FounderReport {
    pub id: EntityId,
    pub name: String,
    pub attachment: f64,
    pub panic_threshold: f64,
    pub died_at: Option<Tick>,
    /// Children still held at death (entangled)
    pub children_at_death: Option<usize>,
    pub descendants: usize,
    /// Decision log lines, oldest first
    pub decisions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub seed: u64,
    pub ticks_run: Tick,
    pub max_ticks: Tick,
    pub max_population: usize,
    pub extinct: bool,
    /// Stopped early because the living population reached the cap
    pub population_capped: bool,
    pub final_population: usize,
    pub peak_population: usize,
    pub total_births: usize,
    pub total_entities: usize,
    pub max_generation: u32,
    pub founders: Vec<FounderReport>,
}

impl RunReport {
    pub fn from_simulation<E: Environment>(sim: &Simulation<E>) -> Self {
        let history = sim.history();
        let lineages = history.lineage_sizes();

        let founders = sim
            .founders()
            .iter()
            .filter_map(|record| {
                let founder = history.get(record.id)?;
                Some(FounderReport {
                    id: record.id,
                    name: record.name.clone(),
                    attachment: founder.attachment(),
                    panic_threshold: founder.panic_threshold(),
                    died_at: record.death.map(|d| d.tick),
                    children_at_death: record.death.map(|d| d.children_entangled),
                    descendants: lineages.get(&record.id).copied().unwrap_or(0),
                    decisions: founder.log().lines(),
                })
            })
            .collect();

        Self {
            seed: sim.config().seed,
            ticks_run: sim.current_tick,
            max_ticks: sim.config().max_ticks,
            max_population: sim.config().max_population,
            extinct: sim.is_extinct(),
            population_capped: sim.is_capped(),
            final_population: sim.population().len(),
            peak_population: sim.peak_population(),
            total_births: sim.total_births(),
            total_entities: history.len(),
            max_generation: history.max_generation(),
            founders,
        }
    }

    pub fn founder(&self, name: &str) -> Option<&FounderReport> {
        self.founders.iter().find(|f| f.name == name)
    }

    pub fn to_json(&self) -> crate::core::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Ran {} of {} ticks (seed {}){}{}\n{} births, {} alive at end, peak {}, deepest generation {}",
            self.ticks_run,
            self.max_ticks,
            self.seed,
            if self.extinct { " - population extinct" } else { "" },
            if self.population_capped {
                format!(" - population cap {} reached", self.max_population)
            } else {
                String::new()
            },
            self.total_births,
            self.final_population,
            self.peak_population,
            self.max_generation,
        )];

        for founder in &self.founders {
            let fate = match (founder.died_at, founder.children_at_death) {
                (Some(tick), Some(children)) => {
                    format!("died at step {} with {} children entangled", tick, children)
                }
                _ => "survived".to_string(),
            };
            lines.push(format!(
                "{}: attachment {:.2}, threshold {:.3}, {}, {} decisions, {} descendants",
                founder.name,
                founder.attachment,
                founder.panic_threshold,
                fate,
                founder.decisions.len(),
                founder.descendants,
            ));
        }

        lines.join("\n")
    }
}
