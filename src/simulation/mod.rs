pub mod population;
pub mod registry;
pub mod report;
pub mod tick;

pub use population::{FounderDeath, FounderRecord, Simulation};
pub use registry::Registry;
pub use report::{FounderReport, RunReport};
pub use tick::{run_simulation_tick, TickSummary};
