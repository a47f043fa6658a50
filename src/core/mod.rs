pub mod config;
pub mod error;
pub mod types;

pub use config::{FounderSpec, SimulationConfig};
pub use error::{GenesisError, Result};
pub use types::{EntityId, IdAllocator, Tick};
