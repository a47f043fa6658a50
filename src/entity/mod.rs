pub mod decisions;
pub mod life;
pub mod lifecycle;
pub mod preference;

pub use decisions::{Decision, DecisionLog, SeveranceReason};
pub use life::LifeKernel;
pub use lifecycle::{Entity, KinView, StepContext};
pub use preference::{PreferenceCore, TraitWeights};
