//! Genesis - attachment-spectrum lineage simulation
//!
//! Entities survive on a depleting resource, reproduce at a heavy cost and
//! carry an inherited attachment trait that decides when they let go of
//! their children.

pub mod core;
pub mod entity;
pub mod environment;
pub mod simulation;
