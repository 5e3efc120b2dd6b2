//! `tl-control`: pluggable traffic-light control algorithms.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                     |
//! |-----------------|--------------------------------------------------------------|
//! | [`context`]     | `SimulationContext<'a>`, `LightData`, `VehicleData`          |
//! | [`algorithm`]   | `ControlAlgorithm` trait, `AlgorithmKind`, cycle helper      |
//! | [`static_timing`] | `StaticAlgorithm`: fixed round-robin cycle                |
//! | [`adaptive`]    | `AdaptiveAlgorithm`: queue-driven green smoothing           |
//! | [`coordinated`] | `CoordinatedAlgorithm`: adaptive base + neighbour offsets   |
//! | [`registry`]    | `AlgorithmConfig`, factory lookup, parameter metadata table  |
//! | [`error`]       | `ControlError`, `ControlResult<T>`                           |
//!
//! # Design notes
//!
//! Every algorithm is a pure function of `(light, context)`.  The light's
//! own record ([`LightData`]) goes in, its successor comes out; algorithms
//! carry only their tunable configuration and never mutate anything.  The
//! owning light (tl-agent) applies the returned record.
//!
//! [`SimulationContext`] is the only window an algorithm has onto the rest
//! of the world.  It is assembled by tl-sim from the engine's current state
//! immediately before each light activation.

pub mod adaptive;
pub mod algorithm;
pub mod context;
pub mod coordinated;
pub mod error;
pub mod registry;
pub mod static_timing;

#[cfg(test)]
mod tests;

pub use adaptive::{AdaptiveAlgorithm, AdaptiveConfig};
pub use algorithm::{AlgorithmKind, ControlAlgorithm, state_in_cycle};
pub use context::{LightData, SimulationContext, VehicleData};
pub use coordinated::{CoordinatedAlgorithm, CoordinatedConfig, OffsetCalculation};
pub use error::{ControlError, ControlResult};
pub use registry::{
    ALGORITHMS, AlgorithmConfig, AlgorithmInfo, ParamType, ParameterInfo, algorithm_info,
    create_algorithm,
};
pub use static_timing::{StaticAlgorithm, StaticConfig};
